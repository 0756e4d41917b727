//! Offline renderer — runs the engine with silent input and packages the
//! result as normalized samples, 16-bit PCM, or a WAV byte buffer.

use super::channel::SAMPLE_MAX;
use super::engine::SynthEngine;
use crate::config::ChannelConfig;
use crate::error::ConfigError;

const BLOCK_FRAMES: usize = 128;

/// Render `total_samples` frames to interleaved f64 samples normalized to
/// [-1, 1]. Offline rendering is inherently bounded; zero frames renders
/// nothing (configuration is still validated).
pub fn render_samples(
    configs: &[ChannelConfig],
    channel_count: usize,
    sample_rate: f64,
    total_samples: u64,
) -> Result<Vec<f64>, ConfigError> {
    let mut engine = SynthEngine::new(configs.to_vec(), total_samples);
    engine.start(channel_count, sample_rate)?;
    if total_samples == 0 {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(total_samples as usize * channel_count);
    let input = vec![0.0; BLOCK_FRAMES * channel_count];
    let mut block = vec![0.0; BLOCK_FRAMES * channel_count];
    while !engine.is_complete() {
        let written = engine.process_block(&input, &mut block);
        if written == 0 {
            break;
        }
        out.extend(block[..written].iter().map(|&s| s / SAMPLE_MAX));
    }
    engine.stop();
    Ok(out)
}

/// Render to interleaved 16-bit PCM.
pub fn render_pcm_i16(
    configs: &[ChannelConfig],
    channel_count: usize,
    sample_rate: f64,
    total_samples: u64,
) -> Result<Vec<i16>, ConfigError> {
    let samples = render_samples(configs, channel_count, sample_rate, total_samples)?;
    Ok(samples
        .iter()
        .map(|&s| (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect())
}

/// Render to a WAV file as bytes (16-bit PCM, `channel_count` channels).
pub fn render_wav(
    configs: &[ChannelConfig],
    channel_count: usize,
    sample_rate: u32,
    total_samples: u64,
) -> Result<Vec<u8>, ConfigError> {
    let pcm = render_pcm_i16(configs, channel_count, sample_rate as f64, total_samples)?;
    Ok(encode_wav(&pcm, sample_rate, channel_count as u16))
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
