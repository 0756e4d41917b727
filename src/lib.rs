pub mod config;
pub mod dsp;
pub mod error;

use wasm_bindgen::prelude::*;

use crate::config::ChannelConfig;
use crate::error::ConfigError;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the toneforge-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse a JSON array of channel configs — the resolved-parameter boundary
/// with the (external) option parser.
pub fn parse_spec(json: &str) -> Result<Vec<ChannelConfig>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Synthesize `total_samples` frames of `channel_count` channels to
/// interleaved f64 samples normalized to [-1, 1].
pub fn synthesize(
    configs: &[ChannelConfig],
    channel_count: usize,
    sample_rate: f64,
    total_samples: u64,
) -> Result<Vec<f64>, ConfigError> {
    dsp::renderer::render_samples(configs, channel_count, sample_rate, total_samples)
}

/// WASM-exposed: apply type-specific parameter defaults to a JSON channel
/// spec and return the resolved configs, for host UIs that want to display
/// effective values.
#[wasm_bindgen]
pub fn resolve_spec(spec_json: &str) -> Result<JsValue, JsValue> {
    let mut configs = parse_spec(spec_json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    for config in configs.iter_mut() {
        config.resolve_defaults();
    }
    serde_wasm_bindgen::to_value(&configs).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: synthesize a JSON channel spec to interleaved f32 samples
/// for AudioWorklet playback.
#[wasm_bindgen]
pub fn synthesize_samples(
    spec_json: &str,
    sample_rate: u32,
    channel_count: u32,
    total_samples: u32,
) -> Result<Vec<f32>, JsValue> {
    let configs = parse_spec(spec_json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let samples = synthesize(
        &configs,
        channel_count as usize,
        sample_rate as f64,
        total_samples as u64,
    )
    .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(samples.iter().map(|&s| s as f32).collect())
}

/// WASM-exposed: synthesize a JSON channel spec to a WAV byte array.
#[wasm_bindgen]
pub fn synthesize_wav(
    spec_json: &str,
    sample_rate: u32,
    channel_count: u32,
    total_samples: u32,
) -> Result<Vec<u8>, JsValue> {
    let configs = parse_spec(spec_json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    dsp::renderer::render_wav(
        &configs,
        channel_count as usize,
        sample_rate,
        total_samples as u64,
    )
    .map_err(|e| JsValue::from_str(&format!("{e}")))
}
