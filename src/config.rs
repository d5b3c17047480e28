//! Model configuration.
//!
//! A [`Config`] selects which extensions the model enables and where it
//! resets to. It is intentionally small: there is no cache, pipeline, or
//! branch-predictor configuration because this model has none of those.

use serde::Deserialize;

const DEFAULT_RESET_VECTOR: u32 = 0x8000_0000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub extensions: ExtensionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig::default(),
            extensions: ExtensionConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_reset_vector")]
    pub reset_vector: String,

    #[serde(default)]
    pub trace_instructions: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            reset_vector: default_reset_vector(),
            trace_instructions: false,
        }
    }
}

impl GeneralConfig {
    pub fn reset_vector_val(&self) -> u32 {
        parse_hex(&self.reset_vector, DEFAULT_RESET_VECTOR)
    }
}

/// Extension-enable flags. `compressed` and `float` default on, matching
/// the RV32IMAFC-minus-M configuration this model implements; they exist
/// as fields (rather than being hardwired) so tests can exercise the
/// pure-RV32I decode path with `compressed = false`.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtensionConfig {
    #[serde(default = "default_true")]
    pub compressed: bool,

    #[serde(default = "default_true")]
    pub float: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig {
            compressed: true,
            float: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reset_vector() -> String {
    format!("{:#x}", DEFAULT_RESET_VECTOR)
}

fn parse_hex(s: &str, default: u32) -> u32 {
    let s = s.trim_start_matches("0x");
    u32::from_str_radix(s, 16).unwrap_or(default)
}
