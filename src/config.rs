// path: src/config.rs
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FoldConfig {
    /// Directory holding generated `<locale>.txt` tables (root.txt required).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Longest contiguous candidate tried at each position.
    #[serde(default = "default_max_key_len")]
    pub max_key_len: usize,
    /// How far past a match we look for a non-starter to splice in.
    #[serde(default = "default_max_lookahead")]
    pub max_lookahead: usize,
}

fn default_data_dir() -> String { "colf".into() }
fn default_max_key_len() -> usize { 4 }
fn default_max_lookahead() -> usize { 32 }

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_key_len: default_max_key_len(),
            max_lookahead: default_max_lookahead(),
        }
    }
}

impl FoldConfig {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("COLF_DATA_DIR").unwrap_or_else(|_| default_data_dir());
        let max_key_len = std::env::var("COLF_MAX_KEY_LEN").ok().and_then(|s| s.parse().ok()).unwrap_or(default_max_key_len());
        let max_lookahead = std::env::var("COLF_MAX_LOOKAHEAD").ok().and_then(|s| s.parse().ok()).unwrap_or(default_max_lookahead());

        Self { data_dir, max_key_len: max_key_len.max(1), max_lookahead }
    }
}
