use serde::{Deserialize, Serialize};

/// Bounds enforced while decoding untrusted buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum container nesting within one decode step. Deferred
    /// composites start counting again when their own fields are decoded.
    pub max_depth: u32,
    /// Maximum length of a top-level buffer, in bytes.
    pub max_input_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_input_len: 64 * 1024 * 1024, // 64 MiB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_depth, 128);
        assert_eq!(limits.max_input_len, 64 * 1024 * 1024);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let limits: DecodeLimits = serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(limits.max_depth, 4);
        assert_eq!(limits.max_input_len, DecodeLimits::default().max_input_len);
    }
}
