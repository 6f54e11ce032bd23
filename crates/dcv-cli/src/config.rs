use std::path::Path;

use anyhow::Context;
use dcv_codec::{DecodeLimits, FormatVersion};
use dcv_types::Address;
use dcv_value::DecodeContext;
use serde::{Deserialize, Serialize};

/// Settings read from `--config`, defaults otherwise.
///
/// ```toml
/// format_version = 2
///
/// [limits]
/// max_depth = 64
/// max_input_len = 1048576
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Version input buffers are decoded with and samples are written in.
    pub format_version: FormatVersion,
    pub limits: DecodeLimits,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.format_version.ruleset()?;
        Ok(config)
    }

    pub fn decode_context(&self, owner: Option<Address>) -> DecodeContext {
        DecodeContext::new(owner, self.format_version).with_limits(self.limits)
    }
}
