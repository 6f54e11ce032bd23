use dcv_codec::{DecodeLimits, DecodeResult, FormatVersion, Ruleset};
use dcv_types::Address;

/// Everything a decode call needs besides the bytes themselves.
///
/// Deferred composites capture the context they were decoded with and
/// reuse it when their fields are decoded later, so nested values inherit
/// the same owner, version, and limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeContext {
    /// Owner of the decoded values. Opaque; only compared for equality.
    pub owner: Option<Address>,
    pub version: FormatVersion,
    pub limits: DecodeLimits,
}

impl DecodeContext {
    pub fn new(owner: Option<Address>, version: FormatVersion) -> Self {
        Self {
            owner,
            version,
            limits: DecodeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn ruleset(&self) -> DecodeResult<Ruleset> {
        self.version.ruleset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcv_codec::DecodeError;

    #[test]
    fn default_context() {
        let ctx = DecodeContext::default();
        assert_eq!(ctx.owner, None);
        assert_eq!(ctx.version, FormatVersion::CURRENT);
        assert_eq!(ctx.limits, DecodeLimits::default());
    }

    #[test]
    fn unsupported_version() {
        let ctx = DecodeContext::new(None, FormatVersion::new(7));
        assert_eq!(ctx.ruleset().unwrap_err(), DecodeError::UnsupportedVersion(7));
    }

    #[test]
    fn with_limits() {
        let limits = DecodeLimits { max_depth: 2, ..Default::default() };
        let ctx =
            DecodeContext::new(Some(Address::from_u64(1)), FormatVersion::V1).with_limits(limits);
        assert_eq!(ctx.limits.max_depth, 2);
        assert_eq!(ctx.owner, Some(Address::from_u64(1)));
    }
}
