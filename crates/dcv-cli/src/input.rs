use std::path::Path;

use anyhow::Context;
use dcv_types::Address;

/// Read an encoded buffer, decoding hex text when `hex` is set.
///
/// Hex input may contain whitespace and line breaks.
pub fn read_buffer(path: &Path, hex: bool) -> anyhow::Result<Vec<u8>> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if !hex {
        return Ok(raw);
    }
    let text = String::from_utf8(raw).context("hex input is not UTF-8")?;
    let digits: String = text.split_whitespace().collect();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    hex::decode(digits).with_context(|| format!("decoding hex in {}", path.display()))
}

pub fn parse_owner(owner: Option<&str>) -> anyhow::Result<Option<Address>> {
    owner
        .map(|s| Address::from_hex(s).with_context(|| format!("invalid owner address {s:?}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn raw_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x01, 0xff]).unwrap();
        assert_eq!(read_buffer(file.path(), false).unwrap(), [0x01, 0xff]);
    }

    #[test]
    fn hex_with_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x0102\n  03ff").unwrap();
        assert_eq!(read_buffer(file.path(), true).unwrap(), [0x01, 0x02, 0x03, 0xff]);
    }

    #[test]
    fn bad_hex() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "zz").unwrap();
        assert!(read_buffer(file.path(), true).is_err());
    }

    #[test]
    fn missing_file() {
        assert!(read_buffer(Path::new("/nonexistent/value.bin"), false).is_err());
    }

    #[test]
    fn owner() {
        assert_eq!(parse_owner(None).unwrap(), None);
        assert_eq!(parse_owner(Some("0x2a")).unwrap(), Some(Address::from_u64(0x2a)));
        assert!(parse_owner(Some("not hex")).is_err());
    }
}
