use std::fmt;

/// One data file the firmware wrote, as listed in `manifest.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestRecord {
    pub relative_path: String,
    pub expected_size: u64,
    pub seed: u32,
    pub expected_crc: u32,
}

impl ManifestRecord {
    /// Last path segment, used to label per-file checks.
    pub fn file_name(&self) -> &str {
        self.relative_path.rsplit(['/', '\\']).next().unwrap_or(&self.relative_path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    WrongFieldCount(usize),
    BadSize,
    BadSeed,
    BadCrc,
}

/// A manifest line that didn't parse. Identified by its trimmed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line_no: usize,
    pub line: String,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::WrongFieldCount(n) => write!(f, "wrong format ({} fields, expected 4)", n),
            ParseErrorKind::BadSize => write!(f, "bad decimal size"),
            ParseErrorKind::BadSeed => write!(f, "bad hex seed"),
            ParseErrorKind::BadCrc => write!(f, "bad hex crc32"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse hex with an optional `0x`/`0X` prefix, the way the firmware writes it.
pub fn parse_hex_u32(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

fn parse_line(line_no: usize, line: &str) -> Result<ManifestRecord, ParseError> {
    let err = |kind| ParseError { line_no, line: line.to_string(), kind };
    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[path, size, seed, crc] = &fields[..] else {
        return Err(err(ParseErrorKind::WrongFieldCount(fields.len())));
    };
    if size.starts_with('+') {
        return Err(err(ParseErrorKind::BadSize));
    }
    let expected_size: u64 = size.parse().map_err(|_| err(ParseErrorKind::BadSize))?;
    let seed = parse_hex_u32(seed).ok_or_else(|| err(ParseErrorKind::BadSeed))?;
    let expected_crc = parse_hex_u32(crc).ok_or_else(|| err(ParseErrorKind::BadCrc))?;
    Ok(ManifestRecord { relative_path: path.to_string(), expected_size, seed, expected_crc })
}

/// Parse manifest text line by line. Blank lines and `#` comments are skipped;
/// a bad line yields an `Err` entry and parsing carries on.
pub fn parse_manifest(text: &str) -> Vec<Result<ManifestRecord, ParseError>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(parse_line(i + 1, line))
        })
        .collect()
}
