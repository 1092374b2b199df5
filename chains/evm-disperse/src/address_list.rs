//! Recipient address list loading.
//!
//! One address per line, LF or CRLF. Blank, malformed (including non UTF-8)
//! and zero-address lines are skipped with a diagnostic; everything else is
//! kept in file order, duplicates included.

use alloy_primitives::Address;
use core_logic::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9A-Fa-f]{40}$").expect("address pattern is valid"));

/// Returns true when `candidate` is `0x` followed by exactly 40 hex digits.
pub fn matches_address_pattern(candidate: &str) -> bool {
    ADDRESS_PATTERN.is_match(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Malformed,
    ZeroAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based
    pub line_number: usize,
    pub content: String,
    pub reason: SkipReason,
}

/// Ordered, immutable set of recipients consumed by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    addresses: Vec<Address>,
    skipped: Vec<SkippedLine>,
}

impl RecipientList {
    /// Parses the full text of an address file.
    pub fn parse(content: &str) -> Self {
        Self::parse_bytes(content.as_bytes())
    }

    /// Parses raw file bytes. Each line is decoded on its own, so a line that
    /// is not valid UTF-8 is skipped like any other malformed line. A leading
    /// UTF-8 byte order mark is ignored.
    pub fn parse_bytes(content: &[u8]) -> Self {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        let mut addresses = Vec::new();
        let mut skipped = Vec::new();
        if content.is_empty() {
            return Self { addresses, skipped };
        }
        // a trailing newline does not start another line
        let content = content.strip_suffix(b"\n").unwrap_or(content);

        for (idx, raw) in content.split(|b| *b == b'\n').enumerate() {
            let line_number = idx + 1;

            let line = match std::str::from_utf8(raw) {
                Ok(line) => line.trim(),
                Err(_) => {
                    let lossy = String::from_utf8_lossy(raw).trim().to_string();
                    warn!("Line {}: not valid UTF-8, skipped", line_number);
                    skipped.push(SkippedLine {
                        line_number,
                        content: lossy,
                        reason: SkipReason::Malformed,
                    });
                    continue;
                }
            };

            if line.is_empty() {
                debug!("Line {}: blank, skipped", line_number);
                skipped.push(SkippedLine {
                    line_number,
                    content: String::new(),
                    reason: SkipReason::Blank,
                });
                continue;
            }

            let parsed = if matches_address_pattern(line) {
                Address::from_str(line).ok()
            } else {
                None
            };

            match parsed {
                Some(address) if address == Address::ZERO => {
                    warn!("Line {}: zero address skipped", line_number);
                    skipped.push(SkippedLine {
                        line_number,
                        content: line.to_string(),
                        reason: SkipReason::ZeroAddress,
                    });
                }
                Some(address) => addresses.push(address),
                None => {
                    warn!("Line {}: invalid address '{}' skipped", line_number, line);
                    skipped.push(SkippedLine {
                        line_number,
                        content: line.to_string(),
                        reason: SkipReason::Malformed,
                    });
                }
            }
        }

        Self { addresses, skipped }
    }

    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        Self {
            addresses,
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Skipped lines that were not simply blank.
    pub fn rejected_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason != SkipReason::Blank)
            .count()
    }
}

/// Reads the whole address file and returns the list once fully consumed.
pub async fn load_recipients(path: impl AsRef<Path>) -> Result<RecipientList, ConfigError> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::IoError {
                path: path.display().to_string(),
                msg: e.to_string(),
            }
        }
    })?;

    let list = RecipientList::parse_bytes(&content);
    debug!(
        "Loaded {} recipients from {} ({} lines rejected)",
        list.len(),
        path.display(),
        list.rejected_count()
    );
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(c: char) -> String {
        format!("0x{}", c.to_string().repeat(40))
    }

    #[test]
    fn test_filters_malformed_and_zero() {
        let content = [
            addr('A'),
            "not-an-address".to_string(),
            format!("0x{}", "0".repeat(40)),
            addr('B'),
        ]
        .join("\n");

        let list = RecipientList::parse(&content);

        assert_eq!(
            list.as_slice(),
            &[
                Address::from_str(&addr('a')).unwrap(),
                Address::from_str(&addr('b')).unwrap()
            ]
        );
        assert_eq!(list.skipped().len(), 2);
        assert_eq!(list.skipped()[0].reason, SkipReason::Malformed);
        assert_eq!(list.skipped()[0].line_number, 2);
        assert_eq!(list.skipped()[1].reason, SkipReason::ZeroAddress);
    }

    #[test]
    fn test_crlf_blank_and_mixed_case() {
        let content = format!(
            "{}\r\n\r\n  0xAbCdEf0123456789abcdef0123456789ABCDEF01  \r\n",
            addr('1')
        );
        let list = RecipientList::parse(&content);

        assert_eq!(list.len(), 2);
        assert_eq!(list.skipped().len(), 1);
        assert_eq!(list.skipped()[0].reason, SkipReason::Blank);
        assert_eq!(list.rejected_count(), 0);
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let content = [addr('c'), addr('d'), addr('c')].join("\n");
        let list = RecipientList::parse(&content);

        assert_eq!(list.len(), 3);
        assert_eq!(list.as_slice()[0], list.as_slice()[2]);
    }

    #[test]
    fn test_pattern_is_strict() {
        assert!(matches_address_pattern(&addr('f')));
        assert!(!matches_address_pattern(&format!("0x{}", "f".repeat(39))));
        assert!(!matches_address_pattern(&format!("0x{}", "f".repeat(41))));
        assert!(!matches_address_pattern(&"f".repeat(42)));
        assert!(!matches_address_pattern(&format!("0X{}", "f".repeat(40))));
        assert!(!matches_address_pattern(&format!("0x{}g", "f".repeat(39))));
    }
}
