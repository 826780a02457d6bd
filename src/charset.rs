//! Session character sets and the string extraction strategy used by the
//! character column decoders.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Converts the raw bytes of a character column into a `String`.
///
/// The strategy is chosen from the session charset when the connection is
/// created and handed to every `MetaData` parsed on that connection.
pub trait StringExtractor: Debug + Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Validating UTF-8 extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Extractor;

impl StringExtractor for Utf8Extractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        match simdutf8::basic::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(Error::BadUsageError(format!(
                "column data is not valid UTF-8: {:02X?}",
                bytes
            ))),
        }
    }
}

/// 7-bit ASCII extraction; bytes above 0x7F are rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiExtractor;

impl StringExtractor for AsciiExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        if !bytes.is_ascii() {
            return Err(Error::BadUsageError(format!(
                "column data is not ASCII: {:02X?}",
                bytes
            )));
        }
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }
}

/// ISO-8859-1 extraction; every byte maps to the code point of the same value
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Extractor;

impl StringExtractor for Latin1Extractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }
}

/// Session character set negotiated at logon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionCharset {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl SessionCharset {
    /// Resolve a charset name as accepted by the CLI (`UTF8`, `ASCII`, `LATIN1_0A`)
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.contains("UTF8") {
            Ok(Self::Utf8)
        } else if upper.contains("ASCII") {
            Ok(Self::Ascii)
        } else if upper.contains("LATIN1") {
            Ok(Self::Latin1)
        } else {
            Err(Error::BadConfigError(format!(
                "could not convert session charset to encoding: {:?}",
                name
            )))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF8",
            Self::Ascii => "ASCII",
            Self::Latin1 => "LATIN1_0A",
        }
    }

    pub fn extractor(self) -> Arc<dyn StringExtractor> {
        match self {
            Self::Utf8 => Arc::new(Utf8Extractor),
            Self::Ascii => Arc::new(AsciiExtractor),
            Self::Latin1 => Arc::new(Latin1Extractor),
        }
    }

    /// Encode request text for this session
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Ascii => {
                if !text.is_ascii() {
                    return Err(Error::BadUsageError(format!(
                        "request text is not representable in ASCII: {:?}",
                        text
                    )));
                }
                Ok(text.as_bytes().to_vec())
            }
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        Error::BadUsageError(format!(
                            "character {:?} is not representable in LATIN1",
                            c
                        ))
                    })
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for SessionCharset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
