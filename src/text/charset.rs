//! Character sets used to decode scalar content from input bytes and to
//! encode it back on output.
//!
//! Keys always go through [`Charset::KEY`]; only content text follows the
//! charset configured on a document tree.

use serde::{Deserialize, Serialize};

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Charset {
    /// Fixed charset for object keys, independent of the content charset.
    pub const KEY: Charset = Charset::Utf8;

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&byte| byte as char).collect(),
            Charset::Ascii => bytes
                .iter()
                .map(|&byte| {
                    if byte.is_ascii() {
                        byte as char
                    } else {
                        REPLACEMENT
                    }
                })
                .collect(),
        }
    }

    pub fn encode_into(self, text: &str, out: &mut Vec<u8>) {
        match self {
            Charset::Utf8 => out.extend_from_slice(text.as_bytes()),
            Charset::Latin1 => out.extend(text.chars().map(|ch| {
                if (ch as u32) <= 0xFF {
                    ch as u8
                } else {
                    b'?'
                }
            })),
            Charset::Ascii => {
                out.extend(text.chars().map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' }))
            }
        }
    }

    /// Number of bytes `text` occupies once encoded.
    pub fn encoded_len(self, text: &str) -> usize {
        match self {
            Charset::Utf8 => text.len(),
            Charset::Latin1 | Charset::Ascii => text.chars().count(),
        }
    }

    /// Encode into a fixed slice. The caller guarantees
    /// `out.len() >= self.encoded_len(text)`.
    pub(crate) fn encode_to_slice(self, text: &str, out: &mut [u8]) -> usize {
        match self {
            Charset::Utf8 => {
                out[..text.len()].copy_from_slice(text.as_bytes());
                text.len()
            }
            Charset::Latin1 | Charset::Ascii => {
                let limit = if self == Charset::Latin1 { 0xFF } else { 0x7F };
                let mut written = 0;
                for ch in text.chars() {
                    out[written] = if (ch as u32) <= limit { ch as u8 } else { b'?' };
                    written += 1;
                }
                written
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "iso-8859-1",
            Charset::Ascii => "us-ascii",
        }
    }
}

impl std::str::FromStr for Charset {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(format!(
                "Invalid charset \"{raw}\". Valid charsets are: utf-8, latin1, ascii"
            )),
        }
    }
}
