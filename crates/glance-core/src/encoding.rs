use std::fmt;
use std::str::FromStr;

use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::DecodeError;

/// Byte encodings a dictionary source may be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    ShiftJis,
    Utf8,
    Utf16Le,
    Utf16Be,
    EucJp,
}

impl SourceEncoding {
    pub const ALL: [SourceEncoding; 5] = [
        SourceEncoding::ShiftJis,
        SourceEncoding::Utf8,
        SourceEncoding::Utf16Le,
        SourceEncoding::Utf16Be,
        SourceEncoding::EucJp,
    ];

    pub fn encoding(self) -> &'static Encoding {
        match self {
            SourceEncoding::ShiftJis => SHIFT_JIS,
            SourceEncoding::Utf8 => UTF_8,
            SourceEncoding::Utf16Le => UTF_16LE,
            SourceEncoding::Utf16Be => UTF_16BE,
            SourceEncoding::EucJp => EUC_JP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceEncoding::ShiftJis => "Shift-JIS",
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Utf16Le => "UTF-16LE",
            SourceEncoding::Utf16Be => "UTF-16BE",
            SourceEncoding::EucJp => "EUC-JP",
        }
    }

    /// Streaming decoder that sniffs and strips a leading BOM
    pub fn new_decoder(self) -> encoding_rs::Decoder {
        self.encoding().new_decoder()
    }
}

impl FromStr for SourceEncoding {
    type Err = DecodeError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "shiftjis" | "sjis" | "cp932" => Ok(Self::ShiftJis),
            "utf8" => Ok(Self::Utf8),
            "utf16" | "utf16le" => Ok(Self::Utf16Le),
            "utf16be" => Ok(Self::Utf16Be),
            "eucjp" => Ok(Self::EucJp),
            _ => Err(DecodeError::UnknownEncoding(label.to_string())),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
