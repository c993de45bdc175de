use std::fmt;
use std::str::FromStr;

use glance_types::DictionaryEntry;

use crate::error::DecodeError;

const EIJIRO_MARKER: char = '■';
const EIJIRO_DELIMITER: &str = " : ";
const EIJIRO_ANNOTATION: &str = "  ";
const PDIC_DELIMITER: &str = " /// ";

/// Field layouts a dictionary source may be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `■head : body`, consecutive lines with one head merged
    Eijiro,
    /// `head<TAB>body`
    Tsv,
    /// `head /// body`
    PdicLine,
    /// One JSON object mapping heads to bodies
    Json,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 4] = [
        SourceFormat::Eijiro,
        SourceFormat::Tsv,
        SourceFormat::PdicLine,
        SourceFormat::Json,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SourceFormat::Eijiro => "EIJIRO",
            SourceFormat::Tsv => "TSV",
            SourceFormat::PdicLine => "PDIC_LINE",
            SourceFormat::Json => "JSON",
        }
    }

    pub fn is_line_based(self) -> bool {
        !matches!(self, SourceFormat::Json)
    }
}

impl FromStr for SourceFormat {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "EIJIRO" => Ok(Self::Eijiro),
            "TSV" => Ok(Self::Tsv),
            "PDIC_LINE" | "PDIC" => Ok(Self::PdicLine),
            "JSON" => Ok(Self::Json),
            _ => Err(DecodeError::UnknownFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why a single record was dropped. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingMarker,
    MissingDelimiter,
    EmptyHead,
    EmptyBody,
    NotText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::MissingMarker => "missing head marker",
            SkipReason::MissingDelimiter => "missing delimiter",
            SkipReason::EmptyHead => "empty head",
            SkipReason::EmptyBody => "empty body",
            SkipReason::NotText => "body is not text",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy)]
enum LineLayout {
    Eijiro,
    Delimited(&'static str),
}

/// Turns lines of a line-based format into entries.
///
/// Eijiro entries are held back until a line with a different head arrives,
/// so `flush` must be called once the input is exhausted.
#[derive(Debug)]
pub(crate) struct LineParser {
    layout: LineLayout,
    pending: Option<DictionaryEntry>,
}

impl LineParser {
    /// `None` for formats that are not line based
    pub(crate) fn new(format: SourceFormat) -> Option<Self> {
        let layout = match format {
            SourceFormat::Eijiro => LineLayout::Eijiro,
            SourceFormat::Tsv => LineLayout::Delimited("\t"),
            SourceFormat::PdicLine => LineLayout::Delimited(PDIC_DELIMITER),
            SourceFormat::Json => return None,
        };
        Some(Self {
            layout,
            pending: None,
        })
    }

    /// `Ok(None)` for blank lines and for lines merged into a pending entry
    pub(crate) fn push_line(&mut self, line: &str) -> Result<Option<DictionaryEntry>, SkipReason> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        match self.layout {
            LineLayout::Delimited(delimiter) => parse_delimited(line, delimiter).map(Some),
            LineLayout::Eijiro => {
                let entry = parse_eijiro(line)?;
                if let Some(pending) = self
                    .pending
                    .as_mut()
                    .filter(|pending| pending.head == entry.head)
                {
                    pending.body.push('\n');
                    pending.body.push_str(&entry.body);
                    return Ok(None);
                }
                Ok(self.pending.replace(entry))
            }
        }
    }

    pub(crate) fn flush(&mut self) -> Option<DictionaryEntry> {
        self.pending.take()
    }
}

fn parse_delimited(line: &str, delimiter: &str) -> Result<DictionaryEntry, SkipReason> {
    let (head, body) = line
        .split_once(delimiter)
        .ok_or(SkipReason::MissingDelimiter)?;
    checked_entry(head.trim(), body.trim().to_string())
}

fn parse_eijiro(line: &str) -> Result<DictionaryEntry, SkipReason> {
    let rest = line
        .strip_prefix(EIJIRO_MARKER)
        .ok_or(SkipReason::MissingMarker)?;
    let (head, body) = rest
        .split_once(EIJIRO_DELIMITER)
        .ok_or(SkipReason::MissingDelimiter)?;

    // `■run  {動} : 走る` keeps the annotation in front of the body
    match head.split_once(EIJIRO_ANNOTATION) {
        Some((word, annotation)) if !annotation.trim().is_empty() => checked_entry(
            word.trim(),
            format!("{} {}", annotation.trim(), body.trim()),
        ),
        _ => checked_entry(head.trim(), body.trim().to_string()),
    }
}

pub(crate) fn checked_entry(head: &str, body: String) -> Result<DictionaryEntry, SkipReason> {
    if head.is_empty() {
        return Err(SkipReason::EmptyHead);
    }
    if body.trim().is_empty() {
        return Err(SkipReason::EmptyBody);
    }
    Ok(DictionaryEntry::new(head, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(format: SourceFormat, lines: &[&str]) -> (Vec<DictionaryEntry>, Vec<SkipReason>) {
        let mut parser = LineParser::new(format).unwrap();
        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for line in lines {
            match parser.push_line(line) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(reason) => skipped.push(reason),
            }
        }
        entries.extend(parser.flush());
        (entries, skipped)
    }

    #[test]
    fn format_tags() {
        assert_eq!("eijiro".parse::<SourceFormat>().unwrap(), SourceFormat::Eijiro);
        assert_eq!("pdic-line".parse::<SourceFormat>().unwrap(), SourceFormat::PdicLine);
        for format in SourceFormat::ALL {
            assert_eq!(format.tag().parse::<SourceFormat>().unwrap(), format);
        }
        assert!(matches!(
            "EPWING".parse::<SourceFormat>(),
            Err(DecodeError::UnknownFormat(_))
        ));
    }

    #[test]
    fn eijiro_merges_consecutive_heads() {
        let (entries, skipped) = parse_all(
            SourceFormat::Eijiro,
            &[
                "■cat : ネコ",
                "■cat : 猫科の動物",
                "■dog  {名} : 犬",
                "■cat : また猫",
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(
            entries,
            vec![
                DictionaryEntry::new("cat", "ネコ\n猫科の動物"),
                DictionaryEntry::new("dog", "{名} 犬"),
                DictionaryEntry::new("cat", "また猫"),
            ]
        );
    }

    #[test]
    fn eijiro_skips_malformed_lines() {
        let (entries, skipped) = parse_all(
            SourceFormat::Eijiro,
            &["cat : no marker", "■no delimiter", "■ : empty head", "■cat : ", "", "■ok : fine"],
        );
        assert_eq!(entries, vec![DictionaryEntry::new("ok", "fine")]);
        assert_eq!(
            skipped,
            vec![
                SkipReason::MissingMarker,
                SkipReason::MissingDelimiter,
                SkipReason::EmptyHead,
                SkipReason::EmptyBody,
            ]
        );
    }

    #[test]
    fn delimited_formats() {
        let (entries, skipped) = parse_all(SourceFormat::Tsv, &["cat\tneko", "broken", "dog\t"]);
        assert_eq!(entries, vec![DictionaryEntry::new("cat", "neko")]);
        assert_eq!(skipped, vec![SkipReason::MissingDelimiter, SkipReason::EmptyBody]);

        let (entries, _) = parse_all(SourceFormat::PdicLine, &["cat /// neko", "cat /// tama"]);
        assert_eq!(
            entries,
            vec![
                DictionaryEntry::new("cat", "neko"),
                DictionaryEntry::new("cat", "tama"),
            ]
        );
    }
}
