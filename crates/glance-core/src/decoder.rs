//! Byte-level decoding of dictionary sources into [`DictionaryEntry`] values.
//!
//! Two entry points share the same record parsing:
//!
//! - [`decode`] turns a complete buffer into a lazy [`Entries`] iterator.
//! - [`StreamDecoder`] is fed raw chunks and hands back whatever records are
//!   complete so far. This is what the ingestor uses for large sources.
//!
//! Malformed records are skipped and counted, never fatal. The only fatal
//! case is a source that cannot be split into records at all.

use encoding_rs::CoderResult;
use glance_types::DictionaryEntry;
use serde_json::{Map, Value};

use crate::encoding::SourceEncoding;
use crate::error::DecodeError;
use crate::format::{LineParser, SkipReason, SourceFormat, checked_entry};

/// Decode a whole buffer. Records are parsed lazily as the iterator advances.
pub fn decode(
    bytes: &[u8],
    encoding: SourceEncoding,
    format: SourceFormat,
) -> Result<Entries, DecodeError> {
    let (text, _, had_errors) = encoding.encoding().decode(bytes);
    if had_errors {
        tracing::debug!("{} source contained undecodable bytes", encoding);
    }

    match LineParser::new(format) {
        Some(parser) => Ok(Entries::Lines(LineEntries {
            text: text.into_owned(),
            pos: 0,
            parser,
            skipped: 0,
            flushed: false,
        })),
        None => {
            let (records, skipped) = json_records(&text)?;
            Ok(Entries::Json(JsonEntries {
                records: records.into_iter(),
                skipped,
            }))
        }
    }
}

/// Finite, non-restartable sequence of decoded entries
#[derive(Debug)]
pub enum Entries {
    Lines(LineEntries),
    Json(JsonEntries),
}

impl Entries {
    /// Records skipped so far
    pub fn skipped(&self) -> usize {
        match self {
            Entries::Lines(lines) => lines.skipped,
            Entries::Json(json) => json.skipped,
        }
    }
}

impl Iterator for Entries {
    type Item = DictionaryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::Lines(lines) => lines.next(),
            Entries::Json(json) => json.next(),
        }
    }
}

#[derive(Debug)]
pub struct LineEntries {
    text: String,
    pos: usize,
    parser: LineParser,
    skipped: usize,
    flushed: bool,
}

impl Iterator for LineEntries {
    type Item = DictionaryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let end = self.text[self.pos..]
                .find('\n')
                .map_or(self.text.len(), |i| self.pos + i + 1);
            let line = self.text[self.pos..end].trim_end_matches(['\n', '\r']);
            self.pos = end;

            if let Some(entry) = take_line(&mut self.parser, line, &mut self.skipped) {
                return Some(entry);
            }
        }

        if self.flushed {
            return None;
        }
        self.flushed = true;
        self.parser.flush()
    }
}

#[derive(Debug)]
pub struct JsonEntries {
    records: std::vec::IntoIter<DictionaryEntry>,
    skipped: usize,
}

impl Iterator for JsonEntries {
    type Item = DictionaryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}

/// Incremental decoder for sources read chunk by chunk.
///
/// A multi-byte sequence or a line split across two chunks is carried over to
/// the next `feed`. Whole-document formats buffer until `finish`.
pub struct StreamDecoder {
    encoding: SourceEncoding,
    format: SourceFormat,
    decoder: encoding_rs::Decoder,
    text: String,
    parser: Option<LineParser>,
    skipped: usize,
    malformed_bytes: bool,
}

impl StreamDecoder {
    pub fn new(encoding: SourceEncoding, format: SourceFormat) -> Self {
        Self {
            encoding,
            format,
            decoder: encoding.new_decoder(),
            text: String::new(),
            parser: LineParser::new(format),
            skipped: 0,
            malformed_bytes: false,
        }
    }

    /// Decode one chunk and return the records it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DictionaryEntry> {
        self.decode_chunk(chunk, false);
        self.drain_lines(false)
    }

    /// Flush the byte decoder and any held-back record.
    ///
    /// For whole-document formats this is where the document is parsed, and
    /// the only place a fatal [`DecodeError`] can come from.
    pub fn finish(mut self) -> Result<(Vec<DictionaryEntry>, usize), DecodeError> {
        self.decode_chunk(&[], true);
        if self.malformed_bytes {
            tracing::debug!("{} source contained undecodable bytes", self.encoding);
        }

        if self.parser.is_none() {
            let (records, skipped) = json_records(&self.text)?;
            return Ok((records, self.skipped + skipped));
        }

        let mut entries = self.drain_lines(true);
        if let Some(parser) = self.parser.as_mut() {
            entries.extend(parser.flush());
        }
        Ok((entries, self.skipped))
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    fn decode_chunk(&mut self, mut chunk: &[u8], last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(chunk.len())
                .unwrap_or(chunk.len() * 3 + 16);
            self.text.reserve(needed);

            let (result, read, had_errors) =
                self.decoder.decode_to_string(chunk, &mut self.text, last);
            self.malformed_bytes |= had_errors;
            chunk = &chunk[read..];

            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }

    fn drain_lines(&mut self, at_end: bool) -> Vec<DictionaryEntry> {
        let Some(parser) = self.parser.as_mut() else {
            return Vec::new();
        };

        let consumed = if at_end {
            self.text.len()
        } else {
            match self.text.rfind('\n') {
                Some(i) => i + 1,
                None => return Vec::new(),
            }
        };

        let mut entries = Vec::new();
        for line in self.text[..consumed].lines() {
            if let Some(entry) = take_line(parser, line, &mut self.skipped) {
                entries.push(entry);
            }
        }
        self.text.drain(..consumed);
        entries
    }
}

fn take_line(parser: &mut LineParser, line: &str, skipped: &mut usize) -> Option<DictionaryEntry> {
    match parser.push_line(line) {
        Ok(entry) => entry,
        Err(reason) => {
            *skipped += 1;
            tracing::debug!("Record skipped ({}): {:?}", reason, truncate(line, 80));
            None
        }
    }
}

fn json_records(text: &str) -> Result<(Vec<DictionaryEntry>, usize), DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedDocument {
        format: SourceFormat::Json.tag(),
        reason,
    };

    let document: Map<String, Value> =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let mut records = Vec::with_capacity(document.len());
    let mut skipped = 0;
    for (head, body) in document {
        let entry = match body {
            Value::String(body) => checked_entry(head.trim(), body),
            _ => Err(SkipReason::NotText),
        };
        match entry {
            Ok(entry) => records.push(entry),
            Err(reason) => {
                skipped += 1;
                tracing::debug!("Record skipped ({}): {:?}", reason, head);
            }
        }
    }

    Ok((records, skipped))
}

fn truncate(line: &str, max_chars: usize) -> &str {
    match line.char_indices().nth(max_chars) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}
