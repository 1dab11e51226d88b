//! Word-list readers.
//!
//! Two layouts are accepted:
//! - JSON: `[{"word": "cat", "frequency": 200, "absolute": 91233}, ...]`
//! - XML: `<wordlist><w f="200" abs="91233">cat</w>...</wordlist>`
//!
//! Frequencies are expected to be normalized already.

use std::path::Path;

use clap::ValueEnum;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use wordtrie_protocol::WordEntry;

const TAG_WORD: &[u8] = b"w";
const ATTR_FREQ: &str = "f";
const ATTR_ABS: &str = "abs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    Json,
    Xml,
}

impl SourceFormat {
    /// `.xml` files are XML word lists, everything else is read as JSON.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => SourceFormat::Xml,
            _ => SourceFormat::Json,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid JSON word list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML word list at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("<w> element at byte {position} has no `{attribute}` attribute")]
    MissingAttribute { position: u64, attribute: &'static str },

    #[error("attribute `{attribute}` at byte {position} is not a number: {value:?}")]
    InvalidNumber {
        position: u64,
        attribute: &'static str,
        value: String,
    },
}

pub fn parse(content: &str, format: SourceFormat) -> Result<Vec<WordEntry>, SourceError> {
    match format {
        SourceFormat::Json => parse_json(content),
        SourceFormat::Xml => parse_xml(content),
    }
}

pub fn parse_json(content: &str) -> Result<Vec<WordEntry>, SourceError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_xml(content: &str) -> Result<Vec<WordEntry>, SourceError> {
    let mut reader = Reader::from_str(content);
    let mut entries = Vec::new();

    // (frequency, absolute) of the open <w> element
    let mut open: Option<(u32, Option<u64>)> = None;
    let mut word = String::new();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == TAG_WORD => {
                let frequency = attribute(e, ATTR_FREQ, position)?
                    .ok_or(SourceError::MissingAttribute { position, attribute: ATTR_FREQ })?;
                let frequency = parse_number(&frequency, ATTR_FREQ, position)?;
                let absolute = attribute(e, ATTR_ABS, position)?
                    .map(|value| parse_number(&value, ATTR_ABS, position))
                    .transpose()?;
                open = Some((frequency, absolute));
                word.clear();
            }
            Ok(Event::Text(ref e)) if open.is_some() => {
                let text = e.unescape().map_err(|source| SourceError::Xml { position, source })?;
                word.push_str(&text);
            }
            Ok(Event::CData(ref e)) if open.is_some() => {
                word.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == TAG_WORD => {
                if let Some((frequency, absolute)) = open.take() {
                    entries.push(WordEntry {
                        word: std::mem::take(&mut word),
                        frequency,
                        absolute,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => return Err(SourceError::Xml { position, source }),
            _ => {}
        }
    }

    Ok(entries)
}

fn attribute(
    e: &BytesStart<'_>,
    name: &'static str,
    position: u64,
) -> Result<Option<String>, SourceError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| SourceError::Xml { position, source: err.into() })?;
    attr.map(|a| {
        a.unescape_value()
            .map(|value| value.into_owned())
            .map_err(|source| SourceError::Xml { position, source })
    })
    .transpose()
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    attribute: &'static str,
    position: u64,
) -> Result<T, SourceError> {
    value.trim().parse().map_err(|_| SourceError::InvalidNumber {
        position,
        attribute,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let content = r#"[
            {"word": "cat", "frequency": 200, "absolute": 91233},
            {"word": "dog", "frequency": 10}
        ]"#;
        let entries = parse(content, SourceFormat::Json).unwrap();

        assert_eq!(
            entries,
            vec![WordEntry::new("cat", 200).with_absolute(91233), WordEntry::new("dog", 10)]
        );
    }

    #[test]
    fn test_parse_xml() {
        let content = r#"<?xml version="1.0" encoding="utf-8"?>
<wordlist>
  <w f="200" abs="91233">cat</w>
  <w f="50">car</w>
  <w f="12" abs="7">rock &amp; roll</w>
</wordlist>"#;
        let entries = parse(content, SourceFormat::Xml).unwrap();

        assert_eq!(
            entries,
            vec![
                WordEntry::new("cat", 200).with_absolute(91233),
                WordEntry::new("car", 50),
                WordEntry::new("rock & roll", 12).with_absolute(7),
            ]
        );
    }

    #[test]
    fn test_xml_cdata_is_kept_verbatim() {
        let content = r#"<wordlist>
  <w f="3"><![CDATA[a&b]]></w>
  <w f="4">x<![CDATA[<y>]]>&amp;z</w>
</wordlist>"#;
        let entries = parse_xml(content).unwrap();

        assert_eq!(entries, vec![WordEntry::new("a&b", 3), WordEntry::new("x<y>&z", 4)]);
    }

    #[test]
    fn test_xml_missing_frequency() {
        let err = parse_xml("<wordlist><w abs=\"3\">cat</w></wordlist>").unwrap_err();
        assert!(matches!(err, SourceError::MissingAttribute { attribute: "f", .. }), "{}", err);
    }

    #[test]
    fn test_xml_bad_number() {
        let err = parse_xml("<wordlist><w f=\"lots\">cat</w></wordlist>").unwrap_err();
        match err {
            SourceError::InvalidNumber { attribute, value, .. } => {
                assert_eq!(attribute, "f");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_infer_format() {
        assert_eq!(SourceFormat::infer(Path::new("words.XML")), SourceFormat::Xml);
        assert_eq!(SourceFormat::infer(Path::new("words.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::infer(Path::new("words")), SourceFormat::Json);
    }
}
