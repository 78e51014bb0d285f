// Timed-text caption parsing. The caption endpoint answers with a small
// XML document:
//
//   <transcript>
//     <text start="0.0" dur="1.5">first line</text>
//     ...
//   </transcript>
//
// and an empty body when the video has no track in the requested language.

use anyhow::{Context, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Join every `<text>` entry of a transcript with single spaces.
/// Returns `None` for an empty body or a transcript without entries.
pub fn parse_transcript(xml: &str) -> Result<Option<String>> {
    if xml.trim().is_empty() {
        return Ok(None);
    }

    let mut reader = Reader::from_str(xml);
    let mut entries: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event().context("Malformed caption XML")? {
            Event::Start(e) if e.name().as_ref() == b"text" => {
                current = Some(String::new());
            }
            Event::Text(t) => {
                if let Some(buf) = current.as_mut() {
                    // XML layer first, then the HTML escaping underneath it.
                    let once = unescape_html(&String::from_utf8_lossy(&t));
                    buf.push_str(&unescape_html(&once));
                }
            }
            Event::CData(c) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some(line) = current.take() {
                    entries.push(line);
                }
            }
            Event::Empty(e) if e.name().as_ref() == b"text" => {
                entries.push(String::new());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(entries.join(" ")))
}

/// Caption lines are HTML-escaped before being put into XML, so after the
/// XML layer is removed `&#39;`, `&nbsp;` and friends can still be present.
/// Unknown entities are left as they are.
fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures| {
            resolve_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_entity(name: &str) -> Option<String> {
    let code = match name.strip_prefix('#') {
        Some(num) => match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse().ok(),
        },
        None => {
            // With `escape-html` this covers every HTML5 named entity.
            return resolve_predefined_entity(name).map(String::from);
        }
    };
    char::from_u32(code?).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_entries_with_spaces() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">hello there</text><text start="2.6" dur="1.0">general
kenobi</text></transcript>"#;
        let text = parse_transcript(xml).unwrap();
        assert_eq!(text.as_deref(), Some("hello there general\nkenobi"));
    }

    #[test]
    fn unescapes_double_escaped_entities() {
        let xml = r#"<transcript><text start="0" dur="1">it&amp;#39;s &amp;amp; more</text></transcript>"#;
        let text = parse_transcript(xml).unwrap();
        assert_eq!(text.as_deref(), Some("it's & more"));
    }

    #[test]
    fn html_entities_resolve_and_unknown_ones_stay() {
        let xml = r#"<transcript><text start="0" dur="1">wait&amp;nbsp;for it&amp;hellip; &amp;bogus; &amp;#x41;&amp;#39;s</text></transcript>"#;
        let text = parse_transcript(xml).unwrap();
        assert_eq!(text.as_deref(), Some("wait\u{a0}for it\u{2026} &bogus; A's"));
    }

    #[test]
    fn stray_entity_in_xml_layer_is_kept() {
        let xml = r#"<transcript><text start="0" dur="1">a &bogus; b &lt;3</text></transcript>"#;
        let text = parse_transcript(xml).unwrap();
        assert_eq!(text.as_deref(), Some("a &bogus; b <3"));
    }

    #[test]
    fn empty_body_means_no_captions() {
        assert_eq!(parse_transcript("").unwrap(), None);
        assert_eq!(parse_transcript("  \n").unwrap(), None);
    }

    #[test]
    fn transcript_without_entries_means_no_captions() {
        assert_eq!(parse_transcript("<transcript></transcript>").unwrap(), None);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_transcript("<transcript><text>oops</transcript>").is_err());
    }
}
