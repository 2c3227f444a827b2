//! Markup helpers (message body -> plain text)

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{AppError, Result};

const ROOT: &str = "body";

/// Concatenate every text node of `fragment` in document order.
///
/// The fragment is wrapped in a synthetic `<body>` root so that sibling
/// elements and bare text parse as one document. The result must be a
/// well-formed XML element: balanced tags, valid names, quoted and unique
/// attributes, XML-defined entities. Anything else is a [`AppError::MarkupParse`].
pub fn extract_text(fragment: &str) -> Result<String> {
    let document = format!("<{ROOT}>{fragment}</{ROOT}>");
    let mut reader = Reader::from_str(&document);

    let mut text = String::with_capacity(fragment.len());
    let mut depth = 0usize;
    let mut root_closed = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root_closed {
                    return Err(trailing_content(&reader));
                }
                check_element(&e)?;
                depth += 1;
            }
            Event::Empty(e) => {
                if root_closed {
                    return Err(trailing_content(&reader));
                }
                check_element(&e)?;
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(malformed(&reader, "unexpected closing tag"));
                }
                depth -= 1;
                root_closed = depth == 0;
            }
            Event::Text(e) => {
                if contains(&e, b"]]>") {
                    return Err(malformed(&reader, "\"]]>\" in text"));
                }
                let chunk = e.unescape()?;
                if root_closed {
                    if chunk.trim().is_empty() {
                        continue;
                    }
                    return Err(trailing_content(&reader));
                }
                text.push_str(&chunk);
            }
            Event::CData(e) => {
                if root_closed {
                    return Err(trailing_content(&reader));
                }
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::Comment(e) => {
                if contains(&e, b"--") || e.ends_with(b"-") {
                    return Err(malformed(&reader, "\"--\" in comment"));
                }
            }
            Event::Decl(_) => {
                return Err(malformed(&reader, "XML declaration inside body"));
            }
            Event::DocType(_) => {
                return Err(malformed(&reader, "DOCTYPE inside body"));
            }
            Event::PI(e) => {
                let target = e.split(|b| b.is_ascii_whitespace()).next().unwrap_or_default();
                if target.eq_ignore_ascii_case(b"xml") {
                    return Err(malformed(&reader, "XML declaration inside body"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_closed {
        return Err(AppError::MarkupParse(format!(
            "{} element(s) left open at end of body",
            depth
        )));
    }

    Ok(text)
}

/// Element and attribute names must be XML names; attributes must be quoted,
/// unique and hold only defined entities.
fn check_element(e: &BytesStart<'_>) -> Result<()> {
    let name = e.name();
    if !is_xml_name(name.as_ref()) {
        return Err(AppError::MarkupParse(format!(
            "invalid element name \"{}\"",
            String::from_utf8_lossy(name.as_ref())
        )));
    }

    for attr in e.attributes().with_checks(true) {
        let attr = attr.map_err(|err| AppError::MarkupParse(err.to_string()))?;
        if !is_xml_name(attr.key.as_ref()) {
            return Err(AppError::MarkupParse(format!(
                "invalid attribute name \"{}\"",
                String::from_utf8_lossy(attr.key.as_ref())
            )));
        }
        attr.unescape_value()?;
    }

    Ok(())
}

fn is_xml_name(raw: &[u8]) -> bool {
    let Ok(name) = std::str::from_utf8(raw) else {
        return false;
    };
    let is_start = |c: char| c == ':' || c == '_' || c.is_ascii_alphabetic() || !c.is_ascii();

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_start(c) => {}
        _ => return false,
    }
    chars.all(|c| is_start(c) || c.is_ascii_digit() || c == '-' || c == '.')
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn malformed(reader: &Reader<&[u8]>, what: &str) -> AppError {
    AppError::MarkupParse(format!("{} at position {}", what, reader.buffer_position()))
}

fn trailing_content(reader: &Reader<&[u8]>) -> AppError {
    malformed(reader, "content after the end of the body")
}
