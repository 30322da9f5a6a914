//! Minimal XML reader and escaping helpers for the document codec.
//!
//! Built on `winnow` 0.7. Reads one root element into an owned tree,
//! skipping the prolog, comments, processing instructions, and DOCTYPE.
//! Entity references (`&lt;`, `&#10;`, …) are decoded in attribute
//! values and text; CDATA sections are taken verbatim.

use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

type Fail = ErrMode<ContextError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct XmlError {
    pub offset: usize,
    pub message: String,
}

/// One parsed element with its attributes, child elements, and
/// concatenated character data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// Parse a document and return its root element.
pub fn parse_xml(input: &str) -> Result<Element, XmlError> {
    let reader = Reader { len: input.len() };
    let mut rest = input.strip_prefix('\u{feff}').unwrap_or(input);
    reader.skip_misc(&mut rest)?;
    if !rest.starts_with('<') {
        return Err(reader.fail(rest, "expected root element"));
    }
    let root = reader.element(&mut rest)?;
    reader.skip_misc(&mut rest)?;
    if !rest.is_empty() {
        return Err(reader.fail(rest, "unexpected content after root element"));
    }
    Ok(root)
}

// ─── Reader ──────────────────────────────────────────────────────────────

struct Reader {
    len: usize,
}

fn skip_space(input: &mut &str) {
    let _: Result<&str, Fail> = multispace0.parse_next(input);
}

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
    })
    .parse_next(input)
}

fn parse_quoted<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

fn skip_comment(input: &mut &str) -> ModalResult<()> {
    delimited("<!--", take_until(0.., "-->"), "-->")
        .void()
        .parse_next(input)
}

fn skip_instruction(input: &mut &str) -> ModalResult<()> {
    delimited("<?", take_until(0.., "?>"), "?>")
        .void()
        .parse_next(input)
}

fn skip_doctype(input: &mut &str) -> ModalResult<()> {
    delimited("<!DOCTYPE", take_till(0.., '>'), '>')
        .void()
        .parse_next(input)
}

fn parse_cdata<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited("<![CDATA[", take_until(0.., "]]>"), "]]>").parse_next(input)
}

impl Reader {
    fn fail(&self, rest: &str, message: impl Into<String>) -> XmlError {
        XmlError {
            offset: self.len.saturating_sub(rest.len()),
            message: message.into(),
        }
    }

    fn skip_misc(&self, input: &mut &str) -> Result<(), XmlError> {
        loop {
            skip_space(input);
            if input.starts_with("<?") {
                skip_instruction(input).map_err(|_| self.fail(input, "unterminated processing instruction"))?;
            } else if input.starts_with("<!--") {
                skip_comment(input).map_err(|_| self.fail(input, "unterminated comment"))?;
            } else if input.starts_with("<!DOCTYPE") {
                skip_doctype(input).map_err(|_| self.fail(input, "unterminated DOCTYPE"))?;
            } else {
                return Ok(());
            }
        }
    }

    fn element(&self, input: &mut &str) -> Result<Element, XmlError> {
        '<'.parse_next(input)
            .map_err(|_: Fail| self.fail(input, "expected '<'"))?;
        let name = parse_name(input).map_err(|_| self.fail(input, "expected element name"))?;
        let mut el = Element::new(name);

        // Attributes up to `>` or `/>`.
        loop {
            skip_space(input);
            if let Some(rest) = input.strip_prefix("/>") {
                *input = rest;
                return Ok(el);
            }
            if let Some(rest) = input.strip_prefix('>') {
                *input = rest;
                break;
            }
            let (key, value) = self.attribute(input)?;
            if el.attr(&key).is_some() {
                return Err(self.fail(input, format!("duplicate attribute '{key}' on <{}>", el.name)));
            }
            el.attrs.push((key, value));
        }

        // Content up to the matching close tag.
        loop {
            if input.is_empty() {
                return Err(self.fail(input, format!("unclosed element <{}>", el.name)));
            }
            if input.starts_with("</") {
                *input = &input[2..];
                let close = parse_name(input).map_err(|_| self.fail(input, "expected closing tag name"))?;
                if close != el.name {
                    return Err(self.fail(
                        input,
                        format!("mismatched closing tag </{close}> for <{}>", el.name),
                    ));
                }
                skip_space(input);
                '>'.parse_next(input)
                    .map_err(|_: Fail| self.fail(input, "expected '>'"))?;
                return Ok(el);
            } else if input.starts_with("<!--") {
                skip_comment(input).map_err(|_| self.fail(input, "unterminated comment"))?;
            } else if input.starts_with("<![CDATA[") {
                let data = parse_cdata(input).map_err(|_| self.fail(input, "unterminated CDATA section"))?;
                el.text.push_str(data);
            } else if input.starts_with("<?") {
                skip_instruction(input).map_err(|_| self.fail(input, "unterminated processing instruction"))?;
            } else if input.starts_with('<') {
                let child = self.element(input)?;
                el.children.push(child);
            } else {
                let raw: &str = take_till(1.., '<')
                    .parse_next(input)
                    .map_err(|_: Fail| self.fail(input, "expected character data"))?;
                let decoded = decode_entities(raw).ok_or_else(|| self.fail(input, "invalid entity reference"))?;
                el.text.push_str(&decoded);
            }
        }
    }

    fn attribute(&self, input: &mut &str) -> Result<(String, String), XmlError> {
        let key = parse_name(input).map_err(|_| self.fail(input, "expected attribute name"))?;
        skip_space(input);
        '='.parse_next(input)
            .map_err(|_: Fail| self.fail(input, format!("expected '=' after attribute '{key}'")))?;
        skip_space(input);
        let raw = parse_quoted(input).map_err(|_| self.fail(input, format!("expected quoted value for '{key}'")))?;
        let value = decode_entities(raw).ok_or_else(|| self.fail(input, "invalid entity reference"))?;
        Ok((key.to_string(), value))
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// Decode the five predefined entities and numeric character references.
/// Returns `None` on an unknown or unterminated reference.
pub fn decode_entities(raw: &str) -> Option<String> {
    if !raw.contains('&') {
        return Some(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let end = after.find(';')?;
        let entity = &after[..end];
        let ch = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    entity.strip_prefix('#')?.parse::<u32>().ok()?
                };
                char::from_u32(code)?
            }
        };
        out.push(ch);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- saved -->
<root a="1" b='two'>
  <item id="x"/>
  <item id="y">hello &amp; bye</item>
</root>
"#;
        let root = parse_xml(input).unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.attr("a"), Some("1"));
        assert_eq!(root.attr("b"), Some("two"));
        let items: Vec<_> = root.children_named("item").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text, "hello & bye");
        assert_eq!(items[0].attr("id"), Some("x"));
    }

    #[test]
    fn cdata_and_numeric_entities() {
        let root = parse_xml("<t>a&#10;b<![CDATA[<raw>]]>&#x41;</t>").unwrap();
        assert_eq!(root.text, "a\nb<raw>A");
    }

    #[test]
    fn mismatched_close_tag_is_an_error() {
        let err = parse_xml("<a><b></a>").unwrap_err();
        assert!(err.message.contains("mismatched"), "{err}");
    }

    #[test]
    fn unclosed_and_trailing_content_rejected() {
        assert!(parse_xml("<a>").is_err());
        assert!(parse_xml("<a/><b/>").is_err());
        assert!(parse_xml("").is_err());
        assert!(parse_xml("not xml").is_err());
    }

    #[test]
    fn duplicate_attribute_rejected() {
        assert!(parse_xml(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn unknown_entity_rejected() {
        assert!(parse_xml("<a>&nbsp;</a>").is_err());
        assert_eq!(decode_entities("a &lt; b"), Some("a < b".into()));
        assert_eq!(decode_entities("x &bogus; y"), None);
    }

    #[test]
    fn escape_then_decode_is_identity() {
        let s = r#"<a href="x">Tom & 'Jerry'</a>"#;
        assert_eq!(decode_entities(&escape(s)).as_deref(), Some(s));
    }
}
