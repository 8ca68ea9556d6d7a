//! XML reading and writing for `pgprules.xml`

use std::path::Path;

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;

use super::rule::Rule;
use crate::{Error, Result};

pub const ROOT_ELEMENT: &str = "pgpRuleList";
pub const RULE_ELEMENT: &str = "pgpRule";

/// Ordered rules of a rule store document.
///
/// Values are never patched in place; [`RuleList::merged`] returns a new
/// list that is then written out as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl RuleList {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse a rule store document. `origin` is only used in errors.
    ///
    /// Rule elements are collected at any depth. Content nested inside a rule
    /// element is not kept.
    pub fn parse(xml: &str, origin: &Path) -> Result<Self> {
        let malformed = |message: String| Error::RuleStoreFormat {
            path: origin.to_path_buf(),
            message,
        };

        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        let mut depth = 0usize;
        let mut seen_root = false;
        let mut rules = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                malformed(format!("{} at byte {}", e, reader.buffer_position()))
            })?;

            let (element, opens) = match event {
                Event::Start(e) => (e, true),
                Event::Empty(e) => (e, false),
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
            if depth == 0 {
                if seen_root {
                    return Err(malformed(format!("unexpected second root element <{}>", name)));
                }
                if name != ROOT_ELEMENT {
                    return Err(malformed(format!(
                        "expected root element <{}>, found <{}>",
                        ROOT_ELEMENT, name
                    )));
                }
                seen_root = true;
            } else if name == RULE_ELEMENT {
                rules.push(read_rule(&element).map_err(&malformed)?);
            }

            if opens {
                depth += 1;
            }
        }

        if !seen_root {
            return Err(malformed(format!("missing <{}> root element", ROOT_ELEMENT)));
        }
        if depth != 0 {
            return Err(malformed("unexpected end of document".to_string()));
        }

        Ok(Self { rules })
    }

    /// Serialize to the on-disk form. Output is deterministic for a given
    /// list, so re-rendering a parsed rendering yields the same bytes.
    pub fn render(&self, origin: &Path) -> Result<Vec<u8>> {
        let failed = |e| serialize_error(origin, e);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(failed)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))
            .map_err(failed)?;
        for rule in &self.rules {
            let mut element = BytesStart::new(RULE_ELEMENT);
            for (name, value) in rule.attributes() {
                element.push_attribute(Attribute {
                    key: QName(name.as_bytes()),
                    value: Cow::Owned(escape_attribute(value).into_bytes()),
                });
            }
            writer.write_event(Event::Empty(element)).map_err(failed)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
            .map_err(failed)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// A new list with `rule` first and every other rule for the same
    /// address removed. Remaining rules keep their relative order.
    pub fn merged(&self, rule: Rule) -> Self {
        let others: Vec<Rule> = self
            .rules
            .iter()
            .filter(|existing| !existing.matches(rule.email()))
            .cloned()
            .collect();

        let rules = std::iter::once(rule).chain(others).collect();
        Self { rules }
    }

    pub fn find(&self, email: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(email))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Escape an attribute value so that reading it back yields `value`.
///
/// Literal tabs and line breaks would be normalized to spaces by a reader,
/// so they are written as character references.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

fn serialize_error(origin: &Path, e: impl std::fmt::Display) -> Error {
    Error::RuleStoreFormat {
        path: origin.to_path_buf(),
        message: format!("failed to serialize rules: {}", e),
    }
}

fn read_rule(element: &BytesStart<'_>) -> std::result::Result<Rule, String> {
    let mut attributes = Vec::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| format!("bad attribute on <{}>: {}", RULE_ELEMENT, e))?;
        let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| format!("bad value for attribute {:?}: {}", name, e))?
            .into_owned();
        attributes.push((name, value));
    }

    Rule::from_attributes(attributes)
        .ok_or_else(|| format!("<{}> without an email attribute", RULE_ELEMENT))
}
