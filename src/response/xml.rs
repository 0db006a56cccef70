//! XML to `serde_json::Value` conversion.
//!
//! Follows the xmltodict layout: qualified element names as keys, attributes
//! as `@name`, mixed text as `#text`, repeated children as arrays, text-only
//! elements as strings and empty elements as `null`. Namespaces are not
//! resolved, so `soap:Body` stays `soap:Body`.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

pub const ATTR_PREFIX: &str = "@";
pub const TEXT_KEY: &str = "#text";

/// An element that is still open while reading.
struct Frame {
    name: String,
    entries: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .context("Element name is not valid UTF-8")?
            .to_string();

        let mut entries = Map::new();
        for attr in start.attributes() {
            let attr = attr.context("Malformed attribute")?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .context("Attribute name is not valid UTF-8")?;
            let value = attr
                .unescape_value()
                .with_context(|| format!("Invalid value for attribute '{}'", key))?;
            entries.insert(
                format!("{}{}", ATTR_PREFIX, key),
                Value::String(value.into_owned()),
            );
        }

        Ok(Self {
            name,
            entries,
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        push_entry(&mut self.entries, name, value);
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.entries.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            let mut entries = self.entries;
            if !text.is_empty() {
                entries.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
            }
            Value::Object(entries)
        };
        (self.name, value)
    }
}

/// Inserts `value` under `key`, turning a repeated key into an array.
fn push_entry(entries: &mut Map<String, Value>, key: String, value: Value) {
    match entries.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            entries.insert(key, value);
        }
    }
}

/// Parses an XML document into a single-key mapping `{root_name: content}`.
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .with_context(|| format!("XML parse error at position {}", position))?;

        match event {
            Event::Start(ref e) => {
                if stack.is_empty() && root.is_some() {
                    bail!("Junk after document element at position {}", position);
                }
                stack.push(Frame::open(e)?);
            }
            Event::Empty(ref e) => {
                if stack.is_empty() && root.is_some() {
                    bail!("Junk after document element at position {}", position);
                }
                let frame = Frame::open(e)?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| anyhow!("Unexpected closing tag at position {}", position))?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::Text(ref e) => {
                let text = e.unescape().context("Invalid text content")?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => bail!("Text outside of the document element at position {}", position),
                }
            }
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e).context("CDATA section is not valid UTF-8")?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(text),
                    None => bail!("CDATA outside of the document element at position {}", position),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        bail!("Unclosed element '{}'", open.name);
    }

    let (name, value) = root.ok_or_else(|| anyhow!("No element found"))?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn close_frame(frame: Frame, stack: &mut [Frame], root: &mut Option<(String, Value)>) {
    let (name, value) = frame.close();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => *root = Some((name, value)),
    }
}
