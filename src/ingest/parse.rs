// src/ingest/parse.rs
//! Event-driven RSS / Atom parsing.
//!
//! One pass over the document with `quick_xml::Reader`; RSS 2.0, RSS 1.0 (RDF)
//! and Atom 1.0 share the same cursor because both keep their entries as direct
//! children elements named `item` / `entry`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::types::RawItem;

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("malformed feed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document root <{0}> is not an rss or atom feed")]
    NotAFeed(String),
    #[error("empty document")]
    Empty,
}

/// Parse a feed body into raw items. Items are returned in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<RawItem>, FeedParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root_seen = false;
    let mut items = Vec::new();
    let mut cur = Cursor::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = qname(&e);
                if !root_seen {
                    check_root(&name)?;
                    root_seen = true;
                    continue;
                }
                cur.open(&name, &e);
            }
            Event::Empty(e) => {
                let name = qname(&e);
                if !root_seen {
                    check_root(&name)?;
                    root_seen = true;
                    continue;
                }
                cur.empty(&name, &e);
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(done) = cur.close(&name) {
                    items.push(done);
                }
            }
            Event::Text(t) => cur.text(&decode_bytes(&t)),
            Event::CData(c) => cur.text(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(FeedParseError::Empty);
    }
    Ok(items)
}

fn check_root(name: &str) -> Result<(), FeedParseError> {
    match local(name) {
        "rss" | "RDF" | "feed" => Ok(()),
        other => Err(FeedParseError::NotAFeed(other.to_string())),
    }
}

fn qname(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Feed bodies routinely carry HTML entities XML does not define (`&nbsp;`,
/// `&rsquo;`), so entity decoding goes through the HTML table.
fn decode_bytes(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    html_escape::decode_html_entities(&s).into_owned()
}

#[derive(Default)]
struct Cursor {
    item: Option<RawItem>,
    /// Element depth below the current item/entry element.
    depth: usize,
    field: Option<String>,
    buf: String,
}

impl Cursor {
    fn open(&mut self, name: &str, e: &BytesStart) {
        let Some(item) = self.item.as_mut() else {
            if matches!(local(name), "item" | "entry") {
                self.item = Some(RawItem::default());
                self.depth = 0;
            }
            return;
        };
        self.depth += 1;
        if self.depth == 1 {
            apply_attrs(item, name, e);
            self.field = Some(name.to_string());
            self.buf.clear();
        }
    }

    fn empty(&mut self, name: &str, e: &BytesStart) {
        if self.depth != 0 {
            return;
        }
        if let Some(item) = self.item.as_mut() {
            apply_attrs(item, name, e);
        }
    }

    fn text(&mut self, s: &str) {
        if self.item.is_none() || self.depth == 0 {
            return;
        }
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(s);
    }

    fn close(&mut self, name: &str) -> Option<RawItem> {
        let item = self.item.as_mut()?;
        if self.depth == 0 {
            if matches!(local(name), "item" | "entry") {
                return self.item.take();
            }
            return None;
        }
        if self.depth == 1 {
            if let Some(field) = self.field.take() {
                let value = std::mem::take(&mut self.buf);
                commit(item, &field, value.trim());
            }
        }
        self.depth -= 1;
        None
    }
}

fn commit(item: &mut RawItem, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let v = Some(value.to_string());
    match field {
        "title" => item.title = v,
        "link" => {
            if item.link.is_none() {
                item.link = v;
            }
        }
        "guid" | "id" => item.guid = v,
        "description" | "summary" => {
            if item.summary.is_none() {
                item.summary = v;
            }
        }
        "content:encoded" | "content" => item.content = v,
        "pubDate" => item.pub_date = v,
        "published" | "dc:date" | "issued" => item.iso_date = v,
        "updated" | "modified" => {
            if item.iso_date.is_none() {
                item.iso_date = v;
            }
        }
        "feedburner:origLink" => item.orig_link = v,
        _ => {}
    }
}

fn apply_attrs(item: &mut RawItem, name: &str, e: &BytesStart) {
    match name {
        "enclosure" => {
            if item.enclosure_type.is_none() {
                item.enclosure_type = attr(e, b"type");
            }
        }
        "link" | "atom:link" => {
            let Some(href) = attr(e, b"href") else {
                return;
            };
            match attr(e, b"rel").as_deref() {
                Some("enclosure") => {
                    if item.enclosure_type.is_none() {
                        item.enclosure_type = attr(e, b"type");
                    }
                }
                None | Some("alternate") => {
                    if name == "link" && item.link.is_none() {
                        item.link = Some(href.clone());
                    }
                    item.links.push(href);
                }
                Some("related") => item.links.push(href),
                _ => {}
            }
        }
        _ => {}
    }
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| decode_bytes(&a.value))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
