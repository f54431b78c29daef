use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::types::RawEntry;

#[derive(Clone, Copy)]
enum Field {
    Id,
    Title,
    Published,
    Summary,
    AuthorName,
}

/// Parse an arXiv Atom response into raw entries, in document (relevance) order.
///
/// Only `<entry>` children are captured; feed-level `<title>`/`<id>` are ignored.
/// Namespace prefixes are stripped, so `arxiv:` elements never collide with Atom ones.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut entry: Option<RawEntry> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        entry = Some(RawEntry::default());
                        in_author = false;
                        field = None;
                    }
                    b"author" if entry.is_some() => in_author = true,
                    b"link" => {
                        if let Some(current) = entry.as_mut() {
                            read_link(&e, current)?;
                        }
                    }
                    other if entry.is_some() => {
                        field = field_for(other, in_author);
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if let Some(current) = entry.as_mut()
                    && e.local_name().as_ref() == b"link"
                {
                    read_link(&e, current)?;
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(done) = entry.take() {
                        entries.push(done);
                    }
                    in_author = false;
                }
                b"author" => in_author = false,
                _ => {
                    if let (Some(f), Some(current)) = (field.take(), entry.as_mut()) {
                        commit(current, f, std::mem::take(&mut text));
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn field_for(name: &[u8], in_author: bool) -> Option<Field> {
    match name {
        b"id" => Some(Field::Id),
        b"title" => Some(Field::Title),
        b"published" => Some(Field::Published),
        b"summary" => Some(Field::Summary),
        b"name" if in_author => Some(Field::AuthorName),
        _ => None,
    }
}

fn commit(entry: &mut RawEntry, field: Field, value: String) {
    match field {
        Field::Id => entry.id = Some(value),
        Field::Title => entry.title = Some(value),
        Field::Published => entry.published = Some(value),
        Field::Summary => entry.summary = Some(value),
        Field::AuthorName => entry.authors.push(value),
    }
}

/// arXiv marks the PDF link with `title="pdf"` and/or `type="application/pdf"`.
fn read_link(link: &BytesStart<'_>, entry: &mut RawEntry) -> Result<(), quick_xml::Error> {
    let mut href = None;
    let mut is_pdf = false;

    for attr in link.attributes().flatten() {
        let value = attr.unescape_value()?;
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value.into_owned()),
            b"title" => is_pdf |= value.eq_ignore_ascii_case("pdf"),
            b"type" => is_pdf |= value == "application/pdf",
            _ => {}
        }
    }

    if is_pdf && entry.pdf_link.is_none() {
        entry.pdf_link = href;
    }
    Ok(())
}
