use std::borrow::Cow;
use std::io::{Read, Seek};

use log::debug;

use super::*;
use crate::tag::{self, tuple, Arranged, Special};

/// Encodes the tags into the content of an item list (`ilst`) atom.
///
/// Track and disc numbers, bpm and genre come first in that order, followed by all other tags in
/// the order they were passed.
pub fn encode_items(items: &[TagItem], cfg: &WriteConfig<'_>) -> crate::Result<Vec<u8>> {
    let arranged = tag::arrange(items);
    let meta_items = meta_items(&arranged, cfg);

    let len: u64 = meta_items.iter().map(MetaItem::len).sum();
    let mut buf = AtomBuf::with_capacity(usize::try_from(len).unwrap_or(usize::MAX));
    for i in meta_items.iter() {
        i.write(&mut buf);
    }

    buf.detach()
}

/// Wraps the encoded items in an item list (`ilst`) atom head.
pub fn build_ilst(body: &[u8]) -> crate::Result<Vec<u8>> {
    let mut buf = AtomBuf::with_capacity(body.len().saturating_add(HEAD_LEN as usize));
    buf.write_atom(ITEM_LIST, body);
    buf.detach()
}

fn meta_items<'a>(arranged: &Arranged<'a>, cfg: &'a WriteConfig<'_>) -> Vec<MetaItem<'a>> {
    let mut meta_items = Vec::with_capacity(arranged.remaining.len() + 4);

    if let Some(track) = arranged.get(Special::TrackNumber) {
        let (number, total) = tuple::parse_tuple(track, arranged.get(Special::TotalTracks));
        meta_items.push(MetaItem::Tuple { fourcc: TRACK_NUMBER, number, total });
    }
    if let Some(disc) = arranged.get(Special::DiscNumber) {
        let (number, total) = tuple::parse_tuple(disc, arranged.get(Special::TotalDiscs));
        meta_items.push(MetaItem::Tuple { fourcc: DISC_NUMBER, number, total });
    }
    if let Some(tempo) = arranged.get(Special::Tempo) {
        meta_items.push(MetaItem::Int16 { fourcc: BPM, value: tuple::parse_number(tempo) });
    }
    if let Some(genre) = arranged.get(Special::Genre) {
        meta_items.push(match cfg.genres.index_of(genre) {
            0 => MetaItem::Data {
                fourcc: CUSTOM_GENRE,
                datatype: UTF8,
                data: Cow::Borrowed(genre.as_bytes()),
            },
            code => MetaItem::Int16 { fourcc: STANDARD_GENRE, value: code },
        });
    }

    for &(item, fourcc) in arranged.remaining.iter() {
        meta_items.push(match fourcc {
            Some(f) => standard_item(f, &item.value),
            None => MetaItem::Freeform {
                mean: &cfg.freeform_mean,
                name: &item.name,
                value: &item.value,
            },
        });
    }

    meta_items
}

fn standard_item(fourcc: Fourcc, value: &str) -> MetaItem<'_> {
    let (datatype, data) = match fourcc {
        COMPILATION => (RESERVED, Cow::Owned(vec![is_set(value) as u8])),
        ARTWORK => (RESERVED, Cow::Borrowed(value.as_bytes())),
        _ => (UTF8, Cow::Borrowed(value.as_bytes())),
    };
    MetaItem::Data { fourcc, datatype, data }
}

fn is_set(value: &str) -> bool {
    let value = value.trim();
    tuple::parse_number(value) != 0
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
}

/// Decodes the items of the item list atom back into tags.
pub fn parse_items(
    reader: &mut (impl Read + Seek),
    ilst: AtomBounds,
    genres: &dyn GenreIndex,
) -> crate::Result<Vec<TagItem>> {
    let mut items = Vec::new();

    for item in children(reader, ilst.content_pos(), ilst.content_len())? {
        match item.fourcc() {
            FREE => continue,
            FREEFORM => {
                let name = match find(reader, item.content_pos(), item.content_len(), NAME)? {
                    Some(n) => read_content(reader, n, 4)?,
                    None => None,
                };
                let value = match find(reader, item.content_pos(), item.content_len(), DATA)? {
                    Some(d) => read_content(reader, d, 8)?,
                    None => None,
                };

                match (name, value) {
                    (Some(n), Some(v)) => items.push(TagItem::new(lossy(n), lossy(v))),
                    _ => debug!("skipping freeform item at {} without name or data", item.pos()),
                }
            }
            fourcc => {
                let data = match find(reader, item.content_pos(), item.content_len(), DATA)? {
                    Some(d) => read_content(reader, d, 8)?,
                    None => None,
                };

                match data {
                    Some(d) => decode_item(fourcc, d, genres, &mut items),
                    None => debug!("skipping '{fourcc}' item without data"),
                }
            }
        }
    }

    Ok(items)
}

/// Reads the content of the atom, skipping the first `skip` bytes. Returns `None` if the atom is
/// too small.
fn read_content(
    reader: &mut (impl Read + Seek),
    atom: AtomBounds,
    skip: u64,
) -> crate::Result<Option<Vec<u8>>> {
    if atom.content_len() < skip {
        return Ok(None);
    }
    reader.set_position(atom.content_pos() + skip)?;
    Ok(Some(reader.read_u8_vec(atom.content_len() - skip)?))
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn special(special: Special, value: String) -> TagItem {
    TagItem::new(special.name(), value)
}

fn decode_item(fourcc: Fourcc, data: Vec<u8>, genres: &dyn GenreIndex, items: &mut Vec<TagItem>) {
    match fourcc {
        TRACK_NUMBER | DISC_NUMBER => {
            let (index, total) = match fourcc {
                TRACK_NUMBER => (Special::TrackNumber, Special::TotalTracks),
                _ => (Special::DiscNumber, Special::TotalDiscs),
            };
            if let Some(number) = be_int!(data, 2, u16) {
                items.push(special(index, number.to_string()));
            }
            match be_int!(data, 4, u16) {
                Some(t) if t != 0 => items.push(special(total, t.to_string())),
                _ => (),
            }
        }
        BPM => {
            if let Some(bpm) = be_int!(data, 0, u16) {
                items.push(special(Special::Tempo, bpm.to_string()));
            }
        }
        STANDARD_GENRE => match be_int!(data, 0, u16).and_then(|c| genres.name_of(c)) {
            Some(g) => items.push(special(Special::Genre, g.to_owned())),
            None => debug!("skipping unknown standard genre"),
        },
        CUSTOM_GENRE => items.push(special(Special::Genre, lossy(data))),
        COMPILATION => {
            let flag = data.first().copied().unwrap_or(0);
            items.push(TagItem::new("compilation", flag.to_string()));
        }
        _ => match tag::standard_name(fourcc) {
            Some(name) => items.push(TagItem::new(name, lossy(data))),
            None => debug!("skipping unknown '{fourcc}' item"),
        },
    }
}
