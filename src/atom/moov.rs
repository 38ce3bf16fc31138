use std::io::{Read, Seek};

use log::debug;

use super::*;

/// The user data (`udta`), metadata (`meta`) and item list (`ilst`) atoms found inside a movie
/// atom. Each level is only present if all its ancestors are.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AtomChain {
    pub udta: Option<AtomBounds>,
    pub meta: Option<AtomBounds>,
    pub ilst: Option<AtomBounds>,
}

/// Locates the metadata atom chain inside the movie atom. The first user data atom containing a
/// metadata atom is used, otherwise the first user data atom.
pub fn locate_chain(reader: &mut (impl Read + Seek), moov: AtomBounds) -> crate::Result<AtomChain> {
    let nested =
        find_nested(reader, moov.content_pos(), moov.content_len(), USER_DATA, 0, METADATA)?;

    let (udta, meta) = match nested {
        Nested::NotFound => return Ok(AtomChain::default()),
        Nested::OuterOnly(udta) => return Ok(AtomChain { udta: Some(udta), ..Default::default() }),
        Nested::Both { outer, inner } => (outer, inner),
    };

    if meta.content_len() < meta::HEADER_LEN {
        return Err(crate::Error::new(
            ErrorKind::UnsupportedLayout,
            format!("Metadata atom of {} bytes is too small to hold its version", meta.len()),
        ));
    }
    let ilst = find(
        reader,
        meta.content_pos() + meta::HEADER_LEN,
        meta.content_len() - meta::HEADER_LEN,
        ITEM_LIST,
    )?;

    Ok(AtomChain { udta: Some(udta), meta: Some(meta), ilst })
}

/// A replacement of the bytes in `start..end` with `insert`, growing or shrinking every atom in
/// `ancestors` by the difference.
#[derive(Debug)]
struct Splice {
    start: u64,
    end: u64,
    insert: Vec<u8>,
    ancestors: Vec<AtomBounds>,
}

impl Splice {
    fn delta(&self) -> i64 {
        self.insert.len() as i64 - (self.end - self.start) as i64
    }
}

/// Returns the content of the movie atom with the item list replaced by the encoded tags.
///
/// Missing levels of the chain are created and inserted behind the last child of the deepest
/// existing one.
/// All other bytes of the movie atom are copied unchanged from the reader.
pub fn modify_moov(
    reader: &mut (impl Read + Seek),
    moov: AtomBounds,
    items: &[TagItem],
    cfg: &WriteConfig<'_>,
) -> crate::Result<Vec<u8>> {
    let chain = locate_chain(reader, moov)?;
    let body = encode_items(items, cfg)?;

    let splice = match chain {
        AtomChain { udta: Some(udta), meta: Some(meta), ilst: Some(ilst) } => {
            debug!("replacing item list at {}", ilst.pos());
            Splice {
                start: ilst.content_pos(),
                end: ilst.end(),
                insert: body,
                ancestors: vec![udta, meta, ilst],
            }
        }
        AtomChain { udta: Some(udta), meta: Some(meta), ilst: None } => {
            debug!("adding item list to metadata atom at {}", meta.pos());
            let pos = children_end(
                reader,
                meta.content_pos() + meta::HEADER_LEN,
                meta.content_len() - meta::HEADER_LEN,
            )?;
            Splice {
                start: pos,
                end: pos,
                insert: build_ilst(&body)?,
                ancestors: vec![udta, meta],
            }
        }
        AtomChain { udta: Some(udta), .. } => {
            debug!("adding metadata atom to user data atom at {}", udta.pos());
            let pos = children_end(reader, udta.content_pos(), udta.content_len())?;
            Splice {
                start: pos,
                end: pos,
                insert: meta::build_meta(&body, cfg)?,
                ancestors: vec![udta],
            }
        }
        AtomChain { udta: None, .. } => {
            debug!("adding user data atom to movie atom at {}", moov.pos());
            let pos = children_end(reader, moov.content_pos(), moov.content_len())?;
            Splice {
                start: pos,
                end: pos,
                insert: udta::build_udta(&body, cfg)?,
                ancestors: Vec::new(),
            }
        }
    };

    let delta = splice.delta();
    debug!("item list size delta: {delta}");
    let new_len = match u64::try_from(moov.content_len() as i64 + delta) {
        Ok(l) if HEAD_LEN + l <= u32::MAX as u64 => l,
        _ => {
            return Err(crate::Error::new(
                ErrorKind::SizeOverflow,
                "Movie atom would exceed the 32 bit size limit",
            ));
        }
    };

    let mut buf = AtomBuf::with_capacity(new_len as usize);
    reader.set_position(moov.content_pos())?;
    buf.write_from(reader, splice.start - moov.content_pos());
    buf.write(&splice.insert);
    reader.set_position(splice.end)?;
    buf.write_from(reader, moov.end() - splice.end);
    let mut content = buf.detach()?;

    for a in splice.ancestors.iter() {
        let len = patched_len(a, delta)?;
        set_be_u32(&mut content, (a.pos() - moov.content_pos()) as usize, len);
    }

    Ok(content)
}

fn patched_len(atom: &AtomBounds, delta: i64) -> crate::Result<u32> {
    u32::try_from(atom.len() as i64 + delta).map_err(|_| {
        crate::Error::new(
            ErrorKind::SizeOverflow,
            format!("Atom '{}' of {} bytes can't be resized by {}", atom.fourcc(), atom.len(), delta),
        )
    })
}
