//! Atom level reading and rewriting of the metadata chain.
//!
//! ```md
//! moov
//! └─ udta
//!    └─ meta
//!       ├─ hdlr (optional)
//!       └─ ilst
//!          ├─ **** (any fourcc)
//!          │  └─ data
//!          └─ ---- (freeform fourcc)
//!             ├─ mean
//!             ├─ name
//!             └─ data
//! ```
use std::io::{Read, Seek};

use log::{debug, trace};

use crate::{ErrorKind, FileLike, GenreIndex, TagItem, WriteConfig};

pub use ident::*;

pub(crate) use ilst::{build_ilst, encode_items};

use buf::AtomBuf;
use head::*;
use ilst::parse_items;
use locate::*;
use metaitem::*;
use util::*;

#[macro_use]
mod util;

mod buf;
mod head;
/// A module for working with identifiers.
pub mod ident;
mod ilst;
mod locate;
mod meta;
mod metaitem;
mod moov;
mod udta;

/// The position of the movie atom inside a container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    /// The bounds of the first top level movie (`moov`) atom.
    pub moov: AtomBounds,
    /// The length of the container in bytes.
    pub file_len: u64,
    /// The end of the last complete top level atom.
    pub atoms_end: u64,
    /// Whether no top level atom follows the movie atom.
    pub moov_is_last: bool,
    /// The bounds of a last top level atom declared with a length of 0, which extends to the end
    /// of the container.
    pub open_ended: Option<AtomBounds>,
}

/// Walks the top level atoms of the container and locates the movie atom.
pub fn parse_layout(reader: &mut (impl Read + Seek)) -> crate::Result<Layout> {
    let file_len = reader.stream_length()?;
    let mut moov = None;
    let mut open_ended = None;
    let mut pos = 0;

    while file_len - pos >= HEAD_LEN {
        reader.set_position(pos)?;
        let head = parse_top_level_head(reader, file_len - pos)?;
        trace!("{pos}: top level '{}' {} bytes", head.fourcc(), head.len());

        if !head.ext() && head.len() == file_len - pos {
            reader.set_position(pos)?;
            if reader.read_be_u32()? == 0 {
                open_ended = Some(AtomBounds::new(pos, head));
            }
        }

        if head.fourcc() == MOVIE && moov.is_none() {
            moov = Some(AtomBounds::new(pos, head));
        }
        pos += head.len();
    }

    let moov = match moov {
        Some(m) => m,
        None => {
            return Err(crate::Error::new(
                ErrorKind::AtomNotFound(MOVIE),
                "No movie (moov) atom found",
            ));
        }
    };

    Ok(Layout { moov, file_len, atoms_end: pos, moov_is_last: moov.end() == pos, open_ended })
}

/// Replaces the item list of the container with the tags and commits the new movie atom.
///
/// If the movie atom is the last top level atom it is overwritten in place. Otherwise the old
/// movie atom is turned into a `free` atom and the new one is appended at the end of the
/// container. In both cases the container is truncated to the end of the new movie atom. A
/// following atom declared with a length of 0 is given its actual length first, so the appended
/// movie atom doesn't end up inside it.
pub(crate) fn write_tags(
    file: &mut impl FileLike,
    items: &[TagItem],
    cfg: &WriteConfig<'_>,
) -> crate::Result<()> {
    let layout = parse_layout(file)?;
    let moov = layout.moov;
    let content = moov::modify_moov(file, moov, items, cfg)?;

    let moov_len = match u32::try_from(HEAD_LEN + content.len() as u64) {
        Ok(l) => l,
        Err(_) => {
            return Err(crate::Error::new(
                ErrorKind::SizeOverflow,
                "Movie atom would exceed the 32 bit size limit",
            ));
        }
    };

    let pos = if layout.moov_is_last {
        debug!("overwriting movie atom at {} in place", moov.pos());
        moov.pos()
    } else {
        if let Some(open) = layout.open_ended {
            let len = match u32::try_from(open.len()) {
                Ok(l) => l,
                Err(_) => {
                    return Err(crate::Error::new(
                        ErrorKind::UnsupportedLayout,
                        format!(
                            "'{}' atom of {} bytes extends to the end of the file and can't be \
                            closed with a 32 bit length",
                            open.fourcc(),
                            open.len()
                        ),
                    ));
                }
            };
            debug!("closing '{}' atom at {} with a length of {len}", open.fourcc(), open.pos());
            file.set_position(open.pos())?;
            file.write_be_u32(len)?;
        }
        debug!("freeing movie atom at {}, appending new one at {}", moov.pos(), layout.atoms_end);
        file.set_position(moov.pos() + 4)?;
        file.write_fourcc(FREE)?;
        layout.atoms_end
    };

    file.set_position(pos)?;
    file.write_be_u32(moov_len)?;
    file.write_fourcc(MOVIE)?;
    file.write_all(&content)?;

    let end = pos + moov_len as u64;
    file.truncate(end)?;
    file.flush()?;
    debug!("container is now {end} bytes long");

    Ok(())
}

/// Reads the tags of the first item list found in the movie atom. A container without an item
/// list yields no tags.
pub(crate) fn read_tags(
    reader: &mut (impl Read + Seek),
    genres: &dyn GenreIndex,
) -> crate::Result<Vec<TagItem>> {
    let layout = parse_layout(reader)?;
    let chain = moov::locate_chain(reader, layout.moov)?;

    match chain.ilst {
        Some(ilst) => parse_items(reader, ilst, genres),
        None => {
            debug!("no item list found");
            Ok(Vec::new())
        }
    }
}
