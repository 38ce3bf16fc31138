//! Linear scans over size delimited sibling atoms.
use std::io::{Read, Seek};

use log::trace;

use super::head::HEAD_LEN;
use super::*;

/// The result of searching for an outer atom containing an inner atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Nested {
    /// The first outer atom whose content contains the inner atom.
    Both { outer: AtomBounds, inner: AtomBounds },
    /// Outer atoms exist but none contains the inner atom. Holds the first outer atom.
    OuterOnly(AtomBounds),
    /// No outer atom exists.
    NotFound,
}

/// Reads the head at the current position and checks it against the `remaining` bytes of the
/// enclosing range.
fn next_head(reader: &mut impl Read, pos: u64, remaining: u64) -> crate::Result<Head> {
    let head = parse_head(reader)?;
    trace!("{pos}: '{}' {} bytes", head.fourcc(), head.len());

    if head.len() < HEAD_LEN {
        return Err(crate::Error::new(
            ErrorKind::InvalidAtomSize,
            format!("Read length of '{}' which is less than 8 bytes: {}", head.fourcc(), head.len()),
        ));
    }
    if head.len() > remaining {
        return Err(crate::Error::new(
            ErrorKind::InvalidAtomSize,
            format!(
                "Length of '{}' ({}) exceeds the remaining {} bytes of its parent",
                head.fourcc(),
                head.len(),
                remaining
            ),
        ));
    }

    Ok(head)
}

/// Searches the `len` bytes starting at `start` for the first atom identified by `fourcc`.
///
/// On success the reader is left at the start of the found atom's head. Fewer than 8 trailing
/// bytes are treated as padding that ends the list, a declared length below 8 or beyond the
/// remaining range is an error.
pub fn find(
    reader: &mut (impl Read + Seek),
    start: u64,
    len: u64,
    fourcc: Fourcc,
) -> crate::Result<Option<AtomBounds>> {
    let mut pos = start;
    let mut remaining = len;
    reader.set_position(pos)?;

    while remaining >= HEAD_LEN {
        let head = next_head(reader, pos, remaining)?;

        if head.fourcc() == fourcc {
            reader.set_position(pos)?;
            return Ok(Some(AtomBounds::new(pos, head)));
        }

        pos += head.len();
        remaining -= head.len();
        reader.set_position(pos)?;
    }

    Ok(None)
}

/// Collects the bounds of all atoms in the `len` bytes starting at `start`, validating them like
/// [`find`].
pub fn children(
    reader: &mut (impl Read + Seek),
    start: u64,
    len: u64,
) -> crate::Result<Vec<AtomBounds>> {
    let mut atoms = Vec::new();
    let mut pos = start;
    let mut remaining = len;

    while remaining >= HEAD_LEN {
        reader.set_position(pos)?;
        let head = next_head(reader, pos, remaining)?;
        atoms.push(AtomBounds::new(pos, head));

        pos += head.len();
        remaining -= head.len();
    }

    Ok(atoms)
}

/// Returns the end of the last complete atom in the `len` bytes starting at `start`, or `start`
/// if there is none. Trailing padding, like the 32 bit zero terminating some user data lists,
/// lies behind this position.
pub fn children_end(reader: &mut (impl Read + Seek), start: u64, len: u64) -> crate::Result<u64> {
    let atoms = children(reader, start, len)?;
    Ok(atoms.last().map_or(start, |a| a.end()))
}

/// Searches the `len` bytes starting at `start` for an `outer` atom that contains an `inner`
/// atom, skipping `extra_head_len` bytes of the outer atom's own header before searching its
/// content.
///
/// The first outer atom containing the inner atom wins. If no outer atom contains it the first
/// outer atom is returned as [`Nested::OuterOnly`]. In both cases the reader is left at the start
/// of the returned outer atom. An outer atom too small to hold `extra_head_len` ends the scan with
/// an error.
pub fn find_nested(
    reader: &mut (impl Read + Seek),
    start: u64,
    len: u64,
    outer: Fourcc,
    extra_head_len: u64,
    inner: Fourcc,
) -> crate::Result<Nested> {
    let mut first = None;
    let mut pos = start;
    let mut remaining = len;

    while let Some(candidate) = find(reader, pos, remaining, outer)? {
        if first.is_none() {
            first = Some(candidate);
        }

        if candidate.len() < HEAD_LEN + extra_head_len {
            return Err(crate::Error::new(
                ErrorKind::UnsupportedLayout,
                format!(
                    "'{}' atom of {} bytes is too small to hold its {} byte header",
                    outer,
                    candidate.len(),
                    HEAD_LEN + extra_head_len
                ),
            ));
        }

        let content_start = candidate.content_pos() + extra_head_len;
        let content_len = candidate.len() - HEAD_LEN - extra_head_len;
        if let Some(found) = find(reader, content_start, content_len, inner)? {
            reader.set_position(candidate.pos())?;
            return Ok(Nested::Both { outer: candidate, inner: found });
        }

        remaining -= candidate.end() - pos;
        pos = candidate.end();
    }

    match first {
        Some(outer) => {
            reader.set_position(outer.pos())?;
            Ok(Nested::OuterOnly(outer))
        }
        None => Ok(Nested::NotFound),
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
        let mut buf = ((content.len() + 8) as u32).to_be_bytes().to_vec();
        buf.extend(fourcc);
        buf.extend(content);
        buf
    }

    #[test]
    fn find_second_sibling() {
        let mut bytes = atom(b"mvhd", &[0; 12]);
        bytes.extend(atom(b"udta", &[]));
        let mut reader = Cursor::new(bytes);

        let udta = find(&mut reader, 0, 28, USER_DATA).unwrap().unwrap();
        assert_eq!(udta.pos(), 20);
        assert_eq!(udta.len(), 8);
        assert_eq!(reader.position(), 20);
    }

    #[test]
    fn find_respects_range() {
        let mut bytes = atom(b"mvhd", &[0; 12]);
        bytes.extend(atom(b"udta", &[]));
        let mut reader = Cursor::new(bytes);

        assert_eq!(find(&mut reader, 0, 20, USER_DATA).unwrap(), None);
    }

    #[test]
    fn find_ignores_trailing_padding() {
        let mut bytes = atom(b"mvhd", &[0; 12]);
        bytes.extend([0; 4]);
        let mut reader = Cursor::new(bytes);

        assert_eq!(find(&mut reader, 0, 24, USER_DATA).unwrap(), None);
    }

    #[test]
    fn find_rejects_overrun() {
        let mut bytes = atom(b"mvhd", &[0; 12]);
        bytes[3] = 0x40;
        let mut reader = Cursor::new(bytes);

        let err = find(&mut reader, 0, 20, USER_DATA).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
    }

    #[test]
    fn find_rejects_short_length() {
        let mut reader = Cursor::new(b"\x00\x00\x00\x07udta\x00\x00".to_vec());

        let err = find(&mut reader, 0, 10, USER_DATA).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
    }

    #[test]
    fn list_children() {
        let mut bytes = atom(b"\xa9nam", &[0; 4]);
        bytes.extend(atom(b"free", &[]));
        bytes.extend(atom(b"trkn", &[0; 16]));
        let mut reader = Cursor::new(bytes);

        let atoms = children(&mut reader, 0, 44).unwrap();
        let fourccs: Vec<_> = atoms.iter().map(|a| a.fourcc()).collect();
        assert_eq!(fourccs, [TITLE, FREE, TRACK_NUMBER]);
        assert_eq!(atoms[2].pos(), 20);
        assert_eq!(atoms[2].content_len(), 16);
    }

    #[test]
    fn end_before_padding() {
        let mut bytes = atom(b"name", b"x");
        bytes.extend([0; 4]);
        let mut reader = Cursor::new(bytes);

        assert_eq!(children_end(&mut reader, 0, 13).unwrap(), 9);
        assert_eq!(children_end(&mut reader, 9, 4).unwrap(), 9);
    }

    #[test]
    fn nested_first_matching_branch_wins() {
        let mut bytes = atom(b"udta", &atom(b"name", b"x"));
        bytes.extend(atom(b"udta", &atom(b"meta", &[0; 4])));
        bytes.extend(atom(b"udta", &atom(b"meta", &[0; 8])));
        let len = bytes.len() as u64;
        let mut reader = Cursor::new(bytes);

        let nested = find_nested(&mut reader, 0, len, USER_DATA, 0, METADATA).unwrap();
        match nested {
            Nested::Both { outer, inner } => {
                assert_eq!(outer.pos(), 17);
                assert_eq!(inner.pos(), 25);
                assert_eq!(inner.len(), 12);
            }
            n => panic!("expected both atoms, found {n:?}"),
        }
        assert_eq!(reader.position(), 17);
    }

    #[test]
    fn nested_outer_only_falls_back_to_first() {
        let mut bytes = atom(b"udta", &atom(b"name", b"x"));
        bytes.extend(atom(b"udta", &[]));
        let len = bytes.len() as u64;
        let mut reader = Cursor::new(bytes);

        let nested = find_nested(&mut reader, 0, len, USER_DATA, 0, METADATA).unwrap();
        assert!(matches!(nested, Nested::OuterOnly(b) if b.pos() == 0 && b.len() == 17));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn nested_skips_extra_head() {
        // the version and flags of meta must not be mistaken for a child
        let bytes = atom(b"meta", &[&[0, 0, 0, 0][..], &atom(b"ilst", &[])[..]].concat());
        let mut reader = Cursor::new(bytes);

        let nested = find_nested(&mut reader, 0, 20, METADATA, 4, ITEM_LIST).unwrap();
        assert!(matches!(nested, Nested::Both { inner, .. } if inner.pos() == 12));
    }

    #[test]
    fn nested_not_found() {
        let bytes = atom(b"mvhd", &[0; 12]);
        let mut reader = Cursor::new(bytes);

        let nested = find_nested(&mut reader, 0, 20, USER_DATA, 0, METADATA).unwrap();
        assert_eq!(nested, Nested::NotFound);
    }

    #[test]
    fn nested_outer_too_small() {
        let bytes = atom(b"meta", &[0, 0]);
        let mut reader = Cursor::new(bytes);

        let err = find_nested(&mut reader, 0, 10, METADATA, 4, ITEM_LIST).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedLayout));
    }
}
