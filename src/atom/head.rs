use std::io::Read;
use std::ops::Deref;

use super::util::ReadUtil;
use super::*;

/// Length of a standard atom head.
pub const HEAD_LEN: u64 = 8;

/// A head specifying the size and type of an atom.
///
/// ```md
/// 4 bytes standard length
/// 4 bytes identifier
/// 8 bytes optional extended length
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Head {
    /// Whether the head is extended (16 bytes) with a 64 bit length.
    ext: bool,
    /// The length including this head.
    len: u64,
    /// The identifier.
    fourcc: Fourcc,
}

impl Head {
    pub const fn new(ext: bool, len: u64, fourcc: Fourcc) -> Self {
        Self { ext, len, fourcc }
    }

    pub const fn ext(&self) -> bool {
        self.ext
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn fourcc(&self) -> Fourcc {
        self.fourcc
    }

    pub const fn head_len(&self) -> u64 {
        match self.ext {
            true => 16,
            false => HEAD_LEN,
        }
    }

    pub const fn content_len(&self) -> u64 {
        self.len - self.head_len()
    }
}

/// Reads a standard head consisting of a 32 bit big endian length followed by the 4 byte
/// identifier. The length is returned as declared, it's up to the caller to validate it.
pub fn parse_head(reader: &mut impl Read) -> crate::Result<Head> {
    let len = match reader.read_be_u32() {
        Ok(l) => l as u64,
        Err(e) => {
            return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom length"));
        }
    };
    let fourcc = match reader.read_fourcc() {
        Ok(f) => f,
        Err(e) => {
            return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom identifier"));
        }
    };

    Ok(Head::new(false, len, fourcc))
}

/// Reads a top level head. A 32 bit length of 1 is followed by an extended 64 bit length, a
/// length of 0 means the atom extends to the end of the file, which is `remaining` bytes away
/// from the start of the head.
pub fn parse_top_level_head(reader: &mut impl Read, remaining: u64) -> crate::Result<Head> {
    let head = parse_head(reader)?;

    let head = match head.len() {
        0 => Head::new(false, remaining, head.fourcc()),
        1 => match reader.read_be_u64() {
            Ok(l) => Head::new(true, l, head.fourcc()),
            Err(e) => {
                return Err(crate::Error::new(
                    ErrorKind::Io(e),
                    "Error reading extended atom length",
                ));
            }
        },
        _ => head,
    };

    if head.len() < head.head_len() {
        return Err(crate::Error::new(
            ErrorKind::InvalidAtomSize,
            format!("Read length of '{}' which is less than its head: {}", head.fourcc(), head.len()),
        ));
    }
    if head.len() > remaining {
        return Err(crate::Error::new(
            ErrorKind::InvalidAtomSize,
            format!(
                "Length of '{}' ({}) exceeds the remaining {} bytes",
                head.fourcc(),
                head.len(),
                remaining
            ),
        ));
    }

    Ok(head)
}

/// A struct storing the position and head of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AtomBounds {
    pos: u64,
    head: Head,
}

impl Deref for AtomBounds {
    type Target = Head;

    fn deref(&self) -> &Self::Target {
        &self.head
    }
}

impl AtomBounds {
    pub const fn new(pos: u64, head: Head) -> Self {
        Self { pos, head }
    }

    pub const fn pos(&self) -> u64 {
        self.pos
    }

    pub const fn head(&self) -> Head {
        self.head
    }

    pub const fn content_pos(&self) -> u64 {
        self.pos + self.head.head_len()
    }

    pub const fn end(&self) -> u64 {
        self.pos + self.head.len()
    }
}
