//! An append only staging buffer used to assemble atoms in memory.
//!
//! Once a write fails the buffer keeps the first error and ignores all following writes, which
//! then return 0. The error is reported by [`AtomBuf::detach`], so a sequence of writes only needs
//! to be checked once at the end.
use std::io::{self, Read};

use super::head::HEAD_LEN;
use super::*;

/// The capacity allocated on the first growth.
const MIN_CAPACITY: usize = 64;

#[derive(Debug, Default)]
pub struct AtomBuf {
    data: Vec<u8>,
    err: Option<crate::Error>,
}

impl AtomBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with exactly `capacity` bytes allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buf = Self::new();
        if let Err(e) = buf.data.try_reserve_exact(capacity) {
            buf.fail(e.into());
        }
        buf
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns whether a previous write has failed.
    pub fn is_err(&self) -> bool {
        self.err.is_some()
    }

    fn fail(&mut self, err: crate::Error) {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self.data = Vec::new();
    }

    /// Makes room for `additional` bytes, doubling the capacity until it suffices.
    fn grow(&mut self, additional: usize) -> bool {
        if self.err.is_some() {
            return false;
        }

        let needed = match self.data.len().checked_add(additional) {
            Some(n) => n,
            None => {
                self.fail(crate::Error::new(
                    ErrorKind::SizeOverflow,
                    "Staging buffer length overflows usize",
                ));
                return false;
            }
        };
        if needed <= self.data.capacity() {
            return true;
        }

        let mut capacity = self.data.capacity().max(MIN_CAPACITY);
        while capacity < needed {
            capacity = capacity.checked_mul(2).unwrap_or(needed);
        }

        match self.data.try_reserve_exact(capacity - self.data.len()) {
            Ok(()) => true,
            Err(e) => {
                self.fail(e.into());
                false
            }
        }
    }

    /// Appends raw bytes.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if !self.grow(bytes.len()) {
            return 0;
        }
        self.data.extend_from_slice(bytes);
        bytes.len()
    }

    pub fn write_u8(&mut self, val: u8) -> usize {
        self.write(&[val])
    }

    pub fn write_u16(&mut self, val: u16) -> usize {
        self.write(&val.to_be_bytes())
    }

    /// Appends the lower 24 bits of `val` in big endian order.
    pub fn write_u24(&mut self, val: u32) -> usize {
        self.write(&val.to_be_bytes()[1..])
    }

    pub fn write_u32(&mut self, val: u32) -> usize {
        self.write(&val.to_be_bytes())
    }

    pub fn write_fourcc(&mut self, fourcc: Fourcc) -> usize {
        self.write(&*fourcc)
    }

    /// Appends an atom head for an atom with `content_len` bytes of content.
    pub fn write_head(&mut self, fourcc: Fourcc, content_len: u64) -> usize {
        match u32::try_from(content_len + HEAD_LEN) {
            Ok(len) => self.write_u32(len) + self.write_fourcc(fourcc),
            Err(_) => {
                self.fail(crate::Error::new(
                    ErrorKind::SizeOverflow,
                    format!("Atom '{fourcc}' with {content_len} bytes of content exceeds 4 GiB"),
                ));
                0
            }
        }
    }

    /// Appends a complete atom: the length of `payload` plus the head length, the identifier and
    /// the payload.
    pub fn write_atom(&mut self, fourcc: Fourcc, payload: &[u8]) -> usize {
        let head = self.write_head(fourcc, payload.len() as u64);
        if head == 0 {
            return 0;
        }
        head + self.write(payload)
    }

    /// Copies `count` bytes from the current position of `reader`, advancing it.
    pub fn write_from(&mut self, reader: &mut impl Read, count: u64) -> usize {
        let len = match usize::try_from(count) {
            Ok(l) => l,
            Err(_) => {
                self.fail(crate::Error::new(
                    ErrorKind::SizeOverflow,
                    format!("Can't stage {count} bytes in memory"),
                ));
                return 0;
            }
        };
        if !self.grow(len) {
            return 0;
        }

        match reader.take(count).read_to_end(&mut self.data) {
            Ok(read) if read == len => len,
            Ok(read) => {
                self.fail(crate::Error::new(
                    ErrorKind::Io(io::Error::from(io::ErrorKind::UnexpectedEof)),
                    format!("Container ended after {read} of {count} bytes"),
                ));
                0
            }
            Err(e) => {
                self.fail(crate::Error::new(ErrorKind::Io(e), "Error copying container bytes"));
                0
            }
        }
    }

    /// Consumes the buffer and returns its bytes, shrunk to the written length, or the first
    /// error that occurred while writing.
    pub fn detach(self) -> crate::Result<Vec<u8>> {
        match self.err {
            Some(e) => Err(e),
            None => {
                let mut data = self.data;
                data.shrink_to_fit();
                Ok(data)
            }
        }
    }
}
