use std::io::{self, Read, Seek, SeekFrom, Write};

use super::Fourcc;

pub trait ReadUtil: Read {
    /// Attempts to read an unsigned 32 bit big endian integer from the reader.
    fn read_be_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Attempts to read an unsigned 64 bit big endian integer from the reader.
    fn read_be_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Attempts to read a four character code from the reader.
    fn read_fourcc(&mut self) -> io::Result<Fourcc> {
        let mut fourcc = Fourcc([0; 4]);
        self.read_exact(&mut *fourcc)?;
        Ok(fourcc)
    }

    /// Attempts to read 8 bit unsigned integers from the reader to a vector of size length.
    fn read_u8_vec(&mut self, len: u64) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.take(len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        Ok(buf)
    }
}

impl<T: Read> ReadUtil for T {}

pub trait SeekUtil: Seek {
    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn set_position(&mut self, pos: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn stream_length(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(len)
    }
}

impl<T: Seek> SeekUtil for T {}

pub trait WriteUtil: Write {
    fn write_be_u32(&mut self, val: u32) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_fourcc(&mut self, fourcc: Fourcc) -> io::Result<()> {
        self.write_all(&*fourcc)
    }
}

impl<T: Write> WriteUtil for T {}

/// Writes `val` as a big endian u32 at `index`. Atom size fields are always patched through this.
pub fn set_be_u32(bytes: &mut [u8], index: usize, val: u32) {
    bytes[index..index + 4].copy_from_slice(&val.to_be_bytes());
}

/// Attempts to read a big endian integer at the specified index from a byte slice.
macro_rules! be_int {
    ($bytes:expr, $index:expr, $type:ty) => {{
        use std::convert::TryFrom;

        const SIZE: usize = std::mem::size_of::<$type>();
        let bytes_start = ($index);
        let bytes_end = ($index) + SIZE;

        if $bytes.len() < bytes_end {
            None
        } else {
            let be_bytes = <[u8; SIZE]>::try_from(&$bytes[bytes_start..bytes_end]);

            match be_bytes {
                Ok(b) => Some(<$type>::from_be_bytes(b)),
                Err(_) => None,
            }
        }
    }};
}
