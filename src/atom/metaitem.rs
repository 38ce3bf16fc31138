//! A meta item can either have a plain fourcc as it's identifier:
//! **** (any fourcc)
//! └─ data
//!
//! Or it can contain a mean and name children atom which make up the identifier.
//! ---- (freeform fourcc)
//! ├─ mean
//! ├─ name
//! └─ data
use std::borrow::Cow;

use super::head::HEAD_LEN;
use super::*;

// [Table 3-5 Well-known data types](https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/Metadata/Metadata.html#//apple_ref/doc/uid/TP40000939-CH1-SW34) codes
/// Reserved for use where no type needs to be indicated.
pub const RESERVED: u32 = 0;
/// UTF-8 without any count or NULL terminator.
pub const UTF8: u32 = 1;

/// Head, version, datatype and locale of a data atom.
pub const DATA_HEAD_LEN: u64 = HEAD_LEN + 8;
/// Head, version and flags of a mean or name atom.
const FULL_HEAD_LEN: u64 = HEAD_LEN + 4;

/// A single item of the item list, borrowing its strings from the caller's tags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetaItem<'a> {
    /// A number and total pair (`trkn`, `disk`).
    Tuple { fourcc: Fourcc, number: u16, total: u16 },
    /// A 16 bit big endian integer (`tmpo`, `gnre`).
    Int16 { fourcc: Fourcc, value: u16 },
    /// Typed data stored under a plain fourcc.
    Data { fourcc: Fourcc, datatype: u32, data: Cow<'a, [u8]> },
    /// UTF-8 data stored under a mean and name.
    Freeform { mean: &'a str, name: &'a str, value: &'a str },
}

impl MetaItem<'_> {
    /// Returns the identifier the item is written with.
    pub fn fourcc(&self) -> Fourcc {
        match self {
            Self::Tuple { fourcc, .. } => *fourcc,
            Self::Int16 { fourcc, .. } => *fourcc,
            Self::Data { fourcc, .. } => *fourcc,
            Self::Freeform { .. } => FREEFORM,
        }
    }

    /// Returns the length of the raw data inside the data atom.
    fn data_len(&self) -> u64 {
        match self {
            Self::Tuple { .. } => 8,
            Self::Int16 { .. } => 2,
            Self::Data { data, .. } => data.len() as u64,
            Self::Freeform { value, .. } => value.len() as u64,
        }
    }

    /// Returns the external length of the atom in bytes.
    pub fn len(&self) -> u64 {
        let parent_len = HEAD_LEN;
        let data_len = DATA_HEAD_LEN + self.data_len();

        match self {
            Self::Freeform { mean, name, .. } => {
                let mean_len = FULL_HEAD_LEN + mean.len() as u64;
                let name_len = FULL_HEAD_LEN + name.len() as u64;

                parent_len + mean_len + name_len + data_len
            }
            _ => parent_len + data_len,
        }
    }

    /// Appends the item to the buffer.
    pub fn write(&self, buf: &mut AtomBuf) {
        let start = buf.len();
        buf.write_head(self.fourcc(), self.len() - HEAD_LEN);

        match self {
            Self::Tuple { number, total, .. } => {
                write_data_head(buf, RESERVED, self.data_len());
                buf.write_u16(0);
                buf.write_u16(*number);
                buf.write_u16(*total);
                buf.write_u16(0);
            }
            Self::Int16 { value, .. } => {
                write_data_head(buf, RESERVED, self.data_len());
                buf.write_u16(*value);
            }
            Self::Data { datatype, data, .. } => {
                write_data_head(buf, *datatype, self.data_len());
                buf.write(data);
            }
            Self::Freeform { mean, name, value } => {
                buf.write_head(MEAN, 4 + mean.len() as u64);
                buf.write_u32(0);
                buf.write(mean.as_bytes());

                buf.write_head(NAME, 4 + name.len() as u64);
                buf.write_u32(0);
                buf.write(name.as_bytes());

                write_data_head(buf, UTF8, self.data_len());
                buf.write(value.as_bytes());
            }
        }

        debug_assert!(buf.is_err() || (buf.len() - start) as u64 == self.len());
    }
}

/// Writes the head of a data atom: 1 byte version, 3 bytes datatype and a 4 byte locale.
fn write_data_head(buf: &mut AtomBuf, datatype: u32, data_len: u64) {
    buf.write_head(DATA, 8 + data_len);
    buf.write_u8(0);
    buf.write_u24(datatype);
    buf.write_u32(0);
}
