//! A library for rewriting the iTunes style metadata item list of MPEG-4 audio files.
//!
//! The item list (`moov.udta.meta.ilst`) of a container is replaced by a list of name and value
//! pairs. All other bytes of the container are preserved, missing atoms of the chain are created.
//!
//! # Examples
//!
//! ## Updating a file
//! ```no_run
//! use mp4ilst::TagItem;
//!
//! let tags = [
//!     TagItem::new("title", "Title"),
//!     TagItem::new("artist", "Artist"),
//!     TagItem::new("tracknumber", "3/12"),
//!     TagItem::new("genre", "Rock"),
//! ];
//! mp4ilst::update_tags_at_path("music.m4a", &tags).unwrap();
//!
//! for tag in mp4ilst::read_tags_from_path("music.m4a").unwrap() {
//!     println!("{}: {}", tag.name, tag.value);
//! }
//! ```
//!
//! ## Using a custom config
//! ```no_run
//! use std::borrow::Cow;
//! use std::fs::OpenOptions;
//! use mp4ilst::{TagItem, WriteConfig};
//!
//! let cfg = WriteConfig {
//!     handler: true,
//!     freeform_mean: Cow::Borrowed("org.example"),
//!     ..WriteConfig::DEFAULT
//! };
//! let mut file = OpenOptions::new().read(true).write(true).open("music.m4a").unwrap();
//! mp4ilst::update_tags_with(&mut file, &[TagItem::new("MyVendorExt", "42")], &cfg).unwrap();
//! ```
#![warn(missing_docs)]

pub use crate::atom::{parse_layout, Fourcc, Layout, APPLE_ITUNES_MEAN};
pub use crate::config::WriteConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::tag::genre::{GenreIndex, StandardGenres, STANDARD_GENRES};
pub use crate::tag::{
    encode_ilst, read_tags, read_tags_from_path, read_tags_with, update_tags, update_tags_at_path,
    update_tags_with, TagItem, STANDARD_NAMES,
};
pub use crate::util::{FileLike, Truncate};

/// A module for working with atoms.
pub mod atom;

mod config;
mod error;
mod tag;
mod util;
