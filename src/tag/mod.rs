use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use lazy_static::lazy_static;
use log::debug;

use crate::atom::{self, Fourcc};
use crate::{FileLike, GenreIndex, WriteConfig};

pub mod genre;
pub mod tuple;

/// A metadata tag consisting of a name and a string value.
///
/// Names are matched ignoring ASCII case. Names that are neither one of the [`STANDARD_NAMES`]
/// nor one of the numbered or genre names (`tracknumber`, `track`, `totaltracks`, `discnumber`,
/// `disc`, `totaldiscs`, `tempo`, `genre`) are stored as freeform items under their literal name.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TagItem {
    /// The name of the tag.
    pub name: String,
    /// The value of the tag.
    pub value: String,
}

impl TagItem {
    /// Creates a tag item from the name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for TagItem {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Tag names stored in an atom of their own and the identifiers of those atoms.
pub const STANDARD_NAMES: [(&str, Fourcc); 9] = [
    ("title", atom::TITLE),
    ("artist", atom::ARTIST),
    ("album", atom::ALBUM),
    ("date", atom::YEAR),
    ("comment", atom::COMMENT),
    ("tool", atom::ENCODER),
    ("writer", atom::COMPOSER),
    ("compilation", atom::COMPILATION),
    ("cover", atom::ARTWORK),
];

/// Tags with a dedicated encoding. Only the first occurrence of each is written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Special {
    TrackNumber,
    TotalTracks,
    DiscNumber,
    TotalDiscs,
    Tempo,
    Genre,
}

const SPECIAL_COUNT: usize = 6;

impl Special {
    /// The name tags of this kind are read back with.
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::TrackNumber => "tracknumber",
            Self::TotalTracks => "totaltracks",
            Self::DiscNumber => "discnumber",
            Self::TotalDiscs => "totaldiscs",
            Self::Tempo => "tempo",
            Self::Genre => "genre",
        }
    }
}

lazy_static! {
    static ref SPECIAL_NAMES: HashMap<&'static str, Special> = [
        ("tracknumber", Special::TrackNumber),
        ("track", Special::TrackNumber),
        ("totaltracks", Special::TotalTracks),
        ("discnumber", Special::DiscNumber),
        ("disc", Special::DiscNumber),
        ("totaldiscs", Special::TotalDiscs),
        ("tempo", Special::Tempo),
        ("genre", Special::Genre),
    ]
    .into_iter()
    .collect();
    static ref STANDARD_FOURCCS: HashMap<&'static str, Fourcc> =
        STANDARD_NAMES.into_iter().collect();
}

/// How a tag is stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Kind {
    Special(Special),
    Standard(Fourcc),
    Freeform,
}

/// Classifies a tag by its name, ignoring ASCII case.
pub(crate) fn kind_of(name: &str) -> Kind {
    let name = name.to_ascii_lowercase();
    if let Some(s) = SPECIAL_NAMES.get(name.as_str()) {
        return Kind::Special(*s);
    }
    match STANDARD_FOURCCS.get(name.as_str()) {
        Some(f) => Kind::Standard(*f),
        None => Kind::Freeform,
    }
}

/// Returns the standard name of the atom identifier, if any.
pub(crate) fn standard_name(fourcc: Fourcc) -> Option<&'static str> {
    STANDARD_NAMES.iter().find(|(_, f)| *f == fourcc).map(|(n, _)| *n)
}

/// A tag list split into the first value of each special tag and the remaining tags in their
/// original order. Remaining tags carry their standard atom identifier, or `None` if they are
/// freeform.
#[derive(Debug)]
pub(crate) struct Arranged<'a> {
    special: [Option<&'a str>; SPECIAL_COUNT],
    pub remaining: Vec<(&'a TagItem, Option<Fourcc>)>,
}

impl<'a> Arranged<'a> {
    pub fn get(&self, special: Special) -> Option<&'a str> {
        self.special[special as usize]
    }
}

pub(crate) fn arrange(items: &[TagItem]) -> Arranged<'_> {
    let mut arranged = Arranged { special: [None; SPECIAL_COUNT], remaining: Vec::new() };

    for item in items {
        match kind_of(&item.name) {
            Kind::Special(s) => match &mut arranged.special[s as usize] {
                Some(_) => debug!("dropping duplicate '{}' tag", item.name),
                slot => *slot = Some(item.value.as_str()),
            },
            Kind::Standard(f) => arranged.remaining.push((item, Some(f))),
            Kind::Freeform => arranged.remaining.push((item, None)),
        }
    }

    arranged
}

/// Attempts to replace the metadata of the container with the tags, using the default
/// [`WriteConfig`].
///
/// # Example
/// ```no_run
/// use std::fs::OpenOptions;
/// use mp4ilst::TagItem;
///
/// let mut file = OpenOptions::new().read(true).write(true).open("music.m4a").unwrap();
/// let tags = [TagItem::new("title", "Title"), TagItem::new("tracknumber", "3/12")];
/// mp4ilst::update_tags(&mut file, &tags).unwrap();
/// ```
pub fn update_tags(file: &mut impl FileLike, items: &[TagItem]) -> crate::Result<()> {
    update_tags_with(file, items, &WriteConfig::DEFAULT)
}

/// Attempts to replace the metadata of the container with the tags, using the config.
///
/// All tags previously stored in the item list are removed. The container is only written to
/// once the new movie atom has been assembled in memory.
pub fn update_tags_with(
    file: &mut impl FileLike,
    items: &[TagItem],
    cfg: &WriteConfig<'_>,
) -> crate::Result<()> {
    atom::write_tags(file, items, cfg)
}

/// Attempts to replace the metadata of the file at the path with the tags, using the default
/// [`WriteConfig`].
pub fn update_tags_at_path(path: impl AsRef<Path>, items: &[TagItem]) -> crate::Result<()> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    update_tags(&mut file, items)
}

/// Returns the encoded item list (`ilst`) atom for the tags, without touching any container.
pub fn encode_ilst(items: &[TagItem], cfg: &WriteConfig<'_>) -> crate::Result<Vec<u8>> {
    let body = atom::encode_items(items, cfg)?;
    atom::build_ilst(&body)
}

/// Attempts to read the tags stored in the item list of the container. Genres are resolved
/// using the standard genre list.
pub fn read_tags(reader: &mut (impl Read + Seek)) -> crate::Result<Vec<TagItem>> {
    read_tags_with(reader, &genre::StandardGenres)
}

/// Attempts to read the tags stored in the item list of the container, resolving genre codes
/// with the vocabulary.
pub fn read_tags_with(
    reader: &mut (impl Read + Seek),
    genres: &dyn GenreIndex,
) -> crate::Result<Vec<TagItem>> {
    atom::read_tags(reader, genres)
}

/// Attempts to read the tags stored in the item list of the file at the path.
pub fn read_tags_from_path(path: impl AsRef<Path>) -> crate::Result<Vec<TagItem>> {
    let mut file = BufReader::new(File::open(path)?);
    read_tags(&mut file)
}
