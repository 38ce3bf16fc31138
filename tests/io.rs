use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use mp4ilst::{ErrorKind, TagItem, Truncate};
use walkdir::WalkDir;

mod common;
use common::*;

const EXTENSIONS: [&str; 6] = [".m4a", ".m4b", ".m4p", ".m4v", ".mp4", ".3gp"];

fn read_dir(path: &str, fun: impl Fn(&Path)) {
    for d in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.metadata().map(|m| m.is_file()).unwrap_or(false))
    {
        let filename = d.file_name().to_string_lossy();
        if !EXTENSIONS.iter().any(|e| filename.ends_with(e)) {
            continue;
        }

        let filepath = d.into_path();
        println!("{}:", filepath.display());
        fun(&filepath);
    }
}

#[track_caller]
fn update(bytes: &[u8], tags: &[TagItem]) -> Vec<u8> {
    let mut file = Cursor::new(bytes.to_vec());
    mp4ilst::update_tags(&mut file, tags).unwrap();
    file.into_inner()
}

#[track_caller]
fn update_err(bytes: &[u8], tags: &[TagItem]) -> mp4ilst::Error {
    let mut file = Cursor::new(bytes.to_vec());
    let err = mp4ilst::update_tags(&mut file, tags).unwrap_err();
    assert_eq!(file.get_ref(), bytes, "container was modified");
    err
}

#[track_caller]
fn read(bytes: &[u8]) -> Vec<TagItem> {
    mp4ilst::read_tags(&mut Cursor::new(bytes)).unwrap()
}

#[test]
fn replace_item_list() {
    let old_ilst = atom(b"ilst", &data_item(b"\xa9nam", b"A"));
    let old_moov = moov(&atom(b"udta", &meta(&old_ilst)));
    let bytes = [ftyp(), mdat(), old_moov.clone()].concat();

    let tags = [TagItem::new("title", "B"), TagItem::new("tracknumber", "3")];
    let new = update(&bytes, &tags);

    let moov_pos = ftyp().len() + mdat().len();
    assert_eq!(&new[..moov_pos], &bytes[..moov_pos]);
    let atoms = top_level(&new);
    assert_eq!(fourccs(&atoms), [*b"ftyp", *b"mdat", *b"moov"]);

    let items = ilst_items(&new);
    assert_eq!(fourccs(&items), [*b"trkn", *b"\xa9nam"]);
    let (trkn, _, _) = items[0];
    assert_eq!(&new[trkn + 24..trkn + 32], &[0, 0, 0, 3, 0, 0, 0, 0]);
    let (nam, _, nam_len) = items[1];
    assert_eq!(&new[nam + 24..nam + nam_len], b"B");

    let (_, new_ilst_len) = find_path(&new, &[b"moov", b"udta", b"meta", b"ilst"]).unwrap();
    let delta = new_ilst_len as i64 - old_ilst.len() as i64;
    assert_eq!(atoms[2].2 as i64, old_moov.len() as i64 + delta);
    assert_eq!(new.len(), moov_pos + atoms[2].2);

    assert_eq!(read(&new), [TagItem::new("tracknumber", "3"), TagItem::new("title", "B")]);
}

#[test]
fn ancestors_grow_by_delta() {
    let name = atom(b"name", b"some name");
    let hdlr = atom(b"hdlr", &[0; 25]);
    let old_ilst = atom(b"ilst", &data_item(b"\xa9ART", b"Artist"));
    let old_meta = meta(&[&hdlr[..], &old_ilst[..]].concat());
    let old_udta = atom(b"udta", &[&name[..], &old_meta[..]].concat());
    let bytes = [ftyp(), mdat(), moov(&old_udta)].concat();

    let tags = [
        TagItem::new("artist", "Another Artist"),
        TagItem::new("album", "Album"),
        TagItem::new("ISRC", "USRC17607839"),
    ];
    let new = update(&bytes, &tags);

    let (_, udta_len) = find_path(&new, &[b"moov", b"udta"]).unwrap();
    let (_, meta_len) = find_path(&new, &[b"moov", b"udta", b"meta"]).unwrap();
    let (_, ilst_len) = find_path(&new, &[b"moov", b"udta", b"meta", b"ilst"]).unwrap();
    let delta = ilst_len - old_ilst.len();

    assert_eq!(udta_len, old_udta.len() + delta);
    assert_eq!(meta_len, old_meta.len() + delta);

    // siblings in front of the item list are preserved
    let (udta_pos, _) = find_path(&new, &[b"moov", b"udta"]).unwrap();
    assert_eq!(&new[udta_pos + 8..udta_pos + 8 + name.len()], &name[..]);
    let (hdlr_pos, hdlr_len) = find_path(&new, &[b"moov", b"udta", b"meta", b"hdlr"]).unwrap();
    assert_eq!(&new[hdlr_pos..hdlr_pos + hdlr_len], &hdlr[..]);
}

#[test]
fn append_movie_to_fast_start_container() {
    let old_moov = moov(&[]);
    let bytes = [ftyp(), old_moov.clone(), mdat()].concat();

    let new = update(&bytes, &[TagItem::new("MyVendorExt", "42")]);

    let atoms = top_level(&new);
    assert_eq!(fourccs(&atoms), [*b"ftyp", *b"free", *b"mdat", *b"moov"]);

    // the old movie atom becomes free space of the same size
    let (free, _, free_len) = atoms[1];
    assert_eq!(free_len, old_moov.len());
    assert_eq!(&new[free + 8..free + free_len], &old_moov[8..]);

    let (mdat_pos, _, mdat_len) = atoms[2];
    assert_eq!(&new[mdat_pos..mdat_pos + mdat_len], &mdat()[..]);

    let (moov_pos, _, moov_len) = atoms[3];
    assert_eq!(moov_pos + moov_len, new.len());

    assert_eq!(read(&new), [TagItem::new("MyVendorExt", "42")]);
}

#[test]
fn append_behind_media_data_to_end_of_file() {
    let old_moov = moov(&[]);
    let media = [&b"\x00\x00\x00\x00mdat"[..], &[7; 32][..]].concat();
    let bytes = [ftyp(), old_moov.clone(), media.clone()].concat();

    let new = update(&bytes, &[TagItem::new("title", "T")]);

    // the media data atom gets its actual length so the new movie atom follows it
    let atoms = top_level(&new);
    assert_eq!(fourccs(&atoms), [*b"ftyp", *b"free", *b"mdat", *b"moov"]);
    let (mdat_pos, _, mdat_len) = atoms[2];
    assert_eq!(mdat_len, media.len());
    assert_eq!(&new[mdat_pos + 8..mdat_pos + mdat_len], &media[8..]);

    assert_eq!(read(&new), [TagItem::new("title", "T")]);
}

#[test]
fn second_update_is_in_place() {
    let bytes = [ftyp(), moov(&[]), mdat()].concat();

    let first = update(&bytes, &[TagItem::new("title", "A longer title")]);
    let second = update(&first, &[TagItem::new("title", "Short")]);

    let atoms = top_level(&second);
    assert_eq!(fourccs(&atoms), [*b"ftyp", *b"free", *b"mdat", *b"moov"]);
    assert_eq!(&second[..atoms[3].0], &first[..atoms[3].0]);
    assert_eq!(second.len(), first.len() - ("A longer title".len() - "Short".len()));

    assert_eq!(read(&second), [TagItem::new("title", "Short")]);
}

#[test]
fn empty_tags_create_minimal_chain() {
    let bytes = [ftyp(), mdat(), moov(&[])].concat();

    let new = update(&bytes, &[]);

    let expected = [ftyp(), mdat(), moov(&atom(b"udta", &meta(&atom(b"ilst", &[]))))].concat();
    assert_eq!(new, expected);
    assert!(read(&new).is_empty());
}

#[test]
fn clear_existing_tags() {
    let items = [data_item(b"\xa9nam", b"Title"), data_item(b"\xa9alb", b"Album")].concat();
    let bytes = [ftyp(), mdat(), tagged_moov(&items)].concat();

    let new = update(&bytes, &[]);

    assert_eq!(new.len(), bytes.len() - items.len());
    assert!(ilst_items(&new).is_empty());
}

#[test]
fn missing_levels_are_created() {
    // user data without metadata
    let bytes = [ftyp(), mdat(), moov(&atom(b"udta", &atom(b"name", b"x")))].concat();
    let new = update(&bytes, &[TagItem::new("title", "T")]);
    assert_eq!(fourccs(&ilst_items(&new)), [*b"\xa9nam"]);
    assert!(find_path(&new, &[b"moov", b"udta", b"name"]).is_some());

    // metadata without an item list
    let bytes = [ftyp(), mdat(), moov(&atom(b"udta", &meta(&atom(b"hdlr", &[0; 25]))))].concat();
    let new = update(&bytes, &[TagItem::new("title", "T")]);
    assert_eq!(fourccs(&ilst_items(&new)), [*b"\xa9nam"]);
    assert!(find_path(&new, &[b"moov", b"udta", b"meta", b"hdlr"]).is_some());
}

#[test]
fn idempotent_update() {
    let bytes = [ftyp(), mdat(), moov(&[])].concat();
    let tags = [
        TagItem::new("genre", "Jazz"),
        TagItem::new("title", "Title"),
        TagItem::new("tracknumber", "1/9"),
    ];

    let first = update(&bytes, &tags);
    let second = update(&first, &tags);
    assert_eq!(first, second);
}

#[test]
fn missing_movie() {
    let bytes = [ftyp(), mdat()].concat();
    let err = update_err(&bytes, &[]);
    assert!(matches!(err.kind, ErrorKind::AtomNotFound(mp4ilst::atom::MOVIE)));
}

#[test]
fn corrupt_user_data() {
    let mut udta = atom(b"udta", &[0; 16]);
    udta[2] = 0x01;
    let bytes = [ftyp(), moov(&udta), mdat()].concat();

    let err = update_err(&bytes, &[TagItem::new("title", "T")]);
    assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
}

#[test]
fn truncated_metadata() {
    let bytes = [ftyp(), moov(&atom(b"udta", &atom(b"meta", &[0; 2]))), mdat()].concat();

    let err = update_err(&bytes, &[TagItem::new("title", "T")]);
    assert!(matches!(err.kind, ErrorKind::UnsupportedLayout));
}

#[test]
fn truncated_container() {
    let mut bytes = [ftyp(), moov(&[])].concat();
    bytes.truncate(bytes.len() - 10);

    let err = update_err(&bytes, &[]);
    assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
}

/// An in memory container accepting a limited number of written bytes.
struct FailingFile {
    inner: Cursor<Vec<u8>>,
    write_budget: usize,
    fail_truncate: bool,
}

impl FailingFile {
    fn new(bytes: &[u8], write_budget: usize, fail_truncate: bool) -> Self {
        Self { inner: Cursor::new(bytes.to_vec()), write_budget, fail_truncate }
    }
}

impl Read for FailingFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for FailingFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Write for FailingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.write_budget {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
        }
        self.write_budget -= buf.len();
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Truncate for FailingFile {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        if self.fail_truncate {
            return Err(io::Error::new(io::ErrorKind::Other, "truncate failed"));
        }
        self.inner.truncate(len)
    }
}

#[test]
fn failed_write_aborts() {
    let bytes = [ftyp(), moov(&[]), mdat()].concat();
    let tags = [TagItem::new("title", "T")];

    // nothing can be written, the container stays as it was
    let mut file = FailingFile::new(&bytes, 0, false);
    let err = mp4ilst::update_tags(&mut file, &tags).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    assert_eq!(file.inner.get_ref(), &bytes);

    // only the rename of the old movie atom succeeds
    let mut file = FailingFile::new(&bytes, 4, false);
    let err = mp4ilst::update_tags(&mut file, &tags).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    let new = file.inner.into_inner();
    assert_eq!(new.len(), bytes.len());
    assert_eq!(fourccs(&top_level(&new)), [*b"ftyp", *b"free", *b"mdat"]);
    let err = mp4ilst::read_tags(&mut Cursor::new(new)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AtomNotFound(mp4ilst::atom::MOVIE)));
}

#[test]
fn failed_truncate_aborts() {
    let bytes = [ftyp(), moov(&[]), mdat()].concat();

    let mut file = FailingFile::new(&bytes, usize::MAX, true);
    let err = mp4ilst::update_tags(&mut file, &[TagItem::new("title", "T")]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));

    // the new movie atom is complete, only the truncation is missing
    let new = file.inner.into_inner();
    assert_eq!(fourccs(&top_level(&new)), [*b"ftyp", *b"free", *b"mdat", *b"moov"]);
    assert_eq!(read(&new), [TagItem::new("title", "T")]);
}

#[test]
fn update_file_at_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.m4a");
    fs::write(&path, [ftyp(), moov(&[]), mdat()].concat()).unwrap();

    let tags = [
        TagItem::new("artist", "Artist"),
        TagItem::new("discnumber", "2"),
        TagItem::new("totaldiscs", "3"),
    ];
    mp4ilst::update_tags_at_path(&path, &tags).unwrap();
    assert_eq!(
        mp4ilst::read_tags_from_path(&path).unwrap(),
        [
            TagItem::new("discnumber", "2"),
            TagItem::new("totaldiscs", "3"),
            TagItem::new("artist", "Artist"),
        ]
    );

    // the movie atom is now last, writing less shrinks the file
    let len = fs::metadata(&path).unwrap().len();
    let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    mp4ilst::update_tags(&mut &file, &[]).unwrap();
    drop(file);

    assert!(fs::metadata(&path).unwrap().len() < len);
    assert!(mp4ilst::read_tags_from_path(&path).unwrap().is_empty());
}

#[test]
fn collection() {
    if let Some(path) = std::env::args().skip_while(|a| a != "collection").nth(1) {
        println!("Testing collection at {}", &path);
        let dir = tempfile::tempdir().unwrap();

        read_dir(&path, |p| {
            let target = dir.path().join(p.file_name().unwrap());
            fs::copy(p, &target).unwrap();

            let tags = mp4ilst::read_tags_from_path(&target).unwrap();
            println!("{tags:#?}");

            mp4ilst::update_tags_at_path(&target, &tags).unwrap();
            assert_eq!(mp4ilst::read_tags_from_path(&target).unwrap().len(), tags.len());
        });
    } else {
        println!("Skipping collection test since no path was provided.");
    }
}
