#![allow(dead_code)]

/// Returns an atom with the identifier and content.
pub fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut buf = ((content.len() + 8) as u32).to_be_bytes().to_vec();
    buf.extend(fourcc);
    buf.extend(content);
    buf
}

/// Returns a metadata item storing the value in a UTF-8 data atom.
pub fn data_item(fourcc: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let data = [&[0, 0, 0, 1, 0, 0, 0, 0][..], value].concat();
    atom(fourcc, &atom(b"data", &data))
}

pub fn meta(children: &[u8]) -> Vec<u8> {
    atom(b"meta", &[&[0; 4][..], children].concat())
}

pub fn ftyp() -> Vec<u8> {
    atom(b"ftyp", b"M4A \x00\x00\x02\x00M4A isomiso2")
}

pub fn mdat() -> Vec<u8> {
    atom(b"mdat", &(0..=255).collect::<Vec<u8>>())
}

/// Returns a movie atom containing a movie header followed by the children.
pub fn moov(children: &[u8]) -> Vec<u8> {
    let mvhd = atom(b"mvhd", &[0; 100]);
    atom(b"moov", &[&mvhd[..], children].concat())
}

/// Returns a movie atom with a complete metadata chain holding the items.
pub fn tagged_moov(items: &[u8]) -> Vec<u8> {
    moov(&atom(b"udta", &meta(&atom(b"ilst", items))))
}

/// Lists the atoms in `start..end` as position, identifier and length.
pub fn children(bytes: &[u8], start: usize, end: usize) -> Vec<(usize, [u8; 4], usize)> {
    let mut atoms = Vec::new();
    let mut pos = start;

    while pos + 8 <= end {
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        let fourcc: [u8; 4] = bytes[pos + 4..pos + 8].try_into().unwrap();
        assert!(len >= 8, "invalid atom length {len} at {pos}");

        atoms.push((pos, fourcc, len));
        pos += len;
    }

    atoms
}

pub fn top_level(bytes: &[u8]) -> Vec<(usize, [u8; 4], usize)> {
    children(bytes, 0, bytes.len())
}

pub fn fourccs(atoms: &[(usize, [u8; 4], usize)]) -> Vec<[u8; 4]> {
    atoms.iter().map(|a| a.1).collect()
}

/// Returns the position and length of the first atom at the path. The version and flags of
/// `meta` atoms are skipped.
pub fn find_path(bytes: &[u8], path: &[&[u8; 4]]) -> Option<(usize, usize)> {
    let mut start = 0;
    let mut end = bytes.len();
    let mut found = None;

    for fourcc in path {
        let (pos, _, len) = children(bytes, start, end).into_iter().find(|a| &a.1 == *fourcc)?;
        found = Some((pos, len));

        start = pos + 8;
        if *fourcc == b"meta" {
            start += 4;
        }
        end = pos + len;
    }

    found
}

/// Returns the items of the first item list in the container.
pub fn ilst_items(bytes: &[u8]) -> Vec<(usize, [u8; 4], usize)> {
    let (pos, len) = find_path(bytes, &[b"moov", b"udta", b"meta", b"ilst"]).unwrap();
    children(bytes, pos + 8, pos + len)
}
