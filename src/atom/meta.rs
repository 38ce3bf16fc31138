use super::*;

/// Version and flags preceding the children of a metadata (`meta`) atom.
pub const HEADER_LEN: u64 = 4;

/// Content of the metadata handler (`hdlr`) atom iTunes writes: version and flags, predefined,
/// handler type `mdir`, manufacturer `appl`, two reserved fields and an empty name.
const HANDLER: [u8; 25] = [
    0, 0, 0, 0, // version, flags
    0, 0, 0, 0, // predefined
    b'm', b'd', b'i', b'r', // handler type
    b'a', b'p', b'p', b'l', // manufacturer
    0, 0, 0, 0, // reserved
    0, 0, 0, 0, // reserved
    0, // name
];

/// Returns the length of a metadata atom holding an item list with `ilst_body_len` bytes of
/// content.
pub fn len(ilst_body_len: u64, cfg: &WriteConfig<'_>) -> u64 {
    let hdlr_len = match cfg.handler {
        true => HEAD_LEN + HANDLER.len() as u64,
        false => 0,
    };
    HEAD_LEN + HEADER_LEN + hdlr_len + HEAD_LEN + ilst_body_len
}

/// Appends a metadata atom containing an optional handler and the item list.
pub fn write(buf: &mut AtomBuf, ilst_body: &[u8], cfg: &WriteConfig<'_>) {
    buf.write_head(METADATA, len(ilst_body.len() as u64, cfg) - HEAD_LEN);
    buf.write_u32(0);
    if cfg.handler {
        buf.write_atom(HANDLER_REFERENCE, &HANDLER);
    }
    buf.write_atom(ITEM_LIST, ilst_body);
}

/// Builds a metadata (`meta`) atom around the item list content.
pub fn build_meta(ilst_body: &[u8], cfg: &WriteConfig<'_>) -> crate::Result<Vec<u8>> {
    let len = len(ilst_body.len() as u64, cfg);
    let mut buf = AtomBuf::with_capacity(usize::try_from(len).unwrap_or(usize::MAX));
    write(&mut buf, ilst_body, cfg);
    buf.detach()
}
