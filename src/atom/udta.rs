use super::*;

/// Builds a user data (`udta`) atom containing a metadata atom around the item list content.
pub fn build_udta(ilst_body: &[u8], cfg: &WriteConfig<'_>) -> crate::Result<Vec<u8>> {
    let meta_len = meta::len(ilst_body.len() as u64, cfg);
    let len = HEAD_LEN + meta_len;

    let mut buf = AtomBuf::with_capacity(usize::try_from(len).unwrap_or(usize::MAX));
    buf.write_head(USER_DATA, meta_len);
    meta::write(&mut buf, ilst_body, cfg);
    buf.detach()
}
