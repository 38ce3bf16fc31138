#![no_main]

use libfuzzer_sys::fuzz_target;
use mp4ilst::TagItem;

fuzz_target!(|data: &[u8]| {
    _ = mp4ilst::read_tags(&mut std::io::Cursor::new(data));

    let tags = [
        TagItem::new("title", "Title"),
        TagItem::new("tracknumber", "3/12"),
        TagItem::new("genre", "Rock"),
        TagItem::new("MyVendorExt", "42"),
    ];
    let mut file = std::io::Cursor::new(data.to_vec());
    if mp4ilst::update_tags(&mut file, &tags).is_ok() {
        _ = mp4ilst::read_tags(&mut std::io::Cursor::new(file.into_inner()));
    }
});
