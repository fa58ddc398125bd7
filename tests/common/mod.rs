#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Minimal PNG signature; the splitter never decodes images.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-patch";

pub fn write_image(patches_dir: &Path, file_name: &str) {
    let dir = patches_dir.join("png");
    fs::create_dir_all(&dir).expect("create png dir");
    fs::write(dir.join(file_name), PNG_BYTES).expect("write image");
}

pub fn write_label(patches_dir: &Path, stem: &str) {
    let dir = patches_dir.join("labels");
    fs::create_dir_all(&dir).expect("create labels dir");
    fs::write(
        dir.join(format!("{stem}.txt")),
        format!("0 0.5 0.5 0.1 0.1 # {stem}\n"),
    )
    .expect("write label");
}

/// Create `<stem>.png` for every stem, and a label for those in `labeled`.
pub fn create_patches(patches_dir: &Path, stems: &[&str], labeled: &[&str]) {
    fs::create_dir_all(patches_dir.join("png")).expect("create png dir");
    fs::create_dir_all(patches_dir.join("labels")).expect("create labels dir");

    for stem in stems {
        write_image(patches_dir, &format!("{stem}.png"));
    }
    for stem in labeled {
        write_label(patches_dir, stem);
    }
}

/// `count` patches named `tile_0000.png`...; only the first `labeled` get labels.
pub fn create_numbered_patches(patches_dir: &Path, count: usize, labeled: usize) {
    let stems: Vec<String> = (0..count).map(|i| format!("tile_{i:04}")).collect();
    let stem_refs: Vec<&str> = stems.iter().map(String::as_str).collect();
    create_patches(patches_dir, &stem_refs, &stem_refs[..labeled.min(count)]);
}

/// File names directly inside `dir`.
pub fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// File stems directly inside `dir`.
pub fn file_stems(dir: &Path) -> BTreeSet<String> {
    file_names(dir)
        .into_iter()
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => name,
        })
        .collect()
}
