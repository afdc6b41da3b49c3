//! Zip archive codec
//!
//! File-tree compression and extraction for save-game archives. Entry names
//! are stored relative to the archive root, and extraction refuses entries
//! whose names escape the target directory.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compresses a directory tree into a zip stream.
///
/// Entry names are the paths relative to `folder`. Empty directories are not
/// recorded.
pub fn compress_dir<W: Write + Seek>(folder: &Path, writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_dir_entries(&mut zip, folder, folder, options)?;

    zip.finish().context("Failed to finalize zip archive")
}

fn add_dir_entries<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            add_dir_entries(zip, root, &path, options)?;
            continue;
        }

        let name = path
            .strip_prefix(root)
            .context("Entry escaped the archive root")?
            .to_string_lossy()
            .replace('\\', "/");

        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add entry {}", name))?;

        let mut file =
            File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        std::io::copy(&mut file, zip)
            .with_context(|| format!("Failed to write entry {}", name))?;
    }

    Ok(())
}

/// Extracts a zip stream into `target`, overwriting existing files.
///
/// Entries with absolute or parent-traversing names are rejected outright.
pub fn extract_zip<R: Read + Seek>(reader: R, target: &Path) -> Result<()> {
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;

    std::fs::create_dir_all(target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let relative = entry
            .enclosed_name()
            .with_context(|| format!("Archive entry '{}' escapes the target directory", entry.name()))?;
        let out_path = target.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut out = File::create(&out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract {}", out_path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_file(path: &Path, contents: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_round_trip_reproduces_tree() {
        let src = tempfile::tempdir().unwrap();
        write_file(&src.path().join("world.dat"), b"overworld chunk data");
        write_file(&src.path().join("region/r.0.0.bin"), &[0u8, 1, 2, 3, 255]);
        write_file(&src.path().join("region/deep/r.1.1.bin"), b"nested");

        let cursor = compress_dir(src.path(), Cursor::new(Vec::new())).unwrap();

        let dst = tempfile::tempdir().unwrap();
        extract_zip(Cursor::new(cursor.into_inner()), dst.path()).unwrap();

        for rel in ["world.dat", "region/r.0.0.bin", "region/deep/r.1.1.bin"] {
            let original = std::fs::read(src.path().join(rel)).unwrap();
            let restored = std::fs::read(dst.path().join(rel)).unwrap();
            assert_eq!(original, restored, "mismatch for {}", rel);
        }
    }

    #[test]
    fn test_extract_overwrites_existing_files() {
        let src = tempfile::tempdir().unwrap();
        write_file(&src.path().join("save.dat"), b"new contents");

        let cursor = compress_dir(src.path(), Cursor::new(Vec::new())).unwrap();

        let dst = tempfile::tempdir().unwrap();
        write_file(&dst.path().join("save.dat"), b"stale contents");

        extract_zip(Cursor::new(cursor.into_inner()), dst.path()).unwrap();
        assert_eq!(
            std::fs::read(dst.path().join("save.dat")).unwrap(),
            b"new contents"
        );
    }

    #[test]
    fn test_extract_rejects_traversal_entries() {
        // Craft an archive whose entry tries to climb out of the target
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("../evil.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"gotcha").unwrap();
        let cursor = zip.finish().unwrap();

        let dst = tempfile::tempdir().unwrap();
        let result = extract_zip(Cursor::new(cursor.into_inner()), dst.path().join("saves").as_path());
        assert!(result.is_err());
    }

    #[test]
    fn test_compress_missing_directory_fails() {
        let result = compress_dir(Path::new("/no/such/berth/dir"), Cursor::new(Vec::new()));
        assert!(result.is_err());
    }
}
