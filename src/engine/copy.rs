//! Durable file copy and timestamp mirroring

use filetime::FileTime;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Copy a file using the write-then-rename strategy
///
/// Streams into a `.mirra-part` sibling, syncs it to disk, stamps the
/// source mtime onto it, then renames over the destination. A failed
/// copy removes the part file and leaves the old destination intact.
///
/// Returns the number of bytes copied.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = dest.with_extension("mirra-part");

    let result = write_part(src, &part_path)
        .and_then(|total| fs::rename(&part_path, dest).map(|()| total));

    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }

    result
}

fn write_part(src: &Path, part_path: &Path) -> io::Result<u64> {
    let mut src_file = File::open(src)?;
    let mut part_file = File::create(part_path)?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        part_file.write_all(&buffer[0..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;

    // Drop the handle before rename (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src)?;
    let mtime = FileTime::from_system_time(src_metadata.modified()?);
    filetime::set_file_mtime(part_path, mtime)?;

    Ok(total_bytes)
}

/// Stamp a source directory's mtime onto its mirrored target directory
///
/// Copying files into the target directory bumps its mtime. Change
/// detection only ever reads source mtimes, so this is about metadata
/// fidelity: the mirrored tree keeps the source's timestamps and can
/// itself serve as a sync source later.
pub fn mirror_dir_mtime(src_dir: &Path, dest_dir: &Path) -> io::Result<()> {
    let src_metadata = fs::metadata(src_dir)?;
    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(dest_dir, mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_contents_and_size() {
        let dir = TempDir::new().expect("create temp dir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("out/dest.txt");
        fs::write(&src, b"mirror me").expect("write source");

        let bytes = copy_file(&src, &dest).expect("copy should succeed");

        assert_eq!(bytes, 9);
        assert_eq!(fs::read(&dest).expect("read dest"), b"mirror me");
    }

    #[test]
    fn test_copy_file_overwrites_existing() {
        let dir = TempDir::new().expect("create temp dir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"new").expect("write source");
        fs::write(&dest, b"stale content").expect("write stale dest");

        copy_file(&src, &dest).expect("copy should succeed");

        assert_eq!(fs::read(&dest).expect("read dest"), b"new");
    }

    #[test]
    fn test_copy_file_preserves_mtime() {
        let dir = TempDir::new().expect("create temp dir");
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"data").expect("write source");

        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&src, old).expect("set source mtime");

        copy_file(&src, &dest).expect("copy should succeed");

        let dest_mtime =
            FileTime::from_last_modification_time(&fs::metadata(&dest).expect("stat dest"));
        assert_eq!(dest_mtime.unix_seconds(), old.unix_seconds());
    }

    #[test]
    fn test_copy_empty_file() {
        let dir = TempDir::new().expect("create temp dir");
        let src = dir.path().join("empty.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, b"").expect("write empty source");

        let bytes = copy_file(&src, &dest).expect("copy should succeed");

        assert_eq!(bytes, 0);
        assert!(dest.exists());
    }

    #[test]
    fn test_failed_copy_leaves_no_part_file() {
        let dir = TempDir::new().expect("create temp dir");
        let src = dir.path().join("src.txt");
        fs::write(&src, b"data").expect("write source");

        // An existing directory at the destination makes the final
        // rename fail after the part file was fully written.
        let dest = dir.path().join("dest.txt");
        fs::create_dir(&dest).expect("create blocking directory");

        let result = copy_file(&src, &dest);

        assert!(result.is_err());
        assert!(
            !dir.path().join("dest.mirra-part").exists(),
            "part file must be removed on failure"
        );
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let dir = TempDir::new().expect("create temp dir");
        let result = copy_file(&dir.path().join("ghost.txt"), &dir.path().join("dest.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_mirror_dir_mtime() {
        let dir = TempDir::new().expect("create temp dir");
        let src_dir = dir.path().join("src");
        let dest_dir = dir.path().join("dest");
        fs::create_dir(&src_dir).expect("create src dir");
        fs::create_dir(&dest_dir).expect("create dest dir");

        let old = FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_mtime(&src_dir, old).expect("set src dir mtime");

        mirror_dir_mtime(&src_dir, &dest_dir).expect("mirror should succeed");

        let dest_mtime =
            FileTime::from_last_modification_time(&fs::metadata(&dest_dir).expect("stat dest"));
        assert_eq!(dest_mtime.unix_seconds(), old.unix_seconds());
    }
}
