//! Safe extraction of model artifact archives.

use std::fs::File;
use std::path::{Component, Path};

use tar::Archive;
use tracing::debug;

use crate::error::{GenerateError, Result};

/// Extracts `archive_path` into `dest`, refusing archives with escaping
/// entries.
///
/// Every entry is validated before anything is written. A tar reader that
/// merely skips a bad entry would still extract the rest; a hostile archive
/// must extract nothing at all, so validation runs as a separate first pass
/// over the whole archive.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    validate_entries(archive_path)?;
    let mut archive = Archive::new(open(archive_path)?);
    archive.unpack(dest).map_err(|e| GenerateError::Io {
        path: archive_path.to_path_buf(),
        detail: format!("extracting archive: {e}"),
    })?;
    debug!(
        archive = %archive_path.display(),
        dest = %dest.display(),
        "extracted artifact archive"
    );
    Ok(())
}

fn validate_entries(archive_path: &Path) -> Result<()> {
    let io_err = |detail: String| GenerateError::Io {
        path: archive_path.to_path_buf(),
        detail,
    };
    let mut archive = Archive::new(open(archive_path)?);
    let entries = archive
        .entries()
        .map_err(|e| io_err(format!("reading archive: {e}")))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(format!("reading archive entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| io_err(format!("decoding entry path: {e}")))?;
        check_contained(&path)?;
        let link = entry
            .link_name()
            .map_err(|e| io_err(format!("decoding link target: {e}")))?;
        if let Some(link) = link {
            check_contained(&link)?;
        }
    }
    Ok(())
}

/// Rejects absolute paths and any `..` component. Link targets go through the
/// same check: a relative target without `..` cannot leave the extraction
/// root, anything else might.
fn check_contained(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(GenerateError::UnsafeArchive {
                    entry: path.display().to_string(),
                })
            }
        }
    }
    Ok(())
}

fn open(archive_path: &Path) -> Result<File> {
    File::open(archive_path).map_err(|e| GenerateError::Io {
        path: archive_path.to_path_buf(),
        detail: format!("opening archive: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    fn new_builder(path: &Path) -> tar::Builder<File> {
        tar::Builder::new(File::create(path).unwrap())
    }

    fn append_file(builder: &mut tar::Builder<File>, name: &str, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data).unwrap();
    }

    // Writes the entry name verbatim. `Header::set_path` refuses traversal
    // components, which is exactly what a hostile archive would not do.
    fn append_raw_name(builder: &mut tar::Builder<File>, name: &[u8], data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, data).unwrap();
    }

    fn scratch() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("model.tar");
        let dest = dir.path().join("out");
        (dir, archive, dest)
    }

    #[test]
    fn extracts_regular_entries() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        append_file(&mut builder, "metadata.json", b"{}");
        append_file(&mut builder, "lib/graph.json", b"{\"nodes\":[]}");
        builder.finish().unwrap();

        extract_archive(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("metadata.json")).unwrap(), b"{}");
        assert_eq!(fs::read(dest.join("lib/graph.json")).unwrap(), b"{\"nodes\":[]}");
    }

    #[test]
    fn accepts_curdir_prefixed_names() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        append_raw_name(&mut builder, b"./metadata.json", b"{}");
        builder.finish().unwrap();

        extract_archive(&archive, &dest).unwrap();
        assert!(dest.join("metadata.json").is_file());
    }

    #[test]
    fn rejects_parent_dir_entry_without_writing() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        append_file(&mut builder, "good.txt", b"fine");
        append_raw_name(&mut builder, b"../evil", b"gotcha");
        builder.finish().unwrap();

        let err = extract_archive(&archive, &dest).unwrap_err();
        assert!(matches!(err, GenerateError::UnsafeArchive { entry } if entry == "../evil"));
        // The good entry preceded the bad one; nothing may have been written.
        assert!(!dest.exists());
    }

    #[test]
    fn rejects_embedded_parent_component() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        append_raw_name(&mut builder, b"lib/../../evil", b"gotcha");
        builder.finish().unwrap();

        let err = extract_archive(&archive, &dest).unwrap_err();
        assert!(matches!(err, GenerateError::UnsafeArchive { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn rejects_absolute_entry() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        append_raw_name(&mut builder, b"/tmp/evil", b"gotcha");
        builder.finish().unwrap();

        let err = extract_archive(&archive, &dest).unwrap_err();
        assert!(matches!(err, GenerateError::UnsafeArchive { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn rejects_escaping_symlink_target() {
        let (_dir, archive, dest) = scratch();
        let mut builder = new_builder(&archive);
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_link_name("../../outside").unwrap();
        header.set_size(0);
        header.set_cksum();
        builder
            .append_data(&mut header, "escape_link", io::empty())
            .unwrap();
        builder.finish().unwrap();

        let err = extract_archive(&archive, &dest).unwrap_err();
        assert!(matches!(err, GenerateError::UnsafeArchive { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn missing_archive_reports_io_error() {
        let (_dir, archive, dest) = scratch();
        let err = extract_archive(&archive, &dest).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
    }
}
