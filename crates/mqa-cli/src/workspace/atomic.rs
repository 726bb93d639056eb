use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::{WorkspaceError, WorkspaceResult};

/// Replace `path` with `data` through a rename in the same directory.
///
/// Each write stages into its own uniquely named temp file, so concurrent
/// runs archiving into one directory never share a staging file and a failed
/// write leaves the previous file in place.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> WorkspaceResult<()> {
    if path.file_name().is_none() {
        return Err(WorkspaceError::Invalid(format!(
            "{} does not name a file",
            path.display()
        )));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    // The staged file is deleted when persisting fails.
    staged.persist(path).map_err(|err| WorkspaceError::Io(err.error))?;
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mqa_atomic_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = scratch_dir().join("nested");
        let path = dir.join("catalog.rdf");

        write_bytes_atomic(&path, b"first").unwrap();
        write_bytes_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn failed_replace_cleans_up_staging_file() {
        let dir = scratch_dir();
        let target = dir.join("catalog.rdf");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(matches!(
            write_bytes_atomic(&target, b"data"),
            Err(WorkspaceError::Io(_))
        ));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        assert!(target.join("occupied").is_dir());
    }

    #[test]
    fn rejects_paths_without_file_name() {
        let err = write_bytes_atomic(Path::new("/"), b"data").unwrap_err();
        assert!(matches!(err, WorkspaceError::Invalid(_)));
    }
}
