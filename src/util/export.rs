use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Write the rendered report to `path`, replacing any previous content.
pub fn write_report(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_report(&path, "first run\n").unwrap();
        write_report(&path, "second run\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second run\n");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("margins.txt");
        write_report(&path, "Shark / 2 / 50 / 875\n").unwrap();
        assert!(path.exists());
    }
}
