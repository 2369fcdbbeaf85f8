use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Read a whole input file, naming it in the error.
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Serialize `value` as JSON into `path`. Refuses to replace an existing file unless `force`.
pub(crate) fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Refusing to overwrite {} (use --force)", path.display());
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_files_need_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json_file(&path, &serde_json::json!({ "a": 1 }), false).unwrap();
        assert!(write_json_file(&path, &serde_json::json!({ "a": 2 }), false).is_err());
        write_json_file(&path, &serde_json::json!({ "a": 3 }), true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&read_file(&path).unwrap()).unwrap();
        assert_eq!(value["a"], 3);
    }

    #[test]
    fn file_in_place_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        fs::write(&path, b"x").unwrap();
        assert!(ensure_dir_exists(&path).is_err());
        assert!(ensure_dir_exists(&dir.path().join("nested/out")).is_ok());
    }
}
