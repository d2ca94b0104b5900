use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

/// Creates a folder (and any necessary parent directories) at `folder_path`.
pub fn create_folder<P: AsRef<Path>>(folder_path: P) -> io::Result<()> {
    fs::create_dir_all(folder_path)
}

/// Writes `value` as pretty JSON to `file_path`, creating parent folders.
pub fn write_json<T, P>(value: &T, file_path: P) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let file_path = file_path.as_ref();
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_folder(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(file_path, json)
        .map_err(|e| format!("couldn't write {}: {}", file_path.display(), e))?;
    Ok(())
}
