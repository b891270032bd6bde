use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Returns the list file path, rejecting a missing or empty `--file`.
pub(crate) fn require_list_file(file: Option<&Path>) -> Result<PathBuf> {
    match file {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => bail!(
            "A list file is required.\n  \
             Use: bulkfetch --file LIST.tsv --dest DIR"
        ),
    }
}

/// Returns the destination root, rejecting a missing or empty `--dest`.
pub(crate) fn require_dest_dir(dest: Option<&Path>) -> Result<PathBuf> {
    match dest {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => bail!(
            "A destination directory is required.\n  \
             Use: bulkfetch --file LIST.tsv --dest DIR, or set `dest` in the config file"
        ),
    }
}
