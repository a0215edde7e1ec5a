//! Replication of static asset directories into the output root.

use std::fs;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::constants::{ASSET_DIR_MODE, OUTPUT_DIR_MODE};
use crate::error::{Error, Result};

fn create_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path).map_err(Error::IoError)
}

/// Copies the tree under `source` into `dest`, byte for byte.
///
/// A missing `source` is not an error: configurations without assets simply
/// have nothing to copy.
pub fn copy_tree<S: AsRef<Path>, D: AsRef<Path>>(source: S, dest: D) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();
    if !source.is_dir() {
        debug!("No asset directory at {}", source.display());
        return Ok(());
    }

    create_dir(dest, OUTPUT_DIR_MODE)?;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target, ASSET_DIR_MODE)?;
        } else {
            debug!("Copying asset {} to {}", entry.path().display(), target.display());
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
