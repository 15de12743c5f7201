use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{CompiledReport, ReportError};

impl CompiledReport {
    /// Writes the report into `dir` under its generated filename.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir)?;
        let target = dir.join(&self.filename);
        write_atomically(&target, &self.bytes)?;
        info!(path = %target.display(), bytes = self.bytes.len(), "saved verification report");
        Ok(target)
    }
}

/// Writes to a sibling `.part` file and renames it over `target`. The partial
/// file is removed when any step fails.
pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let result = fs::File::create(&partial)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&partial, target));

    if let Err(err) = result {
        if partial.exists() {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!(path = %partial.display(), error = %cleanup, "failed to remove partial report");
            }
        }
        return Err(ReportError::Io(err));
    }
    Ok(())
}
