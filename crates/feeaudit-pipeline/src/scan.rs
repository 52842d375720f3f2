//! Report file discovery

use std::path::{Path, PathBuf};

use feeaudit_core::AuditError;
use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, warn};

/// Prefix Excel gives the lock file of an open workbook
const LOCK_FILE_PREFIX: &str = "~$";

/// Recursively list `.xlsx` files under `root` whose name contains `name_pattern`
///
/// The extension match ignores case. Excel lock files are left out. Paths are
/// returned sorted so repeated runs see files in the same order.
pub fn find_report_files(root: &Path, name_pattern: &str) -> Result<Vec<PathBuf>, AuditError> {
    if !root.is_dir() {
        return Err(AuditError::RootNotFound(root.to_path_buf()));
    }

    let pattern = format!("{}/**/*.xlsx", Pattern::escape(&root.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let entries = glob_with(&pattern, options).map_err(|e| AuditError::UnreadableFile {
        path: root.to_path_buf(),
        reason: format!("Invalid scan pattern: {e}"),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %e.path().display(), "cannot read directory entry: {}", e.error());
                continue;
            }
        };
        if is_report_file(&path, name_pattern) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "not a report file");
        }
    }

    files.sort();
    Ok(files)
}

fn is_report_file(path: &Path, name_pattern: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file() && !name.starts_with(LOCK_FILE_PREFIX) && name.contains(name_pattern)
}
