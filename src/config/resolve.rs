// src/config/resolve.rs

//! `PATH` lookup for the command to execute.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve `name` to an absolute path of an executable file.
///
/// - Names containing a path separator are checked as given (relative to the
///   current directory).
/// - Bare names are searched in each entry of `path_var`; an empty entry
///   stands for the current directory.
pub fn find_executable(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let candidate = Path::new(name);
        return is_executable(candidate)
            .then(|| std::path::absolute(candidate).ok())
            .flatten();
    }

    let path_var = path_var?;
    std::env::split_paths(path_var)
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".").join(name)
            } else {
                dir.join(name)
            }
        })
        .find(|candidate| is_executable(candidate))
        .and_then(|found| std::path::absolute(found).ok())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
