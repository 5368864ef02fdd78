// In: src/ffi/locator.rs

//! Resolves where the engine shared object lives.
//!
//! Search order:
//! 1. the explicit override (`ClientConfig::library_path` / `TDTP_LIB_PATH`),
//!    which must exist and is never fallen through;
//! 2. the running executable's directory, then each configured search dir;
//! 3. `lib/` and `bindings/lib/` under every ancestor of the executable's
//!    directory, where a source-tree build drops its output.

use crate::config::{ClientConfig, ENV_LIB_PATH};
use crate::error::{Result, TdtpError};
use std::path::{Path, PathBuf};

/// The engine's file name on the current platform.
pub fn platform_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "libtdtp.dll"
    } else if cfg!(target_os = "macos") {
        "libtdtp.dylib"
    } else {
        "libtdtp.so"
    }
}

/// Finds the engine using the process's executable location as the anchor.
pub fn locate(config: &ClientConfig) -> Result<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    locate_from(config, exe_dir.as_deref())
}

/// Finds the engine with an explicit anchor directory.
pub fn locate_from(config: &ClientConfig, anchor: Option<&Path>) -> Result<PathBuf> {
    let name = config
        .library_name
        .clone()
        .unwrap_or_else(|| platform_library_name().to_string());

    if let Some(path) = &config.library_path {
        if path.is_file() {
            log::debug!("using engine override {}", path.display());
            return Ok(path.clone());
        }
        return Err(TdtpError::LibraryNotFound {
            name,
            hint: format!(
                "{} points to {}, which does not exist",
                ENV_LIB_PATH,
                path.display()
            ),
        });
    }

    let candidates = candidate_paths(&name, &config.search_dirs, anchor);
    for candidate in &candidates {
        log::debug!("probing {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    Err(TdtpError::LibraryNotFound {
        hint: format!(
            "searched {} locations; run make build-lib or set {} to the full path of {}",
            candidates.len(),
            ENV_LIB_PATH,
            name
        ),
        name,
    })
}

fn candidate_paths(name: &str, search_dirs: &[PathBuf], anchor: Option<&Path>) -> Vec<PathBuf> {
    let mut out = Vec::new();

    if let Some(dir) = anchor {
        out.push(dir.join(name));
    }
    out.extend(search_dirs.iter().map(|dir| dir.join(name)));

    if let Some(dir) = anchor {
        for ancestor in dir.ancestors() {
            out.push(ancestor.join("lib").join(name));
            out.push(ancestor.join("bindings").join("lib").join(name));
        }
    }
    out
}
