//! Process-wide WinSparkle library handle and symbol table.
//!
//! The DLL is loaded at most once per process, lazily on the first call
//! into the API. Exports are resolved by name on first use and cached.
//! Load and resolution failures are configuration errors (wrong deployment,
//! wrong DLL) and are fatal at that first use, mirroring how the native
//! library itself treats a broken install.

use std::collections::BTreeMap;
use std::env;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use libloading::Library;
use tracing::debug;

/// Name the dynamic loader resolves when no explicit path was set.
pub const LIBRARY_NAME: &str = "WinSparkle.dll";

static LIBRARY: OnceLock<Library> = OnceLock::new();
static LIBRARY_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
static SYMBOLS: Mutex<BTreeMap<&'static str, usize>> = Mutex::new(BTreeMap::new());

/// Overrides the location the DLL is loaded from.
///
/// Takes effect only if called before the first call into the WinSparkle
/// API; once the library is loaded the handle lives for the rest of the
/// process.
pub fn set_library_path(path: impl Into<PathBuf>) {
    *LIBRARY_PATH.lock().unwrap() = Some(path.into());
}

/// Prepends `dir` to the dynamic loader's search path (`PATH`) so that
/// [`LIBRARY_NAME`] can later be resolved by name.
///
/// This is the hook for packagers that ship the DLL next to (or extracted
/// by) the application rather than installing it system-wide.
pub fn prepend_search_path(dir: &Path) {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = env::var_os("PATH") {
        paths.extend(env::split_paths(&existing));
    }
    let joined = env::join_paths(paths).unwrap_or_else(|err| {
        panic!("cannot prepend {} to PATH: {err}", dir.display());
    });
    env::set_var("PATH", joined);
}

fn library() -> &'static Library {
    LIBRARY.get_or_init(|| {
        let path = LIBRARY_PATH
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| PathBuf::from(LIBRARY_NAME));
        debug!(path = %path.display(), "loading WinSparkle library");
        match unsafe { Library::new(&path) } {
            Ok(library) => library,
            Err(err) => panic!("failed to load {}: {err}", path.display()),
        }
    })
}

/// Resolves the export `name` to a typed function pointer, caching the
/// address after the first lookup.
///
/// Panics if the export is missing; calling a build of the DLL that lacks
/// an export is a deployment error, not a runtime condition.
pub(crate) fn sym<T: Copy>(name: &'static str) -> T {
    assert_eq!(
        mem::size_of::<T>(),
        mem::size_of::<usize>(),
        "sym only resolves function pointers"
    );

    let mut cache = SYMBOLS.lock().unwrap();
    let address = match cache.get(name) {
        Some(&address) => address,
        None => {
            let address = unsafe {
                let pointer: libloading::Symbol<'_, *mut std::ffi::c_void> = library()
                    .get(name.as_bytes())
                    .unwrap_or_else(|err| panic!("unresolved WinSparkle export `{name}`: {err}"));
                *pointer as usize
            };
            debug!(name, address, "resolved WinSparkle export");
            cache.insert(name, address);
            address
        }
    };

    // The cache stores raw addresses; the caller names the signature.
    unsafe { mem::transmute_copy(&address) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_search_path_puts_dir_first() {
        let dir = tempfile::TempDir::new().unwrap();
        prepend_search_path(dir.path());

        let path = env::var_os("PATH").unwrap();
        let first = env::split_paths(&path).next().unwrap();
        assert_eq!(first, dir.path());
    }
}
