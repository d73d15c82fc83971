//! Configuration-storage bridge.
//!
//! WinSparkle persists its settings (automatic-check flag, interval, last
//! check time, skipped version) in the registry by default. A host can
//! substitute its own storage by supplying a [`ConfigStore`]; the bridge
//! then hands the native library a fixed three-entry function table whose
//! trampolines forward into the store.
//!
//! If no store is ever supplied, `win_sparkle_set_config_methods` is never
//! called and the native registry-backed default stays active. Passing a
//! table of no-op stubs instead would defeat the library's own fallback
//! logic, so absence really means absence here.

use std::ffi::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use tracing::error;

use crate::abi;
use crate::dll;
use crate::marshal;

/// Key-value storage capability substituted for WinSparkle's registry
/// backend.
///
/// The native library calls these methods from its own worker threads, for
/// the entire session, which is why implementations must be `Send + Sync`.
pub trait ConfigStore: Send + Sync {
    /// Returns the value stored under `name`, if any.
    fn read(&self, name: &str) -> Option<String>;

    /// Stores `value` under `name`. Returns false if the write failed.
    fn write(&self, name: &str, value: &str) -> bool;

    /// Removes `name`. Returns false if the delete failed.
    fn delete(&self, name: &str) -> bool;
}

static STORE: Mutex<Option<Box<dyn ConfigStore>>> = Mutex::new(None);

/// The table the native library keeps a pointer to; static so it outlives
/// the whole update session.
static CONFIG_METHODS: abi::ConfigMethods = abi::ConfigMethods {
    read: read_trampoline,
    write: write_trampoline,
    delete: delete_trampoline,
    user_data: 0,
};

/// Replaces WinSparkle's registry-backed settings storage with `store`.
///
/// Must be called before [`crate::init`]. The store stays active for the
/// rest of the session; supplying a new one replaces the previous store
/// behind the already-installed table.
pub fn set_config_store(store: impl ConfigStore + 'static) {
    *STORE.lock().unwrap() = Some(Box::new(store));
    let install: abi::SetConfigMethodsFn = dll::sym("win_sparkle_set_config_methods");
    unsafe { install(&CONFIG_METHODS) };
}

unsafe extern "C" fn read_trampoline(
    name: *const c_char,
    buf: *mut u16,
    len: usize,
    _user: *mut c_void,
) -> c_int {
    let name = marshal::narrow_to_string(name);
    let guard = STORE.lock().unwrap();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        guard.as_ref().and_then(|store| store.read(&name))
    }));
    let value = match outcome {
        Ok(Some(value)) => value,
        Ok(None) => return 0,
        Err(_) => {
            error!(key = %name, "config store read panicked; reporting key as missing");
            return 0;
        }
    };
    if buf.is_null() || len == 0 {
        return 0;
    }

    // Never write past the caller's buffer; truncate and NUL-terminate
    // within the unit count it gave us.
    let units: Vec<u16> = value.encode_utf16().take(len - 1).collect();
    std::ptr::copy_nonoverlapping(units.as_ptr(), buf, units.len());
    *buf.add(units.len()) = 0;
    1
}

unsafe extern "C" fn write_trampoline(
    name: *const c_char,
    value: *const u16,
    _user: *mut c_void,
) -> c_int {
    let name = marshal::narrow_to_string(name);
    let value = marshal::wide_to_string(value);
    let guard = STORE.lock().unwrap();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        guard
            .as_ref()
            .is_some_and(|store| store.write(&name, &value))
    }));
    match outcome {
        Ok(written) => marshal::bool_to_int(written),
        Err(_) => {
            error!(key = %name, "config store write panicked; reporting failure");
            0
        }
    }
}

unsafe extern "C" fn delete_trampoline(name: *const c_char, _user: *mut c_void) -> c_int {
    let name = marshal::narrow_to_string(name);
    let guard = STORE.lock().unwrap();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        guard.as_ref().is_some_and(|store| store.delete(&name))
    }));
    match outcome {
        Ok(deleted) => marshal::bool_to_int(deleted),
        Err(_) => {
            error!(key = %name, "config store delete panicked; reporting failure");
            0
        }
    }
}
