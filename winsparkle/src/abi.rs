//! ABI definitions for the WinSparkle boundary.
//!
//! This module defines the C signatures of every `win_sparkle_*` export the
//! binding calls, the callback types the native library calls back through,
//! and the configuration-methods table that replaces its built-in settings
//! storage. The native API is `__cdecl` throughout, which `extern "C"`
//! matches on every target the DLL ships for.

use std::ffi::{c_char, c_int, c_ushort, c_void};

/// Return value of [`UserRunInstallerCallback`]: the host-side handler
/// failed, abort the install flow.
pub const RUN_INSTALLER_ERROR: c_int = -1;
/// The host did not handle the installer; the library runs its default
/// handling.
pub const RUN_INSTALLER_DEFAULT: c_int = 0;
/// The host handled the installer itself; the library skips default
/// handling.
pub const RUN_INSTALLER_HANDLED: c_int = 1;

/// Notification callback with no payload. The native library ignores the
/// return value; trampolines return a fixed 0.
pub type NotificationCallback = unsafe extern "C" fn() -> c_int;

/// Synchronous query: may the application shut down so the installer can
/// run? The library blocks on the answer (1 = yes, 0 = no).
pub type CanShutdownCallback = unsafe extern "C" fn() -> c_int;

/// Called with the downloaded installer path (wide string) when an update
/// is ready to run. Returns one of the `RUN_INSTALLER_*` values.
pub type UserRunInstallerCallback = unsafe extern "C" fn(*const u16) -> c_int;

/// `config_read`: writes the value of `name` into the caller-supplied wide
/// buffer of `len` units. Returns 1 if the key was found, 0 otherwise.
pub type ConfigReadFn =
    unsafe extern "C" fn(name: *const c_char, buf: *mut u16, len: usize, user: *mut c_void) -> c_int;

/// `config_write`: stores the wide `value` under `name`. Returns 1 on
/// success, 0 on failure.
pub type ConfigWriteFn =
    unsafe extern "C" fn(name: *const c_char, value: *const u16, user: *mut c_void) -> c_int;

/// `config_delete`: removes `name`. Returns 1 on success, 0 on failure.
pub type ConfigDeleteFn = unsafe extern "C" fn(name: *const c_char, user: *mut c_void) -> c_int;

/// Function table handed to `win_sparkle_set_config_methods` in place of
/// the registry-backed default storage. The native library keeps only this
/// pointer; the table must stay alive for the whole session.
#[repr(C)]
pub struct ConfigMethods {
    pub read: ConfigReadFn,
    pub write: ConfigWriteFn,
    pub delete: ConfigDeleteFn,
    /// Opaque value passed back as the `user` argument of each method.
    pub user_data: usize,
}

// Export signatures, in the order they appear in WinSparkle.h.
pub type InitFn = unsafe extern "C" fn();
pub type CleanupFn = unsafe extern "C" fn();
pub type SetLangFn = unsafe extern "C" fn(*const c_char);
pub type SetLangIdFn = unsafe extern "C" fn(c_ushort);
pub type SetAppcastUrlFn = unsafe extern "C" fn(*const c_char);
/// Shared by the DSA and EdDSA key setters: returns 0 if the key material
/// was rejected.
pub type SetPublicKeyFn = unsafe extern "C" fn(*const c_char) -> c_int;
pub type SetAppDetailsFn = unsafe extern "C" fn(*const u16, *const u16, *const u16);
pub type SetAppBuildVersionFn = unsafe extern "C" fn(*const u16);
pub type SetHttpHeaderFn = unsafe extern "C" fn(*const c_char, *const c_char);
pub type ClearHttpHeadersFn = unsafe extern "C" fn();
pub type SetRegistryPathFn = unsafe extern "C" fn(*const c_char);
pub type SetConfigMethodsFn = unsafe extern "C" fn(*const ConfigMethods);
pub type SetAutomaticCheckFn = unsafe extern "C" fn(c_int);
pub type GetAutomaticCheckFn = unsafe extern "C" fn() -> c_int;
pub type SetUpdateCheckIntervalFn = unsafe extern "C" fn(c_int);
pub type GetUpdateCheckIntervalFn = unsafe extern "C" fn() -> c_int;
/// Returns the Unix timestamp of the last check, or -1 if a check never ran.
pub type GetLastCheckTimeFn = unsafe extern "C" fn() -> i64;
pub type SetNotificationCallbackFn = unsafe extern "C" fn(NotificationCallback);
pub type SetCanShutdownCallbackFn = unsafe extern "C" fn(CanShutdownCallback);
pub type SetUserRunInstallerCallbackFn = unsafe extern "C" fn(UserRunInstallerCallback);
pub type CheckUpdateFn = unsafe extern "C" fn();
