//! Host-facing API surface.
//!
//! Thin marshalled calls through the symbol table, one per WinSparkle
//! export. Encoded string buffers live in the calling frame, so they outlive
//! the native call that borrows them. All of these return almost
//! immediately; anything long-running happens on the native library's own
//! worker threads.

use std::ffi::c_int;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::abi;
use crate::dll;
use crate::error::Error;
use crate::marshal;

/// Starts WinSparkle.
///
/// If the library is configured to check for updates on startup it proceeds
/// to do so. Call this once the application is initialized and shows its
/// main window; all configuration and callback registration must already
/// have happened, because the automatic-check path may begin firing events
/// immediately.
pub fn init() {
    let init: abi::InitFn = dll::sym("win_sparkle_init");
    unsafe { init() };
}

/// Cleans up after WinSparkle.
///
/// Cancels any pending operations and shuts down the library's helper
/// threads; blocks until outstanding native-side work has quiesced. Call it
/// when the application is shutting down.
pub fn cleanup() {
    let cleanup: abi::CleanupFn = dll::sym("win_sparkle_cleanup");
    unsafe { cleanup() };
}

/// Sets the UI language from an ISO code such as `"fr"` or `"pt-BR"`.
///
/// Must be called before [`init`].
pub fn set_lang(lang: &str) {
    let lang = marshal::narrow(lang);
    let set: abi::SetLangFn = dll::sym("win_sparkle_set_lang");
    unsafe { set(lang.as_ptr()) };
}

/// Sets the UI language from a Win32 `LANGID` code.
///
/// Must be called before [`init`].
pub fn set_langid(langid: u16) {
    let set: abi::SetLangIdFn = dll::sym("win_sparkle_set_langid");
    unsafe { set(langid) };
}

/// Sets the URL of the application's appcast feed.
///
/// Only `http` and `https` schemes are supported, and feeds should always
/// be served over HTTPS; an unencrypted feed both leaks user information
/// and opens the update channel to tampering. Without this call the URL is
/// taken from the Windows resource named `FeedURL` of type `APPCAST`.
pub fn set_appcast_url(url: &str) {
    let url = marshal::narrow(url);
    let set: abi::SetAppcastUrlFn = dll::sym("win_sparkle_set_appcast_url");
    unsafe { set(url.as_ptr()) };
}

/// Sets the DSA public key used to verify update signatures, in PEM format.
///
/// Returns an error if the PEM data does not contain a valid DSA public
/// key. Without this call the key is taken from the Windows resource named
/// `DSAPub` of type `DSAPEM`.
pub fn set_dsa_pub_pem(pem: &str) -> Result<(), Error> {
    let pem = marshal::narrow(pem);
    let set: abi::SetPublicKeyFn = dll::sym("win_sparkle_set_dsa_pub_pem");
    if unsafe { set(pem.as_ptr()) } == 0 {
        return Err(Error::InvalidDsaPublicKey);
    }
    Ok(())
}

/// Sets the EdDSA (Ed25519) public key used to verify update signatures,
/// as a base64-encoded string.
///
/// Returns an error if the key is not valid. Without this call the key is
/// taken from the Windows resource named `EdDSAPub` of type `EDDSAPEM`.
pub fn set_eddsa_public_key(key: &str) -> Result<(), Error> {
    let key = marshal::narrow(key);
    let set: abi::SetPublicKeyFn = dll::sym("win_sparkle_set_eddsa_public_key");
    if unsafe { set(key.as_ptr()) } == 0 {
        return Err(Error::InvalidEdDsaPublicKey);
    }
    Ok(())
}

/// Sets application metadata.
///
/// Normally these come from `VERSIONINFO`/`StringFileInfo` resources; this
/// is the alternative for applications that do not carry them. `app_name`
/// is shown to the user and used in the HTTP `User-Agent` header.
/// `company` and `app_name` also determine where the native library keeps
/// its settings (`HKCU\Software\<company>\<app>\WinSparkle`).
pub fn set_app_details(company: &str, app_name: &str, version: &str) {
    let company = marshal::wide(company);
    let app_name = marshal::wide(app_name);
    let version = marshal::wide(version);
    let set: abi::SetAppDetailsFn = dll::sym("win_sparkle_set_app_details");
    unsafe { set(company.as_ptr(), app_name.as_ptr(), version.as_ptr()) };
}

/// Sets the internal build version number.
///
/// When set, this build number is what gets compared against the appcast's
/// `version` attribute (the appcast must then carry a human-readable
/// `shortVersionString` as well), while the version from
/// [`set_app_details`] is used for display. Useful for interim builds with
/// finer granularity than release versions.
pub fn set_app_build_version(build: &str) {
    let build = marshal::wide(build);
    let set: abi::SetAppBuildVersionFn = dll::sym("win_sparkle_set_app_build_version");
    unsafe { set(build.as_ptr()) };
}

/// Adds a custom HTTP header to appcast checks.
pub fn set_http_header(name: &str, value: &str) {
    let name = marshal::narrow(name);
    let value = marshal::narrow(value);
    let set: abi::SetHttpHeaderFn = dll::sym("win_sparkle_set_http_header");
    unsafe { set(name.as_ptr(), value.as_ptr()) };
}

/// Removes all custom HTTP headers added with [`set_http_header`].
pub fn clear_http_headers() {
    let clear: abi::ClearHttpHeadersFn = dll::sym("win_sparkle_clear_http_headers");
    unsafe { clear() };
}

/// Sets the registry path where the native library stores its settings,
/// relative to the `HKCU`/`HKLM` root, e.g. `"Software\\My App\\Updates"`.
///
/// Only relevant while the default registry storage is active; a
/// [`crate::ConfigStore`] supersedes it entirely.
pub fn set_registry_path(path: &str) {
    let path = marshal::narrow(path);
    let set: abi::SetRegistryPathFn = dll::sym("win_sparkle_set_registry_path");
    unsafe { set(path.as_ptr()) };
}

/// Sets whether updates are checked automatically or only on manual calls.
///
/// With automatic checks disabled, use [`check_update_with_ui`] explicitly.
pub fn set_automatic_check_for_updates(check: bool) {
    let set: abi::SetAutomaticCheckFn = dll::sym("win_sparkle_set_automatic_check_for_updates");
    unsafe { set(marshal::bool_to_int(check)) };
}

/// Returns whether updates are checked automatically.
///
/// Defaults to false until configured, as happens on first start.
pub fn get_automatic_check_for_updates() -> bool {
    let get: abi::GetAutomaticCheckFn = dll::sym("win_sparkle_get_automatic_check_for_updates");
    unsafe { get() == 1 }
}

/// Sets the interval between automatic update checks.
///
/// The native library enforces a minimum of one hour.
pub fn set_update_check_interval(interval: Duration) {
    let seconds = c_int::try_from(interval.as_secs()).unwrap_or(c_int::MAX);
    let set: abi::SetUpdateCheckIntervalFn = dll::sym("win_sparkle_set_update_check_interval");
    unsafe { set(seconds) };
}

/// Returns the interval between automatic update checks. Defaults to one
/// day.
pub fn get_update_check_interval() -> Duration {
    let get: abi::GetUpdateCheckIntervalFn = dll::sym("win_sparkle_get_update_check_interval");
    let seconds = unsafe { get() };
    Duration::from_secs(seconds.max(0) as u64)
}

/// Returns the time of the last update check, or `None` if a check has
/// never run.
pub fn get_last_check_time() -> Option<DateTime<Utc>> {
    let get: abi::GetLastCheckTimeFn = dll::sym("win_sparkle_get_last_check_time");
    let timestamp = unsafe { get() };
    if timestamp < 0 {
        return None;
    }
    DateTime::from_timestamp(timestamp, 0)
}

/// Checks for updates, showing progress UI to the user.
///
/// Intended for a "Check for updates..." menu item: a background check is
/// started and a small progress window keeps the user informed, ending in
/// either the "update available" or the "you are up to date" dialog.
/// Returns immediately. Because the check is user-initiated, it ignores a
/// previously chosen "Skip this version".
pub fn check_update_with_ui() {
    let check: abi::CheckUpdateFn = dll::sym("win_sparkle_check_update_with_ui");
    unsafe { check() };
}

/// Checks for updates with progress UI and installs immediately when one
/// is found, skipping the update prompt.
///
/// For applications whose users should essentially always run the newest
/// version. Pair it with [`crate::set_did_not_find_update_callback`] and
/// [`crate::set_update_cancelled_callback`] to learn how the flow ended.
/// Returns immediately.
pub fn check_update_with_ui_and_install() {
    let check: abi::CheckUpdateFn = dll::sym("win_sparkle_check_update_with_ui_and_install");
    unsafe { check() };
}

/// Checks for updates without progress UI.
///
/// The "update available" dialog still appears if an update is found, so
/// this is not completely UI-less. Respects "Skip this version". Returns
/// immediately; usually the automatic interval checks or
/// [`check_update_with_ui`] are the better fit.
pub fn check_update_without_ui() {
    let check: abi::CheckUpdateFn = dll::sym("win_sparkle_check_update_without_ui");
    unsafe { check() };
}
