//! Rust bindings for WinSparkle.
//!
//! WinSparkle is a plug-and-forget software update library for Windows
//! applications, sharing the appcast update format (and much of the user
//! experience) with the Sparkle framework for macOS. See
//! <https://winsparkle.org> for the library itself.
//!
//! This crate is a thin binding: it loads `WinSparkle.dll` at first use,
//! marshals strings and booleans across the boundary, and bridges callbacks
//! and the optional configuration-storage override back into Rust. All of
//! the update machinery (appcast fetching, signature verification, download
//! and install UI, scheduling, settings persistence) lives in the native
//! library.
//!
//! Configuration calls and callback registration must happen before
//! [`init`], because the engine may start checking for updates immediately.
//! Callbacks fire on a worker thread owned by the native library, never on
//! the thread that registered them.

pub mod abi;
pub mod callback;
pub mod config;
pub mod dll;
pub mod error;
pub mod marshal;
pub mod updater;

pub use callback::{
    set_can_shutdown_callback, set_did_find_update_callback, set_did_not_find_update_callback,
    set_error_callback, set_shutdown_request_callback, set_update_cancelled_callback,
    set_update_dismissed_callback, set_update_postponed_callback, set_update_skipped_callback,
    set_user_run_installer_callback,
};
pub use config::{set_config_store, ConfigStore};
pub use dll::{prepend_search_path, set_library_path};
pub use error::Error;
pub use updater::{
    check_update_with_ui, check_update_with_ui_and_install, check_update_without_ui, cleanup,
    get_automatic_check_for_updates, get_last_check_time, get_update_check_interval, init,
    set_app_build_version, set_app_details, set_appcast_url, set_automatic_check_for_updates,
    set_dsa_pub_pem, set_eddsa_public_key, set_http_header, set_lang, set_langid,
    set_registry_path, set_update_check_interval, clear_http_headers,
};
