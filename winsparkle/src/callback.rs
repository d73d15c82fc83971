//! Callback registration and the trampoline table.
//!
//! The native library accepts plain C function pointers, so each event kind
//! gets a fixed `extern "C"` trampoline that reads a process-wide handler
//! slot at call time. Registering a handler stores it in the slot first and
//! only then installs the trampoline, because the engine may start firing
//! events the moment a callback is known to it. Re-registration replaces
//! the previous handler.
//!
//! Callbacks arrive on a worker thread owned by the native library, never
//! on the registering thread, which is why the slots are mutexes and
//! handlers must be `Send`. A panicking handler is caught and logged here;
//! unwinding through the foreign call frame would be undefined behavior.

use std::ffi::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use tracing::error;

use crate::abi;
use crate::dll;
use crate::marshal;

type Notification = Box<dyn Fn() + Send>;
type ShutdownQuery = Box<dyn Fn() -> bool + Send>;
type RunInstaller = Box<dyn Fn(&str) -> anyhow::Result<bool> + Send>;

static CAN_SHUTDOWN: Mutex<Option<ShutdownQuery>> = Mutex::new(None);
static USER_RUN_INSTALLER: Mutex<Option<RunInstaller>> = Mutex::new(None);

/// Invokes a notification handler, containing any panic on this side of
/// the boundary.
///
/// The guard is held outside `catch_unwind` so a panicking handler cannot
/// unwind through the guard's drop and poison the slot.
fn fire(slot: &Mutex<Option<Notification>>, kind: &str) {
    let guard = slot.lock().unwrap();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if let Some(handler) = guard.as_ref() {
            handler();
        }
    }));
    if outcome.is_err() {
        error!(callback = kind, "update callback panicked; swallowed at the native boundary");
    }
}

macro_rules! notification_callback {
    ($(#[$doc:meta])* $setter:ident, $slot:ident, $trampoline:ident, $export:literal, $kind:literal) => {
        static $slot: Mutex<Option<Notification>> = Mutex::new(None);

        unsafe extern "C" fn $trampoline() -> c_int {
            fire(&$slot, $kind);
            0
        }

        $(#[$doc])*
        pub fn $setter(callback: impl Fn() + Send + 'static) {
            *$slot.lock().unwrap() = Some(Box::new(callback));
            let install: abi::SetNotificationCallbackFn = dll::sym($export);
            unsafe { install($trampoline) };
        }
    };
}

notification_callback!(
    /// Sets the callback invoked when the updater encounters an error.
    ///
    /// Runtime failures (unreachable feed, malformed appcast, signature
    /// mismatch) surface only through this callback; without one they are
    /// silent.
    set_error_callback,
    ERROR,
    error_trampoline,
    "win_sparkle_set_error_callback",
    "error"
);

notification_callback!(
    /// Sets the callback invoked when the application should shut down,
    /// immediately after the installer was launched. Its implementation
    /// should gracefully terminate the application.
    set_shutdown_request_callback,
    SHUTDOWN_REQUEST,
    shutdown_request_trampoline,
    "win_sparkle_set_shutdown_request_callback",
    "shutdown-request"
);

notification_callback!(
    /// Sets the callback invoked when a check found an update.
    ///
    /// Useful together with [`crate::check_update_with_ui_and_install`] to
    /// run code once the check has concluded.
    set_did_find_update_callback,
    DID_FIND_UPDATE,
    did_find_update_trampoline,
    "win_sparkle_set_did_find_update_callback",
    "did-find-update"
);

notification_callback!(
    /// Sets the callback invoked when a check found no update.
    set_did_not_find_update_callback,
    DID_NOT_FIND_UPDATE,
    did_not_find_update_trampoline,
    "win_sparkle_set_did_not_find_update_callback",
    "did-not-find-update"
);

notification_callback!(
    /// Sets the callback invoked when the user cancels a download.
    set_update_cancelled_callback,
    UPDATE_CANCELLED,
    update_cancelled_trampoline,
    "win_sparkle_set_update_cancelled_callback",
    "update-cancelled"
);

notification_callback!(
    /// Sets the callback invoked when the user skips the offered version.
    set_update_skipped_callback,
    UPDATE_SKIPPED,
    update_skipped_trampoline,
    "win_sparkle_set_update_skipped_callback",
    "update-skipped"
);

notification_callback!(
    /// Sets the callback invoked when the user chose "remind me later".
    set_update_postponed_callback,
    UPDATE_POSTPONED,
    update_postponed_trampoline,
    "win_sparkle_set_update_postponed_callback",
    "update-postponed"
);

notification_callback!(
    /// Sets the callback invoked when the user closes the update dialog
    /// without making a choice.
    set_update_dismissed_callback,
    UPDATE_DISMISSED,
    update_dismissed_trampoline,
    "win_sparkle_set_update_dismissed_callback",
    "update-dismissed"
);

unsafe extern "C" fn can_shutdown_trampoline() -> c_int {
    let guard = CAN_SHUTDOWN.lock().unwrap();
    let verdict = catch_unwind(AssertUnwindSafe(|| {
        // No handler means nothing objects to shutting down.
        guard.as_ref().map_or(true, |handler| handler())
    }));
    match verdict {
        Ok(can_shutdown) => marshal::bool_to_int(can_shutdown),
        Err(_) => {
            error!(
                callback = "can-shutdown",
                "update callback panicked; answering that shutdown is not safe"
            );
            0
        }
    }
}

/// Sets the callback that decides whether the application can be closed.
///
/// The native library blocks on this synchronous query before launching an
/// installer and does not proceed until it receives an answer. Return
/// `false` while there is unsaved state.
pub fn set_can_shutdown_callback(callback: impl Fn() -> bool + Send + 'static) {
    *CAN_SHUTDOWN.lock().unwrap() = Some(Box::new(callback));
    let install: abi::SetCanShutdownCallbackFn = dll::sym("win_sparkle_set_can_shutdown_callback");
    unsafe { install(can_shutdown_trampoline) };
}

unsafe extern "C" fn user_run_installer_trampoline(path: *const u16) -> c_int {
    let path = marshal::wide_to_string(path);
    let guard = USER_RUN_INSTALLER.lock().unwrap();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        guard.as_ref().map(|handler| handler(&path))
    }));
    match outcome {
        Ok(None) | Ok(Some(Ok(false))) => abi::RUN_INSTALLER_DEFAULT,
        Ok(Some(Ok(true))) => abi::RUN_INSTALLER_HANDLED,
        Ok(Some(Err(err))) => {
            error!(callback = "user-run-installer", error = %err, "handler failed");
            abi::RUN_INSTALLER_ERROR
        }
        Err(_) => {
            error!(
                callback = "user-run-installer",
                "update callback panicked; aborting the install flow"
            );
            abi::RUN_INSTALLER_ERROR
        }
    }
}

/// Sets the callback that runs the downloaded installer instead of the
/// native library's default handling.
///
/// The handler receives the path of the downloaded file. `Ok(true)` means
/// the host handled the installer and the library should skip its default
/// handling; `Ok(false)` lets the default handling run; an error aborts the
/// install flow.
pub fn set_user_run_installer_callback(
    callback: impl Fn(&str) -> anyhow::Result<bool> + Send + 'static,
) {
    *USER_RUN_INSTALLER.lock().unwrap() = Some(Box::new(callback));
    let install: abi::SetUserRunInstallerCallbackFn =
        dll::sym("win_sparkle_set_user_run_installer_callback");
    unsafe { install(user_run_installer_trampoline) };
}
