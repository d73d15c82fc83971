//! Example application: configure the update feed, register callbacks, run
//! a UI check, and wait until the update is installed or cancelled.
//!
//! Needs `WinSparkle.dll` resolvable by the dynamic loader; point
//! `winsparkle::set_library_path` at it or ship it next to the binary.

use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    setup_tracing();

    info!("starting app");

    winsparkle::set_appcast_url("https://winsparkle.org/example/appcast.xml");
    winsparkle::set_app_details("winsparkle.org", "WinSparkle Rust Example", "1.0.0");
    winsparkle::set_eddsa_public_key("payYa5ap0XtF8HWR4AYBdCIcXWtJZPen7bJqFcqlp7o=")?;

    let (tx, rx) = mpsc::channel();

    let installing = tx.clone();
    winsparkle::set_shutdown_request_callback(move || {
        info!("installing update");
        let _ = installing.send(());
    });

    winsparkle::set_update_cancelled_callback(move || {
        info!("cancelled update");
        let _ = tx.send(());
    });

    winsparkle::init();

    winsparkle::check_update_with_ui();

    // Wait until the update is installed or cancelled (10 minute timeout).
    let _ = rx.recv_timeout(Duration::from_secs(600));

    info!("shutting down");
    winsparkle::cleanup();
    Ok(())
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
