//! End-to-end tests against the real WinSparkle.dll.
//!
//! These drive the native update engine against a local appcast feed and
//! observe the outcome through the registered callbacks. They need
//! `WinSparkle.dll` resolvable on the library search path, so they are
//! ignored by default; run them with `cargo test -- --ignored` on a
//! machine that ships the DLL.

#![cfg(windows)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// The engine is process-global state, so the tests must not interleave.
static ENGINE: Mutex<()> = Mutex::new(());

fn setup() -> std::sync::MutexGuard<'static, ()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    ENGINE.lock().unwrap()
}

/// Serves a minimal appcast advertising `version` on a local port and
/// returns the feed URL. The server thread lives until the process exits.
fn feed_server(version: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let body = format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<rss version="2.0" xmlns:sparkle="http://www.andymatuschak.org/xml-namespaces/sparkle">"#,
            "<channel><title>Test Appcast</title><language>en</language><item>",
            "<title>Version {version}</title>",
            r#"<enclosure sparkle:version="{version}" url="http://{addr}/install.msi" length="0" type="application/octet-stream"/>"#,
            "</item></channel></rss>"
        ),
        version = version,
        addr = addr,
    );
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            // Drain the request headers before answering.
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/appcast.xml")
}

fn expect_event(rx: &mpsc::Receiver<&'static str>, event: &str) {
    match rx.recv_timeout(Duration::from_secs(5)) {
        Ok(received) => assert_eq!(received, event),
        Err(_) => panic!("timed out waiting for {event} callback"),
    }
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn last_check_time_advances_after_check() {
    let _engine = setup();

    winsparkle::set_app_details("Test", "Test", "1.0");
    winsparkle::set_appcast_url(&feed_server("1.0"));

    let before = winsparkle::get_last_check_time();

    winsparkle::init();
    winsparkle::check_update_without_ui();
    thread::sleep(Duration::from_secs(1));

    let after = winsparkle::get_last_check_time();
    assert!(after > before, "check should update the last-check time");

    winsparkle::cleanup();
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn newer_version_fires_did_find_update() {
    let _engine = setup();

    winsparkle::set_app_details("Test", "Test", "1.0.0");
    winsparkle::set_appcast_url(&feed_server("2.0.0"));

    let (tx, rx) = mpsc::channel();
    let found = tx.clone();
    winsparkle::set_did_find_update_callback(move || {
        let _ = found.send("did-find-update");
    });
    winsparkle::set_did_not_find_update_callback(move || {
        let _ = tx.send("did-not-find-update");
    });

    winsparkle::init();
    winsparkle::check_update_without_ui();

    expect_event(&rx, "did-find-update");
    winsparkle::cleanup();
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn same_version_fires_did_not_find_update() {
    let _engine = setup();

    winsparkle::set_app_details("Test", "Test", "1.0");
    winsparkle::set_appcast_url(&feed_server("1.0"));

    let (tx, rx) = mpsc::channel();
    let found = tx.clone();
    winsparkle::set_did_find_update_callback(move || {
        let _ = found.send("did-find-update");
    });
    winsparkle::set_did_not_find_update_callback(move || {
        let _ = tx.send("did-not-find-update");
    });

    winsparkle::init();
    winsparkle::check_update_without_ui();

    expect_event(&rx, "did-not-find-update");
    winsparkle::cleanup();
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn unreachable_feed_fires_error_callback() {
    let _engine = setup();

    winsparkle::set_app_details("Test", "Test", "1.0");
    winsparkle::set_appcast_url("http://127.0.0.1:1/appcast.xml");

    let (tx, rx) = mpsc::channel();
    let errored = tx.clone();
    winsparkle::set_error_callback(move || {
        let _ = errored.send("error");
    });
    winsparkle::set_did_find_update_callback({
        let tx = tx.clone();
        move || {
            let _ = tx.send("did-find-update");
        }
    });
    winsparkle::set_did_not_find_update_callback(move || {
        let _ = tx.send("did-not-find-update");
    });

    winsparkle::init();
    winsparkle::check_update_without_ui();

    expect_event(&rx, "error");
    winsparkle::cleanup();
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn install_flow_queries_can_shutdown() {
    let _engine = setup();

    winsparkle::set_app_details("Test", "Test", "1.0.0");
    winsparkle::set_appcast_url(&feed_server("2.0.0"));

    let (tx, rx) = mpsc::channel();
    winsparkle::set_can_shutdown_callback(move || {
        let _ = tx.send("can-shutdown");
        true
    });

    winsparkle::init();
    winsparkle::check_update_with_ui_and_install();

    expect_event(&rx, "can-shutdown");
    winsparkle::cleanup();
}

#[test]
#[ignore = "requires WinSparkle.dll on the library search path"]
fn setter_round_trips_through_config_store() {
    #[derive(Default)]
    struct SharedStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl winsparkle::ConfigStore for Arc<SharedStore> {
        fn read(&self, name: &str) -> Option<String> {
            self.entries.lock().unwrap().get(name).cloned()
        }
        fn write(&self, name: &str, value: &str) -> bool {
            self.entries
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
            true
        }
        fn delete(&self, name: &str) -> bool {
            self.entries.lock().unwrap().remove(name).is_some()
        }
    }

    let _engine = setup();

    let store = Arc::new(SharedStore::default());
    winsparkle::set_config_store(store.clone());
    winsparkle::set_app_details("Test", "Test", "1.0");
    winsparkle::set_appcast_url(&feed_server("1.0"));

    winsparkle::init();
    winsparkle::set_automatic_check_for_updates(true);

    // The setter must have persisted through our store, not the registry,
    // and the getter must observe the same value back through it.
    assert!(!store.entries.lock().unwrap().is_empty());
    assert!(winsparkle::get_automatic_check_for_updates());

    winsparkle::cleanup();
}
