//! String and primitive marshalling at the native boundary.
//!
//! WinSparkle takes narrow (UTF-8) strings for most parameters and wide
//! (UTF-16) strings for application metadata; strings it hands back (the
//! downloaded installer path, config keys in the storage bridge) arrive as
//! raw NUL-terminated pointers. Encoded buffers are owned on the Rust side
//! and only borrowed by the native call for its duration.

use std::ffi::{c_char, c_int, CString};

/// Upper bound on the number of units scanned while decoding a native
/// string. Real values never get anywhere near this; it caps the damage a
/// corrupt or unterminated pointer can do.
pub const MAX_DECODE_UNITS: usize = 1 << 20;

/// Encodes a string as a NUL-terminated byte buffer for narrow parameters.
///
/// Panics if the string contains an interior NUL byte. Such a string cannot
/// cross the boundary and always indicates caller misuse, not a runtime
/// condition.
pub fn narrow(text: &str) -> CString {
    match CString::new(text) {
        Ok(encoded) => encoded,
        Err(err) => panic!("interior NUL in string passed to WinSparkle: {err}"),
    }
}

/// Encodes a string as a NUL-terminated UTF-16 buffer for wide parameters.
///
/// Same interior-NUL contract as [`narrow`].
pub fn wide(text: &str) -> Vec<u16> {
    let mut units: Vec<u16> = text.encode_utf16().collect();
    if units.contains(&0) {
        panic!("interior NUL in string passed to WinSparkle: {text:?}");
    }
    units.push(0);
    units
}

/// Canonical boolean encoding at the boundary.
pub fn bool_to_int(flag: bool) -> c_int {
    if flag {
        1
    } else {
        0
    }
}

/// Decodes a NUL-terminated byte string from a raw pointer.
///
/// A NULL pointer, or a pointer to an immediate NUL, decodes to the empty
/// string. The scan is bounded by [`MAX_DECODE_UNITS`].
///
/// # Safety
///
/// `ptr` must be NULL or point to readable memory that is NUL-terminated
/// within [`MAX_DECODE_UNITS`] bytes.
pub unsafe fn narrow_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    while len < MAX_DECODE_UNITS && *ptr.add(len) != 0 {
        len += 1;
    }
    let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decodes a NUL-terminated UTF-16 string from a raw pointer.
///
/// Same NULL and bounding contract as [`narrow_to_string`].
///
/// # Safety
///
/// `ptr` must be NULL or point to readable memory that is NUL-terminated
/// within [`MAX_DECODE_UNITS`] units.
pub unsafe fn wide_to_string(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    while len < MAX_DECODE_UNITS && *ptr.add(len) != 0 {
        len += 1;
    }
    let units = std::slice::from_raw_parts(ptr, len);
    String::from_utf16_lossy(units)
}
