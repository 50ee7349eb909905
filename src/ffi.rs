//! FFI bindings for Vitals
//!
//! This module provides C-compatible functions for calling Vitals from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `vitals_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::GeneratorConfig;
use crate::correlation::correlate;
use crate::error::ComputeError;
use crate::generator::SnapshotGenerator;
use crate::pipeline::{
    generate_snapshot_with, insights_from_json, snapshot_from_json, snapshot_to_json,
    summaries_from_json,
};
use crate::store::SnapshotStore;
use crate::types::{HealthSnapshot, MetricSeries};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Negative seeds select an entropy-seeded source
fn seed_from_ffi(seed: i64) -> Option<u64> {
    u64::try_from(seed).ok()
}

fn snapshot_result_to_cstr(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Generate a snapshot for today and return it as JSON.
///
/// # Safety
/// - Pass a negative `seed` for an entropy-seeded snapshot.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error; call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_generate_snapshot(seed: i64) -> *mut c_char {
    clear_last_error();

    let result = generate_snapshot_with(GeneratorConfig::default(), seed_from_ffi(seed))
        .and_then(|snapshot| snapshot_to_json(&snapshot));
    snapshot_result_to_cstr(result)
}

/// Compute the health score of a JSON snapshot.
///
/// # Safety
/// - `snapshot_json` must be a valid null-terminated C string.
/// - Returns the score (0-100), or -1 on error; call `vitals_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn vitals_health_score(snapshot_json: *const c_char) -> i32 {
    clear_last_error();

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return -1;
        }
    };

    match snapshot_from_json(&json_str) {
        Ok(snapshot) => crate::score::compute_health_score(&snapshot),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Correlate two JSON series (`[{"date": "YYYY-MM-DD", "value": n}, ...]`).
///
/// # Safety
/// - `series_a` and `series_b` must be valid null-terminated C strings.
/// - `out` must point to writable memory for one `f64`.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_correlate(
    series_a: *const c_char,
    series_b: *const c_char,
    out: *mut f64,
) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error("Null output pointer");
        return -1;
    }

    let (a_str, b_str) = match (cstr_to_string(series_a), cstr_to_string(series_b)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            set_last_error("Invalid series string pointer");
            return -1;
        }
    };

    let parsed = serde_json::from_str::<MetricSeries>(&a_str)
        .and_then(|a| serde_json::from_str::<MetricSeries>(&b_str).map(|b| (a, b)));

    match parsed {
        Ok((a, b)) => {
            *out = correlate(&a, &b);
            0
        }
        Err(e) => {
            set_last_error(&ComputeError::from(e).to_string());
            -1
        }
    }
}

/// Correlate every pair of the comma-separated metrics of a JSON snapshot.
///
/// # Safety
/// - `snapshot_json` and `metrics_csv` must be valid null-terminated C strings.
/// - Returns a newly allocated JSON array that must be freed with `vitals_free_string`.
/// - Returns NULL on error; call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_insights(
    snapshot_json: *const c_char,
    metrics_csv: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    let metrics_str = match cstr_to_string(metrics_csv) {
        Some(s) => s,
        None => {
            set_last_error("Invalid metrics string pointer");
            return ptr::null_mut();
        }
    };

    let names: Vec<&str> = metrics_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let result = insights_from_json(&json_str, &names)
        .and_then(|results| serde_json::to_string(&results).map_err(ComputeError::from));
    snapshot_result_to_cstr(result)
}

/// Summarise every metric of a JSON snapshot (goal progress, mood level, trend).
///
/// # Safety
/// - `snapshot_json` must be a valid null-terminated C string.
/// - Returns a newly allocated JSON array that must be freed with `vitals_free_string`.
/// - Returns NULL on error; call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_metric_summaries(snapshot_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid snapshot string pointer");
            return ptr::null_mut();
        }
    };

    let result = summaries_from_json(&json_str)
        .and_then(|summaries| serde_json::to_string(&summaries).map_err(ComputeError::from));
    snapshot_result_to_cstr(result)
}

// ============================================================================
// Session Store API
// ============================================================================

/// Opaque handle to a SnapshotStore
pub struct VitalsStoreHandle {
    store: SnapshotStore,
}

fn current_to_json(snapshot: Option<std::sync::Arc<HealthSnapshot>>) -> Result<String, ComputeError> {
    match snapshot {
        Some(snapshot) => snapshot_to_json(&snapshot),
        None => Ok("null".to_string()),
    }
}

/// Open a session store and generate its first snapshot.
///
/// # Safety
/// - Pass a negative `seed` for an entropy-seeded session.
/// - Returns a pointer to a newly allocated store.
/// - Must be freed with `vitals_store_free`.
#[no_mangle]
pub unsafe extern "C" fn vitals_store_new(seed: i64) -> *mut VitalsStoreHandle {
    clear_last_error();

    let generator = match seed_from_ffi(seed) {
        Some(seed) => SnapshotGenerator::from_seed(seed),
        None => SnapshotGenerator::from_entropy(),
    };
    let handle = Box::new(VitalsStoreHandle {
        store: SnapshotStore::open(generator),
    });
    Box::into_raw(handle)
}

/// Free a session store.
///
/// # Safety
/// - `store` must be a valid pointer returned by `vitals_store_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitals_store_free(store: *mut VitalsStoreHandle) {
    if !store.is_null() {
        let handle = Box::from_raw(store);
        handle.store.close();
    }
}

/// Regenerate the store's snapshot and return it as JSON.
///
/// # Safety
/// - `store` must be a valid pointer returned by `vitals_store_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error (including when another sync is in flight); call
///   `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_store_sync(store: *const VitalsStoreHandle) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let handle = &*store;
    let result = handle
        .store
        .try_sync()
        .and_then(|snapshot| snapshot_to_json(&snapshot));
    snapshot_result_to_cstr(result)
}

/// Return the store's current snapshot as JSON (`null` once closed).
///
/// # Safety
/// - `store` must be a valid pointer returned by `vitals_store_new`.
/// - Returns a newly allocated string that must be freed with `vitals_free_string`.
/// - Returns NULL on error; call `vitals_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn vitals_store_current(store: *const VitalsStoreHandle) -> *mut c_char {
    clear_last_error();

    if store.is_null() {
        set_last_error("Null store pointer");
        return ptr::null_mut();
    }

    let handle = &*store;
    snapshot_result_to_cstr(current_to_json(handle.store.current()))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Vitals functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Vitals function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn vitals_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Vitals function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn vitals_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Vitals library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn vitals_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
