//! FFI bindings for Sonora
//!
//! This module provides C-compatible functions for calling Sonora from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `sonora_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::RecommenderConfig;
use crate::model::{FileModelLoader, ModelSlot};
use crate::recommender::{recommend, Recommender};
use crate::types::{BiometricSnapshot, SoundRecommendation};

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

fn recommendation_to_cstr(rec: &SoundRecommendation) -> *mut c_char {
    match serde_json::to_string(rec) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn parse_snapshot(json: &str) -> Option<BiometricSnapshot> {
    match serde_json::from_str(json) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            set_last_error(&format!("Invalid biometrics JSON: {}", e));
            None
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a recommendation and return it as JSON.
///
/// # Safety
/// - `mood` and `biometrics_json` must be valid null-terminated C strings.
/// - `prior_json` may be NULL, in which case the default descriptor is the prior.
/// - Returns a newly allocated string that must be freed with `sonora_free_string`.
/// - Returns NULL on error; call `sonora_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommend(
    mood: *const c_char,
    biometrics_json: *const c_char,
    prior_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let mood_str = match cstr_to_string(mood) {
        Some(s) => s,
        None => {
            set_last_error("Invalid mood string pointer");
            return ptr::null_mut();
        }
    };

    let biometrics_str = match cstr_to_string(biometrics_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid biometrics string pointer");
            return ptr::null_mut();
        }
    };

    let Some(snapshot) = parse_snapshot(&biometrics_str) else {
        return ptr::null_mut();
    };

    let prior = match cstr_to_string(prior_json) {
        Some(json) => match serde_json::from_str::<SoundRecommendation>(&json) {
            Ok(prior) => prior,
            Err(e) => {
                set_last_error(&format!("Invalid prior recommendation JSON: {}", e));
                return ptr::null_mut();
            }
        },
        None => SoundRecommendation::default(),
    };

    recommendation_to_cstr(&recommend(&mood_str, &snapshot, &prior, None))
}

// ============================================================================
// Stateful Recommender API
// ============================================================================

/// Opaque handle to a Recommender
pub struct RecommenderHandle {
    recommender: Recommender,
}

/// Create a new Recommender.
///
/// # Safety
/// - `config_json` may be NULL for default settings.
/// - Must be freed with `sonora_recommender_free`.
/// - Returns NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_new(config_json: *const c_char) -> *mut RecommenderHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        Some(json) => match RecommenderConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => RecommenderConfig::default(),
    };

    let handle = Box::new(RecommenderHandle {
        recommender: Recommender::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a Recommender.
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_free(recommender: *mut RecommenderHandle) {
    if !recommender.is_null() {
        drop(Box::from_raw(recommender));
    }
}

/// Start loading a model file in the background.
///
/// Recommendations made before the load finishes are unrefined. A failed load
/// is logged and leaves the recommender working without a model.
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - `model_path` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_load_model(
    recommender: *mut RecommenderHandle,
    model_path: *const c_char,
) -> i32 {
    clear_last_error();

    if recommender.is_null() {
        set_last_error("Null recommender pointer");
        return -1;
    }

    let handle = &mut *recommender;

    let path = match cstr_to_string(model_path) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model path pointer");
            return -1;
        }
    };

    handle
        .recommender
        .set_model(ModelSlot::spawn(FileModelLoader::new(path)));
    0
}

/// Recommend with the stateful recommender and return the new descriptor as JSON.
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - `mood` and `biometrics_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sonora_free_string`.
/// - Returns NULL on error; call `sonora_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_recommend(
    recommender: *mut RecommenderHandle,
    mood: *const c_char,
    biometrics_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if recommender.is_null() {
        set_last_error("Null recommender pointer");
        return ptr::null_mut();
    }

    let handle = &mut *recommender;

    let mood_str = match cstr_to_string(mood) {
        Some(s) => s,
        None => {
            set_last_error("Invalid mood string pointer");
            return ptr::null_mut();
        }
    };

    let biometrics_str = match cstr_to_string(biometrics_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid biometrics string pointer");
            return ptr::null_mut();
        }
    };

    let Some(snapshot) = parse_snapshot(&biometrics_str) else {
        return ptr::null_mut();
    };

    recommendation_to_cstr(handle.recommender.recommend(&mood_str, &snapshot))
}

/// Get the current descriptor as JSON.
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - Returns a newly allocated string that must be freed with `sonora_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_current(
    recommender: *mut RecommenderHandle,
) -> *mut c_char {
    clear_last_error();

    if recommender.is_null() {
        set_last_error("Null recommender pointer");
        return ptr::null_mut();
    }

    let handle = &*recommender;
    recommendation_to_cstr(handle.recommender.current())
}

/// Restore the current descriptor from JSON.
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_load_current(
    recommender: *mut RecommenderHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if recommender.is_null() {
        set_last_error("Null recommender pointer");
        return -1;
    }

    let handle = &mut *recommender;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.recommender.load_current(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Set the listener volume (clamped to 0-1).
///
/// # Safety
/// - `recommender` must be a valid pointer returned by `sonora_recommender_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn sonora_recommender_set_volume(
    recommender: *mut RecommenderHandle,
    volume: f64,
) -> i32 {
    clear_last_error();

    if recommender.is_null() {
        set_last_error("Null recommender pointer");
        return -1;
    }

    (*recommender).recommender.set_volume(volume);
    0
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Sonora functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Sonora function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sonora_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Sonora function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sonora_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Sonora library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sonora_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
