//! FFI bindings for hypnoflux
//!
//! This module provides C-compatible functions for calling hypnoflux from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `hypno_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ShaperConfig;
use crate::pipeline::{csv_to_chart_json, csv_to_chart_json_with_config, ShapePipeline};
use crate::schema::InputFormat;

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

/// Input format codes accepted by `hypno_pipeline_shape`
fn input_format_from_code(code: i32) -> Option<InputFormat> {
    match code {
        0 => Some(InputFormat::Csv),
        1 => Some(InputFormat::Json),
        2 => Some(InputFormat::Ndjson),
        _ => None,
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Shape a hypnogram CSV and return the chart JSON payload.
///
/// # Safety
/// - `csv` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hypno_free_string`.
/// - Returns NULL on error; call `hypno_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hypno_csv_to_chart(csv: *const c_char) -> *mut c_char {
    clear_last_error();

    let csv_str = match cstr_to_string(csv) {
        Some(s) => s,
        None => {
            set_last_error("Invalid CSV string pointer");
            return ptr::null_mut();
        }
    };

    match csv_to_chart_json(csv_str) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Shape a hypnogram CSV with a JSON configuration.
///
/// # Safety
/// - `csv` and `config_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `hypno_free_string`.
/// - Returns NULL on error; call `hypno_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hypno_csv_to_chart_with_config(
    csv: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let csv_str = match cstr_to_string(csv) {
        Some(s) => s,
        None => {
            set_last_error("Invalid CSV string pointer");
            return ptr::null_mut();
        }
    };

    let config_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    match csv_to_chart_json_with_config(csv_str, config_str) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Pipeline Handle API
// ============================================================================

/// Opaque handle to a ShapePipeline
pub struct ShapePipelineHandle {
    pipeline: ShapePipeline,
}

/// Create a pipeline from a JSON configuration, or defaults when NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `hypno_pipeline_free`.
/// - Returns NULL on error; call `hypno_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hypno_pipeline_new(config_json: *const c_char) -> *mut ShapePipelineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        ShaperConfig::default()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match ShaperConfig::from_json(&config_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(ShapePipelineHandle {
        pipeline: ShapePipeline::new(config),
    });
    Box::into_raw(handle)
}

/// Free a pipeline.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `hypno_pipeline_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hypno_pipeline_free(pipeline: *mut ShapePipelineHandle) {
    if !pipeline.is_null() {
        drop(Box::from_raw(pipeline));
    }
}

/// Shape one night of input with a pipeline.
///
/// `format` is 0 for CSV, 1 for a JSON array, 2 for NDJSON.
///
/// # Safety
/// - `pipeline` must be a valid pointer returned by `hypno_pipeline_new`.
/// - `input` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hypno_free_string`.
/// - Returns NULL on error; call `hypno_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hypno_pipeline_shape(
    pipeline: *const ShapePipelineHandle,
    input: *const c_char,
    format: i32,
) -> *mut c_char {
    clear_last_error();

    if pipeline.is_null() {
        set_last_error("Null pipeline pointer");
        return ptr::null_mut();
    }

    let handle = &*pipeline;

    let input_str = match cstr_to_string(input) {
        Some(s) => s,
        None => {
            set_last_error("Invalid input string pointer");
            return ptr::null_mut();
        }
    };

    let Some(format) = input_format_from_code(format) else {
        set_last_error(&format!("Unknown input format code {format}"));
        return ptr::null_mut();
    };

    match handle.pipeline.shape_to_json(&input_str, format) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by hypnoflux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a hypnoflux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hypno_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next hypnoflux call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn hypno_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the hypnoflux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn hypno_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
