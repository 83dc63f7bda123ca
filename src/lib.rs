//! Schema-safe property value estimation.
//!
//! A pre-trained regression model, its fitted scaler and the ordered list
//! of training columns are loaded once. Each request maps a handful of
//! user inputs onto that column space, predicts today's value and projects
//! it forward with yearly compounding.

pub mod config;
pub mod data;
pub mod error;
pub mod estimator;
pub mod model;
pub mod projection;
pub mod utils;

pub use data::{AssemblyProfile, FeatureAssembler, FeatureSchema, RawInput};
pub use error::{ArtifactError, EstimateError, InferenceError, ProfileError};
pub use estimator::{Estimate, EstimateRequest, Estimator};

use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;

use tracing::error;

use crate::utils::io::{ArtifactPaths, load_artifacts};

unsafe fn str_arg<'a>(raw: *const libc::c_char, name: &str) -> Result<&'a str, String> {
    if raw.is_null() {
        return Err(format!("{name} is null"));
    }
    unsafe { CStr::from_ptr(raw) }
        .to_str()
        .map_err(|e| format!("{name} is not valid UTF-8: {e}"))
}

fn into_c_string(json: serde_json::Value) -> *mut libc::c_char {
    match CString::new(json.to_string()) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn failure(message: String) -> *mut libc::c_char {
    error!(error = %message, "estimate request rejected");
    into_c_string(serde_json::json!({"error": message, "success": false}))
}

/// Loads the artifacts in `artifact_dir` with the named profile
/// (`short-stay` when `profile` is null).
///
/// Returns null when an artifact is missing or unreadable, or when the
/// profile name is unknown or not UTF-8.
///
/// # Safety
/// Both arguments must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn estimator_open(
    artifact_dir: *const libc::c_char,
    profile: *const libc::c_char,
) -> *mut Estimator {
    let dir = match unsafe { str_arg(artifact_dir, "artifact_dir") } {
        Ok(dir) => dir,
        Err(e) => {
            error!(error = %e, "cannot open estimator");
            return ptr::null_mut();
        }
    };
    // null picks the default profile, anything else must be valid
    let profile_name = if profile.is_null() {
        "short-stay"
    } else {
        match unsafe { str_arg(profile, "profile") } {
            Ok(name) => name,
            Err(e) => {
                error!(error = %e, "cannot open estimator");
                return ptr::null_mut();
            }
        }
    };

    let profile = match AssemblyProfile::builtin(profile_name) {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, "cannot open estimator");
            return ptr::null_mut();
        }
    };
    match load_artifacts(&ArtifactPaths::in_dir(Path::new(dir))) {
        Ok(artifacts) => Box::into_raw(Box::new(Estimator::new(artifacts, profile))),
        Err(e) => {
            error!(error = %e, "cannot open estimator");
            ptr::null_mut()
        }
    }
}

/// Runs one estimate from a JSON `EstimateRequest`.
///
/// Always returns a JSON object with a `success` field; release it with
/// `estimator_free_string`.
///
/// # Safety
/// `handle` must come from `estimator_open` (or be null) and
/// `request_json` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn estimator_estimate_json(
    handle: *const Estimator,
    request_json: *const libc::c_char,
) -> *mut libc::c_char {
    let Some(estimator) = (unsafe { handle.as_ref() }) else {
        return failure("estimator handle is null".to_string());
    };
    let text = match unsafe { str_arg(request_json, "request_json") } {
        Ok(text) => text,
        Err(e) => return failure(e),
    };
    let request: EstimateRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => return failure(format!("invalid request: {e}")),
    };

    match estimator.estimate(&request) {
        Ok(estimate) => into_c_string(serde_json::json!({"data": estimate, "success": true})),
        Err(e) => failure(e.to_string()),
    }
}

/// # Safety
/// `result` must be null or a string returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn estimator_free_string(result: *mut libc::c_char) {
    if !result.is_null() {
        unsafe {
            let _ = CString::from_raw(result);
        }
    }
}

/// # Safety
/// `handle` must be null or a pointer returned by `estimator_open`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn estimator_close(handle: *mut Estimator) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle);
        }
    }
}
