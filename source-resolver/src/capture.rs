//! Capture by native window id.
//!
//! Capturing goes through the platform picker using a source chosen from
//! the enumerated list. The old id-based entry point is kept only so that
//! callers get a clear error instead of a silent no-op.

use crate::types::{CaptureError, WindowId};
use std::convert::Infallible;
use tracing::error;

/// Always fails with [`CaptureError::Deprecated`].
#[deprecated(note = "select a source from the enumerated list and capture it through the platform picker")]
pub fn capture_window_by_id(
    window_id: WindowId,
    app_name: Option<&str>,
) -> Result<Infallible, CaptureError> {
    error!(
        "capture_window_by_id({}, {:?}) is deprecated; use an enumerated source instead",
        window_id, app_name
    );
    Err(CaptureError::Deprecated { window_id })
}
