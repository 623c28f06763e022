//! Window enumeration strategies.
//!
//! Each strategy is one independent way of asking the OS which windows
//! exist:
//! - Auxiliary: a generated helper program that queries the window server
//!   directly (ids, geometry, layers, off-Space windows)
//! - Scripted: System Events automation (process names and titles only)
//!
//! The orchestrator tries them in a fixed order and falls back on failure.

pub mod auxiliary;
pub mod scripted;

pub use auxiliary::AuxiliaryProcessEnumerator;
pub use scripted::ScriptedEnumerator;

use crate::types::{EnumerationError, SourceDescriptor};

/// How much a strategy's output can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fidelity {
    /// Real window ids and geometry; goes through filtering and scoring
    Full,
    /// Names only; restricted to important applications
    Coarse,
}

/// Trait for window enumeration strategies
#[async_trait::async_trait]
pub trait EnumerationStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn fidelity(&self) -> Fidelity;

    /// Enumerate windows, reporting why if nothing could be obtained
    async fn try_enumerate(&self) -> Result<Vec<SourceDescriptor>, EnumerationError>;
}

/// Whether the OS automation channels exist on this platform
pub(crate) fn platform_supported() -> bool {
    cfg!(target_os = "macos")
}

/// Classify a failed helper invocation from its stderr
pub(crate) fn classify_failure(code: Option<i32>, stderr: &str) -> EnumerationError {
    let stderr = stderr.trim();
    // -1743: not authorized to send Apple events, -1719: assistive access
    if stderr.contains("-1743") || stderr.contains("-1719") || stderr.contains("not allowed") {
        EnumerationError::PermissionDenied(stderr.to_string())
    } else {
        EnumerationError::NonZeroExit {
            code,
            stderr: stderr.to_string(),
        }
    }
}
