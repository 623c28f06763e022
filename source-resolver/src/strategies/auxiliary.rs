//! Window-server enumeration through a short-lived helper process.
//!
//! The helper is a generated Python program using the Quartz bindings. It
//! lists every window the window server knows about, including minimized
//! windows and windows on other Spaces, and prints them as one JSON array.
//! The helper file lives only for the duration of one call.

use super::{classify_failure, platform_supported, EnumerationStrategy, Fidelity};
use crate::config::Config;
use crate::registry::AppRegistry;
use crate::types::{EnumerationError, RawWindowRecord, SourceDescriptor};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Helper program; prints `[]` rather than failing when Quartz is missing.
const HELPER_SCRIPT: &str = r#"
import json
import sys

try:
    from Quartz import CGWindowListCopyWindowInfo, kCGWindowListOptionAll, kCGNullWindowID
except ImportError:
    print("Quartz bindings unavailable", file=sys.stderr)
    print("[]")
    sys.exit(0)

try:
    windows = []
    for info in CGWindowListCopyWindowInfo(kCGWindowListOptionAll, kCGNullWindowID) or []:
        owner = info.get("kCGWindowOwnerName")
        window_id = info.get("kCGWindowNumber")
        if not owner or not window_id:
            continue
        bounds = info.get("kCGWindowBounds") or {}
        windows.append({
            "windowId": int(window_id),
            "appName": str(owner),
            "windowTitle": str(info.get("kCGWindowName") or ""),
            "bounds": {key: float(bounds.get(key, 0)) for key in ("X", "Y", "Width", "Height")},
            "isOnscreen": bool(info.get("kCGWindowIsOnscreen", False)),
            "layer": int(info.get("kCGWindowLayer", 0)),
        })
    print(json.dumps(windows))
except Exception as e:
    print(f"Error: {e}", file=sys.stderr)
    print("[]")
"#;

/// Enumerates windows by running the generated helper
pub struct AuxiliaryProcessEnumerator {
    /// Interpreter used to run the helper
    interpreter: String,
    registry: AppRegistry,
}

impl AuxiliaryProcessEnumerator {
    pub fn new(interpreter: impl Into<String>, registry: AppRegistry) -> Self {
        Self {
            interpreter: interpreter.into(),
            registry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strategies.python_interpreter.clone(),
            AppRegistry::from_config(&config.apps),
        )
    }

    /// Source of the helper program
    pub fn script() -> &'static str {
        HELPER_SCRIPT
    }

    /// Write the helper to a uniquely named temporary file.
    ///
    /// The file is removed when the returned path is dropped.
    fn write_helper(&self) -> Result<TempPath, EnumerationError> {
        let mut file = tempfile::Builder::new()
            .prefix("source-resolver-")
            .suffix(".py")
            .tempfile()?;
        file.write_all(HELPER_SCRIPT.as_bytes())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    async fn run_helper(&self, script: &Path) -> Result<String, EnumerationError> {
        let output = Command::new(&self.interpreter)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EnumerationError::Spawn {
                program: self.interpreter.clone(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("Window helper stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(classify_failure(output.status.code(), &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Write, run and remove the helper, then normalize its records
    async fn collect(&self) -> Result<Vec<SourceDescriptor>, EnumerationError> {
        let helper = self.write_helper()?;
        trace!("Wrote window helper to {}", helper.display());

        let result = self.run_helper(&helper).await;

        if let Err(e) = helper.close() {
            warn!("Failed to remove window helper: {}", e);
        }

        let stdout = result?;
        Ok(parse_helper_output(&stdout)
            .into_iter()
            .map(|record| record.into_descriptor(&self.registry))
            .collect())
    }
}

#[async_trait::async_trait]
impl EnumerationStrategy for AuxiliaryProcessEnumerator {
    fn name(&self) -> &'static str {
        "window-server helper"
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Full
    }

    async fn try_enumerate(&self) -> Result<Vec<SourceDescriptor>, EnumerationError> {
        if !platform_supported() {
            return Err(EnumerationError::Unsupported);
        }
        self.collect().await
    }
}

/// Parse helper stdout into window records.
///
/// Anything that is not a JSON array yields an empty list. Individual
/// records that do not fit the schema are skipped.
pub fn parse_helper_output(stdout: &str) -> Vec<RawWindowRecord> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(stdout.trim()) {
        Ok(values) => values,
        Err(e) => {
            warn!("Window helper produced unparseable output: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawWindowRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping malformed window record: {}", e);
                None
            }
        })
        .collect()
}
