//! System Events enumeration through osascript.
//!
//! This channel only knows process names and window titles: no window ids,
//! no geometry, no layers. Entries it produces carry placeholder ids.

use super::{classify_failure, platform_supported, EnumerationStrategy, Fidelity};
use crate::config::Config;
use crate::registry::AppRegistry;
use crate::types::{EnumerationError, SourceDescriptor, SourceId, SourceKind};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const RUNNING_APPLICATIONS_SCRIPT: &str =
    r#"tell application "System Events" to get name of every application process whose visible is true"#;

/// Enumerates visible application processes via System Events
pub struct ScriptedEnumerator {
    /// Path to osascript
    osascript: String,
    registry: AppRegistry,
}

impl ScriptedEnumerator {
    pub fn new(osascript: impl Into<String>, registry: AppRegistry) -> Self {
        Self {
            osascript: osascript.into(),
            registry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strategies.osascript_path.clone(),
            AppRegistry::from_config(&config.apps),
        )
    }

    async fn run_script(&self, script: &str) -> Result<String, EnumerationError> {
        let output = Command::new(&self.osascript)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EnumerationError::Spawn {
                program: self.osascript.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(output.status.code(), &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Names of all visible application processes
    pub async fn running_applications(&self) -> Result<Vec<String>, EnumerationError> {
        let stdout = self.run_script(RUNNING_APPLICATIONS_SCRIPT).await?;
        Ok(parse_list(&stdout))
    }

    /// Titles of every window of one process; failures yield no titles
    pub async fn window_titles(&self, process: &str) -> Vec<String> {
        match self.run_script(&window_titles_script(process)).await {
            Ok(stdout) => parse_list(&stdout),
            Err(e) => {
                debug!("Could not read windows of '{}': {}", process, e);
                Vec::new()
            }
        }
    }

    /// Build the coarse entry for one process
    fn coarse_descriptor(&self, process: &str, titles: &[String]) -> SourceDescriptor {
        let is_important_app = self.registry.is_important(process);
        let title = if is_important_app {
            let first = titles.first().map(String::as_str).unwrap_or("");
            self.registry.display_title(process, first)
        } else {
            String::new()
        };

        SourceDescriptor {
            is_important_app,
            ..SourceDescriptor::new(SourceId::placeholder(), SourceKind::Window, process, title)
        }
    }

    async fn collect(&self) -> Result<Vec<SourceDescriptor>, EnumerationError> {
        let processes = self.running_applications().await?;
        debug!("System Events reported {} visible processes", processes.len());

        let mut sources = Vec::with_capacity(processes.len());
        for process in &processes {
            // Only recognized applications are worth a per-process query
            let titles = if self.registry.is_important(process) {
                self.window_titles(process).await
            } else {
                Vec::new()
            };
            sources.push(self.coarse_descriptor(process, &titles));
        }
        Ok(sources)
    }
}

#[async_trait::async_trait]
impl EnumerationStrategy for ScriptedEnumerator {
    fn name(&self) -> &'static str {
        "System Events"
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Coarse
    }

    async fn try_enumerate(&self) -> Result<Vec<SourceDescriptor>, EnumerationError> {
        if !platform_supported() {
            return Err(EnumerationError::Unsupported);
        }
        self.collect().await
    }
}

fn window_titles_script(process: &str) -> String {
    format!(
        r#"tell application "System Events" to tell application process "{}" to get title of every window"#,
        escape_applescript(process)
    )
}

/// Escape a value for use inside an AppleScript string literal
fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Parse osascript's comma-separated list output.
///
/// Empty output is a valid empty list. Untitled windows come back as
/// `missing value` and are dropped.
pub fn parse_list(stdout: &str) -> Vec<String> {
    stdout
        .trim()
        .split(", ")
        .map(str::trim)
        .filter(|item| !item.is_empty() && *item != "missing value")
        .map(str::to_string)
        .collect()
}
