//! Registry of recognized ("important") applications.
//!
//! Important applications win per-app window selection and are the only
//! entries the low-fidelity fallback strategy is allowed to report.

use crate::config::AppsConfig;
use crate::types::SourceDescriptor;

const PROJECT_TITLE_SEPARATOR: &str = " - ";

/// Allow-list of productivity and communication applications
#[derive(Debug, Clone)]
pub struct AppRegistry {
    /// Lowercased allow-list entries
    important_apps: Vec<String>,
    /// Owners whose titles read `file - Project`, matched exactly
    project_title_apps: Vec<String>,
}

impl AppRegistry {
    pub fn new<I, S>(important_apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            important_apps: important_apps
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            project_title_apps: Vec::new(),
        }
    }

    /// Owners whose window titles are shortened to the project segment
    pub fn with_project_title_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_title_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &AppsConfig) -> Self {
        Self::new(&config.important_apps)
            .with_project_title_apps(config.project_title_apps.iter().cloned())
    }

    /// Check if an owner name matches the allow-list.
    ///
    /// Matching is case-insensitive substring containment in either
    /// direction, so "Teams" matches "Microsoft Teams" and "Code" matches
    /// "Visual Studio Code". Very short owner names can match spuriously.
    pub fn is_important(&self, owner_app: &str) -> bool {
        let owner = owner_app.to_lowercase();
        if owner.is_empty() {
            return false;
        }
        self.important_apps
            .iter()
            .any(|app| owner.contains(app.as_str()) || app.contains(owner.as_str()))
    }

    /// Title shown for an entry that has no window title of its own
    pub fn placeholder_title(&self, owner_app: &str) -> String {
        if owner_app.contains("zoom") {
            "Zoom Meeting".to_string()
        } else if owner_app.contains("PowerPoint") {
            "PowerPoint Presentation".to_string()
        } else if owner_app.contains("Notion") {
            "Notion Workspace".to_string()
        } else if owner_app.contains("Slack") {
            "Slack Workspace".to_string()
        } else if owner_app.contains("Teams") {
            "Teams Meeting".to_string()
        } else {
            format!("{} Window", owner_app)
        }
    }

    /// Title to show for a window.
    ///
    /// Untitled windows get the placeholder title. Project-title apps keep
    /// only the last ` - ` segment, so "main.rs - my-project" becomes
    /// "my-project".
    pub fn display_title(&self, owner_app: &str, title: &str) -> String {
        let title = if title.trim().is_empty() {
            self.placeholder_title(owner_app)
        } else {
            title.to_string()
        };

        if self.project_title_apps.iter().any(|app| app == owner_app) {
            if let Some(project) = title.rsplit(PROJECT_TITLE_SEPARATOR).next() {
                if !project.is_empty() && project.len() < title.len() {
                    return project.to_string();
                }
            }
        }
        title
    }

    /// Replace a window's raw title with its display title; screens pass through
    pub fn label(&self, mut source: SourceDescriptor) -> SourceDescriptor {
        if source.is_window() {
            source.title = self.display_title(&source.owner_app, &source.title);
        }
        source
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::from_config(&AppsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_case_insensitive() {
        let registry = AppRegistry::default();
        assert!(registry.is_important("Slack"));
        assert!(registry.is_important("slack"));
        assert!(registry.is_important("ZOOM.US"));
    }

    #[test]
    fn test_owner_contains_entry() {
        let registry = AppRegistry::default();
        assert!(registry.is_important("Google Chrome Helper"));
        assert!(registry.is_important("Microsoft Teams (work or school)"));
    }

    #[test]
    fn test_entry_contains_owner() {
        let registry = AppRegistry::default();
        // "Code" is a substring of "Visual Studio Code"
        assert!(registry.is_important("Code"));
        // "Word" is a substring of "Microsoft Word"
        assert!(registry.is_important("Word"));
    }

    #[test]
    fn test_short_names_match_spuriously() {
        let registry = AppRegistry::default();
        // Current behavior: any substring of an allow-listed name matches
        assert!(registry.is_important("Team"));
        assert!(registry.is_important("o"));
    }

    #[test]
    fn test_unrelated_apps() {
        let registry = AppRegistry::default();
        assert!(!registry.is_important("Terminal"));
        assert!(!registry.is_important("Activity Monitor"));
        assert!(!registry.is_important(""));
    }

    #[test]
    fn test_custom_allow_list() {
        let registry = AppRegistry::new(["Ghostty"]);
        assert!(registry.is_important("ghostty"));
        assert!(!registry.is_important("Slack"));
    }

    #[test]
    fn test_placeholder_titles() {
        let registry = AppRegistry::default();
        assert_eq!(registry.placeholder_title("zoom.us"), "Zoom Meeting");
        assert_eq!(registry.placeholder_title("Microsoft PowerPoint"), "PowerPoint Presentation");
        assert_eq!(registry.placeholder_title("Microsoft Teams"), "Teams Meeting");
        assert_eq!(registry.placeholder_title("Figma"), "Figma Window");
    }

    #[test]
    fn test_display_title_fills_untitled_windows() {
        let registry = AppRegistry::default();
        assert_eq!(registry.display_title("zoom.us", ""), "Zoom Meeting");
        assert_eq!(registry.display_title("Slack", "   "), "Slack Workspace");
        assert_eq!(registry.display_title("Preview", ""), "Preview Window");
        assert_eq!(registry.display_title("Slack", "general"), "general");
    }

    #[test]
    fn test_display_title_keeps_project_segment() {
        let registry = AppRegistry::default();
        assert_eq!(registry.display_title("Cursor", "main.rs - my-project"), "my-project");
        assert_eq!(registry.display_title("Cursor", "a - b - workspace"), "workspace");
        assert_eq!(registry.display_title("Cursor", "Welcome"), "Welcome");
        assert_eq!(registry.display_title("Cursor", ""), "Cursor Window");
        // Exact owner match only
        assert_eq!(
            registry.display_title("Cursor Helper", "main.rs - my-project"),
            "main.rs - my-project"
        );
    }

    #[test]
    fn test_project_title_apps_are_configurable() {
        let registry = AppRegistry::new(["Zed"]).with_project_title_apps(["Zed"]);
        assert_eq!(registry.display_title("Zed", "lib.rs - resolver"), "resolver");
        assert_eq!(registry.display_title("Cursor", "main.rs - my-project"), "main.rs - my-project");
    }

    #[test]
    fn test_label_leaves_screens_alone() {
        use crate::types::{SourceId, SourceKind};

        let registry = AppRegistry::default();
        let screen = SourceDescriptor::new(SourceId::Native("screen:0".into()), SourceKind::Screen, "", "");
        assert_eq!(registry.label(screen.clone()), screen);

        let window = SourceDescriptor::new(SourceId::Window(3), SourceKind::Window, "zoom.us", "");
        assert_eq!(registry.label(window).title, "Zoom Meeting");
    }
}
