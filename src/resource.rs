//! Resources listed by the browser.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use ratatui::layout::Constraint;
use ratatui::style::Style;
use ratatui::widgets::Cell;
use serde::{Deserialize, Serialize};

use crate::Theme;
use crate::list::compare_tiers;
use crate::ui::{ColumnDef, TableRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Running,
    Stopped,
    Failed,
    #[default]
    Unknown,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub environment: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub status: ResourceStatus,
    /// Relative paths resolve against the inventory's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Resource {
    /// Qualified name, unique within an inventory.
    pub fn id(&self) -> String {
        format!("{}/{}/{}/{}", self.project, self.environment, self.kind, self.name)
    }

    pub fn sort_key(&self) -> [&str; 4] {
        [&self.project, &self.environment, &self.kind, &self.name]
    }

    /// Project, environment, type, name; case-insensitive with blanks last.
    pub fn canonical_order(a: &Self, b: &Self) -> Ordering {
        compare_tiers(&a.sort_key(), &b.sort_key())
    }
}

impl TableRow for Resource {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("Project", Constraint::Min(10)),
            ColumnDef::new("Environment", Constraint::Min(10)),
            ColumnDef::new("Type", Constraint::Length(12)),
            ColumnDef::new("Name", Constraint::Min(16)),
            ColumnDef::new("Status", Constraint::Length(9)),
        ];
        COLUMNS
    }

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>> {
        let status_color = match self.status {
            ResourceStatus::Running => theme.green(),
            ResourceStatus::Stopped => theme.overlay1(),
            ResourceStatus::Failed => theme.red(),
            ResourceStatus::Unknown => theme.yellow(),
        };
        vec![
            Cell::from(self.project.clone()),
            Cell::from(self.environment.clone()),
            Cell::from(self.kind.clone()),
            Cell::from(self.name.clone()),
            Cell::from(self.status.to_string()).style(Style::default().fg(status_color)),
        ]
    }

    fn filter_value(&self) -> Option<String> {
        Some(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(project: &str, name: &str) -> Resource {
        Resource {
            project: project.to_string(),
            environment: String::new(),
            kind: "service".to_string(),
            name: name.to_string(),
            status: ResourceStatus::Unknown,
            log_file: None,
        }
    }

    #[test]
    fn test_canonical_order() {
        let mut resources = vec![resource("", "z"), resource("A", "b"), resource("A", "a")];
        resources.sort_by(Resource::canonical_order);
        let order: Vec<_> = resources
            .iter()
            .map(|r| (r.project.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(order, vec![("A", "a"), ("A", "b"), ("", "z")]);
    }

    #[test]
    fn test_order_ignores_case_and_keeps_ties() {
        let mut first = resource("web", "API");
        first.status = ResourceStatus::Running;
        let second = resource("Web", "api");
        let mut resources = vec![first.clone(), second.clone(), resource("alpha", "x")];
        resources.sort_by(Resource::canonical_order);
        assert_eq!(resources[1], first);
        assert_eq!(resources[2], second);
    }

    #[test]
    fn test_status_defaults_when_missing() {
        let json = r#"{"kind": "database", "name": "orders"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.status, ResourceStatus::Unknown);
        assert_eq!(resource.id(), "//database/orders");
    }
}
