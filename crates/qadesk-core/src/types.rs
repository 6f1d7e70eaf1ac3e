// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the flow, storage and generator crates.
//!
//! Field names serialize in camelCase so persisted drafts keep the same
//! record layout regardless of which front-end wrote them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Project (ecosystem) a report belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Project {
    Getnet,
    Bpagos,
}

/// Kind of submission the tester is preparing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[strum(to_string = "report", serialize = "reportar", serialize = "bug")]
    Report,
    #[strum(to_string = "retest")]
    Retest,
}

/// Steps of the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStep {
    SelectProject,
    SelectAction,
    GatheringData,
    Processing,
    Result,
}

/// Whether a retested defect is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solved {
    #[serde(alias = "sí", alias = "si", alias = "Sí")]
    Yes,
    #[default]
    No,
}

impl Solved {
    /// Label shown to the tester.
    pub fn label(self) -> &'static str {
        match self {
            Solved::Yes => "Sí",
            Solved::No => "No",
        }
    }
}

impl std::fmt::Display for Solved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Solved {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "sí" | "si" | "s" | "true" => Ok(Solved::Yes),
            "no" | "n" | "false" => Ok(Solved::No),
            other => Err(format!("expected yes/sí or no, got `{other}`")),
        }
    }
}

/// A new defect report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BugReport {
    pub version: String,
    pub browser: String,
    pub environment: String,
    pub description: String,
    pub expected_result: String,
    pub obtained_result: String,
    pub database: String,
    pub evidence: String,
}

/// The result of re-testing a previously reported defect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetestReport {
    pub bug_code: String,
    pub version: String,
    pub browser: String,
    pub environment: String,
    pub original_description: String,
    pub retest_results: String,
    pub database: String,
    pub evidence: String,
    #[serde(default)]
    pub solved: Solved,
}

/// Snapshot of either report shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportData {
    Bug(BugReport),
    Retest(RetestReport),
}

impl ReportData {
    /// Empty snapshot for the given action.
    pub fn empty(action: Action) -> Self {
        match action {
            Action::Report => ReportData::Bug(BugReport::default()),
            Action::Retest => ReportData::Retest(RetestReport::default()),
        }
    }

    /// The action this snapshot belongs to.
    pub fn action(&self) -> Action {
        match self {
            ReportData::Bug(_) => Action::Report,
            ReportData::Retest(_) => Action::Retest,
        }
    }
}

/// Everything the remote generator needs for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub project: Project,
    pub report: ReportData,
}

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Report kind tag stored on generated messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Bug,
    Retest,
}

impl From<Action> for MessageKind {
    fn from(action: Action) -> Self {
        match action {
            Action::Report => MessageKind::Bug,
            Action::Retest => MessageKind::Retest,
        }
    }
}

/// Optional context attached to a history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

/// One entry of the generated-report history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    /// Creates a message stamped with a fresh id and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Shorthand for an assistant-role message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attaches report metadata.
    pub fn with_metadata(mut self, kind: MessageKind, project: Project) -> Self {
        self.metadata = Some(MessageMetadata {
            kind: Some(kind),
            project: Some(project),
        });
        self
    }
}

/// A submission captured while offline, waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDraft {
    pub id: String,
    pub project: Project,
    pub action: Action,
    pub data: ReportData,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl LocalDraft {
    /// Creation time as a UTC datetime, if the stored timestamp is in range.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_aliases() {
        assert_eq!("report".parse::<Action>().unwrap(), Action::Report);
        assert_eq!("reportar".parse::<Action>().unwrap(), Action::Report);
        assert_eq!("RETEST".parse::<Action>().unwrap(), Action::Retest);
        assert_eq!(Action::Report.to_string(), "report");
    }

    #[test]
    fn project_display_and_parse() {
        assert_eq!(Project::Getnet.to_string(), "GETNET");
        assert_eq!("bpagos".parse::<Project>().unwrap(), Project::Bpagos);
        assert_eq!(serde_json::to_string(&Project::Bpagos).unwrap(), "\"BPAGOS\"");
    }

    #[test]
    fn solved_accepts_spanish_affirmative() {
        assert_eq!("Sí".parse::<Solved>().unwrap(), Solved::Yes);
        assert_eq!("si".parse::<Solved>().unwrap(), Solved::Yes);
        assert_eq!("No".parse::<Solved>().unwrap(), Solved::No);
        assert!("maybe".parse::<Solved>().is_err());
        assert_eq!(Solved::default(), Solved::No);
    }

    #[test]
    fn report_data_untagged_resolves_shape() {
        let bug = ReportData::Bug(BugReport {
            version: "1.0".into(),
            description: "boom".into(),
            ..BugReport::default()
        });
        let json = serde_json::to_string(&bug).unwrap();
        assert!(json.contains("expectedResult"));
        let back: ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bug);

        let retest = ReportData::Retest(RetestReport {
            bug_code: "BUG-7".into(),
            solved: Solved::Yes,
            ..RetestReport::default()
        });
        let json = serde_json::to_string(&retest).unwrap();
        assert!(json.contains("originalDescription"));
        let back: ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.action(), Action::Retest);
        assert_eq!(back, retest);
    }

    #[test]
    fn message_metadata_serializes_type_key() {
        let msg = ChatMessage::assistant("hola").with_metadata(MessageKind::Bug, Project::Getnet);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["metadata"]["type"], "bug");
        assert_eq!(json["metadata"]["project"], "GETNET");
    }

    #[test]
    fn flow_step_display() {
        assert_eq!(FlowStep::GatheringData.to_string(), "GATHERING_DATA");
    }

    #[test]
    fn draft_timestamp_converts() {
        let draft = LocalDraft {
            id: "1700000000000".into(),
            project: Project::Getnet,
            action: Action::Report,
            data: ReportData::empty(Action::Report),
            timestamp: 1_700_000_000_000,
        };
        assert!(draft.created_at().is_some());
    }
}
