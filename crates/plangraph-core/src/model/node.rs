use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kinds of work a plan node can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Task,
    Reading,
    Practice,
    Review,
    Research,
    Writing,
    Preparation,
    Exam,
    Quiz,
    Lab,
}

impl NodeType {
    pub const ALL: [Self; 10] = [
        Self::Task,
        Self::Reading,
        Self::Practice,
        Self::Review,
        Self::Research,
        Self::Writing,
        Self::Preparation,
        Self::Exam,
        Self::Quiz,
        Self::Lab,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Reading => "reading",
            Self::Practice => "practice",
            Self::Review => "review",
            Self::Research => "research",
            Self::Writing => "writing",
            Self::Preparation => "preparation",
            Self::Exam => "exam",
            Self::Quiz => "quiz",
            Self::Lab => "lab",
        }
    }
}

/// Optional human priority attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Free-form annotations on a node. None of these fields affect graph
/// semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_by: Option<DateTime<Utc>>,
}

/// One unit of work in a plan.
///
/// `is_completed` and `completed_at` are kept consistent by
/// [`PlanNode::mark_completed`] and [`PlanNode::mark_incomplete`]; the
/// graph only ever toggles completion through those two methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub node_type: NodeType,
    /// Tie-breaker among nodes that become ready at the same time during
    /// topological ordering. Lower sorts first.
    #[serde(default)]
    pub sort_index: i64,
    /// Estimated effort in whole seconds.
    #[serde(default)]
    pub estimated_duration: u64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl PlanNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            assignment_id: None,
            title: title.into(),
            node_type,
            sort_index: 0,
            estimated_duration: 0,
            is_completed: false,
            completed_at: None,
            metadata: NodeMetadata::default(),
        }
    }

    #[must_use]
    pub const fn with_sort_index(mut self, sort_index: i64) -> Self {
        self.sort_index = sort_index;
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, seconds: u64) -> Self {
        self.estimated_duration = seconds;
        self
    }

    #[must_use]
    pub fn with_assignment(mut self, assignment_id: impl Into<String>) -> Self {
        self.assignment_id = Some(assignment_id.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the node completed at `at`.
    ///
    /// Returns `true` if the node changed.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_completed && self.completed_at == Some(at) {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(at);
        true
    }

    /// Clear completion state.
    ///
    /// Returns `true` if the node changed.
    pub fn mark_incomplete(&mut self) -> bool {
        if !self.is_completed && self.completed_at.is_none() {
            return false;
        }
        self.is_completed = false;
        self.completed_at = None;
        true
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected}: '{got}'")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for NodeType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "node type",
                got: s.to_string(),
            })
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}
