use serde::{Deserialize, Serialize};
use std::fmt;

/// Gating strength of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Hard,
    Soft,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    /// Hard edges gate the dependent; soft edges are advisory.
    #[serde(default = "default_true")]
    pub is_hard: bool,
    /// Descriptive only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        Self {
            is_hard: true,
            reason: None,
        }
    }
}

impl EdgeMetadata {
    pub fn soft() -> Self {
        Self {
            is_hard: false,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub const fn kind(&self) -> EdgeKind {
        if self.is_hard {
            EdgeKind::Hard
        } else {
            EdgeKind::Soft
        }
    }
}

/// A dependency: `from_node_id` (prerequisite) must be done before
/// `to_node_id` (dependent).
///
/// Edge identity is the `(from, to)` pair; metadata does not participate
/// in duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEdge {
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

impl PlanEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_node_id: from.into(),
            to_node_id: to.into(),
            metadata: EdgeMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.from_node_id == from && self.to_node_id == to
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }
}

impl fmt::Display for PlanEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from_node_id, self.to_node_id)
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults_to_hard() {
        let edge: PlanEdge =
            serde_json::from_str(r#"{"from_node_id":"a","to_node_id":"b"}"#).unwrap();
        assert!(edge.metadata.is_hard);
        assert_eq!(edge.metadata.kind(), EdgeKind::Hard);
        assert!(edge.metadata.reason.is_none());
    }

    #[test]
    fn soft_metadata_with_reason() {
        let meta = EdgeMetadata::soft().with_reason("nice to skim first");
        assert_eq!(meta.kind(), EdgeKind::Soft);
        assert_eq!(meta.reason.as_deref(), Some("nice to skim first"));
    }

    #[test]
    fn endpoint_helpers() {
        let edge = PlanEdge::new("a", "b");
        assert!(edge.connects("a", "b"));
        assert!(!edge.connects("b", "a"));
        assert!(edge.touches("a"));
        assert!(edge.touches("b"));
        assert!(!edge.touches("c"));
        assert_eq!(edge.to_string(), "a → b");
    }
}
