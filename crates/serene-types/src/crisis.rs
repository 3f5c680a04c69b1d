//! Crisis signal types.
//!
//! A crisis signal is attached to a chat response by the backend when it
//! decides the user may be in danger. The client copies it into its alert
//! state and never persists it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisLevel {
    Low,
    #[serde(alias = "medium")]
    Moderate,
    High,
    #[serde(alias = "emergency")]
    Critical,
}

impl CrisisLevel {
    /// Parse a backend level label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(CrisisLevel::Low),
            "moderate" | "medium" => Some(CrisisLevel::Moderate),
            "high" => Some(CrisisLevel::High),
            "critical" | "emergency" => Some(CrisisLevel::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrisisLevel::Low => "low",
            CrisisLevel::Moderate => "moderate",
            CrisisLevel::High => "high",
            CrisisLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for CrisisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a resource is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Call,
    Text,
}

/// A support resource shown with a crisis alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisResource {
    pub name: String,
    #[serde(alias = "contact_method")]
    pub contact: String,
}

impl CrisisResource {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }

    /// Text lines are written as "Text HOME to ..."; everything else is a call.
    pub fn kind(&self) -> ContactKind {
        if self.contact.to_lowercase().contains("text") {
            ContactKind::Text
        } else {
            ContactKind::Call
        }
    }
}

/// A backend-determined crisis indication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisSignal {
    pub level: CrisisLevel,
    #[serde(default)]
    pub resources: Vec<CrisisResource>,
    /// De-escalation text shown at the top of the alert
    pub message: String,
    /// Suggested next steps, when the backend supplies them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immediate_actions: Vec<String>,
}

/// Hotlines that are always reachable from the product, independent of any
/// backend response.
pub fn hotline_resources() -> Vec<CrisisResource> {
    vec![
        CrisisResource::new("988 Suicide & Crisis Lifeline", "Call 988"),
        CrisisResource::new("Crisis Text Line", "Text HOME to 741741"),
        CrisisResource::new("Emergency Services", "Call 911"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(CrisisLevel::Low < CrisisLevel::Moderate);
        assert!(CrisisLevel::Moderate < CrisisLevel::High);
        assert!(CrisisLevel::High < CrisisLevel::Critical);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(CrisisLevel::from_label("medium"), Some(CrisisLevel::Moderate));
        assert_eq!(CrisisLevel::from_label("Emergency"), Some(CrisisLevel::Critical));
        assert_eq!(CrisisLevel::from_label("none"), None);
    }

    #[test]
    fn test_resource_kind() {
        assert_eq!(
            CrisisResource::new("Crisis Text Line", "Text HOME to 741741").kind(),
            ContactKind::Text
        );
        assert_eq!(
            CrisisResource::new("Lifeline", "988").kind(),
            ContactKind::Call
        );
    }

    #[test]
    fn test_resource_accepts_contact_method_alias() {
        let r: CrisisResource =
            serde_json::from_str(r#"{"name":"NAMI","contact_method":"1-800-950-6264"}"#).unwrap();
        assert_eq!(r.contact, "1-800-950-6264");
    }
}
