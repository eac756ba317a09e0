use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::window::Timestamped;

/// Group identifier as entered by staff.
///
/// Two names refer to the same group when they are equal after trimming and lower-casing,
/// so `"Lier"`, `"lier"` and `" Lier "` all address one group. `Eq` and `Hash` follow the
/// same rule; the original spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn comparison_key(&self) -> String {
        self.0.trim().to_lowercase()
    }
}

impl PartialEq for GroupName {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for GroupName {}

impl Hash for GroupName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparison_key().hash(state);
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.trim())
    }
}

impl From<&str> for GroupName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A residential cohort registered with the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: GroupName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentStatus {
    #[default]
    Planned,
    Completed,
    Cancelled,
}

impl MomentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// An ad hoc sport session outside the regular schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraSportMoment {
    pub id: String,
    pub group: GroupName,
    /// ISO-8601 start as received.
    pub start: String,
    #[serde(default)]
    pub status: MomentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Timestamped for ExtraSportMoment {
    fn timestamp(&self) -> &str {
        &self.start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMoment {
    pub group: String,
    pub start: String,
    #[serde(default)]
    pub status: MomentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// A regularly scheduled sport activity for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    pub id: String,
    pub group: GroupName,
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Timestamped for ScheduledActivity {
    fn timestamp(&self) -> &str {
        &self.start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub group: String,
    pub title: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn group_names_compare_trimmed_and_case_insensitive() {
        assert_eq!(GroupName::from("Lier"), GroupName::from(" lier "));
        assert_ne!(GroupName::from("Lier"), GroupName::from("Lierde"));

        let mut set = HashSet::new();
        set.insert(GroupName::from("De Berk"));
        assert!(set.contains(&GroupName::from("de berk")));
    }

    #[test]
    fn display_keeps_original_casing() {
        assert_eq!(GroupName::from("  Lier ").to_string(), "Lier");
    }
}
