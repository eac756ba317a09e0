use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::domain::GroupName;

/// Sport participation category, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    NotAllowed,
    Restricted,
    Cautious,
    Cleared,
}

impl StatusCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::NotAllowed,
            Self::Restricted,
            Self::Cautious,
            Self::Cleared,
        ]
    }

    /// Position in [`StatusCategory::ordered`]; lower is more severe.
    pub const fn rank(self) -> usize {
        match self {
            Self::NotAllowed => 0,
            Self::Restricted => 1,
            Self::Cautious => 2,
            Self::Cleared => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotAllowed => "Not allowed",
            Self::Restricted => "Restricted",
            Self::Cautious => "Cautious",
            Self::Cleared => "Cleared",
        }
    }
}

/// A time-bounded restriction or permission asserted for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: String,
    pub group: GroupName,
    pub category: StatusCategory,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusRecord {
    /// Whether the record counts for `group` at `now`. The end instant itself is still in force.
    pub fn applies_to(&self, group: &GroupName, now: DateTime<Utc>) -> bool {
        self.active && self.group == *group && self.end.map_or(true, |end| end >= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStatus {
    pub group: String,
    pub category: StatusCategory,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_active() -> bool {
    true
}
