pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

pub use self::loader::{load_courses, Columns};

/// One catalog row. `ordinal` is the row of this course in the fitted matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub ordinal: usize,
    pub title: String,
    pub description: String,
    pub keywords: String,
    #[serde(default)]
    pub raw_fields: BTreeMap<String, String>,
}

impl Course {
    #[cfg(test)]
    pub fn new(ordinal: usize, title: &str, description: &str, keywords: &str) -> Self {
        Self {
            ordinal,
            title: title.to_string(),
            description: description.to_string(),
            keywords: keywords.to_string(),
            raw_fields: BTreeMap::new(),
        }
    }

    /// Composite document: title, description, keywords.
    pub fn profile(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.keywords.as_str(),
        ]
        .join(" ")
    }
}

impl Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Course {{ ordinal: {}, title: {} }}", self.ordinal, self.title)
    }
}

/// The profile fields that drive ranking. Absent fields count as empty text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub career_goals: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
}

impl UserProfile {
    #[cfg(test)]
    pub fn new(career_goals: Option<&str>, skills: Option<&str>, interests: Option<&str>) -> Self {
        Self {
            career_goals: career_goals.map(str::to_string),
            skills: skills.map(str::to_string),
            interests: interests.map(str::to_string),
        }
    }

    /// Composite document: career goals, interests, skills.
    pub fn profile(&self) -> String {
        [
            self.career_goals.as_deref().unwrap_or(""),
            self.interests.as_deref().unwrap_or(""),
            self.skills.as_deref().unwrap_or(""),
        ]
        .join(" ")
    }
}
