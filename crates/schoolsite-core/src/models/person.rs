use serde::{Deserialize, Serialize};

use super::de;

/// A teacher, staff member or committee member.
///
/// The backend uses the same record shape for all three lists; committee
/// members carry `memberships` where teachers and staff carry `tenures`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub photo: Option<String>,
    #[serde(default)]
    pub designation: Option<Designation>,
    #[serde(default, deserialize_with = "de::text")]
    pub mpo_index: Option<String>,
    #[serde(default, deserialize_with = "de::list")]
    pub tenures: Vec<Tenure>,
    #[serde(default, deserialize_with = "de::list")]
    pub memberships: Vec<Tenure>,
    #[serde(default, deserialize_with = "de::text")]
    pub father_name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub national_id: Option<String>,
    /// May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub qualification: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub experience: Option<String>,
    /// May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub interest: Option<String>,
    /// May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub present_address: Option<String>,
    /// May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub permanent_address: Option<String>,
}

pub type Teacher = Person;
pub type StaffMember = Person;
pub type CommitteeMember = Person;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Designation {
    #[serde(default, deserialize_with = "de::text")]
    pub title: Option<String>,
}

/// A period of service. Committee memberships use the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tenure {
    #[serde(default, deserialize_with = "de::text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub end_date: Option<String>,
}

impl Person {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    /// Designation title, or `fallback` when the record has none.
    pub fn role_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.designation
            .as_ref()
            .and_then(|d| d.title.as_deref())
            .unwrap_or(fallback)
    }

    /// Start date of the first recorded tenure or membership.
    pub fn joining_date(&self) -> Option<&str> {
        self.tenures
            .first()
            .or_else(|| self.memberships.first())
            .and_then(|t| t.start_date.as_deref())
    }
}

/// An entry in the school's leadership list (chairman, principal, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leader {
    #[serde(default, deserialize_with = "de::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub photo: Option<String>,
    /// The leader's message to visitors. May contain HTML.
    #[serde(default, deserialize_with = "de::text")]
    pub message: Option<String>,
}

impl Leader {
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }
}
