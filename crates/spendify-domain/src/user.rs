//! User profile, authenticated identity and device session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Displayable, Identifiable, NamedEntity};

/// Identity returned by the backend's auth surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Row of the `users` table: display name, contact email and monthly budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub budget: f64,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: email.into(),
            budget: 0.0,
            created_at,
        }
    }

    /// "Member since" label, e.g. `June 3, 2024`.
    pub fn member_since(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

impl Identifiable for UserProfile {
    fn id(&self) -> Uuid {
        self.user_id
    }
}

impl NamedEntity for UserProfile {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for UserProfile {
    fn display_label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// The signed-in user as remembered by the device's secure store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn member_since_uses_long_month_name() {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let profile = UserProfile::new(Uuid::new_v4(), "Asha", "asha@example.com", created);
        assert_eq!(profile.member_since(), "June 3, 2024");
        assert_eq!(profile.budget, 0.0);
    }
}
