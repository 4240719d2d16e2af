use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account. Each account owns one paper portfolio per persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub alerts_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            alerts_enabled: true,
            created_at: Utc::now(),
        }
    }
}
