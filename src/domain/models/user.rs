use serde::{Deserialize, Serialize};

/// A wallet user, either the signed-in profile or a transfer opponent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub identity_number: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub fiat_currency: Option<String>,
}
