//! Team member model matching the frontend TeamMember interface.

use serde::{Deserialize, Serialize};

/// A team member who can log point entries.
///
/// The id is the stable external identity supplied by the sign-in provider
/// (an e-mail address). Members are created on first sign-in and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<u32>,
    pub created_at: String,
}

/// Request body for updating the caller's avatar customization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub face: Option<u32>,
}
