use serde::{Deserialize, Serialize};

pub use crate::account::models::Preferences;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    pub name: String,
    /// Number of members.
    pub total: u64,
    pub prefs: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TeamList {
    pub total: u64,
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Membership {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub team_id: String,
    pub team_name: String,
    pub invited: String,
    pub joined: String,
    /// Whether the invitee accepted.
    pub confirm: bool,
    pub mfa: bool,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MembershipList {
    pub total: u64,
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTeamRequest<'a> {
    pub team_id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeamNameRequest<'a> {
    pub name: &'a str,
}

/// Who to invite: an existing user, an email address or a phone number.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Invitee {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateMembershipRequest<'a> {
    pub roles: &'a [String],
    #[serde(flatten)]
    pub invitee: &'a Invitee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RolesRequest<'a> {
    pub roles: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct TeamPrefsRequest<'a> {
    pub prefs: &'a Preferences,
}
