use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form preferences object stored on users and teams.
pub type Preferences = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    pub name: String,
    pub registration: String,
    pub status: bool,
    pub labels: Vec<String>,
    pub password_update: String,
    pub email: String,
    pub phone: String,
    pub email_verification: bool,
    pub phone_verification: bool,
    pub mfa: bool,
    pub prefs: Preferences,
    pub accessed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    pub user_id: String,
    pub expire: String,
    pub provider: String,
    pub ip: String,
    pub os_name: String,
    pub client_name: String,
    pub device_name: String,
    pub country_name: String,
    pub current: bool,
    /// Only populated for server-side session creation.
    #[serde(skip_serializing)]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionList {
    pub total: u64,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Log {
    pub event: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub ip: String,
    pub time: String,
    pub os_name: String,
    pub client_name: String,
    pub device_name: String,
    pub country_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogList {
    pub total: u64,
    pub logs: Vec<Log>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Jwt {
    pub jwt: String,
}

/// Verification/recovery token. The secret is only sent to the user by email or SMS.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub expire: String,
    pub phrase: String,
}

/// OAuth2 providers offered by the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
    Apple,
    Facebook,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Apple => "apple",
            OAuthProvider::Facebook => "facebook",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Github => "GitHub",
            OAuthProvider::Apple => "Apple",
            OAuthProvider::Facebook => "Facebook",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAccountRequest<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailPasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateNameRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePasswordRequest<'a> {
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdatePrefsRequest<'a> {
    pub prefs: &'a Preferences,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerificationRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecoveryRequest<'a> {
    pub email: &'a str,
    pub url: &'a str,
}
