//! Account service: the currently authenticated user, their sessions and verification flows.
//!
//! Session-creating calls (`create_email_password_session`, `create_anonymous_session`) store
//! the session cookie in the shared [`Client`] jar, so every other service becomes
//! authenticated as that user.

pub mod models;

#[cfg(test)]
mod tests;

use crate::core::{segment, Client, Error};
use models::{
    CreateAccountRequest, EmailPasswordRequest, Jwt, LogList, OAuthProvider, Preferences,
    RecoveryRequest, Session, SessionList, Token, UpdateNameRequest, UpdatePasswordRequest,
    UpdatePrefsRequest, User, VerificationRequest,
};
use url::Url;

#[derive(Clone)]
pub struct Account {
    client: Client,
}

impl Account {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Gets the currently logged in user.
    pub async fn get(&self) -> Result<User, Error> {
        self.client.send(self.client.get("/account"), "Get account").await
    }

    /// Registers a new user. Use `crate::id::unique()` for a server-generated id.
    pub async fn create(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, Error> {
        let request = CreateAccountRequest {
            user_id,
            email,
            password,
            name,
        };
        self.client
            .send(self.client.post("/account").json(&request), "Create account")
            .await
    }

    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        let request = EmailPasswordRequest { email, password };
        self.client
            .send(
                self.client.post("/account/sessions/email").json(&request),
                "Create email password session",
            )
            .await
    }

    pub async fn create_anonymous_session(&self) -> Result<Session, Error> {
        self.client
            .send(
                self.client.post("/account/sessions/anonymous"),
                "Create anonymous session",
            )
            .await
    }

    /// Builds the URL that starts an OAuth2 login.
    ///
    /// The provider flow runs in a browser; Appwrite redirects to `success`/`failure` when it is
    /// done and sets the session cookie on that browser, not on this client.
    pub fn create_oauth2_session(
        &self,
        provider: OAuthProvider,
        success: Option<&str>,
        failure: Option<&str>,
        scopes: &[&str],
    ) -> Result<Url, Error> {
        let mut url = Url::parse(&self.client.url(&format!(
            "/account/sessions/oauth2/{}",
            provider.as_str()
        )))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("project", self.client.project_id());
            if let Some(success) = success {
                query.append_pair("success", success);
            }
            if let Some(failure) = failure {
                query.append_pair("failure", failure);
            }
            for scope in scopes {
                query.append_pair("scopes[]", scope);
            }
        }
        Ok(url)
    }

    /// Creates a short-lived JWT for the current session.
    pub async fn create_jwt(&self) -> Result<Jwt, Error> {
        self.client
            .send(self.client.post("/account/jwts"), "Create JWT")
            .await
    }

    pub async fn update_name(&self, name: &str) -> Result<User, Error> {
        self.client
            .send(
                self.client.patch("/account/name").json(&UpdateNameRequest { name }),
                "Update name",
            )
            .await
    }

    /// Changing the email requires the current password.
    pub async fn update_email(&self, email: &str, password: &str) -> Result<User, Error> {
        self.client
            .send(
                self.client
                    .patch("/account/email")
                    .json(&EmailPasswordRequest { email, password }),
                "Update email",
            )
            .await
    }

    pub async fn update_password(
        &self,
        password: &str,
        old_password: Option<&str>,
    ) -> Result<User, Error> {
        let request = UpdatePasswordRequest {
            password,
            old_password,
        };
        self.client
            .send(
                self.client.patch("/account/password").json(&request),
                "Update password",
            )
            .await
    }

    /// Replaces the user's preferences object.
    pub async fn update_prefs(&self, prefs: &Preferences) -> Result<User, Error> {
        self.client
            .send(
                self.client.patch("/account/prefs").json(&UpdatePrefsRequest { prefs }),
                "Update preferences",
            )
            .await
    }

    pub async fn list_sessions(&self) -> Result<SessionList, Error> {
        self.client
            .send(self.client.get("/account/sessions"), "List sessions")
            .await
    }

    pub async fn list_logs(&self) -> Result<LogList, Error> {
        self.client
            .send(self.client.get("/account/logs"), "List logs")
            .await
    }

    /// Sends a verification email that links back to `url`.
    pub async fn create_verification(&self, url: &str) -> Result<Token, Error> {
        self.client
            .send(
                self.client
                    .post("/account/verification")
                    .json(&VerificationRequest { url }),
                "Create verification",
            )
            .await
    }

    pub async fn create_phone_verification(&self) -> Result<Token, Error> {
        self.client
            .send(
                self.client.post("/account/verification/phone"),
                "Create phone verification",
            )
            .await
    }

    pub async fn create_recovery(&self, email: &str, url: &str) -> Result<Token, Error> {
        self.client
            .send(
                self.client
                    .post("/account/recovery")
                    .json(&RecoveryRequest { email, url }),
                "Create recovery",
            )
            .await
    }

    /// Blocks the current user. The account cannot be used again until unblocked server side.
    pub async fn update_status(&self) -> Result<User, Error> {
        self.client
            .send(self.client.patch("/account/status"), "Update status")
            .await
    }

    /// Deletes every session of the current user.
    pub async fn delete_sessions(&self) -> Result<(), Error> {
        self.client
            .send_empty(self.client.delete("/account/sessions"), "Delete sessions")
            .await
    }

    /// Deletes one session; pass `"current"` for the session making the call.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), Error> {
        let path = format!("/account/sessions/{}", segment(session_id));
        self.client
            .send_empty(self.client.delete(&path), "Delete session")
            .await
    }
}
