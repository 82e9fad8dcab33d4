//! Shared plumbing for every Appwrite service client.
//!
//! [`Client`] owns the HTTP stack (header middleware + session cookie store) and the
//! endpoint/project pair every service needs. Services borrow it by cloning; clones share the
//! same connection pool and cookie jar, so logging in through `Account` authenticates the
//! `Databases` handle as well.

pub mod cookies;
pub mod middleware;

use crate::config::ClientConfig;
use cookies::SessionCookies;
use middleware::HeaderMiddleware;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use url::Url;


/// Errors returned by the service clients.
#[derive(Error, Debug)]
pub enum Error {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Failure raised inside a middleware rather than by the transport.
    #[error("Middleware error: {0}")]
    Middleware(anyhow::Error),
    /// Error reported by the Appwrite API.
    #[error("{context} failed ({code} {kind}): {message}")]
    Api {
        context: String,
        code: u16,
        kind: String,
        message: String,
    },
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The client configuration cannot be used to build a client.
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    /// Error message pushed by the realtime server.
    #[error("Realtime error: {0}")]
    Realtime(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => Error::Request(err),
            reqwest_middleware::Error::Middleware(err) => Error::Middleware(err),
        }
    }
}

impl Error {
    /// Returns the HTTP status code for API errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppwriteErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Turns a non-success response into [`Error::Api`].
///
/// Falls back to the HTTP status and raw body when the payload is not Appwrite's error JSON.
pub async fn parse_error_response(response: reqwest::Response, context: &str) -> Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<AppwriteErrorResponse>(&text) {
        Ok(body) => Error::Api {
            context: context.to_string(),
            code: if body.code == 0 { status.as_u16() } else { body.code },
            kind: body.kind,
            message: body.message,
        },
        Err(_) => Error::Api {
            context: context.to_string(),
            code: status.as_u16(),
            kind: status
                .canonical_reason()
                .unwrap_or("unknown")
                .to_lowercase()
                .replace(' ', "_"),
            message: text,
        },
    }
}

/// HTTP client bound to one Appwrite endpoint and project.
#[derive(Clone)]
pub struct Client {
    http: ClientWithMiddleware,
    endpoint: String,
    realtime_endpoint: String,
    project_id: String,
    cookies: Arc<SessionCookies>,
}

impl Client {
    /// Builds a client from validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate().map_err(|e| Error::Config(e.to_string()))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let realtime_endpoint = match config.realtime_endpoint.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => realtime_from_http(&endpoint)?,
        };

        let cookies = Arc::new(SessionCookies::default());
        let inner = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .danger_accept_invalid_certs(config.self_signed)
            .build()?;

        let http = ClientBuilder::new(inner)
            .with(HeaderMiddleware::new(
                config.project_id.clone(),
                config.dev_key.clone(),
                config.locale.clone(),
            ))
            .build();

        Ok(Self {
            http,
            endpoint,
            realtime_endpoint,
            project_id: config.project_id.clone(),
            cookies,
        })
    }

    /// REST endpoint, e.g. `https://cloud.appwrite.io/v1`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// WebSocket endpoint, e.g. `wss://cloud.appwrite.io/v1`.
    pub fn realtime_endpoint(&self) -> &str {
        &self.realtime_endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The session cookie jar shared by every clone of this client.
    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    /// Forgets the current session locally. The server-side session is untouched.
    pub fn clear_session(&self) {
        self.cookies.clear();
    }

    /// Checks connectivity; the server answers `Pong`.
    pub async fn ping(&self) -> Result<String, Error> {
        let response = self.get("/ping").send().await?;
        if !response.status().is_success() {
            return Err(parse_error_response(response, "Ping").await);
        }
        Ok(response.text().await?)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn patch(&self, path: &str) -> RequestBuilder {
        self.http.patch(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Sends the request and decodes a JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, Error> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(parse_error_response(response, context).await);
        }
        Ok(response.json().await?)
    }

    /// Sends the request and discards the body (`204 No Content` endpoints).
    pub(crate) async fn send_empty(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<(), Error> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(parse_error_response(response, context).await);
        }
        Ok(())
    }

    /// Sends the request and returns the raw body.
    pub(crate) async fn send_bytes(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<bytes::Bytes, Error> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(parse_error_response(response, context).await);
        }
        Ok(response.bytes().await?)
    }
}

/// Derives the realtime endpoint from the REST endpoint by swapping the scheme.
fn realtime_from_http(endpoint: &str) -> Result<String, Error> {
    let mut url = Url::parse(endpoint)?;
    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => return Err(Error::Config(format!("unsupported endpoint scheme `{other}`"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::Config(format!("cannot derive realtime endpoint from `{endpoint}`")))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Percent-encodes a single path segment (ids are user supplied).
pub(crate) fn segment(value: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return value.to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().push(value);
    }
    url.path().trim_start_matches('/').to_string()
}
