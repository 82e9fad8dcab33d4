use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use http::Extensions;

/// Response format the models in this crate are written against.
pub const RESPONSE_FORMAT: &str = "1.7.0";

const SDK_NAME: &str = "Playground";
const SDK_PLATFORM: &str = "client";
const SDK_LANGUAGE: &str = "rust";

/// Adds the project, SDK and optional dev-key/locale headers to every request.
#[derive(Clone, Debug)]
pub struct HeaderMiddleware {
    headers: HeaderMap,
}

impl HeaderMiddleware {
    pub fn new(project_id: String, dev_key: Option<String>, locale: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        insert(&mut headers, "x-appwrite-project", &project_id);
        insert(&mut headers, "x-appwrite-response-format", RESPONSE_FORMAT);
        insert(&mut headers, "x-sdk-name", SDK_NAME);
        insert(&mut headers, "x-sdk-platform", SDK_PLATFORM);
        insert(&mut headers, "x-sdk-language", SDK_LANGUAGE);
        insert(&mut headers, "x-sdk-version", env!("CARGO_PKG_VERSION"));
        if let Some(key) = dev_key.filter(|k| !k.is_empty()) {
            insert(&mut headers, "x-appwrite-dev-key", &key);
        }
        if let Some(locale) = locale.filter(|l| !l.is_empty()) {
            insert(&mut headers, "x-appwrite-locale", &locale);
        }
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

// Values that are not valid header text are dropped rather than failing every request.
fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(_) => tracing::warn!(header = name, "dropping header with invalid value"),
    }
}

#[async_trait::async_trait]
impl Middleware for HeaderMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        for (name, value) in &self.headers {
            req.headers_mut().entry(name.clone()).or_insert_with(|| value.clone());
        }

        tracing::debug!(method = %req.method(), url = %req.url(), "appwrite request");
        let response = next.run(req, extensions).await?;
        tracing::debug!(status = %response.status(), "appwrite response");
        Ok(response)
    }
}
