//! In-memory cookie jar for the Appwrite session.
//!
//! A client talks to exactly one endpoint, so cookies are keyed by name only; domain and path
//! attributes are ignored. Expired and `Max-Age=0` cookies remove the stored value, which is
//! how the server signals logout.

use chrono::{DateTime, Utc};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use url::Url;

#[derive(Debug, Default)]
pub struct SessionCookies {
    jar: Mutex<BTreeMap<String, String>>,
}

impl SessionCookies {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.jar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    /// Cookie names with their values masked.
    pub fn contents(&self) -> String {
        self.lock()
            .iter()
            .map(|(name, value)| format!("{name}=<{} chars>", value.len()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Applies one `Set-Cookie` header value.
    pub fn store(&self, set_cookie: &str, now: DateTime<Utc>) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let expired = parts.any(|attribute| {
            let Some((key, val)) = attribute.split_once('=') else {
                return false;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "max-age" => val.trim().parse::<i64>().map(|age| age <= 0).unwrap_or(false),
                "expires" => DateTime::parse_from_rfc2822(val.trim())
                    .map(|at| at.with_timezone(&Utc) <= now)
                    .unwrap_or(false),
                _ => false,
            }
        });

        let value = value.trim().trim_matches('"');
        let mut jar = self.lock();
        if expired || value.is_empty() || value == "deleted" {
            jar.remove(name);
        } else {
            jar.insert(name.to_string(), value.to_string());
        }
    }

    /// The `Cookie` request header value, if any cookie is stored.
    pub fn header_value(&self) -> Option<HeaderValue> {
        let jar = self.lock();
        if jar.is_empty() {
            return None;
        }
        let joined = jar
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        let now = Utc::now();
        for header in cookie_headers {
            if let Ok(text) = header.to_str() {
                self.store(text, now);
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        self.header_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_replay() {
        let cookies = SessionCookies::default();
        let now = Utc::now();
        cookies.store("a_session_p=abc123; path=/; httponly; samesite=none", now);
        cookies.store("a_session_p_legacy=abc123; path=/", now);

        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("a_session_p").as_deref(), Some("abc123"));
        assert_eq!(
            cookies.header_value().unwrap(),
            "a_session_p=abc123; a_session_p_legacy=abc123"
        );
    }

    #[test]
    fn test_expired_cookie_removes_entry() {
        let cookies = SessionCookies::default();
        let now = Utc::now();
        cookies.store("a_session_p=abc123; path=/", now);
        cookies.store(
            "a_session_p=deleted; expires=Thu, 01 Jan 1970 00:00:01 GMT; path=/",
            now,
        );
        assert!(cookies.is_empty());

        cookies.store("other=1", now);
        cookies.store("other=1; Max-Age=0", now);
        assert!(cookies.header_value().is_none());
    }

    #[test]
    fn test_contents_masks_values() {
        let cookies = SessionCookies::default();
        cookies.store("a_session_p=secretvalue", Utc::now());
        assert_eq!(cookies.contents(), "a_session_p=<11 chars>");
    }

    #[test]
    fn test_malformed_cookie_is_ignored() {
        let cookies = SessionCookies::default();
        cookies.store("no-equals-sign", Utc::now());
        cookies.store("=value", Utc::now());
        assert!(cookies.is_empty());
    }
}
