//! Resource id helpers.

/// Asks the server to generate the id.
pub fn unique() -> String {
    "unique()".to_string()
}

/// A caller-chosen id. Appwrite accepts up to 36 chars of `a-z A-Z 0-9 . - _`, not starting
/// with a special char.
pub fn custom(id: impl Into<String>) -> String {
    id.into()
}
