//! Ordered, multi-value header fields.
//!
//! The same type carries request headers, response headers and trailers.
//! Field names match ASCII case-insensitively; values are kept as received.

/// An ordered list of header fields.
///
/// Repeated names keep every value in arrival order. Cloning yields a fully
/// independent list, so a cached response can hand out header collections
/// that callers mutate freely.
///
/// # Examples
///
/// ```
/// use roundcache::http::Headers;
///
/// let mut headers: Headers = [("Vary", "Accept"), ("Vary", "Cookie")].into_iter().collect();
/// headers.set("Content-Type", "application/json");
///
/// assert_eq!(headers.get("content-type"), Some("application/json"));
/// assert_eq!(headers.get_all("VARY").collect::<Vec<_>>(), ["Accept", "Cookie"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

impl Field {
    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field after any existing ones with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Replaces every value for `name` with a single `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.insert(name, value);
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.is(name))
            .map(|field| field.value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.is(name))
            .map(|field| field.value.as_str())
    }

    /// Drops every field named `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|field| !field.is(name));
        before - self.fields.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.is(name))
    }

    /// Number of fields, counting repeated names once per value.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(name, value)` pairs in arrival order, names as originally spelled.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_without_case() {
        let headers: Headers = [("ETag", "\"v1\"")].into_iter().collect();
        assert_eq!(headers.get("etag"), Some("\"v1\""));
        assert_eq!(headers.get("ETAG"), Some("\"v1\""));
        assert!(headers.contains("eTaG"));
        assert_eq!(headers.get("etags"), None);
    }

    #[test]
    fn repeated_names_keep_arrival_order() {
        let mut headers = Headers::new();
        headers.insert("Set-Cookie", "a=1");
        headers.insert("Cache-Control", "no-store");
        headers.insert("set-cookie", "b=2");

        assert_eq!(headers.get_all("set-cookie").collect::<Vec<_>>(), ["a=1", "b=2"]);
        assert_eq!(
            headers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            ["Set-Cookie", "Cache-Control", "set-cookie"]
        );
    }

    #[test]
    fn set_collapses_to_one_value() {
        let mut headers: Headers = [("Accept", "text/html"), ("accept", "application/json")]
            .into_iter()
            .collect();
        headers.set("ACCEPT", "*/*");
        assert_eq!(headers.get_all("accept").collect::<Vec<_>>(), ["*/*"]);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn remove_reports_count() {
        let mut headers: Headers = [("X-Foo", "bar"), ("x-foo", "baz"), ("X-Bar", "1")]
            .into_iter()
            .collect();
        assert_eq!(headers.remove("X-FOO"), 2);
        assert_eq!(headers.remove("x-foo"), 0);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn clone_is_independent() {
        let original: Headers = [("ETag", "\"v1\"")].into_iter().collect();
        let mut copy = original.clone();
        copy.set("ETag", "\"v2\"");
        copy.insert("X-Extra", "1");

        assert_eq!(original.get("etag"), Some("\"v1\""));
        assert_eq!(original.len(), 1);
        assert_eq!(copy.get("etag"), Some("\"v2\""));
    }
}
