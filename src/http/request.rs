//! Outgoing HTTP requests.

use bytes::Bytes;
use url::Url;

use super::{Headers, Method};

/// An outgoing HTTP request: method, absolute target URL, headers and an
/// optional body.
///
/// # Examples
///
/// ```
/// use roundcache::http::{Method, Request};
///
/// let request = Request::get("https://example.com/search?q=rust#top")
///     .unwrap()
///     .header("Accept", "application/json");
///
/// assert_eq!(request.method(), &Method::Get);
/// assert_eq!(request.headers().get("accept"), Some("application/json"));
/// assert_eq!(request.cache_key(), "https://example.com/search?q=rust");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
}

/// The metadata of a request, without its body.
///
/// Responses keep one of these as a back-reference to the request that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
}

impl Request {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Parses `url` and creates a `GET` request for it.
    pub fn get(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::Get, Url::parse(url)?))
    }

    /// Parses `url` and creates a `POST` request for it.
    pub fn post(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::Post, Url::parse(url)?))
    }

    /// Appends a request header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request headers for in-place modification.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the request body, if one was set.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns the key under which a response to this request is cached.
    ///
    /// The key is the normalized target URL (scheme, host, port, path and
    /// query). Headers and body never contribute; the fragment is dropped
    /// because it is never sent to the server.
    pub fn cache_key(&self) -> String {
        match self.url.fragment() {
            None => self.url.as_str().to_owned(),
            Some(_) => {
                let mut url = self.url.clone();
                url.set_fragment(None);
                url.into()
            }
        }
    }

    /// Returns a body-less snapshot of this request.
    pub fn head(&self) -> RequestHead {
        RequestHead {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
        }
    }
}
