//! HTTP request descriptor shared by the matcher, the orchestrator and the
//! request cache.

use std::borrow::Cow;

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// The parts of an HTTP request the handshake needs: method, URI and headers.
///
/// Used both for the inbound request carrying the WLS response and for the
/// original request that triggered the redirect to the WLS.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// Capture the descriptor of an `http::Request`, ignoring its body.
    #[must_use]
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw (still percent-encoded) query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Query pairs, form-decoded: `+` becomes a space and percent escapes are
    /// resolved in both names and values.
    #[must_use]
    pub fn query_pairs(&self) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
        url::form_urlencoded::parse(self.query().unwrap_or_default().as_bytes())
    }

    /// Whether some query pair is named `name`, decoded as in
    /// [`RequestDescriptor::query_pairs`].
    #[must_use]
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_pairs().any(|(key, _)| key == name)
    }

    /// First value of the named query parameter, form-decoded.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value of the named cookie from the `Cookie` headers.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Absolute URL of the request.
    ///
    /// Uses the URI as-is when it is absolute; otherwise joins the `Host`
    /// header and `default_scheme` with the path and query.
    #[must_use]
    pub fn absolute_url(&self, default_scheme: &str) -> Option<String> {
        if self.uri.scheme().is_some() && self.uri.authority().is_some() {
            return Some(self.uri.to_string());
        }

        let host = self
            .headers
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())?;
        let path_and_query = self
            .uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);

        Some(format!("{default_scheme}://{host}{path_and_query}"))
    }
}
