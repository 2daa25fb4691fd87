//! Request matchers deciding which requests carry a WLS response.

use std::fmt;
use std::sync::Arc;

use webauth_sdk::RequestDescriptor;

use crate::config::DEFAULT_RESPONSE_PARAMETER;

/// A side-effect-free predicate over inbound requests.
pub trait RequestMatcher: Send + Sync {
    fn matches(&self, request: &RequestDescriptor) -> bool;
}

impl<F> RequestMatcher for F
where
    F: Fn(&RequestDescriptor) -> bool + Send + Sync,
{
    fn matches(&self, request: &RequestDescriptor) -> bool {
        self(request)
    }
}

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRequestMatcher;

impl RequestMatcher for AnyRequestMatcher {
    fn matches(&self, _request: &RequestDescriptor) -> bool {
        true
    }
}

/// Matches requests whose query string names the response parameter.
///
/// The query is split on `&` and the name of each segment is form-decoded
/// (`+` is a space) before an exact, case-sensitive comparison. Names decode
/// exactly as [`RequestDescriptor::query_param`] decodes them, so a matched
/// request always yields its response value. Only the name is inspected; the
/// value may be empty or absent.
#[derive(Debug, Clone)]
pub struct ResponseParameterMatcher {
    parameter: String,
}

impl ResponseParameterMatcher {
    #[must_use]
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }

    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }
}

impl Default for ResponseParameterMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_PARAMETER)
    }
}

impl RequestMatcher for ResponseParameterMatcher {
    fn matches(&self, request: &RequestDescriptor) -> bool {
        request.has_query_param(&self.parameter)
    }
}

/// Matches when every inner matcher does. Empty means match.
#[derive(Clone, Default)]
pub struct AndRequestMatcher {
    matchers: Vec<Arc<dyn RequestMatcher>>,
}

impl AndRequestMatcher {
    #[must_use]
    pub fn new(matchers: Vec<Arc<dyn RequestMatcher>>) -> Self {
        Self { matchers }
    }

    #[must_use]
    pub fn and(mut self, matcher: Arc<dyn RequestMatcher>) -> Self {
        self.matchers.push(matcher);
        self
    }
}

impl fmt::Debug for AndRequestMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndRequestMatcher")
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

impl RequestMatcher for AndRequestMatcher {
    fn matches(&self, request: &RequestDescriptor) -> bool {
        self.matchers.iter().all(|m| m.matches(request))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::Method;

    use super::*;

    fn request(method: Method, uri: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, uri.parse().unwrap())
    }

    #[test]
    fn matches_by_parameter_name() {
        let cases = [
            ("foo", "https://example.com/blah/blah?foo=abcd&xyz", true),
            ("WLS-Response", "https://example.com/blah/blah?x=y&WLS-Response=abcd&xyz", true),
            ("WLS-Response", "https://example.com/blah/blah", false),
            ("WLS-Response", "https://example.com/blah/blah?", false),
            ("WLS-Response", "https://example.com/blah/blah?wls-response=abcd", false),
            ("WLS-Response", "https://example.com/blah/blah?x=WLS-Response", false),
        ];

        for method in [Method::GET, Method::POST] {
            for (parameter, uri, expected) in cases {
                let matcher = ResponseParameterMatcher::new(parameter);
                assert_eq!(
                    matcher.matches(&request(method.clone(), uri)),
                    expected,
                    "{method} {uri} for '{parameter}'"
                );
            }
        }
    }

    #[test]
    fn bare_name_without_value_matches() {
        let matcher = ResponseParameterMatcher::default();
        assert!(matcher.matches(&request(Method::GET, "/cb?WLS-Response")));
    }

    #[test]
    fn name_is_form_decoded() {
        let matcher = ResponseParameterMatcher::new("a b");
        assert!(matcher.matches(&request(Method::GET, "/cb?a%20b=1")));
        assert!(matcher.matches(&request(Method::GET, "/cb?a+b=1")));

        let matcher = ResponseParameterMatcher::new("a+b");
        assert!(matcher.matches(&request(Method::GET, "/cb?a%2Bb=1")));
        assert!(!matcher.matches(&request(Method::GET, "/cb?a+b=1")));
    }

    #[test]
    fn matched_request_always_yields_its_value() {
        for (parameter, uri) in [
            ("a b", "/cb?a+b=tok"),
            ("a b", "/cb?a%20b=tok"),
            ("a+b", "/cb?a%2Bb=tok"),
            ("WLS-Response", "/cb?WLS%2DResponse=tok"),
        ] {
            let req = request(Method::GET, uri);
            assert!(ResponseParameterMatcher::new(parameter).matches(&req), "{uri}");
            assert_eq!(req.query_param(parameter).as_deref(), Some("tok"), "{uri}");
        }
    }

    #[test]
    fn undecodable_name_does_not_match() {
        let matcher = ResponseParameterMatcher::new("x");
        assert!(!matcher.matches(&request(Method::GET, "/cb?%FF=1")));
        assert!(matcher.matches(&request(Method::GET, "/cb?%FF=1&x=2")));
    }

    #[test]
    fn and_matcher_requires_all() {
        let host: Arc<dyn RequestMatcher> =
            Arc::new(|req: &RequestDescriptor| req.uri().path() == "/login");
        let matcher = AndRequestMatcher::default()
            .and(host)
            .and(Arc::new(ResponseParameterMatcher::default()));

        assert!(matcher.matches(&request(Method::GET, "/login?WLS-Response=x")));
        assert!(!matcher.matches(&request(Method::GET, "/other?WLS-Response=x")));
        assert!(!matcher.matches(&request(Method::GET, "/login?x=y")));
        assert!(AndRequestMatcher::default().matches(&request(Method::GET, "/")));
        assert!(AnyRequestMatcher.matches(&request(Method::GET, "/")));
    }
}
