// src/http/auth.rs

//! Shared-secret check for trigger requests.

use std::borrow::Cow;
use std::fmt;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use percent_encoding::percent_decode_str;
use subtle::ConstantTimeEq;

/// Query parameter accepted as an alternative to the `Authorization` header.
pub const AUTHORIZATION_QUERY_PARAM: &str = "authorization";

const BEARER_PREFIX: &[u8] = b"Bearer ";

/// Optional shared secret. Without one, every request is authorized.
#[derive(Clone, Default)]
pub struct AuthToken {
    secret: Option<String>,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AuthToken {
    /// An empty secret counts as no secret.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Decide whether a request carrying `headers` and the raw `query` string
    /// may trigger the hook.
    ///
    /// Accepted credentials: `Authorization: Bearer <secret>` (first header
    /// value, case-sensitive prefix) or any `authorization=<secret>` query
    /// parameter.
    pub fn authorizes(&self, headers: &HeaderMap, query: Option<&str>) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };

        let header_ok = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.as_bytes().strip_prefix(BEARER_PREFIX))
            .is_some_and(|token| secure_compare(token, secret.as_bytes()));
        if header_ok {
            return true;
        }

        query.is_some_and(|query| {
            query_values(query, AUTHORIZATION_QUERY_PARAM)
                .any(|value| secure_compare(value.as_bytes(), secret.as_bytes()))
        })
    }
}

fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Form-decoded values of every `key` parameter in a raw query string.
fn query_values<'a>(query: &'a str, key: &'a str) -> impl Iterator<Item = String> + 'a {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(move |pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(name) == key).then(|| form_decode(value).into_owned())
        })
}

fn form_decode(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(raw).decode_utf8_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    fn token() -> AuthToken {
        AuthToken::new(Some("letmein".to_string()))
    }

    #[test]
    fn no_secret_allows_everything() {
        let open = AuthToken::new(None);
        assert!(!open.is_enabled());
        assert!(open.authorizes(&HeaderMap::new(), None));
        assert!(AuthToken::new(Some(String::new())).authorizes(&HeaderMap::new(), None));
    }

    #[test]
    fn bearer_header_must_match_exactly() {
        assert!(token().authorizes(&bearer("Bearer letmein"), None));
        assert!(!token().authorizes(&bearer("Bearer letmein2"), None));
        assert!(!token().authorizes(&bearer("bearer letmein"), None));
        assert!(!token().authorizes(&bearer("letmein"), None));
        assert!(!token().authorizes(&bearer("Bearer "), None));
    }

    #[test]
    fn query_parameter_is_accepted() {
        assert!(token().authorizes(&HeaderMap::new(), Some("authorization=letmein")));
        assert!(token().authorizes(
            &HeaderMap::new(),
            Some("authorization=nope&x=1&authorization=letmein")
        ));
        assert!(!token().authorizes(&HeaderMap::new(), Some("auth=letmein")));
        assert!(!token().authorizes(&HeaderMap::new(), Some("authorization=")));
        assert!(!token().authorizes(&HeaderMap::new(), None));
    }

    #[test]
    fn query_values_are_form_decoded() {
        let spaced = AuthToken::new(Some("let me/in".to_string()));
        assert!(spaced.authorizes(&HeaderMap::new(), Some("authorization=let+me%2Fin")));
        assert!(spaced.authorizes(&HeaderMap::new(), Some("authorization=let%20me/in")));
    }

    #[test]
    fn wrong_header_falls_back_to_query() {
        assert!(token().authorizes(&bearer("Bearer wrong"), Some("authorization=letmein")));
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let rendered = format!("{:?}", token());
        assert!(!rendered.contains("letmein"));
    }
}
