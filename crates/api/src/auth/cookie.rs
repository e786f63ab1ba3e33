//! The `pitchwise_session` cookie.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "pitchwise_session";

/// `Set-Cookie` value that stores `token` for `max_age_secs`.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Find the session token among the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_has_expected_attributes() {
        let cookie = session_cookie("abc.def.ghi", 3600, false);
        assert!(cookie.starts_with("pitchwise_session=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn secure_flag_is_appended_when_configured() {
        assert!(session_cookie("t", 60, true).ends_with("; Secure"));
    }

    #[test]
    fn clearing_sets_empty_value_and_zero_age() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("pitchwise_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pitchwise_session=tok123; lang=en"),
        );
        assert_eq!(session_token(&headers), Some("tok123"));
    }

    #[test]
    fn token_is_found_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("pitchwise_session=tok456"));
        assert_eq!(session_token(&headers), Some("tok456"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("pitchwise_session="));
        assert_eq!(session_token(&headers), None);
    }
}
