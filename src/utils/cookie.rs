// src/utils/cookie.rs

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the cookie carrying the provider access token.
pub const SESSION_COOKIE: &str = "mt_session";

/// The access token presented by the browser, if any.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
}

/// Cookie that stores the session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Drops the session cookie. The jar only emits a removal when the request
/// actually carried one.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn jar_with(cookie: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let jar = jar_with("theme=dark; mt_session=abc.def.ghi; lang=en");
        assert_eq!(session_token(&jar), Some("abc.def.ghi"));
        assert_eq!(session_token(&CookieJar::new()), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        assert_eq!(session_token(&jar_with("mt_session=")), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_secure_on_request() {
        let rendered = session_cookie("tok".into(), true).to_string();
        assert!(rendered.starts_with("mt_session=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(!session_cookie("tok".into(), false).to_string().contains("Secure"));
    }

    #[test]
    fn cleared_jar_no_longer_holds_session() {
        let jar = clear_session_cookie(jar_with("mt_session=tok"));
        assert_eq!(session_token(&jar), None);
    }
}
