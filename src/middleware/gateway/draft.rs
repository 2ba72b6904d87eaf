//! Response accumulator threaded through the gateway stages.
//!
//! Each stage contributes headers and cookie writes to a `ResponseDraft`;
//! drafts are merged in stage order and applied once to the final response.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::warn;

/// Cookie writes keyed by name. Setting a name twice keeps the later write.
#[derive(Debug, Default, Clone)]
pub struct CookieWrites(Vec<Cookie<'static>>);

impl CookieWrites {
    pub fn set(&mut self, cookie: Cookie<'static>) {
        match self.0.iter_mut().find(|c| c.name() == cookie.name()) {
            Some(slot) => *slot = cookie,
            None => self.0.push(cookie),
        }
    }

    /// Apply `later` on top of `self`.
    pub fn merge(mut self, later: CookieWrites) -> Self {
        for cookie in later.0 {
            self.set(cookie);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Cookie<'static>> {
        self.0.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay the writes on a request cookie jar.
    pub fn overlay(&self, jar: CookieJar) -> CookieJar {
        self.0.iter().cloned().fold(jar, |jar, c| jar.add(c))
    }

    /// Rewrite the request `Cookie` header so downstream code sees the
    /// written values.
    pub fn apply_to_request(&self, headers: &mut HeaderMap) {
        if self.is_empty() {
            return;
        }

        let jar = self.overlay(CookieJar::from_headers(headers));
        let joined = jar
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; ");

        match HeaderValue::from_str(&joined) {
            Ok(value) => {
                headers.remove(COOKIE);
                headers.insert(COOKIE, value);
            }
            Err(_) => warn!("rewritten cookie header is not a valid header value"),
        }
    }
}

impl From<Vec<Cookie<'static>>> for CookieWrites {
    fn from(cookies: Vec<Cookie<'static>>) -> Self {
        let mut writes = CookieWrites::default();
        for cookie in cookies {
            writes.set(cookie);
        }
        writes
    }
}

/// Headers and cookies contributed by gateway stages.
#[derive(Debug, Default, Clone)]
pub struct ResponseDraft {
    headers: HeaderMap,
    cookies: CookieWrites,
}

impl ResponseDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.set(cookie);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &CookieWrites {
        &self.cookies
    }

    /// Union of both drafts; `later` wins per header name and per cookie name.
    pub fn merge(mut self, later: ResponseDraft) -> Self {
        // HeaderMap::extend replaces existing values for each yielded name.
        self.headers.extend(later.headers);
        self.cookies = self.cookies.merge(later.cookies);
        self
    }

    /// Write the draft onto a response built by the gateway itself (a
    /// redirect): every header and cookie is applied.
    pub fn apply_to(self, response: &mut Response) {
        let headers = response.headers_mut();
        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        append_set_cookies(headers, self.cookies.iter());
    }

    /// Write the draft onto a response produced downstream. Anything the
    /// downstream handler set itself (a header, or a cookie of the same name)
    /// is the later write and is kept.
    pub fn apply_under(self, response: &mut Response) {
        let headers = response.headers_mut();
        for (name, value) in self.headers.iter() {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        let downstream: Vec<String> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v.to_string()).ok())
            .map(|c| c.name().to_string())
            .collect();

        append_set_cookies(
            headers,
            self.cookies
                .iter()
                .filter(|c| !downstream.iter().any(|n| n == c.name())),
        );
    }
}

fn append_set_cookies<'a>(
    headers: &mut HeaderMap,
    cookies: impl Iterator<Item = &'a Cookie<'static>>,
) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => warn!(cookie = cookie.name(), "dropping unencodable cookie"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_LANGUAGE;

    fn cookie(name: &'static str, value: &'static str) -> Cookie<'static> {
        Cookie::new(name, value)
    }

    fn set_cookie_values(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn later_cookie_with_same_name_wins() {
        let earlier = CookieWrites::from(vec![cookie("locale", "en"), cookie("session", "a")]);
        let later = CookieWrites::from(vec![cookie("session", "b")]);

        let merged = earlier.merge(later);
        assert_eq!(merged.get("session").unwrap().value(), "b");
        assert_eq!(merged.get("locale").unwrap().value(), "en");
        assert_eq!(merged.iter().count(), 2);
    }

    #[test]
    fn merge_keeps_headers_and_cookies_from_both_stages() {
        let locale = ResponseDraft::new()
            .with_header(CONTENT_LANGUAGE, HeaderValue::from_static("ja"))
            .with_cookie(cookie("locale", "ja"));
        let session = ResponseDraft::new().with_cookie(cookie("session", "rotated"));

        let merged = locale.merge(session);
        assert_eq!(merged.headers().get(CONTENT_LANGUAGE).unwrap(), "ja");
        assert_eq!(merged.cookies().get("locale").unwrap().value(), "ja");
        assert_eq!(merged.cookies().get("session").unwrap().value(), "rotated");
    }

    #[test]
    fn later_header_replaces_earlier() {
        let earlier = ResponseDraft::new()
            .with_header(CONTENT_LANGUAGE, HeaderValue::from_static("en"));
        let later = ResponseDraft::new()
            .with_header(CONTENT_LANGUAGE, HeaderValue::from_static("ja"));

        let merged = earlier.merge(later);
        let values: Vec<_> = merged.headers().get_all(CONTENT_LANGUAGE).iter().collect();
        assert_eq!(values, vec!["ja"]);
    }

    #[test]
    fn apply_to_request_overlays_existing_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=old; theme=dark"));

        let writes = CookieWrites::from(vec![cookie("session", "new")]);
        writes.apply_to_request(&mut headers);

        let jar = CookieJar::from_headers(&headers);
        assert_eq!(jar.get("session").unwrap().value(), "new");
        assert_eq!(jar.get("theme").unwrap().value(), "dark");
        assert_eq!(headers.get_all(COOKIE).iter().count(), 1);
    }

    #[test]
    fn apply_under_keeps_downstream_cookie_of_same_name() {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("locale=en; Path=/"));

        ResponseDraft::new()
            .with_cookie(cookie("locale", "ja"))
            .with_cookie(cookie("session", "fresh"))
            .apply_under(&mut response);

        let values = set_cookie_values(&response);
        assert_eq!(values.len(), 2);
        assert!(values.iter().any(|v| v.starts_with("locale=en")));
        assert!(values.iter().any(|v| v.starts_with("session=fresh")));
    }

    #[test]
    fn apply_to_writes_every_cookie() {
        let mut response = Response::new(Body::empty());
        ResponseDraft::new()
            .with_cookie(cookie("locale", "ja"))
            .with_cookie(cookie("session", "fresh"))
            .apply_to(&mut response);

        assert_eq!(set_cookie_values(&response).len(), 2);
    }
}
