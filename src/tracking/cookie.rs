//! Cookie parsing and `Set-Cookie` rendering.
//!
//! # Responsibilities
//! - Parse every `Cookie` header on a request into a name → value map
//! - Render tracking cookies as version 1 `Set-Cookie` values
//! - Compute `Max-Age` and `Expires` from a timeout
//!
//! # Design Decisions
//! - First occurrence of a name wins when a client repeats it
//! - Surrounding double quotes are stripped; the value is otherwise verbatim
//! - `Max-Age` is omitted when it does not fit an `i32`; `Expires` is always present

use std::collections::HashMap;
use std::time::Duration;

use axum::http::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};
use chrono::{DateTime, Utc};

/// Cookie version written on every tracking cookie.
pub const COOKIE_VERSION: u8 = 1;

const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={}";

/// Whether `name` is an RFC 6265 token usable as a cookie name.
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}

/// Whether `value` can be used as a `Domain` or `Path` attribute.
pub fn is_valid_attribute_value(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| (b == b' ' || b.is_ascii_graphic()) && b != b';')
}

/// Cookies presented on one inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies {
    values: HashMap<String, String>,
}

impl RequestCookies {
    /// Collect cookies from all `Cookie` headers.
    ///
    /// Headers are split on raw bytes, so a pair that is not valid UTF-8
    /// is skipped alone and its siblings are kept. RFC 2109 `$` attributes
    /// are skipped too.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();

        for header in headers.get_all(header::COOKIE) {
            for pair in header.as_bytes().split(|&b| b == b';') {
                let Ok(pair) = std::str::from_utf8(pair) else {
                    continue;
                };
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() || name.starts_with('$') {
                    continue;
                }
                values
                    .entry(name.to_string())
                    .or_insert_with(|| unquote(value.trim()).to_string());
            }
        }

        Self { values }
    }

    /// Look up a cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// A tracking cookie ready to be written onto a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingCookie {
    pub name: String,
    pub value: String,
    /// `None` when the timeout does not fit a signed 32-bit second count.
    pub max_age: Option<i32>,
    pub expires: DateTime<Utc>,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl TrackingCookie {
    /// Build a cookie that expires `timeout` after `now`.
    pub fn new(name: &str, value: &str, timeout: Duration, now: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            max_age: max_age_for(timeout),
            expires: expiry_for(now, timeout),
            domain: None,
            path: None,
        }
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    /// Convert into a `Set-Cookie` header value.
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::try_from(self.to_string())
    }
}

impl std::fmt::Display for TrackingCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}; Version={}", self.name, self.value, COOKIE_VERSION)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        write!(f, "; Expires={}", format_http_date(&self.expires))?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        Ok(())
    }
}

/// `Max-Age` for a timeout, if representable as a signed 32-bit integer.
pub fn max_age_for(timeout: Duration) -> Option<i32> {
    i32::try_from(timeout.as_secs()).ok()
}

/// Absolute expiry `timeout` after `now`, saturating at the latest representable instant.
pub fn expiry_for(now: DateTime<Utc>, timeout: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(timeout)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Format an instant as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(instant: &DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(header::COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_parse_single_header() {
        let cookies = RequestCookies::from_headers(&headers(&["_dvp=abc; _dvs = def ;other=1"]));
        assert_eq!(cookies.get("_dvp"), Some("abc"));
        assert_eq!(cookies.get("_dvs"), Some("def"));
        assert_eq!(cookies.get("other"), Some("1"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_parse_multiple_headers_first_wins() {
        let cookies = RequestCookies::from_headers(&headers(&["a=1", "b=2; a=3"]));
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_strips_quotes_and_version_attributes() {
        let cookies =
            RequestCookies::from_headers(&headers(&["$Version=1; session=\"abc-123\"; $Path=/"]));
        assert_eq!(cookies.get("session"), Some("abc-123"));
        assert_eq!(cookies.len(), 1);
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let cookies = RequestCookies::from_headers(&headers(&["novalue; =orphan; ok=yes"]));
        assert_eq!(cookies.get("ok"), Some("yes"));
        assert_eq!(cookies.len(), 1);
        assert!(RequestCookies::from_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_non_ascii_sibling_keeps_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_bytes(b"_dvp=V-42; _dvs=S-1; pref=caf\xc3\xa9; bad=\xff\xfe").unwrap(),
        );
        let cookies = RequestCookies::from_headers(&headers);

        assert_eq!(cookies.get("_dvp"), Some("V-42"));
        assert_eq!(cookies.get("_dvs"), Some("S-1"));
        assert_eq!(cookies.get("pref"), Some("café"));
        assert_eq!(cookies.get("bad"), None);
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_empty_value_is_present() {
        let cookies = RequestCookies::from_headers(&headers(&["_dvp=; _dvs=\"\""]));
        assert_eq!(cookies.get("_dvp"), Some(""));
        assert_eq!(cookies.get("_dvs"), Some(""));
    }

    #[test]
    fn test_cookie_name_validation() {
        assert!(is_valid_cookie_name("_dvp"));
        assert!(is_valid_cookie_name("party-id.v2"));
        assert!(!is_valid_cookie_name(""));
        assert!(!is_valid_cookie_name("has space"));
        assert!(!is_valid_cookie_name("semi;colon"));
        assert!(!is_valid_cookie_name("eq=uals"));
    }

    #[test]
    fn test_render_set_cookie() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let cookie = TrackingCookie::new("_dvs", "abc-123", Duration::from_secs(1800), now);
        assert_eq!(
            cookie.to_string(),
            "_dvs=abc-123; Version=1; Max-Age=1800; Expires=Fri, 01 Mar 2024 12:30:00 GMT"
        );
    }

    #[test]
    fn test_render_with_domain_and_path() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let cookie = TrackingCookie::new("_dvp", "v", Duration::from_secs(60), now)
            .with_domain(Some("example.com".to_string()))
            .with_path(Some("/".to_string()));
        let rendered = cookie.to_string();
        assert!(rendered.ends_with("; Domain=example.com; Path=/"));
        assert!(cookie.header_value().is_ok());
    }

    #[test]
    fn test_max_age_omitted_beyond_i32() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timeout = Duration::from_secs(i32::MAX as u64 + 1);
        let cookie = TrackingCookie::new("_dvp", "v", timeout, now);

        assert_eq!(cookie.max_age, None);
        let rendered = cookie.to_string();
        assert!(!rendered.contains("Max-Age"));
        assert!(rendered.contains("Expires="));
        assert_eq!(max_age_for(Duration::from_secs(i32::MAX as u64)), Some(i32::MAX));
    }

    #[test]
    fn test_expiry_saturates() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, Duration::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
