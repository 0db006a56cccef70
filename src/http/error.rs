use reqwest::StatusCode;

/// Maximum number of body characters kept on an [`HttpStatusError`].
pub const ERROR_BODY_LIMIT: usize = 1000;

/// The service answered with a non-2xx status.
#[derive(Debug)]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub service: String,
    /// Response body, truncated to [`ERROR_BODY_LIMIT`] characters.
    pub body: String,
}

impl HttpStatusError {
    pub fn new(status: StatusCode, service: &str, body: &str) -> Self {
        Self {
            status,
            service: service.to_string(),
            body: truncate(body, ERROR_BODY_LIMIT).to_string(),
        }
    }
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} error for {}", self.status.as_u16(), self.service)
    }
}

impl std::error::Error for HttpStatusError {}

/// Returns at most `max_chars` characters of `s`, cut on a char boundary.
pub fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
