//! Client configuration: endpoint derivation, headers and timeouts.

use anyhow::{Context, Result};
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, CONNECTION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
    USER_AGENT,
};
use std::time::Duration;

use crate::http::RetryPolicy;

/// Path appended to the base URL when it does not point at a service file.
pub const ENDPOINT_SUFFIX: &str = "/Sherpa.asmx";

/// Namespace prefixed to the service name in the SOAPAction header.
pub const DEFAULT_ACTION_NAMESPACE: &str = "http://sherpa.sherpaan.nl/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const SOAP_ACTION: &str = "soapaction";

const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";
const DEFAULT_USER_AGENT: &str = concat!("sherpa-soap/", env!("SHERPA_SOAP_VERSION"));

/// Derives the service endpoint from the base URL handed out by [`crate::Auth`].
///
/// The query string, `?wsdl` marker included, is dropped, and
/// [`ENDPOINT_SUFFIX`] is appended unless the path already names an `.asmx` file.
pub fn endpoint_url(base_url: &str) -> String {
    let url = base_url.split('?').next().unwrap_or_default();

    if url.ends_with(".asmx") {
        url.to_string()
    } else {
        format!("{}{}", url.trim_end_matches('/'), ENDPOINT_SUFFIX)
    }
}

/// Immutable settings shared by every call of a [`crate::SoapClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    action_namespace: String,
    headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            action_namespace: DEFAULT_ACTION_NAMESPACE.to_string(),
            headers: default_headers(),
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(6);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_action_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.action_namespace = namespace.into();
        self
    }

    /// Adds or replaces a fixed header sent with every call.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The fixed headers, without the per-call SOAPAction.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// SOAPAction value for a service, quoted as the service expects.
    pub fn soap_action(&self, service_name: &str) -> String {
        format!("\"{}{}\"", self.action_namespace, service_name)
    }

    /// Builds a fresh header map for one call: the fixed headers plus SOAPAction.
    pub fn request_headers(&self, service_name: &str) -> Result<HeaderMap> {
        let action = self.soap_action(service_name);
        let value = HeaderValue::from_str(&action)
            .with_context(|| format!("Invalid SOAPAction for service '{}'", service_name))?;

        let mut headers = self.headers.clone();
        headers.insert(HeaderName::from_static(SOAP_ACTION), value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_appends_suffix() {
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Shop"),
            "https://sherpa.example.com/Shop/Sherpa.asmx"
        );
    }

    #[test]
    fn test_endpoint_url_strips_wsdl() {
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Shop/Sherpa.asmx?wsdl"),
            "https://sherpa.example.com/Shop/Sherpa.asmx"
        );
    }

    #[test]
    fn test_endpoint_url_strips_query() {
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Shop?wsdl&foo=bar"),
            "https://sherpa.example.com/Shop/Sherpa.asmx"
        );
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Shop?token=abc"),
            "https://sherpa.example.com/Shop/Sherpa.asmx"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_other_asmx() {
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Other.asmx"),
            "https://sherpa.example.com/Other.asmx"
        );
    }

    #[test]
    fn test_endpoint_url_trailing_slash() {
        assert_eq!(
            endpoint_url("https://sherpa.example.com/Shop/"),
            "https://sherpa.example.com/Shop/Sherpa.asmx"
        );
    }

    #[test]
    fn test_soap_action_is_quoted() {
        let config = ClientConfig::default();
        assert_eq!(
            config.soap_action("GetStatus"),
            "\"http://sherpa.sherpaan.nl/GetStatus\""
        );
    }

    #[test]
    fn test_custom_action_namespace() {
        let config = ClientConfig::new().with_action_namespace("urn:test/");
        assert_eq!(config.soap_action("Ping"), "\"urn:test/Ping\"");
    }

    #[test]
    fn test_request_headers() {
        let config = ClientConfig::default();
        let headers = config.request_headers("GetStatus").unwrap();

        assert_eq!(headers[CONTENT_TYPE], SOAP_CONTENT_TYPE);
        assert_eq!(headers[ACCEPT], "*/*");
        assert_eq!(headers[ACCEPT_ENCODING], "gzip, deflate, br");
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(
            headers["SOAPAction"],
            "\"http://sherpa.sherpaan.nl/GetStatus\""
        );
    }

    #[test]
    fn test_request_headers_do_not_leak_between_calls() {
        let config = ClientConfig::default();
        let first = config.request_headers("GetStatus").unwrap();
        let second = config.request_headers("GetStock").unwrap();

        assert_eq!(first["SOAPAction"], "\"http://sherpa.sherpaan.nl/GetStatus\"");
        assert_eq!(second["SOAPAction"], "\"http://sherpa.sherpaan.nl/GetStock\"");
        assert!(config.headers().get(SOAP_ACTION).is_none());
    }

    #[test]
    fn test_request_headers_rejects_invalid_service_name() {
        let config = ClientConfig::default();
        assert!(config.request_headers("Get\nStatus").is_err());
    }

    #[test]
    fn test_with_header_overrides_default() {
        let config = ClientConfig::new()
            .with_header(USER_AGENT, HeaderValue::from_static("custom-agent"));
        assert_eq!(config.headers()[USER_AGENT], "custom-agent");
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::new().with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(ClientConfig::default().timeout, DEFAULT_TIMEOUT);
    }
}
