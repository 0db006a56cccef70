//! Call lifecycle notifications.
//!
//! The library never configures a global logger. A [`crate::SoapClient`] reports
//! what happens during a call to the [`CallObserver`] it was built with;
//! [`LogObserver`] forwards those reports to the `log` facade.

use log::{debug, error, info, warn};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::time::Duration;

use crate::http::truncate;
use crate::response::{Extraction, UnwrapError};

const ENVELOPE_LOG_LIMIT: usize = 2000;
const BODY_LOG_LIMIT: usize = 1000;
const RAW_XML_LOG_LIMIT: usize = 500;

/// Receives notifications about a SOAP call. Every method defaults to a no-op.
pub trait CallObserver: Send + Sync {
    fn on_request(&self, _service: &str, _url: &str, _action: &str, _envelope: &str) {}

    fn on_response(&self, _service: &str, _status: StatusCode) {}

    fn on_http_error(&self, _service: &str, _status: StatusCode, _headers: &HeaderMap, _body: &str) {
    }

    fn on_attempt_failed(
        &self,
        _service: &str,
        _attempt: usize,
        _max_attempts: usize,
        _error: &anyhow::Error,
        _delay: Duration,
    ) {
    }

    fn on_call_failed(&self, _service: &str, _url: &str, _error: &anyhow::Error) {}

    fn on_extracted(&self, _service: &str, _extraction: &Extraction) {}

    fn on_unwrap_fallback(&self, _service: &str, _error: &UnwrapError, _raw: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {}

/// Observer that writes to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl CallObserver for LogObserver {
    fn on_request(&self, service: &str, url: &str, action: &str, envelope: &str) {
        info!("Calling {} at {}", service, url);
        info!("SOAPAction header: {}", action.trim_matches('"'));
        if envelope.chars().count() > ENVELOPE_LOG_LIMIT {
            debug!(
                "SOAP envelope (first {} chars): {}",
                ENVELOPE_LOG_LIMIT,
                truncate(envelope, ENVELOPE_LOG_LIMIT)
            );
        } else {
            debug!("SOAP envelope: {}", envelope);
        }
    }

    fn on_response(&self, _service: &str, status: StatusCode) {
        info!("Response status code: {}", status.as_u16());
    }

    fn on_http_error(&self, service: &str, status: StatusCode, headers: &HeaderMap, body: &str) {
        error!("HTTP {} error for {}", status.as_u16(), service);
        error!("Response headers: {:?}", headers);
        error!(
            "Response body (first {} chars): {}",
            BODY_LOG_LIMIT,
            truncate(body, BODY_LOG_LIMIT)
        );
    }

    fn on_attempt_failed(
        &self,
        service: &str,
        attempt: usize,
        max_attempts: usize,
        error: &anyhow::Error,
        delay: Duration,
    ) {
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
            service,
            attempt,
            max_attempts,
            error,
            delay.as_millis()
        );
    }

    fn on_call_failed(&self, service: &str, url: &str, error: &anyhow::Error) {
        error!("Error in call_soap_service for {}: {:#}", service, error);
        error!("URL attempted: {}", url);
    }

    fn on_extracted(&self, service: &str, extraction: &Extraction) {
        match extraction {
            Extraction::Body(_) => debug!("{}: returning entire SOAP body as response", service),
            _ => debug!("{}: found response data: {}", service, extraction.value()),
        }
    }

    fn on_unwrap_fallback(&self, service: &str, error: &UnwrapError, raw: &str) {
        match error {
            UnwrapError::MissingBody { root_keys } => {
                warn!("Could not find SOAP body in response for {}", service);
                warn!("Available keys in parsed XML: {:?}", root_keys);
            }
            UnwrapError::BodyNotMapping(kind) => {
                warn!("SOAP body for {} is {}, not a mapping", service, kind);
            }
            UnwrapError::Malformed(reason) => {
                error!("Failed to parse SOAP response for {}: {}", service, reason);
                error!(
                    "XML response (first {} chars): {}",
                    BODY_LOG_LIMIT,
                    truncate(raw, BODY_LOG_LIMIT)
                );
                return;
            }
        }
        debug!(
            "Raw XML response (first {} chars): {}",
            RAW_XML_LOG_LIMIT,
            truncate(raw, RAW_XML_LOG_LIMIT)
        );
    }
}
