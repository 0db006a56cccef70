//! SOAP client with built-in retry logic and response unwrapping.

use anyhow::{Result, anyhow};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;

use super::error::HttpStatusError;
use super::transport::{ReqwestTransport, Transport};
use crate::auth::Auth;
use crate::config::{ClientConfig, endpoint_url};
use crate::observer::{CallObserver, LogObserver};
use crate::response::{ExtractionRules, ResponseUnwrapper, raw_response};

/// Client for the Sherpa SOAP service.
///
/// Every call builds its own header map, so one client can serve concurrent
/// calls for different services.
#[derive(Clone)]
pub struct SoapClient {
    auth: Arc<dyn Auth>,
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    unwrapper: ResponseUnwrapper,
    observer: Arc<dyn CallObserver>,
}

impl SoapClient {
    /// Creates a client that talks HTTP through reqwest and logs via [`LogObserver`].
    pub fn new(auth: impl Auth + 'static, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::build()?;
        Ok(Self::with_transport(auth, transport, config))
    }

    /// Creates a client on top of a custom transport.
    pub fn with_transport(
        auth: impl Auth + 'static,
        transport: impl Transport + 'static,
        config: ClientConfig,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            transport: Arc::new(transport),
            config,
            unwrapper: ResponseUnwrapper::default(),
            observer: Arc::new(LogObserver),
        }
    }

    /// Replaces the observer that receives call notifications.
    pub fn with_observer(mut self, observer: impl CallObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Replaces the rules used to unwrap responses.
    pub fn with_rules(mut self, rules: ExtractionRules) -> Self {
        self.unwrapper = ResponseUnwrapper::new(rules);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The URL every call is posted to.
    pub fn endpoint_url(&self) -> String {
        endpoint_url(self.auth.base_url())
    }

    /// Posts a complete SOAP envelope for `service_name` and returns the unwrapped response.
    ///
    /// Any failure to get a 2xx answer is retried according to the configured
    /// [`super::RetryPolicy`]; the last error is returned once attempts run out.
    /// Responses that cannot be unwrapped come back as `{"raw_response": <xml>}`.
    #[tracing::instrument(skip(self, soap_envelope))]
    pub async fn call_soap_service(&self, service_name: &str, soap_envelope: &str) -> Result<Value> {
        let url = self.endpoint_url();

        let result = match self.config.request_headers(service_name) {
            Ok(headers) => {
                self.with_retry(service_name, || {
                    self.call_once(service_name, &url, &headers, soap_envelope)
                })
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.observer.on_call_failed(service_name, &url, e);
        }
        result
    }

    /// Single send-and-validate attempt without retry.
    async fn call_once(
        &self,
        service_name: &str,
        url: &str,
        headers: &HeaderMap,
        soap_envelope: &str,
    ) -> Result<Value> {
        let action = self.config.soap_action(service_name);
        self.observer
            .on_request(service_name, url, &action, soap_envelope);

        let response = self
            .transport
            .post(
                url,
                headers.clone(),
                soap_envelope.to_string(),
                self.config.timeout,
            )
            .await?;

        self.observer.on_response(service_name, response.status);

        if !response.status.is_success() {
            self.observer.on_http_error(
                service_name,
                response.status,
                &response.headers,
                &response.body,
            );
            return Err(HttpStatusError::new(response.status, service_name, &response.body).into());
        }

        Ok(self.unwrap_response(service_name, &response.body))
    }

    fn unwrap_response(&self, service_name: &str, xml: &str) -> Value {
        match self.unwrapper.extract(xml) {
            Ok(extraction) => {
                self.observer.on_extracted(service_name, &extraction);
                extraction.into_value()
            }
            Err(e) => {
                self.observer.on_unwrap_fallback(service_name, &e, xml);
                raw_response(xml)
            }
        }
    }

    /// Executes an async operation with retry logic. Every error is retried.
    async fn with_retry<F, Fut, T>(&self, service_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let policy = self.config.retry;
        let max_attempts = policy.attempts();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt < max_attempts {
                        let delay = policy.delay_for(attempt);
                        self.observer
                            .on_attempt_failed(service_name, attempt, max_attempts, &e, delay);
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow!("{}: failed after {} attempts", service_name, max_attempts)
        }))
    }
}
