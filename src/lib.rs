//! Minimal client for the Sherpa SOAP web service.
//!
//! A [`SoapClient`] posts a caller-built envelope to the endpoint derived from
//! an [`Auth`] base URL, retries failed attempts with exponential backoff and
//! unwraps the XML answer into a [`serde_json::Value`].

pub mod auth;
pub mod config;
pub mod http;
pub mod observer;
pub mod response;

pub use auth::{Auth, StaticAuth};
pub use config::{ClientConfig, endpoint_url};
pub use http::{HttpStatusError, RetryPolicy, SoapClient, Transport, TransportResponse};
pub use observer::{CallObserver, LogObserver, NoopObserver};
pub use response::{Extraction, ExtractionRules, ResponseUnwrapper, UnwrapError};
