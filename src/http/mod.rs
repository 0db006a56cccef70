//! HTTP dispatch: transport, retry policy and the SOAP client.

mod client;
mod error;
mod retry;
mod transport;

pub use client::SoapClient;
pub use error::{ERROR_BODY_LIMIT, HttpStatusError, truncate};
pub use retry::{BACKOFF_MAX, BACKOFF_MIN, BACKOFF_MULTIPLIER, MAX_ATTEMPTS, RetryPolicy};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
