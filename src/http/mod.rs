//! HTTP fetching with retry logic and cancellation support.
//!
//! The core is [`get_string_with_retries`], which drives an injected
//! [`HttpTransport`] through a bounded attempt loop. [`ReqwestTransport`] is
//! the production transport.

mod retry;
mod transport;

pub use retry::{DEFAULT_MAX_TRIES, FetchError, get_string_with_retries};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use transport::MockHttpTransport;
