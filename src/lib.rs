//! Fetch the body of an HTTP resource as a string, retrying failed attempts
//! with exponential backoff, subject to cancellation.

pub mod http;

pub use http::{
    DEFAULT_MAX_TRIES, FetchError, HttpResponse, HttpTransport, ReqwestTransport,
    get_string_with_retries,
};
