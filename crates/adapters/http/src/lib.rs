//! adapter-http - reqwest based transport
//!
//! Implements [`bodyback_ports::HttpTransport`] against the real backend:
//! - fixed client-side timeout (timeouts count as connectivity failures)
//! - bearer header and JSON body from [`bodyback_ports::ApiRequest`]
//! - every HTTP status is returned as a response, never as an error

pub mod error;
pub mod transport;

pub use transport::ReqwestTransport;
