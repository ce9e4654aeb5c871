//! AWS SigV4 signing for OpenSearch Dashboards requests.
//!
//! [`RequestSigner`] computes the signature, [`SigningTransport`] wraps any
//! [`HttpSend`](osdsync_core::HttpSend) so that every outgoing request is
//! signed right before it leaves the process.

mod constants;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;

mod transport;
pub use transport::SigningTransport;
