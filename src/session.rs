//! Per-backend sessions and the transports underneath them.
//!
//! A [`SessionManager`] owns one authenticated [`Session`] per registry entry.
//! Sessions talk to their backend through a [`BackendTransport`], which a
//! [`Connector`] opens; production code uses [`HttpConnector`], tests plug in
//! in-memory connectors.

pub mod manager;
pub mod transport;

pub use manager::{Credentials, Session, SessionManager, LOGIN_ROUTE};
pub use transport::{BackendTransport, Connector, HttpConnector, HttpTransport};

#[cfg(test)]
pub use transport::tests::{MockConnector, RecordedRequest};
