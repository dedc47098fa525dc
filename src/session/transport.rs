//! Transport abstraction for talking JSON to one backend.
//!
//! The trait keeps the session and search layers independent of HTTP so that the
//! two-phase protocol can be exercised against scripted in-memory backends.

use crate::error::{CrossOldError, Result};
use crate::registry::Backend;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

/// JSON request/response channel bound to a single backend.
///
/// Implementations keep whatever state the backend needs between calls (the
/// OLD authenticates by cookie, so the HTTP transport carries a cookie jar).
/// Non-success HTTP statuses are not errors at this level: the OLD reports
/// rejected searches in the JSON body and callers inspect it.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// POST `body` to `route` (relative to the backend endpoint) and decode the JSON reply.
    async fn post_json(&self, route: &str, body: &Value) -> Result<Value>;
}

/// Opens a transport for a backend.
pub trait Connector: Send + Sync {
    fn connect(&self, backend: &Backend) -> Result<Box<dyn BackendTransport>>;
}

/// Connector producing cookie-carrying `reqwest` clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, backend: &Backend) -> Result<Box<dyn BackendTransport>> {
        Ok(Box::new(HttpTransport::new(backend.clone())?))
    }
}

/// HTTP transport with its own cookie store, one per backend.
#[derive(Debug)]
pub struct HttpTransport {
    backend: Backend,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(backend: Backend) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(concat!("crossold/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CrossOldError::transport(backend.id(), e.to_string()))?;

        Ok(Self { backend, client })
    }
}

#[async_trait]
impl BackendTransport for HttpTransport {
    async fn post_json(&self, route: &str, body: &Value) -> Result<Value> {
        let url = self.backend.route(route)?;
        let id = self.backend.id();

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| CrossOldError::transport(id, e.to_string()))?;

        let status = response.status();
        log::debug!("{id}: POST {route} -> {status}");

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                CrossOldError::unexpected_response(id, format!("HTTP {status}: body is not JSON"))
            } else {
                CrossOldError::transport(id, e.to_string())
            }
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// One request observed by [`MockConnector`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRequest {
        pub backend: String,
        pub route: String,
        pub body: Value,
    }

    type Handler = dyn Fn(&str, &str, &Value) -> Result<Value> + Send + Sync;

    /// Scripted connector for unit tests
    ///
    /// Every transport it opens answers through the shared handler, which receives
    /// the backend id, the route and the request body. All requests are recorded
    /// in arrival order.
    #[derive(Clone)]
    pub struct MockConnector {
        handler: Arc<Handler>,
        log: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl MockConnector {
        pub fn new(
            handler: impl Fn(&str, &str, &Value) -> Result<Value> + Send + Sync + 'static,
        ) -> Self {
            Self {
                handler: Arc::new(handler),
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.log.lock().clone()
        }

        pub fn requests_to(&self, route: &str) -> Vec<RecordedRequest> {
            self.log
                .lock()
                .iter()
                .filter(|request| request.route == route)
                .cloned()
                .collect()
        }

        pub fn clear(&self) {
            self.log.lock().clear();
        }
    }

    impl Connector for MockConnector {
        fn connect(&self, backend: &Backend) -> Result<Box<dyn BackendTransport>> {
            Ok(Box::new(MockTransport {
                backend: backend.id().to_string(),
                handler: Arc::clone(&self.handler),
                log: Arc::clone(&self.log),
            }))
        }
    }

    struct MockTransport {
        backend: String,
        handler: Arc<Handler>,
        log: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    #[async_trait]
    impl BackendTransport for MockTransport {
        async fn post_json(&self, route: &str, body: &Value) -> Result<Value> {
            self.log.lock().push(RecordedRequest {
                backend: self.backend.clone(),
                route: route.to_string(),
                body: body.clone(),
            });
            (self.handler)(&self.backend, route, body)
        }
    }

    #[test]
    fn test_http_connector_builds_transport() {
        let backend = Backend::new("t", "Test", "http://127.0.0.1:9/").unwrap();
        assert!(HttpConnector.connect(&backend).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let backend = Backend::new("t", "Test", "http://127.0.0.1:9/").unwrap();
        let transport = HttpTransport::new(backend).unwrap();

        let result = transport
            .post_json("login/authenticate", &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(CrossOldError::Transport { .. })));
    }

    #[test]
    fn test_mock_connector_records_requests() {
        let connector =
            MockConnector::new(|backend, _, _| Ok(serde_json::json!({ "from": backend })));
        let backend = Backend::new("a", "A", "http://a.test/").unwrap();
        let transport = connector.connect(&backend).unwrap();

        let body = serde_json::json!([1]);
        let reply = tokio_test::block_on(transport.post_json("forms/search", &body)).unwrap();
        assert_eq!(reply, serde_json::json!({ "from": "a" }));

        let requests = connector.requests_to("forms/search");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].backend, "a");
        assert_eq!(requests[0].body, serde_json::json!([1]));
    }
}
