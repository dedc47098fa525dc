//! Authentication of one session per backend.

use crate::error::{CrossOldError, Result};
use crate::registry::{Backend, BackendRegistry};
use crate::session::transport::{BackendTransport, Connector};
use futures::future::try_join_all;
use serde_json::{json, Value};
use std::fmt;

/// Login route, relative to a backend endpoint.
pub const LOGIN_ROUTE: &str = "login/authenticate";

/// Username/password pair shared by every backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn login_payload(&self) -> Value {
        json!({
            "username": self.username,
            "password": self.password,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Long-lived connection state for one backend.
pub struct Session {
    backend: Backend,
    transport: Box<dyn BackendTransport>,
}

impl Session {
    pub fn new(backend: Backend, transport: Box<dyn BackendTransport>) -> Self {
        Self { backend, transport }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn post(&self, route: &str, body: &Value) -> Result<Value> {
        self.transport.post_json(route, body).await
    }

    /// Log in; only an explicit `"authenticated": true` counts as success.
    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let id = self.backend.id();
        let reply = self
            .post(LOGIN_ROUTE, &credentials.login_payload())
            .await
            .map_err(|e| CrossOldError::authentication(id, e.to_string()))?;

        match reply.get("authenticated") {
            Some(Value::Bool(true)) => {
                log::debug!("{id}: authenticated as {}", credentials.username());
                Ok(())
            }
            Some(other) => Err(CrossOldError::authentication(
                id,
                format!("authenticated was {other}"),
            )),
            None => Err(CrossOldError::authentication(
                id,
                "response did not confirm authentication",
            )),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend.id())
            .finish_non_exhaustive()
    }
}

/// Owner of every backend session for the lifetime of the program.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Vec<Session>,
}

impl SessionManager {
    /// Open and authenticate a session for every backend in the registry.
    ///
    /// Logins run concurrently. The call succeeds only once every backend has
    /// confirmed; the first failure aborts the whole operation and drops the
    /// logins still in flight.
    pub async fn authenticate_all(
        registry: &BackendRegistry,
        credentials: &Credentials,
        connector: &dyn Connector,
    ) -> Result<Self> {
        let sessions = registry
            .iter()
            .map(|backend| {
                let transport = connector.connect(backend).map_err(|e| {
                    CrossOldError::authentication(backend.id(), e.to_string())
                })?;
                Ok(Session::new(backend.clone(), transport))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("logging in to {} backends", sessions.len());
        try_join_all(
            sessions
                .iter()
                .map(|session| session.authenticate(credentials)),
        )
        .await?;

        Ok(Self { sessions })
    }

    /// Sessions in registry order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|session| session.backend.id() == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
