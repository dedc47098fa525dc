//! Backend registry: which OLDs a run talks to and how to reach them.

use crate::config::Config;
use crate::error::{CrossOldError, Result};
use reqwest::Url;
use std::collections::HashSet;

/// Identifier of one backend (the OLD's short code, e.g. `bla`).
pub type BackendId = String;

/// OLDs searched when no configuration names any backends.
pub const DEFAULT_BACKENDS: &[(&str, &str)] = &[
    ("bla", "Blackfoot"),
    ("cac", "Chuj"),
    ("kab", "Kabyle"),
    ("batumi_kartuli", "Batumi Kartuli"),
    ("khm", "Khmer"),
    ("kut", "Ktunaxa"),
    ("rkm", "Marka"),
    ("mor", "Moro"),
    ("nep", "Nepali"),
    ("oka", "Okanagan"),
    ("gla", "Scottish Gaelic"),
];

/// One remotely hosted search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    id: BackendId,
    label: String,
    endpoint: Url,
}

impl Backend {
    /// Create a backend, normalizing the endpoint so relative routes join beneath it.
    pub fn new(id: impl Into<String>, label: impl Into<String>, endpoint: &str) -> Result<Self> {
        let id = id.into();
        let mut endpoint = Url::parse(endpoint).map_err(|e| {
            CrossOldError::config(format!("Invalid URL for backend {id}: {endpoint} ({e})"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(CrossOldError::config(format!(
                "URL for backend {id} cannot be used as a base: {endpoint}"
            )));
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            id,
            label: label.into(),
            endpoint,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve a route such as `forms/search` against this backend's endpoint.
    pub fn route(&self, route: &str) -> Result<Url> {
        self.endpoint.join(route).map_err(|e| {
            CrossOldError::config(format!("Cannot build {route} URL for {}: {e}", self.id))
        })
    }
}

/// Ordered, fixed set of backends for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRegistry {
    backends: Vec<Backend>,
}

impl BackendRegistry {
    /// Build a registry, rejecting empty sets and duplicate ids.
    pub fn new(backends: Vec<Backend>) -> Result<Self> {
        if backends.is_empty() {
            return Err(CrossOldError::config("No backends configured"));
        }
        let mut seen = HashSet::new();
        for backend in &backends {
            if !seen.insert(backend.id()) {
                return Err(CrossOldError::config(format!(
                    "Backend {} is listed more than once",
                    backend.id()
                )));
            }
        }
        Ok(Self { backends })
    }

    /// Registry described by a configuration file, or the built-in OLDs.
    pub fn from_config(config: &Config) -> Result<Self> {
        let template = config.url_template();
        let backends = if config.backends.is_empty() {
            DEFAULT_BACKENDS
                .iter()
                .map(|(id, label)| Backend::new(*id, *label, &expand_template(template, id)))
                .collect::<Result<Vec<_>>>()?
        } else {
            config
                .backends
                .iter()
                .map(|entry| {
                    let url = entry
                        .url
                        .clone()
                        .unwrap_or_else(|| expand_template(template, &entry.id));
                    Backend::new(entry.id.clone(), entry.label.clone(), &url)
                })
                .collect::<Result<Vec<_>>>()?
        };
        Self::new(backends)
    }

    /// Keep only the listed ids, in registry order. Unknown ids are an error.
    pub fn restrict_to(self, ids: &[String]) -> Result<Self> {
        if ids.is_empty() {
            return Ok(self);
        }
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(CrossOldError::config(format!("Unknown backend: {unknown}")));
        }
        let backends = self
            .backends
            .into_iter()
            .filter(|backend| ids.iter().any(|id| id == backend.id()))
            .collect();
        Self::new(backends)
    }

    pub fn get(&self, id: &str) -> Option<&Backend> {
        self.backends.iter().find(|backend| backend.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Backend> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

fn expand_template(template: &str, id: &str) -> String {
    template.replace("{id}", id)
}
