//! Late controller registration.
//!
//! # Responsibilities
//! - Compute the file a controller would live in
//! - Register a controller the first time it is asked for, if its file exists
//!
//! # Design Decisions
//! - No runtime code loading: controllers are pre-declared in a plugin table
//!   and only become visible once their file is present
//! - A successful load is cached by the registry; a miss is retried next time

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::handler::registry::Controller;

/// Where controller files are expected on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoloadPaths {
    pub document_root: PathBuf,
    pub root: String,
    pub base_dir: String,
    pub extension: String,
}

impl AutoloadPaths {
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            document_root: PathBuf::from(&config.document_root),
            root: config.root.clone(),
            base_dir: config.base_dir.clone(),
            extension: config.controller_extension.clone(),
        }
    }

    /// `<document_root>/<root>/<base_dir>/<namespace path>.<extension>`
    pub fn file_for(&self, controller: &str) -> PathBuf {
        let mut file = self.document_root.clone();
        for part in self
            .root
            .split('/')
            .chain(self.base_dir.split('/'))
            .chain(controller.split('/'))
            .filter(|p| !p.is_empty())
        {
            file.push(part);
        }
        if !self.extension.is_empty() {
            file.set_extension(&self.extension);
        }
        file
    }
}

/// Produces a controller on demand.
pub trait ControllerLoader: Send + Sync {
    /// Attempts to load `controller` from `file`.
    fn load(&self, file: &Path, controller: &str) -> Option<Controller>;
}

type ControllerFactory = Arc<dyn Fn() -> Controller + Send + Sync>;

/// A loader backed by a table of controller factories. An entry is only
/// handed out when its file exists.
#[derive(Clone, Default)]
pub struct PluginTable {
    factories: HashMap<String, ControllerFactory>,
}

impl PluginTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, controller: &str, factory: F) -> Self
    where
        F: Fn() -> Controller + Send + Sync + 'static,
    {
        self.factories
            .insert(controller.to_lowercase(), Arc::new(factory));
        self
    }
}

impl ControllerLoader for PluginTable {
    fn load(&self, file: &Path, controller: &str) -> Option<Controller> {
        if !file.is_file() {
            tracing::debug!(file = %file.display(), controller, "Controller file not found");
            return None;
        }
        let factory = self.factories.get(&controller.to_lowercase())?;
        tracing::debug!(file = %file.display(), controller, "Controller loaded");
        Some(factory())
    }
}
