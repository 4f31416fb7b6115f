//! Handler registry: resolves string references to invocable targets.
//!
//! # Responsibilities
//! - Hold free functions and controllers by name
//! - Answer "is this reference callable?" (raising and non-raising)
//! - Invoke a resolved reference with an argument shape
//!
//! # Design Decisions
//! - Names are case-insensitive; controller names are normalised to
//!   capitalised namespace components (`admin/users` -> `Admin/Users`)
//! - Registry contents are fixed once built; only autoloaded controllers are
//!   added later, through a concurrent map

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::config::RouterConfig;
use crate::error::{HandlerError, RouteError};
use crate::handler::args::Args;
use crate::handler::autoload::{AutoloadPaths, ControllerLoader};
use crate::routing::target::HandlerRef;

/// An invocable target.
pub type HandlerFn = Arc<dyn Fn(&Args) -> Result<Value, HandlerError> + Send + Sync>;

/// Answers whether a handler reference resolves to something callable.
pub trait CallableCheck: Send + Sync {
    fn is_callable(&self, target: &HandlerRef) -> bool;

    /// Raising form, used when validating declarations.
    fn ensure_callable(&self, target: &HandlerRef) -> Result<(), RouteError> {
        if self.is_callable(target) {
            Ok(())
        } else {
            Err(RouteError::InvalidMethod {
                target: target.to_string(),
            })
        }
    }
}

/// Treats every non-empty reference as callable. Used for offline inspection
/// where no handler code is linked in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeCallable;

impl CallableCheck for AssumeCallable {
    fn is_callable(&self, target: &HandlerRef) -> bool {
        !target.is_empty()
    }
}

/// A named group of methods.
#[derive(Clone, Default)]
pub struct Controller {
    methods: HashMap<String, HandlerFn>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Args) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.methods.insert(name.to_lowercase(), Arc::new(f));
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.methods.contains_key(&name.to_lowercase())
    }

    fn get(&self, name: &str) -> Option<HandlerFn> {
        self.methods.get(&name.to_lowercase()).cloned()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("Controller").field("methods", &names).finish()
    }
}

struct Autoload {
    paths: AutoloadPaths,
    loader: Arc<dyn ControllerLoader>,
}

/// Capitalises every namespace component of a controller name.
pub fn normalize_controller(name: &str) -> String {
    name.split('/')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("/")
}

/// Functions and controllers reachable by reference.
#[derive(Default)]
pub struct HandlerRegistry {
    functions: HashMap<String, HandlerFn>,
    controllers: HashMap<String, Arc<Controller>>,
    loaded: DashMap<String, Arc<Controller>>,
    autoload: Option<Autoload>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a free function.
    pub fn function<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Args) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_lowercase(), Arc::new(f));
        self
    }

    /// Registers a controller under its (normalised) name.
    pub fn controller(mut self, name: &str, controller: Controller) -> Self {
        self.controllers
            .insert(normalize_controller(name).to_lowercase(), Arc::new(controller));
        self
    }

    /// Enables late controller registration when the configuration allows it.
    pub fn with_autoload(
        mut self,
        config: &RouterConfig,
        loader: impl ControllerLoader + 'static,
    ) -> Self {
        if config.allow_autoload {
            self.autoload = Some(Autoload {
                paths: AutoloadPaths::from_config(config),
                loader: Arc::new(loader),
            });
        } else {
            tracing::debug!("Autoload disabled, controller loader ignored");
        }
        self
    }

    fn find_controller(&self, name: &str) -> Option<Arc<Controller>> {
        let name = normalize_controller(name);
        let key = name.to_lowercase();
        if let Some(controller) = self.controllers.get(&key) {
            return Some(controller.clone());
        }
        if let Some(controller) = self.loaded.get(&key) {
            return Some(controller.value().clone());
        }

        let autoload = self.autoload.as_ref()?;
        let file = autoload.paths.file_for(&name);
        let controller = autoload.loader.load(&file, &name)?;
        let entry = self
            .loaded
            .entry(key)
            .or_insert_with(|| Arc::new(controller));
        tracing::info!(controller = %name, file = %file.display(), "Controller autoloaded");
        Some(entry.value().clone())
    }

    fn resolve(&self, target: &HandlerRef) -> Option<HandlerFn> {
        match target {
            HandlerRef::Function(name) => self.functions.get(&name.to_lowercase()).cloned(),
            HandlerRef::Method { controller, method } => {
                self.find_controller(controller)?.get(method)
            }
        }
    }

    /// Invokes `target`. Failures raised by the handler are returned as-is.
    pub fn invoke(&self, target: &HandlerRef, args: &Args) -> Result<Value, HandlerError> {
        let handler = self
            .resolve(target)
            .ok_or_else(|| HandlerError::new(format!("method '{}' is not callable", target)))?;
        tracing::trace!(handler = %target, "Invoking handler");
        handler(args)
    }
}

impl CallableCheck for HandlerRegistry {
    fn is_callable(&self, target: &HandlerRef) -> bool {
        self.resolve(target).is_some()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("functions", &self.functions.len())
            .field("controllers", &self.controllers.len())
            .field("loaded", &self.loaded.len())
            .field("autoload", &self.autoload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::autoload::PluginTable;
    use serde_json::json;

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new()
            .function("ping", |_| Ok(json!("pong")))
            .controller(
                "user",
                Controller::new().method("show", |args| {
                    Ok(json!({ "id": args.param("id") }))
                }),
            )
    }

    #[test]
    fn test_normalize_controller() {
        assert_eq!(normalize_controller("admin/users"), "Admin/Users");
        assert_eq!(normalize_controller("Home"), "Home");
    }

    #[test]
    fn test_callable_check_is_case_insensitive() {
        let reg = registry();
        assert!(reg.is_callable(&HandlerRef::parse("PING")));
        assert!(reg.is_callable(&HandlerRef::parse("User#show")));
        assert!(reg.is_callable(&HandlerRef::parse("user#SHOW")));
        assert!(!reg.is_callable(&HandlerRef::parse("User#delete")));
        assert!(!reg.is_callable(&HandlerRef::parse("missing")));
    }

    #[test]
    fn test_ensure_callable_raises() {
        let err = registry()
            .ensure_callable(&HandlerRef::parse("nope#x"))
            .unwrap_err();
        assert_eq!(err, RouteError::InvalidMethod { target: "nope#x".into() });
    }

    #[test]
    fn test_invoke_passes_args() {
        let params = [("id", "42")].into_iter().collect();
        let out = registry()
            .invoke(&HandlerRef::parse("User#show"), &Args::Params(params))
            .unwrap();
        assert_eq!(out, json!({ "id": "42" }));
        assert!(registry()
            .invoke(&HandlerRef::parse("missing"), &Args::None)
            .is_err());
    }

    #[test]
    fn test_autoload_registers_once_file_exists() {
        let dir = std::env::temp_dir().join("dispatch_router_registry_autoload");
        let config = RouterConfig {
            allow_autoload: true,
            document_root: dir.display().to_string(),
            base_dir: "controllers".into(),
            controller_extension: "rs".into(),
            ..RouterConfig::default()
        };
        let table = PluginTable::new().register("Blog", || {
            Controller::new().method("index", |_| Ok(json!("blog")))
        });
        let reg = HandlerRegistry::new().with_autoload(&config, table);

        let target = HandlerRef::parse("blog#index");
        let file = dir.join("controllers").join("Blog.rs");
        std::fs::remove_file(&file).unwrap_or_default();
        assert!(!reg.is_callable(&target));

        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "").unwrap();
        assert!(reg.is_callable(&target));
        assert_eq!(reg.invoke(&target, &Args::None).unwrap(), json!("blog"));

        // Cached after the first load.
        std::fs::remove_file(&file).unwrap_or_default();
        assert!(reg.is_callable(&target));
    }

    #[test]
    fn test_assume_callable() {
        assert!(AssumeCallable.is_callable(&HandlerRef::parse("anything#goes")));
        assert!(!AssumeCallable.is_callable(&HandlerRef::parse("")));
    }
}
