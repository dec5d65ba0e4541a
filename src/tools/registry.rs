//! Tool Registry: the catalog of known capabilities, materialised lazily.
//!
//! The registry is populated once at startup from the static descriptor list
//! in [`super::catalog`] and may be extended at runtime with freshly
//! generated tools via [`ToolRegistry::register`].
//!
//! Instantiation happens at most once per entry: each entry owns a
//! `OnceCell`, so concurrent lookups of the same name serialise on that entry
//! only. A failed construction leaves the cell empty, so a later lookup (for
//! example after the environment has been corrected) tries again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use super::base_tool::ToolHandle;
use super::credentials::CredentialSource;
use crate::utilities::errors::ToolError;

/// Bare constructor for a tool (the "class reference").
pub type ToolConstructor = Arc<dyn Fn() -> Result<ToolHandle, ToolError> + Send + Sync>;

/// Parameterised factory for tools that need connection parameters.
///
/// Receives the registry's credential source so it can read e.g. a database
/// URI at construction time.
pub type ToolFactory =
    Arc<dyn Fn(&dyn CredentialSource) -> Result<ToolHandle, ToolError> + Send + Sync>;

/// One installable capability.
pub struct ToolEntry {
    constructor: ToolConstructor,
    factory: Option<ToolFactory>,
    instance: OnceCell<ToolHandle>,
    required_keys: Vec<String>,
}

impl ToolEntry {
    /// Entry built by its bare constructor, gated by `required_keys`.
    pub fn new(constructor: ToolConstructor, required_keys: Vec<String>) -> Self {
        Self {
            constructor,
            factory: None,
            instance: OnceCell::new(),
            required_keys,
        }
    }

    /// Use `factory` instead of the bare constructor.
    pub fn with_factory(mut self, factory: ToolFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Entry with no required credentials and an already-built instance.
    pub fn prebuilt(constructor: ToolConstructor, instance: ToolHandle) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(instance);
        Self {
            constructor,
            factory: None,
            instance: cell,
            required_keys: Vec::new(),
        }
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// The cached instance, if one has been materialised.
    pub fn instance(&self) -> Option<&ToolHandle> {
        self.instance.get()
    }

    fn build(&self, credentials: &dyn CredentialSource) -> Result<ToolHandle, ToolError> {
        match &self.factory {
            Some(factory) => factory(credentials),
            None => (self.constructor)(),
        }
    }
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("factory", &self.factory.is_some())
            .field("instance", &self.instance.get().map(|t| t.name().to_string()))
            .field("required_keys", &self.required_keys)
            .finish()
    }
}

#[derive(Default)]
struct Catalog {
    /// Declaration order.
    order: Vec<String>,
    entries: HashMap<String, Arc<ToolEntry>>,
}

/// Process-scoped registry of capabilities.
pub struct ToolRegistry {
    catalog: RwLock<Catalog>,
    credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            credentials,
        }
    }

    /// Create a registry populated from the built-in catalog.
    pub fn with_catalog(credentials: Arc<dyn CredentialSource>) -> Self {
        let registry = Self::new(credentials);
        super::catalog::populate(&registry);
        registry
    }

    pub fn credentials(&self) -> &dyn CredentialSource {
        self.credentials.as_ref()
    }

    /// Insert or overwrite an entry.
    pub fn insert(&self, name: impl Into<String>, entry: ToolEntry) {
        let name = name.into();
        let mut catalog = self.catalog.write();
        if !catalog.entries.contains_key(&name) {
            catalog.order.push(name.clone());
        }
        catalog.entries.insert(name, Arc::new(entry));
    }

    /// Register a freshly generated tool under `name`.
    ///
    /// The entry needs no credentials and carries `instance` pre-built, so
    /// lookups return it immediately.
    pub fn register(&self, name: impl Into<String>, constructor: ToolConstructor, instance: ToolHandle) {
        let name = name.into();
        log::info!("New tool '{}' added to available tools.", name);
        self.insert(name, ToolEntry::prebuilt(constructor, instance));
    }

    fn entry(&self, name: &str) -> Option<Arc<ToolEntry>> {
        self.catalog.read().entries.get(name).cloned()
    }

    /// Get or create the instance for `name`.
    ///
    /// Returns `None` ("unavailable") for unknown names, missing credentials,
    /// unreadable credentials, and construction failures. Only successes are
    /// cached.
    pub fn get_instance(&self, name: &str) -> Option<ToolHandle> {
        let entry = match self.entry(name) {
            Some(entry) => entry,
            None => {
                log::debug!("Unknown tool '{}'", name);
                return None;
            }
        };

        if let Some(instance) = entry.instance() {
            return Some(instance.clone());
        }

        match self.credentials.all_set(&entry.required_keys) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "Skipping tool '{}' due to missing environment variables",
                    name
                );
                return None;
            }
            Err(e) => {
                log::error!("Skipping tool '{}': {}", name, e);
                return None;
            }
        }

        match entry
            .instance
            .get_or_try_init(|| entry.build(self.credentials.as_ref()))
        {
            Ok(instance) => Some(instance.clone()),
            Err(e) => {
                log::warn!("Failed to instantiate tool '{}': {}", name, e);
                None
            }
        }
    }

    /// Whether `name` is known and its credentials are satisfied.
    pub fn is_available(&self, name: &str) -> Result<bool, ToolError> {
        match self.entry(name) {
            Some(entry) => self.credentials.all_set(&entry.required_keys),
            None => Ok(false),
        }
    }

    /// Names whose credentials are satisfied, in declaration order.
    pub fn available_names(&self) -> Result<Vec<String>, ToolError> {
        let snapshot: Vec<(String, Arc<ToolEntry>)> = {
            let catalog = self.catalog.read();
            catalog
                .order
                .iter()
                .filter_map(|n| catalog.entries.get(n).map(|e| (n.clone(), e.clone())))
                .collect()
        };
        let mut names = Vec::new();
        for (name, entry) in snapshot {
            if self.credentials.all_set(&entry.required_keys)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Materialise every name in a comma-separated list, skipping the
    /// unavailable ones.
    pub fn resolve_list(&self, names: &str) -> Vec<ToolHandle> {
        names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .filter_map(|n| self.get_instance(n))
            .collect()
    }

    /// All known names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.catalog.read().order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalog.read().entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.catalog.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base_tool::BaseTool;
    use crate::tools::credentials::StaticCredentials;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Dummy(&'static str);

    #[async_trait]
    impl BaseTool for Dummy {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "dummy"
        }

        async fn run(&self, _input: &str) -> Result<String, ToolError> {
            Ok(String::new())
        }
    }

    fn dummy_constructor(name: &'static str) -> ToolConstructor {
        Arc::new(move || Ok(Arc::new(Dummy(name)) as ToolHandle))
    }

    fn setup() -> (Arc<StaticCredentials>, ToolRegistry) {
        let creds = Arc::new(StaticCredentials::new());
        let registry = ToolRegistry::new(creds.clone());
        (creds, registry)
    }

    #[test]
    fn test_missing_credential_is_unavailable_then_self_heals() {
        let (creds, registry) = setup();
        registry.insert(
            "EXASearchTool",
            ToolEntry::new(dummy_constructor("EXASearchTool"), vec!["EXA_API_KEY".into()]),
        );

        assert!(registry.get_instance("EXASearchTool").is_none());

        creds.set("EXA_API_KEY", "key");
        let first = registry.get_instance("EXASearchTool").unwrap();
        let second = registry.get_instance("EXASearchTool").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_construction_not_cached() {
        let (_creds, registry) = setup();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let constructor: ToolConstructor = Arc::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ToolError::Construction {
                    name: "Flaky".into(),
                    message: "first try fails".into(),
                })
            } else {
                Ok(Arc::new(Dummy("Flaky")) as ToolHandle)
            }
        });
        registry.insert("Flaky", ToolEntry::new(constructor, vec![]));

        assert!(registry.get_instance("Flaky").is_none());
        assert!(registry.get_instance("Flaky").is_some());
        assert!(registry.get_instance("Flaky").is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_preferred_over_constructor() {
        let (creds, registry) = setup();
        let constructor: ToolConstructor = Arc::new(|| {
            Err(ToolError::Construction {
                name: "NL2SQLTool".into(),
                message: "constructor should not be used".into(),
            })
        });
        let factory: ToolFactory =
            Arc::new(|c: &dyn CredentialSource| -> Result<ToolHandle, ToolError> {
                match c.get("DATABASE_URI")? {
                    Some(_) => Ok(Arc::new(Dummy("NL2SQLTool")) as ToolHandle),
                    None => Err(ToolError::Construction {
                        name: "NL2SQLTool".into(),
                        message: "no uri".into(),
                    }),
                }
            });
        registry.insert(
            "NL2SQLTool",
            ToolEntry::new(constructor, vec![]).with_factory(factory),
        );

        assert!(registry.get_instance("NL2SQLTool").is_none());
        creds.set("DATABASE_URI", "postgres://localhost/db");
        assert_eq!(registry.get_instance("NL2SQLTool").unwrap().name(), "NL2SQLTool");
    }

    #[test]
    fn test_register_overwrites_and_is_immediately_available() {
        let (_creds, registry) = setup();
        registry.insert(
            "Weather",
            ToolEntry::new(dummy_constructor("Weather"), vec!["WEATHER_KEY".into()]),
        );
        assert!(!registry.is_available("Weather").unwrap());

        let instance: ToolHandle = Arc::new(Dummy("Weather"));
        registry.register("Weather", dummy_constructor("Weather"), instance.clone());

        assert!(registry.is_available("Weather").unwrap());
        assert!(Arc::ptr_eq(&registry.get_instance("Weather").unwrap(), &instance));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_tool() {
        let (_creds, registry) = setup();
        assert!(registry.get_instance("Nope").is_none());
        assert!(!registry.is_available("Nope").unwrap());
    }

    #[test]
    fn test_available_names_keep_declaration_order() {
        let (creds, registry) = setup();
        registry.insert("B", ToolEntry::new(dummy_constructor("B"), vec![]));
        registry.insert("A", ToolEntry::new(dummy_constructor("A"), vec!["KEY_A".into()]));
        registry.insert("C", ToolEntry::new(dummy_constructor("C"), vec![]));

        assert_eq!(registry.available_names().unwrap(), vec!["B", "C"]);
        creds.set("KEY_A", "x");
        assert_eq!(registry.available_names().unwrap(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_resolve_list_skips_unavailable() {
        let (_creds, registry) = setup();
        registry.insert("A", ToolEntry::new(dummy_constructor("A"), vec![]));
        registry.insert("B", ToolEntry::new(dummy_constructor("B"), vec!["KEY_B".into()]));

        let tools = registry.resolve_list("A, B,,Unknown");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "A");
    }

    #[test]
    fn test_concurrent_lookups_construct_once() {
        let (_creds, registry) = setup();
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let constructor: ToolConstructor = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(Dummy("Slow")) as ToolHandle)
        });
        registry.insert("Slow", ToolEntry::new(constructor, vec![]));
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = registry.clone();
                std::thread::spawn(move || r.get_instance("Slow").is_some())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }
}
