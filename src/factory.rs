//! The bean factory: entry point resolving beans by name
//!
//! A bean is built on its first request and cached as a singleton for the lifetime of the
//! factory. Creation runs in two phases: the raw instance is constructed first, then its
//! properties are injected, which resolves referenced beans recursively through
//! [BeanFactory::get_bean]. Only fully wired beans reach the cache.
//!
//! Creations are serialized by a container-wide reentrant lock: concurrent callers never build
//! the same bean twice, while nested creations on the same thread remain possible. A stack of
//! the beans currently being created detects circular references, which fail instead of
//! recursing forever.

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, info, instrument, trace};

use crate::config::ContainerConfig;
use crate::definition::{BeanDefinition, BeanDefinitionRegistry, DefinitionRegistry};
use crate::error::{BeanError, CreationFailure, InstantiationError};
use crate::inject::{BeanProvider, PropertyInjector};
use crate::resolve::ConstructorResolver;
use crate::singleton::SingletonCache;
use crate::strategy::{strategy_for, InstantiationStrategy};
use crate::value::{Instance, RawBean, Value};

/// Pops the current bean from the creation stack when its creation ends, even on panic
struct InCreation<'a> {
    stack: &'a RefCell<Vec<String>>,
}

impl Drop for InCreation<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

/// Inversion-of-control container creating, wiring and caching beans
pub struct BeanFactory {
    config: ContainerConfig,
    registry: DefinitionRegistry,
    singletons: SingletonCache,
    strategy: Arc<dyn InstantiationStrategy>,
    injector: PropertyInjector,
    in_creation: ReentrantMutex<RefCell<Vec<String>>>,
}

impl BeanFactory {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        let registry = DefinitionRegistry::new(config.allow_definition_overriding);
        Self::with_registry(registry, config)
    }

    /// Create a factory over an already populated registry
    pub fn with_registry(registry: DefinitionRegistry, config: ContainerConfig) -> Self {
        Self {
            strategy: strategy_for(config.instantiation_strategy),
            injector: PropertyInjector::new(config.duplicate_properties),
            singletons: SingletonCache::new(),
            in_creation: ReentrantMutex::new(RefCell::new(Vec::new())),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn instantiation_strategy(&self) -> &Arc<dyn InstantiationStrategy> {
        &self.strategy
    }

    pub fn set_instantiation_strategy(&mut self, strategy: Arc<dyn InstantiationStrategy>) {
        self.strategy = strategy;
    }

    /// Obtain the bean registered under a name, creating it on first request
    pub fn get_bean(&self, name: &str) -> Result<Instance, BeanError> {
        self.do_get_bean(name, None)
    }

    /// Obtain a bean, using explicit constructor arguments if it has to be created.
    ///
    /// The arguments replace those of the definition. They are ignored if the bean already exists.
    pub fn get_bean_with_args(&self, name: &str, args: Vec<Instance>) -> Result<Instance, BeanError> {
        self.do_get_bean(name, Some(args))
    }

    /// Obtain a bean and check its type
    pub fn get_bean_of<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, BeanError> {
        self.get_bean(name)?
            .downcast::<T>()
            .map_err(|_| BeanError::BeanNotOfRequiredType {
                name: name.to_string(),
                required: type_name::<T>(),
            })
    }

    /// Check if a bean is available, either built or defined
    pub fn contains_bean(&self, name: &str) -> bool {
        self.singletons.contains_singleton(name) || self.registry.contains_bean_definition(name)
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.contains_singleton(name)
    }

    pub fn singleton_names(&self) -> Vec<String> {
        self.singletons.singleton_names()
    }

    /// Register an externally built object as a singleton
    pub fn register_singleton(&self, name: &str, instance: Instance) -> Result<(), BeanError> {
        let _creation = self.in_creation.lock();
        if self.singletons.contains_singleton(name) {
            return Err(BeanError::SingletonAlreadyRegistered(name.to_string()));
        }
        self.singletons.add_singleton(name, instance);
        Ok(())
    }

    /// Create every defined bean which does not exist yet, in registration order
    pub fn pre_instantiate_singletons(&self) -> Result<(), BeanError> {
        let names = self.registry.bean_definition_names();
        info!("Pre-instantiating {} singleton(s)", names.len());
        for name in names {
            self.get_bean(&name)?;
        }
        Ok(())
    }

    /// Release every cached bean, ending the lifecycle of the container.
    ///
    /// Definitions are kept: later requests create fresh beans.
    pub fn destroy_singletons(&mut self) {
        info!("Destroying {} singleton(s)", self.singletons.singleton_count());
        self.singletons.clear();
    }

    fn do_get_bean(&self, name: &str, args: Option<Vec<Instance>>) -> Result<Instance, BeanError> {
        if let Some(bean) = self.singletons.get_singleton(name) {
            trace!("Returning cached instance of singleton bean '{}'", name);
            return Ok(bean);
        }

        let in_creation = self.in_creation.lock();
        // Another thread may have finished this bean while we waited for the lock
        if let Some(bean) = self.singletons.get_singleton(name) {
            return Ok(bean);
        }

        let definition = self
            .registry
            .get_bean_definition(name)
            .ok_or_else(|| BeanError::NoSuchBean(name.to_string()))?;

        let _guard = self.before_creation(&in_creation, name)?;
        self.create_bean(name, &definition, args)
    }

    fn before_creation<'a>(&self, stack: &'a RefCell<Vec<String>>, name: &str) -> Result<InCreation<'a>, BeanError> {
        let mut beans = stack.borrow_mut();
        if let Some(start) = beans.iter().position(|bean| bean == name) {
            let mut chain = beans[start..].to_vec();
            chain.push(name.to_string());
            return Err(BeanError::creation(name, CreationFailure::CircularReference { chain }));
        }
        if beans.len() >= self.config.max_creation_depth {
            return Err(BeanError::creation(
                name,
                CreationFailure::DepthExceeded {
                    depth: self.config.max_creation_depth,
                },
            ));
        }
        beans.push(name.to_string());
        Ok(InCreation { stack })
    }

    #[instrument(level = "debug", skip_all, fields(bean = name))]
    fn create_bean(
        &self,
        name: &str,
        definition: &BeanDefinition,
        args: Option<Vec<Instance>>,
    ) -> Result<Instance, BeanError> {
        debug!("Creating instance of bean '{}' ({})", name, definition.bean_class().name());
        let mut bean = self
            .create_bean_instance(name, definition, args)
            .map_err(|e| BeanError::creation(name, e))?;

        self.injector
            .apply_property_values(self, name, &mut *bean, definition)
            .map_err(|e| BeanError::creation(name, e))?;

        let bean: Instance = Arc::from(bean);
        self.singletons.add_singleton(name, bean.clone());
        Ok(bean)
    }

    fn create_bean_instance(
        &self,
        name: &str,
        definition: &BeanDefinition,
        args: Option<Vec<Instance>>,
    ) -> Result<RawBean, InstantiationError> {
        let args = match args {
            Some(args) => args,
            None => self.resolve_constructor_args(definition)?,
        };
        let constructor = ConstructorResolver::resolve(definition.bean_class(), &args)?;
        self.strategy.instantiate(definition, name, constructor, args)
    }

    fn resolve_constructor_args(&self, definition: &BeanDefinition) -> Result<Vec<Instance>, InstantiationError> {
        definition
            .constructor_args()
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Literal(instance) => Ok(instance.clone()),
                Value::Reference(reference) => {
                    self.get_bean(reference.bean_name())
                        .map_err(|source| InstantiationError::ArgumentResolution {
                            index,
                            reference: reference.bean_name().to_string(),
                            source: Box::new(source),
                        })
                }
            })
            .collect()
    }
}

impl Default for BeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanProvider for BeanFactory {
    fn get_bean(&self, name: &str) -> Result<Instance, BeanError> {
        BeanFactory::get_bean(self, name)
    }
}

impl BeanDefinitionRegistry for BeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<(), BeanError> {
        self.registry.register_bean_definition(name, definition)
    }

    fn get_bean_definition(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.registry.get_bean_definition(name)
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.registry.contains_bean_definition(name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.registry.bean_definition_names()
    }

    fn bean_definition_count(&self) -> usize {
        self.registry.bean_definition_count()
    }
}

impl std::fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanFactory")
            .field("config", &self.config)
            .field("definitions", &self.registry.bean_definition_names())
            .field("singletons", &self.singletons.singleton_names())
            .finish()
    }
}
