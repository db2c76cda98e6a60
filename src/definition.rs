//! Bean definitions and the registry holding them

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::class::BeanClass;
use crate::error::BeanError;
use crate::value::{PropertyValue, PropertyValues, Value};

/// Recipe for a bean: its class, constructor arguments and property values
#[derive(Debug, Clone)]
pub struct BeanDefinition {
    bean_class: Arc<BeanClass>,
    constructor_args: Vec<Value>,
    property_values: PropertyValues,
}

impl BeanDefinition {
    pub fn new(bean_class: Arc<BeanClass>) -> Self {
        Self {
            bean_class,
            constructor_args: Vec::new(),
            property_values: PropertyValues::new(),
        }
    }

    /// Definition sharing an existing class, typically one declared with [bean_class](crate::bean_class)
    pub fn of(bean_class: &Arc<BeanClass>) -> Self {
        Self::new(Arc::clone(bean_class))
    }

    pub fn with_constructor_arg(mut self, value: impl Into<Value>) -> Self {
        self.constructor_args.push(value.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.property_values.add(PropertyValue::new(name, value));
        self
    }

    pub fn with_property_values(mut self, property_values: PropertyValues) -> Self {
        self.property_values = property_values;
        self
    }

    pub fn bean_class(&self) -> &BeanClass {
        &self.bean_class
    }

    pub fn constructor_args(&self) -> &[Value] {
        &self.constructor_args
    }

    pub fn property_values(&self) -> &PropertyValues {
        &self.property_values
    }
}

/// Lookup and registration of bean definitions by name
pub trait BeanDefinitionRegistry {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<(), BeanError>;

    fn get_bean_definition(&self, name: &str) -> Option<Arc<BeanDefinition>>;

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.get_bean_definition(name).is_some()
    }

    /// Names of all definitions, in registration order
    fn bean_definition_names(&self) -> Vec<String>;

    fn bean_definition_count(&self) -> usize {
        self.bean_definition_names().len()
    }
}

#[derive(Default)]
struct Definitions {
    by_name: HashMap<String, Arc<BeanDefinition>>,
    names: Vec<String>,
}

/// In-memory definition registry
pub struct DefinitionRegistry {
    definitions: RwLock<Definitions>,
    allow_overriding: bool,
}

impl DefinitionRegistry {
    pub fn new(allow_overriding: bool) -> Self {
        Self {
            definitions: RwLock::default(),
            allow_overriding,
        }
    }

    pub fn allows_overriding(&self) -> bool {
        self.allow_overriding
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BeanDefinitionRegistry for DefinitionRegistry {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> Result<(), BeanError> {
        let mut definitions = self.definitions.write();
        let definition = Arc::new(definition);
        if let Some(existing) = definitions.by_name.get_mut(name) {
            if !self.allow_overriding {
                return Err(BeanError::DefinitionOverride(name.to_string()));
            }
            warn!(
                "Overriding bean definition for '{}': replacing {} with {}",
                name,
                existing.bean_class().name(),
                definition.bean_class().name()
            );
            *existing = definition;
            return Ok(());
        }

        debug!("Registered bean definition '{}' ({})", name, definition.bean_class().name());
        definitions.by_name.insert(name.to_string(), definition);
        definitions.names.push(name.to_string());
        Ok(())
    }

    fn get_bean_definition(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.definitions.read().by_name.get(name).cloned()
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.read().by_name.contains_key(name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.definitions.read().names.clone()
    }

    fn bean_definition_count(&self) -> usize {
        self.definitions.read().names.len()
    }
}
