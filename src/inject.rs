use std::any::Any;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::DuplicatePropertyPolicy;
use crate::definition::BeanDefinition;
use crate::error::{BeanError, PropertyInjectionError};
use crate::value::{Instance, Value};

/// Source of beans for resolving references
pub trait BeanProvider {
    fn get_bean(&self, name: &str) -> Result<Instance, BeanError>;
}

/// Set the property values of a definition on a raw bean
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyInjector {
    duplicates: DuplicatePropertyPolicy,
}

impl PropertyInjector {
    pub fn new(duplicates: DuplicatePropertyPolicy) -> Self {
        Self { duplicates }
    }

    /// Inject every property value, in declaration order.
    ///
    /// Referenced beans are obtained from the provider before being assigned, which creates
    /// them first if needed.
    pub fn apply_property_values(
        &self,
        provider: &dyn BeanProvider,
        name: &str,
        bean: &mut (dyn Any + Send + Sync),
        definition: &BeanDefinition,
    ) -> Result<(), PropertyInjectionError> {
        let class = definition.bean_class();
        let mut seen = HashSet::new();

        for property in definition.property_values() {
            if !seen.insert(property.name()) {
                match self.duplicates {
                    DuplicatePropertyPolicy::Reject => {
                        return Err(PropertyInjectionError::DuplicateProperty {
                            property: property.name().to_string(),
                        })
                    }
                    DuplicatePropertyPolicy::LastWins => warn!(
                        "Property '{}' of bean '{}' is set more than once, the last value wins",
                        property.name(),
                        name
                    ),
                }
            }

            let value = match property.value() {
                Value::Literal(instance) => instance.clone(),
                Value::Reference(reference) => provider.get_bean(reference.bean_name()).map_err(|source| {
                    PropertyInjectionError::ReferenceFailed {
                        property: property.name().to_string(),
                        reference: reference.bean_name().to_string(),
                        source: Box::new(source),
                    }
                })?,
            };

            class.set_property(bean, property.name(), value)?;
            debug!("Injected property '{}' into bean '{}'", property.name(), name);
        }
        Ok(())
    }
}
