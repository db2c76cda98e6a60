//! Inversion-of-control container building named object graphs from declarative definitions.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use beanery::*;
//! // Regular types
//! #[derive(Default)]
//! struct Repository {
//!     url: String,
//! }
//!
//! #[derive(Default)]
//! struct Service {
//!     retries: u32,
//!     repository: Option<Arc<Repository>>,
//! }
//!
//! // Describe how to build and wire them
//! bean_class!(static REPOSITORY: Repository => class {
//!     class
//!         .constructor(Repository::default)
//!         .property("url", |r: &mut Repository, url: String| r.url = url)
//! });
//!
//! bean_class!(static SERVICE: Service => class {
//!     class
//!         .constructor(Service::default)
//!         .property("retries", |s: &mut Service, n: u32| s.retries = n)
//!         .property("repository", |s: &mut Service, r: Arc<Repository>| s.repository = Some(r))
//! });
//!
//! # fn main() -> Result<(), BeanError> {
//! // Register definitions and resolve beans by name
//! let factory = BeanFactory::new();
//! factory.register_bean_definition(
//!     "repository",
//!     BeanDefinition::of(&REPOSITORY).with_property("url", Value::literal("postgres://localhost")),
//! )?;
//! factory.register_bean_definition(
//!     "service",
//!     BeanDefinition::of(&SERVICE)
//!         .with_property("retries", Value::literal(3u32))
//!         .with_property("repository", Value::reference("repository")),
//! )?;
//!
//! let service: Arc<Service> = factory.get_bean_of("service")?;
//! let repository: Arc<Repository> = factory.get_bean_of("repository")?;
//! assert_eq!(service.retries, 3);
//! assert!(Arc::ptr_eq(service.repository.as_ref().unwrap(), &repository));
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Types do not expose themselves through reflection. Instead each managed type is described
//! once by a [BeanClass], listing its constructors and a table of named setters.
//!
//! * A [BeanDefinition] names a class and carries constructor arguments and property values.
//!   Each [Value] is either a literal or a [BeanReference] to another bean, resolved only when
//!   the bean is created.
//! * The [ConstructorResolver] picks a constructor by arity, preferring one whose parameter
//!   types accept the arguments. An [InstantiationStrategy] invokes it to obtain a raw bean.
//! * The [PropertyInjector] sets each property in declaration order, requesting referenced
//!   beans from the factory, which builds them first if needed.
//! * The [BeanFactory] keeps fully wired beans in a [SingletonCache]: each name is built once
//!   and later requests share the same instance.

#[doc(hidden)]
pub mod helpers;

mod class;
mod config;
mod definition;
mod error;
mod factory;
mod inject;
mod resolve;
mod singleton;
mod strategy;
mod value;

pub use class::{BeanClass, BeanClassBuilder, Constructor, Setter};
pub use config::{ContainerConfig, DuplicatePropertyPolicy, StrategyKind};
pub use definition::{BeanDefinition, BeanDefinitionRegistry, DefinitionRegistry};
pub use error::{BeanError, CreationFailure, InstantiationError, PropertyInjectionError};
pub use factory::BeanFactory;
pub use inject::{BeanProvider, PropertyInjector};
pub use resolve::{ArgumentMismatch, ConstructorFn, ConstructorResolver, Param};
pub use singleton::SingletonCache;
pub use strategy::{
    strategy_for, Enhancer, InstantiationStrategy, SimpleInstantiationStrategy,
    SubclassingInstantiationStrategy,
};
pub use value::{instance, BeanReference, FromInstance, Instance, PropertyValue, PropertyValues, RawBean, Value};

#[cfg(test)]
mod tests;
