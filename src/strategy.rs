//! Instantiation strategies: how a raw bean is produced from a definition and a constructor

use std::sync::Arc;

use tracing::trace;

use crate::class::{BeanClass, Constructor};
use crate::config::StrategyKind;
use crate::definition::BeanDefinition;
use crate::error::InstantiationError;
use crate::value::{Instance, RawBean};

/// Create a raw, unwired instance of a bean.
///
/// `constructor` is the one picked by the [ConstructorResolver](crate::ConstructorResolver),
/// or `None` to use the no-argument constructor of the class.
pub trait InstantiationStrategy: Send + Sync {
    fn instantiate(
        &self,
        definition: &BeanDefinition,
        name: &str,
        constructor: Option<&Constructor>,
        args: Vec<Instance>,
    ) -> Result<RawBean, InstantiationError>;
}

/// Build the instance of the strategy selected in the configuration
pub fn strategy_for(kind: StrategyKind) -> Arc<dyn InstantiationStrategy> {
    match kind {
        StrategyKind::Simple => Arc::new(SimpleInstantiationStrategy),
        StrategyKind::Subclassing => Arc::new(SubclassingInstantiationStrategy::new()),
    }
}

fn construct(
    class: &BeanClass,
    constructor: Option<&Constructor>,
    args: Vec<Instance>,
) -> Result<RawBean, InstantiationError> {
    match constructor {
        Some(ctor) => ctor.invoke(args),
        None => class
            .default_constructor()
            .ok_or(InstantiationError::NoDefaultConstructor { class: class.name() })?
            .invoke(Vec::new()),
    }
}

/// Invoke the constructor directly
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleInstantiationStrategy;

impl InstantiationStrategy for SimpleInstantiationStrategy {
    fn instantiate(
        &self,
        definition: &BeanDefinition,
        name: &str,
        constructor: Option<&Constructor>,
        args: Vec<Instance>,
    ) -> Result<RawBean, InstantiationError> {
        trace!("Instantiating '{}' with {} argument(s)", name, args.len());
        construct(definition.bean_class(), constructor, args)
    }
}

/// Post-construction hook run by the [SubclassingInstantiationStrategy].
///
/// An enhancer may adjust the raw bean or replace it, as long as the result is still an
/// instance of the bean class: property injection runs on the returned value.
pub trait Enhancer: Send + Sync {
    fn enhance(&self, name: &str, class: &BeanClass, bean: RawBean) -> Result<RawBean, InstantiationError>;
}

impl<F> Enhancer for F
where
    F: Fn(&str, &BeanClass, RawBean) -> Result<RawBean, InstantiationError> + Send + Sync,
{
    fn enhance(&self, name: &str, class: &BeanClass, bean: RawBean) -> Result<RawBean, InstantiationError> {
        self(name, class, bean)
    }
}

/// Construct the bean, then pass it through a chain of [Enhancer]s.
///
/// Without enhancers this behaves exactly like [SimpleInstantiationStrategy].
#[derive(Default, Clone)]
pub struct SubclassingInstantiationStrategy {
    enhancers: Vec<Arc<dyn Enhancer>>,
}

impl SubclassingInstantiationStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enhancer(mut self, enhancer: impl Enhancer + 'static) -> Self {
        self.enhancers.push(Arc::new(enhancer));
        self
    }
}

impl InstantiationStrategy for SubclassingInstantiationStrategy {
    fn instantiate(
        &self,
        definition: &BeanDefinition,
        name: &str,
        constructor: Option<&Constructor>,
        args: Vec<Instance>,
    ) -> Result<RawBean, InstantiationError> {
        trace!(
            "Instantiating '{}' with {} argument(s) and {} enhancer(s)",
            name,
            args.len(),
            self.enhancers.len()
        );
        let class = definition.bean_class();
        self.enhancers
            .iter()
            .try_fold(construct(class, constructor, args)?, |bean, enhancer| {
                enhancer.enhance(name, class, bean)
            })
    }
}
