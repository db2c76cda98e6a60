//! Errors raised while registering definitions and creating beans
//!
//! Only [BeanError] crosses the public boundary of the factory. The other kinds describe
//! what went wrong inside a single creation and always travel wrapped in
//! [BeanError::BeanCreation], which names the bean being built.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the bean factory
#[derive(Error, Debug)]
pub enum BeanError {
    #[error("No bean named '{0}' is defined")]
    NoSuchBean(String),
    #[error("Error creating bean with name '{name}': {source}")]
    BeanCreation {
        name: String,
        #[source]
        source: CreationFailure,
    },
    #[error("Bean named '{name}' is expected to be of type '{required}'")]
    BeanNotOfRequiredType { name: String, required: &'static str },
    #[error("Cannot register bean definition for '{0}': a definition is already bound and overriding is disabled")]
    DefinitionOverride(String),
    #[error("Could not register object under bean name '{0}': there is already an object bound")]
    SingletonAlreadyRegistered(String),
}

impl BeanError {
    pub(crate) fn creation(name: &str, source: impl Into<CreationFailure>) -> Self {
        BeanError::BeanCreation {
            name: name.to_string(),
            source: source.into(),
        }
    }

    /// Name of the bean whose creation failed, if this is a creation error
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            BeanError::BeanCreation { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Cause of a failed bean creation
#[derive(Error, Debug)]
pub enum CreationFailure {
    #[error("Instantiation of bean failed: {0}")]
    Instantiation(#[from] InstantiationError),
    #[error("Error setting property values: {0}")]
    PropertyInjection(#[from] PropertyInjectionError),
    #[error("Requested bean is currently in creation: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
    #[error("Bean creation nested deeper than {depth} levels")]
    DepthExceeded { depth: usize },
}

/// Failure to produce a raw instance
#[derive(Error, Debug)]
pub enum InstantiationError {
    #[error("no constructor of '{class}' takes {arity} argument(s)")]
    NoMatchingConstructor { class: &'static str, arity: usize },
    #[error("'{class}' declares no no-argument constructor")]
    NoDefaultConstructor { class: &'static str },
    #[error("argument {index} of the '{class}' constructor is not a '{expected}'")]
    ArgumentMismatch {
        class: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[error("constructor argument {index} references bean '{reference}' which could not be resolved")]
    ArgumentResolution {
        index: usize,
        reference: String,
        #[source]
        source: Box<BeanError>,
    },
    #[error("constructor of '{class}' failed: {source}")]
    ConstructorFailed {
        class: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Failure to wire a property into a raw instance
#[derive(Error, Debug)]
pub enum PropertyInjectionError {
    #[error("'{class}' has no property '{property}'")]
    NoSuchProperty {
        class: &'static str,
        property: String,
    },
    #[error("value for property '{property}' of '{class}' is not a '{expected}'")]
    TypeMismatch {
        class: &'static str,
        property: String,
        expected: &'static str,
    },
    #[error("raw instance is not a '{class}'")]
    InstanceMismatch { class: &'static str },
    #[error("property '{property}' references bean '{reference}' which could not be resolved")]
    ReferenceFailed {
        property: String,
        reference: String,
        #[source]
        source: Box<BeanError>,
    },
    #[error("property '{property}' is declared more than once")]
    DuplicateProperty { property: String },
}
