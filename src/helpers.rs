//! Declaration macros for bean classes and literal value types

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}

/// Declare that the listed types can be injected as literal values.
///
/// The values are cloned out of the shared [Instance](crate::Instance) on each injection,
/// so the types must implement `Clone + Send + Sync`.
///
/// ```
/// # use beanery::*;
/// #[derive(Clone)]
/// struct Endpoint(String);
///
/// literal_value!(Endpoint);
/// ```
#[macro_export]
macro_rules! literal_value {
    ($($Type:ty),+ $(,)?) => {
        $(
        impl $crate::FromInstance for $Type {
            fn from_instance(instance: $crate::Instance) -> Option<Self> {
                instance.downcast_ref::<$Type>().cloned()
            }

            fn accepts(instance: &$crate::Instance) -> bool {
                instance.is::<$Type>()
            }
        }
        )+
    };
}

/// Declare a lazily built, shared [BeanClass](crate::BeanClass) for a type.
///
/// The class is assembled once, on first use, by the given block which receives a
/// [BeanClassBuilder](crate::BeanClassBuilder) for the type and returns it after
/// adding constructors and properties.
///
/// ```
/// # use std::sync::Arc;
/// # use beanery::*;
/// #[derive(Default)]
/// struct Greeter {
///     greeting: String,
/// }
///
/// bean_class!(static GREETER: Greeter => class {
///     class
///         .constructor(Greeter::default)
///         .property("greeting", |g: &mut Greeter, v: String| g.greeting = v)
/// });
///
/// # fn main() -> Result<(), BeanError> {
/// let factory = BeanFactory::new();
/// factory.register_bean_definition(
///     "greeter",
///     BeanDefinition::of(&GREETER).with_property("greeting", Value::literal("hello")),
/// )?;
/// let greeter: Arc<Greeter> = factory.get_bean_of("greeter")?;
/// assert_eq!(greeter.greeting, "hello");
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! bean_class {
    ($(#[$meta:meta])* $vis:vis static $NAME:ident : $Type:ty => $class:ident $body:block) => {
        $(#[$meta])*
        $vis static $NAME: $crate::helpers::__private::Lazy<::std::sync::Arc<$crate::BeanClass>> =
            $crate::helpers::__private::Lazy::new(|| {
                let $class = $crate::BeanClass::builder::<$Type>();
                let builder: $crate::BeanClassBuilder<$Type> = $body;
                ::std::sync::Arc::new(builder.build())
            });
    };
}
