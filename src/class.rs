//! Runtime description of a bean type: its constructors and its settable properties.
//!
//! A [BeanClass] replaces reflection: each managed type registers, once, the list of
//! constructors it can be built with and a table of named setters used for property injection.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::error::{InstantiationError, PropertyInjectionError};
use crate::resolve::{ConstructorFn, Param};
use crate::value::{FromInstance, Instance, RawBean};

type ConstructFn = dyn Fn(Vec<Instance>) -> Result<RawBean, InstantiationError> + Send + Sync;
type SetFn = dyn Fn(&mut (dyn Any + Send + Sync), Instance) -> Result<(), SetterFailure> + Send + Sync;

enum SetterFailure {
    Instance,
    Value,
}

/// One way of building a bean
pub struct Constructor {
    class: &'static str,
    params: Vec<Param>,
    construct: Box<ConstructFn>,
}

impl Constructor {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Check that every argument is compatible with the corresponding parameter
    pub fn accepts(&self, args: &[Instance]) -> bool {
        args.len() == self.params.len()
            && self.params.iter().zip(args).all(|(param, arg)| param.accepts(arg))
    }

    pub fn invoke(&self, args: Vec<Instance>) -> Result<RawBean, InstantiationError> {
        if args.len() != self.arity() {
            return Err(InstantiationError::NoMatchingConstructor {
                class: self.class,
                arity: args.len(),
            });
        }
        (self.construct)(args)
    }
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(self.class).field(&self.params).finish()
    }
}

/// Typed setter for a named property
pub struct Setter {
    expected: &'static str,
    set: Box<SetFn>,
}

impl Setter {
    pub fn expected(&self) -> &'static str {
        self.expected
    }
}

/// Constructors and setter table of a managed type
pub struct BeanClass {
    name: &'static str,
    type_id: TypeId,
    constructors: Vec<Constructor>,
    setters: HashMap<&'static str, Setter>,
}

impl BeanClass {
    pub fn builder<T: Any + Send + Sync>() -> BeanClassBuilder<T> {
        BeanClassBuilder {
            constructors: Vec::new(),
            setters: HashMap::new(),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check whether this class describes the type `T`
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Declared constructors, in declaration order
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// First declared constructor without parameters
    pub fn default_constructor(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|ctor| ctor.arity() == 0)
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.setters.contains_key(property)
    }

    pub fn setter(&self, property: &str) -> Option<&Setter> {
        self.setters.get(property)
    }

    /// Assign a value to a property of a raw bean of this class
    pub fn set_property(
        &self,
        bean: &mut (dyn Any + Send + Sync),
        property: &str,
        value: Instance,
    ) -> Result<(), PropertyInjectionError> {
        let setter = self
            .setter(property)
            .ok_or_else(|| PropertyInjectionError::NoSuchProperty {
                class: self.name,
                property: property.to_string(),
            })?;

        (setter.set)(bean, value).map_err(|failure| match failure {
            SetterFailure::Instance => PropertyInjectionError::InstanceMismatch { class: self.name },
            SetterFailure::Value => PropertyInjectionError::TypeMismatch {
                class: self.name,
                property: property.to_string(),
                expected: setter.expected,
            },
        })
    }
}

impl std::fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut properties: Vec<_> = self.setters.keys().collect();
        properties.sort();
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("constructors", &self.constructors)
            .field("properties", &properties)
            .finish()
    }
}

/// Collect the constructors and setters of a type
pub struct BeanClassBuilder<T> {
    constructors: Vec<Constructor>,
    setters: HashMap<&'static str, Setter>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> BeanClassBuilder<T> {
    /// Add a constructor
    pub fn constructor<Args, F>(mut self, f: F) -> Self
    where
        F: ConstructorFn<T, Args>,
    {
        let class = type_name::<T>();
        self.constructors.push(Constructor {
            class,
            params: <F as ConstructorFn<T, Args>>::params(),
            construct: Box::new(move |args: Vec<Instance>| -> Result<RawBean, InstantiationError> {
                let bean = f.invoke(args).map_err(|m| m.into_error(class))?;
                Ok(Box::new(bean) as RawBean)
            }),
        });
        self
    }

    /// Add a constructor which may fail
    pub fn try_constructor<Args, F, E>(mut self, f: F) -> Self
    where
        F: ConstructorFn<Result<T, E>, Args>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let class = type_name::<T>();
        self.constructors.push(Constructor {
            class,
            params: <F as ConstructorFn<Result<T, E>, Args>>::params(),
            construct: Box::new(move |args: Vec<Instance>| -> Result<RawBean, InstantiationError> {
                let bean = f
                    .invoke(args)
                    .map_err(|m| m.into_error(class))?
                    .map_err(|e| InstantiationError::ConstructorFailed {
                        class,
                        source: e.into(),
                    })?;
                Ok(Box::new(bean) as RawBean)
            }),
        });
        self
    }

    /// Add a settable property.
    ///
    /// Declaring the same property twice keeps the last setter.
    pub fn property<V, F>(mut self, name: &'static str, set: F) -> Self
    where
        V: FromInstance,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter = Setter {
            expected: V::expected(),
            set: Box::new(
                move |bean: &mut (dyn Any + Send + Sync), value: Instance| -> Result<(), SetterFailure> {
                    let bean = bean.downcast_mut::<T>().ok_or(SetterFailure::Instance)?;
                    let value = V::from_instance(value).ok_or(SetterFailure::Value)?;
                    set(bean, value);
                    Ok(())
                },
            ),
        };
        self.setters.insert(name, setter);
        self
    }

    pub fn build(self) -> BeanClass {
        BeanClass {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            constructors: self.constructors,
            setters: self.setters,
        }
    }
}
