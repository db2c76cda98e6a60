//! Values flowing through the container: shared instances, literals and bean references

use std::any::{type_name, Any};
use std::sync::Arc;

/// A live bean or literal, shared by reference
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A freshly constructed bean which has not been wired yet
pub type RawBean = Box<dyn Any + Send + Sync>;

/// Wrap any value into a shared [Instance]
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
    Arc::new(value)
}

/// Named pointer to another bean, resolved lazily at injection time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeanReference {
    bean_name: String,
}

impl BeanReference {
    pub fn new(bean_name: impl Into<String>) -> Self {
        Self {
            bean_name: bean_name.into(),
        }
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }
}

/// Value of a constructor argument or property
#[derive(Clone)]
pub enum Value {
    Literal(Instance),
    Reference(BeanReference),
}

impl Value {
    /// Literal value, shared between every bean built from the same definition.
    ///
    /// Pass the value itself, not an `Arc` of it: `Value::literal(Arc::new(x))` would
    /// store an `Arc<Arc<_>>`. Use [Value::instance] for an existing [Instance].
    pub fn literal<T: Any + Send + Sync>(value: T) -> Self {
        Value::Literal(Arc::new(value))
    }

    pub fn instance(instance: Instance) -> Self {
        Value::Literal(instance)
    }

    pub fn reference(bean_name: impl Into<String>) -> Self {
        Value::Reference(BeanReference::new(bean_name))
    }
}

impl From<BeanReference> for Value {
    fn from(reference: BeanReference) -> Self {
        Value::Reference(reference)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Literal(_) => f.write_str("Literal(..)"),
            Value::Reference(r) => f.debug_tuple("Reference").field(&r.bean_name).finish(),
        }
    }
}

/// A named value to set on a bean
#[derive(Debug, Clone)]
pub struct PropertyValue {
    name: String,
    value: Value,
}

impl PropertyValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Ordered list of property values.
///
/// Entries sharing a name are all kept; the injector decides what a repeated name means.
#[derive(Debug, Clone, Default)]
pub struct PropertyValues(Vec<PropertyValue>);

impl PropertyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: PropertyValue) {
        self.0.push(value);
    }

    /// Last value declared for a property
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().rev().find(|pv| pv.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a PropertyValues {
    type Item = &'a PropertyValue;
    type IntoIter = std::slice::Iter<'a, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<PropertyValue> for PropertyValues {
    fn from_iter<I: IntoIterator<Item = PropertyValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Extract a typed constructor argument or property value from an [Instance]
///
/// `Arc<T>` receives the shared instance itself, which is how beans are wired into each other.
/// Literal types are cloned out of the instance; declare more of them with [literal_value](crate::literal_value).
pub trait FromInstance: Sized + 'static {
    fn from_instance(instance: Instance) -> Option<Self>;

    /// Check compatibility without consuming the instance
    fn accepts(instance: &Instance) -> bool;

    fn expected() -> &'static str {
        type_name::<Self>()
    }
}

impl<T: Any + Send + Sync> FromInstance for Arc<T> {
    fn from_instance(instance: Instance) -> Option<Self> {
        instance.downcast::<T>().ok()
    }

    fn accepts(instance: &Instance) -> bool {
        instance.is::<T>()
    }
}

impl FromInstance for String {
    fn from_instance(instance: Instance) -> Option<Self> {
        instance
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| instance.downcast_ref::<&'static str>().map(|s| s.to_string()))
    }

    fn accepts(instance: &Instance) -> bool {
        instance.is::<String>() || instance.is::<&'static str>()
    }
}

crate::literal_value!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
