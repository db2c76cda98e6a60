//! Typed constructors and the constructor selection policy
//!
//! Constructors are declared from ordinary functions or closures. The [ConstructorFn] trait
//! is implemented for all functions with up to 8 arguments whose parameters implement
//! [FromInstance], using a tuple to describe their signature. It records the parameter list
//! for the [ConstructorResolver] and converts the supplied instances back into typed
//! arguments on invocation.

use std::any::type_name;

use crate::class::{BeanClass, Constructor};
use crate::error::InstantiationError;
use crate::value::{FromInstance, Instance};

/// Declared parameter of a constructor
#[derive(Clone, Copy)]
pub struct Param {
    type_name: &'static str,
    accepts: fn(&Instance) -> bool,
}

impl Param {
    pub fn of<T: FromInstance>() -> Self {
        Self {
            type_name: T::expected(),
            accepts: T::accepts,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn accepts(&self, instance: &Instance) -> bool {
        (self.accepts)(instance)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Position and expected type of an argument which could not be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentMismatch {
    pub index: usize,
    pub expected: &'static str,
}

impl ArgumentMismatch {
    pub(crate) fn into_error(self, class: &'static str) -> InstantiationError {
        InstantiationError::ArgumentMismatch {
            class,
            index: self.index,
            expected: self.expected,
        }
    }
}

/// A function usable as a bean constructor.
///
/// `Out` is the produced value and `Args` the tuple of parameter types.
pub trait ConstructorFn<Out, Args>: Send + Sync + 'static {
    fn params() -> Vec<Param>;

    fn invoke(&self, args: Vec<Instance>) -> Result<Out, ArgumentMismatch>;
}

macro_rules! constructor_tuple ({ $($param:ident)* } => {
    impl<Func, Out, $($param,)*> ConstructorFn<Out, ($($param,)*)> for Func
    where
        Func: Fn($($param),*) -> Out + Send + Sync + 'static,
        $($param: FromInstance,)*
    {
        #[inline]
        fn params() -> Vec<Param> {
            vec![$(Param::of::<$param>(),)*]
        }

        #[inline]
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        fn invoke(&self, args: Vec<Instance>) -> Result<Out, ArgumentMismatch> {
            let mut args = args.into_iter();
            let mut index = 0;
            $(
            let $param = args
                .next()
                .and_then(<$param as FromInstance>::from_instance)
                .ok_or(ArgumentMismatch { index, expected: type_name::<$param>() })?;
            index += 1;
            )*
            Ok((self)($($param),*))
        }
    }
});

constructor_tuple! {}
constructor_tuple! { A }
constructor_tuple! { A B }
constructor_tuple! { A B C }
constructor_tuple! { A B C D }
constructor_tuple! { A B C D E }
constructor_tuple! { A B C D E F }
constructor_tuple! { A B C D E F G }
constructor_tuple! { A B C D E F G H }

/// Pick the constructor to use for a list of arguments.
///
/// No arguments means no constructor is pre-selected: the instantiation strategy falls back
/// to the no-argument constructor. Otherwise, among the constructors of matching arity taken
/// in declaration order, the first one accepting every argument wins, or the first one of
/// matching arity if none does.
pub struct ConstructorResolver;

impl ConstructorResolver {
    pub fn resolve<'c>(
        class: &'c BeanClass,
        args: &[Instance],
    ) -> Result<Option<&'c Constructor>, InstantiationError> {
        if args.is_empty() {
            return Ok(None);
        }

        let mut candidates = class
            .constructors()
            .iter()
            .filter(|ctor| ctor.arity() == args.len())
            .peekable();

        let Some(&first) = candidates.peek() else {
            return Err(InstantiationError::NoMatchingConstructor {
                class: class.name(),
                arity: args.len(),
            });
        };

        Ok(Some(
            candidates
                .find(|ctor| ctor.accepts(args))
                .unwrap_or(first),
        ))
    }
}
