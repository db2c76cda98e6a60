use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Foo {
    x: i32,
    label: String,
    b: Option<Arc<Bar>>,
}

#[derive(Default)]
struct Bar {
    name: String,
}

impl Bar {
    fn named(name: String) -> Self {
        Self { name }
    }
}

bean_class!(static FOO: Foo => class {
    class
        .constructor(Foo::default)
        .constructor(|x: i32| Foo { x, ..Foo::default() })
        .constructor(|label: String| Foo { label, ..Foo::default() })
        .constructor(|x: i32, b: Arc<Bar>| Foo { x, b: Some(b), ..Foo::default() })
        .property("x", |foo: &mut Foo, x: i32| foo.x = x)
        .property("label", |foo: &mut Foo, label: String| foo.label = label)
        .property("b", |foo: &mut Foo, b: Arc<Bar>| foo.b = Some(b))
});

bean_class!(static BAR: Bar => class {
    class
        .constructor(Bar::default)
        .constructor(Bar::named)
        .property("name", |bar: &mut Bar, name: String| bar.name = name)
});

fn factory_with(definitions: Vec<(&str, BeanDefinition)>) -> BeanFactory {
    init_logging();
    let factory = BeanFactory::new();
    for (name, definition) in definitions {
        factory.register_bean_definition(name, definition).unwrap();
    }
    factory
}

fn creation_failure(error: &BeanError) -> &CreationFailure {
    match error {
        BeanError::BeanCreation { source, .. } => source,
        other => panic!("expected a creation error, got {other}"),
    }
}

#[test]
fn resolve_singleton() -> Result<(), BeanError> {
    let factory = factory_with(vec![("bar", BeanDefinition::of(&BAR))]);

    let b1 = factory.get_bean("bar")?;
    let b2 = factory.get_bean("bar")?;
    assert!(Arc::ptr_eq(&b1, &b2));
    assert_eq!(factory.singleton_names(), vec!["bar".to_string()]);
    Ok(())
}

#[test]
fn wire_literals_and_references() -> Result<(), BeanError> {
    let factory = factory_with(vec![
        (
            "beanA",
            BeanDefinition::of(&FOO)
                .with_property("x", Value::literal(5))
                .with_property("b", Value::reference("beanB")),
        ),
        ("beanB", BeanDefinition::of(&BAR)),
    ]);

    let a: Arc<Foo> = factory.get_bean_of("beanA")?;
    assert_eq!(a.x, 5);
    assert!(factory.contains_singleton("beanB"));

    let b: Arc<Bar> = factory.get_bean_of("beanB")?;
    assert!(Arc::ptr_eq(a.b.as_ref().unwrap(), &b));
    Ok(())
}

#[test]
fn default_constructor_gives_field_defaults() -> Result<(), BeanError> {
    let factory = factory_with(vec![("foo", BeanDefinition::of(&FOO))]);

    let foo: Arc<Foo> = factory.get_bean_of("foo")?;
    assert_eq!(foo.x, 0);
    assert_eq!(foo.label, "");
    assert!(foo.b.is_none());
    Ok(())
}

#[test]
fn string_literals_accept_str() -> Result<(), BeanError> {
    let factory = factory_with(vec![(
        "bar",
        BeanDefinition::of(&BAR).with_property("name", Value::literal("static")),
    )]);

    let bar: Arc<Bar> = factory.get_bean_of("bar")?;
    assert_eq!(bar.name, "static");
    Ok(())
}

#[test]
fn no_constructor_for_arity() {
    let factory = factory_with(vec![("bar", BeanDefinition::of(&BAR))]);

    let err = factory
        .get_bean_with_args("bar", vec![instance(1), instance(2)])
        .unwrap_err();
    assert_eq!(err.bean_name(), Some("bar"));
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::Instantiation(InstantiationError::NoMatchingConstructor { arity: 2, .. })
    ));
    assert!(!factory.contains_singleton("bar"));
}

#[test]
fn explicit_args_select_constructor() -> Result<(), BeanError> {
    let factory = factory_with(vec![
        ("byNumber", BeanDefinition::of(&FOO)),
        ("byLabel", BeanDefinition::of(&FOO)),
        ("bar", BeanDefinition::of(&BAR)),
        ("pair", BeanDefinition::of(&FOO)),
    ]);

    let by_number = factory
        .get_bean_with_args("byNumber", vec![instance(7)])?
        .downcast::<Foo>()
        .unwrap();
    assert_eq!(by_number.x, 7);

    // Same arity: the constructor taking a String is the one accepting the argument
    let by_label: Arc<Foo> = factory
        .get_bean_with_args("byLabel", vec![instance(String::from("hello"))])?
        .downcast()
        .unwrap();
    assert_eq!(by_label.label, "hello");
    assert_eq!(by_label.x, 0);

    let bar: Arc<Bar> = factory.get_bean_of("bar")?;
    let pair: Arc<Foo> = factory
        .get_bean_with_args("pair", vec![instance(3), bar.clone() as Instance])?
        .downcast()
        .unwrap();
    assert_eq!(pair.x, 3);
    assert!(Arc::ptr_eq(pair.b.as_ref().unwrap(), &bar));

    // Cached: later arguments are ignored
    let again: Arc<Foo> = factory.get_bean_with_args("byNumber", vec![instance(99)])?.downcast().unwrap();
    assert!(Arc::ptr_eq(&again, &by_number));
    Ok(())
}

#[test]
fn arity_match_without_compatible_types_fails() {
    let factory = factory_with(vec![("foo", BeanDefinition::of(&FOO))]);

    let err = factory.get_bean_with_args("foo", vec![instance(1.5f64)]).unwrap_err();
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::Instantiation(InstantiationError::ArgumentMismatch { index: 0, .. })
    ));
    assert!(!factory.contains_singleton("foo"));
}

#[test]
fn constructor_injection_from_definition() -> Result<(), BeanError> {
    let factory = factory_with(vec![
        (
            "foo",
            BeanDefinition::of(&FOO)
                .with_constructor_arg(Value::literal(11))
                .with_constructor_arg(Value::reference("bar")),
        ),
        (
            "bar",
            BeanDefinition::of(&BAR).with_constructor_arg(Value::literal(String::from("from ctor"))),
        ),
    ]);

    let foo: Arc<Foo> = factory.get_bean_of("foo")?;
    let bar: Arc<Bar> = factory.get_bean_of("bar")?;
    assert_eq!(foo.x, 11);
    assert_eq!(bar.name, "from ctor");
    assert!(Arc::ptr_eq(foo.b.as_ref().unwrap(), &bar));
    Ok(())
}

#[test]
fn failed_injection_leaks_no_state() {
    let factory = factory_with(vec![
        (
            "A",
            BeanDefinition::of(&FOO)
                .with_property("x", Value::literal(1))
                .with_property("b", Value::reference("C")),
        ),
        ("unused", BeanDefinition::of(&BAR)),
    ]);

    let err = factory.get_bean("A").unwrap_err();
    match creation_failure(&err) {
        CreationFailure::PropertyInjection(PropertyInjectionError::ReferenceFailed {
            property,
            reference,
            source,
        }) => {
            assert_eq!(property, "b");
            assert_eq!(reference, "C");
            assert!(matches!(**source, BeanError::NoSuchBean(ref name) if name == "C"));
        }
        other => panic!("unexpected failure: {other}"),
    }
    assert!(!factory.contains_singleton("A"));
    assert!(matches!(factory.get_bean("C"), Err(BeanError::NoSuchBean(_))));
    assert!(factory.singleton_names().is_empty());
}

#[test]
fn unknown_bean() {
    let factory = factory_with(vec![]);
    assert!(matches!(factory.get_bean("missing"), Err(BeanError::NoSuchBean(name)) if name == "missing"));
    assert!(!factory.contains_bean("missing"));
}

#[test]
fn circular_references_fail_fast() {
    let factory = factory_with(vec![
        ("a", BeanDefinition::of(&FOO).with_property("b", Value::reference("b"))),
        ("b", BeanDefinition::of(&FOO).with_property("b", Value::reference("a"))),
    ]);

    let err = factory.get_bean("a").unwrap_err();
    assert_eq!(err.bean_name(), Some("a"));

    // Walk down to the innermost failure
    let mut failure = creation_failure(&err);
    while let CreationFailure::PropertyInjection(PropertyInjectionError::ReferenceFailed { source, .. }) = failure {
        failure = creation_failure(source);
    }
    match failure {
        CreationFailure::CircularReference { chain } => assert_eq!(chain, &["a", "b", "a"]),
        other => panic!("unexpected failure: {other}"),
    }
    assert!(factory.singleton_names().is_empty());
}

#[test]
fn self_reference_is_circular() {
    let factory = factory_with(vec![(
        "bar",
        BeanDefinition::of(&BAR).with_constructor_arg(Value::reference("bar")),
    )]);

    let err = factory.get_bean("bar").unwrap_err();
    match creation_failure(&err) {
        CreationFailure::Instantiation(InstantiationError::ArgumentResolution { index, source, .. }) => {
            assert_eq!(*index, 0);
            assert!(matches!(
                creation_failure(source),
                CreationFailure::CircularReference { chain } if chain == &["bar", "bar"]
            ));
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn creation_depth_is_bounded() {
    init_logging();
    let factory = BeanFactory::with_config(ContainerConfig::default().with_max_creation_depth(2));
    factory
        .register_bean_definition("a", BeanDefinition::of(&FOO).with_property("b", Value::reference("b")))
        .unwrap();
    factory
        .register_bean_definition("b", BeanDefinition::of(&FOO).with_property("b", Value::reference("c")))
        .unwrap();
    factory.register_bean_definition("c", BeanDefinition::of(&BAR)).unwrap();

    let err = factory.get_bean("a").unwrap_err();
    let mut failure = creation_failure(&err);
    while let CreationFailure::PropertyInjection(PropertyInjectionError::ReferenceFailed { source, .. }) = failure {
        failure = creation_failure(source);
    }
    assert!(matches!(failure, CreationFailure::DepthExceeded { depth: 2 }));

    // "c" alone fits in the limit
    assert!(factory.get_bean("c").is_ok());
}

#[test]
fn property_errors() {
    let factory = factory_with(vec![
        ("unknown", BeanDefinition::of(&BAR).with_property("missing", Value::literal(1))),
        ("mistyped", BeanDefinition::of(&FOO).with_property("x", Value::literal("five"))),
    ]);

    let err = factory.get_bean("unknown").unwrap_err();
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::PropertyInjection(PropertyInjectionError::NoSuchProperty { property, .. }) if property == "missing"
    ));

    let err = factory.get_bean("mistyped").unwrap_err();
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::PropertyInjection(PropertyInjectionError::TypeMismatch { expected: "i32", .. })
    ));
    assert!(factory.singleton_names().is_empty());
}

#[test]
fn duplicate_properties_last_wins() -> Result<(), BeanError> {
    let factory = factory_with(vec![(
        "foo",
        BeanDefinition::of(&FOO)
            .with_property("x", Value::literal(1))
            .with_property("x", Value::literal(2)),
    )]);

    let foo: Arc<Foo> = factory.get_bean_of("foo")?;
    assert_eq!(foo.x, 2);
    Ok(())
}

#[test]
fn duplicate_properties_rejected() {
    init_logging();
    let config = ContainerConfig::default().with_duplicate_properties(DuplicatePropertyPolicy::Reject);
    let factory = BeanFactory::with_config(config);
    factory
        .register_bean_definition(
            "foo",
            BeanDefinition::of(&FOO)
                .with_property("x", Value::literal(1))
                .with_property("x", Value::literal(2)),
        )
        .unwrap();

    let err = factory.get_bean("foo").unwrap_err();
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::PropertyInjection(PropertyInjectionError::DuplicateProperty { property }) if property == "x"
    ));
}

#[test]
fn definition_overriding() {
    init_logging();
    let factory = BeanFactory::new();
    factory.register_bean_definition("bean", BeanDefinition::of(&BAR)).unwrap();
    factory.register_bean_definition("bean", BeanDefinition::of(&FOO)).unwrap();
    assert_eq!(factory.bean_definition_count(), 1);
    assert!(factory.get_bean_definition("bean").unwrap().bean_class().is::<Foo>());

    let strict = BeanFactory::with_config(ContainerConfig::default().with_definition_overriding(false));
    strict.register_bean_definition("bean", BeanDefinition::of(&BAR)).unwrap();
    assert!(matches!(
        strict.register_bean_definition("bean", BeanDefinition::of(&FOO)),
        Err(BeanError::DefinitionOverride(name)) if name == "bean"
    ));
}

#[test]
fn typed_lookup_checks_type() {
    let factory = factory_with(vec![("bar", BeanDefinition::of(&BAR))]);
    assert!(matches!(
        factory.get_bean_of::<Foo>("bar"),
        Err(BeanError::BeanNotOfRequiredType { .. })
    ));
    // The bean was still created and cached
    assert!(factory.get_bean_of::<Bar>("bar").is_ok());
}

#[test]
fn manual_singletons() -> Result<(), BeanError> {
    let factory = factory_with(vec![(
        "foo",
        BeanDefinition::of(&FOO).with_property("b", Value::reference("external")),
    )]);

    let external = Arc::new(Bar::named("external".to_string()));
    factory.register_singleton("external", external.clone())?;
    assert!(matches!(
        factory.register_singleton("external", instance(Bar::default())),
        Err(BeanError::SingletonAlreadyRegistered(_))
    ));

    let foo: Arc<Foo> = factory.get_bean_of("foo")?;
    assert!(Arc::ptr_eq(foo.b.as_ref().unwrap(), &external));
    Ok(())
}

#[test]
fn pre_instantiate_and_destroy() -> Result<(), BeanError> {
    let mut factory = factory_with(vec![
        ("foo", BeanDefinition::of(&FOO).with_property("b", Value::reference("bar"))),
        ("bar", BeanDefinition::of(&BAR)),
    ]);

    factory.pre_instantiate_singletons()?;
    assert_eq!(factory.singleton_names(), vec!["bar".to_string(), "foo".to_string()]);
    let before = factory.get_bean("bar")?;

    factory.destroy_singletons();
    assert!(factory.singleton_names().is_empty());
    assert!(factory.contains_bean("bar"));

    let after = factory.get_bean("bar")?;
    assert!(!Arc::ptr_eq(&before, &after));
    Ok(())
}

#[test]
fn fallible_constructors() {
    struct Port(u16);

    bean_class!(static PORT: Port => class {
        class.try_constructor(|port: i64| {
            u16::try_from(port)
                .map(Port)
                .map_err(|_| format!("{port} is not a valid port"))
        })
    });

    let factory = factory_with(vec![
        ("ok", BeanDefinition::of(&PORT).with_constructor_arg(Value::literal(8080i64))),
        ("bad", BeanDefinition::of(&PORT).with_constructor_arg(Value::literal(-1i64))),
        ("none", BeanDefinition::of(&PORT)),
    ]);

    assert_eq!(factory.get_bean_of::<Port>("ok").unwrap().0, 8080);

    let err = factory.get_bean("bad").unwrap_err();
    match creation_failure(&err) {
        CreationFailure::Instantiation(InstantiationError::ConstructorFailed { source, .. }) => {
            assert_eq!(source.to_string(), "-1 is not a valid port");
        }
        other => panic!("unexpected failure: {other}"),
    }

    let err = factory.get_bean("none").unwrap_err();
    assert!(matches!(
        creation_failure(&err),
        CreationFailure::Instantiation(InstantiationError::NoDefaultConstructor { .. })
    ));
}

#[test]
fn strategies_are_interchangeable() -> Result<(), BeanError> {
    for kind in [StrategyKind::Simple, StrategyKind::Subclassing] {
        init_logging();
        let factory = BeanFactory::with_config(ContainerConfig::default().with_instantiation_strategy(kind));
        factory.register_bean_definition(
            "foo",
            BeanDefinition::of(&FOO)
                .with_property("x", Value::literal(4))
                .with_property("b", Value::reference("bar")),
        )?;
        factory.register_bean_definition("bar", BeanDefinition::of(&BAR))?;

        let foo: Arc<Foo> = factory.get_bean_of("foo")?;
        assert_eq!(foo.x, 4);
        assert!(Arc::ptr_eq(foo.b.as_ref().unwrap(), &factory.get_bean_of::<Bar>("bar")?));
    }
    Ok(())
}

#[test]
fn enhancers_run_before_injection() -> Result<(), BeanError> {
    let mut factory = factory_with(vec![(
        "foo",
        BeanDefinition::of(&FOO).with_property("x", Value::literal(10)),
    )]);

    let strategy = SubclassingInstantiationStrategy::new().with_enhancer(
        |name: &str, class: &BeanClass, mut bean: RawBean| -> Result<RawBean, InstantiationError> {
            assert!(class.is::<Foo>());
            if let Some(foo) = bean.downcast_mut::<Foo>() {
                foo.label = format!("enhanced {name}");
                foo.x = -1;
            }
            Ok(bean)
        },
    );
    factory.set_instantiation_strategy(Arc::new(strategy));

    let foo: Arc<Foo> = factory.get_bean_of("foo")?;
    assert_eq!(foo.label, "enhanced foo");
    // injection happens after the enhancer
    assert_eq!(foo.x, 10);
    Ok(())
}

#[test]
fn concurrent_requests_build_once() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    bean_class!(static COUNTED: Counted => class {
        class.constructor(|| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Counted
        })
    });

    let factory = factory_with(vec![("counted", BeanDefinition::of(&COUNTED))]);
    let factory = &factory;

    let beans: Vec<Instance> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || factory.get_bean("counted").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    assert!(beans.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn constructor_resolution_policy() {
    let class = &*FOO;
    assert!(ConstructorResolver::resolve(class, &[]).unwrap().is_none());

    let ctor = ConstructorResolver::resolve(class, &[instance(String::from("s"))])
        .unwrap()
        .unwrap();
    assert!(ctor.params()[0].accepts(&instance(String::new())));

    // No compatible constructor: fall back on the first one of matching arity
    let ctor = ConstructorResolver::resolve(class, &[instance(true)]).unwrap().unwrap();
    assert!(ctor.params()[0].accepts(&instance(0i32)));

    assert!(matches!(
        ConstructorResolver::resolve(class, &[instance(1), instance(2), instance(3)]),
        Err(InstantiationError::NoMatchingConstructor { arity: 3, .. })
    ));
}

#[test]
fn custom_literal_types() -> Result<(), BeanError> {
    #[derive(Clone, Debug, PartialEq)]
    struct Endpoint(String);
    literal_value!(Endpoint);

    #[derive(Default)]
    struct Client {
        endpoint: Option<Endpoint>,
    }

    bean_class!(static CLIENT: Client => class {
        class
            .constructor(Client::default)
            .property("endpoint", |c: &mut Client, e: Endpoint| c.endpoint = Some(e))
    });

    let factory = factory_with(vec![(
        "client",
        BeanDefinition::of(&CLIENT).with_property("endpoint", Value::literal(Endpoint("http://api".into()))),
    )]);

    let client: Arc<Client> = factory.get_bean_of("client")?;
    assert_eq!(client.endpoint, Some(Endpoint("http://api".into())));
    Ok(())
}

#[test]
fn config_from_json() {
    let config: ContainerConfig = serde_json::from_str(
        r#"{ "instantiation_strategy": "simple", "duplicate_properties": "reject" }"#,
    )
    .unwrap();
    assert_eq!(config.instantiation_strategy, StrategyKind::Simple);
    assert_eq!(config.duplicate_properties, DuplicatePropertyPolicy::Reject);
    assert!(config.allow_definition_overriding);
    assert_eq!(config.max_creation_depth, 256);

    let config: ContainerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ContainerConfig::default());
}
