use std::{sync::Arc, time::SystemTime};

use beanery::*;

// Define regular types

#[derive(Default)]
struct Logger {
    prefix: String,
}

impl Logger {
    fn log(&self, content: &str) {
        println!("{}{}", self.prefix, content);
    }
}

struct DateLogger {
    logger: Arc<Logger>,
    unit: String,
}

impl DateLogger {
    fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            unit: "s".to_string(),
        }
    }

    fn log_date(&self) {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        self.logger
            .log(&format!("{}{} since epoch", now.as_secs(), self.unit));
    }
}

// Describe how the container builds and wires them

bean_class!(static LOGGER: Logger => class {
    class
        .constructor(Logger::default)
        .property("prefix", |l: &mut Logger, prefix: String| l.prefix = prefix)
});

bean_class!(static DATE_LOGGER: DateLogger => class {
    class
        .constructor(DateLogger::new)
        .property("unit", |d: &mut DateLogger, unit: String| d.unit = unit)
});

fn main() -> Result<(), BeanError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let factory = BeanFactory::new();
    factory.register_bean_definition(
        "logger",
        BeanDefinition::of(&LOGGER).with_property("prefix", Value::literal("[demo] ")),
    )?;
    factory.register_bean_definition(
        "dateLogger",
        BeanDefinition::of(&DATE_LOGGER)
            .with_constructor_arg(Value::reference("logger"))
            .with_property("unit", Value::literal(" seconds")),
    )?;

    let date_logger: Arc<DateLogger> = factory.get_bean_of("dateLogger")?;
    date_logger.log_date();

    let logger: Arc<Logger> = factory.get_bean_of("logger")?;
    logger.log(&format!("shared logger: {}", Arc::ptr_eq(&logger, &date_logger.logger)));

    Ok(())
}
