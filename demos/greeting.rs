//! Scoped greeting
//!
//! Registers a message and a greeting built from it, then overrides the
//! message in a child scope. Run with tracing output:
//!
//! ```text
//! RUST_LOG=hierarchy_di=trace cargo run --example greeting --features logging-pretty
//! ```

use hierarchy_di::logging::LoggingBuilder;
use hierarchy_di::{Function, Injector, Provider, Record, Registry, Result, inject, inject_lazy};

fn main() -> Result<()> {
    LoggingBuilder::from_env().pretty().init();

    let registry = Registry::new();
    registry
        .value("message", String::from("Hello World"))
        .bind(
            "greeting",
            Function::new("message", |args| {
                Ok(format!("{}!", args.arg_as::<String>(0)?))
            }),
        )
        .bind(
            "printer",
            Record::new()
                .with_marker("greeting", inject("greeting"))
                .with_marker("audit", inject_lazy("audit")),
        )
        .bind("audit", Function::new("$provider", |args| {
            let provider = args.arg_as::<Provider>(0)?;
            Ok(format!("audited in {}", provider.scope()))
        }));

    let provider = Provider::new(&registry);
    println!("root:  {}", provider.get_as::<String>("greeting")?);

    let universe = registry.create();
    universe.value("message", String::from("Hello Universe"));
    let child = provider.create(&universe)?;
    println!("child: {}", child.get_as::<String>("greeting")?);
    println!("root:  {}", provider.get_as::<String>("greeting")?);

    let printer = child.get_as::<Record>("printer")?;
    println!("printer: {}", printer.get::<String>("greeting")?);
    println!("printer: {}", printer.get::<String>("audit")?);

    let injector = Injector::new(&registry);
    injector
        .registry()
        .value("route/home", "/")
        .value("route/about", "/about");
    for route in injector.provider().get_all_as::<&str>("route")? {
        println!("route: {route}");
    }

    Ok(())
}
