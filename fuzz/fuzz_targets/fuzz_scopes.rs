#![no_main]

//! Fuzz target for registry/provider hierarchies
//!
//! Builds random scope trees, registers services with random dependency
//! graphs (cycles included) and resolves names from random scopes.

use arbitrary::Arbitrary;
use hierarchy_di::{DiError, Definition, Function, Provider, Record, Registry, inject, inject_lazy};
use libfuzzer_sys::fuzz_target;

const NAMES: [&str; 8] = [
    "message", "greeting", "route/api", "route/auth", "api/route", "route", "config", "$provider",
];

fn name(index: u8) -> &'static str {
    NAMES[index as usize % NAMES.len()]
}

/// Service shapes to register
#[derive(Debug, Arbitrary)]
enum Shape {
    Value(u8),
    Calls(Vec<u8>),
    Factory(Vec<u8>),
    Record { eager: Vec<u8>, lazy: Vec<u8> },
}

/// Operations on the scope tree
#[derive(Debug, Arbitrary)]
enum ScopeOp {
    Register { scope: u8, name: u8, shape: Shape },
    CreateChild { scope: u8 },
    Get { scope: u8, name: u8 },
    GetAll { scope: u8, name: u8 },
    ReadLazy { scope: u8, name: u8 },
    DropScope,
}

fn definition(shape: Shape) -> (Definition, bool) {
    match shape {
        Shape::Value(value) => (Definition::constant(value), true),
        Shape::Calls(deps) => (
            Function::new("", |args| Ok(args.len()))
                .requires(deps.iter().take(4).map(|d| name(*d)))
                .into(),
            true,
        ),
        Shape::Factory(deps) => (
            Definition::array(deps.iter().take(4).map(|d| name(*d)), |args| {
                Ok(args.len() as u64)
            }),
            false,
        ),
        Shape::Record { eager, lazy } => {
            let mut record = Record::new();
            for (i, dep) in eager.iter().take(3).enumerate() {
                record = record.with_marker(&format!("eager{i}"), inject(name(*dep)));
            }
            for (i, dep) in lazy.iter().take(3).enumerate() {
                record = record.with_marker(&format!("lazy{i}"), inject_lazy(name(*dep)));
            }
            (record.into(), true)
        }
    }
}

fuzz_target!(|ops: Vec<ScopeOp>| {
    let root = Registry::new();
    let mut scopes: Vec<(Registry, Provider)> = vec![(root.clone(), Provider::new(&root))];

    for op in ops.into_iter().take(100) { // Limit operations to prevent OOM
        match op {
            ScopeOp::Register { scope, name: n, shape } => {
                let (registry, _) = &scopes[scope as usize % scopes.len()];
                let (definition, singleton) = definition(shape);
                if singleton {
                    registry.bind(name(n), definition);
                } else {
                    registry.bind_factory(name(n), definition);
                }
            }
            ScopeOp::CreateChild { scope } => {
                if scopes.len() < 10 { // Limit depth
                    let (registry, provider) = &scopes[scope as usize % scopes.len()];
                    let child_registry = registry.create();
                    let child = provider.create(&child_registry);
                    assert!(child.is_ok());
                    if let Ok(child) = child {
                        scopes.push((child_registry, child));
                    }
                }
            }
            ScopeOp::Get { scope, name: n } => {
                let (_, provider) = &scopes[scope as usize % scopes.len()];
                let first = provider.get(name(n));
                let second = provider.get(name(n));
                // Resolution is deterministic for an unchanged tree
                assert_eq!(first.is_ok(), second.is_ok());
                if let (Err(DiError::CircularDependency { .. }), Err(err)) = (&first, &second) {
                    assert!(matches!(err, DiError::CircularDependency { .. }));
                }
            }
            ScopeOp::GetAll { scope, name: n } => {
                let (_, provider) = &scopes[scope as usize % scopes.len()];
                let _ = provider.get_all(name(n));
            }
            ScopeOp::ReadLazy { scope, name: n } => {
                let (_, provider) = &scopes[scope as usize % scopes.len()];
                if let Ok(record) = provider.get_as::<Record>(name(n)) {
                    for field in record.names() {
                        let _ = record.service(field);
                    }
                }
            }
            ScopeOp::DropScope => {
                if scopes.len() > 1 {
                    scopes.pop();
                }
            }
        }
    }
});
