use errform::error::{
    BacktraceSpec, Data, ErrorFormSpec, FieldMap, FormError, FormRef, Registry, Trace,
};
use std::{collections::HashSet, thread};

const NTHREADS: usize = 16;
const NITER: usize = 50;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_reregister_replaces_constructor() {
    init_log();
    let registry = Registry::new();
    let first = registry.register(ErrorFormSpec::new("svc/quota").with_backtrace(BacktraceSpec::No));
    registry.register(ErrorFormSpec::new("svc/quota").with_constructor(
        |form: &FormRef, fields: FieldMap| {
            let fields = FieldMap::new(format!("[v2] {}", fields.message));
            FormError::new(form.clone(), fields, Trace::empty())
        },
    ));

    let wire = first.to_wire().unwrap();
    let rehydrated = FormRef::from_wire(&wire, &registry).unwrap();
    assert!(!rehydrated.same_descriptor(&first));
    assert_eq!(rehydrated.raise(FieldMap::new("over")).message(), "[v2] over");

    let refreshed = first.refresh(&registry).unwrap();
    assert!(refreshed.same_descriptor(&rehydrated));
}

#[test]
fn test_concurrent_raises_are_all_recorded() {
    init_log();
    let registry = Registry::new();
    let form = registry.register(ErrorFormSpec::new("svc/busy").with_backtrace(BacktraceSpec::No));

    thread::scope(|s| {
        for i in 0..NTHREADS {
            let registry = registry.clone();
            s.spawn(move || {
                let form = registry.lookup("svc/busy").unwrap();
                for j in 0..NITER {
                    let mut extra = Data::new();
                    extra.insert("id".into(), format!("{i}-{j}").into());
                    form.raise_with_site(FieldMap::new("busy"), extra);
                }
            });
        }
    });

    let sites = form.descriptor().raised_sites();
    assert_eq!(sites.len(), NTHREADS * NITER);
    let ids = sites
        .iter()
        .map(|site| site.extra["id"].as_str().unwrap().to_owned())
        .collect::<HashSet<_>>();
    assert_eq!(ids.len(), NTHREADS * NITER);
}

#[test]
fn test_concurrent_register_and_lookup() {
    init_log();
    let registry = Registry::new();

    thread::scope(|s| {
        for i in 0..NTHREADS {
            let registry = &registry;
            s.spawn(move || {
                for j in 0..NITER {
                    let tag = format!("svc/kind-{}", (i + j) % 8);
                    registry.register(ErrorFormSpec::new(tag.as_str()));
                    let form = registry.lookup(&tag).unwrap();
                    assert_eq!(form.tag(), tag);
                }
            });
        }
    });

    assert_eq!(registry.len(), 8);
}

#[test]
fn test_global_registry_resolves_wire_tags() {
    init_log();
    let form = Registry::global()
        .register(ErrorFormSpec::new("registry_test/global").with_backtrace(BacktraceSpec::No));
    let back = FormRef::from_wire("\"registry_test/global\"", Registry::global()).unwrap();
    assert!(back.same_descriptor(&form));

    let err = FormRef::from_wire("\"registry_test/absent\"", Registry::global()).unwrap_err();
    assert!(err.is_unknown_tag());
}
