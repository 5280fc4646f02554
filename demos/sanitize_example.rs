//! Registers two error forms, raises a chained error, ships it across a simulated process
//! boundary, and sanitizes it at an external-facing boundary.

use errform::{
    error::{BacktraceSpec, ErrorFormSpec, ErrorValue, FieldMap, Registry, TrivialError},
    sanex::{
        current_sanitization_level, sanitize, sync_with_sanitization_level, DEFAULT_SANITIZATION,
    },
};

fn register_forms(registry: &Registry) {
    registry.register(
        ErrorFormSpec::new("shop/payment-declined")
            .with_metadata_fn("card", |v| {
                let digits = v.as_str().unwrap_or_default();
                let tail = digits.get(digits.len().saturating_sub(4)..).unwrap_or_default();
                format!("****{tail}").into()
            })
            .with_backtrace(BacktraceSpec::Env),
    );
    registry.register(ErrorFormSpec::new("shop/checkout-failed").with_backtrace(BacktraceSpec::Env));
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Sending side.
    let sender = Registry::new();
    register_forms(&sender);

    let declined = sender.lookup("shop/payment-declined")?.raise(
        FieldMap::new("card 4242424242424242 declined")
            .with_entry("card", "4242424242424242")
            .with_cause(ErrorValue::from_std(&TrivialError("gateway said no"))),
    );
    let err: ErrorValue = sender
        .lookup("shop/checkout-failed")?
        .raise(FieldMap::new("checkout failed").with_cause(declined))
        .into();
    println!("*** presented={}", serde_json::Value::Object(err.present()));

    let wire = err.to_wire()?;
    println!("*** wire={wire}");

    // Receiving side, with its own registry populated from the same definitions.
    let receiver = Registry::new();
    register_forms(&receiver);
    let received = ErrorValue::from_wire(&wire, &receiver)?;
    println!("*** received={received:?}");

    println!("*** ambient level={:?}", current_sanitization_level());
    let external = sync_with_sanitization_level(DEFAULT_SANITIZATION, || sanitize(&received));
    println!("*** sanitized={}", external.to_wire()?);

    let sites = sender.lookup("shop/payment-declined")?.descriptor().raised_sites();
    println!("*** raise sites={sites:?}");

    Ok(())
}
