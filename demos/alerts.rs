//! # Priority-ordered alert delivery
//!
//! Demonstrates basic emissary features:
//! - Registering subscribers with priorities
//! - Delivery order: higher priority first, ties by registration order
//! - The per-namespace keyword-argument contract
//! - Unregistering and automatic namespace cleanup

use emissary::{kwargs, Broker, Signature, SubscriberFn, SubscriberRef};

fn labeled(label: &'static str) -> SubscriberRef {
    SubscriberFn::arc(label, Signature::exact(["message"]), move |event| {
        println!(
            "📣 {}: received message={}",
            label,
            event.get_str("message").unwrap_or("?")
        );
        Ok(())
    })
}

fn main() -> Result<(), emissary::Error> {
    println!("🚀 Alert Demo");
    println!("   Two subscribers on the same namespace; priority decides order\n");

    let broker = Broker::new();

    let urgent = labeled("urgent (priority 10)");
    let casual = labeled("casual (priority 5)");

    // Registered low-priority first on purpose; delivery still runs
    // urgent-first.
    broker.register_subscriber("system.alert", &casual, 5)?;
    broker.register_subscriber("system.alert", &urgent, 10)?;

    broker.emit("system.alert", kwargs! { "message" => "Warning!" })?;

    // The namespace now has a signature record of {message}; emitting
    // anything else fails before any subscriber runs.
    println!("\n🔒 Emitting with the wrong kwargs:");
    match broker.emit("system.alert", kwargs! { "text" => "nope" }) {
        Err(e) => println!("   rejected as expected: {e}"),
        Ok(_) => println!("   unexpectedly delivered!"),
    }

    // Unregistering the last subscriber deletes the namespace node.
    broker.unregister_subscriber("system.alert", &urgent);
    broker.unregister_subscriber("system.alert", &casual);
    println!(
        "\n🧹 namespace still exists after unregistering everyone: {}",
        broker.namespace_exists("system.alert")
    );

    println!("\n✅ Done");
    Ok(())
}
