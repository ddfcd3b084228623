//! # Meta-notifications
//!
//! Demonstrates observing the broker itself:
//! - Enabling individual notification kinds with `NotifyFlags`
//! - Watching a whole notification subtree through a wildcard
//! - Collection notifications when a subscriber's owner is dropped

use emissary::{kwargs, notify, Broker, NotifyFlags, Signature, SubscriberFn, SubscriberRef};

fn main() -> Result<(), emissary::Error> {
    println!("🚀 Notify Demo");
    println!("   The broker's structural events are ordinary emissions\n");

    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_subscribe: true,
        on_unsubscribe: true,
        on_subscriber_collected: true,
        on_namespace_created: true,
        on_namespace_deleted: true,
        ..NotifyFlags::default()
    });

    // One wildcard watcher sees every enabled notification kind.
    let watcher: SubscriberRef = SubscriberFn::arc("watcher", Signature::Flexible, |event| {
        println!(
            "🔍 {} → {}",
            event.namespace,
            event.get_str("namespace").unwrap_or("?")
        );
        Ok(())
    });
    broker.register_subscriber("broker.notify.*", &watcher, 0)?;

    println!("── registering a subscriber ──");
    let worker: SubscriberRef = SubscriberFn::arc("worker", Signature::Flexible, |_| Ok(()));
    broker.register_subscriber("jobs.nightly", &worker, 0)?;

    println!("\n── unregistering it again ──");
    broker.unregister_subscriber("jobs.nightly", &worker);

    println!("\n── dropping an owner instead ──");
    let ephemeral: SubscriberRef = SubscriberFn::arc("ephemeral", Signature::Flexible, |_| Ok(()));
    broker.register_subscriber("jobs.adhoc", &ephemeral, 0)?;
    drop(ephemeral);

    // The dead entry is purged on the next emission touching it (or by an
    // explicit reap), which fires the collected notification exactly once.
    broker.emit("jobs.adhoc", kwargs! {})?;
    broker.reap();

    println!("\n✅ Done");
    Ok(())
}
