//! # Transformer pipeline
//!
//! Demonstrates the transform-then-deliver pipeline:
//! - A wildcard transformer enriching every event in a subtree
//! - A filtering transformer blocking events outright
//! - Mixed sync/async delivery with `emit_async`, strictly in priority order

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use emissary::{
    json, kwargs, AsyncSubscriberFn, AsyncSubscriberRef, Broker, Event, Flow, Signature,
    SubscriberFn, SubscriberRef, TransformFn, TransformerRef, Value,
};

#[tokio::main]
async fn main() -> Result<(), emissary::Error> {
    // Surface the broker's built-in policy handlers (they log via tracing).
    tracing_subscriber::fmt().with_target(false).init();

    println!("🚀 Pipeline Demo");
    println!("   Transformers rewrite or block events before delivery\n");

    let broker = Broker::new();

    // Every event under `system` gets a timestamp stamped in.
    let add_timestamp: TransformerRef = TransformFn::arc("add_timestamp", |_ns, mut kw| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        kw.insert("timestamp".into(), json!(now));
        Ok(Flow::Next(kw))
    });
    broker.register_transformer("system.*", &add_timestamp, 10)?;

    // Debug-level events are dropped before anyone sees them.
    let drop_debug: TransformerRef = TransformFn::arc("drop_debug", |_ns, kw| {
        let is_debug = kw.get("level").and_then(Value::as_str) == Some("debug");
        if is_debug {
            println!("🚧 drop_debug: blocking a debug event");
            return Ok(Flow::Block);
        }
        Ok(Flow::Next(kw))
    });
    broker.register_transformer("system.log.*", &drop_debug, 5)?;

    let on_startup: SubscriberRef = SubscriberFn::arc(
        "on_startup",
        Signature::exact(["timestamp"]),
        |event| {
            println!("⚙️  on_startup: booted at {:?}", event.get("timestamp"));
            Ok(())
        },
    );
    broker.register_subscriber("system.startup", &on_startup, 0)?;

    // The emit call carries no timestamp; the transformer supplies it before
    // the signature check runs.
    broker.emit("system.startup", kwargs! {})?;

    let log_sink: SubscriberRef = SubscriberFn::arc("log_sink", Signature::Flexible, |event| {
        println!(
            "📝 log_sink: [{}] {}",
            event.get_str("level").unwrap_or("?"),
            event.get_str("text").unwrap_or("")
        );
        Ok(())
    });
    broker.register_subscriber("system.log.*", &log_sink, 0)?;

    let delivered = broker.emit(
        "system.log.app",
        kwargs! { "level" => "info", "text" => "service ready" },
    )?;
    let blocked = broker.emit(
        "system.log.app",
        kwargs! { "level" => "debug", "text" => "noisy detail" },
    )?;
    println!("   info event blocked:  {}", delivered.is_blocked());
    println!("   debug event blocked: {}\n", blocked.is_blocked());

    // emit_async interleaves sync and async subscribers in one priority
    // order, awaiting each async callback to completion before moving on.
    let archiver: AsyncSubscriberRef =
        AsyncSubscriberFn::arc("archiver", Signature::Flexible, |event: Event| async move {
            println!("💾 archiver: persisting {} …", event.namespace);
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("💾 archiver: done");
            Ok(())
        });
    broker.register_async_subscriber("system.shutdown", &archiver, 10)?;

    let farewell: SubscriberRef = SubscriberFn::arc("farewell", Signature::Flexible, |_event| {
        println!("👋 farewell: runs only after the archiver finished");
        Ok(())
    });
    broker.register_subscriber("system.shutdown", &farewell, 0)?;

    broker.emit_async("system.shutdown", kwargs! {}).await?;

    println!("\n✅ Done");
    Ok(())
}
