//! Async emission: mixed-kind sequential delivery, sync-only `emit`, and
//! caller cancellation.

mod util;

use std::time::Duration;

use emissary::{
    kwargs, AsyncSubscriberFn, AsyncSubscriberRef, Broker, CallbackError, EmitStatus, Event,
    Signature,
};
use util::Recorder;

fn recording_async(rec: &Recorder, label: &'static str) -> AsyncSubscriberRef {
    let rec = rec.clone();
    AsyncSubscriberFn::arc(label, Signature::Flexible, move |_event| {
        let rec = rec.clone();
        async move {
            rec.push(label);
            Ok(())
        }
    })
}

#[tokio::test]
async fn async_subscriber_receives_via_emit_async() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let handler = recording_async(&rec, "handler");
    broker.register_async_subscriber("jobs.done", &handler, 0).unwrap();

    let status = broker.emit_async("jobs.done", kwargs! { "id" => 7 }).await.unwrap();

    assert_eq!(status, EmitStatus::Delivered);
    assert_eq!(rec.entries(), ["handler"]);
}

#[test]
fn plain_emit_skips_async_subscribers() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let sync_sub = rec.subscriber("sync", Signature::Flexible);
    let async_sub = recording_async(&rec, "async");
    broker.register_subscriber("jobs.done", &sync_sub, 0).unwrap();
    broker.register_async_subscriber("jobs.done", &async_sub, 10).unwrap();

    broker.emit("jobs.done", kwargs! {}).unwrap();

    assert_eq!(rec.entries(), ["sync"]);
}

#[tokio::test]
async fn mixed_kinds_deliver_sequentially_in_priority_order() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let r = rec.clone();
    let slow: AsyncSubscriberRef =
        AsyncSubscriberFn::arc("slow", Signature::Flexible, move |_event| {
            let r = r.clone();
            async move {
                r.push("slow:start");
                tokio::time::sleep(Duration::from_millis(10)).await;
                r.push("slow:end");
                Ok(())
            }
        });
    let fast = rec.subscriber("fast", Signature::Flexible);

    broker.register_async_subscriber("jobs.run", &slow, 10).unwrap();
    broker.register_subscriber("jobs.run", &fast, 5).unwrap();

    broker.emit_async("jobs.run", kwargs! {}).await.unwrap();

    // The async callback completes fully before the next entry runs.
    assert_eq!(rec.entries(), ["slow:start", "slow:end", "fast"]);
}

#[tokio::test]
async fn dropping_the_future_aborts_remaining_delivery() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let r = rec.clone();
    let stuck: AsyncSubscriberRef =
        AsyncSubscriberFn::arc("stuck", Signature::Flexible, move |_event| {
            let r = r.clone();
            async move {
                r.push("stuck:start");
                futures::future::pending::<()>().await;
                Ok(())
            }
        });
    let after = rec.subscriber("after", Signature::Flexible);

    broker.register_async_subscriber("jobs.halt", &stuck, 10).unwrap();
    broker.register_subscriber("jobs.halt", &after, 0).unwrap();

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        broker.emit_async("jobs.halt", kwargs! {}),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(rec.entries(), ["stuck:start"]);
}

#[tokio::test]
async fn failing_async_subscriber_follows_the_policy() {
    let broker = Broker::new();
    let log = emissary::ErrorLog::new();
    broker.set_subscriber_exception_handler(Some(emissary::policies::collect_and_continue(&log)));
    let rec = Recorder::new();

    let bad: AsyncSubscriberRef =
        AsyncSubscriberFn::arc("bad", Signature::Flexible, move |_event| async move {
            Err::<(), CallbackError>("async boom".into())
        });
    let after = rec.subscriber("after", Signature::Flexible);

    broker.register_async_subscriber("jobs.run", &bad, 10).unwrap();
    broker.register_subscriber("jobs.run", &after, 0).unwrap();

    broker.emit_async("jobs.run", kwargs! {}).await.unwrap();

    assert_eq!(rec.entries(), ["after"]);
    assert_eq!(log.records()[0].error, "async boom");
}

#[tokio::test]
async fn async_entries_share_the_signature_contract() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let r = rec.clone();
    let typed: AsyncSubscriberRef =
        AsyncSubscriberFn::arc("typed", Signature::exact(["id"]), move |event: Event| {
            let r = r.clone();
            async move {
                r.push(format!("typed:{}", event.get("id").map(|v| v.to_string()).unwrap_or_default()));
                Ok(())
            }
        });
    broker.register_async_subscriber("jobs.done", &typed, 0).unwrap();

    assert!(broker.emit_async("jobs.done", kwargs! { "wrong" => 1 }).await.is_err());
    broker.emit_async("jobs.done", kwargs! { "id" => 5 }).await.unwrap();

    assert_eq!(rec.entries(), ["typed:5"]);
    assert!(broker.is_async_subscribed("jobs.done", &typed));
}

#[tokio::test]
async fn unregister_async_subscriber_stops_delivery() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let handler = recording_async(&rec, "handler");
    broker.register_async_subscriber("jobs.done", &handler, 0).unwrap();
    broker.emit_async("jobs.done", kwargs! {}).await.unwrap();

    assert!(broker.unregister_async_subscriber("jobs.done", &handler));
    broker.emit_async("jobs.done", kwargs! {}).await.unwrap();

    assert_eq!(rec.entries(), ["handler"]);
}
