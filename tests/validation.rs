//! Signature records: registration-time conflicts and emission-time
//! argument validation.

mod util;

use emissary::{json, kwargs, Broker, Error, Flow, Signature, TransformFn, TransformerRef};
use util::Recorder;

#[test]
fn conflicting_signature_rejects_registration() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let s1 = rec.subscriber("s1", Signature::exact(["x"]));
    let s2 = rec.subscriber("s2", Signature::exact(["y"]));

    broker.register_subscriber("data.update", &s1, 0).unwrap();
    let err = broker.register_subscriber("data.update", &s2, 0).unwrap_err();

    assert!(matches!(err, Error::SignatureConflict { .. }));
    assert!(err.is_signature_error());
    assert_eq!(broker.subscriber_count("data.update"), 1);

    // The rejected subscriber is never delivered to.
    broker.emit("data.update", kwargs! { "x" => 1 }).unwrap();
    assert_eq!(rec.entries(), ["s1"]);
}

#[test]
fn conflicting_registration_leaves_no_new_nodes() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let s1 = rec.subscriber("s1", Signature::exact(["x"]));
    broker.register_subscriber("data.update", &s1, 0).unwrap();

    let s2 = rec.subscriber("s2", Signature::exact(["y"]));
    assert!(broker.register_subscriber("data.update", &s2, 0).is_err());

    // Rejection happened against an existing node; nothing else appeared.
    assert_eq!(broker.namespaces(), ["data", "data.update"]);
}

#[test]
fn emission_kwargs_must_match_the_record() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let s1 = rec.subscriber("s1", Signature::exact(["x"]));
    broker.register_subscriber("data.update", &s1, 0).unwrap();

    let err = broker
        .emit("data.update", kwargs! { "x" => 1, "y" => 2 })
        .unwrap_err();

    match err {
        Error::ArgumentMismatch {
            emitted, namespace, ..
        } => {
            assert_eq!(emitted, "data.update");
            assert_eq!(namespace, "data.update");
        }
        other => panic!("expected ArgumentMismatch, got {other}"),
    }

    // Validation failed before any delivery.
    assert!(rec.is_empty());
}

#[test]
fn flexible_subscribers_accept_anything() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let flex = rec.subscriber("flex", Signature::Flexible);
    broker.register_subscriber("data.free", &flex, 0).unwrap();

    broker.emit("data.free", kwargs! { "a" => 1 }).unwrap();
    broker.emit("data.free", kwargs! {}).unwrap();
    broker
        .emit("data.free", kwargs! { "x" => 1, "y" => 2, "z" => 3 })
        .unwrap();

    assert_eq!(rec.entries(), ["flex", "flex", "flex"]);
}

#[test]
fn flexible_registration_neither_sets_nor_fights_the_record() {
    let broker = Broker::new();
    let rec = Recorder::new();

    // Flexible first: no record is set, so a later exact subscriber sets it.
    let flex = rec.subscriber("flex", Signature::Flexible);
    broker.register_subscriber("data.mixed", &flex, 0).unwrap();
    let exact = rec.subscriber("exact", Signature::exact(["x"]));
    broker.register_subscriber("data.mixed", &exact, 0).unwrap();

    // The record is now {x}; a flexible subscriber still registers fine.
    let flex2 = rec.subscriber("flex2", Signature::Flexible);
    broker.register_subscriber("data.mixed", &flex2, 0).unwrap();

    assert!(broker.emit("data.mixed", kwargs! { "y" => 1 }).is_err());
    broker.emit("data.mixed", kwargs! { "x" => 1 }).unwrap();
    assert_eq!(rec.entries(), ["flex", "exact", "flex2"]);
}

#[test]
fn record_dies_with_its_node() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let s1 = rec.subscriber("s1", Signature::exact(["x"]));
    broker.register_subscriber("data.update", &s1, 0).unwrap();
    broker.unregister_subscriber("data.update", &s1);

    // Node was deleted, so the recreated namespace takes a new record.
    let s2 = rec.subscriber("s2", Signature::exact(["y"]));
    broker.register_subscriber("data.update", &s2, 0).unwrap();
    broker.emit("data.update", kwargs! { "y" => 7 }).unwrap();

    assert_eq!(rec.entries(), ["s2"]);
}

#[test]
fn transformer_added_keys_satisfy_validation() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let on_startup = rec.subscriber_with_arg(
        "on_startup",
        "timestamp",
        Signature::exact(["timestamp"]),
    );
    broker.register_subscriber("system.startup", &on_startup, 0).unwrap();

    let add_timestamp: TransformerRef = TransformFn::arc("add_timestamp", |_ns, mut kw| {
        kw.insert("timestamp".into(), json!(1_722_000_000));
        Ok(Flow::Next(kw))
    });
    broker.register_transformer("system.*", &add_timestamp, 10).unwrap();

    // The original call carries no timestamp; the transformer supplies it
    // before validation runs.
    broker.emit("system.startup", kwargs! {}).unwrap();

    assert_eq!(rec.entries(), ["on_startup:1722000000"]);
}

#[test]
fn wildcard_records_constrain_covered_emissions() {
    let broker = Broker::new();
    let rec = Recorder::new();

    let audit = rec.subscriber("audit", Signature::exact(["actor"]));
    broker.register_subscriber("admin.*", &audit, 0).unwrap();

    broker.emit("admin.login", kwargs! { "actor" => "root" }).unwrap();
    let err = broker.emit("admin.login", kwargs! { "who" => "root" }).unwrap_err();

    assert!(matches!(err, Error::ArgumentMismatch { namespace, .. } if namespace == "admin.*"));
    assert_eq!(rec.entries(), ["audit"]);
}
