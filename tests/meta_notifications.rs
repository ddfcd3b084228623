//! Meta-notifications: structural events re-injected through the ordinary
//! dispatch machinery, with per-kind toggles and a recursion guard.

mod util;

use emissary::{kwargs, notify, Broker, EmitStatus, Flow, NotifyFlags, Signature, TransformFn,
               TransformerRef};
use util::Recorder;

#[test]
fn registration_events_fire_when_enabled() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_subscribe: true,
        on_unsubscribe: true,
        on_namespace_created: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let added = rec.subscriber_with_arg("added", "namespace", Signature::Flexible);
    let removed = rec.subscriber_with_arg("removed", "namespace", Signature::Flexible);
    let created = rec.subscriber_with_arg("created", "namespace", Signature::Flexible);
    broker.register_subscriber(notify::ON_SUBSCRIBER_ADDED, &added, 0).unwrap();
    broker.register_subscriber(notify::ON_SUBSCRIBER_REMOVED, &removed, 0).unwrap();
    broker.register_subscriber(notify::ON_NAMESPACE_CREATED, &created, 0).unwrap();

    let sub = rec.subscriber("sub", Signature::Flexible);
    broker.register_subscriber("app.start", &sub, 0).unwrap();
    broker.unregister_subscriber("app.start", &sub);

    assert_eq!(
        rec.entries(),
        [
            r#"created:"app""#,
            r#"created:"app.start""#,
            r#"added:"app.start""#,
            r#"removed:"app.start""#,
        ]
    );
}

#[test]
fn transformer_lifecycle_events_fire_when_enabled() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_transformer_add: true,
        on_transformer_remove: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let added = rec.subscriber_with_arg("tx_added", "namespace", Signature::Flexible);
    let removed = rec.subscriber_with_arg("tx_removed", "namespace", Signature::Flexible);
    broker.register_subscriber(notify::ON_TRANSFORMER_ADDED, &added, 0).unwrap();
    broker.register_subscriber(notify::ON_TRANSFORMER_REMOVED, &removed, 0).unwrap();

    let tx: TransformerRef = TransformFn::arc("tx", |_ns, kw| Ok(Flow::Next(kw)));
    broker.register_transformer("app.*", &tx, 0).unwrap();
    broker.unregister_transformer("app.*", &tx);

    assert_eq!(
        rec.entries(),
        [r#"tx_added:"app.*""#, r#"tx_removed:"app.*""#]
    );
}

#[test]
fn emit_notifications_carry_namespace_and_kwargs() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_emit: true,
        on_emit_all: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let on_emit = rec.subscriber_with_arg("emit", "kwargs", Signature::Flexible);
    let on_all = rec.subscriber_with_arg("all", "namespace", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &on_emit, 0).unwrap();
    broker.register_subscriber(notify::ON_EMIT_ALL, &on_all, 0).unwrap();

    broker.emit("app.ping", kwargs! { "n" => 1 }).unwrap();

    assert_eq!(rec.entries(), [r#"emit:{"n":1}"#, r#"all:"app.ping""#]);
}

#[tokio::test]
async fn emit_async_fires_its_own_kind() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_emit: true,
        on_emit_async: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let sync_kind = rec.subscriber("sync_kind", Signature::Flexible);
    let async_kind = rec.subscriber("async_kind", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &sync_kind, 0).unwrap();
    broker.register_subscriber(notify::ON_EMIT_ASYNC, &async_kind, 0).unwrap();

    broker.emit_async("app.ping", kwargs! {}).await.unwrap();

    assert_eq!(rec.entries(), ["async_kind"]);
}

#[test]
fn meta_emissions_do_not_recurse() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags::all());

    let rec = Recorder::new();
    let on_emit = rec.subscriber("on_emit", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &on_emit, 0).unwrap();

    broker.emit("app.ping", kwargs! {}).unwrap();

    // One ON_EMIT for the app emission; none for the meta-emission itself.
    assert_eq!(rec.entries(), ["on_emit"]);
}

#[test]
fn registering_on_reserved_namespaces_is_silent() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags::all());

    let rec = Recorder::new();
    let added = rec.subscriber("added", Signature::Flexible);
    broker.register_subscriber(notify::ON_SUBSCRIBER_ADDED, &added, 0).unwrap();

    // Subscribing to another reserved namespace must not announce itself.
    let watcher = rec.subscriber("watcher", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &watcher, 0).unwrap();

    assert!(rec.is_empty());
}

#[test]
fn blocked_emissions_fire_no_emit_notifications() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_emit: true,
        on_emit_all: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let on_emit = rec.subscriber("on_emit", Signature::Flexible);
    let on_all = rec.subscriber("on_all", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &on_emit, 0).unwrap();
    broker.register_subscriber(notify::ON_EMIT_ALL, &on_all, 0).unwrap();

    let gate: TransformerRef = TransformFn::arc("gate", |_ns, _kw| Ok(Flow::Block));
    broker.register_transformer("app.ping", &gate, 0).unwrap();

    let status = broker.emit("app.ping", kwargs! {}).unwrap();
    assert_eq!(status, EmitStatus::Blocked);
    assert!(rec.is_empty());
}

#[test]
fn disabled_flags_suppress_everything() {
    let broker = Broker::new();

    let rec = Recorder::new();
    let on_emit = rec.subscriber("on_emit", Signature::Flexible);
    broker.register_subscriber(notify::ON_EMIT, &on_emit, 0).unwrap();

    broker.emit("app.ping", kwargs! {}).unwrap();

    assert!(rec.is_empty());
}

#[test]
fn wildcards_apply_to_meta_namespaces_too() {
    let broker = Broker::new();
    broker.set_flag_states(NotifyFlags {
        on_subscribe: true,
        on_unsubscribe: true,
        ..NotifyFlags::default()
    });

    let rec = Recorder::new();
    let watcher = rec.subscriber("watcher", Signature::Flexible);
    broker
        .register_subscriber("broker.notify.subscriber.*", &watcher, 0)
        .unwrap();

    let sub = rec.subscriber("sub", Signature::Flexible);
    broker.register_subscriber("app.start", &sub, 0).unwrap();
    broker.unregister_subscriber("app.start", &sub);

    assert_eq!(rec.entries(), ["watcher", "watcher"]);
}
