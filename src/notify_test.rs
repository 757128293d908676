use super::*;

#[test]
fn recording_notifier_buffers_in_order() {
    let sink = RecordingNotifier::new();
    sink.info("a");
    sink.error("b");
    sink.success("c");
    let toasts = sink.drain();
    assert_eq!(toasts.len(), 3);
    assert_eq!(toasts[0], Toast { level: ToastLevel::Info, message: "a".into() });
    assert_eq!(toasts[1].level, ToastLevel::Error);
    assert!(sink.drain().is_empty());
}

#[test]
fn of_level_filters_without_draining() {
    let sink = RecordingNotifier::new();
    sink.warning("w");
    sink.error("e1");
    sink.error("e2");
    assert_eq!(sink.of_level(ToastLevel::Error).len(), 2);
    assert_eq!(sink.of_level(ToastLevel::Warning).len(), 1);
    assert_eq!(sink.drain().len(), 3);
}

#[test]
fn tracing_notifier_accepts_all_levels() {
    let sink = TracingNotifier;
    sink.info("i");
    sink.success("s");
    sink.warning("w");
    sink.error("e");
}
