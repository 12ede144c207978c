use super::*;

fn visitor(event: Option<&str>, fields: &[(&str, &str)]) -> EventVisitor {
    EventVisitor {
        event: event.map(str::to_string),
        message: None,
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[test]
fn test_event_name_and_fields_rendered() {
    let v = visitor(Some("track_solved"), &[("track", "treatment"), ("verdict", "solved")]);
    let out = format_event(Level::INFO, &v);
    assert!(out.contains("[track_solved]"));
    assert!(out.contains("treatment"));
    assert!(out.contains("solved"));
    assert!(out.contains("INFO"));
}

#[test]
fn test_event_without_name_is_skipped() {
    let v = visitor(None, &[("nodes", "12")]);
    assert!(format_event(Level::DEBUG, &v).is_empty());
}

#[test]
fn test_message_used_when_no_event_field() {
    let mut v = visitor(None, &[]);
    v.message = Some("loading observations".into());
    assert!(format_event(Level::WARN, &v).contains("[loading observations]"));
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_number(54.0), "54");
    assert_eq!(format_number(0.123456), "0.1235");
}

#[test]
fn test_init_is_idempotent() {
    init();
    init();
}
