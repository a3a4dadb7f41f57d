use crate::ai_sdk_types::{
    ContentPart, ModelRegistration, StreamEvent, ToolResultItem, ToolSet, ToolSpec,
    TranslatedMessage, UserContent, UserPart,
};
use serde_json::json;

#[test]
fn content_part_is_tagged_by_kind() {
    let part: ContentPart =
        serde_json::from_value(json!({"kind":"tool_call","call_id":"c1","name":"f","input":"{}"}))
            .unwrap();
    assert_eq!(part, ContentPart::tool_call("c1", "f", json!("{}")));
}

#[test]
fn unknown_kind_deserializes_to_unknown() {
    let part: ContentPart =
        serde_json::from_value(json!({"kind":"image","data":"...."})).unwrap();
    assert_eq!(part, ContentPart::Unknown);
}

#[test]
fn tool_result_items_accept_text_and_opaque_values() {
    let part: ContentPart = serde_json::from_value(json!({
        "kind":"tool_result",
        "call_id":"c1",
        "content":[{"value":"ok"}, 42]
    }))
    .unwrap();
    match part {
        ContentPart::ToolResult { content, .. } => {
            assert_eq!(content[0], ToolResultItem::text("ok"));
            assert_eq!(content[1], ToolResultItem::Other(json!(42)));
        }
        other => panic!("unexpected part: {other:?}"),
    }
}

#[test]
fn tool_set_keeps_insertion_order_and_replaces_duplicates() {
    let spec = |d: &str| ToolSpec {
        parameters: json!({"type":"object","properties":{}}),
        description: d.into(),
    };
    let mut set = ToolSet::new();
    set.insert("b".into(), spec("first"));
    set.insert("a".into(), spec("second"));
    let replaced = set.insert("b".into(), spec("third"));

    assert_eq!(replaced.map(|s| s.description), Some("first".to_string()));
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(set.get("b").map(|s| s.description.as_str()), Some("third"));

    let rendered = serde_json::to_string(&set).unwrap();
    assert!(rendered.starts_with(r#"{"b":"#), "unexpected: {rendered}");
}

#[test]
fn translated_user_message_serializes_with_role_tag() {
    let msg = TranslatedMessage::User {
        content: UserContent::Parts(vec![UserPart::Text { text: "hi".into() }]),
    };
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({"role":"user","content":[{"type":"text","text":"hi"}]})
    );
}

#[test]
fn stream_event_log_json_uses_kebab_tags() {
    let ev = StreamEvent::ToolCall {
        tool_call_id: None,
        tool_name: Some("f".into()),
        args: json!({}),
    };
    assert_eq!(ev.kind(), "tool-call");
    assert_eq!(ev.to_log_json(), r#"{"type":"tool-call","toolName":"f","args":{}}"#);
}

#[test]
fn boost_registration_defaults() {
    let reg = ModelRegistration::boost("gemini", "Gemini");
    assert_eq!(reg.vendor, "boost");
    assert_eq!(reg.family, "boost");
    assert_eq!(reg.version, "1.0.0");
    assert_eq!(reg.max_input_tokens, 200_000);
    assert_eq!(reg.max_output_tokens, 8_192);
    assert!(reg.is_default && reg.is_user_selectable);
    assert!(reg.capabilities.agent_mode && reg.capabilities.tool_calling && reg.capabilities.vision);
}
