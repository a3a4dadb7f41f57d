use crate::ai_sdk_types::{ToolChoice, ToolSet};
use serde_json::{json, Value as JsonValue};

/// Convert JSON Schema (draft-07) into the OpenAPI 3.0 subset Gemini accepts.
///
/// Unsupported keywords such as `$schema` and `additionalProperties` are
/// dropped. An object schema without properties converts to `Null`.
pub fn convert_json_schema_to_openapi_schema(schema: &JsonValue) -> JsonValue {
    if is_empty_object_schema(schema) {
        return JsonValue::Null;
    }
    match schema {
        JsonValue::Bool(b) => json!({"type": "boolean", "properties": {}, "const": b}),
        JsonValue::Object(map) => {
            let mut out = serde_json::Map::new();

            if let Some(desc) = map.get("description").cloned() {
                out.insert("description".into(), desc);
            }
            if let Some(req) = map.get("required").cloned() {
                out.insert("required".into(), req);
            }
            if let Some(fmt) = map.get("format").cloned() {
                out.insert("format".into(), fmt);
            }

            if let Some(cv) = map.get("const").cloned() {
                out.insert("enum".into(), json!([cv]));
            }

            if let Some(t) = map.get("type") {
                match t {
                    JsonValue::Array(arr) => {
                        if arr.iter().any(|v| v == "null") {
                            let first_non_null = arr
                                .iter()
                                .find(|v| **v != JsonValue::String("null".into()))
                                .cloned()
                                .unwrap_or(JsonValue::String("object".into()));
                            out.insert("type".into(), first_non_null);
                            out.insert("nullable".into(), JsonValue::Bool(true));
                        } else {
                            out.insert("type".into(), JsonValue::Array(arr.clone()));
                        }
                    }
                    JsonValue::String(s) => {
                        out.insert("type".into(), JsonValue::String(s.clone()));
                    }
                    _ => {}
                }
            }

            if let Some(ev) = map.get("enum").cloned() {
                out.insert("enum".into(), ev);
            }

            if let Some(props) = map.get("properties").and_then(|v| v.as_object()) {
                let mut props_out = serde_json::Map::new();
                for (k, v) in props.iter() {
                    let c = convert_json_schema_to_openapi_schema(v);
                    if !c.is_null() {
                        props_out.insert(k.clone(), c);
                    }
                }
                out.insert("properties".into(), JsonValue::Object(props_out));
            }

            if let Some(items) = map.get("items") {
                let conv = match items {
                    JsonValue::Array(arr) => JsonValue::Array(
                        arr.iter()
                            .map(convert_json_schema_to_openapi_schema)
                            .collect(),
                    ),
                    other => convert_json_schema_to_openapi_schema(other),
                };
                out.insert("items".into(), conv);
            }

            if let Some(all) = map.get("allOf").and_then(|v| v.as_array()) {
                out.insert(
                    "allOf".into(),
                    JsonValue::Array(
                        all.iter()
                            .map(convert_json_schema_to_openapi_schema)
                            .collect(),
                    ),
                );
            }
            if let Some(any) = map.get("anyOf").and_then(|v| v.as_array()) {
                let has_null = any.iter().any(|s| {
                    matches!(s, JsonValue::Object(m) if m.get("type").and_then(|v| v.as_str()) == Some("null"))
                });
                let non_null: Vec<JsonValue> = any
                    .iter()
                    .filter(|s| {
                        !matches!(s, JsonValue::Object(m) if m.get("type").and_then(|v| v.as_str()) == Some("null"))
                    })
                    .map(convert_json_schema_to_openapi_schema)
                    .collect();
                if has_null {
                    if non_null.len() == 1 {
                        if let Some(obj) = non_null.into_iter().next() {
                            if let JsonValue::Object(mut om) = obj {
                                om.insert("nullable".into(), JsonValue::Bool(true));
                                return JsonValue::Object(om);
                            }
                        }
                    } else {
                        out.insert("anyOf".into(), JsonValue::Array(non_null));
                        out.insert("nullable".into(), JsonValue::Bool(true));
                    }
                } else {
                    out.insert("anyOf".into(), JsonValue::Array(non_null));
                }
            }
            if let Some(one) = map.get("oneOf").and_then(|v| v.as_array()) {
                out.insert(
                    "oneOf".into(),
                    JsonValue::Array(
                        one.iter()
                            .map(convert_json_schema_to_openapi_schema)
                            .collect(),
                    ),
                );
            }

            if let Some(minl) = map.get("minLength").cloned() {
                out.insert("minLength".into(), minl);
            }

            JsonValue::Object(out)
        }
        _ => JsonValue::Null,
    }
}

fn is_empty_object_schema(v: &JsonValue) -> bool {
    if let JsonValue::Object(m) = v {
        let t_obj = m.get("type").and_then(|v| v.as_str()) == Some("object");
        let props_empty = m
            .get("properties")
            .map(|p| p.as_object().map(|o| o.is_empty()).unwrap_or(true))
            .unwrap_or(true);
        let addl = m.get("additionalProperties").is_some();
        return t_obj && props_empty && !addl;
    }
    false
}

pub struct PreparedTools {
    pub tools: Option<JsonValue>,
    pub tool_config: Option<JsonValue>,
}

/// `tools: [{functionDeclarations}]` plus the matching `toolConfig`.
pub fn prepare_tools(tools: &Option<ToolSet>, tool_choice: &Option<ToolChoice>) -> PreparedTools {
    let Some(tools) = tools.as_ref().filter(|t| !t.is_empty()) else {
        return PreparedTools {
            tools: None,
            tool_config: None,
        };
    };

    let fns: Vec<JsonValue> = tools
        .iter()
        .map(|(name, spec)| {
            let mut decl = json!({
                "name": name,
                "description": spec.description,
            });
            let params = convert_json_schema_to_openapi_schema(&spec.parameters);
            if !params.is_null() {
                decl["parameters"] = params;
            }
            decl
        })
        .collect();

    let tool_config = tool_choice.map(|choice| {
        let mode = match choice {
            ToolChoice::Auto => "AUTO",
            ToolChoice::Required => "ANY",
        };
        json!({"functionCallingConfig": {"mode": mode}})
    });

    PreparedTools {
        tools: Some(json!([{ "functionDeclarations": fns }])),
        tool_config,
    }
}
