use serde_json::Value;

/// Parse tool-call arguments as they arrive from a model.
///
/// An empty or whitespace-only string means "no arguments" and yields `{}`.
/// Anything else must be strict JSON.
pub fn parse_tool_arguments(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return Some(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).ok()
}

/// Arguments of a completed tool call. Unparseable text is kept verbatim as
/// a JSON string.
pub fn tool_arguments_value(raw: &str) -> Value {
    parse_tool_arguments(raw)
        .or_else(|| parse_json_loose(raw))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Parse a JSON value from a possibly noisy string.
///
/// Strict parsing is tried first. Failing that, the first balanced object or
/// array inside `s` is extracted and parsed, ignoring leading or trailing
/// noise such as `<|tool_call_end|>` markers some hosted models append.
pub fn parse_json_loose(s: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(s) {
        return Some(v);
    }
    let start = s.find(|c| c == '{' || c == '[')?;
    let end = balanced_end(&s.as_bytes()[start..])?;
    serde_json::from_str(&s[start..start + end]).ok()
}

/// Length of the balanced JSON container at the head of `bytes`.
fn balanced_end(bytes: &[u8]) -> Option<usize> {
    let mut closers: Vec<u8> = Vec::new();
    let mut in_str = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_str {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_str = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_str = true,
            b'{' => closers.push(b'}'),
            b'[' => closers.push(b']'),
            b'}' | b']' => {
                if closers.pop()? != b {
                    return None;
                }
                if closers.is_empty() {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
