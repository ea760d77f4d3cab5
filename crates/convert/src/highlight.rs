//! ANSI syntax highlighting for bundle JSON.
//!
//! Renders a `serde_json::Value` as pretty-printed JSON with colour-coded
//! keys, strings, numbers and literals for terminal display.

use serde_json::Value;

const KEY: &str = "\x1b[36m"; // cyan
const STRING: &str = "\x1b[32m"; // green
const NUMBER: &str = "\x1b[33m"; // yellow
const LITERAL: &str = "\x1b[35m"; // magenta (true/false/null)
const RESET: &str = "\x1b[0m";

const INDENT: usize = 2;

/// Renders a JSON value with ANSI colours, two-space indented.
pub fn highlight(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => push_colored(out, LITERAL, "null"),
        Value::Bool(b) => push_colored(out, LITERAL, if *b { "true" } else { "false" }),
        Value::Number(n) => push_colored(out, NUMBER, &n.to_string()),
        Value::String(s) => push_colored(out, STRING, &quote(s)),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                push_colored(out, KEY, &quote(key));
                out.push_str(": ");
                write_value(out, item, depth + 1);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn push_colored(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(RESET);
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth * INDENT {
        out.push(' ');
    }
}

/// JSON-quotes a string, escaping as the wire format would.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn colours_each_token_class() {
        let rendered = highlight(&json!({
            "resourceType": "Bundle",
            "total": 3,
            "active": true,
            "link": null
        }));

        assert!(rendered.contains(&format!("{KEY}\"resourceType\"{RESET}")));
        assert!(rendered.contains(&format!("{STRING}\"Bundle\"{RESET}")));
        assert!(rendered.contains(&format!("{NUMBER}3{RESET}")));
        assert!(rendered.contains(&format!("{LITERAL}true{RESET}")));
        assert!(rendered.contains(&format!("{LITERAL}null{RESET}")));
    }

    #[test]
    fn nests_with_two_space_indent() {
        let rendered = highlight(&json!({"entry": [{"resource": {}}]}));
        let plain = strip_ansi(&rendered);
        assert_eq!(
            plain,
            "{\n  \"entry\": [\n    {\n      \"resource\": {}\n    }\n  ]\n}"
        );
    }

    #[test]
    fn escapes_embedded_quotes() {
        let rendered = highlight(&json!({"div": "<div class=\"x\">hi</div>"}));
        assert!(strip_ansi(&rendered).contains(r#""<div class=\"x\">hi</div>""#));
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for d in chars.by_ref() {
                    if d == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}
