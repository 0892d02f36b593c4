//! Canonical JSON serialization: one unique byte string per logically
//! equal record, independent of key insertion order or platform.

use gitid_meta::NormalizedMetadata;
use serde_json::{Map, Value};

/// Serializes a JSON value with alphabetically sorted object keys (depth
/// first; arrays keep element order) and no inserted whitespace.
///
/// The string escaping is self-contained so the output never depends on
/// `serde_json` map-ordering feature flags pulled in by other dependents.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    out.push('{');
    for (idx, key) in keys.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        if let Some(value) = map.get(key.as_str()) {
            write_value(value, out);
        }
    }
    out.push('}');
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

/// Projects the identity field set of a normalized record and serializes it
/// canonically. This is the exact byte string that gets hashed.
///
/// `htmlUrl` and `repoPath` never enter the hashed form: they describe
/// where a record came from, not what it identifies. The timestamp does
/// participate when present.
pub fn canonical_string(meta: &NormalizedMetadata) -> String {
    let mut fields = Map::new();
    fields.insert("branch".to_string(), Value::String(meta.branch.clone()));
    fields.insert(
        "commitHash".to_string(),
        Value::String(meta.commit_hash.clone()),
    );
    fields.insert("fileHash".to_string(), Value::String(meta.file_hash.clone()));
    fields.insert("filePath".to_string(), Value::String(meta.file_path.clone()));
    if let Some(last_modified) = &meta.last_modified {
        fields.insert(
            "lastModified".to_string(),
            Value::String(last_modified.clone()),
        );
    }
    fields.insert("owner".to_string(), Value::String(meta.owner.clone()));
    fields.insert("repo".to_string(), Value::String(meta.repo.clone()));
    fields.insert(
        "source".to_string(),
        Value::String(meta.source.as_str().to_string()),
    );
    canonical_json(&Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitid_meta::MetadataSource;
    use serde_json::json;

    fn sample_meta() -> NormalizedMetadata {
        NormalizedMetadata {
            source: MetadataSource::LocalGit,
            owner: "octocat".into(),
            repo: "hello-world".into(),
            branch: "main".into(),
            commit_hash: "abc123def4567890abc123def4567890abc123de".into(),
            file_path: "src/lib.rs".into(),
            file_hash: "def456abc7890123def456abc7890123def456ab".into(),
            last_modified: Some("2024-01-01T12:00:00Z".into()),
            html_url: Some("https://github.com/octocat/hello-world/blob/x/src/lib.rs".into()),
            repo_path: Some("/repos/hello-world".into()),
        }
    }

    #[test]
    fn keys_sorted_depth_first_without_whitespace() {
        let value = json!({
            "b": {"z": 1, "a": [3, 1, 2]},
            "a": "x",
        });
        assert_eq!(canonical_json(&value), r#"{"a":"x","b":{"a":[3,1,2],"z":1}}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let value = json!({"k": "line\nbreak \"quoted\" \\ \u{0001}"});
        assert_eq!(
            canonical_json(&value),
            r#"{"k":"line\nbreak \"quoted\" \\ \u0001"}"#,
        );
    }

    #[test]
    fn canonical_string_has_fixed_field_set() {
        let canonical = canonical_string(&sample_meta());
        assert_eq!(
            canonical,
            concat!(
                r#"{"branch":"main","#,
                r#""commitHash":"abc123def4567890abc123def4567890abc123de","#,
                r#""fileHash":"def456abc7890123def456abc7890123def456ab","#,
                r#""filePath":"src/lib.rs","#,
                r#""lastModified":"2024-01-01T12:00:00Z","#,
                r#""owner":"octocat","repo":"hello-world","source":"local-git"}"#,
            ),
        );
    }

    #[test]
    fn permalink_and_repo_path_do_not_affect_canonical_form() {
        let with_urls = sample_meta();
        let mut without_urls = sample_meta();
        without_urls.html_url = None;
        without_urls.repo_path = None;

        assert_eq!(canonical_string(&with_urls), canonical_string(&without_urls));
    }

    #[test]
    fn timestamp_participates_when_present() {
        let with_ts = sample_meta();
        let mut without_ts = sample_meta();
        without_ts.last_modified = None;

        assert_ne!(canonical_string(&with_ts), canonical_string(&without_ts));
    }
}
