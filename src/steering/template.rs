//! Template rendering and file-pattern matching for steering documents.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

use super::types::{SteeringContext, SteeringDocument};

/// Render a document's template against a context.
///
/// Variables resolve from the context first, then the variable's declared
/// default. Returns the names of required variables that could not be
/// resolved; the document must not be delivered in that case.
pub fn render(doc: &SteeringDocument, context: &SteeringContext) -> Result<String, Vec<String>> {
    let mut bindings: HashMap<&str, Value> = HashMap::new();
    let mut missing = Vec::new();

    for var in &doc.variables {
        if let Some(value) = context.variables.get(&var.name) {
            bindings.insert(var.name.as_str(), value.clone());
        } else if let Some(default) = &var.default {
            bindings.insert(var.name.as_str(), default.clone());
        } else if var.required {
            missing.push(var.name.clone());
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }

    // Context bindings not declared by the document still substitute.
    for (name, value) in &context.variables {
        bindings.entry(name.as_str()).or_insert_with(|| value.clone());
    }

    let mut content = doc.template.clone();
    for (name, value) in &bindings {
        content = content.replace(&format!("{{{{{name}}}}}"), &value_to_text(value));
    }

    Ok(content)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Option<Regex>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Whether a glob pattern matches a file path.
///
/// Supports `**` (any path segments), `*` (within a segment), and `?`
/// (single character). Invalid patterns never match.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut cache = PATTERN_CACHE.lock();
    let regex = cache
        .entry(pattern.to_string())
        .or_insert_with(|| compile_glob(pattern))
        .clone();
    drop(cache);

    regex.is_some_and(|re| re.is_match(path))
}

fn compile_glob(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() * 2);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // Swallow a following separator so `**/` also matches
                    // zero directories.
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }

    re.push('$');
    match Regex::new(&re) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Invalid steering pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::types::SteeringVariable;
    use serde_json::json;

    #[test]
    fn test_render_with_context_variable() {
        let doc = SteeringDocument::new("p", "d", "Use {{lang}} here.")
            .with_variable(SteeringVariable::required("lang"));
        let ctx = SteeringContext::new().with_variable("lang", json!("rust"));

        assert_eq!(render(&doc, &ctx).unwrap(), "Use rust here.");
    }

    #[test]
    fn test_render_falls_back_to_default() {
        let doc = SteeringDocument::new("p", "d", "Indent: {{width}}")
            .with_variable(SteeringVariable::optional("width").with_default(json!(4)));

        assert_eq!(render(&doc, &SteeringContext::new()).unwrap(), "Indent: 4");
    }

    #[test]
    fn test_render_missing_required() {
        let doc = SteeringDocument::new("p", "d", "{{a}} {{b}}")
            .with_variable(SteeringVariable::required("a"))
            .with_variable(SteeringVariable::required("b"));
        let ctx = SteeringContext::new().with_variable("a", json!("x"));

        let missing = render(&doc, &ctx).unwrap_err();
        assert_eq!(missing, vec!["b".to_string()]);
    }

    #[test]
    fn test_render_undeclared_context_variable() {
        let doc = SteeringDocument::new("p", "d", "Hello {{who}}");
        let ctx = SteeringContext::new().with_variable("who", json!("world"));

        assert_eq!(render(&doc, &ctx).unwrap(), "Hello world");
    }

    #[test]
    fn test_glob_single_star() {
        assert!(pattern_matches("src/*.rs", "src/lib.rs"));
        assert!(!pattern_matches("src/*.rs", "src/tools/mod.rs"));
    }

    #[test]
    fn test_glob_double_star() {
        assert!(pattern_matches("**/*.rs", "src/tools/mod.rs"));
        assert!(pattern_matches("**/*.rs", "lib.rs"));
        assert!(pattern_matches("src/**/registry.rs", "src/hooks/registry.rs"));
        assert!(!pattern_matches("**/*.rs", "README.md"));
    }

    #[test]
    fn test_glob_question_mark() {
        assert!(pattern_matches("v?.toml", "v1.toml"));
        assert!(!pattern_matches("v?.toml", "v12.toml"));
    }

    #[test]
    fn test_glob_literal_dots_escaped() {
        assert!(!pattern_matches("lib.rs", "libxrs"));
    }
}
