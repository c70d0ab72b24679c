//! JSON structural navigator/mutator.
//!
//! A lower-level path engine over parsed JSON documents, independent of
//! the expression grammar: mediation code uses it directly to query and
//! edit message bodies, and the expression language's path syntax sits on
//! the same list/map semantics. A path compiles once into a token
//! sequence and is evaluated against a root to find zero, one or many
//! matches.
//!
//! All mutation operations consume the root and return the (possibly
//! replaced) root object; callers must use the returned value rather than
//! assuming in-place identity.

use thiserror::Error;

use crate::value::JsonValue;

/// A path that cannot be tokenized at all. This is the navigator's one
/// hard failure; a well-formed path that matches nothing is simply an
/// empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Object member by name (`.name`, `['name']`)
    Key(String),
    /// Array element by position (`[0]`)
    Index(usize),
    /// Every element of an array, every member value of an object
    /// (`[*]`, `.*`)
    Wildcard,
}

/// A compiled dot/bracket path.
///
/// Grammar: an optional leading `$`, then any run of `.name`, `.*`,
/// `[0]`, `['name']`, `["name"]`, `[*]`. A bare leading identifier is
/// accepted as the first member name. `$` alone addresses the whole
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    tokens: Vec<PathToken>,
}

impl JsonPath {
    /// Compile a path string into its token sequence.
    pub fn compile(text: &str) -> Result<JsonPath, PathError> {
        let tokens = tokenize(text)?;
        Ok(JsonPath {
            source: text.to_string(),
            tokens,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// A definite path has no wildcard step and matches at most one
    /// node. The definite root path short-circuits whole-body operations
    /// without walking anything.
    pub fn is_definite(&self) -> bool {
        !self.tokens.iter().any(|t| matches!(t, PathToken::Wildcard))
    }

    /// The re-derived path with the last segment dropped; `None` at the
    /// root.
    pub fn parent(&self) -> Option<JsonPath> {
        let (_, rest) = self.tokens.split_last()?;
        Some(JsonPath {
            source: render(rest),
            tokens: rest.to_vec(),
        })
    }

    /// Every node the path matches, in document order.
    pub fn find(&self, root: &JsonValue) -> Vec<JsonValue> {
        if self.tokens.is_empty() {
            // Definite root path: the whole document, no walk
            return vec![root.clone()];
        }
        let mut out = Vec::new();
        collect(root, &self.tokens, &mut out);
        out
    }

    /// The single match of a definite path, if any.
    pub fn find_one(&self, root: &JsonValue) -> Option<JsonValue> {
        self.find(root).into_iter().next()
    }

    /// Append `new` at every match. A non-array target becomes the
    /// two-element array `[old, new]`; an array target is pushed to,
    /// unless `as_sibling` forces the array conversion even for arrays.
    pub fn append(&self, mut root: JsonValue, new: JsonValue, as_sibling: bool) -> JsonValue {
        log::trace!("append at '{}' (as_sibling: {})", self.source, as_sibling);
        for_each_mut(&mut root, &self.tokens, &mut |target| {
            if target.is_array() && !as_sibling {
                if let JsonValue::Array(items) = target {
                    items.push(new.clone());
                }
            } else {
                let old = target.take();
                *target = JsonValue::Array(vec![old, new.clone()]);
            }
        });
        root
    }

    /// Replace every match in place: a list splice or a map member
    /// overwrite, depending on the parent.
    pub fn replace(&self, mut root: JsonValue, new: JsonValue) -> JsonValue {
        log::trace!("replace at '{}'", self.source);
        for_each_mut(&mut root, &self.tokens, &mut |target| {
            *target = new.clone();
        });
        root
    }

    /// Remove every match from its parent. Removing the root itself
    /// empties the document.
    pub fn remove(&self, mut root: JsonValue) -> JsonValue {
        log::trace!("remove at '{}'", self.source);
        let Some((last, parents)) = self.tokens.split_last() else {
            return JsonValue::Null;
        };
        for_each_mut(&mut root, parents, &mut |parent| {
            remove_child(parent, last);
        });
        root
    }
}

fn collect(node: &JsonValue, tokens: &[PathToken], out: &mut Vec<JsonValue>) {
    let Some((first, rest)) = tokens.split_first() else {
        out.push(node.clone());
        return;
    };
    match first {
        PathToken::Key(key) => {
            if let Some(child) = node.as_object().and_then(|map| map.get(key)) {
                collect(child, rest, out);
            }
        }
        PathToken::Index(index) => {
            if let Some(child) = node.as_array().and_then(|items| items.get(*index)) {
                collect(child, rest, out);
            }
        }
        PathToken::Wildcard => match node {
            JsonValue::Array(items) => {
                for item in items {
                    collect(item, rest, out);
                }
            }
            JsonValue::Object(map) => {
                for value in map.values() {
                    collect(value, rest, out);
                }
            }
            _ => {}
        },
    }
}

fn for_each_mut(node: &mut JsonValue, tokens: &[PathToken], f: &mut impl FnMut(&mut JsonValue)) {
    let Some((first, rest)) = tokens.split_first() else {
        f(node);
        return;
    };
    match first {
        PathToken::Key(key) => {
            if let Some(child) = node.get_mut(key.as_str()) {
                for_each_mut(child, rest, f);
            }
        }
        PathToken::Index(index) => {
            if let Some(child) = node.get_mut(*index) {
                for_each_mut(child, rest, f);
            }
        }
        PathToken::Wildcard => match node {
            JsonValue::Array(items) => {
                for item in items {
                    for_each_mut(item, rest, f);
                }
            }
            JsonValue::Object(map) => {
                for (_, value) in map.iter_mut() {
                    for_each_mut(value, rest, f);
                }
            }
            _ => {}
        },
    }
}

fn remove_child(parent: &mut JsonValue, token: &PathToken) {
    match (parent, token) {
        (JsonValue::Object(map), PathToken::Key(key)) => {
            map.shift_remove(key);
        }
        (JsonValue::Array(items), PathToken::Index(index)) => {
            if *index < items.len() {
                items.remove(*index);
            }
        }
        (JsonValue::Array(items), PathToken::Wildcard) => items.clear(),
        (JsonValue::Object(map), PathToken::Wildcard) => map.clear(),
        _ => {}
    }
}

/// Canonical rendering, used when a parent path is re-derived.
fn render(tokens: &[PathToken]) -> String {
    let mut out = String::from("$");
    for token in tokens {
        match token {
            PathToken::Key(key) => {
                if key.chars().all(|c| c.is_alphanumeric() || c == '_') && !key.is_empty() {
                    out.push('.');
                    out.push_str(key);
                } else {
                    out.push_str(&format!("['{}']", key));
                }
            }
            PathToken::Index(index) => out.push_str(&format!("[{}]", index)),
            PathToken::Wildcard => out.push_str("[*]"),
        }
    }
    out
}

fn tokenize(text: &str) -> Result<Vec<PathToken>, PathError> {
    let invalid = |reason: &str| PathError {
        path: text.to_string(),
        reason: reason.to_string(),
    };

    let chars: Vec<char> = text.trim().chars().collect();
    let mut pos = 0;
    let mut tokens = Vec::new();

    if chars.is_empty() {
        return Err(invalid("empty path"));
    }

    if chars[0] == '$' {
        pos += 1;
    } else if chars[0].is_alphanumeric() || chars[0] == '_' {
        // bare leading member name
        let start = pos;
        while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
            pos += 1;
        }
        tokens.push(PathToken::Key(chars[start..pos].iter().collect()));
    } else {
        return Err(invalid("a path starts with '$' or a member name"));
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                if pos < chars.len() && chars[pos] == '*' {
                    pos += 1;
                    tokens.push(PathToken::Wildcard);
                    continue;
                }
                let start = pos;
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                if pos == start {
                    return Err(invalid("expected a member name after '.'"));
                }
                tokens.push(PathToken::Key(chars[start..pos].iter().collect()));
            }
            '[' => {
                pos += 1;
                while pos < chars.len() && chars[pos] == ' ' {
                    pos += 1;
                }
                if pos >= chars.len() {
                    return Err(invalid("unterminated '['"));
                }
                match chars[pos] {
                    quote @ ('\'' | '"') => {
                        pos += 1;
                        let start = pos;
                        while pos < chars.len() && chars[pos] != quote {
                            pos += 1;
                        }
                        if pos >= chars.len() {
                            return Err(invalid("unterminated quoted member name"));
                        }
                        tokens.push(PathToken::Key(chars[start..pos].iter().collect()));
                        pos += 1;
                    }
                    '*' => {
                        pos += 1;
                        tokens.push(PathToken::Wildcard);
                    }
                    c if c.is_ascii_digit() => {
                        let start = pos;
                        while pos < chars.len() && chars[pos].is_ascii_digit() {
                            pos += 1;
                        }
                        let digits: String = chars[start..pos].iter().collect();
                        let index = digits
                            .parse::<usize>()
                            .map_err(|_| invalid("array index out of range"))?;
                        tokens.push(PathToken::Index(index));
                    }
                    other => {
                        return Err(invalid(&format!(
                            "unexpected character '{}' inside brackets",
                            other
                        )));
                    }
                }
                while pos < chars.len() && chars[pos] == ' ' {
                    pos += 1;
                }
                if pos >= chars.len() || chars[pos] != ']' {
                    return Err(invalid("expected ']'"));
                }
                pos += 1;
            }
            other => {
                return Err(invalid(&format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_dot_and_bracket_forms() {
        let path = JsonPath::compile("$.store.book[0]['title']").unwrap();
        assert_eq!(
            path.tokens(),
            &[
                PathToken::Key("store".to_string()),
                PathToken::Key("book".to_string()),
                PathToken::Index(0),
                PathToken::Key("title".to_string()),
            ]
        );
        assert!(path.is_definite());
        assert!(!JsonPath::compile("$.store[*]").unwrap().is_definite());
    }

    #[test]
    fn rejects_untokenizable_paths() {
        assert!(JsonPath::compile("$.a..b").is_err());
        assert!(JsonPath::compile("$[abc]").is_err());
        assert!(JsonPath::compile("").is_err());
    }

    #[test]
    fn parent_drops_the_last_segment() {
        let path = JsonPath::compile("$.a.b[2]").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.source(), "$.a.b");
        assert!(JsonPath::compile("$").unwrap().parent().is_none());
    }

    #[test]
    fn append_converts_scalars_to_lists() {
        let path = JsonPath::compile("$.a").unwrap();
        let root = path.append(json!({"a": 1}), json!(2), false);
        assert_eq!(root, json!({"a": [1, 2]}));
    }

    #[test]
    fn sibling_append_wraps_existing_lists() {
        let path = JsonPath::compile("$.a").unwrap();
        let root = path.append(json!({"a": [1, 2]}), json!(3), false);
        assert_eq!(root, json!({"a": [1, 2, 3]}));
        let root = path.append(json!({"a": [1, 2]}), json!(3), true);
        assert_eq!(root, json!({"a": [[1, 2], 3]}));
    }
}
