use std::fmt;

use crate::error::{Error, Result};
use crate::validate::require_non_blank;
use crate::value::Value;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Object field lookup by name.
    Field(String),
    /// Array element lookup by position.
    Index(usize),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field(name) => write!(f, "{name}"),
            Token::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A compiled state path: getter and setter over nested [`Value`]s.
///
/// Syntax: dot-separated field names; all-digit segments and bracketed
/// numeric segments address array elements. `"a.b.c"`, `"list.0.name"`
/// and `"list[0].name"` are all valid. An optional leading `state` root
/// segment is accepted and stripped, so `"state.one"` addresses the
/// field `one` of the root (a root field literally named `state` is
/// written `"state.state"`).
///
/// Compilation rejects malformed path strings; whether the path actually
/// resolves is a property of a concrete state value, checked by
/// [`Path::get`] or [`Path::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    tokens: Vec<Token>,
}

impl Path {
    /// Compile a path string into its token sequence.
    ///
    /// Errors: empty/whitespace-only path or empty segment →
    /// [`Error::EmptyValue`]; non-numeric or unterminated bracket →
    /// [`Error::Type`]. Both are validation errors, raised before any
    /// resolution against state is attempted.
    pub fn compile(path: &str) -> Result<Path> {
        require_non_blank("path", path)?;

        let mut tokens = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(Error::EmptyValue(format!(
                    "path '{path}' contains an empty segment"
                )));
            }
            parse_segment(path, segment, &mut tokens)?;
        }

        // The conventional root identifier addresses the state itself.
        if tokens.first() == Some(&Token::Field("state".into())) {
            tokens.remove(0);
        }

        Ok(Path {
            raw: path.to_string(),
            tokens,
        })
    }

    /// The original path string this was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Resolve the value at this path in `state`.
    ///
    /// Walks token by token; a missing field, out-of-range index, or a
    /// token applied to a value of the wrong shape fails with
    /// [`Error::PathNotFound`] naming the failing segment.
    pub fn get(&self, state: &Value) -> Result<Value> {
        let mut current = state;
        for token in &self.tokens {
            let next = match token {
                Token::Field(name) => current.get(name),
                Token::Index(i) => current.index(*i),
            };
            current = next.ok_or_else(|| Error::PathNotFound {
                path: self.raw.clone(),
                segment: token.to_string(),
            })?;
        }
        Ok(current.clone())
    }

    /// Produce a new state with `value` placed at this path.
    ///
    /// The input state is never mutated: every ancestor container on the
    /// path is shallow-cloned, and untouched sibling subtrees stay
    /// structurally shared (Arc) with the input. An empty path (the bare
    /// root) replaces the whole state.
    pub fn set(&self, value: Value, state: &Value) -> Result<Value> {
        self.set_at(&self.tokens, value, state)
    }

    fn set_at(&self, tokens: &[Token], value: Value, state: &Value) -> Result<Value> {
        let (token, rest) = match tokens.split_first() {
            None => return Ok(value),
            Some(split) => split,
        };

        let not_found = || Error::PathNotFound {
            path: self.raw.clone(),
            segment: token.to_string(),
        };

        match (token, state) {
            (Token::Field(name), Value::Object(map)) => {
                let child = map.get(name).ok_or_else(not_found)?;
                let new_child = self.set_at(rest, value, child)?;
                // Clones of container children are Arc bumps, so every
                // sibling subtree is shared with the input state.
                let mut map = (**map).clone();
                map.insert(name.clone(), new_child);
                Ok(Value::Object(std::sync::Arc::new(map)))
            }
            (Token::Index(i), Value::Array(items)) => {
                let child = items.get(*i).ok_or_else(not_found)?;
                let new_child = self.set_at(rest, value, child)?;
                let mut items = (**items).clone();
                items[*i] = new_child;
                Ok(Value::Array(std::sync::Arc::new(items)))
            }
            _ => Err(not_found()),
        }
    }

    /// True iff the path compiles and resolves against `state`.
    ///
    /// Used once, at registration/subscription time, to reject
    /// unresolvable paths eagerly rather than at first change.
    pub fn validate(path: &str, state: &Value) -> bool {
        match Path::compile(path) {
            Ok(compiled) => compiled.get(state).is_ok(),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse one dot-delimited segment, which may carry bracket suffixes:
/// `name`, `name[0]`, `name[0][1]`, `[0]`, or an all-digit index.
fn parse_segment(path: &str, segment: &str, out: &mut Vec<Token>) -> Result<()> {
    let (head, mut brackets) = match segment.find('[') {
        Some(i) => (&segment[..i], &segment[i..]),
        None => (segment, ""),
    };

    if !head.is_empty() {
        if head.bytes().all(|b| b.is_ascii_digit()) {
            let index = head.parse().map_err(|_| index_too_large(path, head))?;
            out.push(Token::Index(index));
        } else {
            out.push(Token::Field(head.to_string()));
        }
    } else if brackets.is_empty() {
        return Err(Error::EmptyValue(format!(
            "path '{path}' contains an empty segment"
        )));
    }

    while !brackets.is_empty() {
        let close = brackets.find(']').ok_or_else(|| {
            Error::Type(format!("path '{path}': unterminated '[' in segment '{segment}'"))
        })?;
        let inner = &brackets[1..close];
        if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Type(format!(
                "path '{path}': bracket segment '[{inner}]' is not a numeric index"
            )));
        }
        let index = inner.parse().map_err(|_| index_too_large(path, inner))?;
        out.push(Token::Index(index));

        brackets = &brackets[close + 1..];
        if !brackets.is_empty() && !brackets.starts_with('[') {
            return Err(Error::Type(format!(
                "path '{path}': unexpected text after ']' in segment '{segment}'"
            )));
        }
    }

    Ok(())
}

fn index_too_large(path: &str, digits: &str) -> Error {
    Error::Type(format!("path '{path}': index '{digits}' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> Value {
        Value::from(json!({
            "one": "one",
            "two": "two",
            "three": {"four": "four"},
            "list": [{"name": "a"}, {"name": "b"}],
        }))
    }

    // ====================================================================
    // Compilation
    // ====================================================================

    #[test]
    fn compile_dotted_fields() {
        let p = Path::compile("three.four").unwrap();
        assert_eq!(p.raw(), "three.four");
    }

    #[test]
    fn compile_strips_state_root() {
        let p = Path::compile("state.one").unwrap();
        assert_eq!(p.get(&state()).unwrap().as_str(), Some("one"));
    }

    #[test]
    fn compile_bare_state_addresses_root() {
        let p = Path::compile("state").unwrap();
        assert_eq!(p.get(&state()).unwrap(), state());
    }

    #[test]
    fn compile_rejects_empty_and_whitespace() {
        assert_eq!(Path::compile("").unwrap_err().code(), "EMPTY_VALUE");
        assert_eq!(Path::compile("   ").unwrap_err().code(), "EMPTY_VALUE");
    }

    #[test]
    fn compile_rejects_empty_segment() {
        assert_eq!(Path::compile("a..b").unwrap_err().code(), "EMPTY_VALUE");
        assert_eq!(Path::compile("a.b.").unwrap_err().code(), "EMPTY_VALUE");
        assert_eq!(Path::compile(".a").unwrap_err().code(), "EMPTY_VALUE");
    }

    #[test]
    fn compile_rejects_non_numeric_bracket() {
        assert_eq!(Path::compile("list[x]").unwrap_err().code(), "TYPE");
        assert_eq!(Path::compile("list[]").unwrap_err().code(), "TYPE");
    }

    #[test]
    fn compile_rejects_unterminated_bracket() {
        assert_eq!(Path::compile("list[0").unwrap_err().code(), "TYPE");
    }

    #[test]
    fn compile_rejects_trailing_garbage_after_bracket() {
        assert_eq!(Path::compile("list[0]x").unwrap_err().code(), "TYPE");
    }

    // ====================================================================
    // Get
    // ====================================================================

    #[test]
    fn get_nested_field() {
        let p = Path::compile("three.four").unwrap();
        assert_eq!(p.get(&state()).unwrap().as_str(), Some("four"));
    }

    #[test]
    fn get_numeric_dot_segment() {
        let p = Path::compile("list.0.name").unwrap();
        assert_eq!(p.get(&state()).unwrap().as_str(), Some("a"));
    }

    #[test]
    fn get_bracket_segment() {
        let p = Path::compile("list[1].name").unwrap();
        assert_eq!(p.get(&state()).unwrap().as_str(), Some("b"));
    }

    #[test]
    fn get_missing_field_names_failing_segment() {
        let p = Path::compile("path.does.not.exist").unwrap();
        let err = p.get(&state()).unwrap_err();
        assert_eq!(err.code(), "PATH_NOT_FOUND");
        assert!(err.to_string().contains("path.does.not.exist"));
        assert!(err.to_string().contains("'path'"));
    }

    #[test]
    fn get_index_out_of_range_is_not_found() {
        let p = Path::compile("list.5.name").unwrap();
        assert_eq!(p.get(&state()).unwrap_err().code(), "PATH_NOT_FOUND");
    }

    #[test]
    fn get_field_on_scalar_is_not_found() {
        let p = Path::compile("one.deeper").unwrap();
        assert_eq!(p.get(&state()).unwrap_err().code(), "PATH_NOT_FOUND");
    }

    // ====================================================================
    // Set
    // ====================================================================

    #[test]
    fn set_replaces_terminal_value() {
        let p = Path::compile("three.four").unwrap();
        let next = p.set(Value::from("FOUR"), &state()).unwrap();
        assert_eq!(p.get(&next).unwrap().as_str(), Some("FOUR"));
    }

    #[test]
    fn set_does_not_mutate_input() {
        let before = state();
        let p = Path::compile("one").unwrap();
        let _ = p.set(Value::from("ONE"), &before).unwrap();
        assert_eq!(before.get("one").unwrap().as_str(), Some("one"));
    }

    #[test]
    fn set_clones_ancestors_and_shares_siblings() {
        let before = state();
        let p = Path::compile("three.four").unwrap();
        let after = p.set(Value::from("FOUR"), &before).unwrap();

        // Every ancestor of the modified location is a fresh container.
        assert!(!after.ptr_eq(&before));
        assert!(!after.get("three").unwrap().ptr_eq(before.get("three").unwrap()));
        // Sibling subtrees off the path are shared, not copied.
        assert!(after.get("list").unwrap().ptr_eq(before.get("list").unwrap()));
    }

    #[test]
    fn set_array_element_shares_untouched_elements() {
        let before = state();
        let p = Path::compile("list.0.name").unwrap();
        let after = p.set(Value::from("A"), &before).unwrap();

        assert_eq!(after.get("list").unwrap().index(0).unwrap().get("name").unwrap().as_str(), Some("A"));
        assert!(after
            .get("list")
            .unwrap()
            .index(1)
            .unwrap()
            .ptr_eq(before.get("list").unwrap().index(1).unwrap()));
    }

    #[test]
    fn set_missing_location_is_not_found() {
        let p = Path::compile("three.five").unwrap();
        assert_eq!(
            p.set(Value::Null, &state()).unwrap_err().code(),
            "PATH_NOT_FOUND"
        );
    }

    #[test]
    fn set_bare_root_replaces_whole_state() {
        let p = Path::compile("state").unwrap();
        let next = p.set(Value::from(1), &state()).unwrap();
        assert_eq!(next, Value::Int(1));
    }

    // ====================================================================
    // Validate
    // ====================================================================

    #[test]
    fn validate_true_for_resolvable_paths() {
        assert!(Path::validate("one", &state()));
        assert!(Path::validate("state.one", &state()));
        assert!(Path::validate("list[1].name", &state()));
    }

    #[test]
    fn validate_false_for_unresolvable_or_malformed() {
        assert!(!Path::validate("path.does.not.exist", &state()));
        assert!(!Path::validate("a..b", &state()));
        assert!(!Path::validate("", &state()));
    }
}
