//! Resolved property values.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A fully resolved property value.
///
/// Values are dynamically typed so that a single validation pass can cover
/// every property a build unit declares, whatever its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a path.
    pub fn as_path(&self) -> Option<&Path> {
        self.as_str().map(Path::new)
    }

    /// Get the value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            a: Value,
            b: Value,
            c: Value,
        }

        let doc: Doc = toml::from_str("a = \"x\"\nb = [1, 2]\nc = true\n").unwrap();
        assert_eq!(doc.a, Value::from("x"));
        assert_eq!(doc.b, Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(doc.c, Value::Bool(true));
    }

    #[test]
    fn test_value_display() {
        let v = Value::from(vec!["a", "b"]);
        assert_eq!(v.to_string(), "[\"a\", \"b\"]");
        assert_eq!(v.type_name(), "list");
    }
}
