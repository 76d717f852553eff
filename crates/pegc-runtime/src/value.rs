use std::fmt::Display;

use serde::Serialize;

use crate::RcString;

/// Semantic value produced by a match.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(RcString),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
    /// Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
    /// Concatenates all strings contained in the value, used to turn lists of matched
    /// characters back into text.
    pub fn to_text(&self) -> String {
        let mut buf = String::new();
        self.text_into(&mut buf);
        buf
    }
    fn text_into(&self, buf: &mut String) {
        match self {
            Value::Str(s) => buf.push_str(s),
            Value::List(list) => {
                for value in list {
                    value.text_into(buf);
                }
            }
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => {}
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(a) => write!(f, "{a}"),
            Value::Int(a) => write!(f, "{a}"),
            Value::Float(a) => write!(f, "{a}"),
            Value::Str(a) => write!(f, "{a:?}"),
            Value::List(list) => {
                write!(f, "[")?;
                for (i, value) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

#[test]
fn test_value_text() {
    let digits = Value::List(vec!["1".into(), "2".into(), Value::Null, "3".into()]);
    assert_eq!(digits.to_text(), "123");
    assert_eq!(digits.to_string(), "[\"1\", \"2\", null, \"3\"]");
    assert_eq!(Value::Int(2).as_float(), Some(2.0));
}
