//! Runtime values and their coercion rules.

use std::fmt;

/// A dynamically typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Array(Vec<Value>),
    /// Result of calls that produce nothing, such as `print`.
    Nil,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Array(_) => "array",
            Value::Nil => "nil",
        }
    }

    /// Numeric coercion: numbers pass through, strings must parse fully as a
    /// float, everything else is not coercible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Equality used by `==` and `!=`.
    ///
    /// When either side is a number the other side is numerically coerced,
    /// so `"3" == 3` holds. Two strings compare by text and two booleans by
    /// identity. Any other pairing, arrays included, is not equal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), b) | (b, Value::Number(a)) => b.as_number() == Some(*a),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(
            Value::Array(vec![Value::Number(1.0), Value::from("a")]).to_string(),
            "[1, a]"
        );
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Number(7.0).as_number(), Some(7.0));
        assert_eq!(Value::from("3").as_number(), Some(3.0));
        assert_eq!(Value::from("-1.5e2").as_number(), Some(-150.0));
        assert_eq!(Value::from("abc").as_number(), None);
        assert_eq!(Value::from("3 ").as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::Array(vec![]).as_number(), None);
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::from("3").loose_eq(&Value::Number(3.0)));
        assert!(Value::Number(3.0).loose_eq(&Value::from("3")));
        assert!(!Value::Number(3.0).loose_eq(&Value::from("three")));
        assert!(Value::from("a").loose_eq(&Value::from("a")));
        assert!(!Value::from("a").loose_eq(&Value::from("b")));
        assert!(Value::Bool(false).loose_eq(&Value::Bool(false)));
        assert!(!Value::Bool(true).loose_eq(&Value::from("true")));
        assert!(!Value::Array(vec![]).loose_eq(&Value::Array(vec![])));
        assert!(!Value::Nil.loose_eq(&Value::Nil));
    }
}
