//! Runtime value representation.
//!
//! Every binding owns its value outright: there is no reference aliasing
//! between distinct variables, so assignment always deep-copies containers.
//! This keeps the tree of values acyclic and needs no garbage collector.

use std::fmt;

use indexmap::IndexMap;

/// The numeric tolerance used when comparing two `Number` values for equality.
pub const NUMBER_EQ_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Number(f64),
    String(String),
    Bool(bool),
    Array(Vec<Value>),
    /// Insertion-ordered string-keyed map; last write to a key wins.
    Dict(IndexMap<String, Value>),
    /// Handle into the interpreter's function registry.
    Function(String),
    /// Opaque handle issued by the `Graphics` host capability.
    Window(u64),
    Module(ModuleValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleValue {
    pub name: String,
    pub exports: IndexMap<String, Value>,
}

impl Value {
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null | Self::Undefined => false,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Array(items) => !items.is_empty(),
            Self::Dict(map) => !map.is_empty(),
            Self::Function(_) | Self::Window(_) | Self::Module(_) => true,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Function(_) => "function",
            Self::Window(_) => "window",
            Self::Module(_) => "module",
        }
    }

    /// Equality used by `==`/`!=`. Numbers compare within [`NUMBER_EQ_TOLERANCE`];
    /// mixed types are never equal except where both sides are numeric-ish.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => (a - b).abs() < NUMBER_EQ_TOLERANCE,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Dict(a), Self::Dict(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| v.loose_eq(bv)))
            }
            _ => false,
        }
    }

    /// Strict equality used by `===`/`!==`: types must match in addition to [`Self::loose_eq`].
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other) && self.loose_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Dict(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if matches!(v, Self::String(_)) {
                        write!(f, "{k}: \"{v}\"")?;
                    } else {
                        write!(f, "{k}: {v}")?;
                    }
                }
                f.write_str("}")
            }
            Self::Function(name) => write!(f, "<function {name}>"),
            Self::Window(id) => write!(f, "<window #{id}>"),
            Self::Module(m) => write!(f, "<module {}>", m.name),
        }
    }
}

/// Integer-valued doubles render without a decimal point; otherwise the
/// shortest precise decimal representation is used.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_copy_on_clone() {
        let a = Value::Array(vec![Value::Number(1.0)]);
        let mut b = a.clone();
        if let Value::Array(items) = &mut b {
            items[0] = Value::Number(9.0);
        }
        assert_eq!(a, Value::Array(vec![Value::Number(1.0)]));
    }

    #[test]
    fn numeric_tolerance_equality() {
        let a = Value::Number(0.1 + 0.2);
        let b = Value::Number(0.3);
        assert!(a.loose_eq(&b));
    }

    #[test]
    fn integer_valued_number_renders_without_point() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.5), "3.5");
    }

    #[test]
    fn array_and_dict_render() {
        let arr = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(arr.to_string(), "[1, 2]");

        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Number(1.0));
        map.insert("b".to_string(), Value::String("x".to_string()));
        assert_eq!(Value::Dict(map).to_string(), r#"{a: 1, b: "x"}"#);
    }

    #[test]
    fn strict_vs_loose_equality() {
        let n = Value::Number(1.0);
        let s = Value::String("1".to_string());
        assert!(!n.loose_eq(&s));
    }
}
