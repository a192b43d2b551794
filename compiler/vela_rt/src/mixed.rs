use crate::{Array, ArrayKey, IntoArrayKey, NormalizedKey, RuntimeValue};

/// Dynamically tagged value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Mixed {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Array<Mixed>),
}

impl Mixed {
    pub fn to_bool(&self) -> bool {
        match self {
            Mixed::Null => false,
            Mixed::Bool(b) => *b,
            Mixed::Int(i) => *i != 0,
            Mixed::Float(f) => *f != 0.0,
            Mixed::Str(s) => !(s.is_empty() || s == "0"),
            Mixed::Array(a) => a.to_bool(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Mixed::Null => "null",
            Mixed::Bool(_) => "boolean",
            Mixed::Int(_) => "integer",
            Mixed::Float(_) => "double",
            Mixed::Str(_) => "string",
            Mixed::Array(_) => "array",
        }
    }
}

impl RuntimeValue for Mixed {
    fn is_null(&self) -> bool {
        matches!(self, Mixed::Null)
    }

    fn estimate_memory_usage(&self) -> usize {
        match self {
            Mixed::Str(s) => s.estimate_memory_usage(),
            Mixed::Array(a) => a.estimate_memory_usage(),
            _ => 0,
        }
    }
}

/// Null indexes the empty string; arrays are not valid keys.
impl IntoArrayKey for &Mixed {
    fn into_array_key(self) -> NormalizedKey {
        match self {
            Mixed::Null => NormalizedKey::Key(ArrayKey::Str(String::new())),
            Mixed::Bool(b) => b.into_array_key(),
            Mixed::Int(i) => i.into_array_key(),
            Mixed::Float(f) => f.into_array_key(),
            Mixed::Str(s) => s.as_str().into_array_key(),
            Mixed::Array(_) => {
                tracing::warn!("illegal offset type array");
                NormalizedKey::Illegal
            }
        }
    }
}

impl From<i64> for Mixed {
    fn from(value: i64) -> Self {
        Mixed::Int(value)
    }
}

impl From<f64> for Mixed {
    fn from(value: f64) -> Self {
        Mixed::Float(value)
    }
}

impl From<bool> for Mixed {
    fn from(value: bool) -> Self {
        Mixed::Bool(value)
    }
}

impl From<&str> for Mixed {
    fn from(value: &str) -> Self {
        Mixed::Str(value.to_string())
    }
}

impl From<String> for Mixed {
    fn from(value: String) -> Self {
        Mixed::Str(value)
    }
}

impl From<Array<Mixed>> for Mixed {
    fn from(value: Array<Mixed>) -> Self {
        Mixed::Array(value)
    }
}

impl<T: Into<Mixed>> From<Option<T>> for Mixed {
    fn from(value: Option<T>) -> Self {
        value.map_or(Mixed::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn null_key_is_empty_string() {
        let mut a: Array<Mixed> = Array::new();
        a.set_value(&Mixed::Null, Mixed::from(1_i64));
        assert_eq!(a.get_value(""), Mixed::Int(1));
    }

    #[test]
    fn numeric_string_mixed_key_is_int() {
        let mut a: Array<Mixed> = Array::new();
        a.set_value(&Mixed::from("7"), Mixed::from(true));
        assert!(a.has_key(7));
    }

    #[test]
    fn array_key_is_rejected() {
        let mut a: Array<Mixed> = Array::new();
        let key = Mixed::from(Array::<Mixed>::new());
        a.set_value(&key, Mixed::Null);
        assert!(a.is_empty());
        assert!(!a.has_key(&key));
    }

    #[test]
    fn nested_arrays_are_values() {
        let inner: Array<Mixed> = vec![Mixed::from(1_i64), Mixed::from("x")].into();
        let mut outer: Array<Mixed> = Array::new();
        outer.set_value("inner", Mixed::from(inner.clone()));
        assert_eq!(outer.get_value("inner"), Mixed::Array(inner));
        assert!(outer.get_value("inner").to_bool());
        assert_eq!(outer.get_value("missing").type_name(), "null");
    }

    #[test]
    fn isset_ignores_stored_null() {
        let mut a: Array<Mixed> = Array::new();
        a.set_value("n", Mixed::Null);
        assert!(a.has_key("n"));
        assert!(!a.isset("n"));
    }

    #[test]
    fn truthiness() {
        assert!(!Mixed::from("0").to_bool());
        assert!(Mixed::from("0.0").to_bool());
        assert!(!Mixed::from(None::<i64>).to_bool());
        assert!(Mixed::Float(0.5).to_bool());
    }
}
