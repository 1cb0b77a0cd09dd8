use std::fmt::{Display, Formatter};
use std::str::FromStr;
use wasmtime::{Val, ValType};

/// Numeric value types a benchmark export may take or return.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Kind {
    I32,
    I64,
    F32,
    F64,
}

impl Kind {
    pub(crate) fn from_val_type(ty: &ValType) -> Option<Self> {
        match ty {
            ValType::I32 => Some(Kind::I32),
            ValType::I64 => Some(Kind::I64),
            ValType::F32 => Some(Kind::F32),
            ValType::F64 => Some(Kind::F64),
            _ => None,
        }
    }

    /// Placeholder used to size the result buffer of a call.
    pub(crate) fn zero(self) -> Val {
        match self {
            Kind::I32 => Val::I32(0),
            Kind::I64 => Val::I64(0),
            Kind::F32 => Val::F32(0),
            Kind::F64 => Val::F64(0),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::I32 => write!(f, "i32"),
            Kind::I64 => write!(f, "i64"),
            Kind::F32 => write!(f, "f32"),
            Kind::F64 => write!(f, "f64"),
        }
    }
}

/// Render an engine value type, falling back to its debug form for non-numeric types.
pub(crate) fn type_name(ty: &ValType) -> String {
    match Kind::from_val_type(ty) {
        Some(kind) => kind.to_string(),
        None => format!("{ty:?}"),
    }
}

/// A numeric WebAssembly value.
///
/// Floats compare by their bit pattern, so a result is only equal to an
/// expectation when the engine produced exactly the same number.
#[derive(Debug, Copy, Clone)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
        }
    }

    pub(crate) fn to_val(self) -> Val {
        match self {
            Value::I32(v) => Val::I32(v),
            Value::I64(v) => Val::I64(v),
            Value::F32(v) => Val::F32(v.to_bits()),
            Value::F64(v) => Val::F64(v.to_bits()),
        }
    }

    pub(crate) fn from_val(val: &Val) -> Option<Self> {
        match val {
            Val::I32(v) => Some(Value::I32(*v)),
            Val::I64(v) => Some(Value::I64(*v)),
            Val::F32(bits) => Some(Value::F32(f32::from_bits(*bits))),
            Val::F64(bits) => Some(Value::F64(f64::from_bits(*bits))),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown value type '{0}', expected one of i32, i64, f32, f64")]
    UnknownKind(String),
    #[error("invalid {kind} literal '{literal}'")]
    InvalidLiteral { kind: Kind, literal: String },
}

impl FromStr for Value {
    type Err = ParseError;

    /// Parses `<type>:<literal>` (e.g. `i64:7`, `f64:2.5`). A bare literal is an
    /// `i32`, or an `f64` if it contains a `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, literal) = match s.split_once(':') {
            Some(("i32", lit)) => (Kind::I32, lit),
            Some(("i64", lit)) => (Kind::I64, lit),
            Some(("f32", lit)) => (Kind::F32, lit),
            Some(("f64", lit)) => (Kind::F64, lit),
            Some((other, _)) => return Err(ParseError::UnknownKind(other.to_string())),
            None if s.contains('.') => (Kind::F64, s),
            None => (Kind::I32, s),
        };

        let invalid = || ParseError::InvalidLiteral {
            kind,
            literal: literal.to_string(),
        };
        let literal = literal.trim();
        match kind {
            Kind::I32 => literal.parse().map(Value::I32).map_err(|_| invalid()),
            Kind::I64 => literal.parse().map(Value::I64).map_err(|_| invalid()),
            Kind::F32 => literal.parse().map(Value::F32).map_err(|_| invalid()),
            Kind::F64 => literal.parse().map(Value::F64).map_err(|_| invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_ne!(Value::I32(1), Value::I64(1));
    }

    #[test]
    fn val_conversion_keeps_bits() {
        let v = Value::F32(1.5);
        assert_eq!(Value::from_val(&v.to_val()), Some(v));
        assert_eq!(Value::from_val(&Val::I64(-3)), Some(Value::I64(-3)));
    }

    #[test]
    fn parse() {
        assert_eq!("40".parse::<Value>(), Ok(Value::I32(40)));
        assert_eq!("2.5".parse::<Value>(), Ok(Value::F64(2.5)));
        assert_eq!("i64:-7".parse::<Value>(), Ok(Value::I64(-7)));
        assert_eq!("f32:0.25".parse::<Value>(), Ok(Value::F32(0.25)));
        assert_eq!(
            "u8:1".parse::<Value>(),
            Err(ParseError::UnknownKind("u8".to_string()))
        );
        assert!(matches!(
            "i32:x".parse::<Value>(),
            Err(ParseError::InvalidLiteral { kind: Kind::I32, .. })
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Value::I32(55).to_string(), "55");
        assert_eq!(Value::F64(1.5).to_string(), "1.5");
        assert_eq!(Kind::F64.to_string(), "f64");
    }
}
