use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A dynamically-typed value held by a [`crate::Cell`] or produced by
/// evaluating an expression tree.
///
/// Operator semantics follow loose scripting-language rules: booleans
/// coerce to 0/1 in numeric positions, `add` concatenates when either side
/// is a string, and numeric operations on non-numeric values yield NaN
/// instead of failing. Equality comes in two strengths: [`Value::loose_eq`]
/// compares numerically across `Bool`/`Int`/`Float`, while the `PartialEq`
/// impl is strict (same variant, equal payload).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
}

impl Value {
    /// Truthiness: `false`, `0`, `0.0`, NaN, and the empty string are falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric view of this value, if it has one. Booleans count as 0/1;
    /// strings do not coerce.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Loose equality: numeric variants compare by value across kinds,
    /// strings compare only with strings.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Str(_), _) | (_, Value::Str(_)) => false,
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Strict equality: same variant and equal payload.
    pub fn strict_eq(&self, other: &Value) -> bool {
        self == other
    }

    /// Ordering used by the comparison operators and by cell bounds.
    ///
    /// Numeric values order numerically (exact when both are integers),
    /// strings order lexicographically, and everything else is
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => None,
            _ => {
                if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
                    return Some(a.cmp(&b));
                }
                self.as_number()?.partial_cmp(&other.as_number()?)
            }
        }
    }

    /// `+`: string concatenation when either side is a string, otherwise
    /// numeric addition (integer when both sides are integral).
    pub fn add(&self, other: &Value) -> Value {
        if matches!(self, Value::Str(_)) || matches!(other, Value::Str(_)) {
            return Value::from(format!("{self}{other}"));
        }
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => Value::Int(a.wrapping_add(b)),
            _ => numeric(self, other, |a, b| a + b),
        }
    }

    /// `-`
    pub fn sub(&self, other: &Value) -> Value {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => Value::Int(a.wrapping_sub(b)),
            _ => numeric(self, other, |a, b| a - b),
        }
    }

    /// `*`
    pub fn mul(&self, other: &Value) -> Value {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => Value::Int(a.wrapping_mul(b)),
            _ => numeric(self, other, |a, b| a * b),
        }
    }

    /// `/`: always floating-point, so `1 / 2` is `0.5` and division by zero
    /// yields an infinity or NaN rather than a panic.
    pub fn div(&self, other: &Value) -> Value {
        numeric(self, other, |a, b| a / b)
    }

    /// `%`: integer remainder when both sides are integral and the divisor
    /// is nonzero, floating-point remainder otherwise.
    pub fn rem(&self, other: &Value) -> Value {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            if b != 0 {
                return Value::Int(a.wrapping_rem(b));
            }
        }
        numeric(self, other, |a, b| a % b)
    }

    /// Unary `-`.
    pub fn neg(&self) -> Value {
        match self {
            Value::Bool(b) => Value::Int(-(*b as i64)),
            Value::Int(i) => Value::Int(i.wrapping_neg()),
            Value::Float(f) => Value::Float(-f),
            Value::Str(_) => Value::Float(f64::NAN),
        }
    }
}

fn numeric(a: &Value, b: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match (a.as_number(), b.as_number()) {
        (Some(a), Some(b)) => Value::Float(f(a, b)),
        _ => Value::Float(f64::NAN),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Rc::from(v.as_str()))
    }
}
