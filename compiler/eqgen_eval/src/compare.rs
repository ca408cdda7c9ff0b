//! The three primitive comparisons generated code relies on: the `==`
//! operator, generic deep equality, and byte-sequence equality.

use std::rc::Rc;

use crate::value::Value;
use crate::EvalError;

/// The `==` operator.
///
/// Pointers compare by identity. Sequences and maps are not comparable;
/// applying `==` to them is an error, as is comparing different kinds.
pub fn operator_eq(a: &Value, b: &Value) -> Result<bool, EvalError> {
    Ok(match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Uint(x), Value::Uint(y)) => x == y,
        #[expect(clippy::float_cmp, reason = "mirrors the operator, NaN included")]
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Opaque(x), Value::Opaque(y)) => x == y,
        (Value::Ptr(x), Value::Ptr(y)) => same_pointer(x.as_ref(), y.as_ref()),
        (Value::Array(xs), Value::Array(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (x, y) in xs.iter().zip(ys) {
                if !operator_eq(x, y)? {
                    return Ok(false);
                }
            }
            true
        }
        (Value::Record(xs), Value::Record(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for ((xn, x), (yn, y)) in xs.iter().zip(ys) {
                if xn != yn || !operator_eq(x, y)? {
                    return Ok(false);
                }
            }
            true
        }
        (Value::Dynamic(x), Value::Dynamic(y)) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) if x.kind_name() == y.kind_name() => operator_eq(x, y)?,
            _ => false,
        },
        (Value::Seq(_) | Value::Map(_), _) | (_, Value::Seq(_) | Value::Map(_)) => {
            return Err(EvalError::Incomparable {
                kind: if matches!(a, Value::Seq(_) | Value::Map(_)) {
                    a.kind_name()
                } else {
                    b.kind_name()
                },
            });
        }
        _ => {
            return Err(EvalError::KindMismatch {
                left: a.kind_name(),
                right: b.kind_name(),
            });
        }
    })
}

pub(crate) fn same_pointer(a: Option<&Rc<Value>>, b: Option<&Rc<Value>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Generic deep equality.
///
/// Absent and empty sequences (or maps) differ here, unlike in generated
/// code, which only compares lengths.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Seq(x), Value::Seq(y)) => match (x, y) {
            (None, None) => true,
            (Some(xs), Some(ys)) => all_deep_equal(xs, ys),
            _ => false,
        },
        (Value::Array(xs), Value::Array(ys)) => all_deep_equal(xs, ys),
        (Value::Map(x), Value::Map(y)) => match (x, y) {
            (None, None) => true,
            (Some(xs), Some(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|(key, value)| {
                        lookup(ys, key).is_some_and(|other| deep_equal(value, other))
                    })
            }
            _ => false,
        },
        (Value::Record(xs), Value::Record(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((xn, x), (yn, y))| xn == yn && deep_equal(x, y))
        }
        (Value::Ptr(x), Value::Ptr(y)) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => Rc::ptr_eq(x, y) || deep_equal(x, y),
            _ => false,
        },
        (Value::Dynamic(x), Value::Dynamic(y)) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => deep_equal(x, y),
            _ => false,
        },
        _ => operator_eq(a, b).unwrap_or(false),
    }
}

fn all_deep_equal(xs: &[Value], ys: &[Value]) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
}

/// Byte-sequence equality; an absent sequence equals an empty one.
pub fn bytes_equal(a: &Value, b: &Value) -> Result<bool, EvalError> {
    let (xs, ys) = (byte_items(a)?, byte_items(b)?);
    if xs.len() != ys.len() {
        return Ok(false);
    }
    for (x, y) in xs.iter().zip(ys) {
        if !operator_eq(x, y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn byte_items(value: &Value) -> Result<&[Value], EvalError> {
    match value {
        Value::Seq(items) => Ok(items.as_deref().unwrap_or_default()),
        other => Err(EvalError::Shape {
            expected: "sequence",
            found: other.kind_name(),
        }),
    }
}

/// Value stored under `key`, located with the `==` operator.
pub(crate) fn lookup<'v>(entries: &'v [(Value, Value)], key: &Value) -> Option<&'v Value> {
    entries
        .iter()
        .find(|(candidate, _)| operator_eq(candidate, key).unwrap_or(false))
        .map(|(_, value)| value)
}

/// Length of a sequence, map or array; absent ones have length zero.
pub(crate) fn length(value: &Value) -> Result<usize, EvalError> {
    match value {
        Value::Seq(items) => Ok(items.as_ref().map_or(0, Vec::len)),
        Value::Map(entries) => Ok(entries.as_ref().map_or(0, Vec::len)),
        Value::Array(items) => Ok(items.len()),
        Value::Str(text) => Ok(text.len()),
        other => Err(EvalError::Shape {
            expected: "sequence or map",
            found: other.kind_name(),
        }),
    }
}
