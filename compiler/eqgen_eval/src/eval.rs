//! Interpreter for generated units.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use eqgen_ir::{Builtin, Callee, Check, LoopVar, Place, Side, Subject, UnitId};
use eqgen_synth::Generation;

use crate::compare::{bytes_equal, deep_equal, length, lookup, operator_eq, same_pointer};
use crate::value::Value;
use crate::EvalError;

/// Nested routine calls deeper than this abort with
/// [`EvalError::DepthExceeded`].
pub const MAX_CALL_DEPTH: usize = 256;

pub(crate) struct Interpreter<'g> {
    generation: &'g Generation,
    depth: usize,
}

/// Loop bindings of one routine invocation.
struct Frame {
    subjects: [Value; 2],
    indices: FxHashMap<LoopVar, usize>,
    captured: FxHashMap<LoopVar, [Value; 2]>,
}

impl Frame {
    fn new(first: Value, second: Value) -> Self {
        Self {
            subjects: [first, second],
            indices: FxHashMap::default(),
            captured: FxHashMap::default(),
        }
    }
}

fn slot(side: Side) -> usize {
    match side {
        Side::First => 0,
        Side::Second => 1,
    }
}

impl<'g> Interpreter<'g> {
    pub(crate) fn new(generation: &'g Generation) -> Self {
        Self {
            generation,
            depth: 0,
        }
    }

    /// Run the routine of unit `id` with the given subjects.
    pub(crate) fn call(&mut self, id: UnitId, first: Value, second: Value) -> Result<bool, EvalError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::DepthExceeded);
        }
        let unit = self.generation.unit(id);
        tracing::trace!(unit = %unit.ty(), depth = self.depth, "call");

        if unit.subject() == Subject::ByPointer {
            let (Value::Ptr(a), Value::Ptr(b)) = (&first, &second) else {
                return Err(EvalError::Shape {
                    expected: "pointer",
                    found: if matches!(first, Value::Ptr(_)) {
                        second.kind_name()
                    } else {
                        first.kind_name()
                    },
                });
            };
            if same_pointer(a.as_ref(), b.as_ref()) {
                return Ok(true);
            }
            if a.is_none() || b.is_none() {
                return Ok(false);
            }
        }

        self.depth += 1;
        let mut frame = Frame::new(first, second);
        let result = self.run(unit.body(), &mut frame);
        self.depth -= 1;
        result
    }

    fn run(&mut self, checks: &[Check], frame: &mut Frame) -> Result<bool, EvalError> {
        for check in checks {
            if !self.check(check, frame)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check(&mut self, check: &Check, frame: &mut Frame) -> Result<bool, EvalError> {
        match check {
            Check::Eq(place) => {
                let (a, b) = both(place, frame)?;
                operator_eq(&a, &b)
            }
            Check::LenEq(place) => {
                let (a, b) = both(place, frame)?;
                Ok(length(&a)? == length(&b)?)
            }
            Check::Call { callee, arg } => {
                let (a, b) = both(arg, frame)?;
                match callee {
                    Callee::Unit(id) => self.call(*id, a, b),
                    Callee::Builtin(Builtin::DeepEqual) => Ok(deep_equal(&a, &b)),
                    Callee::Builtin(Builtin::BytesEqual) => bytes_equal(&a, &b),
                }
            }
            Check::NilGuard { place, then } => {
                let (a, b) = both(place, frame)?;
                let (Value::Ptr(a), Value::Ptr(b)) = (&a, &b) else {
                    return Err(EvalError::Shape {
                        expected: "pointer",
                        found: a.kind_name(),
                    });
                };
                if same_pointer(a.as_ref(), b.as_ref()) {
                    return Ok(true);
                }
                if a.is_none() || b.is_none() {
                    return Ok(false);
                }
                self.run(then, frame)
            }
            Check::ForIndex { index, over, body } => {
                let over = eval_place(over, Side::First, frame)?;
                for i in 0..length(&over)? {
                    frame.indices.insert(*index, i);
                    if !self.run(body, frame)? {
                        return Ok(false);
                    }
                }
                frame.indices.remove(index);
                Ok(true)
            }
            Check::ForKey {
                key,
                over,
                capture,
                body,
            } => {
                let (a, b) = both(over, frame)?;
                let entries = map_entries(&a)?;
                let others = map_entries(&b)?;
                for (k, first) in entries {
                    let Some(second) = lookup(others, k) else {
                        return Ok(false);
                    };
                    if *capture {
                        frame
                            .captured
                            .insert(*key, [first.clone(), second.clone()]);
                        if !self.run(body, frame)? {
                            return Ok(false);
                        }
                    }
                }
                frame.captured.remove(key);
                Ok(true)
            }
        }
    }
}

fn map_entries(value: &Value) -> Result<&[(Value, Value)], EvalError> {
    match value {
        Value::Map(entries) => Ok(entries.as_deref().unwrap_or_default()),
        other => Err(EvalError::Shape {
            expected: "map",
            found: other.kind_name(),
        }),
    }
}

fn both(place: &Place, frame: &Frame) -> Result<(Value, Value), EvalError> {
    Ok((
        eval_place(place, Side::First, frame)?,
        eval_place(place, Side::Second, frame)?,
    ))
}

fn eval_place(place: &Place, side: Side, frame: &Frame) -> Result<Value, EvalError> {
    match place {
        Place::Subject => Ok(frame.subjects[slot(side)].clone()),
        Place::Field(base, name) => {
            let base = eval_place(base, side, frame)?;
            base.field(name)
                .cloned()
                .ok_or_else(|| EvalError::MissingField { name: name.clone() })
        }
        Place::Index(base, var) => {
            let base = eval_place(base, side, frame)?;
            let i = *frame
                .indices
                .get(var)
                .ok_or(EvalError::Unbound { var: *var })?;
            let items = match &base {
                Value::Seq(Some(items)) | Value::Array(items) => items.as_slice(),
                Value::Seq(None) => &[],
                other => {
                    return Err(EvalError::Shape {
                        expected: "sequence",
                        found: other.kind_name(),
                    });
                }
            };
            items
                .get(i)
                .cloned()
                .ok_or(EvalError::OutOfRange { index: i, len: items.len() })
        }
        Place::MapValue(_, key) => frame
            .captured
            .get(key)
            .map(|values| values[slot(side)].clone())
            .ok_or(EvalError::Unbound { var: *key }),
        Place::Deref(base) => match eval_place(base, side, frame)? {
            Value::Ptr(Some(target)) => Ok(target.as_ref().clone()),
            Value::Ptr(None) => Err(EvalError::NilDeref),
            other => Err(EvalError::Shape {
                expected: "pointer",
                found: other.kind_name(),
            }),
        },
        Place::AddrOf(base) => Ok(Value::Ptr(Some(Rc::new(eval_place(base, side, frame)?)))),
    }
}
