//! Reference evaluator for generated equality routines.
//!
//! Executes the comparison IR of a [`Generation`] directly over in-memory
//! [`Value`]s, with the semantics the rendered source has. Used to check
//! behavioral properties of generated routines without compiling them.

mod compare;
mod error;
mod eval;
mod value;

use eqgen_ir::TypeName;
use eqgen_synth::Generation;

pub use compare::{bytes_equal, deep_equal, operator_eq};
pub use error::EvalError;
pub use eval::MAX_CALL_DEPTH;
pub use value::Value;

/// Run the generated routine for `ty` on `first` and `second`.
///
/// Routines of value-like types take their subjects by pointer, so callers
/// pass [`Value::Ptr`] for those.
pub fn equal(
    generation: &Generation,
    ty: &TypeName,
    first: &Value,
    second: &Value,
) -> Result<bool, EvalError> {
    let id = generation
        .find(ty)
        .ok_or_else(|| EvalError::UnknownType { name: ty.clone() })?;
    eval::Interpreter::new(generation).call(id, first.clone(), second.clone())
}

#[cfg(test)]
mod tests;
