use eqgen_ir::{LoopVar, TypeName};

/// Evaluation failure: the values do not have the shape the generated
/// routine expects, or the routine cannot be found.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("no routine was generated for `{name}`")]
    UnknownType { name: TypeName },

    #[error("expected a {expected} value, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot compare {left} with {right}")]
    KindMismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("{kind} values are not comparable with `==`")]
    Incomparable { kind: &'static str },

    #[error("record has no field `{name}`")]
    MissingField { name: String },

    #[error("`{var}` is not bound")]
    Unbound { var: LoopVar },

    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("nil dereference")]
    NilDeref,

    #[error("call depth limit exceeded")]
    DepthExceeded,
}
