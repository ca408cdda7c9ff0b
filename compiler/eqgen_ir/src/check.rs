//! Comparison IR.
//!
//! The body of a generated routine is a sequence of [`Check`]s. Each check
//! means "if this does not hold, the two values are not equal": the routine
//! returns not-equal at the first failing check and equal if every check
//! passes.

use crate::place::{LoopVar, Place};

/// Index of a generated unit in the session arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct UnitId(u32);

impl UnitId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a generated routine receives its subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    /// The subject is passed as is (reference-like kinds).
    ByValue,
    /// The subject is passed by pointer (value-like kinds); the routine
    /// opens with an identity short-circuit and an either-absent check.
    ByPointer,
}

/// External equality routines the generated code may call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
    /// Generic reflective deep equality, for dynamic (interface) values.
    DeepEqual,
    /// Optimized byte-sequence equality.
    BytesEqual,
}

/// Target of a call check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Callee {
    /// Another generated routine, by arena index. Resolved to a name only at
    /// emission, so a routine can be called before its body is complete.
    Unit(UnitId),
    Builtin(Builtin),
}

/// One comparison statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Check {
    /// Direct value equality of the two sides.
    Eq(Place),
    /// Length equality of two sequences or maps.
    LenEq(Place),
    /// Call `callee` with both sides of `arg`; not equal when it says so.
    Call { callee: Callee, arg: Place },
    /// Pointer guard on `place`: equal if both sides are the same reference
    /// (including both absent), not equal if exactly one side is absent,
    /// otherwise run `then`.
    NilGuard { place: Place, then: Vec<Check> },
    /// Loop over the indices of `over` (sequence or array).
    ForIndex {
        index: LoopVar,
        over: Place,
        body: Vec<Check>,
    },
    /// Loop over the keys of map `over`, requiring each key to be present on
    /// the other side. With `capture`, both values are bound (see
    /// [`Place::MapValue`]) and `body` compares them.
    ForKey {
        key: LoopVar,
        over: Place,
        capture: bool,
        body: Vec<Check>,
    },
}

impl Check {
    /// Nested checks, if any.
    pub fn children(&self) -> &[Check] {
        match self {
            Self::NilGuard { then: body, .. }
            | Self::ForIndex { body, .. }
            | Self::ForKey { body, .. } => body,
            Self::Eq(_) | Self::LenEq(_) | Self::Call { .. } => &[],
        }
    }
}
