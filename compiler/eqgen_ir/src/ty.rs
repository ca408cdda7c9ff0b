//! Structural type model.
//!
//! A [`TypeRef`] is either a reference to a named type or an anonymous
//! structural description. Every named type resolves (through the
//! [`Catalog`](crate::Catalog)) to exactly one [`StructuralKind`].

use crate::name::TypeName;

/// Primitive flavors.
///
/// Synthesis only distinguishes byte-like primitives (for the optimized
/// byte-sequence path) from everything else; the rest of the detail exists
/// for rendering and for the reference evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Byte,
    Rune,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl Primitive {
    /// Look up a primitive by its source spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Byte => "byte",
            Self::Rune => "rune",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }

    /// `byte` and its spelled-out alias `uint8`.
    #[inline]
    pub fn is_byte(self) -> bool {
        matches!(self, Self::Byte | Self::Uint8)
    }
}

/// A record field, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// The shape of a type, independent of its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Primitive(Primitive),
    Record {
        fields: Vec<Field>,
    },
    /// Variable-length sequence (slice).
    Sequence {
        element: TypeRef,
    },
    FixedArray {
        /// `None` when the length is a constant expression the front end
        /// could not evaluate. Comparison never depends on it.
        length: Option<u64>,
        element: TypeRef,
    },
    Map {
        key: TypeRef,
        value: TypeRef,
    },
    /// Reference/pointer semantics.
    Indirection {
        referent: TypeRef,
    },
    /// Interface / any-type: compared only through the generic fallback.
    Dynamic,
    /// Channel / function-like: never structurally comparable.
    Opaque,
}

impl StructuralKind {
    /// Whether values of this kind are naturally accessed by reference.
    ///
    /// Generated routines for reference-like kinds take their subject as
    /// is; value-like kinds (`Record`, `Primitive`, `FixedArray`) are taken
    /// by pointer so every routine handles identity and absence the same way.
    pub fn is_reference_like(&self) -> bool {
        match self {
            Self::Sequence { .. }
            | Self::Map { .. }
            | Self::Indirection { .. }
            | Self::Dynamic
            | Self::Opaque => true,
            Self::Primitive(_) | Self::Record { .. } | Self::FixedArray { .. } => false,
        }
    }
}

/// Identity of a type: named, or an anonymous structural description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(TypeName),
    Structural(Box<StructuralKind>),
}

impl TypeRef {
    pub fn named(module: &str, name: &str) -> Self {
        Self::Named(TypeName::new(module, name))
    }

    pub fn structural(kind: StructuralKind) -> Self {
        Self::Structural(Box::new(kind))
    }

    pub fn primitive(prim: Primitive) -> Self {
        Self::structural(StructuralKind::Primitive(prim))
    }

    pub fn record(fields: impl IntoIterator<Item = (&'static str, TypeRef)>) -> Self {
        Self::structural(StructuralKind::Record {
            fields: fields
                .into_iter()
                .map(|(name, ty)| Field::new(name, ty))
                .collect(),
        })
    }

    pub fn sequence(element: TypeRef) -> Self {
        Self::structural(StructuralKind::Sequence { element })
    }

    pub fn array(length: u64, element: TypeRef) -> Self {
        Self::structural(StructuralKind::FixedArray {
            length: Some(length),
            element,
        })
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::structural(StructuralKind::Map { key, value })
    }

    pub fn pointer(referent: TypeRef) -> Self {
        Self::structural(StructuralKind::Indirection { referent })
    }

    pub fn dynamic() -> Self {
        Self::structural(StructuralKind::Dynamic)
    }

    pub fn opaque() -> Self {
        Self::structural(StructuralKind::Opaque)
    }

    /// The structural kind, if this is not a named reference.
    pub fn as_structural(&self) -> Option<&StructuralKind> {
        match self {
            Self::Structural(kind) => Some(kind),
            Self::Named(_) => None,
        }
    }

    /// Whether this is a byte-like primitive written in place.
    ///
    /// A named type whose underlying kind is `byte` does not count: its
    /// elements go through the named type's own routine.
    pub fn is_byte(&self) -> bool {
        matches!(
            self.as_structural(),
            Some(StructuralKind::Primitive(prim)) if prim.is_byte()
        )
    }
}
