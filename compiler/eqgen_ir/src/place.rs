//! Access-path IR.
//!
//! A [`Place`] names one logical position inside the two compared values.
//! It is side-agnostic: the same place is rendered once for each operand.
//! Places are small expression trees rather than strings, so bookkeeping
//! such as "which loop indices are already in scope" is a tree walk and can
//! never be confused by an identifier that happens to look like `[key1]`.

use std::fmt;

/// Which operand of the comparison a rendering is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    /// 1-based ordinal used in generated identifiers.
    #[inline]
    pub fn ordinal(self) -> u32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

/// Family of auxiliary loop identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Sequence / array element index (`i1`, `i2`, ...).
    Index,
    /// Map key (`key1`, `key2`, ...).
    Key,
}

impl Family {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Index => "i",
            Self::Key => "key",
        }
    }
}

/// An auxiliary loop identifier: family plus 1-based number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopVar {
    pub family: Family,
    pub n: u32,
}

impl LoopVar {
    #[inline]
    pub fn new(family: Family, n: u32) -> Self {
        Self { family, n }
    }
}

impl fmt::Display for LoopVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.n)
    }
}

/// A position inside the compared values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Place {
    /// The whole subject of the routine.
    Subject,
    /// `base.name`
    Field(Box<Place>, String),
    /// `base[index]` for a sequence or array.
    Index(Box<Place>, LoopVar),
    /// The value stored under `key` in map `base`, captured while iterating
    /// that map. Rendered as the captured identifier, never as a second
    /// lookup.
    MapValue(Box<Place>, LoopVar),
    /// The value a pointer place refers to.
    Deref(Box<Place>),
    /// Address of an addressable place.
    AddrOf(Box<Place>),
}

impl Place {
    pub fn field(&self, name: &str) -> Self {
        Self::Field(Box::new(self.clone()), name.to_owned())
    }

    pub fn index(&self, var: LoopVar) -> Self {
        Self::Index(Box::new(self.clone()), var)
    }

    pub fn map_value(&self, key: LoopVar) -> Self {
        Self::MapValue(Box::new(self.clone()), key)
    }

    pub fn deref(&self) -> Self {
        Self::Deref(Box::new(self.clone()))
    }

    pub fn addr_of(&self) -> Self {
        Self::AddrOf(Box::new(self.clone()))
    }

    /// The inner place, `None` for [`Place::Subject`].
    pub fn base(&self) -> Option<&Place> {
        match self {
            Self::Subject => None,
            Self::Field(base, _)
            | Self::Index(base, _)
            | Self::MapValue(base, _)
            | Self::Deref(base)
            | Self::AddrOf(base) => Some(base),
        }
    }
}
