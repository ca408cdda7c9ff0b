//! Runtime values.
//!
//! Mirrors the structural kinds: absent sequences, maps and pointers are
//! `None`. Pointers are shared through [`Rc`], and two pointers are the
//! same pointer exactly when [`Rc::ptr_eq`] says so.

use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// `None` is the nil sequence.
    Seq(Option<Vec<Value>>),
    Array(Vec<Value>),
    /// Entries in iteration order. `None` is the nil map.
    Map(Option<Vec<(Value, Value)>>),
    Record(Vec<(String, Value)>),
    Ptr(Option<Rc<Value>>),
    /// Interface value; `None` is the nil interface.
    Dynamic(Option<Box<Value>>),
    /// Channel or function handle, equal only to itself.
    Opaque(u64),
}

impl Value {
    pub fn ptr(value: Value) -> Self {
        Self::Ptr(Some(Rc::new(value)))
    }

    pub fn nil_ptr() -> Self {
        Self::Ptr(None)
    }

    pub fn str(text: &str) -> Self {
        Self::Str(text.to_owned())
    }

    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Seq(Some(items.into_iter().collect()))
    }

    pub fn ints(items: impl IntoIterator<Item = i64>) -> Self {
        Self::seq(items.into_iter().map(Value::Int))
    }

    pub fn bytes(items: &[u8]) -> Self {
        Self::seq(items.iter().map(|&b| Value::Uint(u64::from(b))))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Map(Some(entries.into_iter().collect()))
    }

    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        )
    }

    pub fn dynamic(value: Value) -> Self {
        Self::Dynamic(Some(Box::new(value)))
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Ptr(_) => "pointer",
            Self::Dynamic(_) => "dynamic",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Seq(None) | Self::Map(None) | Self::Ptr(None) | Self::Dynamic(None) => {
                f.write_str("nil")
            }
            Self::Seq(Some(items)) | Self::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(Some(entries)) => {
                f.write_str("map[")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            Self::Record(fields) => {
                f.write_str("{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
            Self::Ptr(Some(inner)) => write!(f, "&{inner}"),
            Self::Dynamic(Some(inner)) => write!(f, "{inner}"),
            Self::Opaque(id) => write!(f, "opaque#{id}"),
        }
    }
}
