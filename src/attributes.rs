//! Closed attribute maps produced by rule decorators.
//!
//! A grammar declares a whitelist of legal attribute names; every map a
//! decorator emits is checked against that whitelist eagerly, so a stray key
//! is caught during the parse that produced it rather than when the host
//! reads the output.

use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The attribute map attached to a derived node.
pub type Attributes = HashMap<String, AttrValue>;

/// Attribute names reserved for node bookkeeping. A grammar's
/// `legal_attributes` whitelist must be disjoint from these.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "name",
    "start",
    "end",
    "terminals",
    "support",
    "score",
    "priority",
    "group",
];

/// A single decorator-produced attribute value.
///
/// # Examples
///
/// ```rust
/// use trellis::attributes::AttrValue;
/// let v = AttrValue::Num(3.0);
/// assert_eq!(v.type_name(), "Num");
/// assert_eq!(v.as_num(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Seq(Vec<AttrValue>),
}

impl AttrValue {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "Str",
            AttrValue::Num(_) => "Num",
            AttrValue::Bool(_) => "Bool",
            AttrValue::Seq(_) => "Seq",
        }
    }

    /// Returns the contained string if this is a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained number if this is a `Num` value.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained sequence if this is a `Seq` value.
    pub fn as_seq(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Num(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(items: Vec<AttrValue>) -> Self {
        AttrValue::Seq(items)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Num(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Seq(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
