//! Dynamic argument and return values.
//!
//! Calls flowing through a double carry values of any shape, so they are
//! modelled as one closed enum. Matchers, the default-value placeholder and
//! nested fakes are ordinary variants; the comparators in
//! [`crate::matching`] decide what they mean.

use crate::fake::FakeEntity;
use crate::matcher::Matcher;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A caller-defined value with its own notion of equality.
pub trait CustomValue: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;
    fn equals(&self, other: &dyn CustomValue) -> bool;
    fn as_any(&self) -> &dyn std::any::Any;

    fn render(&self) -> String {
        format!("{self:?}")
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    /// Keyword-style arguments when in last position.
    Map(BTreeMap<String, Value>),
    /// A type or error category passed around as plain data.
    Class(String),
    /// Placeholder meaning "the caller may omit or override this argument".
    Default,
    Matcher(Matcher),
    Fake(Arc<dyn FakeEntity>),
    Object(Arc<dyn CustomValue>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Integer,
    Float,
    Str,
    Symbol,
    List,
    Map,
    Class,
    Default,
    Matcher,
    Fake,
    Object(String),
}

impl ValueKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Str => "str",
            Self::Symbol => "symbol",
            Self::List => "list",
            Self::Map => "map",
            Self::Class => "class",
            Self::Default => "default",
            Self::Matcher => "matcher",
            Self::Fake => "fake",
            Self::Object(name) => name,
        }
    }
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn sym(value: impl Into<String>) -> Self {
        Self::Symbol(value.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    pub fn object(value: impl CustomValue + 'static) -> Self {
        Self::Object(Arc::new(value))
    }

    pub fn fake(entity: Arc<dyn FakeEntity>) -> Self {
        Self::Fake(entity)
    }

    /// Builds a keyword mapping from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Nil => ValueKind::Nil,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::Symbol(_) => ValueKind::Symbol,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Class(_) => ValueKind::Class,
            Self::Default => ValueKind::Default,
            Self::Matcher(_) => ValueKind::Matcher,
            Self::Fake(_) => ValueKind::Fake,
            Self::Object(object) => ValueKind::Object(object.type_name().to_string()),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn as_matcher(&self) -> Option<&Matcher> {
        match self {
            Self::Matcher(matcher) => Some(matcher),
            _ => None,
        }
    }

    pub fn as_fake(&self) -> Option<&Arc<dyn FakeEntity>> {
        match self {
            Self::Fake(entity) => Some(entity),
            _ => None,
        }
    }

    /// `Nil` and `Bool(false)` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Nil => serde_json::Value::Null,
            Self::Bool(value) => json!(value),
            Self::Integer(value) => json!(value),
            Self::Float(value) => json!(value),
            Self::Str(value) => json!(value),
            Self::Symbol(value) => json!({ "symbol": value }),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Class(name) => json!({ "class": name }),
            Self::Default => json!({ "default": true }),
            Self::Matcher(matcher) => json!({ "matcher": matcher.to_string() }),
            Self::Fake(entity) => json!({
                "fake": entity.fake_name(),
                "identity_tag": entity.identity_tag(),
            }),
            Self::Object(object) => json!({
                "object": object.type_name(),
                "repr": object.render(),
            }),
        }
    }
}

/// Plain equality. Fakes compare by identity here; structural equivalence
/// of fakes lives in the comparator.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Default, Self::Default) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Matcher(a), Self::Matcher(b)) => a == b,
            (Self::Fake(a), Self::Fake(b)) => same_allocation(a, b),
            (Self::Object(a), Self::Object(b)) => a.equals(b.as_ref()),
            _ => false,
        }
    }
}

pub(crate) fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Symbol(value) => write!(f, ":{value}"),
            Self::List(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Class(name) => f.write_str(name),
            Self::Default => f.write_str("DefaultValue"),
            Self::Matcher(matcher) => write!(f, "{matcher}"),
            Self::Fake(entity) => write!(f, "<fake {}>", entity.fake_name()),
            Self::Object(object) => f.write_str(&object.render()),
        }
    }
}

pub(crate) fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Matcher> for Value {
    fn from(value: Matcher) -> Self {
        Self::Matcher(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}
