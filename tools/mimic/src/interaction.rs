//! One observed or declared call: method, arguments and captured outcome.

use crate::matching::{Comparator, Mismatch};
use crate::value::{write_joined, Value};
use std::fmt;
use thiserror::Error;

/// Category of a raised error. Outcomes compare by class, never by message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorClass(String);

impl ErrorClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised by a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class}: {message}")]
pub struct CallError {
    pub class: ErrorClass,
    pub message: String,
}

impl CallError {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: ErrorClass::new(class),
            message: message.into(),
        }
    }

    pub fn of_class(class: impl Into<String>) -> Self {
        Self::new(class, String::new())
    }
}

pub type CallResult = Result<Value, CallError>;

#[derive(Debug, Clone)]
pub enum Outcome {
    /// No producer was given, so the interaction constrains no result.
    Absent,
    Returned(Value),
    Raised(ErrorClass),
}

impl Outcome {
    pub fn from_result(result: &CallResult) -> Self {
        match result {
            Ok(value) => Self::Returned(value.clone()),
            Err(error) => Self::Raised(error.class.clone()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn returned(&self) -> Option<&Value> {
        match self {
            Self::Returned(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Returned(value) => write!(f, "returned {value}"),
            Self::Raised(class) => write!(f, "raised {class}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    method: String,
    args: Vec<Value>,
    outcome: Outcome,
}

impl Interaction {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            outcome: Outcome::Absent,
        }
    }

    /// Invokes `producer` exactly once. A raised error becomes the outcome
    /// instead of propagating.
    pub fn with_result<F>(method: impl Into<String>, args: Vec<Value>, producer: F) -> Self
    where
        F: FnOnce() -> CallResult,
    {
        let result = producer();
        Self::from_call_result(method, args, &result)
    }

    pub fn from_call_result(
        method: impl Into<String>,
        args: Vec<Value>,
        result: &CallResult,
    ) -> Self {
        Self {
            method: method.into(),
            args,
            outcome: Outcome::from_result(result),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn has_result(&self) -> bool {
        !self.outcome.is_absent()
    }

    pub fn same(recorded: &Interaction, stubbed: &Interaction) -> bool {
        Comparator::default().same_interactions(recorded, stubbed)
    }

    pub fn explain(recorded: &Interaction, stubbed: &Interaction) -> Result<(), Mismatch> {
        Comparator::default().compare_interactions(recorded, stubbed)
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method)?;
        write_joined(f, self.args.iter())?;
        write!(f, ") -> {}", self.outcome)
    }
}
