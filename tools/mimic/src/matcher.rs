//! Argument matchers used on the stubbed side of a comparison.

use crate::value::{Value, ValueKind};
use std::fmt;
use std::sync::Arc;

/// Capability shared by every matcher: "does this concrete value satisfy me".
pub trait ArgumentMatcher: fmt::Debug + Send + Sync {
    fn matches(&self, candidate: &Value) -> bool;

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

pub type ArgsPredicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Matcher {
    /// Accepts any argument list.
    AnyArgs,
    /// Tests the whole argument list at once.
    WithArguments(ArgsPredicate),
    /// Accepts any single argument.
    Anything,
    Satisfies(ValuePredicate),
    SameClass(ValueKind),
    Custom(Arc<dyn ArgumentMatcher>),
}

impl Matcher {
    pub fn with_arguments(predicate: impl Fn(&[Value]) -> bool + Send + Sync + 'static) -> Self {
        Self::WithArguments(Arc::new(predicate))
    }

    pub fn satisfies(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Satisfies(Arc::new(predicate))
    }

    pub fn same_class(kind: ValueKind) -> Self {
        Self::SameClass(kind)
    }

    pub fn custom(matcher: impl ArgumentMatcher + 'static) -> Self {
        Self::Custom(Arc::new(matcher))
    }

    /// Whole-call matchers replace positional comparison when they are the
    /// only stubbed argument.
    pub fn is_call_matcher(&self) -> bool {
        matches!(self, Self::AnyArgs | Self::WithArguments(_))
    }

    pub fn matches_args(&self, args: &[Value]) -> bool {
        match self {
            Self::AnyArgs => true,
            Self::WithArguments(predicate) => predicate(args),
            _ => match args {
                [single] => self.matches(single),
                _ => false,
            },
        }
    }
}

impl ArgumentMatcher for Matcher {
    fn matches(&self, candidate: &Value) -> bool {
        match self {
            Self::AnyArgs | Self::Anything => true,
            Self::WithArguments(predicate) => predicate(std::slice::from_ref(candidate)),
            Self::Satisfies(predicate) => predicate(candidate),
            Self::SameClass(kind) => candidate.kind() == *kind,
            Self::Custom(matcher) => matcher.matches(candidate),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AnyArgs, Self::AnyArgs) | (Self::Anything, Self::Anything) => true,
            (Self::WithArguments(a), Self::WithArguments(b)) => crate::value::same_allocation(a, b),
            (Self::Satisfies(a), Self::Satisfies(b)) => crate::value::same_allocation(a, b),
            (Self::SameClass(a), Self::SameClass(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => crate::value::same_allocation(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyArgs => f.write_str("AnyArgs"),
            Self::WithArguments(_) => f.write_str("WithArguments(..)"),
            Self::Anything => f.write_str("Anything"),
            Self::Satisfies(_) => f.write_str("Satisfies(..)"),
            Self::SameClass(kind) => write!(f, "SameClass({})", kind.as_str()),
            Self::Custom(matcher) => f.write_str(&matcher.describe()),
        }
    }
}
