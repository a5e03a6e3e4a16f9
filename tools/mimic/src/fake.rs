//! Fake entities: doubles that carry their own table of declared stubs.

use crate::interaction::{CallResult, Interaction};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Re-invocable outcome producer attached to a stub.
pub type Producer = Arc<dyn Fn() -> CallResult + Send + Sync>;

#[derive(Clone)]
pub struct Stub {
    pub method: String,
    pub args: Vec<Value>,
    pub producer: Producer,
}

impl Stub {
    pub fn new(
        method: impl Into<String>,
        args: Vec<Value>,
        producer: impl Fn() -> CallResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            args,
            producer: Arc::new(producer),
        }
    }

    /// Builds an interaction by invoking the producer afresh.
    pub fn to_interaction(&self) -> Interaction {
        let producer = Arc::clone(&self.producer);
        Interaction::with_result(self.method.clone(), self.args.clone(), move || producer())
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("method", &self.method)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// What the comparator needs to know about a fake.
///
/// `None` from either accessor marks the entity as malformed; comparisons
/// involving it never match.
pub trait FakeEntity: fmt::Debug + Send + Sync {
    fn fake_name(&self) -> &str;
    /// The type this fake stands in for.
    fn identity_tag(&self) -> Option<&str>;
    fn stubs(&self) -> Option<Vec<Stub>>;
}

#[derive(Debug)]
pub struct Fake {
    name: String,
    identity_tag: Option<String>,
    stubs: Mutex<Vec<Stub>>,
}

impl Fake {
    pub fn new(name: impl Into<String>, identity_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity_tag: Some(identity_tag.into()),
            stubs: Mutex::new(Vec::new()),
        }
    }

    pub fn untagged(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity_tag: None,
            stubs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stub(
        self,
        method: impl Into<String>,
        args: Vec<Value>,
        producer: impl Fn() -> CallResult + Send + Sync + 'static,
    ) -> Self {
        self.stub(method, args, producer);
        self
    }

    /// Declares a stub; usable after the fake is shared, e.g. for a fake
    /// whose stub returns the fake itself.
    pub fn stub(
        &self,
        method: impl Into<String>,
        args: Vec<Value>,
        producer: impl Fn() -> CallResult + Send + Sync + 'static,
    ) {
        self.stubs
            .lock()
            .expect("stubs lock")
            .push(Stub::new(method, args, producer));
    }

    /// Shorthand for a no-argument stub returning a fixed value, the common
    /// `fake(result: 1)` shape.
    pub fn returning(self, method: impl Into<String>, value: Value) -> Self {
        self.with_stub(method, Vec::new(), move || Ok(value.clone()))
    }

    pub fn into_value(self) -> Value {
        Value::Fake(Arc::new(self))
    }
}

impl FakeEntity for Fake {
    fn fake_name(&self) -> &str {
        &self.name
    }

    fn identity_tag(&self) -> Option<&str> {
        self.identity_tag.as_deref()
    }

    fn stubs(&self) -> Option<Vec<Stub>> {
        Some(self.stubs.lock().expect("stubs lock").clone())
    }
}
