//! Transparent forwarding wrapper that records every call it forwards.

use crate::interaction::{CallError, CallResult};
use crate::repository::InteractionRepository;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const UNDEFINED_METHOD: &str = "UndefinedMethod";

/// Callback handed along with a call, forwarded untouched.
pub type Block<'a> = &'a mut dyn FnMut(&[Value]) -> CallResult;

/// Open-ended call surface: any method name can be dispatched.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, method: &str, args: &[Value], block: Option<Block<'_>>) -> CallResult;
    fn responds_to(&self, method: &str) -> bool;

    fn call(&self, method: &str, args: Vec<Value>) -> CallResult {
        self.dispatch(method, &args, None)
    }
}

pub fn undefined_method(method: &str) -> CallError {
    CallError::new(UNDEFINED_METHOD, format!("undefined method `{method}`"))
}

/// Wraps any `Dispatch`, recording every call and its outcome under a fake
/// name before the result reaches the caller.
pub struct RecordingProxy {
    instance: Arc<dyn Dispatch>,
    fake_name: String,
    repository: Arc<dyn InteractionRepository>,
}

impl RecordingProxy {
    pub fn new(
        instance: Arc<dyn Dispatch>,
        fake_name: impl Into<String>,
        repository: Arc<dyn InteractionRepository>,
    ) -> Self {
        Self {
            instance,
            fake_name: fake_name.into(),
            repository,
        }
    }

    pub fn fake_name(&self) -> &str {
        &self.fake_name
    }

    /// `==` is a call like any other: forwarded and recorded.
    pub fn equals(&self, other: Value) -> Result<bool, CallError> {
        self.dispatch("==", &[other], None).map(|v| v.is_truthy())
    }
}

impl Dispatch for RecordingProxy {
    fn dispatch(&self, method: &str, args: &[Value], block: Option<Block<'_>>) -> CallResult {
        let instance = &self.instance;
        self.repository.record(
            &self.fake_name,
            method,
            args.to_vec(),
            Box::new(move || instance.dispatch(method, args, block)),
        )
    }

    fn responds_to(&self, method: &str) -> bool {
        self.instance.responds_to(method)
    }
}

/// Scripted `Dispatch` for tests: canned results per method, calls logged.
#[derive(Default, Clone)]
pub struct FakeDispatch {
    responses: Arc<Mutex<HashMap<String, CallResult>>>,
    calls: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl FakeDispatch {
    pub fn respond(&self, method: &str, result: CallResult) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(method.to_string(), result);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Dispatch for FakeDispatch {
    fn dispatch(&self, method: &str, args: &[Value], block: Option<Block<'_>>) -> CallResult {
        self.calls
            .lock()
            .expect("calls lock")
            .push((method.to_string(), args.to_vec()));
        let scripted = self
            .responses
            .lock()
            .expect("responses lock")
            .get(method)
            .cloned();
        match (scripted, block) {
            (Some(result), _) => result,
            (None, Some(block)) => block(args),
            (None, None) => Err(undefined_method(method)),
        }
    }

    fn responds_to(&self, method: &str) -> bool {
        self.responses
            .lock()
            .expect("responses lock")
            .contains_key(method)
    }
}
