use mimic::config::{load_config, ConfigOverrides};
use mimic::logging::JsonlLogger;
use mimic::proxy::{undefined_method, Block, Dispatch, FakeDispatch};
use mimic::runtime::ProductionFileSystem;
use mimic::{
    CallError, CallResult, InMemoryInteractionRepository, Interaction, InteractionRepository,
    Matcher, Outcome, RecordingProxy, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── helpers ───────────────────────────────────────────────────────────────────

/// Real collaborator with a side effect, so double execution would show.
#[derive(Default)]
struct Greeter {
    greetings: AtomicUsize,
}

impl Dispatch for Greeter {
    fn dispatch(&self, method: &str, args: &[Value], block: Option<Block<'_>>) -> CallResult {
        match (method, args) {
            ("greet", [Value::Str(name)]) => {
                self.greetings.fetch_add(1, Ordering::SeqCst);
                Ok(Value::str(format!("hi {name}")))
            }
            ("fetch", [Value::Integer(id)]) => {
                Err(CallError::new("NotFound", format!("no record {id}")))
            }
            ("each_greeting", []) => match block {
                Some(block) => block(&[Value::str("hi")]),
                None => Err(CallError::new("ArgumentError", "block required")),
            },
            ("==", [other]) => Ok(Value::Bool(matches!(other, Value::Symbol(s) if s == "greeter"))),
            _ => Err(undefined_method(method)),
        }
    }

    fn responds_to(&self, method: &str) -> bool {
        matches!(method, "greet" | "fetch" | "each_greeting" | "==")
    }
}

fn setup() -> (Arc<Greeter>, Arc<InMemoryInteractionRepository>, RecordingProxy) {
    let greeter = Arc::new(Greeter::default());
    let repo = Arc::new(InMemoryInteractionRepository::new());
    let proxy = RecordingProxy::new(greeter.clone(), "greeter", repo.clone());
    (greeter, repo, proxy)
}

// ── scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn greet_is_forwarded_once_and_recorded_with_its_value() {
    let (greeter, repo, proxy) = setup();

    let result = proxy.call("greet", vec![Value::str("x")]);

    assert_eq!(result, Ok(Value::str("hi x")));
    assert_eq!(greeter.greetings.load(Ordering::SeqCst), 1);
    let recorded = repo.for_fake("greeter");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method(), "greet");
    assert_eq!(recorded[0].args(), &[Value::str("x")]);
    assert!(matches!(
        recorded[0].outcome(),
        Outcome::Returned(Value::Str(s)) if s == "hi x"
    ));
}

#[test]
fn fetch_error_is_recorded_and_propagates_unchanged() {
    let (_, repo, proxy) = setup();

    let err = proxy
        .call("fetch", vec![Value::Integer(1)])
        .expect_err("fetch raises");

    assert_eq!(err, CallError::new("NotFound", "no record 1"));
    let recorded = repo.for_fake("greeter");
    assert_eq!(recorded.len(), 1);
    match recorded[0].outcome() {
        Outcome::Raised(class) => assert_eq!(class.as_str(), "NotFound"),
        other => panic!("unexpected outcome {other}"),
    }
    assert!(repo.recorded(
        "greeter",
        &Interaction::with_result("fetch", vec![Value::Integer(1)], || {
            Err(CallError::new("NotFound", "any message"))
        })
    ));
}

#[test]
fn recorded_calls_answer_stub_queries() {
    let (_, repo, proxy) = setup();
    let _ = proxy.call("greet", vec![Value::str("ada")]);

    assert!(repo.recorded("greeter", &Interaction::new("greet", vec![Value::str("ada")])));
    assert!(repo.recorded(
        "greeter",
        &Interaction::new("greet", vec![Value::Matcher(Matcher::Anything)])
    ));
    assert!(!repo.recorded(
        "greeter",
        &Interaction::with_result("greet", vec![Value::str("ada")], || Ok(Value::str("hello")))
    ));
}

#[test]
fn block_parameter_is_forwarded() {
    let (_, repo, proxy) = setup();
    let mut seen = Vec::new();
    let mut block = |args: &[Value]| -> CallResult {
        seen.extend_from_slice(args);
        Ok(Value::Nil)
    };

    let result = proxy.dispatch("each_greeting", &[], Some(&mut block));

    assert_eq!(result, Ok(Value::Nil));
    assert_eq!(seen, vec![Value::str("hi")]);
    assert_eq!(repo.for_method("greeter", "each_greeting").len(), 1);
}

#[test]
fn capability_queries_reflect_the_wrapped_instance() {
    let (_, repo, proxy) = setup();
    assert!(proxy.responds_to("greet"));
    assert!(!proxy.responds_to("shout"));
    assert!(repo.is_empty());
}

#[test]
fn equality_goes_through_the_wrapped_instance() {
    let (_, repo, proxy) = setup();
    assert_eq!(proxy.equals(Value::sym("greeter")), Ok(true));
    assert_eq!(proxy.equals(Value::sym("stranger")), Ok(false));
    assert_eq!(repo.for_method("greeter", "==").len(), 2);
}

#[test]
fn nested_proxies_record_at_every_layer() {
    let repo = Arc::new(InMemoryInteractionRepository::new());
    let inner = Arc::new(RecordingProxy::new(
        Arc::new(Greeter::default()),
        "inner",
        repo.clone(),
    ));
    let outer = RecordingProxy::new(inner, "outer", repo.clone());

    assert_eq!(outer.call("greet", vec![Value::str("y")]), Ok(Value::str("hi y")));
    assert_eq!(repo.for_fake("inner").len(), 1);
    assert_eq!(repo.for_fake("outer").len(), 1);
}

#[test]
fn scripted_instance_can_stand_in_for_a_real_one() {
    let script = FakeDispatch::default();
    script.respond("ping", Ok(Value::sym("pong")));
    let repo = Arc::new(InMemoryInteractionRepository::new());
    let proxy = RecordingProxy::new(Arc::new(script.clone()), "pinger", repo.clone());

    assert_eq!(proxy.call("ping", vec![]), Ok(Value::sym("pong")));
    assert_eq!(script.calls(), vec![("ping".to_string(), Vec::new())]);
    assert!(repo.recorded("pinger", &Interaction::new("ping", vec![])));
}

#[test]
fn configured_repository_writes_an_interaction_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("logs").join("interactions.jsonl");
    let cfg = load_config(
        &ConfigOverrides {
            log_path: Some(log_path.clone()),
            ..ConfigOverrides::default()
        },
        &ProductionFileSystem,
    )
    .expect("load config");
    let repo = Arc::new(InMemoryInteractionRepository::from_config(
        &cfg,
        Arc::new(ProductionFileSystem),
    ));
    let proxy = RecordingProxy::new(Arc::new(Greeter::default()), "greeter", repo.clone());

    let _ = proxy.call("greet", vec![Value::str("x")]);
    let _ = proxy.call("fetch", vec![Value::Integer(1)]);

    let text = std::fs::read_to_string(&log_path).expect("read log");
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["payload"]["method"], "greet");
    assert_eq!(lines[0]["payload"]["outcome"]["type"], "returned");
    assert_eq!(lines[1]["payload"]["outcome"]["class"], "NotFound");
    assert!(lines[1]["payload"]["seq"].as_u64() > lines[0]["payload"]["seq"].as_u64());
}

#[test]
fn explicit_logger_can_be_attached() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("explicit.jsonl");
    let repo = InMemoryInteractionRepository::new().with_logger(JsonlLogger::new(&path));

    let result = repo.record("store", "put", vec![Value::sym("k")], Box::new(|| Ok(Value::Nil)));

    assert_eq!(result, Ok(Value::Nil));
    let text = std::fs::read_to_string(&path).expect("read log");
    assert!(text.contains("\"event_type\":\"interaction_recorded\""));
}
