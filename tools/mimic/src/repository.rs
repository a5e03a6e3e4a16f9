//! Append-only store of recorded interactions, keyed by fake name.

use crate::config::{MatchingConfig, MimicConfig, DEFAULT_VALUE_HASH_THRESHOLD};
use crate::interaction::{CallResult, Interaction};
use crate::logging::{JsonlLogger, LogEvent};
use crate::matching::Comparator;
use crate::recording::InteractionRecord;
use crate::runtime::FileSystem;
use crate::value::Value;
use std::sync::{Arc, Mutex};

pub type OutcomeProducer<'a> = Box<dyn FnOnce() -> CallResult + 'a>;

pub trait InteractionRepository: Send + Sync {
    /// Runs `producer` once, stores the interaction, and hands back exactly
    /// what the producer returned.
    fn record(
        &self,
        fake_name: &str,
        method: &str,
        args: Vec<Value>,
        producer: OutcomeProducer<'_>,
    ) -> CallResult;
}

#[derive(Debug, Clone)]
pub struct RecordedInteraction {
    pub fake_name: String,
    pub interaction: Interaction,
}

#[derive(Debug)]
pub struct InMemoryInteractionRepository {
    entries: Mutex<Vec<RecordedInteraction>>,
    matching: MatchingConfig,
    logger: Option<JsonlLogger>,
    value_hash_threshold: usize,
}

impl Default for InMemoryInteractionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryInteractionRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            matching: MatchingConfig::default(),
            logger: None,
            value_hash_threshold: DEFAULT_VALUE_HASH_THRESHOLD,
        }
    }

    pub fn from_config(cfg: &MimicConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            matching: cfg.matching.clone(),
            logger: JsonlLogger::from_config(&cfg.recording, fs),
            value_hash_threshold: cfg.recording.value_hash_threshold,
        }
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn for_fake(&self, fake_name: &str) -> Vec<Interaction> {
        self.entries
            .lock()
            .expect("entries lock")
            .iter()
            .filter(|e| e.fake_name == fake_name)
            .map(|e| e.interaction.clone())
            .collect()
    }

    /// Whether any interaction recorded for `fake_name` matches `stubbed`.
    pub fn recorded(&self, fake_name: &str, stubbed: &Interaction) -> bool {
        let comparator = Comparator::new(self.matching.clone());
        self.for_fake(fake_name)
            .iter()
            .any(|recorded| comparator.same_interactions(recorded, stubbed))
    }

    /// Recorded interactions for `fake_name` with the given method, in order.
    pub fn for_method(&self, fake_name: &str, method: &str) -> Vec<Interaction> {
        self.for_fake(fake_name)
            .into_iter()
            .filter(|i| i.method() == method)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("entries lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        self.entries.lock().expect("entries lock").clear();
    }

    fn log(&self, fake_name: &str, interaction: &Interaction) {
        let Some(logger) = &self.logger else {
            return;
        };
        let record = InteractionRecord::capture(fake_name, interaction, self.value_hash_threshold);
        let Ok(payload) = serde_json::to_value(&record) else {
            return;
        };
        let _ = logger.append(&LogEvent {
            level: "info",
            event_type: "interaction_recorded",
            payload,
        });
    }
}

impl InteractionRepository for InMemoryInteractionRepository {
    fn record(
        &self,
        fake_name: &str,
        method: &str,
        args: Vec<Value>,
        producer: OutcomeProducer<'_>,
    ) -> CallResult {
        // The producer may record into this repository itself, so it runs
        // before the lock is taken.
        let result = producer();
        let interaction = Interaction::from_call_result(method, args, &result);
        self.log(fake_name, &interaction);
        self.entries
            .lock()
            .expect("entries lock")
            .push(RecordedInteraction {
                fake_name: fake_name.to_string(),
                interaction,
            });
        result
    }
}
