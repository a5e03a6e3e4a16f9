//! Equivalence of recorded and stubbed interactions.
//!
//! # Overview
//!
//! Matching runs in three layers that call back into each other.
//! Interactions compare the method name first, then the outcome, then the
//! arguments. Arguments drop recorded default placeholders and then either
//! defer to a whole-call matcher or compare position by position, looking
//! through lists and keyword mappings. Two fakes are equivalent when every
//! stub of the recorded one finds a matching stub on the stubbed one.
//!
//! Entity comparison re-enters the interaction layer for each stub, so a
//! fake returning another fake is compared all the way down. A mismatch is
//! an ordinary result, never an error.

mod arguments;
mod entities;

pub use arguments::without_defaults;

use crate::config::MatchingConfig;
use crate::interaction::{Interaction, Outcome};
use std::cell::{Cell, RefCell};
use std::fmt;

/// Why two interactions did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Method {
        recorded: String,
        stubbed: String,
    },
    Outcome {
        recorded: String,
        stubbed: String,
    },
    ArgumentCount {
        recorded: usize,
        stubbed: usize,
    },
    Argument {
        position: usize,
        recorded: String,
        stubbed: String,
    },
    CallMatcher {
        matcher: String,
    },
    EntityTag {
        recorded: String,
        stubbed: String,
    },
    /// A fake without identity tag or stub table.
    EntityMalformed {
        fake_name: String,
    },
    EntityStub {
        fake_name: String,
        method: String,
    },
    EntityDepth {
        limit: usize,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method { recorded, stubbed } => {
                write!(f, "method differs: recorded {recorded}, stubbed {stubbed}")
            }
            Self::Outcome { recorded, stubbed } => {
                write!(f, "outcome differs: recorded {recorded}, stubbed {stubbed}")
            }
            Self::ArgumentCount { recorded, stubbed } => write!(
                f,
                "argument count differs: recorded {recorded}, stubbed {stubbed}"
            ),
            Self::Argument {
                position,
                recorded,
                stubbed,
            } => write!(
                f,
                "argument {position} differs: recorded {recorded}, stubbed {stubbed}"
            ),
            Self::CallMatcher { matcher } => write!(f, "arguments rejected by {matcher}"),
            Self::EntityTag { recorded, stubbed } => {
                write!(f, "fake doubles {recorded}, expected {stubbed}")
            }
            Self::EntityMalformed { fake_name } => {
                write!(f, "fake {fake_name} has no identity tag or stub table")
            }
            Self::EntityStub { fake_name, method } => {
                write!(f, "stub {method} of fake {fake_name} has no counterpart")
            }
            Self::EntityDepth { limit } => {
                write!(f, "fake nesting deeper than {limit} levels")
            }
        }
    }
}

/// Compares interactions, arguments and fake entities.
///
/// Holds the entity pairs currently under comparison so a fake graph with a
/// cycle terminates. Not shareable across threads; build one per query.
#[derive(Debug, Default)]
pub struct Comparator {
    config: MatchingConfig,
    in_progress: RefCell<Vec<(usize, usize)>>,
    depth: Cell<usize>,
}

impl Comparator {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            in_progress: RefCell::new(Vec::new()),
            depth: Cell::new(0),
        }
    }

    pub fn same_interactions(&self, recorded: &Interaction, stubbed: &Interaction) -> bool {
        self.compare_interactions(recorded, stubbed).is_ok()
    }

    pub fn compare_interactions(
        &self,
        recorded: &Interaction,
        stubbed: &Interaction,
    ) -> Result<(), Mismatch> {
        if recorded.method() != stubbed.method() {
            return Err(Mismatch::Method {
                recorded: recorded.method().to_string(),
                stubbed: stubbed.method().to_string(),
            });
        }
        self.compare_outcomes(recorded.outcome(), stubbed.outcome())?;
        self.compare_args(recorded.args(), stubbed.args())
    }

    fn compare_outcomes(&self, recorded: &Outcome, stubbed: &Outcome) -> Result<(), Mismatch> {
        let differs = || Mismatch::Outcome {
            recorded: recorded.to_string(),
            stubbed: stubbed.to_string(),
        };
        if recorded.is_absent() || stubbed.is_absent() {
            return Ok(());
        }

        let recorded_fake = recorded.returned().and_then(|v| v.as_fake());
        let stubbed_fake = stubbed.returned().and_then(|v| v.as_fake());
        match (recorded_fake, stubbed_fake) {
            (Some(r), Some(s)) => return self.compare_entities(r, s),
            (None, None) => {}
            _ => return Err(differs()),
        }

        let same = match (recorded, stubbed) {
            (Outcome::Returned(r), Outcome::Returned(s)) => r == s,
            (Outcome::Raised(r), Outcome::Raised(s)) => r == s,
            _ => false,
        };
        if same {
            Ok(())
        } else {
            Err(differs())
        }
    }
}
