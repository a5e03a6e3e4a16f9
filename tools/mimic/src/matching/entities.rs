use super::{Comparator, Mismatch};
use crate::fake::FakeEntity;
use std::sync::Arc;

fn entity_key(entity: &Arc<dyn FakeEntity>) -> usize {
    Arc::as_ptr(entity) as *const () as usize
}

impl Comparator {
    pub fn same_entities(&self, recorded: &Arc<dyn FakeEntity>, stubbed: &Arc<dyn FakeEntity>) -> bool {
        self.compare_entities(recorded, stubbed).is_ok()
    }

    /// Every stub of `recorded` must match some stub of `stubbed`. Extra
    /// stubs on `stubbed` are allowed.
    pub fn compare_entities(
        &self,
        recorded: &Arc<dyn FakeEntity>,
        stubbed: &Arc<dyn FakeEntity>,
    ) -> Result<(), Mismatch> {
        let malformed = |entity: &Arc<dyn FakeEntity>| Mismatch::EntityMalformed {
            fake_name: entity.fake_name().to_string(),
        };
        let recorded_tag = recorded.identity_tag().ok_or_else(|| malformed(recorded))?;
        let stubbed_tag = stubbed.identity_tag().ok_or_else(|| malformed(stubbed))?;
        if recorded_tag != stubbed_tag {
            return Err(Mismatch::EntityTag {
                recorded: recorded_tag.to_string(),
                stubbed: stubbed_tag.to_string(),
            });
        }
        let recorded_stubs = recorded.stubs().ok_or_else(|| malformed(recorded))?;
        let stubbed_stubs = stubbed.stubs().ok_or_else(|| malformed(stubbed))?;

        let key = (entity_key(recorded), entity_key(stubbed));
        if self.config.guard_cycles && self.in_progress.borrow().contains(&key) {
            return Ok(());
        }
        let depth = self.depth.get();
        if depth >= self.config.max_entity_depth {
            return Err(Mismatch::EntityDepth {
                limit: self.config.max_entity_depth,
            });
        }

        self.in_progress.borrow_mut().push(key);
        self.depth.set(depth + 1);
        let result = recorded_stubs.iter().try_for_each(|recorded_stub| {
            let recorded_interaction = recorded_stub.to_interaction();
            let found = stubbed_stubs
                .iter()
                .any(|s| self.same_interactions(&recorded_interaction, &s.to_interaction()));
            if found {
                Ok(())
            } else {
                Err(Mismatch::EntityStub {
                    fake_name: recorded.fake_name().to_string(),
                    method: recorded_stub.method.clone(),
                })
            }
        });
        self.depth.set(depth);
        self.in_progress.borrow_mut().pop();
        result
    }
}
