//! Geometry readiness polling
//!
//! Objects cannot be composed until every geometry they reference has
//! streamed in. The poller answers "is it loaded yet" and counts consecutive
//! unsatisfied polls per `(object, model type)`. Past the retry limit the
//! lenient [`ReadinessPoller::ready`] gives up and reports ready so the
//! render loop is not starved, while [`ReadinessPoller::ready_or_err`]
//! reports [`Error::ReadinessExhausted`].

use std::collections::HashMap;

use crate::config::DEFAULT_READINESS_RETRY_LIMIT;
use crate::definitions::ObjectDefinition;
use crate::definitions::object::{ModelSet, STRAIGHT_CENTREPIECE};
use crate::error::{Error, Result};
use crate::provider::GeometryProvider;

/// Retry bookkeeping for readiness polls.
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    attempts: HashMap<(u32, i32), u32>,
    limit: u32,
}

enum Check {
    /// Nothing to wait for with this model type.
    Vacuous,
    Satisfied,
    Missing,
}

impl ReadinessPoller {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            attempts: HashMap::new(),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether every geometry `def` references is loaded. No bookkeeping.
    #[must_use]
    pub fn is_ready<G>(&self, def: &ObjectDefinition, geometry: &G) -> bool
    where
        G: GeometryProvider + ?Sized,
    {
        def.models.ids().into_iter().all(|id| geometry.is_loaded(id))
    }

    /// Whether `def` can be composed for `model_type`.
    ///
    /// Returns true once the consecutive-failure count exceeds the limit.
    pub fn ready<G>(&mut self, def: &ObjectDefinition, model_type: i32, geometry: &G) -> bool
    where
        G: GeometryProvider + ?Sized,
    {
        match self.poll(def, model_type, geometry) {
            Some(attempts) => {
                if attempts > self.limit {
                    tracing::warn!(
                        "Object {} type {}: geometry still missing after {} polls, giving up",
                        def.id,
                        model_type,
                        attempts
                    );
                    true
                } else {
                    false
                }
            }
            None => true,
        }
    }

    /// Like [`ready`](Self::ready) but fails instead of giving up.
    pub fn ready_or_err<G>(
        &mut self,
        def: &ObjectDefinition,
        model_type: i32,
        geometry: &G,
    ) -> Result<bool>
    where
        G: GeometryProvider + ?Sized,
    {
        match self.poll(def, model_type, geometry) {
            Some(attempts) if attempts > self.limit => {
                tracing::warn!(
                    "Object {} type {}: readiness exhausted after {} polls",
                    def.id,
                    model_type,
                    attempts
                );
                Err(Error::ReadinessExhausted {
                    id: def.id,
                    model_type,
                    attempts,
                })
            }
            Some(_) => Ok(false),
            None => Ok(true),
        }
    }

    /// Poll once. `None` when satisfied, otherwise the new attempt count.
    fn poll<G>(&mut self, def: &ObjectDefinition, model_type: i32, geometry: &G) -> Option<u32>
    where
        G: GeometryProvider + ?Sized,
    {
        let key = (def.id, model_type);
        match check(def, model_type, geometry) {
            Check::Vacuous => None,
            Check::Satisfied => {
                self.attempts.remove(&key);
                None
            }
            Check::Missing => {
                let attempts = self.attempts.entry(key).or_insert(0);
                *attempts += 1;
                Some(*attempts)
            }
        }
    }

    /// Consecutive unsatisfied polls recorded for `(id, model_type)`.
    #[must_use]
    pub fn attempts(&self, id: u32, model_type: i32) -> u32 {
        self.attempts.get(&(id, model_type)).copied().unwrap_or(0)
    }

    /// Forget the count for one `(id, model_type)`.
    pub fn reset(&mut self, id: u32, model_type: i32) {
        self.attempts.remove(&(id, model_type));
    }

    /// Forget every count.
    pub fn clear(&mut self) {
        self.attempts.clear();
    }

    /// Ask the streamer for every geometry `def` references.
    pub fn request_geometry<G>(&self, def: &ObjectDefinition, geometry: &G)
    where
        G: GeometryProvider + ?Sized,
    {
        for id in def.models.ids() {
            geometry.request(id);
        }
    }
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::new(DEFAULT_READINESS_RETRY_LIMIT)
    }
}

fn check<G>(def: &ObjectDefinition, model_type: i32, geometry: &G) -> Check
where
    G: GeometryProvider + ?Sized,
{
    let ids = match &def.models {
        ModelSet::None => return Check::Vacuous,
        ModelSet::Simple(_) if model_type != STRAIGHT_CENTREPIECE => return Check::Vacuous,
        ModelSet::Simple(ids) => ids.clone(),
        ModelSet::Typed(_) => {
            let ids = def.models.candidates(model_type);
            if ids.is_empty() {
                // Still a satisfied check, so any stale count is dropped.
                return Check::Satisfied;
            }
            ids
        }
    };
    if ids.iter().all(|&id| geometry.is_loaded(id)) {
        Check::Satisfied
    } else {
        Check::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::object::TypedModel;
    use crate::mesh::Mesh;
    use crate::provider::MemoryGeometry;

    fn waiting() -> ObjectDefinition {
        let mut def = ObjectDefinition::new(8);
        def.models = ModelSet::Simple(vec![1, 2]);
        def
    }

    #[test]
    fn test_simple_wrong_type_is_vacuous() {
        let mut poller = ReadinessPoller::default();
        assert!(poller.ready(&waiting(), 0, &MemoryGeometry::new()));
        assert_eq!(poller.attempts(8, 0), 0);
    }

    #[test]
    fn test_counts_then_resets_when_satisfied() {
        let mut poller = ReadinessPoller::new(3);
        let mut geometry = MemoryGeometry::new().with_mesh(1, Mesh::default());
        let def = waiting();
        assert!(!poller.ready(&def, 10, &geometry));
        assert!(!poller.ready(&def, 10, &geometry));
        assert_eq!(poller.attempts(8, 10), 2);

        geometry.insert(2, Mesh::default());
        assert!(poller.ready(&def, 10, &geometry));
        assert_eq!(poller.attempts(8, 10), 0);
    }

    #[test]
    fn test_lenient_gives_up_past_limit() {
        let mut poller = ReadinessPoller::new(3);
        let geometry = MemoryGeometry::new();
        let def = waiting();
        for _ in 0..3 {
            assert!(!poller.ready(&def, 10, &geometry));
        }
        assert!(poller.ready(&def, 10, &geometry));
    }

    #[test]
    fn test_strict_fails_past_limit() {
        let mut poller = ReadinessPoller::new(2);
        let geometry = MemoryGeometry::new();
        let def = waiting();
        assert!(!poller.ready_or_err(&def, 10, &geometry).unwrap());
        assert!(!poller.ready_or_err(&def, 10, &geometry).unwrap());
        match poller.ready_or_err(&def, 10, &geometry) {
            Err(Error::ReadinessExhausted { id, model_type, attempts }) => {
                assert_eq!((id, model_type, attempts), (8, 10, 3));
            }
            other => panic!("expected ReadinessExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_typed_checks_only_matching_role() {
        let mut def = ObjectDefinition::new(3);
        def.models = ModelSet::Typed(vec![
            TypedModel { id: 1, model_type: 0 },
            TypedModel { id: 2, model_type: 4 },
        ]);
        let geometry = MemoryGeometry::new().with_mesh(1, Mesh::default());
        let mut poller = ReadinessPoller::default();
        assert!(poller.ready(&def, 0, &geometry));
        assert!(!poller.ready(&def, 4, &geometry));
        assert!(poller.ready(&def, 9, &geometry));
        assert!(!poller.is_ready(&def, &geometry));
    }

    #[test]
    fn test_request_geometry_asks_for_every_id() {
        let geometry = MemoryGeometry::new();
        ReadinessPoller::default().request_geometry(&waiting(), &geometry);
        assert_eq!(geometry.requested(), vec![1, 2]);
    }
}
