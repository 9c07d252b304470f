//! The progress store: per-learner snapshot plus the completion cascade.
//!
//! One store instance owns one identity's snapshot at a time. Every
//! mutating operation runs to completion in memory, then persists the full
//! snapshot under the identity's key. Lookups are tolerant: an unknown id
//! is a silent no-op that skips the persistence write. A persistence
//! failure propagates, but the in-memory snapshot keeps the mutation.
//!
//! Statuses only move forward (`locked → unlocked|todo → current →
//! completed`); no operation here ever re-locks an entity.

use trellis_catalog::{Catalog, Challenge, Module, Status};
use trellis_storage::{KeyValueStorage, StorageError};

/// Versioned prefix for per-identity snapshot keys.
pub const PROGRESS_KEY_PREFIX: &str = "trellis-progress-v1";

/// Storage key of the snapshot persisted for `identity_id`.
pub fn progress_key(identity_id: &str) -> String {
    format!("{PROGRESS_KEY_PREFIX}:{identity_id}")
}

/// Whether a mutating operation changed the snapshot.
///
/// `Ignored` covers every tolerated miss: unknown ids and
/// already-completed targets. An ignored operation writes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Ignored,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Per-identity progress state machine over a catalog baseline.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    catalog: Catalog,
    identity_id: String,
    snapshot: Vec<Module>,
}

impl ProgressStore {
    /// Build a store for `identity_id`, loading its persisted snapshot or
    /// falling back to a fresh copy of the baseline.
    pub fn new(
        catalog: Catalog,
        identity_id: &str,
        storage: &mut impl KeyValueStorage,
    ) -> Result<Self, StorageError> {
        let mut store = Self {
            catalog,
            identity_id: String::new(),
            snapshot: Vec::new(),
        };
        store.initialize_for_user(identity_id, storage)?;
        Ok(store)
    }

    /// Replace the whole in-memory snapshot with `identity_id`'s state.
    ///
    /// Absent record ⇒ fresh deep copy of the baseline. Corrupt record ⇒
    /// the record is removed (so the parse failure does not repeat) and
    /// the baseline copy is used. Never merges with prior in-memory state.
    pub fn initialize_for_user(
        &mut self,
        identity_id: &str,
        storage: &mut impl KeyValueStorage,
    ) -> Result<(), StorageError> {
        let key = progress_key(identity_id);
        let snapshot = match storage.get(&key)? {
            Some(raw) => match serde_json::from_str::<Vec<Module>>(&raw) {
                Ok(modules) => modules,
                Err(_) => {
                    storage.remove(&key)?;
                    self.catalog.snapshot()
                }
            },
            None => self.catalog.snapshot(),
        };
        self.identity_id = identity_id.to_string();
        self.snapshot = snapshot;
        Ok(())
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    /// The live snapshot, in catalog order.
    pub fn snapshot(&self) -> &[Module] {
        &self.snapshot
    }

    /// Current status of one lesson; `None` when either id is unknown.
    pub fn lesson_status(&self, module_id: &str, lesson_id: &str) -> Option<Status> {
        self.snapshot
            .iter()
            .find(|m| m.id == module_id)?
            .lesson(lesson_id)
            .map(|l| l.status)
    }

    /// Mark one challenge completed and run the full cascade.
    ///
    /// If the challenge was the last open one in its lesson, the lesson
    /// completes, the owning module is re-evaluated, and the next lesson
    /// in catalog order is unlocked (only out of `locked`/`todo`).
    pub fn complete_challenge(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        challenge_id: &str,
        storage: &mut impl KeyValueStorage,
    ) -> Result<MutationOutcome, StorageError> {
        let Some((module_idx, lesson_idx)) = self.locate_lesson(module_id, lesson_id) else {
            return Ok(MutationOutcome::Ignored);
        };

        {
            let lesson = &mut self.snapshot[module_idx].lessons[lesson_idx];
            let Some(challenge) = lesson.challenge_mut(challenge_id) else {
                return Ok(MutationOutcome::Ignored);
            };
            if challenge.completed {
                return Ok(MutationOutcome::Ignored);
            }
            challenge.mark_completed();
        }

        let lesson = &self.snapshot[module_idx].lessons[lesson_idx];
        if lesson.all_challenges_completed() && lesson.status != Status::Completed {
            self.snapshot[module_idx].lessons[lesson_idx].status = Status::Completed;
            self.reevaluate_module(module_idx);
            self.unlock_next_lesson(module_idx, lesson_idx);
        }

        self.persist(storage)?;
        Ok(MutationOutcome::Applied)
    }

    /// Record stage-level completion without running the lesson cascade.
    ///
    /// Structural variant of [`complete_challenge`]: a challenge with the
    /// stage's id is synthesized (completed, empty description) when none
    /// exists, or marked completed when one does. An already-completed
    /// record is left untouched.
    ///
    /// [`complete_challenge`]: ProgressStore::complete_challenge
    pub fn complete_stage(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        stage_id: &str,
        storage: &mut impl KeyValueStorage,
    ) -> Result<MutationOutcome, StorageError> {
        let Some((module_idx, lesson_idx)) = self.locate_lesson(module_id, lesson_id) else {
            return Ok(MutationOutcome::Ignored);
        };

        let lesson = &mut self.snapshot[module_idx].lessons[lesson_idx];
        match lesson.challenge_mut(stage_id) {
            Some(challenge) if challenge.completed => return Ok(MutationOutcome::Ignored),
            Some(challenge) => challenge.mark_completed(),
            None => lesson.challenges.push(Challenge::synthesized(stage_id)),
        }

        self.persist(storage)?;
        Ok(MutationOutcome::Applied)
    }

    /// Force-complete a whole lesson, challenges and all, then cascade.
    ///
    /// The path for lessons without granular challenges; also the only way
    /// a zero-challenge lesson ever reaches `completed`.
    pub fn complete_lesson(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        storage: &mut impl KeyValueStorage,
    ) -> Result<MutationOutcome, StorageError> {
        let Some((module_idx, lesson_idx)) = self.locate_lesson(module_id, lesson_id) else {
            return Ok(MutationOutcome::Ignored);
        };

        {
            let lesson = &mut self.snapshot[module_idx].lessons[lesson_idx];
            if lesson.status == Status::Completed {
                return Ok(MutationOutcome::Ignored);
            }
            lesson.status = Status::Completed;
            for challenge in &mut lesson.challenges {
                challenge.mark_completed();
            }
        }

        self.reevaluate_module(module_idx);
        self.unlock_next_lesson(module_idx, lesson_idx);

        self.persist(storage)?;
        Ok(MutationOutcome::Applied)
    }

    /// Replace the current identity's snapshot with a fresh baseline copy
    /// and persist it. Other identities' records are untouched.
    pub fn reset_progress(
        &mut self,
        storage: &mut impl KeyValueStorage,
    ) -> Result<(), StorageError> {
        self.snapshot = self.catalog.snapshot();
        self.persist(storage)
    }

    fn locate_lesson(&self, module_id: &str, lesson_id: &str) -> Option<(usize, usize)> {
        let module_idx = self.snapshot.iter().position(|m| m.id == module_id)?;
        let lesson_idx = self.snapshot[module_idx]
            .lessons
            .iter()
            .position(|l| l.id == lesson_id)?;
        Some((module_idx, lesson_idx))
    }

    /// Re-evaluate one module after a lesson status change.
    ///
    /// All lessons completed ⇒ the module completes and the first other
    /// module that depends on it and is still `locked` unlocks (first
    /// match in catalog order). Otherwise the module reflects work in
    /// progress as `current`. A module already `completed` stays put.
    fn reevaluate_module(&mut self, module_idx: usize) {
        let module = &self.snapshot[module_idx];
        if module.status == Status::Completed {
            return;
        }

        if module.all_lessons_completed() {
            let completed_id = module.id.clone();
            self.snapshot[module_idx].status = Status::Completed;

            if let Some(dependent) = self.snapshot.iter_mut().find(|m| {
                m.depends_on.as_deref() == Some(completed_id.as_str())
                    && m.status == Status::Locked
            }) {
                dependent.status = Status::Unlocked;
            }
        } else {
            self.snapshot[module_idx].status = Status::Current;
        }
    }

    /// Unlock the lesson after `lesson_idx`, if any, out of `locked`/`todo`.
    fn unlock_next_lesson(&mut self, module_idx: usize, lesson_idx: usize) {
        if let Some(next) = self.snapshot[module_idx].lessons.get_mut(lesson_idx + 1)
            && next.status.is_unlockable()
        {
            next.status = Status::Unlocked;
        }
    }

    fn persist(&self, storage: &mut impl KeyValueStorage) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(&self.snapshot).expect("progress snapshot must serialize");
        storage.set(&progress_key(&self.identity_id), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_catalog::{Challenge, Lesson};
    use trellis_storage::MemoryStorage;

    fn lesson(id: &str, status: Status, challenge_ids: &[&str]) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: format!("Lesson {id}"),
            path: format!("/m/{id}"),
            icon: None,
            status,
            challenges: challenge_ids
                .iter()
                .map(|cid| Challenge::new(*cid, ""))
                .collect(),
            stages: Vec::new(),
        }
    }

    fn fixture_catalog() -> Catalog {
        Catalog::new(vec![
            Module {
                id: "m1".to_string(),
                title: "Module One".to_string(),
                icon: None,
                status: Status::Current,
                depends_on: None,
                lessons: vec![
                    lesson("l1", Status::Current, &["c1", "c2"]),
                    lesson("l2", Status::Locked, &["c3"]),
                ],
            },
            Module {
                id: "m2".to_string(),
                title: "Module Two".to_string(),
                icon: None,
                status: Status::Locked,
                depends_on: Some("m1".to_string()),
                lessons: vec![lesson("l1", Status::Locked, &["c1"])],
            },
        ])
    }

    fn fresh_store(storage: &mut MemoryStorage) -> ProgressStore {
        ProgressStore::new(fixture_catalog(), "guest", storage).expect("store must initialize")
    }

    #[test]
    fn unknown_ids_are_silent_no_ops_without_writes() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        for (m, l, c) in [
            ("missing", "l1", "c1"),
            ("m1", "missing", "c1"),
            ("m1", "l1", "missing"),
        ] {
            let outcome = store
                .complete_challenge(m, l, c, &mut storage)
                .expect("operation must succeed");
            assert_eq!(outcome, MutationOutcome::Ignored);
        }

        assert!(storage.is_empty());
        assert_eq!(store.lesson_status("m1", "l1"), Some(Status::Current));
    }

    #[test]
    fn completing_part_of_a_lesson_changes_no_statuses() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        let outcome = store
            .complete_challenge("m1", "l1", "c1", &mut storage)
            .expect("operation must succeed");
        assert!(outcome.is_applied());

        assert_eq!(store.lesson_status("m1", "l1"), Some(Status::Current));
        assert_eq!(store.snapshot()[0].status, Status::Current);
        assert_eq!(store.snapshot()[1].status, Status::Locked);
    }

    #[test]
    fn completing_the_last_challenge_completes_the_lesson_and_unlocks_the_next() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        store
            .complete_challenge("m1", "l1", "c1", &mut storage)
            .expect("operation must succeed");
        store
            .complete_challenge("m1", "l1", "c2", &mut storage)
            .expect("operation must succeed");

        assert_eq!(store.lesson_status("m1", "l1"), Some(Status::Completed));
        assert_eq!(store.lesson_status("m1", "l2"), Some(Status::Unlocked));
        // l2 still open, so the module reflects work in progress.
        assert_eq!(store.snapshot()[0].status, Status::Current);
        assert_eq!(store.snapshot()[1].status, Status::Locked);
    }

    #[test]
    fn completing_the_last_lesson_completes_the_module_and_unlocks_dependents() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        for (l, c) in [("l1", "c1"), ("l1", "c2"), ("l2", "c3")] {
            store
                .complete_challenge("m1", l, c, &mut storage)
                .expect("operation must succeed");
        }

        assert_eq!(store.snapshot()[0].status, Status::Completed);
        assert_eq!(store.snapshot()[1].status, Status::Unlocked);
    }

    #[test]
    fn double_completion_is_idempotent() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        store
            .complete_challenge("m1", "l1", "c1", &mut storage)
            .expect("operation must succeed");
        let persisted = storage
            .get(&progress_key("guest"))
            .expect("get must succeed")
            .expect("snapshot must be persisted");

        let outcome = store
            .complete_challenge("m1", "l1", "c1", &mut storage)
            .expect("operation must succeed");
        assert_eq!(outcome, MutationOutcome::Ignored);
        assert_eq!(
            storage
                .get(&progress_key("guest"))
                .expect("get must succeed")
                .as_deref(),
            Some(persisted.as_str())
        );
    }

    #[test]
    fn complete_stage_synthesizes_missing_challenges() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        let outcome = store
            .complete_stage("m1", "l1", "headings", &mut storage)
            .expect("operation must succeed");
        assert!(outcome.is_applied());

        let lesson = store.snapshot()[0].lesson("l1").expect("lesson must exist");
        let synthesized = lesson.challenge("headings").expect("must be appended");
        assert!(synthesized.completed);
        assert!(synthesized.description.is_empty());
        // Existing challenges untouched, no cascade ran.
        assert!(!lesson.challenge("c1").expect("must exist").completed);
        assert_eq!(lesson.status, Status::Current);
    }

    #[test]
    fn complete_stage_marks_existing_challenges_without_cascade() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        store
            .complete_stage("m1", "l2", "c3", &mut storage)
            .expect("operation must succeed");

        let lesson = store.snapshot()[0].lesson("l2").expect("lesson must exist");
        assert!(lesson.challenge("c3").expect("must exist").completed);
        // Every challenge is completed, but only the challenge cascade
        // completes lessons.
        assert_eq!(lesson.status, Status::Locked);
    }

    #[test]
    fn complete_lesson_force_completes_challenges_and_cascades() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        let outcome = store
            .complete_lesson("m1", "l1", &mut storage)
            .expect("operation must succeed");
        assert!(outcome.is_applied());

        let lesson = store.snapshot()[0].lesson("l1").expect("lesson must exist");
        assert_eq!(lesson.status, Status::Completed);
        assert!(lesson.challenges.iter().all(|c| c.completed));
        assert_eq!(store.lesson_status("m1", "l2"), Some(Status::Unlocked));

        let repeat = store
            .complete_lesson("m1", "l1", &mut storage)
            .expect("operation must succeed");
        assert_eq!(repeat, MutationOutcome::Ignored);
    }

    #[test]
    fn corrupt_snapshot_record_is_cleared_and_replaced_by_baseline() {
        let mut storage = MemoryStorage::new();
        storage
            .set(&progress_key("guest"), "[{broken")
            .expect("seed must succeed");

        let store = fresh_store(&mut storage);
        assert_eq!(store.lesson_status("m1", "l1"), Some(Status::Current));
        assert_eq!(
            storage.get(&progress_key("guest")).expect("get must succeed"),
            None
        );
    }

    #[test]
    fn reset_progress_restores_the_baseline_for_one_identity() {
        let mut storage = MemoryStorage::new();
        let mut store = fresh_store(&mut storage);

        let mut other = ProgressStore::new(fixture_catalog(), "ada", &mut storage)
            .expect("store must initialize");
        other
            .complete_lesson("m1", "l1", &mut storage)
            .expect("operation must succeed");
        let ada_persisted = storage
            .get(&progress_key("ada"))
            .expect("get must succeed")
            .expect("ada snapshot must be persisted");

        store
            .complete_lesson("m1", "l1", &mut storage)
            .expect("operation must succeed");
        store.reset_progress(&mut storage).expect("reset must succeed");

        assert_eq!(store.lesson_status("m1", "l1"), Some(Status::Current));
        assert_eq!(store.lesson_status("m1", "l2"), Some(Status::Locked));
        assert_eq!(
            storage
                .get(&progress_key("ada"))
                .expect("get must succeed")
                .as_deref(),
            Some(ada_persisted.as_str())
        );
    }

    #[test]
    fn snapshot_mutation_never_touches_the_baseline() {
        let catalog = fixture_catalog();
        let mut storage = MemoryStorage::new();
        let mut store = ProgressStore::new(catalog.clone(), "guest", &mut storage)
            .expect("store must initialize");

        store
            .complete_lesson("m1", "l1", &mut storage)
            .expect("operation must succeed");

        let baseline = catalog.module("m1").expect("module must exist");
        assert_eq!(
            baseline.lesson("l1").expect("lesson must exist").status,
            Status::Current
        );
        assert!(!baseline.lessons[0].challenges[0].completed);
    }
}
