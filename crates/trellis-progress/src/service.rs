//! Composition root for the presentation layer.
//!
//! One explicitly constructed `ProgressService` owns the storage backend,
//! the identity provider, and the progress store — no ambient singletons.
//! Identity changes run exactly one snapshot initialization synchronously
//! before the call returns, so a stale-identity mutation can never land
//! after a newer identity's snapshot has loaded.

use trellis_catalog::{Catalog, Module, Status};
use trellis_storage::{KeyValueStorage, StorageError};

use crate::identity::{Identity, IdentityProvider};
use crate::store::{MutationOutcome, ProgressStore};

/// Receives notifications after the service commits a state change.
///
/// Callbacks run synchronously on the caller's thread, after the snapshot
/// is fully updated and persisted — an observer never sees a
/// partially-applied operation. Polling consumers can skip observers
/// entirely and read [`ProgressService::snapshot`] instead.
pub trait ProgressObserver {
    fn snapshot_changed(&self, snapshot: &[Module]);

    fn identity_changed(&self, _identity: &Identity) {}
}

/// The callable surface handed to the presentation layer.
pub struct ProgressService<S: KeyValueStorage> {
    storage: S,
    identity: IdentityProvider,
    store: ProgressStore,
    observers: Vec<Box<dyn ProgressObserver>>,
}

impl<S: KeyValueStorage> ProgressService<S> {
    /// Open a service over `storage`: restore the persisted identity
    /// (guest when absent) and initialize its snapshot.
    pub fn open(catalog: Catalog, mut storage: S) -> Result<Self, StorageError> {
        let identity = IdentityProvider::load(&mut storage)?;
        let store = ProgressStore::new(catalog, &identity.current().id, &mut storage)?;
        Ok(Self {
            storage,
            identity,
            store,
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    pub fn identity(&self) -> &Identity {
        self.identity.current()
    }

    /// Read handle on the current snapshot.
    pub fn snapshot(&self) -> &[Module] {
        self.store.snapshot()
    }

    pub fn lesson_status(&self, module_id: &str, lesson_id: &str) -> Option<Status> {
        self.store.lesson_status(module_id, lesson_id)
    }

    /// Switch to `identity` and load its snapshot.
    pub fn login(&mut self, identity: Identity) -> Result<(), StorageError> {
        self.identity.login(identity, &mut self.storage)?;
        self.reinitialize()
    }

    /// Return to guest and load the guest snapshot.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.identity.logout(&mut self.storage)?;
        self.reinitialize()
    }

    pub fn complete_challenge(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        challenge_id: &str,
    ) -> Result<MutationOutcome, StorageError> {
        let outcome =
            self.store
                .complete_challenge(module_id, lesson_id, challenge_id, &mut self.storage)?;
        self.notify_if_applied(outcome);
        Ok(outcome)
    }

    pub fn complete_stage(
        &mut self,
        module_id: &str,
        lesson_id: &str,
        stage_id: &str,
    ) -> Result<MutationOutcome, StorageError> {
        let outcome = self
            .store
            .complete_stage(module_id, lesson_id, stage_id, &mut self.storage)?;
        self.notify_if_applied(outcome);
        Ok(outcome)
    }

    pub fn complete_lesson(
        &mut self,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<MutationOutcome, StorageError> {
        let outcome = self
            .store
            .complete_lesson(module_id, lesson_id, &mut self.storage)?;
        self.notify_if_applied(outcome);
        Ok(outcome)
    }

    /// Discard the current identity's progress and persist the baseline.
    pub fn reset_progress(&mut self) -> Result<(), StorageError> {
        self.store.reset_progress(&mut self.storage)?;
        self.notify_snapshot();
        Ok(())
    }

    fn reinitialize(&mut self) -> Result<(), StorageError> {
        let identity_id = self.identity.current().id.clone();
        self.store
            .initialize_for_user(&identity_id, &mut self.storage)?;

        for observer in &self.observers {
            observer.identity_changed(self.identity.current());
        }
        self.notify_snapshot();
        Ok(())
    }

    fn notify_if_applied(&self, outcome: MutationOutcome) {
        if outcome.is_applied() {
            self.notify_snapshot();
        }
    }

    fn notify_snapshot(&self) {
        for observer in &self.observers {
            observer.snapshot_changed(self.store.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_catalog::sample_catalog;
    use trellis_storage::MemoryStorage;

    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl ProgressObserver for Recorder {
        fn snapshot_changed(&self, snapshot: &[Module]) {
            self.events
                .borrow_mut()
                .push(format!("snapshot:{}", snapshot.len()));
        }

        fn identity_changed(&self, identity: &Identity) {
            self.events
                .borrow_mut()
                .push(format!("identity:{}", identity.id));
        }
    }

    fn service_with_recorder() -> (ProgressService<MemoryStorage>, Rc<RefCell<Vec<String>>>) {
        let mut service = ProgressService::open(sample_catalog(), MemoryStorage::new())
            .expect("service must open");
        let events = Rc::new(RefCell::new(Vec::new()));
        service.subscribe(Box::new(Recorder {
            events: Rc::clone(&events),
        }));
        (service, events)
    }

    #[test]
    fn opens_as_guest_with_baseline_snapshot() {
        let (service, _) = service_with_recorder();
        assert!(service.identity().is_guest());
        assert_eq!(
            service.lesson_status("design-foundations", "color-contrast"),
            Some(Status::Current)
        );
    }

    #[test]
    fn applied_mutations_notify_observers() {
        let (mut service, events) = service_with_recorder();

        service
            .complete_challenge(
                "design-foundations",
                "color-contrast",
                "challenge-1-text-for-given-bg",
            )
            .expect("operation must succeed");
        assert_eq!(events.borrow().as_slice(), ["snapshot:2"]);
    }

    #[test]
    fn ignored_mutations_stay_silent() {
        let (mut service, events) = service_with_recorder();

        let outcome = service
            .complete_challenge("design-foundations", "color-contrast", "missing")
            .expect("operation must succeed");
        assert_eq!(outcome, MutationOutcome::Ignored);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn login_notifies_identity_then_snapshot() {
        let (mut service, events) = service_with_recorder();

        service
            .login(Identity::new("ada", "Ada"))
            .expect("login must succeed");
        assert_eq!(
            events.borrow().as_slice(),
            ["identity:ada", "snapshot:2"]
        );
        assert_eq!(service.identity().id, "ada");
    }

    #[test]
    fn logout_returns_to_guest_snapshot() {
        let (mut service, _) = service_with_recorder();

        service
            .login(Identity::new("ada", "Ada"))
            .expect("login must succeed");
        service
            .complete_lesson("design-foundations", "color-contrast")
            .expect("operation must succeed");
        service.logout().expect("logout must succeed");

        assert!(service.identity().is_guest());
        // Guest's snapshot is untouched by ada's progress.
        assert_eq!(
            service.lesson_status("design-foundations", "color-contrast"),
            Some(Status::Current)
        );
    }
}
