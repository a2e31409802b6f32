//! Filter state store
//!
//! Holds the only mutable state of the filter engine, the current
//! [`FormState`], and notifies registered observers after every committed
//! change. Edits that leave the state unchanged are no-ops and notify
//! nobody, so observers never see redundant transitions.
//!
//! ```rust,ignore
//! let store = FilterStateStore::with_catalog(&groups);
//! let subscription = store.subscribe(|form| println!("now {:?}", form.preset));
//!
//! store.set_preset(PresetFilter::Listed);   // observer runs once
//! store.set_preset(PresetFilter::Listed);   // unchanged, observer not run
//!
//! drop(subscription);                       // unregistered
//! ```

use crate::core::asset::{FacetOption, TraitGroup};
use crate::core::filter::{FormState, PresetFilter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Callback invoked with the committed state after each change
pub type Observer = Arc<dyn Fn(&FormState) + Send + Sync>;

/// Identifier of a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct StoreInner {
    form: RwLock<FormState>,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
}

impl StoreInner {
    fn form(&self) -> RwLockReadGuard<'_, FormState> {
        self.form.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn form_mut(&self) -> RwLockWriteGuard<'_, FormState> {
        self.form.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn observers(&self) -> RwLockReadGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn observers_mut(&self) -> RwLockWriteGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() < before
    }
}

/// Owner of the current filter selections
///
/// Cloning yields another handle to the same store.
///
/// Edits are meant to come from one logical thread. The store is
/// `Send + Sync`, but observers run after the state lock is released, so two
/// threads committing at the same time may notify observers in the opposite
/// order to the one in which their edits were committed.
#[derive(Clone)]
pub struct FilterStateStore {
    inner: Arc<StoreInner>,
}

impl FilterStateStore {
    /// Store in the initial state: preset `All`, no groups
    pub fn new() -> Self {
        Self::from_form(FormState::default())
    }

    /// Store seeded with one unconstrained entry per catalog group
    pub fn with_catalog(groups: &[TraitGroup]) -> Self {
        Self::from_form(FormState::from_catalog(groups))
    }

    fn from_form(form: FormState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                form: RwLock::new(form),
                observers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Copy of the committed state
    pub fn snapshot(&self) -> FormState {
        self.inner.form().clone()
    }

    pub fn preset(&self) -> PresetFilter {
        self.inner.form().preset
    }

    /// Replace the active preset
    pub fn set_preset(&self, preset: PresetFilter) {
        self.commit(|form| {
            if form.preset == preset {
                return false;
            }
            form.preset = preset;
            true
        });
    }

    /// Replace the selection of one group, leaving the others untouched
    ///
    /// A group the store has not seen before is appended after the known ones.
    pub fn set_group_selection(&self, trait_type: &str, selected: Vec<FacetOption>) {
        self.commit(|form| {
            match form.attributes.get_mut(trait_type) {
                Some(current) if *current == selected => false,
                Some(current) => {
                    *current = selected;
                    true
                }
                None if selected.is_empty() => false,
                None => {
                    tracing::debug!(trait_type = %trait_type, "Selection for uncatalogued group");
                    form.attributes.insert(trait_type.to_string(), selected);
                    true
                }
            }
        });
    }

    /// Remove every selected value of one group
    pub fn clear_group(&self, trait_type: &str) {
        self.set_group_selection(trait_type, Vec::new());
    }

    /// Return to preset `All` with every group unconstrained
    pub fn reset(&self) {
        self.commit(|form| {
            if !form.is_filtered() {
                return false;
            }
            form.preset = PresetFilter::All;
            form.attributes.values_mut().for_each(Vec::clear);
            true
        });
    }

    /// Register an observer, called after every committed change
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped or passed to [`FilterStateStore::unsubscribe`].
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&FormState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.observers_mut().push((id, Arc::new(observer)));

        tracing::debug!(subscription_id = id.0, "Filter observer registered");

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Unregister an observer explicitly
    ///
    /// Returns `true` if the observer was still registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let id = subscription.id;
        let removed = self.inner.remove(id);
        drop(subscription);
        if removed {
            tracing::debug!(subscription_id = id.0, "Filter observer unregistered");
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers().len()
    }

    /// Apply an edit and notify observers if it reported a change
    ///
    /// Observers run after both locks are released, with a snapshot of the
    /// committed state, so they may read from or edit the store themselves.
    fn commit(&self, edit: impl FnOnce(&mut FormState) -> bool) {
        let committed = {
            let mut form = self.inner.form_mut();
            if !edit(&mut form) {
                return;
            }
            form.clone()
        };

        let observers: Vec<Observer> = self
            .inner
            .observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        tracing::debug!(
            preset = ?committed.preset,
            observers = observers.len(),
            "Filter state committed"
        );

        for observer in observers {
            observer(&committed);
        }
    }
}

impl Default for FilterStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration guard returned by [`FilterStateStore::subscribe`]
///
/// Dropping the guard unregisters the observer. The guard does not keep the
/// store alive.
#[must_use = "dropping a Subscription unregisters its observer"]
pub struct Subscription {
    id: SubscriptionId,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade()
            && inner.remove(self.id)
        {
            tracing::debug!(subscription_id = self.id.0, "Filter observer released");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::TraitVariant;
    use std::sync::Mutex;

    fn catalog() -> Vec<TraitGroup> {
        vec![
            TraitGroup {
                name: "Background".to_string(),
                variants: vec![TraitVariant {
                    name: "Blue".to_string(),
                    count: 4,
                }],
            },
            TraitGroup {
                name: "Eyes".to_string(),
                variants: vec![TraitVariant {
                    name: "Laser".to_string(),
                    count: 2,
                }],
            },
        ]
    }

    fn recorder(store: &FilterStateStore) -> (Arc<Mutex<Vec<FormState>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(move |form| sink.lock().unwrap().push(form.clone()));
        (seen, subscription)
    }

    #[test]
    fn test_initial_state() {
        let store = FilterStateStore::new();
        let form = store.snapshot();
        assert_eq!(form.preset, PresetFilter::All);
        assert!(form.attributes.is_empty());
    }

    #[test]
    fn test_set_preset_notifies_once_per_change() {
        let store = FilterStateStore::new();
        let (seen, _sub) = recorder(&store);

        store.set_preset(PresetFilter::Listed);
        store.set_preset(PresetFilter::Listed);
        store.set_preset(PresetFilter::Owned);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].preset, PresetFilter::Listed);
        assert_eq!(seen[1].preset, PresetFilter::Owned);
    }

    #[test]
    fn test_group_selection_leaves_other_groups() {
        let store = FilterStateStore::with_catalog(&catalog());
        store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (2)")]);
        store.set_group_selection("Background", vec![FacetOption::new("Blue", "Blue (4)")]);
        store.clear_group("Background");

        let form = store.snapshot();
        assert!(form.selection("Background").is_empty());
        assert_eq!(form.selection("Eyes")[0].value, "Laser");
        let keys: Vec<&str> = form.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Background", "Eyes"]);
    }

    #[test]
    fn test_unchanged_selection_is_noop() {
        let store = FilterStateStore::with_catalog(&catalog());
        let (seen, _sub) = recorder(&store);

        store.clear_group("Eyes");
        store.set_group_selection("Unknown", vec![]);
        store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (2)")]);
        store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (2)")]);

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_uncatalogued_group_is_appended() {
        let store = FilterStateStore::with_catalog(&catalog());
        store.set_group_selection("Hat", vec![FacetOption::new("Crown", "Crown (1)")]);

        let form = store.snapshot();
        assert_eq!(form.attributes.keys().last().map(String::as_str), Some("Hat"));
    }

    #[test]
    fn test_reset() {
        let store = FilterStateStore::with_catalog(&catalog());
        let (seen, _sub) = recorder(&store);

        store.reset();
        assert!(seen.lock().unwrap().is_empty());

        store.set_preset(PresetFilter::Listed);
        store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (2)")]);
        store.reset();

        let form = store.snapshot();
        assert!(!form.is_filtered());
        assert_eq!(form.attributes.len(), 2);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_drop_subscription_unregisters() {
        let store = FilterStateStore::new();
        let (seen, sub) = recorder(&store);
        assert_eq!(store.observer_count(), 1);

        drop(sub);
        assert_eq!(store.observer_count(), 0);

        store.set_preset(PresetFilter::Listed);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let store = FilterStateStore::new();
        let (_seen, sub) = recorder(&store);
        let (_other, _keep) = recorder(&store);

        assert!(store.unsubscribe(sub));
        assert_eq!(store.observer_count(), 1);
    }

    #[test]
    fn test_subscription_outlives_store() {
        let store = FilterStateStore::new();
        let (_seen, sub) = recorder(&store);
        drop(store);
        drop(sub);
    }

    #[test]
    fn test_observer_may_read_store() {
        let store = FilterStateStore::new();
        let handle = store.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |_| {
            *sink.lock().unwrap() = Some(handle.preset());
        });

        store.set_preset(PresetFilter::Owned);
        assert_eq!(*seen.lock().unwrap(), Some(PresetFilter::Owned));
    }

    #[test]
    fn test_commits_from_cloned_handles_arrive_in_order() {
        let store = FilterStateStore::new();
        let other = store.clone();
        let (seen, _sub) = recorder(&store);

        store.set_preset(PresetFilter::Listed);
        other.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser (1)")]);
        store.set_preset(PresetFilter::All);

        let seen = seen.lock().unwrap();
        let presets: Vec<_> = seen.iter().map(|form| form.preset).collect();
        assert_eq!(
            presets,
            vec![PresetFilter::Listed, PresetFilter::Listed, PresetFilter::All]
        );
        assert!(seen[0].attributes.is_empty());
        assert_eq!(seen[1].attributes["Eyes"].len(), 1);
        assert_eq!(seen[2], store.snapshot());
    }
}
