use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::OnceCell;

use super::registry::ModelHandle;
use super::LanguagePair;
use crate::error::AppError;

type Slot = Arc<OnceCell<Arc<ModelHandle>>>;

/// Installed-model bookkeeping, one slot per language pair.
///
/// A pair counts as installed only once its slot holds a handle. Slot
/// initialization is single-flight: concurrent callers for the same pair wait
/// on the one running install and share its handle. A failed install leaves
/// the slot empty so the next caller tries again.
#[derive(Default)]
pub struct ModelTracker {
    slots: RwLock<HashMap<LanguagePair, Slot>>,
}

impl ModelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, pair: &LanguagePair) -> Slot {
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = slots.get(pair) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(pair.clone()).or_default())
    }

    pub fn get(&self, pair: &LanguagePair) -> Option<Arc<ModelHandle>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(pair).and_then(|slot| slot.get().cloned())
    }

    /// Record a model that is already installed. Returns false if the pair
    /// was tracked before.
    pub fn record(&self, handle: ModelHandle) -> bool {
        let pair = handle.pair.clone();
        self.slot(&pair).set(Arc::new(handle)).is_ok()
    }

    /// Return the tracked handle for `pair`, running `install` only when the
    /// pair is not tracked yet.
    pub async fn get_or_provision<F, Fut>(
        &self,
        pair: &LanguagePair,
        install: F,
    ) -> Result<Arc<ModelHandle>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ModelHandle, AppError>>,
    {
        let slot = self.slot(pair);
        let result = slot
            .get_or_try_init(|| async move { install().await.map(Arc::new) })
            .await
            .map(Arc::clone);

        if result.is_err() {
            self.release(pair, &slot);
        }
        result
    }

    /// Drop an empty slot nobody else is waiting on, so failed pairs do not
    /// stay in the map.
    fn release(&self, pair: &LanguagePair, slot: &Slot) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let unused = slots
            .get(pair)
            .is_some_and(|held| Arc::ptr_eq(held, slot) && Arc::strong_count(slot) == 2);
        if unused && !slot.initialized() {
            slots.remove(pair);
        }
    }

    pub fn installed_pairs(&self) -> Vec<LanguagePair> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut pairs: Vec<LanguagePair> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(pair, _)| pair.clone())
            .collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
