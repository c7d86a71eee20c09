use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tower_sessions::session::Id;
use tracing::debug;

use crate::errors::{AppError, Result};

/// Sessions with an action currently running. A browser gets one action at a
/// time; a second one is refused instead of queued.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<Id>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<Id>> {
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Held for the duration of one action; released on drop.
    pub fn claim(&self, id: Id) -> Result<InFlightSlot> {
        if !self.ids().insert(id) {
            debug!("Refusing overlapping request for session {}", id);
            return Err(AppError::RequestInFlight);
        }
        Ok(InFlightSlot { owner: self.clone(), id })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ids().len()
    }
}

#[derive(Debug)]
pub struct InFlightSlot {
    owner: InFlight,
    id: Id,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.owner.ids().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_claim_is_refused() {
        let in_flight = InFlight::new();
        let id = Id(1);
        let _held = in_flight.claim(id).unwrap();
        assert!(matches!(in_flight.claim(id), Err(AppError::RequestInFlight)));
    }

    #[test]
    fn slot_is_released_on_drop() {
        let in_flight = InFlight::new();
        let id = Id(2);
        drop(in_flight.claim(id).unwrap());
        assert_eq!(in_flight.len(), 0);
        assert!(in_flight.claim(id).is_ok());
    }

    #[test]
    fn sessions_do_not_block_each_other() {
        let in_flight = InFlight::new();
        let _first = in_flight.claim(Id(3)).unwrap();
        let _second = in_flight.claim(Id(4)).unwrap();
        assert_eq!(in_flight.len(), 2);
    }
}
