use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use busysync_core::CalendarMirror;
use busysync_domain::{
    BackendError, EventId, ManagedEvent, ReconciliationWindow, Slot, SlotDuration, SlotSet,
};

#[derive(Default)]
struct State {
    events: Vec<ManagedEvent>,
    ghosts: Vec<ManagedEvent>,
    next_id: usize,
    creates_left: Option<usize>,
    fail_deletes: bool,
    regrow_on_delete: bool,
    list_calls: usize,
    create_calls: usize,
    delete_calls: usize,
}

impl State {
    fn allocate_id(&mut self) -> EventId {
        self.next_id += 1;
        EventId::new(format!("evt-{:04}", self.next_id))
    }
}

/// In-memory calendar holding managed events only.
///
/// Identifiers are allocated in increasing order (`evt-0001`, `evt-0002`, ...)
/// so the lowest identifier is always the oldest event.
#[derive(Default, Clone)]
pub struct InMemoryCalendar {
    state: Arc<Mutex<State>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one managed event per slot, repeating slots creates duplicates.
    pub fn with_events(self, slots: &[Slot]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for slot in slots {
                let id = state.allocate_id();
                state.events.push(ManagedEvent::new(id, *slot));
            }
        }
        self
    }

    /// Seed an event that shows up in listings but is already gone by the
    /// time a delete reaches the backend.
    pub fn with_ghost(self, slot: Slot) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.allocate_id();
            state.ghosts.push(ManagedEvent::new(id, slot));
        }
        self
    }

    /// Allow `count` more creates, then fail every subsequent one.
    pub fn fail_creates_after(&self, count: usize) {
        self.state.lock().unwrap().creates_left = Some(count);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    /// Every successful delete immediately re-creates an event at the same slot.
    pub fn regrow_on_delete(&self, regrow: bool) {
        self.state.lock().unwrap().regrow_on_delete = regrow;
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.creates_left = None;
        state.fail_deletes = false;
        state.regrow_on_delete = false;
    }

    pub fn events(&self) -> Vec<ManagedEvent> {
        let mut events = self.state.lock().unwrap().events.clone();
        events.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.id.cmp(&b.id)));
        events
    }

    pub fn slots(&self) -> SlotSet {
        self.events().into_iter().map(|event| event.slot).collect()
    }

    pub fn ids_at(&self, slot: Slot) -> Vec<EventId> {
        self.events().into_iter().filter(|event| event.slot == slot).map(|event| event.id).collect()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn mutation_calls(&self) -> usize {
        self.create_calls() + self.delete_calls()
    }
}

#[async_trait]
impl CalendarMirror for InMemoryCalendar {
    async fn list_managed_events(
        &self,
        window: &ReconciliationWindow,
    ) -> Result<Vec<ManagedEvent>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state
            .events
            .iter()
            .chain(state.ghosts.iter())
            .filter(|event| window.contains(event.slot))
            .cloned()
            .collect())
    }

    async fn create_event(
        &self,
        slot: Slot,
        _duration: SlotDuration,
    ) -> Result<EventId, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        if let Some(left) = state.creates_left.as_mut() {
            if *left == 0 {
                return Err(BackendError::Create { slot, message: "quota exceeded".into() });
            }
            *left -= 1;
        }

        let id = state.allocate_id();
        state.events.push(ManagedEvent::new(id.clone(), slot));
        Ok(id)
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;

        if let Some(index) = state.ghosts.iter().position(|event| &event.id == id) {
            state.ghosts.remove(index);
            return Err(BackendError::NotFound { id: id.clone() });
        }

        if state.fail_deletes {
            return Err(BackendError::Delete {
                id: id.clone(),
                slot: None,
                message: "backend unavailable".into(),
            });
        }

        let Some(index) = state.events.iter().position(|event| &event.id == id) else {
            return Err(BackendError::NotFound { id: id.clone() });
        };
        let removed = state.events.remove(index);

        if state.regrow_on_delete {
            let regrown = state.allocate_id();
            state.events.push(ManagedEvent::new(regrown, removed.slot));
        }
        Ok(())
    }
}
