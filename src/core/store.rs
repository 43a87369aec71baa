// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::session::SessionId;
use crate::core::timer::Timer;

/// Owner of every live timer, at most one per session.
///
/// Every method is atomic with respect to every other one. Implementations
/// must never hand out the backing container.
pub trait SessionStore: Send + Sync {
    fn get(&self, session: SessionId) -> Option<Timer>;

    /// Inserts `timer`, returning whatever it replaced.
    fn put(&self, session: SessionId, timer: Timer) -> Option<Timer>;

    fn remove(&self, session: SessionId) -> Option<Timer>;

    /// Removes the entry only if `pred` holds for it, as one step.
    fn remove_if(&self, session: SessionId, pred: &dyn Fn(&Timer) -> bool) -> Option<Timer>;

    /// Runs `f` on the existing entry under the lock. False if absent.
    fn update_with(&self, session: SessionId, f: &mut dyn FnMut(&mut Timer)) -> bool;
}

impl dyn SessionStore + '_ {
    /// Typed wrapper around [`SessionStore::update_with`].
    pub fn update<R>(&self, session: SessionId, f: impl FnOnce(&mut Timer) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.update_with(session, &mut |timer| {
            if let Some(f) = f.take() {
                out = Some(f(timer));
            }
        });
        out
    }
}

/// In-process store: one map behind one mutex.
#[derive(Default)]
pub struct MemoryStore {
    timers: Mutex<HashMap<SessionId, Timer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Timer>> {
        // A panic while holding the lock cannot leave a half-written Timer:
        // every mutation below is a single map operation.
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session: SessionId) -> Option<Timer> {
        self.lock().get(&session).cloned()
    }

    fn put(&self, session: SessionId, timer: Timer) -> Option<Timer> {
        self.lock().insert(session, timer)
    }

    fn remove(&self, session: SessionId) -> Option<Timer> {
        self.lock().remove(&session)
    }

    fn remove_if(&self, session: SessionId, pred: &dyn Fn(&Timer) -> bool) -> Option<Timer> {
        let mut timers = self.lock();
        if timers.get(&session).is_some_and(pred) {
            timers.remove(&session)
        } else {
            None
        }
    }

    fn update_with(&self, session: SessionId, f: &mut dyn FnMut(&mut Timer)) -> bool {
        match self.lock().get_mut(&session) {
            Some(timer) => {
                f(timer);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::TimerId;

    const S: SessionId = SessionId::new(42);

    #[test]
    fn put_overwrites_existing_entry() {
        let store = MemoryStore::new();
        assert!(store.put(S, Timer::new(TimerId(1))).is_none());

        let replaced = store.put(S, Timer::new(TimerId(2))).unwrap();
        assert_eq!(replaced.id(), TimerId(1));
        assert_eq!(store.get(S).unwrap().id(), TimerId(2));
    }

    #[test]
    fn remove_takes_the_entry_once() {
        let store = MemoryStore::new();
        store.put(S, Timer::new(TimerId(1)));

        assert!(store.remove(S).is_some());
        assert!(store.remove(S).is_none());
        assert!(store.get(S).is_none());
    }

    #[test]
    fn remove_if_checks_predicate() {
        let store = MemoryStore::new();
        store.put(S, Timer::new(TimerId(7)));

        assert!(store.remove_if(S, &|t: &Timer| t.id() == TimerId(8)).is_none());
        assert!(store.get(S).is_some());

        assert!(store.remove_if(S, &|t: &Timer| t.id() == TimerId(7)).is_some());
        assert!(store.get(S).is_none());
    }

    #[test]
    fn update_only_touches_existing_entries() {
        let store = MemoryStore::new();
        let dyn_store: &dyn SessionStore = &store;

        assert_eq!(dyn_store.update(S, |t| t.set_name("x")), None);
        assert!(store.get(S).is_none());

        store.put(S, Timer::new(TimerId(1)));
        assert_eq!(dyn_store.update(S, |t| t.set_name("x")), Some(Ok(())));
        assert_eq!(store.get(S).unwrap().name(), Some("x"));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = MemoryStore::new();
        let other = SessionId::new(7);

        store.put(S, Timer::new(TimerId(1)));
        store.put(other, Timer::new(TimerId(2)));
        store.remove(S);

        assert_eq!(store.get(other).unwrap().id(), TimerId(2));
    }
}
