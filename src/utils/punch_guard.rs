use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Admits at most one in-flight punch per user. Reading the last punch and
/// submitting the next one is not atomic on the backend, so two concurrent
/// punches would both compute the same type.
#[derive(Debug, Clone, Default)]
pub struct PunchGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held while a punch is being computed and submitted. Dropping it frees the user.
#[derive(Debug)]
pub struct PunchPermit {
    in_flight: Arc<Mutex<HashSet<String>>>,
    user_id: String,
}

impl PunchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, user_id: &str) -> Option<PunchPermit> {
        let mut in_flight = lock(&self.in_flight);
        if !in_flight.insert(user_id.to_string()) {
            tracing::debug!("Punch already in flight for {}", user_id);
            return None;
        }

        Some(PunchPermit {
            in_flight: Arc::clone(&self.in_flight),
            user_id: user_id.to_string(),
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, user_id: &str) -> bool {
        lock(&self.in_flight).contains(user_id)
    }
}

impl Drop for PunchPermit {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.user_id);
    }
}

// The set stays consistent even if a holder panicked, so poisoning is ignored.
fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod punch_guard_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_admit_one_punch_per_user() {
        let guard = PunchGuard::new();

        let first = guard.try_acquire("42");

        assert!(first.is_some());
        assert!(guard.try_acquire("42").is_none());
        assert!(guard.try_acquire("7").is_some());
    }

    #[rstest]
    fn it_should_release_on_drop() {
        let guard = PunchGuard::new();

        let permit = guard.try_acquire("42");
        assert!(guard.is_busy("42"));
        drop(permit);

        assert!(!guard.is_busy("42"));
        assert!(guard.try_acquire("42").is_some());
    }

    #[rstest]
    fn it_should_share_state_between_clones() {
        let guard = PunchGuard::new();
        let clone = guard.clone();

        let _permit = guard.try_acquire("42");

        assert!(clone.try_acquire("42").is_none());
    }

    #[rstest]
    fn it_should_release_when_the_holder_panics() {
        let guard = PunchGuard::new();
        let inner = guard.clone();

        let result = std::thread::spawn(move || {
            let _permit = inner.try_acquire("42");
            panic!("submit failed");
        })
        .join();

        assert!(result.is_err());
        assert!(!guard.is_busy("42"));
    }
}
