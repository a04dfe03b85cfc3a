//! Observable value cells.
//!
//! A cell holds one value and notifies registered hooks when it is read or
//! written. Before-set hooks may veto a write. The raw accessors bypass every
//! hook and are what cloning and snapshotting use.

use std::fmt;
use std::sync::Arc;

/// Decides whether `(current, proposed)` may be written.
pub type BeforeSetHook<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Observes `(previous, new)` after a successful write.
pub type AfterSetHook<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// Observes every notifying read.
pub type OnGetHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A mutable typed slot with get/set notification hooks.
#[derive(Clone)]
pub struct Observable<T> {
    value: T,
    before_set: Vec<BeforeSetHook<T>>,
    after_set: Vec<AfterSetHook<T>>,
    on_get: Vec<OnGetHook<T>>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            before_set: Vec::new(),
            after_set: Vec::new(),
            on_get: Vec::new(),
        }
    }

    /// Returns a copy of the value, firing on-get hooks.
    pub fn get(&self) -> T {
        for hook in &self.on_get {
            hook(&self.value);
        }
        self.value.clone()
    }

    /// Writes `value` unless a before-set hook vetoes it.
    ///
    /// Returns `true` when the write happened.
    pub fn set(&mut self, value: T) -> bool {
        if !self.before_set.iter().all(|hook| hook(&self.value, &value)) {
            return false;
        }
        let previous = std::mem::replace(&mut self.value, value);
        for hook in &self.after_set {
            hook(&previous, &self.value);
        }
        true
    }

    /// Reads without notification.
    pub fn raw(&self) -> &T {
        &self.value
    }

    /// Writes without notification or veto.
    pub fn set_raw(&mut self, value: T) {
        self.value = value;
    }

    /// Copies the value into a new cell with no hooks attached.
    pub fn detached(&self) -> Self {
        Self::new(self.value.clone())
    }

    pub fn on_before_set(&mut self, hook: impl Fn(&T, &T) -> bool + Send + Sync + 'static) {
        self.before_set.push(Arc::new(hook));
    }

    pub fn on_after_set(&mut self, hook: impl Fn(&T, &T) + Send + Sync + 'static) {
        self.after_set.push(Arc::new(hook));
    }

    pub fn on_get(&mut self, hook: impl Fn(&T) + Send + Sync + 'static) {
        self.on_get.push(Arc::new(hook));
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("hooks", &(self.before_set.len() + self.after_set.len() + self.on_get.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn before_set_can_veto() {
        let mut health = Observable::new(10_i64);
        health.on_before_set(|_, proposed| *proposed >= 0);

        assert!(health.set(4));
        assert!(!health.set(-1));
        assert_eq!(*health.raw(), 4);
    }

    #[test]
    fn after_set_sees_previous_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut health = Observable::new(10_i64);
        health.on_after_set(move |prev, new| sink.lock().unwrap().push((*prev, *new)));
        health.set(7);
        health.set_raw(1);
        health.set(0);

        assert_eq!(*seen.lock().unwrap(), vec![(10, 7), (1, 0)]);
    }

    #[test]
    fn detached_copy_drops_hooks() {
        let mut health = Observable::new(3_i64);
        health.on_before_set(|_, _| false);

        let mut copy = health.detached();
        assert!(copy.set(9));
        assert_eq!(*health.raw(), 3);
    }
}
