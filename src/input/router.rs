//! Registration of transient pointer handlers.
//!
//! A gesture (stroke capture, shape placement, selection drag) owns a
//! [`Subscription`] for as long as it wants move/up samples. Dropping the
//! subscription is the only way to unregister, so commit and cancellation share
//! one disposal path.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: Vec<(u64, &'static str)>,
}

#[derive(Debug, Clone, Default)]
pub struct PointerRouter {
    registry: Arc<Mutex<Registry>>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `owner` and returns the guard that keeps it alive.
    pub fn subscribe(&self, owner: &'static str) -> Subscription {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.live.push((id, owner));
        log::trace!("Pointer handlers attached for {owner} (#{id})");
        Subscription {
            id,
            owner,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of handlers currently attached.
    pub fn active_count(&self) -> usize {
        self.registry.lock().live.len()
    }

    pub fn owners(&self) -> Vec<&'static str> {
        self.registry.lock().live.iter().map(|(_, owner)| *owner).collect()
    }
}

/// Scoped pointer-handler registration. Unregisters itself on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    owner: &'static str,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once the router itself is gone.
    pub fn is_live(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().live.iter().any(|(id, _)| *id == self.id))
    }

    /// Explicit spelling of drop, for call sites that want to read as a detach.
    pub fn dispose(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().live.retain(|(id, _)| *id != self.id);
            log::trace!("Pointer handlers detached for {} (#{})", self.owner, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_subscription_detaches() {
        let router = PointerRouter::new();
        let first = router.subscribe("shape");
        let second = router.subscribe("stroke");
        assert_eq!(router.active_count(), 2);
        assert!(first.is_live());
        assert_ne!(first.id(), second.id());

        first.dispose();
        assert_eq!(router.active_count(), 1);
        assert_eq!(router.owners(), vec!["stroke"]);

        drop(second);
        assert_eq!(router.active_count(), 0);
    }

    #[test]
    fn subscription_outliving_router_is_dead() {
        let router = PointerRouter::new();
        let subscription = router.subscribe("shape");
        drop(router);
        assert!(!subscription.is_live());
    }
}
