use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the device can currently reach the backend.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Toggleable reachability flag shared between the shell and the sync queue.
#[derive(Debug)]
pub struct NetworkStatus {
    online: AtomicBool,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Updates the flag and returns the previous state.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst)
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::online()
    }
}

impl Connectivity for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_online_reports_previous_state() {
        let status = NetworkStatus::offline();
        assert!(!status.is_online());
        assert!(!status.set_online(true));
        assert!(status.is_online());
        assert!(status.set_online(false));
    }
}
