//! Toast sink
//!
//! The page reports outcomes as [`Toast`]s; hosts decide how to show them.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::Toast;

pub trait Notifier {
    fn notify(&self, toast: Toast);
}

impl<F> Notifier for F
where
    F: Fn(Toast),
{
    fn notify(&self, toast: Toast) {
        self(toast)
    }
}

/// Collects toasts until the host takes them
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        // 中毒后继续使用内部数据
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove and return every queued toast
    pub fn take(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, title = %toast.title, "Toast");
        self.lock().push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_take_empties() {
        let queue = ToastQueue::new();
        let handle = queue.clone();
        handle.notify(Toast::error("Save failed", "Network error"));
        handle.notify(Toast::success("Saved", "Zone created"));

        assert_eq!(queue.len(), 2);
        let toasts = queue.take();
        assert!(toasts[0].is_error());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_closure_notifier() {
        let seen = std::cell::RefCell::new(Vec::new());
        let notifier = |t: Toast| seen.borrow_mut().push(t.title);
        notifier.notify(Toast::info("Hello", ""));
        assert_eq!(*seen.borrow(), vec!["Hello".to_string()]);
    }
}
