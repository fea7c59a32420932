//! Page-lifetime task ownership

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Owns every background task a page spawns.
///
/// [`PageScope::dispose`] aborts them all; dropping the scope does the same.
/// Tasks spawned after disposal are aborted immediately.
#[derive(Default)]
pub struct PageScope {
    handles: Mutex<Vec<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl PageScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task bound to this scope
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.push(handle);
    }

    /// Take over the tasks of another scope
    pub fn adopt(&self, other: PageScope) {
        let handles = std::mem::take(&mut *lock(&other.handles));
        for handle in handles {
            self.push(handle);
        }
    }

    /// Number of tasks still running
    pub fn active_tasks(&self) -> usize {
        lock(&self.handles)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Abort every owned task
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let handles = std::mem::take(&mut *lock(&self.handles));
        if !handles.is_empty() {
            tracing::debug!(tasks = handles.len(), "Disposing page scope");
        }
        for handle in handles {
            handle.abort();
        }
    }

    fn push(&self, handle: JoinHandle<()>) {
        if self.is_disposed() {
            handle.abort();
            return;
        }
        let mut handles = lock(&self.handles);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }
}

impl Drop for PageScope {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock(handles: &Mutex<Vec<JoinHandle<()>>>) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
    handles.lock().unwrap_or_else(|e| e.into_inner())
}
