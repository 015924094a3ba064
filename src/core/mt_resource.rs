use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A thread-safe, reference-counted resource container guarded by a single mutex.
///
/// `MtResource` provides serialized access to a value of type `T` shared between
/// the render thread and the chunk generation worker. It wraps an `Arc<Mutex<T>>`
/// so every clone observes the same value.
///
/// The lock is a `parking_lot` mutex: it is not poisoned when a holder panics, so
/// acquiring it never fails.
///
/// # Examples
///
/// ```
/// use voxel_streaming::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let worker_counter = counter.clone();
///
/// std::thread::spawn(move || *worker_counter.lock() += 1)
///     .join()
///     .unwrap();
///
/// assert_eq!(*counter.lock(), 1);
/// ```
///
/// # Performance Considerations
/// - Keep critical sections short; every access excludes every other access
/// - Never hold the guard across generation work or GPU calls
pub struct MtResource<T: Send> {
    resource: Arc<Mutex<T>>,
}

impl<T: Send> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(Mutex::new(resource)),
        }
    }

    /// Acquires the lock, blocking until it is available.
    ///
    /// The returned guard releases the lock when dropped.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.resource.lock()
    }

    /// Acquires the lock only if no one else holds it.
    #[cfg(test)]
    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.resource.try_lock()
    }

    /// Runs `f` with exclusive access to the value and returns its result.
    ///
    /// The lock is released before this function returns, which makes the
    /// extent of the critical section obvious at the call site.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.resource.lock();
        f(&mut guard)
    }
}

impl<T: Send> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_value() {
        let resource = MtResource::new(vec![1, 2, 3]);
        let clone = resource.clone();

        clone.lock().push(4);

        assert_eq!(resource.with(|values| values.len()), 4);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let resource = MtResource::new(0);
        let guard = resource.lock();

        assert!(resource.clone().try_lock().is_none());
        drop(guard);
        assert!(resource.try_lock().is_some());
    }
}
