//! A bounded synchronized deque with an owner end and a stealer end.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Per-queue capacity used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 50;

/// Returned by [`WorkDeque::push`] when the deque has been closed.
///
/// Carries the rejected value back out so ownership is never lost inside
/// the queue.
#[derive(Debug)]
pub struct Closed<T>(pub T);

struct Slots<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A bounded deque shared between one owner and any number of stealers.
///
/// The owner pushes and pops at the back (LIFO, newest first); stealers pop
/// from the front (FIFO, oldest first). A single mutex guards the storage
/// and the closed flag; the `not_empty` and `not_full` condvars wait on that
/// same mutex so both predicates observe one length invariant atomically.
pub struct WorkDeque<T> {
    slots: Mutex<Slots<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    max_size: usize,
}

impl<T> WorkDeque<T> {
    /// Create a deque holding at most `max_size` elements. A `max_size` of
    /// zero is rounded up to one.
    pub fn new(max_size: usize) -> Self {
        WorkDeque {
            slots: Mutex::new(Slots {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            max_size: max_size.max(1),
        }
    }

    /// Enqueue at the back, blocking while the deque is full and open.
    ///
    /// If the deque is closed, or closes while this call is blocked, the
    /// value is handed back inside [`Closed`] without being stored.
    pub fn push(&self, value: T) -> Result<(), Closed<T>> {
        let mut slots = self.lock();
        while !slots.closed && slots.items.len() == self.max_size {
            slots = self.wait(&self.not_full, slots);
        }

        if slots.closed {
            return Err(Closed(value));
        }

        slots.items.push_back(value);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pop the newest element from the back without blocking.
    ///
    /// Closed-and-empty behaves like empty.
    pub fn try_pop(&self) -> Option<T> {
        let mut slots = self.lock();
        let value = slots.items.pop_back()?;
        self.not_full.notify_one();
        Some(value)
    }

    /// Pop the oldest element from the front without blocking.
    ///
    /// Stealers take the far end from the owner, so the two disciplines
    /// collide only on the last remaining element.
    pub fn try_steal(&self) -> Option<T> {
        let mut slots = self.lock();
        let value = slots.items.pop_front()?;
        self.not_full.notify_one();
        Some(value)
    }

    /// Block until the deque is non-empty or closed, then pop from the back.
    ///
    /// Returns `None` only when the deque is closed **and** empty; that is
    /// the terminal condition for a worker loop parked here.
    pub fn wait_and_pop(&self) -> Option<T> {
        let mut slots = self.lock();
        while !slots.closed && slots.items.is_empty() {
            slots = self.wait(&self.not_empty, slots);
        }

        let value = slots.items.pop_back()?;
        self.not_full.notify_one();
        Some(value)
    }

    /// Close the deque and wake every waiter on both conditions.
    ///
    /// Idempotent. Elements already enqueued stay retrievable; new pushes
    /// are rejected.
    pub fn close(&self) {
        let mut slots = self.lock();
        slots.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().expect("work deque lock poisoned")
    }

    fn wait<'a>(
        &self,
        condvar: &Condvar,
        guard: MutexGuard<'a, Slots<T>>,
    ) -> MutexGuard<'a, Slots<T>> {
        condvar.wait(guard).expect("work deque lock poisoned")
    }
}

impl<T> Default for WorkDeque<T> {
    fn default() -> Self {
        WorkDeque::new(DEFAULT_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn owner_pops_lifo() {
        let deque = WorkDeque::new(8);
        for v in ["a", "b", "c"] {
            deque.push(v).unwrap();
        }

        assert_eq!(deque.try_pop(), Some("c"));
        assert_eq!(deque.try_pop(), Some("b"));
        assert_eq!(deque.try_pop(), Some("a"));
        assert_eq!(deque.try_pop(), None);
    }

    #[test]
    fn stealers_pop_fifo() {
        let deque = WorkDeque::new(8);
        for v in ["a", "b", "c"] {
            deque.push(v).unwrap();
        }

        assert_eq!(deque.try_steal(), Some("a"));
        assert_eq!(deque.try_steal(), Some("b"));
        assert_eq!(deque.try_steal(), Some("c"));
        assert_eq!(deque.try_steal(), None);
    }

    #[test]
    fn mixed_ends_keep_their_disciplines() {
        let deque = WorkDeque::new(8);
        for v in ["a", "b", "c", "d"] {
            deque.push(v).unwrap();
        }

        assert_eq!(deque.try_pop(), Some("d"));
        assert_eq!(deque.try_steal(), Some("a"));
        assert_eq!(deque.try_pop(), Some("c"));
        assert_eq!(deque.try_steal(), Some("b"));
        assert!(deque.is_empty());
    }

    #[test]
    fn push_blocks_at_capacity_until_pop() {
        let deque = Arc::new(WorkDeque::new(1));
        deque.push(0u32).unwrap();

        let stored = Arc::new(AtomicBool::new(false));
        let handle = {
            let deque = Arc::clone(&deque);
            let stored = Arc::clone(&stored);
            thread::spawn(move || {
                deque.push(1).unwrap();
                stored.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!stored.load(Ordering::SeqCst), "push returned while full");

        assert_eq!(deque.try_pop(), Some(0));
        handle.join().unwrap();
        assert!(stored.load(Ordering::SeqCst));
        assert_eq!(deque.try_pop(), Some(1));
    }

    #[test]
    fn close_unblocks_full_push_and_hands_value_back() {
        let deque = Arc::new(WorkDeque::new(1));
        deque.push(7u32).unwrap();

        let handle = {
            let deque = Arc::clone(&deque);
            thread::spawn(move || deque.push(8))
        };

        thread::sleep(Duration::from_millis(50));
        deque.close();

        let result = handle.join().unwrap();
        assert!(matches!(result, Err(Closed(8))));
        // The element enqueued before close is still there.
        assert_eq!(deque.try_pop(), Some(7));
    }

    #[test]
    fn wait_and_pop_blocks_until_push() {
        let deque = Arc::new(WorkDeque::new(4));

        let handle = {
            let deque = Arc::clone(&deque);
            thread::spawn(move || deque.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(50));
        deque.push("late").unwrap();
        assert_eq!(handle.join().unwrap(), Some("late"));
    }

    #[test]
    fn wait_and_pop_drains_then_reports_closed() {
        let deque = WorkDeque::new(4);
        deque.push("a").unwrap();
        deque.push("b").unwrap();
        deque.close();

        assert_eq!(deque.wait_and_pop(), Some("b"));
        assert_eq!(deque.wait_and_pop(), Some("a"));
        assert_eq!(deque.wait_and_pop(), None);
    }

    #[test]
    fn close_is_idempotent_and_rejects_push() {
        let deque = WorkDeque::new(4);
        deque.close();
        deque.close();
        assert!(deque.is_closed());
        assert!(matches!(deque.push(1u32), Err(Closed(1))));
        assert_eq!(deque.try_pop(), None);
    }

    #[test]
    fn zero_capacity_rounds_up_to_one() {
        let deque = WorkDeque::new(0);
        assert_eq!(deque.max_size(), 1);
        deque.push(1u32).unwrap();
        assert_eq!(deque.len(), 1);
    }
}
