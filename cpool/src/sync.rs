use crossbeam_queue::ArrayQueue;
use crossbeam_utils::Backoff;
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

const CLOSED: usize = 1;
const PUSHER: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryPopError {
    Empty,
    Closed,
}

#[derive(PartialEq, Eq)]
pub enum TryPushError<T> {
    Full(T),
    Closed(T),
}

impl<T> Debug for TryPushError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "Full(..)"),
            Self::Closed(_) => write!(f, "Closed(..)"),
        }
    }
}

impl<T> TryPushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }
}

/// Bounded MPMC queue with a one-way closed state.
///
/// The state word keeps the closed flag in its lowest bit and the number of
/// in-flight pushes in the remaining bits. Once `close` returns, no push can
/// land in the queue.
pub struct ClosableQueue<T> {
    slots: ArrayQueue<T>,
    state: AtomicUsize,
}

impl<T> Debug for ClosableQueue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosableQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> ClosableQueue<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: ArrayQueue::new(capacity),
            state: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) & CLOSED != 0
    }

    pub fn try_push(&self, value: T) -> Result<(), TryPushError<T>> {
        let backoff = Backoff::new();
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            if state & CLOSED != 0 {
                return Err(TryPushError::Closed(value));
            }
            match self.state.compare_exchange_weak(
                state,
                state + PUSHER,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(changed) => state = changed,
            }
            backoff.spin();
        }
        let pushed = self.slots.push(value);
        self.state.fetch_sub(PUSHER, Ordering::Release);
        pushed.map_err(TryPushError::Full)
    }

    /// Pops an item, telling an open empty queue apart from a closed one.
    ///
    /// Items stored before the queue was closed are still handed out.
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        match self.slots.pop() {
            Some(value) => Ok(value),
            None if self.is_closed() => Err(TryPopError::Closed),
            None => Err(TryPopError::Empty),
        }
    }

    /// Closes the queue, returning `true` only for the call that closed it.
    ///
    /// Waits for pushes that started before the transition to finish.
    pub fn close(&self) -> bool {
        let prev = self.state.fetch_or(CLOSED, Ordering::AcqRel);
        let backoff = Backoff::new();
        while self.state.load(Ordering::Acquire) & !CLOSED != 0 {
            backoff.snooze();
        }
        prev & CLOSED == 0
    }

    pub fn drain(&self) -> Drain<'_, T> {
        Drain { queue: self }
    }
}

pub struct Drain<'a, T> {
    queue: &'a ClosableQueue<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.slots.pop()
    }
}
