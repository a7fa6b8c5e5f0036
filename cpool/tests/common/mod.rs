#![allow(dead_code)]

use cpool::{Close, Pool};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct ConnError(pub &'static str);

impl fmt::Display for ConnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for ConnError {}

/// Counts factory calls and closes shared by every `Conn` of one pool.
#[derive(Debug, Default)]
pub struct Tracker {
    created: AtomicUsize,
    closed: AtomicUsize,
    closed_ids: parking_lot::Mutex<Vec<usize>>,
}

impl Tracker {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn closed_ids(&self) -> Vec<usize> {
        self.closed_ids.lock().clone()
    }

    pub fn conn(self: &Arc<Self>) -> Conn {
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Conn {
            id,
            tracker: self.clone(),
            fail_close: false,
        }
    }
}

#[derive(Debug)]
pub struct Conn {
    pub id: usize,
    pub fail_close: bool,
    tracker: Arc<Tracker>,
}

impl Close for Conn {
    type Error = ConnError;

    fn close(self) -> Result<(), Self::Error> {
        self.tracker.closed.fetch_add(1, Ordering::SeqCst);
        self.tracker.closed_ids.lock().push(self.id);
        if self.fail_close {
            Err(ConnError("broken pipe"))
        } else {
            Ok(())
        }
    }
}

pub type ConnFactory = Box<dyn Fn() -> Result<Conn, ConnError> + Send + Sync>;

pub fn pool(capacity: usize) -> (Pool<ConnFactory>, Arc<Tracker>) {
    let tracker = Arc::new(Tracker::default());
    let factory = {
        let tracker = tracker.clone();
        Box::new(move || Ok(tracker.conn())) as ConnFactory
    };
    (Pool::new(factory, capacity).unwrap(), tracker)
}
