use crate::error::{Error, Result};
use crate::resource::{Close, Factory};
use crate::sync::{ClosableQueue, TryPopError, TryPushError};
use parking_lot::Mutex;
use std::fmt::{self, Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A point-in-time view of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub capacity: usize,
    pub idle: usize,
    pub closed: bool,
}

/// Non-blocking pool of closable resources.
///
/// At most `capacity` idle resources are kept. Checked-out resources are not
/// tracked, so the pool never makes a caller wait.
pub struct Pool<F: Factory> {
    inner: Arc<Inner<F>>,
}

impl<F: Factory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Factory> Debug for Pool<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("status", &self.status())
            .finish()
    }
}

impl<F: Factory> Pool<F> {
    pub fn new(factory: F, capacity: usize) -> Result<Self, F::Error> {
        if capacity == 0 {
            return Err(Error::InvalidConfiguration { capacity });
        }
        Ok(Self {
            inner: Arc::new(Inner {
                factory,
                resources: ClosableQueue::new(capacity),
                closed: Mutex::new(false),
            }),
        })
    }

    /// Takes an idle resource or creates a new one. Never blocks.
    ///
    /// The idle queue is read without the pool lock. An `acquire` overlapping
    /// [`Pool::close`] may therefore find the queue empty but still open and
    /// create a resource after shutdown; releasing it later just closes it.
    pub fn acquire(&self) -> Result<F::Output, F::Error> {
        self.inner.acquire()
    }

    /// Puts a resource back, closing it if the pool is full or closed.
    pub fn release(&self, resource: F::Output) {
        self.inner.release(resource);
    }

    /// Closes the pool and every idle resource. Later calls do nothing.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Like [`Pool::acquire`], but releases the resource when the guard drops.
    pub fn get(&self) -> Result<Pooled<'_, F>, F::Error> {
        Ok(Pooled {
            pool: &self.inner,
            resource: Some(self.inner.acquire()?),
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.resources.capacity()
    }

    pub fn idle_len(&self) -> usize {
        self.inner.resources.len()
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed.lock()
    }

    pub fn status(&self) -> Status {
        Status {
            capacity: self.capacity(),
            idle: self.idle_len(),
            closed: self.is_closed(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.inner.factory
    }
}

struct Inner<F: Factory> {
    factory: F,
    resources: ClosableQueue<F::Output>,
    closed: Mutex<bool>,
}

impl<F: Factory> Inner<F> {
    fn acquire(&self) -> Result<F::Output, F::Error> {
        match self.resources.try_pop() {
            Ok(resource) => {
                trace!("reusing idle resource");
                Ok(resource)
            }
            Err(TryPopError::Empty) => {
                trace!("creating resource");
                self.factory.try_create().map_err(Error::Factory)
            }
            Err(TryPopError::Closed) => Err(Error::PoolClosed),
        }
    }

    fn release(&self, resource: F::Output) {
        let closed = self.closed.lock();
        if *closed {
            debug!("pool is closed, closing released resource");
            dispose(resource);
            return;
        }
        match self.resources.try_push(resource) {
            Ok(()) => trace!("stored released resource"),
            Err(TryPushError::Full(resource)) => {
                debug!("idle resources at capacity, closing released resource");
                dispose(resource);
            }
            Err(TryPushError::Closed(resource)) => dispose(resource),
        }
    }

    fn close(&self) {
        let mut closed = self.closed.lock();
        if *closed {
            return;
        }
        *closed = true;
        self.resources.close();
        let mut drained = 0;
        for resource in self.resources.drain() {
            dispose(resource);
            drained += 1;
        }
        debug!(drained, "pool closed");
    }
}

impl<F: Factory> Drop for Inner<F> {
    fn drop(&mut self) {
        self.close();
    }
}

fn dispose<R: Close>(resource: R) {
    if let Err(err) = resource.close() {
        warn!(error = %err, "failed to close resource");
    }
}

pub struct Pooled<'a, F: Factory> {
    pool: &'a Inner<F>,
    resource: Option<F::Output>,
}

impl<F: Factory> Debug for Pooled<'_, F>
where
    F::Output: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.resource)
    }
}

impl<F: Factory> Deref for Pooled<'_, F> {
    type Target = F::Output;

    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().unwrap()
    }
}

impl<F: Factory> DerefMut for Pooled<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().unwrap()
    }
}

impl<F: Factory> Drop for Pooled<'_, F> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl<F: Factory> Pooled<'_, F> {
    /// Detaches the resource from the pool. The caller becomes responsible
    /// for closing it.
    pub fn take(mut pooled: Self) -> F::Output {
        pooled.resource.take().unwrap()
    }
}
