mod common;

use cpool::{Close, Pool, Pooled};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time::sleep;

const MAX_POOL_SIZE: usize = 4;
const WORKERS: usize = 8;
const ITERATIONS: usize = 16;

#[derive(Debug)]
struct Counter {
    value: i32,
}

impl Close for Counter {
    type Error = Infallible;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Counter {
    fn new() -> Self {
        Self { value: 0 }
    }

    fn get(&self) -> i32 {
        self.value
    }

    fn increase(&mut self) {
        self.value += 1;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let pool = Pool::new(|| Ok::<_, Infallible>(Counter::new()), MAX_POOL_SIZE).unwrap();

    let handles = (0..WORKERS)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                for _ in 0..ITERATIONS {
                    let mut counter = pool.acquire().unwrap();
                    counter.increase();
                    sleep(Duration::from_millis(1)).await;
                    pool.release(counter);
                    assert!(pool.idle_len() <= MAX_POOL_SIZE);
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.await.unwrap();
    }

    // Counters closed on a full release take their increments with them.
    let mut sum = 0;
    while pool.idle_len() > 0 {
        let counter = pool.get().unwrap();
        sum += counter.get();
        drop(Pooled::take(counter));
    }
    assert!(sum as usize <= WORKERS * ITERATIONS);
}

#[test]
fn threads_never_overfill_idle() {
    let (pool, tracker) = common::pool(MAX_POOL_SIZE);
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let pool = pool.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                assert!(pool.idle_len() <= MAX_POOL_SIZE);
                thread::yield_now();
            }
        })
    };

    let workers = (0..WORKERS)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let conn = pool.acquire().unwrap();
                    pool.release(conn);
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().unwrap();
    }
    done.store(true, Ordering::Release);
    observer.join().unwrap();

    let idle = pool.idle_len();
    assert!(idle <= MAX_POOL_SIZE);
    assert_eq!(tracker.created() - tracker.closed(), idle);

    pool.close();
    assert_eq!(tracker.created(), tracker.closed());
}

#[test]
fn close_races_with_workers() {
    let (pool, tracker) = common::pool(MAX_POOL_SIZE);

    let workers = (0..WORKERS)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || loop {
                match pool.acquire() {
                    Ok(conn) => pool.release(conn),
                    Err(err) => {
                        assert!(err.is_closed());
                        break;
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    thread::sleep(Duration::from_millis(10));
    pool.close();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(pool.idle_len(), 0);
    assert_eq!(tracker.created(), tracker.closed());
}
