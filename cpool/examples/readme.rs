use cpool::{Close, Pool, Pooled};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const MAX_QUERIES: usize = 25;
const POOLED_RESOURCES: usize = 2;

#[derive(Debug)]
struct DbConnection {
    id: usize,
}

impl Close for DbConnection {
    type Error = Infallible;

    fn close(self) -> Result<(), Self::Error> {
        tracing::info!(id = self.id, "closing connection");
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ids = AtomicUsize::new(0);
    let factory = move || {
        let id = ids.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(id, "creating connection");
        Ok::<_, Infallible>(DbConnection { id })
    };
    // create resources lazily, keep at most two idle ones.
    let pool = Pool::new(factory, POOLED_RESOURCES).unwrap();

    let handles = (0..MAX_QUERIES)
        .map(|query| {
            let pool = pool.clone();
            thread::spawn(move || {
                // released back to the pool when `conn` is dropped.
                let conn = pool.get().unwrap();
                thread::sleep(Duration::from_millis(query as u64 % 5 * 10));
                println!("query {:02}: connection {}", query, conn.id);
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    // take a connection out of the pool; it is no longer managed.
    let conn = Pooled::take(pool.get().unwrap());
    dbg!(pool.status());
    conn.close().unwrap();

    // close every idle connection; later acquires fail.
    pool.close();
    dbg!(pool.acquire().unwrap_err());
}
