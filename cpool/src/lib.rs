//! Non-blocking Bounded Pool of Closable Resources
mod error;
pub mod pool;
pub mod resource;
pub mod sync;

pub use error::{Error, Result};
pub use pool::{Pool, Pooled, Status};
pub use resource::{Close, Factory};
