use std::result::Result as StdResult;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E> {
    #[error("pool capacity must be at least 1, got {capacity}")]
    InvalidConfiguration { capacity: usize },

    #[error("attempted to acquire a resource on a closed pool")]
    PoolClosed,

    #[error("error returned from the resource factory")]
    Factory(#[source] E),
}

impl<E> Error<E> {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::PoolClosed)
    }

    /// Returns the factory error if this is [`Error::Factory`].
    pub fn into_factory(self) -> Option<E> {
        match self {
            Self::Factory(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E> = StdResult<T, Error<E>>;
