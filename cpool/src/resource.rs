use std::convert::Infallible;
use std::error::Error;

/// A resource the pool can dispose of.
///
/// `close` consumes the resource, so the pool can call it at most once per
/// instance. Its error is only logged by the pool.
pub trait Close {
    type Error: Error + Send + Sync + 'static;

    fn close(self) -> Result<(), Self::Error>;
}

/// Creates new resources when the pool has none idle.
pub trait Factory {
    type Output: Close;
    type Error: Error + Send + Sync + 'static;

    fn try_create(&self) -> Result<Self::Output, Self::Error>;
}

impl<F, R, E> Factory for F
where
    F: Fn() -> Result<R, E>,
    R: Close,
    E: Error + Send + Sync + 'static,
{
    type Output = R;
    type Error = E;

    fn try_create(&self) -> Result<Self::Output, Self::Error> {
        self()
    }
}

impl<T: Close> Close for Box<T> {
    type Error = T::Error;

    fn close(self) -> Result<(), Self::Error> {
        (*self).close()
    }
}

impl Close for std::fs::File {
    type Error = std::io::Error;

    fn close(self) -> Result<(), Self::Error> {
        self.sync_all()
    }
}

impl Close for std::net::TcpStream {
    type Error = std::io::Error;

    fn close(self) -> Result<(), Self::Error> {
        match self.shutdown(std::net::Shutdown::Both) {
            Err(err) if err.kind() != std::io::ErrorKind::NotConnected => Err(err),
            _ => Ok(()),
        }
    }
}

impl Close for Vec<u8> {
    type Error = Infallible;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
