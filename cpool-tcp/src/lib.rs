use cpool::pool::Pool;
use cpool::resource::Factory;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

pub struct TcpConnFactory {
    addr: SocketAddr,
    connect_timeout: Option<Duration>,
    nodelay: bool,
}

impl Factory for TcpConnFactory {
    type Output = TcpStream;
    type Error = io::Error;

    fn try_create(&self) -> Result<Self::Output, Self::Error> {
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout)?,
            None => TcpStream::connect(self.addr)?,
        };
        stream.set_nodelay(self.nodelay)?;
        debug!(peer = %self.addr, local = ?stream.local_addr().ok(), "connected");
        Ok(stream)
    }
}

impl TcpConnFactory {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: None,
            nodelay: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Resolves `addr` and builds a pool keeping up to `pool_size` idle
/// connections to the first resolved address.
pub fn connect<A: ToSocketAddrs>(
    addr: A,
    pool_size: usize,
) -> cpool::Result<Pool<TcpConnFactory>, io::Error> {
    let addr = addr
        .to_socket_addrs()
        .map_err(cpool::Error::Factory)?
        .next()
        .ok_or_else(|| {
            cpool::Error::Factory(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no socket address resolved",
            ))
        })?;
    Pool::new(TcpConnFactory::new(addr), pool_size)
}
