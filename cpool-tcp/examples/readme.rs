use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            thread::spawn(move || -> io::Result<u64> {
                io::copy(&mut stream.try_clone()?, &mut stream)
            });
        }
    });

    let pool = cpool_tcp::connect(addr, 8).unwrap();
    for _ in 0..3 {
        let mut conn = pool.get().unwrap();
        conn.write_all(b"ping")?;
        let mut buf = [0; 4];
        conn.read_exact(&mut buf)?;
        dbg!(conn.local_addr()?, std::str::from_utf8(&buf).unwrap());
    }
    pool.close();
    Ok(())
}
