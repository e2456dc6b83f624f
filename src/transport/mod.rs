//! Line-oriented duplex channels to clients.
//!
//! A session only needs to read one line at a time, write raw bytes and
//! close its side; the traits below are that capability. `stream` provides
//! an implementation over any tokio byte stream, `tcp` and `in_memory`
//! build it for sockets and for in-process pipes.

#[async_trait::async_trait]
pub trait LineReader: Send {
    /// Next line without its terminator, or `None` once the peer closed
    /// the stream.
    async fn read_line(&mut self) -> anyhow::Result<Option<String>>;
}

#[async_trait::async_trait]
pub trait LineWriter: Send {
    async fn write_all(&mut self, data: &[u8]) -> anyhow::Result<()>;

    /// Shut down the write side. The peer sees end of stream.
    async fn close(&mut self) -> anyhow::Result<()>;
}

pub mod in_memory;
pub mod stream;
pub mod tcp;
