use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

use crate::config::TransportConfig;
use crate::transport::stream::{self, StreamLineReader, StreamLineWriter};

/// Bytes buffered in each direction of an in-memory pipe.
const PIPE_CAPACITY: usize = 64 * 1024;

pub type InMemoryLineReader = StreamLineReader<ReadHalf<DuplexStream>>;
pub type InMemoryLineWriter = StreamLineWriter<WriteHalf<DuplexStream>>;

/// Create a connected pipe: the server side as a line reader/writer pair,
/// and the raw client end.
pub fn pair(config: &TransportConfig) -> (InMemoryLineReader, InMemoryLineWriter, DuplexStream) {
    let (server, client) = tokio::io::duplex(PIPE_CAPACITY);
    let (reader, writer) = stream::split(server, config);
    (reader, writer, client)
}
