use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::config::TransportConfig;
use crate::transport::stream::{StreamLineReader, StreamLineWriter};

pub type TcpLineReader = StreamLineReader<OwnedReadHalf>;
pub type TcpLineWriter = StreamLineWriter<OwnedWriteHalf>;

/// Split an accepted socket into its line reader and writer.
pub fn split(stream: TcpStream, config: &TransportConfig) -> (TcpLineReader, TcpLineWriter) {
    if let Err(e) = stream.set_nodelay(true) {
        log::debug!("failed to set TCP_NODELAY: {}", e);
    }
    let (read, write) = stream.into_split();
    (
        StreamLineReader::new(read, config.max_line_len),
        StreamLineWriter::new(write, config.write_timeout),
    )
}
