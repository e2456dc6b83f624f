use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tokio::time::{timeout, Duration};

use crate::config::TransportConfig;
use crate::transport::{LineReader, LineWriter};

/// Reads newline-delimited UTF-8 lines, rejecting any line longer than the
/// configured limit.
pub struct StreamLineReader<R> {
    inner: BufReader<R>,
    max_line_len: usize,
}

impl<R: AsyncRead + Unpin + Send> StreamLineReader<R> {
    pub fn new(inner: R, max_line_len: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            max_line_len,
        }
    }
}

/// Writes raw bytes, failing any write that takes longer than the timeout.
pub struct StreamLineWriter<W> {
    inner: W,
    timeout_duration: Duration,
}

impl<W: AsyncWrite + Unpin + Send> StreamLineWriter<W> {
    pub fn new(inner: W, timeout_duration: Duration) -> Self {
        Self {
            inner,
            timeout_duration,
        }
    }
}

/// Split any duplex byte stream into a line reader and writer.
pub fn split<S>(
    stream: S,
    config: &TransportConfig,
) -> (StreamLineReader<ReadHalf<S>>, StreamLineWriter<WriteHalf<S>>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read, write) = tokio::io::split(stream);
    (
        StreamLineReader::new(read, config.max_line_len),
        StreamLineWriter::new(write, config.write_timeout),
    )
}

fn read_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("Write error: {}", e),
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> LineReader for StreamLineReader<R> {
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        // Room for the longest allowed line plus its terminator.
        let limit = self.max_line_len as u64 + 1;
        let mut buf = Vec::new();
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(read_error)?;
        if n == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if buf.len() as u64 >= limit {
            return Err(anyhow::anyhow!(
                "Line too long: more than {} bytes",
                self.max_line_len
            ));
        }

        let line =
            String::from_utf8(buf).map_err(|_| anyhow::anyhow!("Line is not valid UTF-8"))?;
        Ok(Some(line))
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> LineWriter for StreamLineWriter<W> {
    async fn write_all(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let timeout_duration = self.timeout_duration;
        let inner = &mut self.inner;
        let write_op = async move {
            inner.write_all(data).await.map_err(write_error)?;
            inner.flush().await.map_err(write_error)
        };
        timeout(timeout_duration, write_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", timeout_duration))?
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.inner.shutdown().await.map_err(write_error)
    }
}
