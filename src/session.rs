//! Client sessions.
//!
//! Each connection runs three tasks:
//! - a reader that turns incoming bytes into trimmed command lines,
//! - a writer that drains the session's outbound queue onto the wire,
//! - a dispatcher that parses lines and forwards them to the matchmaker.
//!
//! All three observe the same close flag. Whoever closes first (a read
//! error, a write error, `quit`, or the matchmaker) stops the reader and
//! writer, and the dispatcher then reports the disconnect exactly once.

use core::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};

use crate::command::{Command, HELP};
use crate::common::CommandError;
use crate::matchmaker::MatchmakerHandle;
use crate::transport::{LineReader, LineWriter};

/// Command lines buffered between a session's reader and dispatcher.
const LINE_BUFFER: usize = 16;

/// Identifier assigned to a connection when it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data queued for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Bytes(Vec<u8>),
}

impl Outbound {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Outbound::Text(text) => text.as_bytes(),
            Outbound::Bytes(data) => data,
        }
    }
}

/// Cheap, cloneable handle used to talk to a session.
///
/// Sends never block: data is queued for the session's writer task and
/// silently dropped once the session has gone away.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    outbound: mpsc::UnboundedSender<Outbound>,
    closed: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// Create a handle together with the receiving end of its outbound
    /// queue.
    pub fn channel(id: SessionId) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        (
            Self {
                id,
                outbound,
                closed: Arc::new(closed),
            },
            outbound_rx,
        )
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn send(&self, text: impl Into<String>) {
        self.queue(Outbound::Text(text.into()));
    }

    /// Send `text` followed by a newline.
    pub fn send_line(&self, text: impl AsRef<str>) {
        let mut line = String::with_capacity(text.as_ref().len() + 1);
        line.push_str(text.as_ref());
        line.push('\n');
        self.queue(Outbound::Text(line));
    }

    pub fn send_bytes(&self, data: Vec<u8>) {
        self.queue(Outbound::Bytes(data));
    }

    fn queue(&self, msg: Outbound) {
        if self.is_closed() || self.outbound.send(msg).is_err() {
            debug!("session {} is closed, dropping outbound data", self.id);
        }
    }

    /// Close the session. Safe to call any number of times from any task;
    /// returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let was_closed = self.closed.send_replace(true);
        if !was_closed {
            debug!("session {} closing", self.id);
        }
        !was_closed
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the session has been closed.
    pub async fn closed(&self) {
        wait_closed(&mut self.closed.subscribe()).await;
    }

    fn subscribe_closed(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

/// Start the tasks for a freshly accepted connection: send the greeting,
/// register the player with the matchmaker, then begin reading commands.
///
/// Registration is acknowledged before any command is read, so a client's
/// first `play` can never reach the matchmaker ahead of its registration.
pub async fn start<R, W>(
    id: SessionId,
    reader: R,
    writer: W,
    matchmaker: MatchmakerHandle,
    motd: &str,
) -> anyhow::Result<SessionHandle>
where
    R: LineReader + 'static,
    W: LineWriter + 'static,
{
    let (session, outbound) = SessionHandle::channel(id);
    tokio::spawn(write_loop(session.clone(), writer, outbound));
    session.send(motd);

    if let Err(e) = matchmaker.register(session.clone()).await {
        session.close();
        return Err(e);
    }

    let (lines_tx, lines_rx) = mpsc::channel(LINE_BUFFER);
    tokio::spawn(read_loop(session.clone(), reader, lines_tx));
    tokio::spawn(dispatch_loop(session.clone(), lines_rx, matchmaker));
    Ok(session)
}

async fn read_loop<R: LineReader>(
    session: SessionHandle,
    mut reader: R,
    lines: mpsc::Sender<String>,
) {
    let id = session.id();
    let mut closed = session.subscribe_closed();
    loop {
        let next = tokio::select! {
            res = reader.read_line() => res,
            _ = wait_closed(&mut closed) => break,
        };
        match next {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if lines.send(line.to_string()).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("session {} closed by peer", id);
                break;
            }
            Err(e) => {
                warn!("session {} read failed: {:#}", id, e);
                break;
            }
        }
    }
    session.close();
}

async fn write_loop<W: LineWriter>(
    session: SessionHandle,
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let id = session.id();
    let mut closed = session.subscribe_closed();
    loop {
        tokio::select! {
            biased;
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                if let Err(e) = writer.write_all(msg.as_bytes()).await {
                    warn!("session {} write failed: {:#}", id, e);
                    session.close();
                    return;
                }
            }
            _ = wait_closed(&mut closed) => {
                // Flush whatever was queued before the close.
                while let Ok(msg) = outbound.try_recv() {
                    if writer.write_all(msg.as_bytes()).await.is_err() {
                        break;
                    }
                }
                break;
            }
        }
    }
    if let Err(e) = writer.close().await {
        debug!("session {} shutdown: {:#}", id, e);
    }
}

/// Reports the disconnect when the dispatcher ends, including by panic.
struct DisconnectGuard {
    session: SessionHandle,
    matchmaker: MatchmakerHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.session.close();
        self.matchmaker.disconnect(self.session.id());
    }
}

async fn dispatch_loop(
    session: SessionHandle,
    mut lines: mpsc::Receiver<String>,
    matchmaker: MatchmakerHandle,
) {
    let id = session.id();
    let _guard = DisconnectGuard {
        session: session.clone(),
        matchmaker: matchmaker.clone(),
    };

    while let Some(line) = lines.recv().await {
        // Lines already buffered when the session closed are dropped.
        if session.is_closed() {
            break;
        }
        debug!("session {} command: {:?}", id, line);
        let sent = match line.parse::<Command>() {
            Ok(Command::Play) => matchmaker.join(id).await,
            Ok(Command::Fire(target)) => matchmaker.fire(id, target),
            Ok(Command::Board) => matchmaker.show_board(id),
            Ok(Command::Help) => {
                session.send(HELP);
                Ok(())
            }
            Ok(Command::Quit) => {
                session.send_line("Goodbye");
                session.close();
                break;
            }
            Err(CommandError::Unknown(cmd)) => {
                info!("session {} sent unknown command {:?}", id, cmd);
                session.send_line(format!("Unknown command: {}. Type help for a list.", cmd));
                Ok(())
            }
            Err(e) => {
                session.send_line(format!("error: {}", e));
                Ok(())
            }
        };
        if let Err(e) = sent {
            warn!("session {}: {:#}", id, e);
            break;
        }
    }
}
