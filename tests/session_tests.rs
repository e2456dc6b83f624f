use battleships::session::{self, SessionHandle, SessionId};
use battleships::transport::in_memory;
use battleships::{Matchmaker, MatchmakerHandle, Snapshot, TransportConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::time::{sleep, timeout, Duration};

const MOTD: &str = "Hello sailor\n";
const STEP: Duration = Duration::from_secs(5);
/// Enough `help` requests for the replies to overflow an in-memory pipe.
const PIPE_FILL_REQUESTS: usize = 1024;

struct Client {
    stream: BufReader<DuplexStream>,
    session: SessionHandle,
}

impl Client {
    async fn send(&mut self, line: &str) {
        self.send_raw(format!("{}\n", line).as_bytes()).await;
    }

    async fn send_raw(&mut self, data: &[u8]) {
        self.stream.get_mut().write_all(data).await.unwrap();
    }

    /// Fail if the server sends anything within `wait`.
    async fn assert_quiet(&mut self, wait: Duration) {
        let mut line = String::new();
        let res = timeout(wait, self.stream.read_line(&mut line)).await;
        assert!(res.is_err(), "unexpected output {:?}", line);
    }

    /// Next line from the server, or `None` at end of stream.
    async fn line(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = timeout(STEP, self.stream.read_line(&mut line))
            .await
            .expect("timed out waiting for the server")
            .unwrap();
        if n == 0 {
            return None;
        }
        Some(line.trim_end_matches('\n').to_string())
    }
}

fn spawn_matchmaker() -> MatchmakerHandle {
    let (matchmaker, handle) = Matchmaker::new(2, SmallRng::seed_from_u64(11));
    tokio::spawn(matchmaker.run());
    handle
}

async fn connect(handle: &MatchmakerHandle, id: u64, config: &TransportConfig) -> Client {
    let (reader, writer, client) = in_memory::pair(config);
    let session = session::start(SessionId::new(id), reader, writer, handle.clone(), MOTD)
        .await
        .unwrap();
    Client {
        stream: BufReader::new(client),
        session,
    }
}

async fn wait_for(handle: &MatchmakerHandle, cond: impl Fn(&Snapshot) -> bool) -> Snapshot {
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.unwrap();
        if cond(&snapshot) {
            return snapshot;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("matchmaker never reached the expected state");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_greeting_and_registration() {
    let handle = spawn_matchmaker();
    let mut client = connect(&handle, 1, &TransportConfig::default()).await;

    assert_eq!(client.line().await.as_deref(), Some("Hello sailor"));
    // Registration completes before start returns.
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players, vec![SessionId::new(1)]);
    assert!(!client.session.is_closed());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_command_keeps_session_open() {
    let handle = spawn_matchmaker();
    let mut client = connect(&handle, 1, &TransportConfig::default()).await;
    client.line().await;

    client.send("dance").await;
    assert_eq!(
        client.line().await.as_deref(),
        Some("Unknown command: dance. Type help for a list.")
    );
    client.send("fire").await;
    assert_eq!(
        client.line().await.as_deref(),
        Some("error: usage: fire <A-J><1-10>, e.g. fire B3")
    );
    // Blank lines are skipped.
    client.send("   ").await;
    client.send("help").await;
    assert_eq!(client.line().await.as_deref(), Some("Commands:"));
    assert!(!client.session.is_closed());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quit_says_goodbye_and_disconnects() {
    let handle = spawn_matchmaker();
    let mut client = connect(&handle, 1, &TransportConfig::default()).await;
    client.line().await;

    client.send("QUIT").await;
    assert_eq!(client.line().await.as_deref(), Some("Goodbye"));
    assert_eq!(client.line().await, None);
    assert!(client.session.is_closed());
    wait_for(&handle, |s| s.players.is_empty()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_commands_after_quit_are_discarded() {
    let handle = spawn_matchmaker();
    let config = TransportConfig::default();
    let mut a = connect(&handle, 1, &config).await;
    let mut b = connect(&handle, 2, &config).await;
    a.line().await;
    b.line().await;

    a.send("play").await;
    assert_eq!(a.line().await.as_deref(), Some("Waiting for an opponent..."));

    // Both lines arrive together; only the quit may take effect.
    b.send_raw(b"quit\nplay\n").await;
    assert_eq!(b.line().await.as_deref(), Some("Goodbye"));
    assert_eq!(b.line().await, None);

    let snapshot = wait_for(&handle, |s| s.players == vec![SessionId::new(1)]).await;
    let waiting = snapshot.waiting().unwrap();
    assert_eq!(waiting.players, vec![SessionId::new(1)]);
    assert_eq!(snapshot.cancelled, 0);
    a.assert_quiet(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_line_disconnects() {
    let handle = spawn_matchmaker();
    let config = TransportConfig {
        max_line_len: 16,
        ..TransportConfig::default()
    };
    let mut client = connect(&handle, 1, &config).await;
    client.line().await;

    client.send(&"x".repeat(64)).await;
    assert_eq!(client.line().await, None);
    wait_for(&handle, |s| s.players.is_empty()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_hangup_cancels_started_match() {
    let handle = spawn_matchmaker();
    let config = TransportConfig::default();
    let mut a = connect(&handle, 1, &config).await;
    let mut b = connect(&handle, 2, &config).await;
    a.line().await;
    b.line().await;

    a.send("play").await;
    assert_eq!(a.line().await.as_deref(), Some("Waiting for an opponent..."));
    b.send("play").await;
    assert_eq!(b.line().await.as_deref(), Some("Match started! Your fleet:"));
    for _ in 0..11 {
        b.line().await.unwrap();
    }
    assert_eq!(b.line().await.as_deref(), Some("Your opponent fires first"));
    wait_for(&handle, |s| s.match_of(SessionId::new(1)).is_some()).await;

    drop(a);
    assert_eq!(b.line().await.as_deref(), Some("Match cancelled"));
    let snapshot = wait_for(&handle, |s| s.cancelled == 1).await;
    assert_eq!(snapshot.players, vec![SessionId::new(2)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_utf8_disconnects() {
    let handle = spawn_matchmaker();
    let mut client = connect(&handle, 1, &TransportConfig::default()).await;
    client.line().await;

    client.send_raw(b"\xff\xfe\n").await;
    assert_eq!(client.line().await, None);
    assert!(client.session.is_closed());
    wait_for(&handle, |s| s.players.is_empty()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stalled_client_is_disconnected_on_write_timeout() {
    let handle = spawn_matchmaker();
    let config = TransportConfig {
        write_timeout: Duration::from_millis(50),
        ..TransportConfig::default()
    };
    let mut client = connect(&handle, 1, &config).await;

    // Never read: the replies fill the pipe and the server's writes stall.
    let requests = "help\n".repeat(PIPE_FILL_REQUESTS);
    client.send_raw(requests.as_bytes()).await;

    timeout(STEP, client.session.closed())
        .await
        .expect("session stayed open with a stalled client");
    wait_for(&handle, |s| s.players.is_empty()).await;
}

#[test]
fn test_close_is_idempotent() {
    let (session, _outbox) = SessionHandle::channel(SessionId::new(9));
    assert!(!session.is_closed());
    assert!(session.close());
    assert!(!session.close());
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_sends_after_close_are_dropped() {
    let (session, mut outbox) = SessionHandle::channel(SessionId::new(9));
    session.send_line("before");
    session.close();
    session.send_line("after");
    session.closed().await;

    assert_eq!(outbox.recv().await.unwrap().as_bytes(), b"before\n");
    assert!(outbox.try_recv().is_err());
}
