use std::path::PathBuf;

use battleships::{
    init_logging, Server, ServerConfig, TransportConfig, DEFAULT_BIND, DEFAULT_MOTD,
    JOIN_QUEUE_CAPACITY, MAX_LINE_LEN,
};
use clap::Parser;
use log::warn;
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: String,
    #[arg(long, help = "File whose contents are sent to every new connection")]
    motd: Option<PathBuf>,
    #[arg(long, help = "Fix RNG seed for reproducible fleet placement (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(long, default_value_t = JOIN_QUEUE_CAPACITY, help = "Capacity of the matchmaking join queue")]
    join_queue: usize,
    #[arg(long, default_value_t = MAX_LINE_LEN, help = "Longest accepted command line in bytes")]
    max_line_len: usize,
    #[arg(long, default_value_t = 10, help = "Seconds before a stalled client write fails")]
    write_timeout_secs: u64,
}

fn load_motd(path: Option<PathBuf>) -> String {
    let Some(path) = path else {
        return DEFAULT_MOTD.to_string();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read MOTD from {}: {}", path.display(), e);
            DEFAULT_MOTD.to_string()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Some(s) = cli.seed {
        println!("Using fixed seed: {} (fleet placement will be reproducible)", s);
    }
    let config = ServerConfig {
        bind: cli.bind,
        motd: load_motd(cli.motd),
        seed: cli.seed,
        join_queue_capacity: cli.join_queue,
        transport: TransportConfig {
            max_line_len: cli.max_line_len,
            write_timeout: Duration::from_secs(cli.write_timeout_secs),
        },
    };

    println!("Starting battleships server at {}...", config.bind);
    let server = Server::bind(config).await?;
    server.run().await
}
