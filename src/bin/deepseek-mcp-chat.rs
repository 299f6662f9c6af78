//! Interactive chat client
//!
//! Lines starting with `/read`, `/write` or `/search` become tool calls on
//! the connected server; anything else goes to the chat-completion API.

use clap::{Parser, ValueEnum};
use deepseek_mcp::completion::DEFAULT_API_BASE;
use deepseek_mcp::{BoxError, ChatSession, DeepSeekClient, McpClient};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Spawn the server and talk over its stdin/stdout
    Pipe,
    /// Connect to a running WebSocket server
    Socket,
    /// POST to a running HTTP server
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "deepseek-mcp-chat")]
#[command(about = "Chat client with /read, /write and /search tool intents", long_about = None)]
struct Args {
    /// How to reach the server
    #[arg(short, long, value_enum, default_value = "pipe")]
    transport: Transport,

    /// Server URL for the socket and http transports
    #[arg(long)]
    url: Option<String>,

    /// Server program spawned by the pipe transport
    #[arg(long, default_value = "deepseek-mcp-server")]
    server_command: String,

    /// API key for the chat-completion fallback
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the chat-completion API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

async fn connect(args: &Args) -> Result<McpClient, BoxError> {
    let client = match args.transport {
        Transport::Pipe => McpClient::pipe(&args.server_command, &["pipe"]).await?,
        Transport::Socket => {
            let url = args.url.as_deref().unwrap_or("ws://127.0.0.1:3001");
            McpClient::socket(url).await?
        }
        Transport::Http => McpClient::http(args.url.as_deref().unwrap_or("http://127.0.0.1:3000")),
    };
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("deepseek_mcp={}", args.log_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = connect(&args).await?;
    tracing::info!(transport = ?args.transport, "Connected to server");

    let session = ChatSession::new(client, DeepSeekClient::with_base_url(&args.api_base))
        .api_key(args.api_key.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        if let Some(turn) = session.submit(&line).await {
            if turn.is_failure() {
                eprintln!("{}", turn);
            } else {
                println!("{}", turn);
            }
        }
    }

    session.client().close().await?;
    Ok(())
}
