//! deepseek-mcp server
//!
//! Serves the built-in capabilities over exactly one binding, chosen by the
//! positional transport argument (`pipe`, `socket` or `http`).

use clap::Parser;
use deepseek_mcp::config::{DEFAULT_HOST, DEFAULT_HTTP_PORT, DEFAULT_SOCKET_PORT};
use deepseek_mcp::{
    BoxError, HttpTransport, ServerConfig, StdioTransport, TransportKind, WebSocketTransport,
    builtins,
};

#[derive(Parser, Debug)]
#[command(name = "deepseek-mcp-server")]
#[command(about = "Capability-dispatch server speaking JSON-RPC", long_about = None)]
struct Args {
    /// Transport binding to serve
    #[arg(value_enum, default_value_t = TransportKind::Pipe)]
    transport: TransportKind,

    /// Listen host for the socket and http bindings
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port of the socket binding
    #[arg(long, default_value_t = DEFAULT_SOCKET_PORT)]
    socket_port: u16,

    /// Port of the http binding
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
    http_port: u16,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        ServerConfig {
            transport: args.transport,
            host: args.host.clone(),
            socket_port: args.socket_port,
            http_port: args.http_port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    // Logs go to stderr; stdout belongs to the pipe binding
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("deepseek_mcp={}", args.log_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from(&args);
    let dispatcher = builtins::dispatcher().map_err(|e| {
        tracing::error!(error = %e, "Failed to register built-in capabilities");
        e
    })?;

    tracing::info!(
        transport = %config.transport,
        tools = dispatcher.registry().len(deepseek_mcp::Category::Tool),
        "Starting deepseek-mcp server"
    );

    match (config.transport, config.bind_addr()) {
        (TransportKind::Pipe, _) | (_, None) => StdioTransport::new(dispatcher).run().await?,
        (TransportKind::Socket, Some(addr)) => {
            WebSocketTransport::new(dispatcher).serve(&addr).await?
        }
        (TransportKind::Http, Some(addr)) => HttpTransport::new(dispatcher).serve(&addr).await?,
    }

    Ok(())
}
