//! Server startup configuration

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Default port of the `socket` binding
pub const DEFAULT_SOCKET_PORT: u16 = 3001;
/// Default port of the `http` binding
pub const DEFAULT_HTTP_PORT: u16 = 3000;
/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Which transport binding the server runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportKind {
    /// Newline-delimited JSON over stdin/stdout
    #[default]
    #[value(alias = "stdio")]
    Pipe,
    /// WebSocket, many concurrent peers
    #[value(alias = "websocket")]
    Socket,
    /// Stateless HTTP POST
    Http,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Pipe => "pipe",
            TransportKind::Socket => "socket",
            TransportKind::Http => "http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <TransportKind as ValueEnum>::from_str(s, true)
            .map_err(|_| format!("unknown transport '{}', expected pipe, socket or http", s))
    }
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub host: String,
    pub socket_port: u16,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            host: DEFAULT_HOST.to_string(),
            socket_port: DEFAULT_SOCKET_PORT,
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl ServerConfig {
    pub fn new(transport: TransportKind) -> Self {
        Self {
            transport,
            ..Default::default()
        }
    }

    /// Listen address for network bindings; `None` for the pipe binding
    pub fn bind_addr(&self) -> Option<String> {
        match self.transport {
            TransportKind::Pipe => None,
            TransportKind::Socket => Some(format!("{}:{}", self.host, self.socket_port)),
            TransportKind::Http => Some(format!("{}:{}", self.host, self.http_port)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_names_and_aliases() {
        assert_eq!("pipe".parse::<TransportKind>().unwrap(), TransportKind::Pipe);
        assert_eq!("stdio".parse::<TransportKind>().unwrap(), TransportKind::Pipe);
        assert_eq!("socket".parse::<TransportKind>().unwrap(), TransportKind::Socket);
        assert_eq!("websocket".parse::<TransportKind>().unwrap(), TransportKind::Socket);
        assert_eq!("HTTP".parse::<TransportKind>().unwrap(), TransportKind::Http);
        assert!("ftp".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(ServerConfig::new(TransportKind::Pipe).bind_addr(), None);
        assert_eq!(
            ServerConfig::new(TransportKind::Socket).bind_addr().as_deref(),
            Some("127.0.0.1:3001")
        );
        assert_eq!(
            ServerConfig::new(TransportKind::Http).bind_addr().as_deref(),
            Some("127.0.0.1:3000")
        );
    }
}
