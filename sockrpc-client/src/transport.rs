//! Stream socket transport
//!
//! A [`Transport`] is the one duplex byte stream a client owns for its whole
//! lifetime. It is either a Unix-domain stream socket or a TCP connection,
//! chosen by [`TransportKind`].
//!
//! # Transport Names
//!
//! Kinds can be given by their conventional network names:
//!
//! | name                               | kind                      |
//! |------------------------------------|---------------------------|
//! | `unix`, `unixgram`, `unixpacket`   | `Unix` (stream socket)    |
//! | `tcp`                              | `Tcp` (any address family)|
//! | `tcp4` / `tcp6`                    | `Tcp4` / `Tcp6`           |
//!
//! Anything else is `Error::UnsupportedTransport`, raised while parsing the
//! name, so no socket is ever created for it.
//!
//! Dialing does not retry and sets no timeout.

use sockrpc_core::{ConnectStage, Error, Result};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

/// Kind of stream socket to dial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Unix-domain stream socket; the address is a filesystem path
    #[default]
    Unix,
    /// TCP over IPv4 or IPv6; the address is `host:port`
    Tcp,
    /// TCP restricted to IPv4 addresses
    Tcp4,
    /// TCP restricted to IPv6 addresses
    Tcp6,
}

impl TransportKind {
    /// True for the TCP kinds
    pub fn is_tcp(self) -> bool {
        !matches!(self, TransportKind::Unix)
    }

    fn accepts(self, addr: &SocketAddr) -> bool {
        match self {
            TransportKind::Tcp4 => addr.is_ipv4(),
            TransportKind::Tcp6 => addr.is_ipv6(),
            TransportKind::Tcp | TransportKind::Unix => true,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Unix => "unix",
            TransportKind::Tcp => "tcp",
            TransportKind::Tcp4 => "tcp4",
            TransportKind::Tcp6 => "tcp6",
        };
        f.write_str(name)
    }
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "unix" | "unixgram" | "unixpacket" => Ok(TransportKind::Unix),
            "tcp" => Ok(TransportKind::Tcp),
            "tcp4" => Ok(TransportKind::Tcp4),
            "tcp6" => Ok(TransportKind::Tcp6),
            other => Err(Error::UnsupportedTransport(other.to_string())),
        }
    }
}

/// A connected stream socket
#[derive(Debug)]
pub enum Transport {
    /// Unix-domain stream socket
    #[cfg(unix)]
    Unix(UnixStream),
    /// TCP connection
    Tcp(TcpStream),
}

/// Connect to `address` using the given kind of socket
///
/// # Errors
///
/// `Error::Connection` with `ConnectStage::Resolve` when a TCP host cannot be
/// resolved (or resolves to no address of the requested family), and with
/// `ConnectStage::Connect` when the socket cannot be connected.
#[tracing::instrument]
pub async fn dial(kind: TransportKind, address: &str) -> Result<Transport> {
    let transport = match kind {
        TransportKind::Unix => dial_unix(address).await?,
        TransportKind::Tcp | TransportKind::Tcp4 | TransportKind::Tcp6 => {
            dial_tcp(kind, address).await?
        }
    };

    tracing::debug!("Transport connected");
    Ok(transport)
}

#[cfg(unix)]
async fn dial_unix(address: &str) -> Result<Transport> {
    UnixStream::connect(address)
        .await
        .map(Transport::Unix)
        .map_err(|e| connect_error(address, ConnectStage::Connect, e))
}

#[cfg(not(unix))]
async fn dial_unix(_address: &str) -> Result<Transport> {
    Err(Error::UnsupportedTransport("unix".to_string()))
}

async fn dial_tcp(kind: TransportKind, address: &str) -> Result<Transport> {
    let candidates: Vec<SocketAddr> = tokio::net::lookup_host(address)
        .await
        .map_err(|e| connect_error(address, ConnectStage::Resolve, e))?
        .filter(|addr| kind.accepts(addr))
        .collect();

    if candidates.is_empty() {
        return Err(Error::Connection {
            address: address.to_string(),
            stage: ConnectStage::Resolve,
            cause: format!("no {} address found", kind),
        });
    }

    let mut last_error = None;
    for candidate in candidates {
        match TcpStream::connect(candidate).await {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
                }
                return Ok(Transport::Tcp(stream));
            }
            Err(e) => {
                tracing::debug!(addr = %candidate, error = %e, "Connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    let cause = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no address connected".to_string());
    Err(Error::Connection {
        address: address.to_string(),
        stage: ConnectStage::Connect,
        cause,
    })
}

fn connect_error(address: &str, stage: ConnectStage, error: io::Error) -> Error {
    Error::Connection {
        address: address.to_string(),
        stage,
        cause: error.to_string(),
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            Transport::Unix(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            #[cfg(unix)]
            Transport::Unix(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            Transport::Unix(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tcp(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            Transport::Unix(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix_names() {
        for name in ["unix", "unixgram", "unixpacket"] {
            assert_eq!(name.parse::<TransportKind>().unwrap(), TransportKind::Unix);
        }
    }

    #[test]
    fn test_parse_tcp_names() {
        assert_eq!("tcp".parse::<TransportKind>().unwrap(), TransportKind::Tcp);
        assert_eq!("tcp4".parse::<TransportKind>().unwrap(), TransportKind::Tcp4);
        assert_eq!("tcp6".parse::<TransportKind>().unwrap(), TransportKind::Tcp6);
    }

    #[test]
    fn test_parse_unsupported() {
        match "udp".parse::<TransportKind>() {
            Err(Error::UnsupportedTransport(name)) => assert_eq!(name, "udp"),
            other => panic!("Expected UnsupportedTransport, got {:?}", other),
        }
        assert!("".parse::<TransportKind>().is_err());
        assert!("TCP".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for kind in [
            TransportKind::Unix,
            TransportKind::Tcp,
            TransportKind::Tcp4,
            TransportKind::Tcp6,
        ] {
            assert_eq!(kind.to_string().parse::<TransportKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_family_filter() {
        let v4: SocketAddr = "127.0.0.1:5260".parse().unwrap();
        let v6: SocketAddr = "[::1]:5260".parse().unwrap();

        assert!(TransportKind::Tcp.accepts(&v4) && TransportKind::Tcp.accepts(&v6));
        assert!(TransportKind::Tcp4.accepts(&v4) && !TransportKind::Tcp4.accepts(&v6));
        assert!(TransportKind::Tcp6.accepts(&v6) && !TransportKind::Tcp6.accepts(&v4));
    }

    #[tokio::test]
    async fn test_dial_missing_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");

        match dial(TransportKind::Unix, path.to_str().unwrap()).await {
            Err(Error::Connection { stage, .. }) => assert_eq!(stage, ConnectStage::Connect),
            other => panic!("Expected connection error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dial_unresolvable_tcp_address() {
        match dial(TransportKind::Tcp, "not an address").await {
            Err(Error::Connection { stage, .. }) => assert_eq!(stage, ConnectStage::Resolve),
            other => panic!("Expected resolve error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dial_tcp_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let transport = dial(TransportKind::Tcp4, &addr).await.unwrap();
        assert!(matches!(transport, Transport::Tcp(_)));

        match dial(TransportKind::Tcp6, &addr).await {
            Err(Error::Connection { stage, .. }) => assert_eq!(stage, ConnectStage::Resolve),
            other => panic!("Expected resolve error, got {:?}", other),
        }
    }
}
