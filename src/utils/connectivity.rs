//! Network reachability checks.
//!
//! [`Connectivity::is_online`] is called on every submitted query, so
//! implementations must answer from memory. [`ProbedConnectivity`] keeps the
//! answer fresh by running a [`TcpProbe`] on the blocking pool in the
//! background.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Answers whether a network is currently reachable
///
/// Must not block or touch the network.
pub trait Connectivity: Send + Sync + std::fmt::Debug {
    fn is_online(&self) -> bool;
}

/// Connectivity with a fixed, switchable answer
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Considers the network reachable if a TCP connection to `host:port` succeeds
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probe the host of an HTTP(S) URL on its default port
    pub fn for_url(url: &str, timeout: Duration) -> Option<Self> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default()?;
        Some(Self::new(host, port, timeout))
    }
}

impl TcpProbe {
    /// Try to connect, blocking the calling thread for up to `timeout` per address
    pub fn reachable(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!("Cannot resolve {}: {}", self.host, e);
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }

        tracing::debug!("No route to {}:{}", self.host, self.port);
        false
    }

    /// Run [`reachable`](Self::reachable) on the blocking thread pool
    pub async fn check(&self) -> bool {
        let probe = self.clone();
        tokio::task::spawn_blocking(move || probe.reachable())
            .await
            .unwrap_or(false)
    }
}

/// Connectivity answered from the latest background [`TcpProbe`] result
///
/// The probe runs once on [`start`](Self::start) and then every `interval`.
/// The refresh task stops when this value is dropped.
#[derive(Debug)]
pub struct ProbedConnectivity {
    online: Arc<AtomicBool>,
    refresher: JoinHandle<()>,
}

impl ProbedConnectivity {
    /// Probe once, then keep probing every `interval`
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(probe: TcpProbe, interval: Duration) -> Self {
        let online = Arc::new(AtomicBool::new(probe.check().await));

        let refresher = {
            let online = Arc::clone(&online);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(interval).await;
                    let now = probe.check().await;
                    if online.swap(now, Ordering::SeqCst) != now {
                        tracing::info!(
                            "Network to {}:{} is now {}",
                            probe.host,
                            probe.port,
                            if now { "reachable" } else { "unreachable" }
                        );
                    }
                }
            })
        };

        Self { online, refresher }
    }
}

impl Connectivity for ProbedConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

impl Drop for ProbedConnectivity {
    fn drop(&mut self) {
        self.refresher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_connectivity_toggle() {
        let conn = StaticConnectivity::online();
        assert!(conn.is_online());
        conn.set_online(false);
        assert!(!conn.is_online());
        assert!(!StaticConnectivity::offline().is_online());
    }

    #[test]
    fn test_tcp_probe_for_url() {
        let probe = TcpProbe::for_url(
            "https://www.googleapis.com/books/v1/volumes",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(probe.host, "www.googleapis.com");
        assert_eq!(probe.port, 443);

        let invalid = TcpProbe::for_url("nonsense", Duration::from_secs(1));
        assert!(invalid.is_none());
    }

    #[test]
    fn test_tcp_probe_local_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(probe.reachable());
    }

    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_tcp_probe_check_closed_port() {
        let probe = TcpProbe::new("127.0.0.1", closed_port(), Duration::from_secs(1));
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn test_probed_connectivity_follows_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = TcpProbe::new("127.0.0.1", port, Duration::from_secs(1));

        let conn = ProbedConnectivity::start(probe, Duration::from_millis(20)).await;
        assert!(conn.is_online());

        drop(listener);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while conn.is_online() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!conn.is_online());
    }

    #[tokio::test]
    async fn test_probed_connectivity_answers_without_probing() {
        let probe = TcpProbe::new("127.0.0.1", closed_port(), Duration::from_secs(1));
        let conn = ProbedConnectivity::start(probe, Duration::from_secs(3600)).await;

        let started = std::time::Instant::now();
        for _ in 0..1000 {
            assert!(!conn.is_online());
        }
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
