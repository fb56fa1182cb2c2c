//! Connectivity gate.
//!
//! A cheap TCP reachability probe run before any credential or project-list
//! access. Both the web host and the git bridge must answer; the short
//! timeout keeps the "should I even try" decision fast.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use quill_core::Config;

/// Default probe timeout per host.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// True when a TCP connection to `host:port` succeeds within `timeout`.
///
/// Resolution failures count as unreachable.
pub fn host_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    for addr in addrs {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            return true;
        }
    }
    false
}

/// Probe both configured hosts on 443. Offline when either fails.
pub fn is_online(cfg: &Config, timeout: Duration) -> bool {
    host_reachable(&cfg.host, 443, timeout) && host_reachable(&cfg.git_host, 443, timeout)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn local_listener_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        assert!(host_reachable(
            "127.0.0.1",
            port,
            Duration::from_millis(500)
        ));
    }

    #[test]
    fn closed_port_is_unreachable() {
        // Bind then drop to find a port nothing is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        assert!(!host_reachable(
            "127.0.0.1",
            port,
            Duration::from_millis(500)
        ));
    }

    #[test]
    fn unresolvable_host_is_unreachable() {
        assert!(!host_reachable(
            "quill-no-such-host.invalid",
            443,
            Duration::from_millis(500)
        ));
    }
}
