//! TCP reachability probe
//!
//! Checks whether a machine endpoint accepts TCP connections, independent of
//! any polling session.

use crate::error::DeviceError;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Default OPC UA port
pub const OPC_UA_DEFAULT_PORT: u16 = 4840;

/// Split an endpoint into host and port
///
/// Accepts `scheme://host:port/path`, `host:port` and bracketed IPv6 hosts.
/// A missing port defaults to 4840 for `opc.tcp` endpoints.
pub fn parse_endpoint(endpoint: &str) -> Result<(String, u16), DeviceError> {
    let invalid = |reason: &str| DeviceError::Connect {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let (scheme, rest) = match endpoint.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, endpoint),
    };
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(invalid("missing host"));
    }

    let (host, port) = if let Some(stripped) = authority.strip_prefix('[') {
        let (host, after) = stripped
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 address"))?;
        (host, after.strip_prefix(':'))
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }

    let port = match port {
        Some(p) => p.parse::<u16>().map_err(|_| invalid("invalid port"))?,
        None if scheme == Some("opc.tcp") => OPC_UA_DEFAULT_PORT,
        None => return Err(invalid("missing port")),
    };

    Ok((host.to_string(), port))
}

/// Connect to an endpoint, returning the address that answered
pub fn check_endpoint(endpoint: &str, timeout: Duration) -> Result<SocketAddr, DeviceError> {
    let (host, port) = parse_endpoint(endpoint)?;

    let addrs = (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| DeviceError::Connect {
            endpoint: endpoint.to_string(),
            reason: format!("cannot resolve host: {}", e),
        })?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(addr),
            Err(e) => last_error = Some(e),
        }
    }

    Err(DeviceError::Connect {
        endpoint: endpoint.to_string(),
        reason: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string()),
    })
}
