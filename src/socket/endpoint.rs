use crate::socket::address;
use crate::socket::error::{Result, SocketError};
use mio::event::Source;
use mio::net::UdpSocket;
use mio::{Interest, Registry, Token};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, SocketAddrV4};
use tracing::{debug, warn};

/// One OS-level UDP socket with a defined role.
///
/// The descriptor is owned exclusively by the endpoint; dropping the endpoint
/// closes the socket. The bound port is absent for transmit-only endpoints
/// and the interface name is present only for broadcast endpoints.
#[derive(Debug)]
pub struct Endpoint {
    socket: UdpSocket,
    port: Option<u16>,
    interface: Option<String>,
}

impl Endpoint {
    /// Plain receiver: bind to the wildcard address on `port`.
    ///
    /// There is no recovery path for a receiver that cannot bind; the caller
    /// treats failure as fatal.
    pub fn receiver(port: u16) -> Result<Self> {
        debug!(port = port, "Opening receiver endpoint");
        let socket = new_udp_socket("receiver socket")?;
        let addr: SocketAddr = address::any(port).into();
        socket.bind(&addr.into()).map_err(|e| SocketError::Setup {
            context: "receiver bind",
            source: e,
        })?;
        Ok(Self {
            socket: into_mio(socket),
            port: Some(port),
            interface: None,
        })
    }

    /// Transmit-only endpoint. The socket stays unbound; the kernel selects
    /// an ephemeral source port on first send. `port` is informational,
    /// recorded for destination address construction.
    pub fn transmitter(port: u16) -> Result<Self> {
        debug!(port = port, "Opening transmitter endpoint");
        let socket = new_udp_socket("transmitter socket")?;
        Ok(Self {
            socket: into_mio(socket),
            port: Some(port),
            interface: None,
        })
    }

    /// Broadcast-enabled endpoint bound to a specific network interface, so
    /// broadcast traffic is scoped to that interface rather than sent from
    /// the kernel's default route.
    pub fn broadcast(interface: &str, port: u16) -> Result<Self> {
        debug!(
            interface = interface,
            port = port,
            "Opening broadcast endpoint"
        );
        let socket = new_udp_socket("broadcast socket")?;
        socket.set_broadcast(true).map_err(|e| SocketError::Setup {
            context: "SO_BROADCAST",
            source: e,
        })?;
        bind_to_device(&socket, interface)?;
        Ok(Self {
            socket: into_mio(socket),
            port: Some(port),
            interface: Some(interface.to_string()),
        })
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Local address the socket is actually bound to. For transmitters this
    /// is meaningful only after the first send assigns an ephemeral port.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// The endpoint registers with the poll by delegating to its socket, so the
/// event manager never touches the descriptor directly.
impl Source for Endpoint {
    fn register(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> std::io::Result<()> {
        self.socket.register(registry, token, interests)
    }

    fn reregister(
        &mut self,
        registry: &Registry,
        token: Token,
        interests: Interest,
    ) -> std::io::Result<()> {
        self.socket.reregister(registry, token, interests)
    }

    fn deregister(&mut self, registry: &Registry) -> std::io::Result<()> {
        self.socket.deregister(registry)
    }
}

/// Seam over datagram I/O so transmit paths can be faked in tests.
pub trait Transport {
    /// Send one datagram to `dest`.
    fn send_to(&self, buf: &[u8], dest: SocketAddrV4) -> std::io::Result<usize>;

    /// Receive one datagram. A datagram larger than `buf` is silently
    /// truncated to the buffer length by the kernel.
    fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)>;
}

impl Transport for Endpoint {
    fn send_to(&self, buf: &[u8], dest: SocketAddrV4) -> std::io::Result<usize> {
        self.socket.send_to(buf, SocketAddr::V4(dest))
    }

    fn recv_from(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf)
    }
}

/// One best-effort `sendto`.
///
/// Reports `ShortWrite` if fewer bytes were sent than requested and
/// `SendFailed` on a hard I/O error. Neither is retried at this layer; the
/// caller decides whether to log, drop, or escalate.
pub fn send<T: Transport + ?Sized>(
    dest: SocketAddrV4,
    transport: &T,
    buf: &[u8],
) -> Result<usize> {
    let sent = transport.send_to(buf, dest).map_err(|e| {
        warn!(error = %e, dest = %dest, "Failed to send datagram");
        SocketError::SendFailed(e)
    })?;

    if sent < buf.len() {
        warn!(
            sent = sent,
            requested = buf.len(),
            "Short write on datagram send"
        );
        return Err(SocketError::ShortWrite {
            sent,
            requested: buf.len(),
        });
    }

    debug!(bytes_sent = sent, dest = %dest, "Datagram sent");
    Ok(sent)
}

fn new_udp_socket(context: &'static str) -> Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| SocketError::Setup { context, source: e })?;
    socket
        .set_nonblocking(true)
        .map_err(|e| SocketError::Setup { context, source: e })?;
    Ok(socket)
}

#[cfg(target_os = "linux")]
fn bind_to_device(socket: &Socket, interface: &str) -> Result<()> {
    socket
        .bind_device(Some(interface.as_bytes()))
        .map_err(|e| SocketError::Setup {
            context: "SO_BINDTODEVICE",
            source: e,
        })
}

#[cfg(not(target_os = "linux"))]
fn bind_to_device(_socket: &Socket, interface: &str) -> Result<()> {
    warn!(
        interface = interface,
        "Interface binding is unsupported on this platform"
    );
    Ok(())
}

fn into_mio(socket: Socket) -> UdpSocket {
    UdpSocket::from_std(socket.into())
}
