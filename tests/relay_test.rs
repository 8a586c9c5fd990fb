use axon::event::{EventManager, Handler};
use axon::relay::constants::BUFFER_LEN;
use axon::relay::{Config, Mode};
use axon::socket::{Endpoint, Transport};
use mio::Interest;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};

fn v4(addr: SocketAddr) -> SocketAddrV4 {
    match addr {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => panic!("expected an IPv4 address"),
    }
}

/// Drive the manager until at least one event is dispatched or the deadline
/// passes.
fn poll_until_dispatch(manager: &mut EventManager, deadline: Duration) -> usize {
    let start = Instant::now();
    while start.elapsed() < deadline {
        let handled = manager
            .poll_once(Some(Duration::from_millis(20)))
            .expect("poll failed");
        if handled > 0 {
            return handled;
        }
    }
    0
}

/// Wire a forward-mode manager on loopback with ephemeral ports. Returns the
/// manager, the network-side port, and the application-side listener.
fn forward_fixture() -> (EventManager, u16, UdpSocket) {
    let receiver = Endpoint::receiver(0).expect("receiver endpoint");
    let net_port = receiver.local_addr().unwrap().port();

    let app_listener = UdpSocket::bind("127.0.0.1:0").expect("app listener");
    app_listener
        .set_read_timeout(Some(Duration::from_millis(100)))
        .unwrap();
    let dest = v4(app_listener.local_addr().unwrap());

    let transmitter = Endpoint::transmitter(dest.port()).expect("transmitter endpoint");

    let mut manager = EventManager::new().expect("event manager");
    manager
        .register(
            receiver,
            Interest::READABLE,
            Handler::forward(transmitter, dest, false),
            net_port,
        )
        .expect("register forwarder");

    (manager, net_port, app_listener)
}

#[test]
fn test_config_validation() {
    let mut config = Config {
        mode: Mode::Forward,
        interface: "eth0".to_string(),
        port: 9000,
        app_port: 9000,
        forward_host: "127.0.0.1".to_string(),
        verbose_forward: false,
        log_level: "info".to_string(),
        log_format: "text".to_string(),
    };

    // Identical network and application ports must fail validation.
    assert!(config.validate().is_err());

    config.app_port = 9100;
    assert!(config.validate().is_ok());
}

#[test]
fn test_forward_round_trip() {
    let (mut manager, net_port, app_listener) = forward_fixture();

    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    sender
        .send_to(b"hello", ("127.0.0.1", net_port))
        .expect("send to network port");

    assert!(
        poll_until_dispatch(&mut manager, Duration::from_secs(2)) > 0,
        "no readiness event within deadline"
    );

    // The listener must observe the exact bytes within its 100 ms timeout.
    let mut buf = [0u8; 64];
    let (len, _) = app_listener
        .recv_from(&mut buf)
        .expect("forwarded datagram");
    assert_eq!(&buf[..len], b"hello");
}

#[test]
fn test_forward_truncates_oversized_datagram() {
    let (mut manager, net_port, app_listener) = forward_fixture();
    app_listener
        .set_read_timeout(Some(Duration::from_millis(500)))
        .unwrap();

    let payload: Vec<u8> = (0..BUFFER_LEN + 1000).map(|i| (i % 251) as u8).collect();
    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    sender
        .send_to(&payload, ("127.0.0.1", net_port))
        .expect("send oversized datagram");

    assert!(poll_until_dispatch(&mut manager, Duration::from_secs(2)) > 0);

    // The relay forwards exactly the scratch-buffer capacity, never more.
    let mut buf = vec![0u8; BUFFER_LEN * 2];
    let (len, _) = app_listener
        .recv_from(&mut buf)
        .expect("truncated datagram");
    assert_eq!(len, BUFFER_LEN);
    assert_eq!(&buf[..len], &payload[..BUFFER_LEN]);
}

#[test]
fn test_forward_preserves_arbitrary_binary_payloads() {
    let (mut manager, net_port, app_listener) = forward_fixture();

    let payload: Vec<u8> = (0u16..256).map(|b| b as u8).collect();
    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    sender
        .send_to(&payload, ("127.0.0.1", net_port))
        .expect("send binary payload");

    assert!(poll_until_dispatch(&mut manager, Duration::from_secs(2)) > 0);

    let mut buf = [0u8; 512];
    let (len, _) = app_listener
        .recv_from(&mut buf)
        .expect("forwarded datagram");
    assert_eq!(&buf[..len], payload.as_slice());
}

#[test]
fn test_receiver_dispatch_records_datagram_length() {
    let endpoint = Endpoint::receiver(0).expect("receiver endpoint");
    let port = endpoint.local_addr().unwrap().port();

    let mut manager = EventManager::new().expect("event manager");
    let token = manager
        .register(endpoint, Interest::READABLE, Handler::receive(), port)
        .expect("register receiver");

    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    sender
        .send_to(&[0xDE, 0xAD, 0xBE, 0xEF], ("127.0.0.1", port))
        .expect("send to receiver");

    assert!(poll_until_dispatch(&mut manager, Duration::from_secs(2)) > 0);
    assert_eq!(manager.last_len(token), Some(4));
    assert!(manager.is_registered(token));
}

#[test]
fn test_consecutive_datagrams_each_get_a_tick() {
    let (mut manager, net_port, app_listener) = forward_fixture();

    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    for payload in [&b"first"[..], &b"second"[..], &b"third"[..]] {
        sender
            .send_to(payload, ("127.0.0.1", net_port))
            .expect("send");
    }

    let mut received = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut buf = [0u8; 64];
    while received.len() < 3 && Instant::now() < deadline {
        let _ = manager.poll_once(Some(Duration::from_millis(20)));
        while let Ok((len, _)) = app_listener.recv_from(&mut buf) {
            received.push(buf[..len].to_vec());
        }
    }

    assert_eq!(received.len(), 3);
    assert_eq!(received[0], b"first");
    assert_eq!(received[1], b"second");
    assert_eq!(received[2], b"third");
}

#[test]
fn test_closed_watcher_endpoint_survives() {
    let endpoint = Endpoint::receiver(0).expect("receiver endpoint");
    let port = endpoint.local_addr().unwrap().port();

    let mut manager = EventManager::new().expect("event manager");
    let token = manager
        .register(endpoint, Interest::READABLE, Handler::receive(), port)
        .expect("register receiver");

    let endpoint = manager
        .close(token)
        .expect("close")
        .expect("endpoint handed back");

    // The returned endpoint still owns an open, bound socket: a datagram
    // sent to it can be read directly.
    let sender = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    sender
        .send_to(b"still-open", ("127.0.0.1", port))
        .expect("send");
    std::thread::sleep(Duration::from_millis(50));

    let mut buf = [0u8; 64];
    let (len, _) = endpoint.recv_from(&mut buf).expect("direct receive");
    assert_eq!(&buf[..len], b"still-open");
}
