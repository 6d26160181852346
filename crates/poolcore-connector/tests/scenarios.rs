//! Exercises the connector end-to-end over real loopback TCP sockets,
//! covering the two concrete scenarios a JSON-line-framing client
//! connector is expected to satisfy: distinct monotonic client ids across
//! concurrent connections, and oversize-line invalidation.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use poolcore_connector::link::StratifierMessage;
use poolcore_connector::{spawn, ChannelStratifierLink, ConnectorConfig};

fn unique_control_socket_path(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("poolcore-connector-test-{label}-{}.sock", std::process::id()));
    path
}

#[test]
fn distinct_clients_get_strictly_monotonic_ids() {
    let (link, rx) = ChannelStratifierLink::new();
    // Bind on an ephemeral port ourselves first to discover one that's
    // free, since ConnectorConfig doesn't expose the bound address back
    // out; hand the connector that fixed port to bind for real.
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let config = ConnectorConfig {
        listen_addr: Some(addr.to_string()),
        control_socket_path: unique_control_socket_path("monotonic"),
    };

    let handle = spawn(config, Arc::new(link)).expect("connector failed to bind");
    std::thread::sleep(Duration::from_millis(100));

    let mut client_a = TcpStream::connect(addr).unwrap();
    let mut client_b = TcpStream::connect(addr).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    client_a.write_all(b"{\"method\":\"x\"}\n").unwrap();
    client_b.write_all(b"{\"method\":\"y\"}\n").unwrap();
    std::thread::sleep(Duration::from_millis(200));

    let mut seen_ids = Vec::new();
    for _ in 0..2 {
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            StratifierMessage::Forward(line) => {
                let v: serde_json::Value = serde_json::from_str(&line).unwrap();
                seen_ids.push(v["client_id"].as_i64().unwrap());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    seen_ids.sort_unstable();
    assert_eq!(seen_ids, vec![0, 1]);

    drop(client_a);
    drop(client_b);
    drop(handle);
}

#[test]
fn oversize_line_without_newline_invalidates_session() {
    let (link, rx) = ChannelStratifierLink::new();
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let config = ConnectorConfig {
        listen_addr: Some(addr.to_string()),
        control_socket_path: unique_control_socket_path("oversize"),
    };
    let handle = spawn(config, Arc::new(link)).expect("connector failed to bind");
    std::thread::sleep(Duration::from_millis(100));

    let mut client = TcpStream::connect(addr).unwrap();
    let oversize_line = vec![b'a'; 1200];
    client.write_all(&oversize_line).unwrap();

    let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(msg, StratifierMessage::DropClient(0)));

    // The server should have closed its end; a subsequent read observes EOF.
    let mut buf = [0u8; 8];
    client.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
    let n = client.read(&mut buf).unwrap_or(0);
    assert_eq!(n, 0);

    drop(handle);
}
