use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use rosapi_client::{ApiClient, ApiError, TcpTransport, Transport, TransportConfig};
use rosapi_common::{Attributes, Query};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Spawns a scripted device on a loopback listener.
///
/// The handler is called once per inbound command sentence with the command
/// index, the received words, and the server side of the connection.
fn spawn_device(
    expected_commands: usize,
    handler: fn(usize, Vec<Vec<u8>>, &mut TcpTransport),
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut transport = TcpTransport::from_stream(stream);
        for idx in 0..expected_commands {
            let words = transport.receive_sentence().expect("read command");
            handler(idx, words, &mut transport);
        }
    });

    addr
}

fn reply(transport: &mut TcpTransport, words: &[&[u8]]) {
    let words: Vec<Vec<u8>> = words.iter().map(|word| word.to_vec()).collect();
    transport.send_sentence(&words).expect("write reply");
}

fn client_with_addr(addr: String) -> ApiClient {
    let config = TransportConfig {
        addr,
        read_timeout: Some(Duration::from_secs(1)),
        write_timeout: Some(Duration::from_secs(1)),
        connect_timeout: Some(Duration::from_secs(1)),
    };
    ApiClient::with_config(&config).expect("client")
}

fn attrs(entries: &[(&[u8], &[u8])]) -> Attributes {
    entries
        .iter()
        .map(|(key, value)| (key.to_vec(), value.to_vec()))
        .collect()
}

#[test]
fn execute_streams_replies_until_done() {
    init_tracing();
    let addr = spawn_device(1, |_, words, transport| {
        assert_eq!(words[0], b"/interface/print");
        assert_eq!(words[1], b"?disabled=false");
        assert_eq!(words[2], b".tag=1");
        reply(transport, &[b"!re", b"=name=ether1", b".tag=1"]);
        reply(transport, &[b"!re", b"=name=ether2", b".tag=1"]);
        reply(transport, &[b"!done", b".tag=1"]);
    });

    let mut client = client_with_addr(addr);
    let response = client
        .execute(
            &[b"interface"],
            b"print",
            &[],
            &[(b"disabled", b"false")],
            &[],
        )
        .expect("execute");

    assert_eq!(
        response.replies,
        vec![
            attrs(&[(b"name", b"ether1")]),
            attrs(&[(b"name", b"ether2")]),
        ]
    );
    assert!(response.done_attributes.is_empty());
}

#[test]
fn interleaved_requests_resolve_by_tag() {
    init_tracing();
    let addr = spawn_device(2, |idx, words, transport| {
        if idx == 0 {
            assert_eq!(words[0], b"/ip/address/print");
            assert_eq!(words[1], b".tag=1");
        } else {
            assert_eq!(words[0], b"/interface/print");
            assert_eq!(words[1], b".tag=2");
            // Answer the second command first, interleaved with the first.
            reply(transport, &[b"!re", b"=name=ether1", b".tag=2"]);
            reply(transport, &[b"!re", b"=address=10.0.0.1/24", b".tag=1"]);
            reply(transport, &[b"!done", b".tag=2"]);
            reply(transport, &[b"!done", b".tag=1"]);
        }
    });

    let mut client = client_with_addr(addr);
    let first = client
        .send(&[b"ip", b"address"], b"print", &[], &[], &[])
        .expect("send first");
    let second = client
        .send(&[b"interface"], b"print", &[], &[], &[])
        .expect("send second");

    let response = client.receive(first).expect("receive first");
    assert_eq!(
        response.replies,
        vec![attrs(&[(b"address", b"10.0.0.1/24")])]
    );
    let response = client.receive(second).expect("receive second");
    assert_eq!(response.replies, vec![attrs(&[(b"name", b"ether1")])]);
}

#[test]
fn trap_surfaces_as_communication_error() {
    init_tracing();
    let addr = spawn_device(1, |_, words, transport| {
        assert_eq!(words[0], b"/interface/set");
        reply(transport, &[b"!trap", b"=message=no such item", b".tag=1"]);
        reply(transport, &[b"!done", b".tag=1"]);
    });

    let mut client = client_with_addr(addr);
    let result = client.execute(
        &[b"interface"],
        b"set",
        &[(b"name", b"missing")],
        &[],
        &[],
    );

    match result {
        Err(ApiError::Communication { payload, command }) => {
            assert_eq!(payload, b"no such item");
            assert!(command.starts_with("/interface/set"));
        }
        other => panic!("expected communication error, got {other:?}"),
    }
}

#[test]
fn fatal_surfaces_as_fatal_error() {
    init_tracing();
    let addr = spawn_device(1, |_, _, transport| {
        reply(transport, &[b"!fatal", b"session closed", b".tag=1"]);
    });

    let mut client = client_with_addr(addr);
    let result = client.execute(&[b"system"], b"reboot", &[], &[], &[]);
    assert!(matches!(result, Err(ApiError::Fatal { .. })));
}

#[test]
fn additional_queries_reach_the_wire() {
    init_tracing();
    let addr = spawn_device(1, |_, words, transport| {
        assert_eq!(words[0], b"/interface/print");
        assert_eq!(words[1], b"?type=ether");
        assert_eq!(words[2], b"?comment");
        assert_eq!(words[3], b".tag=1");
        reply(transport, &[b"!done", b".tag=1"]);
    });

    let mut client = client_with_addr(addr);
    client
        .execute(
            &[b"interface"],
            b"print",
            &[],
            &[(b"type", b"ether")],
            &[Query::present("comment")],
        )
        .expect("execute");
}
