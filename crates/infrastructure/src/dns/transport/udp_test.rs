use super::*;

const SERVER: &str = "8.8.8.8:53";

#[test]
fn test_udp_transport_creation() {
    let transport = UdpTransport::new(SERVER, 65535);
    assert_eq!(transport.server(), SERVER);
    assert_eq!(transport.max_response_size(), 65535);
    assert_eq!(transport.protocol_name(), "UDP");
}

#[test]
fn test_validate_response_id_matching_ids_ok() {
    let query = [0xAB, 0xCD, 0x01, 0x00];
    let response = [0xAB, 0xCD, 0x81, 0x80];
    assert!(validate_response_id(&query, &response, SERVER).is_ok());
}

#[test]
fn test_validate_response_id_mismatch_returns_error() {
    let query = [0xAB, 0xCD, 0x01, 0x00];
    let response = [0x12, 0x34, 0x81, 0x80];
    let result = validate_response_id(&query, &response, SERVER);
    assert!(result.is_err(), "Mismatched DNS IDs must return an error");
    let err = result.unwrap_err().to_string();
    assert!(
        err.contains("mismatch"),
        "Error message should mention mismatch: {}",
        err
    );
}

#[test]
fn test_validate_response_id_short_query_returns_error() {
    let query = [0xAB];
    let response = [0xAB, 0xCD, 0x81, 0x80];
    assert!(validate_response_id(&query, &response, SERVER).is_err());
}

#[test]
fn test_validate_response_id_short_response_returns_error() {
    let query = [0xAB, 0xCD, 0x01, 0x00];
    let response = [0xAB];
    assert!(validate_response_id(&query, &response, SERVER).is_err());
}

#[tokio::test]
async fn test_udp_silent_server_times_out() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap().to_string();

    let transport = UdpTransport::new(addr.clone(), 512);
    let query = [0x00, 0x01, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    let result = transport.send(&query, Duration::from_millis(100)).await;

    assert_eq!(
        result.unwrap_err(),
        DomainError::TransportTimeout { server: addr }
    );
}

#[tokio::test]
async fn test_udp_echo_round_trip() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (len, peer) = server.recv_from(&mut buf).await.unwrap();
        server.send_to(&buf[..len], peer).await.unwrap();
    });

    let transport = UdpTransport::new(addr, 512);
    let query = [0x42, 0x42, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    let response = transport.send(&query, Duration::from_secs(2)).await.unwrap();

    assert_eq!(&response.bytes[..], &query[..]);
}

#[tokio::test]
async fn test_udp_skips_datagram_with_wrong_id() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (len, peer) = server.recv_from(&mut buf).await.unwrap();
        let mut stray = buf[..len].to_vec();
        stray[0] ^= 0xFF;
        server.send_to(&stray, peer).await.unwrap();
        server.send_to(&buf[..len], peer).await.unwrap();
    });

    let transport = UdpTransport::new(addr, 512);
    let query = [0x42, 0x43, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    let response = transport.send(&query, Duration::from_secs(2)).await.unwrap();

    assert_eq!(&response.bytes[..], &query[..]);
}

#[tokio::test]
async fn test_udp_only_wrong_ids_times_out() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        let (len, peer) = server.recv_from(&mut buf).await.unwrap();
        let mut stray = buf[..len].to_vec();
        stray[1] ^= 0xFF;
        server.send_to(&stray, peer).await.unwrap();
    });

    let transport = UdpTransport::new(addr.clone(), 512);
    let query = [0x42, 0x44, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
    let result = transport.send(&query, Duration::from_millis(200)).await;

    assert_eq!(
        result.unwrap_err(),
        DomainError::TransportTimeout { server: addr }
    );
}

#[tokio::test]
async fn test_udp_rejects_query_without_id() {
    let transport = UdpTransport::new("127.0.0.1:9", 512);
    let result = transport.send(&[0x01], Duration::from_secs(1)).await;
    assert!(matches!(result, Err(DomainError::InvalidDnsQuery(_))));
}
