use super::builders::{build_reply, TCP_ANSWER, UDP_ANSWER};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::BinEncodable;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdpBehavior {
    /// One A record, TC clear.
    Answer,
    /// No records, TC set.
    Truncate,
    /// TC set, header announces more answers than the datagram carries.
    TruncateCut,
    /// Enough A records to exceed 512 bytes, TC clear.
    Large,
    /// Never replies.
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpBehavior {
    Answer,
    /// Accepts and reads the query but never replies.
    Silent,
    /// Nothing listens on the port.
    Closed,
}

pub const LARGE_ANSWER_COUNT: usize = 40;

/// Bytes dropped from the end of a `TruncateCut` datagram, enough to split
/// the last answer record.
const CUT_BYTES: usize = 10;

/// Loopback nameserver listening on the same port for UDP and TCP.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start(udp: UdpBehavior, tcp: TcpBehavior) -> io::Result<Self> {
        for _ in 0..20 {
            let socket = UdpSocket::bind("127.0.0.1:0").await?;
            let addr = socket.local_addr()?;

            let listener = match tcp {
                TcpBehavior::Closed => None,
                _ => match TcpListener::bind(addr).await {
                    Ok(listener) => Some(listener),
                    // Port already taken for TCP, try another one
                    Err(_) => continue,
                },
            };

            let udp_queries = Arc::new(AtomicUsize::new(0));
            let tcp_queries = Arc::new(AtomicUsize::new(0));

            let mut tasks = vec![tokio::spawn(serve_udp(socket, udp, udp_queries.clone()))];
            if let Some(listener) = listener {
                tasks.push(tokio::spawn(serve_tcp(listener, tcp, tcp_queries.clone())));
            }

            return Ok(Self {
                addr,
                udp_queries,
                tcp_queries,
                tasks,
            });
        }

        Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            "could not bind UDP and TCP on the same port",
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn serve_udp(socket: UdpSocket, behavior: UdpBehavior, counter: Arc<AtomicUsize>) {
    let mut buf = vec![0u8; 4096];

    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            continue;
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let Ok(query) = Message::from_vec(&buf[..len]) else {
            continue;
        };

        let (reply, cut) = match behavior {
            UdpBehavior::Answer => (build_reply(&query, false, UDP_ANSWER, 1), 0),
            UdpBehavior::Truncate => (build_reply(&query, true, UDP_ANSWER, 0), 0),
            UdpBehavior::TruncateCut => (build_reply(&query, true, UDP_ANSWER, 3), CUT_BYTES),
            UdpBehavior::Large => (
                build_reply(&query, false, UDP_ANSWER, LARGE_ANSWER_COUNT),
                0,
            ),
            UdpBehavior::Silent => continue,
        };

        if let Ok(mut bytes) = reply.to_vec() {
            bytes.truncate(bytes.len().saturating_sub(cut));
            let _ = socket.send_to(&bytes, peer).await;
        }
    }
}

async fn serve_tcp(listener: TcpListener, behavior: TcpBehavior, counter: Arc<AtomicUsize>) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            continue;
        };
        tokio::spawn(handle_tcp(stream, behavior, counter.clone()));
    }
}

async fn handle_tcp(mut stream: TcpStream, behavior: TcpBehavior, counter: Arc<AtomicUsize>) {
    let mut len_buf = [0u8; 2];
    if stream.read_exact(&mut len_buf).await.is_err() {
        return;
    }
    let mut body = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    if stream.read_exact(&mut body).await.is_err() {
        return;
    }
    counter.fetch_add(1, Ordering::SeqCst);

    if behavior == TcpBehavior::Silent {
        tokio::time::sleep(Duration::from_secs(30)).await;
        return;
    }

    let Ok(query) = Message::from_vec(&body) else {
        return;
    };
    let Ok(bytes) = build_reply(&query, false, TCP_ANSWER, 1).to_vec() else {
        return;
    };

    let mut framed = (bytes.len() as u16).to_be_bytes().to_vec();
    framed.extend_from_slice(&bytes);
    let _ = stream.write_all(&framed).await;
}
