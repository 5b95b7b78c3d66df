use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gamewire_frame::{FrameReader, FrameWriter};
use gamewire_packet::{Decoder, Encoder, Packet, PacketError};
use gamewire_registry::RegistryHandle;
use gamewire_transport::{PeerAddr, WireStream};
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

enum Outbound {
    Packet(Packet),
    Close,
}

/// Queues packets for a connection's send loop. Cheap to clone.
#[derive(Clone)]
pub struct PacketSender {
    tx: SyncSender<Outbound>,
}

impl PacketSender {
    /// Queue a packet, blocking while the queue is full.
    pub fn send(&self, packet: Packet) -> Result<()> {
        self.tx
            .send(Outbound::Packet(packet))
            .map_err(|_| SessionError::Closed)
    }

    /// Queue a packet without blocking.
    pub fn try_send(&self, packet: Packet) -> Result<()> {
        self.tx
            .try_send(Outbound::Packet(packet))
            .map_err(|err| match err {
                TrySendError::Full(_) => SessionError::Full,
                TrySendError::Disconnected(_) => SessionError::Closed,
            })
    }
}

/// One peer, served by a receive thread and a send thread.
///
/// The receive thread decodes packets into a bounded inbound queue. It
/// stops on end of stream or on a fatal decode error, shutting the stream
/// down on its way out; errors confined to one frame are logged and the
/// frame skipped. The send thread drains a bounded outbound queue into the
/// encoder; a packet that fails to encode is logged and dropped.
///
/// Closing (or dropping) the connection flushes the outbound queue, then
/// shuts the stream down, which fails the pending read, and joins both
/// threads.
pub struct Connection {
    id: String,
    peer_addr: Option<PeerAddr>,
    stream: WireStream,
    sender: Option<PacketSender>,
    inbound: Option<Receiver<Packet>>,
    receive_thread: Option<JoinHandle<()>>,
    send_thread: Option<JoinHandle<()>>,
}

impl Connection {
    /// Start the receive and send threads for `stream`.
    pub fn new(
        id: impl Into<String>,
        stream: WireStream,
        registry: RegistryHandle,
        config: SessionConfig,
    ) -> Result<Self> {
        let id = id.into();
        let peer_addr = stream.peer_addr().ok();

        let reader = FrameReader::with_config_stream(stream.try_clone()?, config.frame.clone())?;
        let writer = FrameWriter::with_config_stream(stream.try_clone()?, config.frame.clone())?;
        let decoder = Decoder::from_reader(reader, RegistryHandle::clone(&registry));
        let encoder = Encoder::from_writer(writer, registry);

        let (inbound_tx, inbound_rx) = mpsc::sync_channel(config.inbound_capacity);
        let (outbound_tx, outbound_rx) = mpsc::sync_channel(config.outbound_capacity);

        let receive_thread = {
            let id = id.clone();
            let stream = stream.try_clone()?;
            let drop_unknown = config.drop_unknown_packets;
            thread::Builder::new()
                .name(format!("{id}-recv"))
                .spawn(move || receive_loop(&id, decoder, inbound_tx, stream, drop_unknown))
                .map_err(SessionError::Spawn)?
        };

        let send_thread = {
            let id = id.clone();
            let spawned = thread::Builder::new()
                .name(format!("{id}-send"))
                .spawn(move || send_loop(&id, encoder, outbound_rx));
            match spawned {
                Ok(handle) => handle,
                Err(err) => {
                    let _ = stream.shutdown();
                    drop(inbound_rx);
                    let _ = receive_thread.join();
                    return Err(SessionError::Spawn(err));
                }
            }
        };

        debug!(conn = %id, peer = ?peer_addr, transport = stream.transport_name(), "connection started");

        Ok(Self {
            id,
            peer_addr,
            stream,
            sender: Some(PacketSender { tx: outbound_tx }),
            inbound: Some(inbound_rx),
            receive_thread: Some(receive_thread),
            send_thread: Some(send_thread),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn peer_addr(&self) -> Option<&PeerAddr> {
        self.peer_addr.as_ref()
    }

    /// Queue a packet for sending, blocking while the queue is full.
    pub fn send(&self, packet: Packet) -> Result<()> {
        self.sender()?.send(packet)
    }

    /// Queue a packet without blocking.
    pub fn try_send(&self, packet: Packet) -> Result<()> {
        self.sender()?.try_send(packet)
    }

    /// A handle other threads can send through.
    pub fn sender(&self) -> Result<PacketSender> {
        self.sender.clone().ok_or(SessionError::Closed)
    }

    /// Next decoded packet; blocks until one arrives or the connection ends.
    pub fn recv(&self) -> Result<Packet> {
        self.inbound()?.recv().map_err(|_| SessionError::Closed)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Packet> {
        self.inbound()?
            .recv_timeout(timeout)
            .map_err(|err| match err {
                RecvTimeoutError::Timeout => SessionError::Timeout(timeout),
                RecvTimeoutError::Disconnected => SessionError::Closed,
            })
    }

    /// `Ok(None)` when nothing is waiting.
    pub fn try_recv(&self) -> Result<Option<Packet>> {
        match self.inbound()?.try_recv() {
            Ok(packet) => Ok(Some(packet)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SessionError::Closed),
        }
    }

    /// Iterate decoded packets until the connection ends.
    pub fn incoming(&self) -> impl Iterator<Item = Packet> + '_ {
        self.inbound.iter().flat_map(|rx| rx.iter())
    }

    /// Close the connection. Idempotent.
    ///
    /// Packets already queued are written first; a peer that stops reading
    /// can stall this unless `FrameConfig::write_timeout` is set. The stream
    /// is then shut down, which ends the receive thread.
    pub fn close(&mut self) {
        if let Some(sender) = self.sender.take() {
            if let Err(TrySendError::Full(close)) = sender.tx.try_send(Outbound::Close) {
                let _ = sender.tx.send(close);
            }
        }
        let send_thread = self.send_thread.take();
        self.join("send", send_thread);

        if let Err(err) = self.stream.shutdown() {
            trace!(conn = %self.id, error = %err, "shutdown failed");
        }
        // Unblocks a receive thread waiting on a full inbound queue.
        if self.inbound.take().is_some() {
            debug!(conn = %self.id, "connection closed");
        }
        let receive_thread = self.receive_thread.take();
        self.join("receive", receive_thread);
    }

    fn join(&self, name: &str, handle: Option<JoinHandle<()>>) {
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(conn = %self.id, thread = name, "connection thread panicked");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }

    fn inbound(&self) -> Result<&Receiver<Packet>> {
        self.inbound.as_ref().ok_or(SessionError::Closed)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn receive_loop(
    id: &str,
    mut decoder: Decoder<WireStream>,
    inbound: SyncSender<Packet>,
    stream: WireStream,
    drop_unknown: bool,
) {
    loop {
        match decoder.decode() {
            Ok(packet) => {
                trace!(conn = %id, packet = %packet.id, "packet received");
                if inbound.send(packet).is_err() {
                    debug!(conn = %id, "inbound queue dropped");
                    break;
                }
            }
            Err(err) if err.is_connection_closed() => {
                debug!(conn = %id, "peer closed the stream");
                break;
            }
            Err(PacketError::UnknownPacketId(packet)) if drop_unknown => {
                warn!(conn = %id, %packet, "dropping packet with unknown id");
            }
            Err(err @ PacketError::UnknownPacketId(_)) => {
                warn!(conn = %id, error = %err, "closing connection");
                break;
            }
            Err(err) if !err.is_fatal() => {
                warn!(conn = %id, error = %err, "dropping malformed packet");
            }
            Err(err) => {
                warn!(conn = %id, error = %err, "closing connection");
                break;
            }
        }
    }
    if let Err(err) = stream.shutdown() {
        trace!(conn = %id, error = %err, "shutdown failed");
    }
}

fn send_loop(id: &str, mut encoder: Encoder<WireStream>, outbound: Receiver<Outbound>) {
    while let Ok(Outbound::Packet(packet)) = outbound.recv() {
        match encoder.write_packet(&packet) {
            Ok(()) => trace!(conn = %id, packet = %packet.id, "packet sent"),
            Err(err) if err.is_fatal() => {
                warn!(conn = %id, error = %err, "stream failed, stopping send loop");
                break;
            }
            Err(err) => warn!(conn = %id, packet = %packet.id, error = %err, "dropping packet"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use gamewire_packet::catalog::{self, LoginPacket, P_LOGIN, P_TEST};
    use gamewire_value::Value;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn pair(config: SessionConfig) -> (Connection, Connection) {
        let registry = catalog::handle().expect("catalog should register");
        let (left, right) = WireStream::pair().expect("socket pair should open");
        let a = Connection::new("left", left, RegistryHandle::clone(&registry), config.clone())
            .expect("left connection should start");
        let b = Connection::new("right", right, registry, config).expect("right connection should start");
        (a, b)
    }

    #[test]
    fn packets_flow_both_ways() {
        let (left, right) = pair(SessionConfig::default());

        left.send(Packet::new(P_TEST, 8i64)).expect("send should queue");
        assert_eq!(
            right.recv_timeout(WAIT).expect("packet should arrive"),
            Packet::new(P_TEST, 8i64)
        );

        let login = LoginPacket {
            username: "genius".into(),
            password: "0101001".into(),
        };
        right
            .send(Packet::from_message(login.clone()))
            .expect("send should queue");
        let packet = left.recv_timeout(WAIT).expect("packet should arrive");
        assert_eq!(packet.id, P_LOGIN);
        assert_eq!(packet.into_message::<LoginPacket>().expect("login"), login);
    }

    #[test]
    fn send_failure_drops_only_that_packet() {
        let (left, right) = pair(SessionConfig::default());

        left.send(Packet::new(P_TEST, "not an integer"))
            .expect("send should queue");
        left.send(Packet::new(P_TEST, 2i64)).expect("send should queue");

        assert_eq!(
            right.recv_timeout(WAIT).expect("valid packet should arrive"),
            Packet::new(P_TEST, 2i64)
        );
    }

    #[test]
    fn unknown_id_closes_by_default() {
        let registry = catalog::handle().expect("catalog should register");
        let (raw, stream) = WireStream::pair().expect("socket pair should open");
        let conn = Connection::new("c", stream, registry, SessionConfig::default())
            .expect("connection should start");

        let mut writer = FrameWriter::new(raw);
        writer.send(99, &[0xc0]).expect("raw frame should write");

        assert!(matches!(conn.recv_timeout(WAIT), Err(SessionError::Closed)));
    }

    #[test]
    fn unknown_id_is_skipped_when_configured() {
        let registry = catalog::handle().expect("catalog should register");
        let (raw, stream) = WireStream::pair().expect("socket pair should open");
        let config = SessionConfig {
            drop_unknown_packets: true,
            ..SessionConfig::default()
        };
        let conn = Connection::new("c", stream, registry, config).expect("connection should start");

        let mut writer = FrameWriter::new(raw);
        writer.send(99, &[0xc0]).expect("raw frame should write");
        writer.send(P_TEST.get(), &[0x07]).expect("raw frame should write");

        assert_eq!(
            conn.recv_timeout(WAIT).expect("known packet should arrive"),
            Packet::new(P_TEST, 7i64)
        );
    }

    #[test]
    fn truncated_stream_closes_connection() {
        use std::io::Write;

        let registry = catalog::handle().expect("catalog should register");
        let (mut raw, stream) = WireStream::pair().expect("socket pair should open");
        let conn = Connection::new("c", stream, registry, SessionConfig::default())
            .expect("connection should start");

        raw.write_all(&[0, 0, 0, 9, 0, 1]).expect("partial frame should write");
        raw.shutdown().expect("raw side should shut down");

        assert!(matches!(conn.recv_timeout(WAIT), Err(SessionError::Closed)));
    }

    #[test]
    fn close_ends_both_sides() {
        let (mut left, right) = pair(SessionConfig::default());
        left.close();
        assert!(left.is_closed());
        assert!(matches!(left.recv(), Err(SessionError::Closed)));
        assert!(matches!(
            left.send(Packet::new(P_TEST, 1i64)),
            Err(SessionError::Closed)
        ));
        assert!(matches!(right.recv_timeout(WAIT), Err(SessionError::Closed)));

        left.close();
    }

    #[test]
    fn close_flushes_queued_packets() {
        let (mut left, right) = pair(SessionConfig::default());
        left.send(Packet::new(P_TEST, 5i64)).expect("send should queue");
        left.close();

        assert_eq!(
            right.recv_timeout(WAIT).expect("queued packet should arrive"),
            Packet::new(P_TEST, 5i64)
        );
        assert!(matches!(right.recv_timeout(WAIT), Err(SessionError::Closed)));
    }

    #[test]
    fn close_unblocks_receive_thread_with_full_queue() {
        let (mut left, right) = pair(SessionConfig::default());
        for i in 0..4i64 {
            right.send(Packet::new(P_TEST, i)).expect("send should queue");
        }
        std::thread::sleep(Duration::from_millis(50));
        left.close();
        drop(right);
    }

    #[test]
    fn try_recv_and_timeout_when_idle() {
        let (left, _right) = pair(SessionConfig::default());
        assert!(left.try_recv().expect("connection is open").is_none());
        assert!(matches!(
            left.recv_timeout(Duration::from_millis(20)),
            Err(SessionError::Timeout(_))
        ));
    }

    #[test]
    fn sender_handle_outlives_borrow() {
        let (left, right) = pair(SessionConfig::default());
        let sender = left.sender().expect("sender should be available");
        let worker = std::thread::spawn(move || {
            sender
                .send(Packet::new(P_TEST, 42i64))
                .expect("send should queue");
        });
        worker.join().expect("worker should finish");

        let got: Vec<Packet> = right.incoming().take(1).collect();
        assert_eq!(got, vec![Packet::new(P_TEST, Value::I64(42))]);
    }
}
