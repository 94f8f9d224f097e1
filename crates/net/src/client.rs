//! TCP client for the platform gateway
//!
//! One connection carries everything: membership and command events flow in,
//! platform calls go out as `Request` frames and are matched to their
//! `Response` by request id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use jtc_core::{MemberId, MembershipEvent, Room};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{CallResult, Interaction, Message, PlatformCall, PROTOCOL_VERSION};

/// Interval between keepalive pings
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Event received from the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    VoiceStateUpdate(MembershipEvent),
    Interaction(Interaction),
    /// Connection lost; no further events follow
    Disconnected,
}

/// Owner side of a gateway connection: yields events and hands out handles
pub struct GatewayClient {
    handle: GatewayHandle,
    event_rx: mpsc::UnboundedReceiver<GatewayEvent>,
}

/// Cloneable sender side of a gateway connection
#[derive(Clone)]
pub struct GatewayHandle {
    shared: Arc<Shared>,
    cmd_tx: mpsc::Sender<Command>,
    request_timeout: Duration,
}

struct Shared {
    state: RwLock<ConnectionInfo>,
    pending: Mutex<HashMap<Uuid, oneshot::Sender<CallResult>>>,
    pong_waiters: Mutex<Vec<oneshot::Sender<()>>>,
}

struct ConnectionInfo {
    connection: ConnectionState,
    bot_id: MemberId,
    last_ping: Option<Instant>,
    latency: Option<Duration>,
}

enum Command {
    Send(Message),
    Disconnect,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl GatewayClient {
    /// Connect and complete the `Hello`/`Ready` handshake
    pub async fn connect(
        addr: impl ToSocketAddrs + std::fmt::Display,
        token: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        info!(addr = %addr, "Connecting to gateway");

        let stream = TcpStream::connect(&addr).await?;
        let (mut reader, mut writer) = tokio::io::split(stream);

        let hello = Message::Hello {
            token: token.to_string(),
            version: PROTOCOL_VERSION,
        };
        write_frame(&mut writer, &hello).await?;

        let bot_id = match tokio::time::timeout(request_timeout, read_frame(&mut reader)).await {
            Ok(Ok(Message::Ready { bot_id })) => bot_id,
            Ok(Ok(Message::Rejected { reason })) => {
                warn!(reason = %reason, "Gateway rejected handshake");
                return Err(Error::Rejected(reason));
            }
            Ok(Ok(other)) => {
                return Err(Error::Protocol(format!(
                    "Expected Ready, got {:?}",
                    other
                )))
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(Error::Timeout(request_timeout)),
        };
        info!(bot_id = %bot_id, "Gateway session ready");

        let shared = Arc::new(Shared {
            state: RwLock::new(ConnectionInfo {
                connection: ConnectionState::Connected,
                bot_id,
                last_ping: None,
                latency: None,
            }),
            pending: Mutex::new(HashMap::new()),
            pong_waiters: Mutex::new(Vec::new()),
        });

        // Unbounded so responses behind an event burst are still read
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        tokio::spawn(connection_task(
            reader,
            writer,
            shared.clone(),
            event_tx,
            cmd_tx.clone(),
            cmd_rx,
        ));

        Ok(GatewayClient {
            handle: GatewayHandle {
                shared,
                cmd_tx,
                request_timeout,
            },
            event_rx,
        })
    }

    /// Get the next gateway event (`None` once the connection task is gone)
    pub async fn next_event(&mut self) -> Option<GatewayEvent> {
        self.event_rx.recv().await
    }

    pub fn handle(&self) -> GatewayHandle {
        self.handle.clone()
    }
}

impl GatewayHandle {
    /// Send a platform call and wait for its response
    pub(crate) async fn request(&self, call: PlatformCall) -> Result<Option<Room>> {
        if self.connection_state().await != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }

        let id = Uuid::new_v4();
        let name = call.name();
        let (tx, rx) = oneshot::channel();
        lock(&self.shared.pending).insert(id, tx);
        debug!(request_id = %id, call = name, "Sending platform request");

        if self
            .cmd_tx
            .send(Command::Send(Message::Request { id, call }))
            .await
            .is_err()
        {
            lock(&self.shared.pending).remove(&id);
            return Err(Error::NotConnected);
        }

        let result = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            // Sender dropped by the connection task on shutdown
            Ok(Err(_)) => return Err(Error::ConnectionClosed),
            Err(_) => {
                lock(&self.shared.pending).remove(&id);
                warn!(request_id = %id, call = name, "Platform request timed out");
                return Err(Error::Timeout(self.request_timeout));
            }
        };

        match result {
            CallResult::Ok { room } => Ok(room),
            CallResult::Error { kind, message } => {
                debug!(request_id = %id, call = name, ?kind, "Platform request failed");
                Err(Error::Remote { kind, message })
            }
        }
    }

    /// Answer a command interaction
    pub async fn reply(&self, interaction_id: &str, content: impl Into<String>) -> Result<()> {
        self.send(Message::InteractionReply {
            interaction_id: interaction_id.to_string(),
            content: content.into(),
        })
        .await
    }

    /// Measure one ping/pong round trip
    pub async fn ping(&self) -> Result<Duration> {
        let (tx, rx) = oneshot::channel();
        lock(&self.shared.pong_waiters).push(tx);

        let started = Instant::now();
        self.send(Message::Ping).await?;

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(())) => {
                let elapsed = started.elapsed();
                self.shared.state.write().await.latency = Some(elapsed);
                Ok(elapsed)
            }
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::Timeout(self.request_timeout)),
        }
    }

    /// Latency of the most recent completed ping, if any
    pub async fn latency(&self) -> Option<Duration> {
        self.shared.state.read().await.latency
    }

    pub async fn bot_id(&self) -> MemberId {
        self.shared.state.read().await.bot_id.clone()
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.shared.state.read().await.connection
    }

    /// Close the connection
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect).await;
    }

    #[cfg(test)]
    pub(crate) fn pending_requests(&self) -> usize {
        lock(&self.shared.pending).len()
    }

    async fn send(&self, msg: Message) -> Result<()> {
        self.cmd_tx
            .send(Command::Send(msg))
            .await
            .map_err(|_| Error::NotConnected)
    }
}

async fn connection_task(
    reader: ReadHalf<TcpStream>,
    writer: WriteHalf<TcpStream>,
    shared: Arc<Shared>,
    event_tx: mpsc::UnboundedSender<GatewayEvent>,
    cmd_tx: mpsc::Sender<Command>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    let outcome = tokio::select! {
        result = read_loop(reader, &shared, &event_tx, &cmd_tx) => result,
        result = write_loop(writer, &shared, cmd_rx) => result,
    };

    match outcome {
        Ok(()) | Err(Error::ConnectionClosed) => debug!("Gateway connection closed"),
        Err(e) => warn!(error = %e, "Gateway connection failed"),
    }

    shared.state.write().await.connection = ConnectionState::Disconnected;
    // Dropping the senders wakes every waiter with an error
    lock(&shared.pending).clear();
    lock(&shared.pong_waiters).clear();

    let _ = event_tx.send(GatewayEvent::Disconnected);
    info!("Disconnected from gateway");
}

async fn read_loop(
    mut reader: ReadHalf<TcpStream>,
    shared: &Shared,
    event_tx: &mpsc::UnboundedSender<GatewayEvent>,
    cmd_tx: &mpsc::Sender<Command>,
) -> Result<()> {
    loop {
        match read_frame(&mut reader).await? {
            Message::Response { id, result } => {
                let waiter = lock(&shared.pending).remove(&id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(result);
                    }
                    None => debug!(request_id = %id, "Response for unknown or expired request"),
                }
            }
            Message::VoiceStateUpdate(event) => {
                // Keep serving responses after the event consumer is gone
                if event_tx.send(GatewayEvent::VoiceStateUpdate(event)).is_err() {
                    debug!("Membership event dropped, no consumer");
                }
            }
            Message::Interaction(interaction) => {
                if event_tx.send(GatewayEvent::Interaction(interaction)).is_err() {
                    debug!("Interaction dropped, no consumer");
                }
            }
            Message::Ping => {
                if cmd_tx.send(Command::Send(Message::Pong)).await.is_err() {
                    return Ok(());
                }
            }
            Message::Pong => {
                {
                    let mut state = shared.state.write().await;
                    if let Some(sent) = state.last_ping.take() {
                        state.latency = Some(sent.elapsed());
                    }
                }
                let waiters: Vec<_> = lock(&shared.pong_waiters).drain(..).collect();
                for waiter in waiters {
                    let _ = waiter.send(());
                }
            }
            other => debug!(message = ?other, "Ignoring unexpected gateway message"),
        }
    }
}

async fn write_loop(
    mut writer: WriteHalf<TcpStream>,
    shared: &Shared,
    mut cmd_rx: mpsc::Receiver<Command>,
) -> Result<()> {
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // First tick completes immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(msg)) => write_frame(&mut writer, &msg).await?,
                Some(Command::Disconnect) | None => {
                    debug!("Disconnect requested");
                    return Ok(());
                }
            },
            _ = heartbeat.tick() => {
                shared.state.write().await.last_ping = Some(Instant::now());
                write_frame(&mut writer, &Message::Ping).await?;
            }
        }
    }
}
