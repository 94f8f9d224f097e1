//! Scripted gateway for client tests

use std::net::SocketAddr;

use jtc_core::MemberId;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::frame::{read_frame, write_frame};
use crate::protocol::{CallResult, Message, PlatformCall};

/// Answers a platform call, or `None` to leave it unanswered
pub type Responder = fn(&PlatformCall) -> Option<CallResult>;

enum Outbound {
    Frame(Message),
    Close,
}

/// Accepts a single bot connection and plays the gateway side
pub struct FakeGateway {
    addr: SocketAddr,
    out_tx: mpsc::Sender<Outbound>,
    seen_rx: mpsc::UnboundedReceiver<Message>,
}

impl FakeGateway {
    pub async fn start(token: &str, respond: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (out_tx, mut out_rx) = mpsc::channel::<Outbound>(64);
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        let token = token.to_string();
        let reply_tx = out_tx.clone();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (mut reader, mut writer) = tokio::io::split(stream);

            match read_frame(&mut reader).await {
                Ok(Message::Hello { token: offered, .. }) if offered == token => {
                    let ready = Message::Ready {
                        bot_id: MemberId::new("bot"),
                    };
                    write_frame(&mut writer, &ready).await.unwrap();
                }
                _ => {
                    let rejected = Message::Rejected {
                        reason: "invalid token".into(),
                    };
                    let _ = write_frame(&mut writer, &rejected).await;
                    return;
                }
            }

            tokio::spawn(async move {
                use tokio::io::AsyncWriteExt;
                while let Some(out) = out_rx.recv().await {
                    match out {
                        Outbound::Frame(msg) => {
                            if write_frame(&mut writer, &msg).await.is_err() {
                                break;
                            }
                        }
                        Outbound::Close => {
                            let _ = writer.shutdown().await;
                            break;
                        }
                    }
                }
            });

            while let Ok(msg) = read_frame(&mut reader).await {
                let answer = match &msg {
                    Message::Request { id, call } => respond(call).map(|result| Message::Response {
                        id: *id,
                        result,
                    }),
                    Message::Ping => Some(Message::Pong),
                    _ => None,
                };
                if let Some(answer) = answer {
                    let _ = reply_tx.send(Outbound::Frame(answer)).await;
                }
                let _ = seen_tx.send(msg);
            }
        });

        FakeGateway {
            addr,
            out_tx,
            seen_rx,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Send a message to the bot
    pub async fn push(&self, msg: Message) {
        self.out_tx.send(Outbound::Frame(msg)).await.unwrap();
    }

    /// Next message received from the bot
    pub async fn next_seen(&mut self) -> Option<Message> {
        self.seen_rx.recv().await
    }

    /// Close the gateway side of the connection
    pub async fn close(&self) {
        self.out_tx.send(Outbound::Close).await.unwrap();
    }
}
