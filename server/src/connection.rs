use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_http::ws::Item;
use actix_web_actors::ws::{self, CloseCode, CloseReason};
use thiserror::Error;

use system::{
    ClientCommand, Codec, ConnectionId, EncodedFrame, RoomId, ServerEvent, MAX_FRAME_BYTES,
};

use crate::config::ServerConfig;
use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

/// Hands out connection ids as websockets are accepted.
#[derive(Debug, Clone, Default)]
pub struct ConnectionIdSource(Arc<AtomicU32>);

impl ConnectionIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> ConnectionId {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        connection_id: ConnectionId,
        room_id: RoomId,
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    Command {
        from: ConnectionId,
        command: ClientCommand,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    /// Shared between every recipient of the same fan-out.
    ServerEvent(Arc<ServerEvent>),
    Disconnected,
}

#[derive(Debug, Error, PartialEq)]
enum FragmentError {
    #[error("continuation frame without a first fragment")]
    Unexpected,
    #[error("new message started before the previous one finished")]
    Interrupted,
    #[error("fragmented message exceeds {MAX_FRAME_BYTES} bytes")]
    TooLarge,
}

/// Joins fragmented websocket messages back into whole frames.
#[derive(Debug, Default)]
struct FrameAssembler {
    pending: Option<(Codec, Vec<u8>)>,
}

impl FrameAssembler {
    /// Returns the whole message once its last fragment arrives.
    fn push(&mut self, item: Item) -> Result<Option<(Codec, Vec<u8>)>, FragmentError> {
        let (bytes, last) = match item {
            Item::FirstText(bytes) => return self.start(Codec::Json, &bytes),
            Item::FirstBinary(bytes) => return self.start(Codec::Bincode, &bytes),
            Item::Continue(bytes) => (bytes, false),
            Item::Last(bytes) => (bytes, true),
        };
        let (_, buffer) = self.pending.as_mut().ok_or(FragmentError::Unexpected)?;
        if buffer.len() + bytes.len() > MAX_FRAME_BYTES {
            self.pending = None;
            return Err(FragmentError::TooLarge);
        }
        buffer.extend_from_slice(&bytes);
        Ok(if last { self.pending.take() } else { None })
    }

    fn start(
        &mut self,
        codec: Codec,
        bytes: &[u8],
    ) -> Result<Option<(Codec, Vec<u8>)>, FragmentError> {
        let interrupted = self.pending.is_some();
        self.pending = Some((codec, bytes.to_vec()));
        if interrupted {
            Err(FragmentError::Interrupted)
        } else {
            Ok(None)
        }
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

struct ConnectionActor {
    connection_id: ConnectionId,
    room_id: RoomId,
    /// Codec of the last inbound frame; replies use the same one.
    codec: Codec,
    buffer: usize,
    fragments: FrameAssembler,
    srv_tx: ServerTx,
}

impl ConnectionActor {
    fn send_to_server(&self, command: ConnectionCommand) -> bool {
        self.srv_tx.send(ServerCommand::Connection(command)).is_ok()
    }

    fn ingress(&mut self, codec: Codec, bytes: &[u8], ctx: &mut ws::WebsocketContext<Self>) {
        self.codec = codec;
        match codec.decode_command(bytes) {
            Ok(command) => {
                log::debug!("Ingress from {}: {:?}", self.connection_id, command);
                let from = self.connection_id;
                if !self.send_to_server(ConnectionCommand::Command { from, command }) {
                    log::error!("Hub is gone, closing connection {}", from);
                    ctx.stop();
                }
            }
            Err(err) => {
                log::debug!(
                    "Dropping frame of {} bytes from connection {}: {}",
                    bytes.len(),
                    self.connection_id,
                    err
                );
            }
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(self.buffer);

        let connected = self.send_to_server(ConnectionCommand::Connect {
            connection_id: self.connection_id,
            room_id: self.room_id.clone(),
            tx,
        });
        if !connected {
            log::error!("Hub is gone, refusing connection {}", self.connection_id);
            ctx.stop();
            return;
        }

        let addr = ctx.address();
        let connection_id = self.connection_id;

        tokio::spawn(async move {
            log::debug!("connection {} green thread - started", connection_id);
            while let Some(msg) = rx.recv().await {
                addr.do_send(ConnectionActorMessage(msg));
            }
            // The hub dropped our queue.
            addr.do_send(ConnectionActorMessage(ConnectionEvent::Disconnected));
            log::debug!("connection {} green thread - terminated", connection_id);
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.send_to_server(ConnectionCommand::Disconnect {
            from: self.connection_id,
        });
        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.ingress(Codec::Json, text.as_bytes(), ctx),
            Ok(ws::Message::Binary(bin)) => self.ingress(Codec::Bincode, &bin, ctx),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(item)) => match self.fragments.push(item) {
                Ok(Some((codec, bytes))) => self.ingress(codec, &bytes, ctx),
                Ok(None) => (),
                Err(err) => log::warn!(
                    "Dropping fragmented message from connection {}: {}",
                    self.connection_id,
                    err
                ),
            },
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
            Err(err) => {
                log::warn!("Protocol error on connection {}: {}", self.connection_id, err);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Disconnected => {
                ctx.close(Some(CloseReason {
                    code: CloseCode::Away,
                    description: Some("disconnected by server".into()),
                }));
                ctx.stop();
            }
            ConnectionEvent::ServerEvent(event) => match self.codec.encode_event(&event) {
                Ok(EncodedFrame::Text(text)) => ctx.text(text),
                Ok(EncodedFrame::Binary(bin)) => ctx.binary(bin),
                Err(err) => log::error!(
                    "Failed to encode event for connection {}: {}",
                    self.connection_id,
                    err
                ),
            },
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<RoomId>,
    srv_tx: web::Data<ServerTx>,
    ids: web::Data<ConnectionIdSource>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, Error> {
    let actor = ConnectionActor {
        connection_id: ids.next(),
        room_id: path.into_inner(),
        codec: Codec::default(),
        fragments: FrameAssembler::default(),
        buffer: config.connection_buffer,
        srv_tx: srv_tx.get_ref().clone(),
    };
    ws::WsResponseBuilder::new(actor, &req, stream)
        .frame_size(MAX_FRAME_BYTES)
        .start()
}
