use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use system::{Action, ConnectionId};

use crate::relay::RelayTx;

pub type ConnectionTx = tokio::sync::mpsc::UnboundedSender<ConnectionEvent>;

/// Transport events fed to the relay: the channel handshake, one inbound
/// text frame, and the disconnect notification.
#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Message {
        from: ConnectionId,
        text: String,
    },
    Disconnect {
        from: ConnectionId,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    Action(Action),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    relay_tx: RelayTx,
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ConnectionEvent>();

        if self
            .relay_tx
            .send(ConnectionCommand::Connect { tx })
            .is_err()
        {
            log::error!("relay is gone, refusing connection");
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            let addr = addr;
            log::debug!("connection egress pump - started");
            while let Some(event) = rx.recv().await {
                // do_send: a replay burst may exceed the actor mailbox capacity
                if addr.do_send(ConnectionActorMessage(event)).is_err() {
                    break;
                }
            }
            log::debug!("connection egress pump - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            let _ = self.relay_tx.send(ConnectionCommand::Disconnect { from: id });
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("ingress size: {}", text.len());
                if let ConnectionState::Connected(from) = self.state {
                    if self
                        .relay_tx
                        .send(ConnectionCommand::Message { from, text })
                        .is_err()
                    {
                        ctx.stop();
                    }
                }
            }
            Ok(ws::Message::Close(_)) => {
                if let ConnectionState::Connected(id) = self.state {
                    let _ = self.relay_tx.send(ConnectionCommand::Disconnect { from: id });
                }
                ctx.stop();
            }
            _ => (),
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
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(connection_id);
            }
            ConnectionEvent::Action(action) => {
                let text = action.encode();
                log::debug!("egress size: {}", text.len());
                ctx.text(text);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    relay_tx: web::Data<RelayTx>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            state: ConnectionState::Idle,
            relay_tx: relay_tx.get_ref().clone(),
        },
        &req,
        stream,
    )
}
