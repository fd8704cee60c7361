//! Realtime product feed over a websocket.
//!
//! Each connected client receives `{"event":"updateProducts","data":[...]}` once
//! on connect and again after every catalog mutation, whoever made it. Clients
//! may send `newProduct` (a product draft) or `deleteProduct` (an id); these go
//! through the same catalog as the HTTP routes, so their effect reaches every
//! client through the change feed rather than through a direct reply.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use service::domain::{Product, ProductDraft};
use service::repository::CatalogRepository;

use crate::state::ServerState;

#[derive(Debug, PartialEq)]
pub enum ClientEvent {
    NewProduct(ProductDraft),
    DeleteProduct(u64),
}

#[derive(Debug, Error, PartialEq)]
pub enum ClientEventError {
    #[error("unrecognised message: {0}")]
    Unrecognised(String),
    /// A known event whose payload has the wrong shape.
    #[error("invalid {event} payload: {reason}")]
    Invalid { event: &'static str, reason: String },
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, ClientEventError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ClientEventError::Unrecognised(e.to_string()))?;
        let invalid = |event: &'static str| move |e: serde_json::Error| ClientEventError::Invalid { event, reason: e.to_string() };
        match envelope.event.as_str() {
            "newProduct" => serde_json::from_value(envelope.data).map(Self::NewProduct).map_err(invalid("newProduct")),
            "deleteProduct" => serde_json::from_value(envelope.data).map(Self::DeleteProduct).map_err(invalid("deleteProduct")),
            other => Err(ClientEventError::Unrecognised(format!("unknown event {other:?}"))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent<'a> {
    UpdateProducts(&'a [Product]),
}

impl ServerEvent<'_> {
    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text)),
            Err(e) => {
                warn!(err = %e, "failed to encode realtime event");
                None
            }
        }
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(socket: WebSocket, state: ServerState) {
    // Subscribe before reading the initial list so no mutation falls in between.
    let mut updates = state.product_events.subscribe();
    let initial = state.catalog.list().await;
    info!(subscribers = state.product_events.receiver_count(), "realtime client connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        if let Some(msg) = ServerEvent::UpdateProducts(&initial).to_message() {
            if sink.send(msg).await.is_err() {
                return;
            }
        }
        loop {
            match updates.recv().await {
                Ok(event) => {
                    let Some(msg) = ServerEvent::UpdateProducts(&event.snapshot[..]).to_message() else {
                        continue;
                    };
                    if sink.send(msg).await.is_err() {
                        break;
                    }
                }
                // Every event carries the whole list, so skipping ahead loses nothing.
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged = n, "realtime client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let catalog = state.catalog.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => handle_client_event(catalog.as_ref(), &text).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!("realtime client disconnected");
}

async fn handle_client_event(catalog: &dyn CatalogRepository, text: &str) {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(e @ ClientEventError::Invalid { .. }) => {
            warn!(err = %e, "realtime catalog change rejected");
            return;
        }
        Err(e) => {
            debug!(err = %e, "ignoring unrecognised realtime message");
            return;
        }
    };
    let outcome = match event {
        ClientEvent::NewProduct(draft) => catalog.create(draft).await.map(|_| ()),
        ClientEvent::DeleteProduct(id) => catalog.delete(id).await.map(|_| ()),
    };
    if let Err(e) = outcome {
        warn!(err = %e, "realtime catalog change rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_decode() {
        let ev = ClientEvent::parse(r#"{"event":"deleteProduct","data":3}"#).unwrap();
        assert_eq!(ev, ClientEvent::DeleteProduct(3));

        let ev = ClientEvent::parse(r#"{"event":"newProduct","data":{"title":"A","code":"C1"}}"#).unwrap();
        match ev {
            ClientEvent::NewProduct(draft) => {
                assert_eq!(draft.code.as_deref(), Some("C1"));
                assert_eq!(draft.price, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn badly_typed_drafts_are_invalid_not_unrecognised() {
        for text in [
            r#"{"event":"newProduct","data":{"title":"A","stock":-1}}"#,
            r#"{"event":"newProduct","data":{"title":"A","price":"10"}}"#,
            r#"{"event":"newProduct","data":{"title":"A","stock":2.5}}"#,
            r#"{"event":"deleteProduct","data":"one"}"#,
        ] {
            assert!(
                matches!(ClientEvent::parse(text), Err(ClientEventError::Invalid { .. })),
                "{text}"
            );
        }
        assert!(matches!(ClientEvent::parse(r#"{"event":"shutdown"}"#), Err(ClientEventError::Unrecognised(_))));
        assert!(matches!(ClientEvent::parse("not json"), Err(ClientEventError::Unrecognised(_))));
    }

    #[test]
    fn server_event_shape() {
        let products = vec![Product {
            id: 1,
            title: "A".into(),
            description: "d".into(),
            price: 10.0,
            thumbnail: "t".into(),
            code: "C1".into(),
            stock: 5,
        }];
        let value = serde_json::to_value(ServerEvent::UpdateProducts(&products)).unwrap();
        assert_eq!(value["event"], "updateProducts");
        assert_eq!(value["data"][0]["code"], "C1");
    }
}
