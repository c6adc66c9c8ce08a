//! Real-time `new-order` fan-out to connected viewers.
//!
//! Delivery is best-effort: a viewer sees only events sent while it is
//! subscribed, and an event sent with nobody listening is dropped.

use crate::models::NewOrderEvent;
use actix_web::web::Bytes;
use actix_web::{web, HttpResponse};
use futures::stream::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

pub const NEW_ORDER_EVENT: &str = "new-order";

#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<NewOrderEvent>,
}

impl Broadcaster {
    /// `capacity` bounds how far a slow viewer may fall behind before it
    /// starts skipping events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Broadcaster { sender }
    }

    /// Pushes the event to every current viewer and returns how many got it.
    pub fn broadcast(&self, event: NewOrderEvent) -> usize {
        match self.sender.send(event) {
            Ok(delivered) => {
                log::info!("Broadcast {} to {} viewer(s)", NEW_ORDER_EVENT, delivered);
                delivered
            }
            Err(broadcast::error::SendError(event)) => {
                log::debug!(
                    "No viewers connected, dropped {} for order {}",
                    NEW_ORDER_EVENT,
                    event.order_id
                );
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NewOrderEvent> {
        self.sender.subscribe()
    }

    pub fn viewer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Formats one Server-Sent Events frame.
pub fn sse_frame(event: &NewOrderEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(data) => Some(format!("event: {}\ndata: {}\n\n", NEW_ORDER_EVENT, data)),
        Err(e) => {
            log::error!("Failed to serialize {} event: {}", NEW_ORDER_EVENT, e);
            None
        }
    }
}

/// `GET /api/events`: keeps the response open and streams every event
/// broadcast after the viewer connected.
pub async fn events(broadcaster: web::Data<Broadcaster>) -> HttpResponse {
    let receiver = broadcaster.subscribe();
    log::info!("Viewer connected, {} now listening", broadcaster.viewer_count());

    let stream = BroadcastStream::new(receiver).filter_map(|item| async move {
        match item {
            Ok(event) => {
                sse_frame(&event).map(|frame| Ok::<_, actix_web::Error>(Bytes::from(frame)))
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                log::warn!("Viewer lagged behind, skipped {} event(s)", skipped);
                None
            }
        }
    });

    // Opening comment so the client sees the stream is live before any order
    let opening = futures::stream::once(async {
        Ok::<_, actix_web::Error>(Bytes::from_static(b": connected\n\n"))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(opening.chain(stream))
}
