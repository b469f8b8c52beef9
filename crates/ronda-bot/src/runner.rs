//! The single-consumer polling loop.
//!
//! One gateway poll per tick; each fetched message runs through the
//! dispatcher to completion before the next. Reply failures are logged and
//! dropped so a flaky gateway never kills the loop. Ctrl-C stops it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ronda_access::AccessStore;
use ronda_ai::Responder;
use ronda_channel::WhatsappGateway;

use crate::dispatcher::Dispatcher;

pub async fn run<R, St>(
    gateway: Arc<WhatsappGateway>,
    mut dispatcher: Dispatcher<Arc<WhatsappGateway>, R, St>,
    poll_interval: Duration,
) where
    R: Responder,
    St: AccessStore,
{
    info!("bot starting");
    let mut interval = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                let messages = match gateway.fetch_messages().await {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("failed to fetch messages: {e}");
                        continue;
                    }
                };

                for msg in &messages {
                    if let Err(e) = dispatcher.handle(msg).await {
                        warn!(chat = %msg.chat_id, "failed to send reply: {e}");
                    }
                }
            }
        }
    }

    info!("bot stopped");
}
