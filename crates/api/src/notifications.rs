//! # Notification Dispatch
//!
//! The scheduler hands events to a [`ChannelEventSink`], which only pushes
//! them onto an unbounded channel. A dispatcher task started with
//! [`spawn_dispatcher`] drains the channel and forwards each event to a
//! [`Notifier`]. Delivery failures are logged and never reach the request
//! that caused the event.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::{eyre, Result};
use petcare_core::events::{AppointmentEvent, EventSink};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Event sink backed by a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: UnboundedSender<AppointmentEvent>,
}

impl ChannelEventSink {
    /// Creates a sink and the receiver a dispatcher should drain.
    pub fn channel() -> (Self, UnboundedReceiver<AppointmentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: AppointmentEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!(
                appointment_id = %e.0.appointment_id,
                "notification dispatcher is gone, dropping {:?}",
                e.0.kind
            );
        }
    }
}

/// Delivers a single appointment event to its recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()>;
}

/// Writes events to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()> {
        info!(
            appointment_id = %event.appointment_id,
            business_id = %event.business_id,
            recipient = %event.recipient,
            "appointment event {:?}",
            event.kind
        );
        Ok(())
    }
}

/// Posts each event as JSON to a configured URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &AppointmentEvent) -> Result<()> {
        let response = self.client.post(&self.url).json(event).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Webhook rejected event. Status: {}, Body: {}", status, body));
        }

        Ok(())
    }
}

/// Picks the webhook notifier when a URL is configured.
pub fn notifier_from_config(webhook_url: Option<&str>) -> Arc<dyn Notifier> {
    match webhook_url {
        Some(url) => {
            info!("Appointment events will be posted to {}", url);
            Arc::new(WebhookNotifier::new(url.to_string()))
        }
        None => Arc::new(LogNotifier),
    }
}

/// Forwards events from `rx` to `notifier` until every sender is dropped.
pub fn spawn_dispatcher(
    mut rx: UnboundedReceiver<AppointmentEvent>,
    notifier: Arc<dyn Notifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = notifier.notify(&event).await {
                error!(
                    appointment_id = %event.appointment_id,
                    "failed to deliver {:?} notification: {}",
                    event.kind,
                    e
                );
            }
        }
        info!("Notification dispatcher stopped");
    })
}
