//! AMQP events provider
//!
//! One connection and one channel are opened on first use and shared by
//! every publish and consumer. A failed publish drops both so the next
//! call reconnects.

use std::sync::Arc;

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{EventHandler, EventPublisher, Exchange, ExchangeType, ListenRequest, UserEvent};
use crate::shared::InfraError;

#[derive(Default)]
struct AmqpState {
    connection: Option<Connection>,
    channel: Option<Channel>,
}

struct Inner {
    url: String,
    exchange: Exchange,
    state: Mutex<AmqpState>,
}

#[derive(Clone)]
pub struct AmqpEventsProvider {
    inner: Arc<Inner>,
}

fn exchange_kind(kind: ExchangeType) -> ExchangeKind {
    match kind {
        ExchangeType::Topic => ExchangeKind::Topic,
        ExchangeType::Direct => ExchangeKind::Direct,
        ExchangeType::Fanout => ExchangeKind::Fanout,
    }
}

async fn ensure_exchange(channel: &Channel, exchange: &Exchange) -> Result<(), InfraError> {
    channel
        .exchange_declare(
            &exchange.name,
            exchange_kind(exchange.kind),
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok(())
}

impl Inner {
    async fn channel(&self) -> Result<Channel, InfraError> {
        let mut state = self.state.lock().await;

        if state.connection.is_none() {
            info!("Connecting to AMQP broker");
            let connection = Connection::connect(&self.url, ConnectionProperties::default()).await?;
            state.connection = Some(connection);
        }

        if let Some(channel) = &state.channel {
            return Ok(channel.clone());
        }

        let channel = match &state.connection {
            Some(connection) => connection.create_channel().await?,
            None => return Err(InfraError::Config("AMQP connection missing".into())),
        };
        state.channel = Some(channel.clone());
        Ok(channel)
    }

    async fn publish_event(&self, event: &UserEvent) -> Result<(), InfraError> {
        let payload = event.payload()?;
        let channel = self.channel().await?;

        ensure_exchange(&channel, &self.exchange).await?;

        channel
            .basic_publish(
                &self.exchange.name,
                event.routing_key(),
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(2),
            )
            .await?
            .await?;

        Ok(())
    }

    async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = AmqpState::default();
    }
}

impl AmqpEventsProvider {
    pub fn new(url: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                exchange,
                state: Mutex::new(AmqpState::default()),
            }),
        }
    }

    pub fn exchange(&self) -> &Exchange {
        &self.inner.exchange
    }

    /// Bind `request.queue` to its exchange and hand every delivery to
    /// `handler` on a background task. Set-up failures are logged.
    pub async fn listen(&self, request: ListenRequest, handler: Arc<dyn EventHandler>) {
        if let Err(e) = self.try_listen(&request, handler).await {
            error!(
                queue = %request.queue.name,
                exchange = %request.exchange.name,
                "Error setting up consumer: {}", e
            );
        }
    }

    async fn try_listen(
        &self,
        request: &ListenRequest,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), InfraError> {
        let channel = self.inner.channel().await?;

        ensure_exchange(&channel, &request.exchange).await?;

        channel
            .queue_declare(
                &request.queue.name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_bind(
                &request.queue.name,
                &request.exchange.name,
                &request.queue.key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let mut consumer = channel
            .basic_consume(
                &request.queue.name,
                "register-service",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let queue = request.queue.name.clone();
        info!(queue = %queue, key = %request.queue.key, "Listening for events");

        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        warn!(queue = %queue, "Consumer error: {}", e);
                        continue;
                    }
                };

                let outcome = match handler.handle(&delivery.data).await {
                    Ok(()) => delivery.ack(BasicAckOptions::default()).await,
                    Err(e) => {
                        error!(queue = %queue, "Error processing message: {}", e);
                        delivery
                            .nack(BasicNackOptions {
                                requeue: true,
                                ..Default::default()
                            })
                            .await
                    }
                };

                if let Err(e) = outcome {
                    warn!(queue = %queue, "Failed to settle delivery: {}", e);
                }
            }
            debug!(queue = %queue, "Consumer stream ended");
        });

        Ok(())
    }

    /// Close channel then connection. Cached state is cleared even when
    /// closing fails.
    pub async fn close(&self) {
        let mut state = self.inner.state.lock().await;

        if let Some(channel) = state.channel.take() {
            if let Err(e) = channel.close(200, "Bye").await {
                error!("Error closing AMQP channel: {}", e);
            }
        }
        if let Some(connection) = state.connection.take() {
            if let Err(e) = connection.close(200, "Bye").await {
                error!("Error closing AMQP connection: {}", e);
            }
        }

        info!("AMQP provider closed");
    }
}

impl EventPublisher for AmqpEventsProvider {
    fn publish(&self, event: UserEvent) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(routing_key = event.routing_key(), "No runtime to publish on: {}", e);
                metrics::counter!("events_publish_failures_total", "routing_key" => event.routing_key())
                    .increment(1);
                return;
            }
        };

        let inner = self.inner.clone();
        runtime.spawn(async move {
            let routing_key = event.routing_key();
            match inner.publish_event(&event).await {
                Ok(()) => {
                    debug!(routing_key, user_id = %event.user_id(), "Event published");
                    metrics::counter!("events_published_total", "routing_key" => routing_key)
                        .increment(1);
                }
                Err(e) => {
                    error!(routing_key, user_id = %event.user_id(), "Error publishing message: {}", e);
                    metrics::counter!("events_publish_failures_total", "routing_key" => routing_key)
                        .increment(1);
                    inner.reset().await;
                }
            }
        });
    }
}
