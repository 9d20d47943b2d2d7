//! Delivery channel seam.
//!
//! Real providers (email/SMS/call/letter) plug in behind `DeliveryChannel`;
//! the engine only sees success, failure, or timeout.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use solvendo_dunning::DlqMessage;

#[derive(Debug, Error, Clone)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Failed(String),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Attempt to deliver the message's payload downstream.
    async fn deliver(&self, message: &DlqMessage) -> Result<(), DeliveryError>;
}

/// Dev-mode channel: logs the attempt and reports success.
#[derive(Debug, Default)]
pub struct LoggingDelivery;

#[async_trait]
impl DeliveryChannel for LoggingDelivery {
    async fn deliver(&self, message: &DlqMessage) -> Result<(), DeliveryError> {
        info!(
            message_id = %message.id,
            queue = %message.queue_name,
            message_type = ?message.message_type,
            "delivering message"
        );
        Ok(())
    }
}

/// Scripted channel for tests: pops pre-arranged outcomes, then falls back to
/// a default outcome once the script runs dry.
pub struct ScriptedDelivery {
    script: Mutex<VecDeque<Result<(), DeliveryError>>>,
    fallback: Result<(), DeliveryError>,
}

impl ScriptedDelivery {
    pub fn new(
        script: Vec<Result<(), DeliveryError>>,
        fallback: Result<(), DeliveryError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
        }
    }

    pub fn always_succeed() -> Self {
        Self::new(Vec::new(), Ok(()))
    }

    pub fn always_fail(reason: impl Into<String>) -> Self {
        Self::new(Vec::new(), Err(DeliveryError::Failed(reason.into())))
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedDelivery {
    async fn deliver(&self, _message: &DlqMessage) -> Result<(), DeliveryError> {
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}
