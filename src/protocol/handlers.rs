//! Dispatching protocol messages to handlers

use super::types::{
    parse_message_type, MergeFailedPayload, MergeReadyPayload, MergedPayload, MessageType,
    ReworkRequestPayload,
};
use crate::error::{Result, WhaletownError};
use crate::mail::Message;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// A handler for one message type
pub type Handler = Box<dyn Fn(&Message) -> Result<()> + Send + Sync>;

/// Routes protocol messages to the handler registered for their type
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageType, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the type
    pub fn register<F>(&mut self, kind: MessageType, handler: F)
    where
        F: Fn(&Message) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Whether a handler exists for the message's type
    pub fn can_handle(&self, msg: &Message) -> bool {
        parse_message_type(&msg.subject).is_some_and(|kind| self.handlers.contains_key(&kind))
    }

    /// Dispatch a message
    ///
    /// # Errors
    /// Fails if the subject is not a protocol message, no handler is
    /// registered for it, or the handler itself fails.
    pub fn handle(&self, msg: &Message) -> Result<()> {
        let kind = parse_message_type(&msg.subject).ok_or_else(|| {
            WhaletownError::Protocol(format!("not a protocol message: {}", msg.subject))
        })?;
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| WhaletownError::Protocol(format!("no handler for {}", kind)))?;

        tracing::debug!(kind = %kind, from = %msg.from, "Dispatching protocol message");
        handler(msg)
    }
}

/// Messages the witness receives from the refinery
pub trait WitnessHandler: Send + Sync {
    fn handle_merged(&self, payload: &MergedPayload) -> Result<()>;
    fn handle_merge_failed(&self, payload: &MergeFailedPayload) -> Result<()>;
    fn handle_rework_request(&self, payload: &ReworkRequestPayload) -> Result<()>;
}

/// Messages the refinery receives from the witness
pub trait RefineryHandler: Send + Sync {
    fn handle_merge_ready(&self, payload: &MergeReadyPayload) -> Result<()>;
}

/// Build a registry routing witness-bound messages to `handler`
pub fn wrap_witness_handlers<H: WitnessHandler + 'static>(handler: Arc<H>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    let h = Arc::clone(&handler);
    registry.register(MessageType::Merged, move |msg| {
        h.handle_merged(&MergedPayload::from_body(&msg.body))
    });
    let h = Arc::clone(&handler);
    registry.register(MessageType::MergeFailed, move |msg| {
        h.handle_merge_failed(&MergeFailedPayload::from_body(&msg.body))
    });
    registry.register(MessageType::ReworkRequest, move |msg| {
        handler.handle_rework_request(&ReworkRequestPayload::from_body(&msg.body))
    });

    registry
}

/// Build a registry routing refinery-bound messages to `handler`
pub fn wrap_refinery_handlers<H: RefineryHandler + 'static>(handler: Arc<H>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(MessageType::MergeReady, move |msg| {
        handler.handle_merge_ready(&MergeReadyPayload::from_body(&msg.body))
    });
    registry
}

/// Witness handler that acknowledges each message on a writer
pub struct DefaultWitnessHandler<W> {
    rig: String,
    output: Mutex<W>,
}

impl<W: Write + Send> DefaultWitnessHandler<W> {
    pub fn new(rig: impl Into<String>, output: W) -> Self {
        Self {
            rig: rig.into(),
            output: Mutex::new(output),
        }
    }

    pub fn rig(&self) -> &str {
        &self.rig
    }

    /// Consume the handler and return its writer
    pub fn into_output(self) -> W {
        self.output
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_line(&self, line: String) -> Result<()> {
        let mut out = self
            .output
            .lock()
            .map_err(|_| WhaletownError::Protocol("witness output lock poisoned".into()))?;
        writeln!(out, "[{}] {}", self.rig, line)?;
        Ok(())
    }
}

impl<W: Write + Send> WitnessHandler for DefaultWitnessHandler<W> {
    fn handle_merged(&self, payload: &MergedPayload) -> Result<()> {
        self.write_line(format!(
            "MERGED received: {} ({}) landed on {} as {}",
            payload.polecat, payload.issue, payload.target_branch, payload.merge_commit
        ))
    }

    fn handle_merge_failed(&self, payload: &MergeFailedPayload) -> Result<()> {
        self.write_line(format!(
            "MERGE_FAILED received: {} ({}) failed {}: {}",
            payload.polecat, payload.issue, payload.failure_type, payload.error
        ))
    }

    fn handle_rework_request(&self, payload: &ReworkRequestPayload) -> Result<()> {
        self.write_line(format!(
            "REWORK_REQUEST received: {} must rebase onto {} (conflicts: {})",
            payload.polecat,
            payload.target_branch,
            payload.conflict_files.join(", ")
        ))
    }
}
