//! Declarative rules: turns a [`RuleDescriptor`] into a [`RuleHandler`].

use axbridge_domain::change::CellChange;
use axbridge_domain::error::{BridgeError, HandlerError};
use axbridge_domain::rule::{LogLevel, RuleAction, RuleDescriptor, render};

use crate::ports::OutboundPublisher;
use crate::rule_engine::{RuleEngine, RuleHandler};

/// Handler that executes a descriptor's actions when its filters pass.
pub struct DeclarativeRule<P> {
    descriptor: RuleDescriptor,
    publisher: P,
}

impl<P: OutboundPublisher> DeclarativeRule<P> {
    /// Wrap a descriptor; `publisher` backs its `publish` actions.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the descriptor is invalid.
    pub fn new(descriptor: RuleDescriptor, publisher: P) -> Result<Self, BridgeError> {
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            publisher,
        })
    }

    #[must_use]
    pub fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn execute(&self, action: &RuleAction, change: &CellChange) -> Result<(), HandlerError> {
        match action {
            RuleAction::Log { level, message } => {
                log_line(&self.descriptor.name, *level, &render(message, change));
                Ok(())
            }
            RuleAction::Publish {
                topic,
                payload,
                retain,
            } => {
                let topic = render(topic, change);
                let payload = render(payload, change);
                tracing::debug!(rule = %self.descriptor.name, %topic, %payload, "publishing");
                self.publisher
                    .publish(&topic, payload.into_bytes(), *retain)
                    .map_err(HandlerError::from)
            }
        }
    }
}

impl<P: OutboundPublisher> RuleHandler for DeclarativeRule<P> {
    fn handle(&self, change: &CellChange) -> Result<(), HandlerError> {
        if !self.descriptor.matches(change) {
            return Ok(());
        }
        for action in &self.descriptor.actions {
            self.execute(action, change)?;
        }
        Ok(())
    }
}

fn log_line(rule: &str, level: LogLevel, message: &str) {
    match level {
        LogLevel::Trace => tracing::trace!(rule, "{message}"),
        LogLevel::Debug => tracing::debug!(rule, "{message}"),
        LogLevel::Info => tracing::info!(rule, "{message}"),
        LogLevel::Warn => tracing::warn!(rule, "{message}"),
        LogLevel::Error => tracing::error!(rule, "{message}"),
    }
}

impl RuleEngine {
    /// Register a declarative rule against the cell it watches.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the descriptor is invalid.
    pub fn register_descriptor<P>(
        &mut self,
        descriptor: RuleDescriptor,
        publisher: P,
    ) -> Result<(), BridgeError>
    where
        P: OutboundPublisher + 'static,
    {
        let name = descriptor.name.clone();
        let cell = descriptor.when_changed.clone();
        let rule = DeclarativeRule::new(descriptor, publisher)?;
        self.register_named(name, cell, rule);
        Ok(())
    }
}
