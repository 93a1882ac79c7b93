//! Rule: watched cell → change filter → actions.
//!
//! A rule descriptor is the declarative form of a rule, as written in the
//! configuration file. The application layer turns it into a handler and
//! registers it against `when_changed`.

mod action;

pub use action::{LogLevel, RuleAction, render};

use serde::{Deserialize, Serialize};

use crate::change::CellChange;
use crate::error::{BridgeError, ValidationError};
use crate::id::CellRef;
use crate::status::StatusValue;

/// Declarative rule reacting to value changes of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub name: String,
    pub when_changed: CellRef,
    /// Only act when the cell leaves this value.
    #[serde(default)]
    pub from: Option<StatusValue>,
    /// Only act when the cell enters this value.
    #[serde(default)]
    pub to: Option<StatusValue>,
    pub actions: Vec<RuleAction>,
}

impl RuleDescriptor {
    /// Create a builder for constructing a [`RuleDescriptor`].
    #[must_use]
    pub fn builder() -> RuleDescriptorBuilder {
        RuleDescriptorBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }

    /// Whether this rule should act on `change`.
    #[must_use]
    pub fn matches(&self, change: &CellChange) -> bool {
        change.cell == self.when_changed
            && self.from.is_none_or(|from| from == change.old)
            && self.to.is_none_or(|to| to == change.new)
    }
}

/// Step-by-step builder for [`RuleDescriptor`].
#[derive(Debug, Default)]
pub struct RuleDescriptorBuilder {
    name: Option<String>,
    when_changed: Option<CellRef>,
    from: Option<StatusValue>,
    to: Option<StatusValue>,
    actions: Vec<RuleAction>,
}

impl RuleDescriptorBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn when_changed(mut self, cell: CellRef) -> Self {
        self.when_changed = Some(cell);
        self
    }

    #[must_use]
    pub fn from(mut self, value: StatusValue) -> Self {
        self.from = Some(value);
        self
    }

    #[must_use]
    pub fn to(mut self, value: StatusValue) -> Self {
        self.to = Some(value);
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`RuleDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the watched cell is missing, the
    /// name is empty, or no action was given.
    pub fn build(self) -> Result<RuleDescriptor, BridgeError> {
        let when_changed = self
            .when_changed
            .ok_or_else(|| ValidationError::InvalidCellRef(String::new()))?;
        let rule = RuleDescriptor {
            name: self.name.unwrap_or_default(),
            when_changed,
            from: self.from,
            to: self.to,
            actions: self.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}
