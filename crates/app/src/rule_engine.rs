//! Rule engine: dispatches accepted cell changes to the handlers watching them.
//!
//! Handlers run synchronously, in registration order, on the thread that
//! performed the write. A failing handler (error or panic) is logged and
//! skipped; the remaining handlers still run.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use axbridge_domain::change::CellChange;
use axbridge_domain::error::HandlerError;
use axbridge_domain::id::CellRef;

use crate::ports::ChangeListener;

/// Reaction to a change of a watched cell.
///
/// Closures of the form `Fn(&CellChange) -> Result<(), HandlerError>`
/// implement this trait.
pub trait RuleHandler: Send + Sync {
    /// Handle one accepted change (`change.old != change.new`).
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the handler could not complete.
    fn handle(&self, change: &CellChange) -> Result<(), HandlerError>;
}

impl<F> RuleHandler for F
where
    F: Fn(&CellChange) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, change: &CellChange) -> Result<(), HandlerError> {
        self(change)
    }
}

struct Rule {
    name: String,
    handler: Box<dyn RuleHandler>,
}

/// Summary of one dispatch, for callers that want to observe it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that ran to completion.
    pub succeeded: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Handlers keyed by the cell they watch.
#[derive(Default)]
pub struct RuleEngine {
    rules: HashMap<CellRef, Vec<Rule>>,
}

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anonymous handler for `cell`.
    pub fn register_rule(&mut self, cell: CellRef, handler: impl RuleHandler + 'static) {
        let name = format!("{cell}#{}", self.rules.get(&cell).map_or(0, Vec::len));
        self.register_named(name, cell, handler);
    }

    /// Register a handler for `cell` under a name used in diagnostics.
    ///
    /// Handlers for the same cell run in the order they were registered.
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        cell: CellRef,
        handler: impl RuleHandler + 'static,
    ) {
        let name = name.into();
        tracing::debug!(rule = %name, cell = %cell, "rule registered");
        self.rules.entry(cell).or_default().push(Rule {
            name,
            handler: Box::new(handler),
        });
    }

    /// Run every handler registered for `change.cell`.
    pub fn notify(&self, change: &CellChange) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(rules) = self.rules.get(&change.cell) else {
            return report;
        };
        for rule in rules {
            let outcome = catch_unwind(AssertUnwindSafe(|| rule.handler.handle(change)))
                .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(&*panic))));
            match outcome {
                Ok(()) => report.succeeded += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        rule = %rule.name,
                        cell = %change.cell,
                        from = %change.old,
                        to = %change.new,
                        error = %error,
                        "rule handler failed",
                    );
                }
            }
        }
        report
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Names of the handlers watching `cell`, in dispatch order.
    #[must_use]
    pub fn rule_names(&self, cell: &CellRef) -> Vec<&str> {
        self.rules
            .get(cell)
            .map(|rules| rules.iter().map(|r| r.name.as_str()).collect())
            .unwrap_or_default()
    }
}

impl ChangeListener for RuleEngine {
    fn on_change(&self, change: &CellChange) {
        self.notify(change);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axbridge_domain::status::StatusValue;
    use axbridge_domain::time::now;
    use std::sync::{Arc, Mutex};

    fn cell(s: &str) -> CellRef {
        s.parse().unwrap()
    }

    fn change(at: &str, old: StatusValue, new: StatusValue) -> CellChange {
        CellChange::new(cell(at), old, new, now())
    }

    fn noop(_: &CellChange) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Handler that appends `tag` to a shared journal.
    fn recording(
        journal: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> impl RuleHandler + 'static {
        let journal = Arc::clone(journal);
        move |change: &CellChange| -> Result<(), HandlerError> {
            journal
                .lock()
                .unwrap()
                .push(format!("{tag}:{}->{}", change.old, change.new));
            Ok(())
        }
    }

    #[test]
    fn should_dispatch_to_handlers_in_registration_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RuleEngine::new();
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "first"));
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "second"));
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "third"));

        let report = engine.notify(&change(
            "Panel/zone1",
            StatusValue::Unknown,
            StatusValue::Armed,
        ));

        assert_eq!(report.succeeded, 3);
        assert_eq!(
            *journal.lock().unwrap(),
            [
                "first:unknown->armed",
                "second:unknown->armed",
                "third:unknown->armed"
            ]
        );
    }

    #[test]
    fn should_only_dispatch_to_handlers_of_changed_cell() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RuleEngine::new();
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "zone1"));
        engine.register_rule(cell("Panel/zone2"), recording(&journal, "zone2"));

        engine.notify(&change(
            "Panel/zone2",
            StatusValue::Armed,
            StatusValue::Disarmed,
        ));

        assert_eq!(*journal.lock().unwrap(), ["zone2:armed->disarmed"]);
    }

    #[test]
    fn should_return_empty_report_when_no_handler_watches_cell() {
        let engine = RuleEngine::new();
        let report = engine.notify(&change(
            "Panel/zone1",
            StatusValue::Unknown,
            StatusValue::Armed,
        ));
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn should_keep_dispatching_after_handler_error() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RuleEngine::new();
        engine.register_rule(
            cell("Panel/zone1"),
            |_: &CellChange| -> Result<(), HandlerError> {
                Err(HandlerError::Other("broker unreachable".into()))
            },
        );
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "after"));

        let report = engine.notify(&change(
            "Panel/zone1",
            StatusValue::Unknown,
            StatusValue::Armed,
        ));

        assert_eq!(report, DispatchReport { succeeded: 1, failed: 1 });
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[test]
    fn should_keep_dispatching_after_handler_panic() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RuleEngine::new();
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "before"));
        engine.register_rule(cell("Panel/zone1"), |_: &CellChange| -> Result<(), HandlerError> {
            panic!("handler exploded")
        });
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "after"));

        let report = engine.notify(&change(
            "Panel/zone1",
            StatusValue::Unknown,
            StatusValue::Armed,
        ));

        assert_eq!(report, DispatchReport { succeeded: 2, failed: 1 });
        assert_eq!(
            *journal.lock().unwrap(),
            ["before:unknown->armed", "after:unknown->armed"]
        );
    }

    #[test]
    fn should_extract_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(&*payload), "non-string panic payload");
    }

    #[test]
    fn should_name_anonymous_rules_by_cell_and_position() {
        let mut engine = RuleEngine::new();
        engine.register_rule(cell("Panel/zone1"), noop);
        engine.register_named("Siren", cell("Panel/zone1"), noop);
        engine.register_rule(cell("Panel/zone1"), noop);

        assert_eq!(engine.rule_count(), 3);
        assert_eq!(
            engine.rule_names(&cell("Panel/zone1")),
            ["Panel/zone1#0", "Siren", "Panel/zone1#2"]
        );
        assert!(engine.rule_names(&cell("Panel/zone2")).is_empty());
    }

    #[test]
    fn should_dispatch_when_used_as_change_listener() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut engine = RuleEngine::new();
        engine.register_rule(cell("Panel/zone1"), recording(&journal, "listener"));

        let listener: &dyn ChangeListener = &engine;
        listener.on_change(&change(
            "Panel/zone1",
            StatusValue::Disarmed,
            StatusValue::StayArmed,
        ));

        assert_eq!(*journal.lock().unwrap(), ["listener:disarmed->stay_armed"]);
    }
}
