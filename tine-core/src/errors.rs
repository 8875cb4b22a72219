//! The error log subsystem.
//!
//! [`Errors`] collects reported errors into keyed logs and forwards each
//! report to its active [`ErrorHandler`]s. It tolerates having no
//! handlers at all, in which case reports are only collected.

use std::cell::RefCell;

use crate::collection::KeyedList;
use crate::dispatcher::{Dispatcher, HandlerConfig};
use crate::error::DispatchError;
use crate::handler::ErrorHandler;

/// How severe a reported error is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Informational; execution continues normally.
    Notice,
    /// Something suspect; execution continues.
    Warning,
    /// A real failure.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Notice => "Notice",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        })
    }
}

/// The full record of one reported error.
#[derive(Clone, Debug)]
pub struct ErrorDetail {
    /// The report's severity.
    pub severity: Severity,
    /// The message as reported.
    pub message: String,
    /// The file the report came from.
    pub file: String,
    /// The line the report came from.
    pub line: u32,
}

/// Collects reported errors and dispatches them to error handlers.
pub struct Errors {
    verbose: bool,
    dispatcher: RefCell<Dispatcher<dyn ErrorHandler>>,
    errors: RefCell<KeyedList<String>>,
    details: RefCell<KeyedList<ErrorDetail>>,
}

impl Errors {
    /// Creates the subsystem. With `verbose` the logged messages carry
    /// file names and line numbers.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            dispatcher: RefCell::new(Dispatcher::new(0, None)),
            errors: RefCell::new(KeyedList::new()),
            details: RefCell::new(KeyedList::new()),
        }
    }

    /// Replaces all handlers from config.
    pub fn init(
        &self,
        config: Vec<(String, HandlerConfig<dyn ErrorHandler>)>,
    ) -> Result<(usize, usize), DispatchError> {
        self.dispatcher.borrow_mut().init(config)
    }

    /// Adds a handler.
    pub fn add_handler(&self, name: &str, handler: Box<dyn ErrorHandler>, active: bool) {
        self.dispatcher.borrow_mut().add_handler(name, handler, active);
    }

    /// Activates a handler by name.
    pub fn activate(&self, name: &str) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().activate(name)
    }

    /// Deactivates a handler by name.
    pub fn deactivate(&self, name: &str, warn: bool) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().deactivate(name, warn)
    }

    /// Removes a handler and its config.
    pub fn remove_handler(&self, name: &str, warn: bool) -> Result<(), DispatchError> {
        self.dispatcher.borrow_mut().remove_handler(name, warn)
    }

    /// Records an error and forwards it to the active handlers.
    ///
    /// Returns the key of the logged message.
    pub fn report(
        &self,
        severity: Severity,
        message: &str,
        file: &str,
        line: u32,
    ) -> String {
        let logged = if self.verbose {
            format!("{severity}: {message} in {file} on line {line}")
        } else {
            message.to_string()
        };

        let id = match self.errors.borrow_mut().append(logged) {
            Ok(id) => id,
            // the message log has no validation hook
            Err(_) => unreachable!(),
        };
        let detail = ErrorDetail {
            severity,
            message: message.to_string(),
            file: file.to_string(),
            line,
        };
        let _ = self.details.borrow_mut().append_keyed(id.clone(), detail);

        // cardinality is [0, unbounded), so dispatch cannot fail
        let _ = self
            .dispatcher
            .borrow()
            .dispatch(|handler| handler.handle(severity, message, file, line));

        id
    }

    /// Records an error-severity report.
    pub fn error(&self, message: &str) -> String {
        self.report(Severity::Error, message, "", 0)
    }

    /// Records a warning-severity report.
    pub fn warning(&self, message: &str) -> String {
        self.report(Severity::Warning, message, "", 0)
    }

    /// Records a notice-severity report.
    pub fn notice(&self, message: &str) -> String {
        self.report(Severity::Notice, message, "", 0)
    }

    /// Clears out all the collected error data.
    pub fn clear(&self) {
        self.errors.borrow_mut().clear();
        self.details.borrow_mut().clear();
    }

    /// The number of collected errors.
    pub fn count(&self) -> usize {
        self.errors.borrow().len()
    }

    /// The logged messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .borrow()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// The logged messages with their keys.
    pub fn items(&self) -> Vec<(String, String)> {
        self.errors
            .borrow()
            .iter()
            .map(|(key, message)| (key.to_string(), message.clone()))
            .collect()
    }

    /// The full detail records in report order.
    pub fn details(&self) -> Vec<ErrorDetail> {
        self.details
            .borrow()
            .iter()
            .map(|(_, detail)| detail.clone())
            .collect()
    }

    /// The verbosity flag.
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Collecting {
        seen: Rc<RefCell<Vec<(Severity, String)>>>,
    }

    impl ErrorHandler for Collecting {
        fn handle(&self, severity: Severity, message: &str, _file: &str, _line: u32) {
            self.seen.borrow_mut().push((severity, message.to_string()));
        }
    }

    #[test]
    fn reports_are_collected_and_dispatched() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let errors = Errors::new(false);
        errors.add_handler("collect", Box::new(Collecting { seen: seen.clone() }), true);

        errors.error("first");
        errors.warning("second");

        assert_eq!(errors.count(), 2);
        assert_eq!(errors.messages(), vec!["first", "second"]);
        assert_eq!(
            *seen.borrow(),
            vec![
                (Severity::Error, "first".to_string()),
                (Severity::Warning, "second".to_string()),
            ]
        );
    }

    #[test]
    fn reports_without_handlers_are_still_collected() {
        let errors = Errors::new(false);
        errors.error("quiet");
        errors.notice("aside");
        assert_eq!(errors.count(), 2);

        let items = errors.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].1, "quiet");
        assert!(!errors.verbose());
    }

    #[test]
    fn deactivated_handlers_are_skipped_until_reactivated() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let errors = Errors::new(false);
        errors.add_handler("collect", Box::new(Collecting { seen: seen.clone() }), true);

        errors.deactivate("collect", true).unwrap();
        errors.error("unseen");
        assert!(seen.borrow().is_empty());

        errors.activate("collect").unwrap();
        errors.error("seen");
        assert_eq!(seen.borrow().len(), 1);

        errors.remove_handler("collect", true).unwrap();
        errors.error("alone");
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn verbose_messages_carry_file_and_line() {
        let errors = Errors::new(true);
        errors.report(Severity::Error, "broken", "src/thing.rs", 42);
        assert_eq!(
            errors.messages(),
            vec!["Error: broken in src/thing.rs on line 42"]
        );
        // details keep the unformatted message
        assert_eq!(errors.details()[0].message, "broken");
    }

    #[test]
    fn clear_empties_the_logs() {
        let errors = Errors::new(false);
        errors.error("gone");
        errors.clear();
        assert_eq!(errors.count(), 0);
        assert!(errors.details().is_empty());
    }
}
