//! The output buffer.
//!
//! [`Output`] emits headers and content. In buffered mode nothing is
//! written immediately: headers and content are queued as listeners on
//! the `output.display.headers` and `output.display.content` events, so
//! queued pieces can be reordered, replaced or dropped right up until
//! [`Output::flush`] triggers both events. Unbuffered, everything goes
//! straight to the sink.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;

use thiserror::Error;

use tine_core::{BoxError, Callback, EventBus, EventError, Loader, TineError, Value};

/// The event the queued headers live on.
pub const HEADERS_EVENT: &str = "output.display.headers";

/// The event the queued content lives on.
pub const CONTENT_EVENT: &str = "output.display.content";

static STATUS_CODES: phf::Map<u16, &'static str> = phf::phf_map! {
    100u16 => "Continue",
    101u16 => "Switching Protocols",
    200u16 => "OK",
    201u16 => "Created",
    202u16 => "Accepted",
    203u16 => "Non-Authoritative Information",
    204u16 => "No Content",
    205u16 => "Reset Content",
    206u16 => "Partial Content",
    300u16 => "Multiple Choices",
    301u16 => "Moved Permanently",
    302u16 => "Found",
    303u16 => "See Other",
    304u16 => "Not Modified",
    305u16 => "Use Proxy",
    307u16 => "Temporary Redirect",
    400u16 => "Bad Request",
    401u16 => "Unauthorized",
    402u16 => "Payment Required",
    403u16 => "Forbidden",
    404u16 => "Not Found",
    405u16 => "Method Not Allowed",
    406u16 => "Not Acceptable",
    407u16 => "Proxy Authentication Required",
    408u16 => "Request Timeout",
    409u16 => "Conflict",
    410u16 => "Gone",
    411u16 => "Length Required",
    412u16 => "Precondition Failed",
    413u16 => "Request Entity Too Large",
    414u16 => "Request-URI Too Long",
    415u16 => "Unsupported Media Type",
    416u16 => "Requested Range Not Satisfiable",
    417u16 => "Expectation Failed",
    500u16 => "Internal Server Error",
    501u16 => "Not Implemented",
    502u16 => "Bad Gateway",
    503u16 => "Service Unavailable",
    504u16 => "Gateway Timeout",
    505u16 => "HTTP Version Not Supported",
};

/// The reason phrase for an HTTP status code.
pub fn status_string(status: u16) -> Option<&'static str> {
    STATUS_CODES.get(&status).copied()
}

/// Errors from the output buffer.
#[derive(Error, Debug)]
pub enum OutputError {
    /// A template path did not resolve to a template.
    #[error("invalid template path ({path})")]
    InvalidTemplate {
        /// The unresolved path.
        path: String,
    },

    /// A template resolved but failed to render.
    #[error("template {path} failed to render")]
    Render {
        /// The template path.
        path: String,
        /// The renderer's failure.
        #[source]
        source: BoxError,
    },

    /// A positional queue insert targeted an invalid position.
    #[error(transparent)]
    Position(#[from] EventError),
}

impl From<OutputError> for TineError {
    fn from(err: OutputError) -> Self {
        TineError::Custom(Box::new(err))
    }
}

/// A shared writable destination for the rendered response.
pub type Sink = Rc<RefCell<Box<dyn Write>>>;

/// Queues and emits the response headers and content.
pub struct Output {
    event: Rc<EventBus>,
    loader: Rc<dyn Loader>,
    sink: Sink,
    buffered: Cell<bool>,
    callback: RefCell<Option<Callback>>,
}

impl Output {
    /// Creates the buffer writing to stdout.
    pub fn new(event: Rc<EventBus>, loader: Rc<dyn Loader>) -> Self {
        let sink: Sink = Rc::new(RefCell::new(Box::new(std::io::stdout())));
        Self::with_sink(event, loader, sink)
    }

    /// Creates the buffer writing to the sink passed.
    pub fn with_sink(event: Rc<EventBus>, loader: Rc<dyn Loader>, sink: Sink) -> Self {
        Self {
            event,
            loader,
            sink,
            buffered: Cell::new(false),
            callback: RefCell::new(None),
        }
    }

    /// Turns on output buffering, optionally with a custom content
    /// callback used in place of the default sink write.
    pub fn buffer(&self, callback: Option<Callback>) {
        self.buffered.set(true);
        *self.callback.borrow_mut() = callback;
    }

    /// Whether output is being buffered.
    pub fn buffered(&self) -> bool {
        self.buffered.get()
    }

    /// Emits the queued headers and content, turns off buffering and
    /// clears the queues.
    pub fn flush(&self) {
        if self.buffered.get() {
            self.output_headers();
            self.output_content();
            self.buffered.set(false);
        }
        self.clear();
    }

    /// Drops everything queued so far.
    pub fn clear(&self) {
        self.event.destroy(HEADERS_EVENT);
        self.event.destroy(CONTENT_EVENT);
    }

    //-----------------------------------------------------------------
    // builder methods
    //-----------------------------------------------------------------

    /// Queues a status line for the code passed.
    pub fn set_status_code(&self, status: u16) {
        let reason = status_string(status).unwrap_or_default();
        self.add_header(&format!("HTTP/1.0 {status} {reason}"));
    }

    /// Adds a header: queued when buffered, written immediately
    /// otherwise. Returns the queue key when buffered.
    pub fn add_header(&self, header: &str) -> Option<String> {
        match self.add_header_at(header, None, None) {
            Ok(id) => id,
            // appending without a position cannot fail
            Err(_) => unreachable!(),
        }
    }

    /// Adds a header at a specific queue position.
    pub fn add_header_at(
        &self,
        header: &str,
        position: Option<usize>,
        id: Option<String>,
    ) -> Result<Option<String>, OutputError> {
        if self.buffered.get() {
            let key = self.event.listen_at(
                HEADERS_EVENT,
                self.write_line_callback(),
                vec![Value::String(header.to_string())],
                position,
                id,
                false,
            )?;
            Ok(Some(key))
        } else {
            self.write_line(header);
            Ok(None)
        }
    }

    /// Adds content: queued when buffered, written immediately
    /// otherwise. Returns the queue key when buffered.
    pub fn add_content(&self, content: &str) -> Option<String> {
        match self.add_content_at(content, None, None) {
            Ok(id) => id,
            // appending without a position cannot fail
            Err(_) => unreachable!(),
        }
    }

    /// Adds content at a specific queue position, which makes it
    /// possible to rearrange or alter content already added.
    pub fn add_content_at(
        &self,
        content: &str,
        position: Option<usize>,
        id: Option<String>,
    ) -> Result<Option<String>, OutputError> {
        if self.buffered.get() {
            let callback = self
                .callback
                .borrow()
                .clone()
                .unwrap_or_else(|| self.write_text_callback());
            let key = self.event.listen_at(
                CONTENT_EVENT,
                callback,
                vec![Value::String(content.to_string())],
                position,
                id,
                false,
            )?;
            Ok(Some(key))
        } else {
            self.write_text(content);
            Ok(None)
        }
    }

    /// Renders a template through the loader and adds the result as
    /// content.
    pub fn add_template(
        &self,
        path: &str,
        vars: &Value,
        position: Option<usize>,
    ) -> Result<Option<String>, OutputError> {
        if !self.loader.is_template(path) {
            return Err(OutputError::InvalidTemplate { path: path.into() });
        }
        let rendered = self
            .loader
            .render_template(path, vars)
            .map_err(|source| OutputError::Render {
                path: path.into(),
                source,
            })?;
        self.add_content_at(&rendered, position, None)
    }

    //-----------------------------------------------------------------
    // output methods
    //-----------------------------------------------------------------

    /// Triggers the event that emits the queued headers.
    pub fn output_headers(&self) {
        // cannot fail without the fatal flag
        let _ = self.event.trigger(HEADERS_EVENT, None, false, false);
    }

    /// Triggers the event that emits the queued content.
    pub fn output_content(&self) {
        // cannot fail without the fatal flag
        let _ = self.event.trigger(CONTENT_EVENT, None, false, false);
    }

    fn write_line(&self, line: &str) {
        if let Err(err) = writeln!(self.sink.borrow_mut(), "{line}") {
            tracing::warn!(target: "tine::output", "header write failed: {err}");
        }
    }

    fn write_text(&self, text: &str) {
        if let Err(err) = write!(self.sink.borrow_mut(), "{text}") {
            tracing::warn!(target: "tine::output", "content write failed: {err}");
        }
    }

    fn write_line_callback(&self) -> Callback {
        let sink = Rc::clone(&self.sink);
        Rc::new(move |bound, _runtime| {
            if let Some(line) = bound.first().and_then(Value::as_str)
                && let Err(err) = writeln!(sink.borrow_mut(), "{line}")
            {
                tracing::warn!(target: "tine::output", "header write failed: {err}");
            }
            Value::Null
        })
    }

    fn write_text_callback(&self) -> Callback {
        let sink = Rc::clone(&self.sink);
        Rc::new(move |bound, _runtime| {
            if let Some(text) = bound.first().and_then(Value::as_str)
                && let Err(err) = write!(sink.borrow_mut(), "{text}")
            {
                tracing::warn!(target: "tine::output", "content write failed: {err}");
            }
            Value::Null
        })
    }
}
