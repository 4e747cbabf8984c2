//! Tracing setup and the database log sink.
//!
//! Events go to stderr through the `fmt` layer and, through
//! [`DatabaseLogLayer`], to the `logging` table. The layer only queues events;
//! a background [`LogWriter`] task appends them, so a slow or failing database
//! never holds up the code that logged.

use chrono::Utc;
use netlog_db::{logs, Database, NewLogEntry};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Numeric level and level name as stored in the `logging` table.
#[must_use]
pub fn level_code(level: Level) -> (i64, &'static str) {
    match level {
        Level::TRACE | Level::DEBUG => (10, "DEBUG"),
        Level::INFO => (20, "INFO"),
        Level::WARN => (30, "WARNING"),
        Level::ERROR => (40, "ERROR"),
    }
}

/// Collects the message, the `error` field and any other fields of an event.
#[derive(Default)]
struct EntryVisitor {
    message: String,
    error: Option<String>,
    fields: String,
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "error" => self.error = Some(value.to_string()),
            name => {
                let _ = write!(self.fields, " {name}={value}");
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "error" => self.error = Some(format!("{value:?}")),
            name => {
                let _ = write!(self.fields, " {name}={value:?}");
            }
        }
    }
}

type Sender = Arc<Mutex<Option<UnboundedSender<NewLogEntry>>>>;

/// Tracing layer that forwards events to the `logging` table.
#[derive(Clone)]
pub struct DatabaseLogLayer {
    sender: Sender,
}

/// Receiving end of a [`DatabaseLogLayer`], waiting for a database.
pub struct LogQueue {
    sender: Sender,
    receiver: UnboundedReceiver<NewLogEntry>,
}

impl DatabaseLogLayer {
    /// Create the layer and the queue its events land in.
    ///
    /// Events are buffered until [`LogQueue::start`] is called, so the layer
    /// can be installed before the database is open.
    #[must_use]
    pub fn new() -> (Self, LogQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sender = Arc::new(Mutex::new(Some(sender)));
        (
            Self {
                sender: sender.clone(),
            },
            LogQueue { sender, receiver },
        )
    }
}

impl<S: Subscriber> Layer<S> for DatabaseLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // The writer's own queries would feed back into the queue.
        if metadata.target().starts_with("sqlx") {
            return;
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        let (level, level_name) = level_code(*metadata.level());
        let entry = NewLogEntry {
            level,
            level_name: level_name.to_string(),
            message: format!("{}{}", visitor.message, visitor.fields),
            created_at: Utc::now(),
            created_by: metadata.target().to_string(),
            execution_info: visitor.error,
            function_name: metadata.module_path().map(ToString::to_string),
            file_name: metadata
                .file()
                .map(|file| format!("{file}:{}", metadata.line().unwrap_or(0))),
        };

        if let Ok(guard) = self.sender.lock() {
            if let Some(sender) = guard.as_ref() {
                let _ = sender.send(entry);
            }
        }
    }
}

impl LogQueue {
    /// Start appending queued and future events to `database`.
    #[must_use]
    pub fn start(self, database: Database) -> LogWriter {
        let mut receiver = self.receiver;
        let handle = tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                if let Err(e) = logs::insert_log(database.pool(), &entry).await {
                    eprintln!("netlog: failed to write log record: {e}");
                }
            }
        });
        LogWriter {
            sender: self.sender,
            handle,
        }
    }
}

/// Background task appending log records.
pub struct LogWriter {
    sender: Sender,
    handle: JoinHandle<()>,
}

impl LogWriter {
    /// Stop accepting events and wait until everything queued is written.
    pub async fn shutdown(self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
        let _ = self.handle.await;
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--debug` turns on debug output for the
/// netlog crates.
pub fn init_tracing(debug: bool, database_layer: DatabaseLogLayer) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if debug {
        "info,sqlx=warn,netlog=debug"
    } else {
        "info,sqlx=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(database_layer)
        .with(filter)
        .init();
}
