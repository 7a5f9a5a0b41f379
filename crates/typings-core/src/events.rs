//! Diagnostic event channel.
//!
//! Conditions that never fail a call (missing packages, stripped references,
//! unresolved bare modules) are reported here and through `tracing`.

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An ecosystem package is declared but not installed.
    NotInstalled { name: String, raw: String, consumer: String },
    /// A triple-slash reference was removed from compiled output.
    StrippedReference { path: String, consumer: String },
    /// A bare module import has no matching dependency.
    MissingDependency { module: String, consumer: String },
}

/// Cheap to clone; a default emitter only logs.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    sender: Option<mpsc::UnboundedSender<Event>>,
}

impl Emitter {
    /// An emitter plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    pub fn emit(&self, event: Event) {
        match &event {
            Event::NotInstalled { name, raw, consumer } => {
                tracing::warn!(%name, %raw, %consumer, "dependency is not installed");
            }
            Event::StrippedReference { path, consumer } => {
                tracing::debug!(%path, %consumer, "stripped reference");
            }
            Event::MissingDependency { module, consumer } => {
                tracing::debug!(%module, %consumer, "missing dependency");
            }
        }

        if let Some(sender) = &self.sender {
            // A dropped receiver just means nobody is listening.
            let _ = sender.send(event);
        }
    }
}
