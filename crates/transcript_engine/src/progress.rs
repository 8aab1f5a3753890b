use std::sync::mpsc;

use engine_logging::engine_info;

use crate::types::ExportEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ExportEvent);
}

/// Forwards events to a receiver; a dropped receiver is ignored.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<ExportEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ExportEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ExportEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes each event to the log.
#[derive(Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: ExportEvent) {
        match event {
            ExportEvent::Locating => engine_info!("Locating the conversation container"),
            ExportEvent::Counting { item_count } => {
                engine_info!("{} messages visible", item_count)
            }
            ExportEvent::Scrolling {
                iteration,
                item_count,
                ..
            } => engine_info!("Loading history ({}): {} messages", iteration, item_count),
            ExportEvent::Waiting => engine_info!("Waiting for the last messages to render"),
            ExportEvent::Extracting => engine_info!("Extracting messages"),
            ExportEvent::Formatting => engine_info!("Formatting transcript"),
            ExportEvent::Complete { message_count } => {
                engine_info!("{} messages exported", message_count)
            }
            ExportEvent::Error { message } => engine_info!("Export failed: {}", message),
        }
    }
}

#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ExportEvent) {}
}
