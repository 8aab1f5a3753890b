//! Transcript engine: document access, extraction, history loading and export execution.
mod decode;
mod document;
mod extract;
mod filename;
mod html;
mod inspect;
mod orchestrator;
mod persist;
mod progress;
mod reactions;
mod scroll;
mod types;

pub use decode::{decode_snapshot, DecodeError, DecodedSnapshot};
pub use document::{DocumentError, DocumentProvider, NodeRole, Overflow, ScrollMetrics};
pub use extract::{ExtractionSettings, RecordExtractor};
pub use filename::{export_filename, DEFAULT_EXPORT_PREFIX};
pub use html::{HtmlDocument, RoleSelectors};
pub use inspect::{inspect_document, DocumentReport, RecordSample};
pub use orchestrator::{Clock, ExportOrchestrator, ExportPermit, ExportSettings};
pub use persist::{ensure_output_dir, PersistError, TranscriptWriter};
pub use progress::{ChannelProgressSink, LogProgressSink, NullProgressSink, ProgressSink};
pub use reactions::ReactionAggregator;
pub use scroll::PaginationController;
pub use types::{ExportError, ExportEvent, ExportReport, ExportResponse};
