pub mod coalescer;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod file_store;
pub mod format;
pub mod ingest;
pub mod lookup;
pub mod preprocess;
pub mod preview;
pub mod render;
pub mod session;
pub mod settings_store;
pub mod store;

pub use coalescer::{CoalescerState, PreviewCoalescer};
pub use decoder::{Entries, StreamDecoder, decode};
pub use encoding::SourceEncoding;
pub use error::{DecodeError, IngestError, PreviewError, RenderError, StoreError};
pub use file_store::FileStore;
pub use format::SourceFormat;
pub use ingest::{IngestOptions, IngestSummary, Ingestor, ProgressSink};
pub use lookup::{CandidateGenerator, LookupMode, candidates};
pub use preview::PreviewPipeline;
pub use render::{ContentRenderer, apply_rules};
pub use session::PreviewSession;
pub use settings_store::SettingsRepository;
pub use store::{KeyValueStore, MemoryStore};
