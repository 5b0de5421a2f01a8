//! DocJourney Ingest — documentation page → speech-ready script, cached per domain.

pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod script;

pub use extract::{clean_text, extract_text, TextExtractor};
pub use fetch::{HttpFetcher, PageFetcher};
pub use pipeline::{Ingested, IngestionPipeline};
pub use script::{sanitize_for_speech, ScriptGenerator};
