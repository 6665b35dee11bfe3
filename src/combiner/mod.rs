pub mod aggregate_writer;
pub mod content_reader;
pub mod manifest;

pub use aggregate_writer::{
    default_output_name, AggregateWriter, CombineProgress, CombineSummary, CombineTally,
    SkippedFile,
};
pub use content_reader::{ContentReader, TextEncoding, UNREADABLE_PLACEHOLDER};
pub use manifest::{FileManifest, ManifestGroup};
