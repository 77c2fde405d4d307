pub mod input;
pub mod output;

pub use input::*;
pub use output::*;

use thiserror::Error;

/// Section attribute value marking the Q&A section
pub const QA_SECTION_NAME: &str = "Question and Answer";

/// Fatal structural problems in a transcript document
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("transcript has no 'Question and Answer' section")]
    MissingQaSection,
    #[error("annotation count mismatch: {records} records for {nodes} annotatable nodes")]
    AnnotationMismatch { records: usize, nodes: usize },
}
