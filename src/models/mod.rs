pub mod diagnostic;
pub mod error;
pub mod options;
pub mod span;
pub mod stats;
pub mod textbound;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, Level};
pub use error::{FormatError, RecordError};
pub use options::{CompareConfig, CompareOptions, RetypeConfig, RetypeRule};
pub use span::{parse_span, spans_overlap};
pub use stats::{prec_rec_f, Metrics, Stats};
pub use textbound::{Normalization, Textbound};
