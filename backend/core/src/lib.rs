pub mod error;
pub mod event;
pub mod fake;
pub mod page;
pub mod traits;
pub mod types;

pub use error::ScanfillError;
pub use event::{RunEvent, RunEventKind};
pub use fake::{FakeInput, FakePage};
pub use page::Page;
pub use traits::Recognizer;
pub use types::{
    FieldMapping, FieldTarget, FillOutcome, ImageProbe, ImageReference, NotifyPolicy,
    RecognitionPolicy, RecognitionResult, RunState, Severity,
};
