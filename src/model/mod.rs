//! Data models for submissions, findings and annotation shapes.

mod findings;
mod palette;
mod record;
mod shape;
mod submission;

pub use findings::{FlagFinding, Findings, SavePayload, SubmissionFindings, TextFinding};
pub use palette::Condition;
pub use record::ImageAnnotations;
pub use shape::{RectangleShape, Shape, ShapeColor};
pub use submission::{PatientInfo, Submission};
