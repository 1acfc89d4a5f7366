//! `scanfill-fill` — maps recognition results onto the form and writes the
//! values, with compatibility event emission and interceptor removal.

pub mod filler;
pub mod mapper;

pub use filler::{FillStatus, FormFiller};
pub use mapper::{mapped_fields, MappedField};
