//! Typed views over raw documents
//!
//! Each record is built from an untyped document through the normalization
//! functions, so construction never fails: whatever the stored shape, a
//! record comes out with canonical fields.

mod mentor;
mod session;
mod startup;

pub use mentor::Mentor;
pub use session::{Session, Signature};
pub use startup::Startup;
