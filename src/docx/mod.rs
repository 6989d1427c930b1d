//! Word (`.docx`) support.
//!
//! ```text
//! archive bytes ─ archive::extract_payload ─▶ word/document.xml
//!     model::flatten ─▶ blocks ─ replace::apply_replacement ─▶ blocks'
//!     model::serialize ─▶ payload' ─ archive::inject_payload ─▶ archive bytes'
//! ```

pub mod archive;
pub mod highlight;
pub mod model;
pub mod replace;

pub use archive::{PAYLOAD_ENTRY, extract_payload, inject_payload};
pub use highlight::{FragmentHit, Highlights, highlights};
pub use model::{Block, FlatDocument, TextFragment, flatten, serialize};
pub use replace::{
    PayloadOutcome, apply_pairs_to_payload, apply_replacement, apply_replacement_counted,
    replace_in_payload,
};
