//! Editor analyses over the structural document model
//!
//! The parser crate answers "what is the structure here"; this crate
//! turns those answers into editor operations: growing a selection
//! outward, delimiting the clause or goal under the cursor for
//! extraction, and tracking file references in `include`/`logtalk_load`
//! directives across a workspace.
//!
//! Everything here works on the same approximate model, so the analyses
//! stay useful on files that are mid-edit and transiently invalid.

pub mod extraction;
pub mod includes;
pub mod selection;

pub use extraction::{clause_at, goal_span, is_in_rule_body, ClauseInfo};
pub use includes::{find_include_references, rename_edits, FileEdit, IncludeReference};
pub use selection::{expand_selection, shrink_selection};
