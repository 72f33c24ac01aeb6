//! # survey-import
//!
//! Getting survey exports into the store:
//!
//! - [`csv_format`] decodes comment and structure exports and writes exports back out
//! - [`reconcile`] find-or-creates the institution → faculty → program hierarchy
//! - [`mismatch`] lists program names that will not resolve on commit
//! - [`workspace`] holds the rows a human verifies
//! - [`commit`] writes verified rows, all or nothing
//! - [`review`] edits responses that are already stored

pub mod commit;
pub mod csv_format;
pub mod mismatch;
pub mod reconcile;
pub mod review;
pub mod workspace;

pub use commit::{commit, CommitOutcome};
pub use csv_format::{
    export_responses, export_responses_to_path, parse_comment_file, parse_comments,
    parse_structure, parse_structure_file, ParsedComments, ParsedStructure,
};
pub use mismatch::{find_mismatches, MismatchKind, ProgramMismatch};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use workspace::{BusyGuard, VerificationWorkspace};
