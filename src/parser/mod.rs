//! Recursive-descent parsing (components C5 and C6).
//!
//! [`expr`] implements the expression grammar (spec §4.5); [`template`]
//! drives the segment sequence and re-enters [`expr`] for every embedded
//! expression (spec §4.6). Splitting these into two modules mirrors the
//! teacher's internal split in `parse.rs` between expression-level parsing
//! and chunk/segment-level parsing.

pub mod expr;
pub mod template;
