//! Per-branch disk-weight estimation for git repositories.
//!
//! The pipeline runs in three strictly ordered stages:
//! 1. [`attribute`] — map every non-merge commit that is ahead of the trunk
//!    branch to the branches (or tags) that reach it.
//! 2. [`estimate_sizes`] — estimate each commit's text, binary, and
//!    compressed footprint from numstat output and blob sizes.
//! 3. [`aggregate`] — fold commits into ranked per-branch totals.
//!
//! Attribution is overlapping, not exclusive: a commit reachable from N
//! branches charges its full weight to each of them, answering "what would
//! deleting just this branch free" for every branch independently.

pub mod aggregate;
pub mod attribute;
pub mod cli;
pub mod error;
pub mod estimate;
pub mod git;
pub mod model;
pub mod report;

pub use crate::aggregate::{aggregate, AggregateOutput};
pub use crate::attribute::attribute;
pub use crate::error::{Result, WeightError};
pub use crate::estimate::estimate_sizes;
pub use crate::git::GitRepo;
