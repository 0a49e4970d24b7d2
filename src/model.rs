use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const SCHEMA_VERSION: u32 = 1;

/// Synthetic bucket for commits only reachable through tags.
pub const TAG_BUCKET: &str = "$tags";

/// One attributed commit. `branches: None` means the commit was reached only
/// through a tag and folds under [`TAG_BUCKET`] during aggregation. Sizes are
/// zero until the estimation stage fills them in; the record is not touched
/// again afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub commit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<BTreeSet<String>>,
    pub text_size: u64,
    pub binary_size: u64,
    pub est_compressed_size: u64,
}

impl CommitRecord {
    pub fn new(commit: String, branches: Option<BTreeSet<String>>) -> Self {
        Self {
            commit,
            branches,
            text_size: 0,
            binary_size: 0,
            est_compressed_size: 0,
        }
    }

    pub fn raw_size(&self) -> u64 {
        self.text_size + self.binary_size
    }
}

/// Per-commit line in a branch's detail list (the full report drops the
/// branch-set, which is implied by the enclosing aggregate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEntry {
    pub commit: String,
    pub text_size: u64,
    pub binary_size: u64,
    pub est_compressed_size: u64,
}

impl From<&CommitRecord> for CommitEntry {
    fn from(record: &CommitRecord) -> Self {
        Self {
            commit: record.commit.clone(),
            text_size: record.text_size,
            binary_size: record.binary_size,
            est_compressed_size: record.est_compressed_size,
        }
    }
}

/// Running totals for one branch (or the tag bucket). A commit belonging to
/// several branches contributes its full weight to each of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchAggregate {
    pub branch: String,
    pub est_compressed_size_mb: String,
    pub text_size: u64,
    pub binary_size: u64,
    pub est_compressed_size: u64,
    pub commits: Vec<CommitEntry>,
}

impl BranchAggregate {
    pub fn new(branch: String) -> Self {
        Self {
            branch,
            est_compressed_size_mb: String::new(),
            text_size: 0,
            binary_size: 0,
            est_compressed_size: 0,
            commits: Vec::new(),
        }
    }

    pub fn add_commit(&mut self, record: &CommitRecord) {
        self.text_size += record.text_size;
        self.binary_size += record.binary_size;
        self.est_compressed_size += record.est_compressed_size;
        self.commits.push(CommitEntry::from(record));
    }

    pub fn raw_size(&self) -> u64 {
        self.text_size + self.binary_size
    }
}

/// Light projection: summary only, no per-commit detail and no raw
/// estimated-compressed figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummary {
    pub branch: String,
    pub est_compressed_size_mb: String,
    pub text_size: u64,
    pub binary_size: u64,
}

impl From<&BranchAggregate> for BranchSummary {
    fn from(agg: &BranchAggregate) -> Self {
        Self {
            branch: agg.branch.clone(),
            est_compressed_size_mb: agg.est_compressed_size_mb.clone(),
            text_size: agg.text_size,
            binary_size: agg.binary_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightReport {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub trunk_branch: String,
    pub branches: Vec<BranchAggregate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightReportLight {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub trunk_branch: String,
    pub branches: Vec<BranchSummary>,
}
