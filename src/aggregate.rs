use crate::model::{BranchAggregate, BranchSummary, CommitRecord, TAG_BUCKET};
use indexmap::IndexMap;

/// Ranked per-branch totals, with the summary-only projection alongside.
#[derive(Debug, Clone)]
pub struct AggregateOutput {
    pub full: Vec<BranchAggregate>,
    pub light: Vec<BranchSummary>,
}

/// Render an estimated compressed size as MB: one decimal at >= 0.1 MB, two
/// decimals at >= 0.01 MB, otherwise the zero marker.
pub fn format_size_mb(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 0.1 {
        format!("{mb:.1} MB")
    } else if mb >= 0.01 {
        format!("{mb:.2} MB")
    } else {
        "0 MB".to_string()
    }
}

/// Stage 3: fold commit records into per-branch aggregates and rank them.
///
/// A commit belonging to N branches is charged in full to each of the N
/// aggregates (overlapping attribution: each branch is priced as "what would
/// deleting just this branch free", so shared history shows up under every
/// owner). Tag-only commits fold under the `$tags` bucket. A record carrying
/// an empty branch set violates the attribution contract and is dropped
/// rather than failing the run.
pub fn aggregate(records: &[CommitRecord]) -> AggregateOutput {
    let mut map: IndexMap<String, BranchAggregate> = IndexMap::new();

    for record in records {
        let owners: Vec<&str> = match &record.branches {
            None => vec![TAG_BUCKET],
            Some(set) if set.is_empty() => continue,
            Some(set) => set.iter().map(String::as_str).collect(),
        };
        for branch in owners {
            map.entry(branch.to_string())
                .or_insert_with(|| BranchAggregate::new(branch.to_string()))
                .add_commit(record);
        }
    }

    let mut full: Vec<BranchAggregate> = map
        .into_values()
        .map(|mut agg| {
            agg.est_compressed_size_mb = format_size_mb(agg.est_compressed_size);
            agg
        })
        .collect();

    // Total order: estimated compressed size descending, then raw text+binary
    // descending. The sort is stable, so equal keys keep fold order.
    full.sort_by(|a, b| {
        b.est_compressed_size
            .cmp(&a.est_compressed_size)
            .then_with(|| b.raw_size().cmp(&a.raw_size()))
    });

    let light = full.iter().map(BranchSummary::from).collect();
    AggregateOutput { full, light }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn record(commit: &str, branches: Option<&[&str]>, text: u64, binary: u64, est: u64) -> CommitRecord {
        CommitRecord {
            commit: commit.to_string(),
            branches: branches.map(|b| b.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()),
            text_size: text,
            binary_size: binary,
            est_compressed_size: est,
        }
    }

    #[test]
    fn shared_commit_is_charged_in_full_to_every_owner() {
        let records = vec![record("c3", Some(&["a", "b"]), 400, 0, 80)];
        let out = aggregate(&records);

        assert_eq!(out.full.len(), 2);
        for agg in &out.full {
            assert_eq!(agg.text_size, 400);
            assert_eq!(agg.est_compressed_size, 80);
            assert_eq!(agg.commits.len(), 1);
            assert_eq!(agg.commits[0].commit, "c3");
        }
    }

    #[test]
    fn aggregate_sums_equal_contributing_records() {
        let records = vec![
            record("c1", Some(&["feature"]), 100, 0, 20),
            record("c2", Some(&["feature"]), 50, 1000, 810),
        ];
        let out = aggregate(&records);

        let agg = &out.full[0];
        assert_eq!(agg.branch, "feature");
        assert_eq!(agg.text_size, 150);
        assert_eq!(agg.binary_size, 1000);
        assert_eq!(agg.est_compressed_size, 830);
        let commit_sum: u64 = agg.commits.iter().map(|c| c.est_compressed_size).sum();
        assert_eq!(commit_sum, agg.est_compressed_size);
    }

    #[test]
    fn tag_only_commits_fold_under_the_tag_bucket() {
        let records = vec![record("c2", None, 80, 0, 16)];
        let out = aggregate(&records);

        assert_eq!(out.full.len(), 1);
        assert_eq!(out.full[0].branch, TAG_BUCKET);
        assert_eq!(out.full[0].text_size, 80);
    }

    #[test]
    fn empty_branch_set_is_dropped_not_fatal() {
        let records = vec![
            record("bad", Some(&[]), 999, 999, 999),
            record("ok", Some(&["keep"]), 1, 0, 1),
        ];
        let out = aggregate(&records);

        assert_eq!(out.full.len(), 1);
        assert_eq!(out.full[0].branch, "keep");
    }

    #[test]
    fn ranking_is_by_estimate_then_raw_size() {
        let records = vec![
            record("c1", Some(&["small"]), 100, 0, 10),
            record("c2", Some(&["big"]), 100, 0, 50),
            // same estimate as "small" but heavier raw footprint
            record("c3", Some(&["tie"]), 500, 0, 10),
        ];
        let out = aggregate(&records);

        let order: Vec<&str> = out.full.iter().map(|a| a.branch.as_str()).collect();
        assert_eq!(order, vec!["big", "tie", "small"]);
    }

    #[test]
    fn light_projection_mirrors_full_order() {
        let records = vec![
            record("c1", Some(&["a"]), 0, 0, 5),
            record("c2", Some(&["b"]), 0, 0, 50),
        ];
        let out = aggregate(&records);

        let full_order: Vec<&str> = out.full.iter().map(|a| a.branch.as_str()).collect();
        let light_order: Vec<&str> = out.light.iter().map(|s| s.branch.as_str()).collect();
        assert_eq!(full_order, light_order);
        assert_eq!(out.light[0].est_compressed_size_mb, out.full[0].est_compressed_size_mb);
    }

    #[test]
    fn size_formatting_boundaries() {
        assert_eq!(format_size_mb(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_size_mb(1024 * 1024 / 2), "0.5 MB");
        assert_eq!(format_size_mb(52_429), "0.05 MB"); // ~0.050 MB
        assert_eq!(format_size_mb(1_000), "0 MB");
        assert_eq!(format_size_mb(0), "0 MB");
    }
}
