use crate::aggregate::AggregateOutput;
use crate::error::{Result, WeightError};
use crate::model::{WeightReport, WeightReportLight, SCHEMA_VERSION};
use chrono::Utc;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

pub const FULL_REPORT_FILE: &str = "sorted_branches_with_sizes.json";
pub const LIGHT_REPORT_FILE: &str = "sorted_branches_with_sizes_light.json";

pub fn build_reports(
    output: AggregateOutput,
    repository_path: &Path,
    trunk_branch: &str,
) -> (WeightReport, WeightReportLight) {
    let generated_at = Utc::now();
    let repository_path = repository_path.to_string_lossy().to_string();

    let full = WeightReport {
        version: SCHEMA_VERSION,
        generated_at,
        repository_path: repository_path.clone(),
        trunk_branch: trunk_branch.to_string(),
        branches: output.full,
    };
    let light = WeightReportLight {
        version: SCHEMA_VERSION,
        generated_at,
        repository_path,
        trunk_branch: trunk_branch.to_string(),
        branches: output.light,
    };
    (full, light)
}

/// Create the report directory if needed; it must end up as a directory.
pub fn prepare_report_dir(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        if !path.is_dir() {
            return Err(WeightError::NotADirectory(path.to_path_buf()));
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Write both pretty-printed reports and return the written paths.
pub fn write_reports(
    full: &WeightReport,
    light: &WeightReportLight,
    report_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let full_path = report_dir.join(FULL_REPORT_FILE);
    let light_path = report_dir.join(LIGHT_REPORT_FILE);
    fs::write(&full_path, serde_json::to_string_pretty(full)?)?;
    fs::write(&light_path, serde_json::to_string_pretty(light)?)?;
    Ok((full_path, light_path))
}

pub fn print_json(full: &WeightReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(full)?);
    Ok(())
}

/// Styled summary of the heaviest branches, heaviest first.
pub fn print_table(full: &WeightReport) {
    println!(
        "{:<40} {:>10} {:>12} {:>12} {:>8}",
        style("Branch").bold(),
        style("Est. size").bold(),
        style("Text (B)").bold(),
        style("Binary (B)").bold(),
        style("Commits").bold()
    );
    println!("{}", "─".repeat(86));
    for agg in full.branches.iter().take(20) {
        println!(
            "{:<40} {:>10} {:>12} {:>12} {:>8}",
            agg.branch,
            agg.est_compressed_size_mb,
            agg.text_size,
            agg.binary_size,
            agg.commits.len()
        );
    }
    if full.branches.len() > 20 {
        println!("\n... and {} more branches", full.branches.len() - 20);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::CommitRecord;
    use std::collections::BTreeSet;

    #[test]
    fn reports_share_metadata_and_order() {
        let records = vec![CommitRecord {
            commit: "c1".to_string(),
            branches: Some(["feature".to_string()].into_iter().collect::<BTreeSet<_>>()),
            text_size: 100,
            binary_size: 0,
            est_compressed_size: 20,
        }];
        let (full, light) = build_reports(aggregate(&records), Path::new("/repo"), "main");

        assert_eq!(full.trunk_branch, "main");
        assert_eq!(full.generated_at, light.generated_at);
        assert_eq!(full.branches.len(), light.branches.len());
        assert_eq!(full.branches[0].branch, light.branches[0].branch);
    }

    #[test]
    fn light_report_omits_commit_detail_and_raw_estimate() {
        let records = vec![CommitRecord {
            commit: "c1".to_string(),
            branches: None,
            text_size: 0,
            binary_size: 1_000_000,
            est_compressed_size: 800_000,
        }];
        let (_, light) = build_reports(aggregate(&records), Path::new("/repo"), "main");

        let value = serde_json::to_value(&light).unwrap();
        let entry = &value["branches"][0];
        assert!(entry.get("commits").is_none());
        assert!(entry.get("est_compressed_size").is_none());
        assert_eq!(entry["binary_size"], 1_000_000);
    }
}
