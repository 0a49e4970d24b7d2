use crate::git::GitRepo;
use crate::model::CommitRecord;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;

/// Heuristic bytes per changed line of text.
pub const AVG_LINE_SIZE: u64 = 40;

/// Assumed compression ratio for textual changes.
pub const TEXT_COEFF: f64 = 0.2;

/// Conservative ratio for binary blobs with an unknown extension.
pub const DEFAULT_BINARY_COEFF: f64 = 0.8;

/// Compression ratio assumed for a binary blob, keyed by lower-cased file
/// extension. Already-compressed archives keep their full size, image and
/// video containers are near-incompressible, and source-like files that the
/// diff reports as binary (odd encodings, embedded NULs) still compress like
/// text. Everything else falls back to [`DEFAULT_BINARY_COEFF`].
pub fn compression_coefficient(extension: &str) -> f64 {
    match extension {
        // compressed archives
        "zip" | "gz" | "tgz" | "bz2" | "xz" | "zst" | "7z" | "rar" | "jar" | "war" => 1.0,
        // images, audio, video
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" | "ico" | "mp3" | "aac" | "ogg"
        | "flac" | "mp4" | "mov" | "avi" | "mkv" | "webm" | "woff" | "woff2" | "pdf" => 0.95,
        // source-like text misreported as binary
        "rs" | "js" | "ts" | "py" | "java" | "c" | "h" | "cpp" | "hpp" | "go" | "rb" | "cs"
        | "php" | "sh" | "json" | "xml" | "html" | "css" | "md" | "txt" | "svg" | "csv"
        | "tsv" | "yml" | "yaml" | "toml" | "ini" | "sql" => TEXT_COEFF,
        _ => DEFAULT_BINARY_COEFF,
    }
}

/// One line of `git show --numstat` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumstatEntry {
    /// Text-like path with numeric line counts.
    Text { added: u64, deleted: u64 },
    /// Binary-like path (`-	-` markers, no line counts).
    Binary { path: String },
}

/// Parse numstat output into entries. Renamed paths (a `=>` arrow in the path
/// column) are skipped entirely so a rename is never double-counted as churn,
/// as are malformed lines.
pub fn parse_numstat(output: &str) -> Vec<NumstatEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.splitn(3, '\t');
            let added = cols.next()?.trim();
            let deleted = cols.next()?.trim();
            let path = cols.next()?.trim();
            if path.is_empty() || path.contains("=>") {
                return None;
            }
            match (added.parse::<u64>(), deleted.parse::<u64>()) {
                (Ok(added), Ok(deleted)) => Some(NumstatEntry::Text { added, deleted }),
                _ if added == "-" && deleted == "-" => Some(NumstatEntry::Binary {
                    path: path.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn estimated_compressed(text_size: u64, weighted_binary: f64) -> u64 {
    (text_size as f64 * TEXT_COEFF + weighted_binary).floor() as u64
}

/// Fill in the three size figures for one commit. Best-effort: a failed git
/// invocation for the commit or any of its paths contributes zero.
fn estimate_commit(repo: &GitRepo, mut record: CommitRecord) -> CommitRecord {
    let mut text_size = 0u64;
    let mut binary_size = 0u64;
    let mut weighted_binary = 0f64;

    if let Some(output) = repo.numstat(&record.commit) {
        for entry in parse_numstat(&output) {
            match entry {
                NumstatEntry::Text { added, deleted } => {
                    text_size += (added + deleted) * AVG_LINE_SIZE;
                }
                NumstatEntry::Binary { path } => {
                    // Only the commit that introduces a blob is charged for
                    // it; later modifications would attribute the same
                    // blob's weight to every touching commit.
                    if repo.path_in_parent(&record.commit, &path) {
                        continue;
                    }
                    if let Some(size) = repo.blob_size(&record.commit, &path) {
                        binary_size += size;
                        weighted_binary +=
                            size as f64 * compression_coefficient(&extension_of(&path));
                    }
                }
            }
        }
    }

    record.text_size = text_size;
    record.binary_size = binary_size;
    record.est_compressed_size = estimated_compressed(text_size, weighted_binary);
    record
}

/// Stage 2: estimate sizes for every attributed commit on the rayon worker
/// pool. `collect` preserves input order, so the result is deterministic
/// regardless of which worker finishes first; the final sort uses the same
/// total order as branch ranking (estimated compressed size descending,
/// raw text+binary descending).
pub fn estimate_sizes(records: Vec<CommitRecord>, repo: &GitRepo) -> Vec<CommitRecord> {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} Estimating commit sizes")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut sized: Vec<CommitRecord> = records
        .into_par_iter()
        .progress_with(pb)
        .map(|record| estimate_commit(repo, record))
        .collect();

    sized.sort_by(|a, b| {
        b.est_compressed_size
            .cmp(&a.est_compressed_size)
            .then_with(|| b.raw_size().cmp(&a.raw_size()))
    });
    sized
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coefficient_table_has_documented_buckets() {
        assert_eq!(compression_coefficient("zip"), 1.0);
        assert_eq!(compression_coefficient("gz"), 1.0);
        assert_eq!(compression_coefficient("png"), 0.95);
        assert_eq!(compression_coefficient("mp4"), 0.95);
        assert_eq!(compression_coefficient("rs"), TEXT_COEFF);
        assert_eq!(compression_coefficient("svg"), TEXT_COEFF);
        assert_eq!(compression_coefficient("bin"), DEFAULT_BINARY_COEFF);
        assert_eq!(compression_coefficient(""), DEFAULT_BINARY_COEFF);
    }

    #[test]
    fn parse_numstat_classifies_text_and_binary() {
        let out = "10\t2\tsrc/lib.rs\n-\t-\tassets/logo.png\n";
        assert_eq!(
            parse_numstat(out),
            vec![
                NumstatEntry::Text { added: 10, deleted: 2 },
                NumstatEntry::Binary { path: "assets/logo.png".to_string() },
            ]
        );
    }

    #[test]
    fn parse_numstat_skips_renames_and_garbage() {
        let out = "0\t0\tsrc/{old.rs => new.rs}\n-\t-\told.png => new.png\nnot a numstat line\n\n";
        assert_eq!(parse_numstat(out), vec![]);
    }

    #[test]
    fn extension_is_lower_cased() {
        assert_eq!(extension_of("assets/Logo.PNG"), "png");
        assert_eq!(extension_of("Makefile"), "");
    }

    #[test]
    fn estimate_floors_the_weighted_sum() {
        // 3 lines * 40 bytes * 0.2 = 24.0; 7 weighted binary bytes -> 31
        assert_eq!(estimated_compressed(120, 7.5), 31);
        assert_eq!(estimated_compressed(0, 0.0), 0);
        // 1 MB blob at the default coefficient
        assert_eq!(
            estimated_compressed(0, 1_000_000.0 * DEFAULT_BINARY_COEFF),
            800_000
        );
    }

    #[test]
    fn sort_ranks_by_estimate_then_raw_size() {
        let mk = |commit: &str, text: u64, binary: u64, est: u64| CommitRecord {
            commit: commit.to_string(),
            branches: None,
            text_size: text,
            binary_size: binary,
            est_compressed_size: est,
        };
        let mut records = vec![mk("a", 10, 0, 5), mk("b", 50, 0, 5), mk("c", 0, 0, 9)];
        records.sort_by(|a, b| {
            b.est_compressed_size
                .cmp(&a.est_compressed_size)
                .then_with(|| b.raw_size().cmp(&a.raw_size()))
        });
        let order: Vec<&str> = records.iter().map(|r| r.commit.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }
}
