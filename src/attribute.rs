use crate::error::Result;
use crate::git::GitRepo;
use crate::model::CommitRecord;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashSet};

/// Commit hash → owning branch set. `None` marks a tag-only commit. Insertion
/// order (for-each-ref order, then rev-list order within each ref) is kept so
/// downstream stages see a deterministic sequence.
type AttributionMap = IndexMap<String, Option<BTreeSet<String>>>;

/// Stage 1: map every non-merge commit that is ahead of `trunk` to the set of
/// branches that reach it, then register commits pointed at only by tags
/// under the tag bucket. Fails fast when `trunk` does not resolve.
pub fn attribute(repo: &GitRepo, trunk: &str) -> Result<Vec<CommitRecord>> {
    repo.verify_branch(trunk)?;

    let refs = repo.references()?;
    let mut map = AttributionMap::new();

    let pb = ProgressBar::new(refs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Checking references");

    for reference in &refs {
        pb.set_message(format!("Checking {}", reference.short));
        let commits = repo.commits_ahead_of(&reference.name, trunk)?;
        fold_ref_commits(&mut map, &reference.short, commits);
        pb.inc(1);
    }
    pb.finish_with_message("References checked");

    // Merge hashes are an exclusion filter for tag attribution only; branch
    // attribution already ran with --no-merges.
    let merges = repo.merge_commits()?;
    fold_tag_commits(&mut map, &merges, repo.tag_commits()?);

    Ok(map
        .into_iter()
        .map(|(commit, branches)| CommitRecord::new(commit, branches))
        .collect())
}

fn fold_ref_commits(map: &mut AttributionMap, short: &str, commits: Vec<String>) {
    for hash in commits {
        if let Some(set) = map.entry(hash).or_insert_with(|| Some(BTreeSet::new())) {
            set.insert(short.to_string());
        }
    }
}

fn fold_tag_commits(map: &mut AttributionMap, merges: &HashSet<String>, tags: Vec<String>) {
    for hash in tags {
        if map.contains_key(&hash) || merges.contains(&hash) {
            continue;
        }
        map.insert(hash, None);
    }
}
