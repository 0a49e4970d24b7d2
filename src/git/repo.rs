use crate::error::{Result, WeightError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A named pointer into history: a local branch or a remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Fully-qualified name, e.g. `refs/remotes/origin/feature-x`.
    pub name: String,
    /// Display name with the `refs/heads/` / `refs/remotes/` namespace stripped.
    pub short: String,
}

/// Handle to one git repository. Every query is a blocking `git` subprocess;
/// fatal queries (repository and trunk resolution, ref and commit-set
/// enumeration) return `Result`, per-commit object queries are best-effort
/// and report failure as `None` / `false`.
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository at `path`, or the current directory if `None`.
    /// Fails fast when the path is missing, not a directory, or not inside a
    /// git working tree.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        if !path.exists() {
            return Err(WeightError::PathMissing(path));
        }
        if !path.is_dir() {
            return Err(WeightError::NotADirectory(path));
        }

        let repo = Self { path };
        let inside = repo
            .try_run(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false);
        if !inside {
            return Err(WeightError::NotARepository(repo.path));
        }

        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that `branch` resolves to a real reference.
    pub fn verify_branch(&self, branch: &str) -> Result<()> {
        if self.try_status(&["rev-parse", "--verify", branch]) {
            Ok(())
        } else {
            Err(WeightError::BranchNotFound(branch.to_string()))
        }
    }

    /// Auto-detect the trunk branch: `master` first, then `main`.
    pub fn detect_trunk(&self) -> Result<String> {
        for candidate in ["master", "main"] {
            if self.try_status(&["rev-parse", "--verify", candidate]) {
                return Ok(candidate.to_string());
            }
        }
        Err(WeightError::NoTrunkBranch)
    }

    /// Enumerate all local and remote-tracking references, skipping symbolic
    /// remote HEAD pointers.
    pub fn references(&self) -> Result<Vec<Reference>> {
        let out = self.run(&[
            "for-each-ref",
            "--format=%(refname)",
            "refs/heads",
            "refs/remotes",
        ])?;

        Ok(out
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.ends_with("/HEAD"))
            .map(|name| Reference {
                name: name.to_string(),
                short: short_name(name),
            })
            .collect())
    }

    /// Non-merge commits reachable from `refname` but not from `trunk`,
    /// newest first.
    pub fn commits_ahead_of(&self, refname: &str, trunk: &str) -> Result<Vec<String>> {
        let out = self.run(&["rev-list", refname, "--not", trunk, "--no-merges"])?;
        Ok(hash_lines(&out))
    }

    /// Every merge commit (two or more parents) reachable from any ref.
    pub fn merge_commits(&self) -> Result<HashSet<String>> {
        let out = self.run(&["rev-list", "--min-parents=2", "--all"])?;
        Ok(hash_lines(&out).into_iter().collect())
    }

    /// Commits pointed to directly by tags (no history walk).
    pub fn tag_commits(&self) -> Result<Vec<String>> {
        let out = self.run(&["rev-list", "--tags", "--no-walk"])?;
        Ok(hash_lines(&out))
    }

    /// Numstat summary of `commit` against its parent (empty tree for root
    /// commits), with rename detection. `None` when the invocation fails;
    /// callers treat that as zero contribution.
    pub fn numstat(&self, commit: &str) -> Option<String> {
        self.try_run(&[
            "show",
            "--no-ext-diff",
            "--pretty=format:",
            "--numstat",
            "-M",
            commit,
        ])
    }

    /// Did `path` already exist in the first parent of `commit`? Root commits
    /// have no parent, so every path reports `false` (point of introduction).
    pub fn path_in_parent(&self, commit: &str, path: &str) -> bool {
        self.try_status(&["cat-file", "-e", &format!("{commit}^:{path}")])
    }

    /// Exact tracked size of the blob at `commit:path`, best-effort.
    pub fn blob_size(&self, commit: &str, path: &str) -> Option<u64> {
        self.try_run(&["cat-file", "-s", &format!("{commit}:{path}")])
            .and_then(|out| out.trim().parse().ok())
    }

    /// Run git and fail with a configuration-grade error on any problem.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| WeightError::GitInvocation {
                command: args.join(" "),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(WeightError::GitInvocation {
                command: args.join(" "),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run git, returning stdout only on success.
    fn try_run(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if output.status.success() {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            None
        }
    }

    /// Run git for its exit status alone.
    fn try_status(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

fn short_name(refname: &str) -> String {
    refname
        .strip_prefix("refs/heads/")
        .or_else(|| refname.strip_prefix("refs/remotes/"))
        .unwrap_or(refname)
        .to_string()
}

fn hash_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
