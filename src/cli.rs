use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use crate::aggregate::aggregate;
use crate::attribute::attribute;
use crate::estimate::estimate_sizes;
use crate::git::GitRepo;
use crate::report;

#[derive(Parser)]
#[command(name = "branchweight")]
#[command(about = "Estimates per-branch disk weight of unmerged git history and ranks branches for pruning")]
#[command(version)]
pub struct Cli {
    #[arg(value_name = "REPO", help = "Path to the git repository (default: current directory)")]
    pub repo_path: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH", help = "Path to the git repository (overrides the positional)")]
    pub repo: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH", help = "Report directory (default: ./branchweight-report)")]
    pub out: Option<PathBuf>,

    #[arg(short, long, value_name = "NAME", help = "Trunk branch (default: auto-detect master, then main)")]
    pub branch: Option<String>,

    #[arg(short, long, value_name = "N", help = "Worker threads for size estimation")]
    pub jobs: Option<usize>,

    #[arg(long, help = "Print the full report to stdout instead of writing files")]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        if let Some(jobs) = self.jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
                .context("Failed to configure the worker pool")?;
        }

        let repo = GitRepo::open(self.repo.or(self.repo_path).as_ref())
            .context("Failed to open git repository")?;

        let trunk = match self.branch {
            Some(branch) => {
                repo.verify_branch(&branch)?;
                branch
            }
            None => repo.detect_trunk()?,
        };

        if !self.json {
            println!("Repository:   {}", style(repo.path().display()).cyan());
            println!("Trunk branch: {}", style(&trunk).cyan());
        }

        let records =
            attribute(&repo, &trunk).context("Failed to attribute commits to branches")?;
        let records = estimate_sizes(records, &repo);
        let output = aggregate(&records);
        let (full, light) = report::build_reports(output, repo.path(), &trunk);

        if self.json {
            report::print_json(&full)?;
            return Ok(());
        }

        let out_dir = match self.out {
            Some(dir) => dir,
            None => std::env::current_dir()?.join("branchweight-report"),
        };
        let out_dir =
            report::prepare_report_dir(&out_dir).context("Failed to prepare report directory")?;
        let (full_path, light_path) = report::write_reports(&full, &light, &out_dir)
            .context("Failed to write reports")?;

        report::print_table(&full);
        println!("\nFull stats  → {}", full_path.display());
        println!("Light stats → {}", light_path.display());
        Ok(())
    }
}
