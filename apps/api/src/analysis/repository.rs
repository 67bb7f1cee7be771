//! Repository-based review: check out a pull request, walk its tree and
//! concatenate source text under an aggregate byte cap.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

use async_trait::async_trait;
use ignore::WalkBuilder;
use regex::Regex;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Directories never included in a snapshot: build output, dependencies, VCS.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    "coverage",
    ".next",
    ".nuxt",
    ".venv",
    "__pycache__",
];

/// Generated files that add bulk without signal.
const EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
];

/// Single files larger than this are skipped outright.
const MAX_FILE_BYTES: u64 = 64 * 1024;

fn pull_request_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://github\.com/([\w-]+)/([\w-]+)/pull/(\d+)$")
            .expect("pull request pattern is valid")
    })
}

/// A GitHub pull request identified by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Parses `https://github.com/<owner>/<repo>/pull/<n>`; anything else is `None`.
    pub fn parse(url: &str) -> Option<Self> {
        let caps = pull_request_pattern().captures(url)?;
        Some(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number: caps[3].parse().ok()?,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.owner, self.repo, self.number
        )
    }

    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

#[derive(Debug, Error)]
pub enum RepositoryFetchError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {step} failed: {stderr}")]
    Git { step: &'static str, stderr: String },
}

/// A checked-out working tree, removed from disk when dropped.
pub struct CheckedOutRepository {
    dir: TempDir,
}

impl CheckedOutRepository {
    pub fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch(&self, pr: &PullRequestRef) -> Result<CheckedOutRepository, RepositoryFetchError>;
}

/// Fetches pull requests with the `git` command line: shallow clone, then the
/// PR head ref, then checkout.
pub struct GitCliFetcher {
    git: PathBuf,
}

impl Default for GitCliFetcher {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
        }
    }
}

impl GitCliFetcher {
    async fn run(&self, step: &'static str, args: &[&str]) -> Result<(), RepositoryFetchError> {
        let output = Command::new(&self.git)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(RepositoryFetchError::Git {
                step,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryFetcher for GitCliFetcher {
    async fn fetch(&self, pr: &PullRequestRef) -> Result<CheckedOutRepository, RepositoryFetchError> {
        let dir = tempfile::Builder::new().prefix("hireflow-pr-").tempdir()?;
        let path = dir.path().to_string_lossy().into_owned();
        let head_ref = format!("pull/{}/head", pr.number);

        info!(pull_request = %pr, "Cloning pull request repository");
        self.run(
            "clone",
            &["clone", "--quiet", "--depth", "1", "--no-tags", &pr.clone_url(), &path],
        )
        .await?;
        self.run(
            "fetch",
            &["-C", &path, "fetch", "--quiet", "--depth", "1", "origin", &head_ref],
        )
        .await?;
        self.run("checkout", &["-C", &path, "checkout", "--quiet", "FETCH_HEAD"])
            .await?;

        Ok(CheckedOutRepository::new(dir))
    }
}

/// Concatenated source text of a working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub text: String,
    pub files_included: usize,
    pub files_skipped: usize,
    /// The byte cap was reached before the walk finished.
    pub truncated: bool,
}

fn largest_char_boundary(text: &str, limit: usize) -> usize {
    if limit >= text.len() {
        return text.len();
    }
    (0..=limit).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}

/// Walks `root` in path order and concatenates UTF-8 source files, each under
/// a `--- <relative path> ---` header, never exceeding `max_bytes` in total.
/// Blocking; run it on a blocking thread.
pub fn collect_source_text(root: &Path, max_bytes: usize) -> RepositorySnapshot {
    let mut snapshot = RepositorySnapshot {
        text: String::new(),
        files_included: 0,
        files_skipped: 0,
        truncated: false,
    };

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .parents(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_some_and(|t| t.is_dir()) && EXCLUDED_DIRS.contains(&name.as_ref()))
        })
        .build();

    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        let too_large = entry.metadata().map(|m| m.len() > MAX_FILE_BYTES).unwrap_or(true);
        if EXCLUDED_FILES.contains(&name.as_ref()) || too_large {
            snapshot.files_skipped += 1;
            continue;
        }

        let content = match std::fs::read(path).map(String::from_utf8) {
            Ok(Ok(text)) if !text.contains('\0') => text,
            _ => {
                snapshot.files_skipped += 1;
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        let section = format!("\n--- {} ---\n{}\n", relative.display(), content);
        let remaining = max_bytes.saturating_sub(snapshot.text.len());
        if section.len() > remaining {
            let cut = largest_char_boundary(&section, remaining);
            if cut > 0 {
                snapshot.text.push_str(&section[..cut]);
                snapshot.files_included += 1;
            }
            snapshot.truncated = true;
            break;
        }
        snapshot.text.push_str(&section);
        snapshot.files_included += 1;
    }

    debug!(
        files = snapshot.files_included,
        skipped = snapshot.files_skipped,
        bytes = snapshot.text.len(),
        truncated = snapshot.truncated,
        "Collected repository snapshot"
    );
    snapshot
}
