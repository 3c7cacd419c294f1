//! Project lifecycle commands: `init`, `clear` and `clearcontent`.
//!
//! These only touch paths named by the configuration (the three configured
//! directories, `config.toml` and the cache file), always resolved inside the
//! project root. Nothing here exits the process; every command returns a
//! report and the CLI decides what to print.
//!
//! Destructive commands are gated by [`confirm`], an iterative prompt loop
//! driven by the [`Confirmation`] state machine.

use crate::cache;
use crate::config::{self, CONFIG_FILENAME, ConfigError};
use crate::context::BuildContext;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("refusing to remove {} because it is not inside the project root", .0.display())]
    OutsideRoot(PathBuf),
}

/// Content types created by `init`.
pub const DEFAULT_TYPES: &[&str] = &["post", "page"];

/// What `init` did.
#[derive(Debug, Default, PartialEq)]
pub struct InitReport {
    /// A stock `config.toml` was written (none existed).
    pub config_written: bool,
    /// Directories created, relative to the root.
    pub created: Vec<PathBuf>,
    /// Directories that already existed, relative to the root.
    pub existing: Vec<PathBuf>,
}

/// Paths removed by `clear` or `clearcontent`, relative to the root.
#[derive(Debug, Default, PartialEq)]
pub struct ClearReport {
    pub removed: Vec<PathBuf>,
    /// Directories recreated empty afterwards.
    pub recreated: Vec<PathBuf>,
}

/// Set up a project at `root`. Safe to run repeatedly.
///
/// Writes the stock `config.toml` when missing, then makes sure the configured
/// directories exist, plus one input subdirectory per default content type.
pub fn init(root: &Path) -> Result<InitReport, ProjectError> {
    let mut report = InitReport::default();
    fs::create_dir_all(root)?;

    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        fs::write(&config_path, config::stock_config_toml())?;
        info!(path = %config_path.display(), "wrote stock configuration");
        report.config_written = true;
    }

    let ctx = BuildContext::load(root)?;
    let dirs = &ctx.config.directories;
    let mut wanted: Vec<PathBuf> = vec![
        PathBuf::from(&dirs.input),
        PathBuf::from(&dirs.output),
        PathBuf::from(&dirs.themes),
    ];
    wanted.extend(DEFAULT_TYPES.iter().map(|t| Path::new(&dirs.input).join(t)));

    for rel in wanted {
        let path = root.join(&rel);
        if path.is_dir() {
            report.existing.push(rel);
        } else {
            fs::create_dir_all(&path)?;
            report.created.push(rel);
        }
    }
    Ok(report)
}

/// Remove every configured directory, `config.toml` and the cache file.
pub fn clear(ctx: &BuildContext) -> Result<ClearReport, ProjectError> {
    let dirs = &ctx.config.directories;
    let mut report = ClearReport::default();
    for rel in [&dirs.input, &dirs.output, &dirs.themes] {
        remove_inside_root(&ctx.root, Path::new(rel), &mut report)?;
    }
    remove_inside_root(&ctx.root, Path::new(CONFIG_FILENAME), &mut report)?;
    remove_inside_root(&ctx.root, Path::new(cache::CACHE_FILENAME), &mut report)?;
    Ok(report)
}

/// Wipe generated output: recreate the output directory empty and delete the
/// cache file. Sources, themes and configuration are kept.
pub fn clear_content(ctx: &BuildContext) -> Result<ClearReport, ProjectError> {
    let output = PathBuf::from(&ctx.config.directories.output);
    let mut report = ClearReport::default();
    remove_inside_root(&ctx.root, &output, &mut report)?;
    fs::create_dir_all(ctx.root.join(&output))?;
    report.recreated.push(output);
    remove_inside_root(&ctx.root, Path::new(cache::CACHE_FILENAME), &mut report)?;
    Ok(report)
}

fn remove_inside_root(root: &Path, rel: &Path, report: &mut ClearReport) -> Result<(), ProjectError> {
    if !is_strictly_inside(rel) {
        return Err(ProjectError::OutsideRoot(rel.to_path_buf()));
    }
    let path = root.join(rel);
    if path.is_dir() {
        fs::remove_dir_all(&path)?;
    } else if path.exists() {
        fs::remove_file(&path)?;
    } else {
        return Ok(());
    }
    info!(path = %path.display(), "removed");
    report.removed.push(rel.to_path_buf());
    Ok(())
}

/// A relative path that names something below the root (not the root itself).
fn is_strictly_inside(rel: &Path) -> bool {
    let mut depth = 0usize;
    for component in rel.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

// =============================================================================
// Confirmation
// =============================================================================

/// State of a yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Asking,
    Proceed,
    Abort,
}

impl Confirmation {
    /// Advance on one answer line; `None` means input ended.
    pub fn next(self, answer: Option<&str>) -> Self {
        if self != Self::Asking {
            return self;
        }
        let Some(answer) = answer else {
            return Self::Abort;
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Self::Proceed,
            "no" | "n" | "" => Self::Abort,
            _ => Self::Asking,
        }
    }
}

/// Ask `question` until the answer is yes or no. End of input counts as no.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    let mut state = Confirmation::Asking;
    while state == Confirmation::Asking {
        write!(output, "{question} (yes or no)> ")?;
        output.flush()?;
        let mut line = String::new();
        let read = input.read_line(&mut line)?;
        state = state.next((read > 0).then_some(line.as_str()));
    }
    Ok(state == Confirmation::Proceed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::io::Cursor;
    use tempfile::TempDir;

    // =========================================================================
    // init
    // =========================================================================

    #[test]
    fn init_creates_config_and_directories() {
        let tmp = TempDir::new().unwrap();

        let report = init(tmp.path()).unwrap();

        assert!(report.config_written);
        assert!(tmp.path().join(CONFIG_FILENAME).exists());
        for dir in ["source/post", "source/page", "out", "themes"] {
            assert!(tmp.path().join(dir).is_dir(), "{dir} missing");
        }
        assert!(report.created.contains(&PathBuf::from("source/post")));
    }

    #[test]
    fn init_is_repeatable_and_keeps_existing_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[directories]\ninput = \"docs\"\n",
        )
        .unwrap();

        let first = init(tmp.path()).unwrap();
        let second = init(tmp.path()).unwrap();

        assert!(!first.config_written);
        assert!(tmp.path().join("docs/post").is_dir());
        assert!(second.created.is_empty());
        assert_eq!(second.existing.len(), 5);
        assert_eq!(
            fs::read_to_string(tmp.path().join(CONFIG_FILENAME)).unwrap(),
            "[directories]\ninput = \"docs\"\n"
        );
    }

    #[test]
    fn init_with_broken_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[site\n").unwrap();
        let report = init(tmp.path()).unwrap();
        assert!(!report.config_written);
        assert!(tmp.path().join("source/post").is_dir());
        assert!(tmp.path().join("out").is_dir());
    }

    #[test]
    fn init_with_invalid_config_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[directories]\ninput = \"\"\n").unwrap();
        assert!(matches!(init(tmp.path()), Err(ProjectError::Config(_))));
    }

    // =========================================================================
    // clear / clearcontent
    // =========================================================================

    fn initialized() -> (TempDir, BuildContext) {
        let tmp = TempDir::new().unwrap();
        init(tmp.path()).unwrap();
        fs::write(tmp.path().join("source/post/a.docx"), "doc").unwrap();
        fs::write(tmp.path().join("out/index.html"), "html").unwrap();
        fs::write(tmp.path().join(cache::CACHE_FILENAME), "{}").unwrap();
        let ctx = BuildContext::load(tmp.path()).unwrap();
        (tmp, ctx)
    }

    #[test]
    fn clear_removes_everything_managed() {
        let (tmp, ctx) = initialized();
        fs::write(tmp.path().join("notes.txt"), "mine").unwrap();

        let report = clear(&ctx).unwrap();

        for gone in ["source", "out", "themes", CONFIG_FILENAME, cache::CACHE_FILENAME] {
            assert!(!tmp.path().join(gone).exists(), "{gone} still exists");
        }
        assert!(tmp.path().join("notes.txt").exists());
        assert_eq!(report.removed.len(), 5);
    }

    #[test]
    fn clear_content_keeps_sources_and_empties_output() {
        let (tmp, ctx) = initialized();

        let report = clear_content(&ctx).unwrap();

        assert!(tmp.path().join("source/post/a.docx").exists());
        assert!(tmp.path().join("out").is_dir());
        assert!(!tmp.path().join("out/index.html").exists());
        assert!(!tmp.path().join(cache::CACHE_FILENAME).exists());
        assert_eq!(report.recreated, vec![PathBuf::from("out")]);
    }

    #[test]
    fn clear_content_without_cache_file_succeeds() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new(tmp.path(), SiteConfig::default());
        let report = clear_content(&ctx).unwrap();
        assert!(report.removed.is_empty());
        assert!(tmp.path().join("out").is_dir());
    }

    #[test]
    fn refuses_paths_outside_root() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.directories.output = "..".into();
        let ctx = BuildContext::new(tmp.path(), config);
        assert!(matches!(clear_content(&ctx), Err(ProjectError::OutsideRoot(_))));
    }

    #[test]
    fn strictly_inside_checks() {
        assert!(is_strictly_inside(Path::new("out")));
        assert!(is_strictly_inside(Path::new("./build/site")));
        assert!(is_strictly_inside(Path::new("a/../b")));
        assert!(!is_strictly_inside(Path::new(".")));
        assert!(!is_strictly_inside(Path::new("a/..")));
        assert!(!is_strictly_inside(Path::new("../x")));
        assert!(!is_strictly_inside(Path::new("/tmp")));
    }

    // =========================================================================
    // Confirmation
    // =========================================================================

    #[test]
    fn confirmation_transitions() {
        use Confirmation::*;
        assert_eq!(Asking.next(Some("yes\n")), Proceed);
        assert_eq!(Asking.next(Some("Y")), Proceed);
        assert_eq!(Asking.next(Some("no")), Abort);
        assert_eq!(Asking.next(Some("\n")), Abort);
        assert_eq!(Asking.next(Some("maybe")), Asking);
        assert_eq!(Asking.next(None), Abort);
        assert_eq!(Proceed.next(Some("no")), Proceed);
    }

    #[test]
    fn confirm_reprompts_until_clear_answer() {
        let mut input = Cursor::new("maybe\nyes\n");
        let mut output = Vec::new();

        assert!(confirm("Wipe?", &mut input, &mut output).unwrap());

        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Wipe? (yes or no)> ").count(), 2);
    }

    #[test]
    fn confirm_eof_declines() {
        let mut input = Cursor::new("");
        assert!(!confirm("Wipe?", &mut input, &mut Vec::new()).unwrap());
    }
}
