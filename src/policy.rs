//! Removal policy: which items are relevant and whether the user agrees.
//!
//! `RemovalPolicy` is the seam the planner consults for every candidate.
//! `Policy` is the configured implementation (glob name filter plus a
//! confirmation mode); `FnPolicy` wraps two closures for tests and embedders.

use glob::Pattern;
use std::path::Path;
use tracing::debug;

use crate::config::{Config, ConfirmMode};
use crate::errors::{Result, SmartRmError};
use crate::planner::EntryKind;
use crate::platform::is_write_protected;

pub trait RemovalPolicy {
    /// Static, name-based filter. Must be cheap and side-effect free.
    fn is_relevant(&self, path: &Path) -> bool;

    /// Dynamic decision, possibly interactive. Called once per candidate.
    fn confirm(&self, path: &Path, kind: EntryKind) -> bool;

    /// Both checks, short-circuiting so irrelevant items never prompt.
    fn allows(&self, path: &Path, kind: EntryKind) -> bool {
        self.is_relevant(path) && self.confirm(path, kind)
    }
}

/// Yes/no question source.
pub trait Prompter {
    fn ask(&self, question: &str) -> bool;
}

/// Asks on the terminal through dialoguer. Any I/O failure counts as "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Glob patterns matched against an item's base name.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<Pattern>,
}

impl NameFilter {
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| {
                    SmartRmError::Config(format!("invalid pattern '{}': {e}", p.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// An empty filter matches everything.
    pub fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&name))
    }
}

pub struct Policy {
    filter: NameFilter,
    mode: ConfirmMode,
    prompter: Box<dyn Prompter>,
}

impl Policy {
    pub fn new(filter: NameFilter, mode: ConfirmMode, prompter: Box<dyn Prompter>) -> Self {
        Self {
            filter,
            mode,
            prompter,
        }
    }

    /// Build the configured policy, prompting on the terminal.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::from_config_with_prompter(cfg, Box::new(TerminalPrompter))
    }

    pub fn from_config_with_prompter(cfg: &Config, prompter: Box<dyn Prompter>) -> Result<Self> {
        Ok(Self::new(
            NameFilter::from_patterns(&cfg.patterns)?,
            cfg.confirm,
            prompter,
        ))
    }
}

impl RemovalPolicy for Policy {
    fn is_relevant(&self, path: &Path) -> bool {
        self.filter.matches(path)
    }

    fn confirm(&self, path: &Path, kind: EntryKind) -> bool {
        let answer = match self.mode {
            ConfirmMode::Never => true,
            ConfirmMode::Always => self
                .prompter
                .ask(&format!("remove {kind} '{}'?", path.display())),
            ConfirmMode::WriteProtected => {
                if is_write_protected(path) {
                    self.prompter
                        .ask(&format!("remove write-protected {kind} '{}'?", path.display()))
                } else {
                    true
                }
            }
        };
        if !answer {
            debug!(path = %path.display(), "removal declined");
        }
        answer
    }
}

/// Policy made of two closures.
pub struct FnPolicy<R, C> {
    relevant: R,
    confirm: C,
}

impl<R, C> FnPolicy<R, C>
where
    R: Fn(&Path) -> bool,
    C: Fn(&Path, EntryKind) -> bool,
{
    pub fn new(relevant: R, confirm: C) -> Self {
        Self { relevant, confirm }
    }
}

impl<R, C> RemovalPolicy for FnPolicy<R, C>
where
    R: Fn(&Path) -> bool,
    C: Fn(&Path, EntryKind) -> bool,
{
    fn is_relevant(&self, path: &Path) -> bool {
        (self.relevant)(path)
    }

    fn confirm(&self, path: &Path, kind: EntryKind) -> bool {
        (self.confirm)(path, kind)
    }
}

/// Policy that accepts everything.
pub fn allow_all() -> impl RemovalPolicy {
    FnPolicy::new(|_: &Path| true, |_: &Path, _: EntryKind| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scripted {
        answer: bool,
        asked: Rc<RefCell<Vec<String>>>,
    }

    impl Prompter for Scripted {
        fn ask(&self, question: &str) -> bool {
            self.asked.borrow_mut().push(question.to_string());
            self.answer
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = NameFilter::default();
        assert!(f.matches(Path::new("/x/anything.bin")));
    }

    #[test]
    fn filter_matches_base_name_only() {
        let f = NameFilter::from_patterns(&["*.log"]).unwrap();
        assert!(f.matches(Path::new("/var/logs/app.log")));
        assert!(!f.matches(Path::new("/var/app.log.d/readme")));
    }

    #[test]
    fn bad_glob_is_config_error() {
        let err = NameFilter::from_patterns(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, SmartRmError::Config(_)));
    }

    #[test]
    fn always_mode_asks_and_respects_answer() {
        let asked = Rc::new(RefCell::new(Vec::new()));
        let policy = Policy::new(
            NameFilter::default(),
            ConfirmMode::Always,
            Box::new(Scripted {
                answer: false,
                asked: Rc::clone(&asked),
            }),
        );
        assert!(!policy.confirm(Path::new("/t/a.txt"), EntryKind::File));
        assert_eq!(asked.borrow().len(), 1);
        assert!(asked.borrow()[0].contains("regular file '/t/a.txt'"));
    }

    #[test]
    fn never_mode_does_not_ask() {
        let asked = Rc::new(RefCell::new(Vec::new()));
        let policy = Policy::new(
            NameFilter::default(),
            ConfirmMode::Never,
            Box::new(Scripted {
                answer: false,
                asked: Rc::clone(&asked),
            }),
        );
        assert!(policy.confirm(Path::new("/t/a.txt"), EntryKind::File));
        assert!(asked.borrow().is_empty());
    }

    #[test]
    fn irrelevant_items_never_prompt() {
        let asked = Rc::new(RefCell::new(Vec::new()));
        let policy = Policy::new(
            NameFilter::from_patterns(&["*.tmp"]).unwrap(),
            ConfirmMode::Always,
            Box::new(Scripted {
                answer: true,
                asked: Rc::clone(&asked),
            }),
        );
        assert!(!policy.allows(Path::new("/t/keep.txt"), EntryKind::File));
        assert!(policy.allows(Path::new("/t/junk.tmp"), EntryKind::File));
        assert_eq!(asked.borrow().len(), 1);
    }
}
