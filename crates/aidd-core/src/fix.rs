//! Fix sessions
//!
//! Resolves pending upstream fields one entry at a time:
//!
//! ```text
//! Scanning → Presenting → Applying  → Presenting … → Done
//!                       ↘ Skipping ↗
//! ```
//!
//! The registry comes from the full corpus, the queue from the target subset.
//! Both are snapshots: patches applied during the session do not refresh
//! them. Operator I/O sits behind [`OperatorInput`]; turning an answer into a
//! [`Decision`] is the pure function [`decide`].

use crate::config::TraceConfig;
use crate::error::{ExitStatus, TraceError, TraceResult};
use aidd_artifact::Identifier;
use aidd_corpus::CorpusLayer;
use aidd_trace::{apply_patch, find_placeholders, IdentifierRegistry, Patch, PatchOutcome, PlaceholderEntry};
use std::fmt;
use std::path::PathBuf;

/// How replacements are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixMode {
    /// The same identifier for every entry
    Automatic(Identifier),
    /// Ask the operator per entry
    Interactive,
}

impl FixMode {
    /// Automatic mode with a replacement validated up front
    ///
    /// # Errors
    /// [`TraceError::InvalidReplacement`] if `raw` is not an identifier.
    pub fn automatic(raw: &str) -> TraceResult<Self> {
        Ok(Self::Automatic(Identifier::parse(raw)?))
    }
}

/// Whether applied patches reach the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write patched documents back
    #[default]
    Persist,
    /// Decide and locate everything, write nothing
    DryRun,
}

impl WriteMode {
    /// `DryRun` when `dry_run` is set
    #[inline]
    #[must_use]
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Persist
        }
    }

    /// True if patches are written
    #[inline]
    #[must_use]
    pub fn persists(self) -> bool {
        matches!(self, Self::Persist)
    }
}

/// Where the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Building the registry and the queue
    Scanning,
    /// Showing entry `n` (zero-based)
    Presenting(usize),
    /// Patching entry `n`
    Applying(usize),
    /// Leaving entry `n` untouched
    Skipping(usize),
    /// Queue exhausted or aborted
    Done,
}

/// Why an entry was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty answer
    NoAnswer,
    /// Numeric answer outside the candidate list
    IndexOutOfRange(String),
    /// Answer is neither an index nor an identifier
    NotAnIdentifier(String),
    /// The field could not be located or the file not rewritten
    PatchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAnswer => f.write_str("skipped"),
            Self::IndexOutOfRange(answer) => write!(f, "index out of range: {answer}"),
            Self::NotAnIdentifier(answer) => write!(f, "not a valid AIDD identifier: {answer}"),
            Self::PatchFailed(reason) => write!(f, "patch failed: {reason}"),
        }
    }
}

/// What to do with one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Patch the entry with this identifier
    Apply(Identifier),
    /// Leave the entry
    Skip(SkipReason),
    /// Stop the session
    Abort,
}

/// Turn an operator answer into a decision
///
/// `None` means input ended and aborts. Answers are trimmed; the abort token
/// is compared case-insensitively; indexes are 1-based into `candidates`.
#[must_use]
pub fn decide(answer: Option<&str>, candidates: &[Identifier], abort_token: &str) -> Decision {
    let Some(answer) = answer.map(str::trim) else {
        return Decision::Abort;
    };
    if answer.eq_ignore_ascii_case(abort_token) {
        return Decision::Abort;
    }
    if answer.is_empty() {
        return Decision::Skip(SkipReason::NoAnswer);
    }
    if answer.bytes().all(|b| b.is_ascii_digit()) {
        return match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => Decision::Apply(candidates[n - 1].clone()),
            _ => Decision::Skip(SkipReason::IndexOutOfRange(answer.to_string())),
        };
    }
    match Identifier::parse(answer) {
        Ok(id) => Decision::Apply(id),
        Err(_) => Decision::Skip(SkipReason::NotAnIdentifier(answer.to_string())),
    }
}

/// Candidate list for interactive answers
///
/// Identifiers starting with `preferred_prefix` come first, sorted; the rest
/// follow, sorted, only when `show_all` is set.
#[must_use]
pub fn rank_candidates(registry: &IdentifierRegistry, preferred_prefix: &str, show_all: bool) -> Vec<Identifier> {
    let (mut preferred, mut others): (Vec<Identifier>, Vec<Identifier>) = registry
        .identifiers()
        .cloned()
        .partition(|id| id.as_str().starts_with(preferred_prefix));
    preferred.sort();
    if show_all {
        others.sort();
        preferred.append(&mut others);
    }
    preferred
}

/// Source of operator answers
#[cfg_attr(test, mockall::automock)]
pub trait OperatorInput {
    /// Answer for `entry`; `None` once input is exhausted
    fn ask(&mut self, entry: &PlaceholderEntry, candidates: &[Identifier]) -> Option<String>;
}

/// Progress callbacks for presentation
pub trait FixObserver {
    /// Entry `position` of `total` (1-based) is about to be decided
    fn entry(&mut self, _position: usize, _total: usize, _entry: &PlaceholderEntry) {}

    /// Entry was fixed or skipped
    fn outcome(&mut self, _entry: &PlaceholderEntry, _outcome: &EntryOutcome) {}

    /// The session was aborted before the queue was exhausted
    fn aborted(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl FixObserver for SilentObserver {}

/// Result for one entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// Patched (or, in a dry run, would be patched)
    Fixed {
        /// Identifier written
        target: Identifier,
        /// Patch details
        patch: PatchOutcome,
    },
    /// Left untouched
    Skipped(SkipReason),
}

/// Tally of a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct FixSummary {
    /// Entries in the queue
    pub total: usize,
    /// Entries fixed (would-fix in a dry run)
    pub fixed: usize,
    /// Entries skipped
    pub skipped: usize,
    /// The operator stopped the session early
    pub aborted: bool,
    /// Whether patches were written
    pub write_mode: WriteMode,
    /// Per-entry results, in queue order, up to the abort
    pub outcomes: Vec<EntryOutcome>,
}

impl FixSummary {
    fn new(total: usize, write_mode: WriteMode) -> Self {
        Self {
            total,
            fixed: 0,
            skipped: 0,
            aborted: false,
            write_mode,
            outcomes: Vec::with_capacity(total),
        }
    }

    /// Pass if anything was fixed or there was nothing to fix
    #[inline]
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        if self.fixed > 0 || self.total == 0 {
            ExitStatus::Pass
        } else {
            ExitStatus::Fail
        }
    }
}

/// One fix session over a placeholder queue
#[derive(Debug)]
pub struct FixSession<'a> {
    layer: &'a CorpusLayer,
    registry: IdentifierRegistry,
    queue: Vec<PlaceholderEntry>,
    candidates: Vec<Identifier>,
    mode: FixMode,
    write_mode: WriteMode,
    abort_token: String,
    state: SessionState,
}

impl<'a> FixSession<'a> {
    /// Scan `dirs` for the registry and `targets` for the queue
    ///
    /// # Errors
    /// [`TraceError::NoFiles`] when `targets` holds no corpus file.
    pub fn prepare(
        layer: &'a CorpusLayer,
        config: &TraceConfig,
        dirs: &[PathBuf],
        targets: &[PathBuf],
        mode: FixMode,
        write_mode: WriteMode,
    ) -> TraceResult<Self> {
        let corpus = layer.load(dirs);
        let registry = IdentifierRegistry::build(&corpus.documents);

        let target = layer.load(targets);
        if target.is_empty() {
            return Err(TraceError::NoFiles("--target".to_string()));
        }
        let queue = find_placeholders(&target.documents);
        let candidates = rank_candidates(&registry, &config.preferred_prefix, config.show_all_ids);

        tracing::info!(
            ids = registry.len(),
            pending = queue.len(),
            candidates = candidates.len(),
            dry_run = !write_mode.persists(),
            "fix session prepared"
        );

        Ok(Self {
            layer,
            registry,
            queue,
            candidates,
            mode,
            write_mode,
            abort_token: config.abort_token.clone(),
            state: SessionState::Scanning,
        })
    }

    /// Registry snapshot
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    /// Pending entries, in detection order
    #[inline]
    #[must_use]
    pub fn queue(&self) -> &[PlaceholderEntry] {
        &self.queue
    }

    /// Ranked candidates offered to the operator
    #[inline]
    #[must_use]
    pub fn candidates(&self) -> &[Identifier] {
        &self.candidates
    }

    /// Replacement policy
    #[inline]
    #[must_use]
    pub fn mode(&self) -> &FixMode {
        &self.mode
    }

    /// Whether patches reach the disk
    #[inline]
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Work through the queue
    ///
    /// Patch failures are tallied as skips and never stop the session; only
    /// an abort decision does.
    pub fn run(&mut self, input: &mut dyn OperatorInput, observer: &mut dyn FixObserver) -> FixSummary {
        let total = self.queue.len();
        let mut summary = FixSummary::new(total, self.write_mode);

        for index in 0..total {
            self.state = SessionState::Presenting(index);
            let entry = self.queue[index].clone();
            observer.entry(index + 1, total, &entry);

            let decision = match &self.mode {
                FixMode::Automatic(target) => Decision::Apply(target.clone()),
                FixMode::Interactive => {
                    let answer = input.ask(&entry, &self.candidates);
                    decide(answer.as_deref(), &self.candidates, &self.abort_token)
                }
            };

            let outcome = match decision {
                Decision::Abort => {
                    tracing::info!(position = index + 1, total, "fix session aborted");
                    summary.aborted = true;
                    observer.aborted();
                    break;
                }
                Decision::Skip(reason) => {
                    self.state = SessionState::Skipping(index);
                    EntryOutcome::Skipped(reason)
                }
                Decision::Apply(target) => {
                    self.state = SessionState::Applying(index);
                    match self.apply(&entry, &target) {
                        Ok(patch) => EntryOutcome::Fixed { target, patch },
                        Err(err) => {
                            tracing::warn!(
                                file = %entry.file,
                                context = entry.context_str(),
                                field = %entry.field,
                                error = %err,
                                "patch failed"
                            );
                            self.state = SessionState::Skipping(index);
                            EntryOutcome::Skipped(SkipReason::PatchFailed(err.to_string()))
                        }
                    }
                }
            };

            match &outcome {
                EntryOutcome::Fixed { .. } => summary.fixed += 1,
                EntryOutcome::Skipped(_) => summary.skipped += 1,
            }
            observer.outcome(&entry, &outcome);
            summary.outcomes.push(outcome);
        }

        self.state = SessionState::Done;
        tracing::info!(
            fixed = summary.fixed,
            skipped = summary.skipped,
            aborted = summary.aborted,
            "fix session done"
        );
        summary
    }

    /// Re-read the entry's file, patch it, and write it unless dry-running
    fn apply(&self, entry: &PlaceholderEntry, target: &Identifier) -> TraceResult<PatchOutcome> {
        let patch = Patch::resolve(entry, target);
        self.layer.update(&patch.file, self.write_mode.persists(), |tree| {
            apply_patch(tree, &patch).map_err(TraceError::from)
        })
    }
}
