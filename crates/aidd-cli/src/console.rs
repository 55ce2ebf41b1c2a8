//! Console presentation
//!
//! Everything the binary prints on stdout. Logging goes to stderr through
//! `tracing`, so stdout carries only what is rendered here.

use aidd_artifact::Identifier;
use aidd_core::{EntryOutcome, FixObserver, FixSummary, OperatorInput, SkipReason, TraceabilityReport, WriteMode};
use aidd_trace::{IdentifierRegistry, PlaceholderEntry};
use std::io::{self, BufRead, Write};
use std::path::Path;

const RULE: &str = "======================================";

fn marker(failed: bool, bad: &str) -> &str {
    if failed {
        bad
    } else {
        "[OK]"
    }
}

/// Human-readable check summary
pub(crate) fn render_check(report: &TraceabilityReport, warn_orphan: bool, orphan_limit: usize) -> String {
    let s = &report.summary;
    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("Scanned {} files", s.files_scanned));
    line(String::new());
    line(format!(
        "TRACEABILITY: {}",
        if report.overall_pass { "PASS" } else { "FAIL" }
    ));
    line(format!("  IDs found        : {}", s.ids_found));
    line(format!("  References found : {}", s.references_found));
    line(format!(
        "  Broken links     : {}   {}",
        s.broken_links,
        marker(s.broken_links > 0, "[FAIL]")
    ));
    line(format!(
        "  Pending derived  : {}   {}",
        s.pending_derived_from,
        marker(s.pending_derived_from > 0, "[FAIL]")
    ));
    line(format!(
        "  Orphan IDs       : {}   {} (informational)",
        s.orphan_ids,
        marker(s.orphan_ids > 0, "[WARN]")
    ));
    if s.parse_failures > 0 {
        line(format!("  Parse failures   : {}   [WARN]", s.parse_failures));
    }
    if s.duplicate_ids > 0 {
        line(format!("  Duplicate IDs    : {}   [WARN] (first declaration wins)", s.duplicate_ids));
    }

    if !report.broken_links.is_empty() {
        line(String::new());
        line("  [BROKEN LINKS]".to_string());
        for broken in &report.broken_links {
            let r = &broken.reference;
            line(format!(
                "    {}  ({})  {} -> {}",
                r.source_file,
                r.source_id_str(),
                r.field,
                r.target
            ));
        }
    }

    if !report.pending_derived_from.is_empty() {
        line(String::new());
        line("  [PENDING derived_from]  (run 'fix' to resolve)".to_string());
        for entry in &report.pending_derived_from {
            line(format!(
                "    {}  ({})  {} = {}",
                entry.file,
                entry.context_str(),
                entry.field,
                value_repr(entry)
            ));
        }
    }

    if warn_orphan && !report.orphan_ids.is_empty() {
        line(String::new());
        line("  [ORPHAN IDs]  (not referenced by anything; informational)".to_string());
        for id in report.orphan_ids.iter().take(orphan_limit) {
            let file = report.id_registry.get(id).map_or("", String::as_str);
            line(format!("    {id}  ({file})"));
        }
        if report.orphan_ids.len() > orphan_limit {
            line(format!("    ... {} more", report.orphan_ids.len() - orphan_limit));
        }
    }

    out
}

/// Closing block of a fix session
pub(crate) fn render_fix_summary(summary: &FixSummary) -> String {
    let mut out = format!("{RULE}\n");
    match summary.write_mode {
        WriteMode::DryRun => out.push_str(&format!(
            "DRY-RUN complete: {} would be fixed / {} skipped\n",
            summary.fixed, summary.skipped
        )),
        WriteMode::Persist => {
            out.push_str(&format!(
                "FIX complete: {} fixed / {} skipped\n",
                summary.fixed, summary.skipped
            ));
            if summary.fixed > 0 {
                out.push_str("  Re-run 'check' to verify the corpus.\n");
            }
        }
    }
    out
}

fn value_repr(entry: &PlaceholderEntry) -> String {
    serde_json::to_string(&entry.current_value).unwrap_or_default()
}

/// Prints per-entry progress of a fix session
///
/// Write failures are logged once and otherwise ignored.
pub(crate) struct ConsoleObserver<W: Write> {
    out: W,
    write_mode: WriteMode,
    write_failed: bool,
}

impl<W: Write> ConsoleObserver<W> {
    pub(crate) fn new(out: W, write_mode: WriteMode) -> Self {
        Self {
            out,
            write_mode,
            write_failed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn print_entry(&mut self, position: usize, total: usize, entry: &PlaceholderEntry) -> io::Result<()> {
        let context = if entry.context_str().is_empty() {
            "(document root)"
        } else {
            entry.context_str()
        };
        writeln!(self.out, "--- [{position}/{total}] pending {} ---", entry.field)?;
        writeln!(self.out, "  File       : {}", entry.file)?;
        writeln!(self.out, "  Item ID    : {context}")?;
        writeln!(self.out, "  Field      : {}", entry.field)?;
        writeln!(self.out, "  Current    : {}", value_repr(entry))?;
        writeln!(self.out)
    }

    fn print_outcome(&mut self, entry: &PlaceholderEntry, outcome: &EntryOutcome) -> io::Result<()> {
        match outcome {
            EntryOutcome::Fixed { target, .. } if self.write_mode == WriteMode::DryRun => {
                writeln!(self.out, "  [DRY-RUN] would set {} to {target}", entry.field)?;
            }
            EntryOutcome::Fixed { target, .. } => {
                writeln!(self.out, "  [FIXED] {} = {target}", entry.field)?;
            }
            EntryOutcome::Skipped(SkipReason::NoAnswer) => writeln!(self.out, "  -> skipped")?,
            EntryOutcome::Skipped(reason @ SkipReason::PatchFailed(_)) => {
                writeln!(self.out, "  [ERROR] {reason}; skipped")?;
            }
            EntryOutcome::Skipped(reason) => writeln!(self.out, "  [WARN] {reason}; skipped")?,
        }
        writeln!(self.out)
    }

    fn check_written(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if !self.write_failed {
                tracing::warn!(error = %err, "cannot print fix progress");
                self.write_failed = true;
            }
        }
    }
}

impl<W: Write> FixObserver for ConsoleObserver<W> {
    fn entry(&mut self, position: usize, total: usize, entry: &PlaceholderEntry) {
        let result = self.print_entry(position, total, entry);
        self.check_written(result);
    }

    fn outcome(&mut self, entry: &PlaceholderEntry, outcome: &EntryOutcome) {
        let result = self.print_outcome(entry, outcome);
        self.check_written(result);
    }

    fn aborted(&mut self) {
        let result = writeln!(self.out, "Aborted.");
        self.check_written(result);
    }
}

/// Reads operator answers line by line, printing the candidate menu first
pub(crate) struct PromptOperator<R: BufRead, W: Write> {
    input: R,
    out: W,
    registry: IdentifierRegistry,
    abort_token: String,
}

impl<R: BufRead, W: Write> PromptOperator<R, W> {
    pub(crate) fn new(input: R, out: W, registry: IdentifierRegistry, abort_token: impl Into<String>) -> Self {
        Self {
            input,
            out,
            registry,
            abort_token: abort_token.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }

    fn print_menu(&mut self, candidates: &[Identifier]) -> io::Result<()> {
        writeln!(self.out, "  Available upstream IDs:")?;
        if candidates.is_empty() {
            writeln!(self.out, "    (none)")?;
        }
        for (i, id) in candidates.iter().enumerate() {
            let file = self
                .registry
                .file_of(id.as_str())
                .and_then(|f| Path::new(f).file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            writeln!(self.out, "    {:3}. {id}  ({file})", i + 1)?;
        }
        writeln!(self.out)?;
        write!(
            self.out,
            "  Choose [number / AIDD ID / Enter to skip / {} to quit]: ",
            self.abort_token
        )?;
        self.out.flush()
    }
}

impl<R: BufRead, W: Write> OperatorInput for PromptOperator<R, W> {
    fn ask(&mut self, _entry: &PlaceholderEntry, candidates: &[Identifier]) -> Option<String> {
        if let Err(err) = self.print_menu(candidates) {
            tracing::warn!(error = %err, "cannot print candidate menu");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                if let Err(err) = writeln!(self.out) {
                    tracing::warn!(error = %err, "cannot print prompt");
                }
                None
            }
            Ok(_) => Some(line),
            Err(err) => {
                tracing::warn!(error = %err, "cannot read operator input");
                None
            }
        }
    }
}
