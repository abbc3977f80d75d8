use colored::{ColoredString, Colorize};
use joinprocess::{
    Error, ModuleOutcome, ModuleState, ModuleStatus, ProgressCallback, QueryResult, RunSummary,
    WarningCallback,
};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

// ============================================================================
// Module Table
// ============================================================================

fn result_label(result: QueryResult) -> ColoredString {
    match result {
        QueryResult::FullyConfigured => result.as_str().green(),
        QueryResult::SufficientlyConfigured => result.as_str().cyan(),
        QueryResult::NotConfigured => result.as_str().yellow(),
        QueryResult::CannotConfigure => result.as_str().red(),
        QueryResult::NotApplicable => result.as_str().dimmed(),
    }
}

/// Checkbox shown in front of each module
pub fn enabled_marker(enabled: bool) -> &'static str {
    if enabled { "[x]" } else { "[ ]" }
}

/// Width of the short-name column
pub fn name_width(statuses: &[ModuleStatus]) -> usize {
    statuses
        .iter()
        .map(|s| s.short_name.len())
        .max()
        .unwrap_or(0)
}

/// Print the module table in execution order
pub fn module_table(title: &str, statuses: &[ModuleStatus]) {
    header(title);
    if statuses.is_empty() {
        dim("No applicable modules");
        return;
    }

    let width = name_width(statuses);
    for status in statuses {
        println!(
            "  {} {:<width$}  {:<40} {}",
            enabled_marker(status.enabled),
            status.short_name.bold(),
            status.long_name,
            result_label(status.last_result),
        );
    }
}

pub fn run_summary(summary: &RunSummary) {
    header("Summary");
    kv("Executed", &summary.executed.to_string());
    kv("Completed", &summary.completed.to_string());
    if summary.incomplete > 0 {
        kv("Incomplete", &summary.incomplete.to_string().yellow().to_string());
    }
    if summary.resumable > 0 {
        kv("Resumable errors", &summary.resumable.to_string().yellow().to_string());
    }
    kv("Skipped", &summary.skipped.to_string());
}

/// Print an engine error as title plus long description
pub fn report_error(err: &Error, show_traces: bool) {
    error(&err.title());
    for line in err.render(show_traces).lines() {
        eprintln!("  {line}");
    }
}

// ============================================================================
// Callbacks
// ============================================================================

/// Prints warnings as they arrive
pub struct UiWarnings;

impl WarningCallback for UiWarnings {
    fn warning(&mut self, title: &str, body: &str) {
        warn(title);
        for line in body.lines() {
            eprintln!("  {}", line.dimmed());
        }
    }
}

/// Step lines for each module that runs
pub struct UiProgress {
    pub quiet: bool,
}

impl ProgressCallback for UiProgress {
    fn on_module_start(&mut self, position: usize, total: usize, state: &ModuleState) {
        if !self.quiet {
            step(position, total, &format!("{}...", state.long_name()));
        }
    }

    fn on_module_complete(&mut self, state: &ModuleState, outcome: ModuleOutcome) {
        if self.quiet {
            return;
        }
        match outcome {
            ModuleOutcome::Completed => success(state.short_name()),
            ModuleOutcome::Incomplete => warn(&format!("{} did not fully complete", state.short_name())),
            ModuleOutcome::Resumable => warn(&format!("{} finished with errors", state.short_name())),
        }
    }
}
