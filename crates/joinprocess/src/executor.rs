//! Execution driver - runs enabled modules in table order

use crate::classify::{ChangesFailed, ChangesSucceeded, FailureDecision, SuccessDecision, classify};
use crate::context::{NoProgress, NoWarnings, ProgressCallback, WarningCallback};
use crate::error::{Error, Result, render_module_error};
use crate::options::JoinOptions;
use crate::state::{ModuleState, ModuleStateTable};
use crate::types::{ModuleOutcome, RunSummary};

/// Validate the table, then run every enabled module in order
///
/// After each module's changes the module is queried again, whether or not
/// the changes failed, and the fresh state decides what happens:
///
/// - changes failed, state not configured: the run aborts with the module's error
/// - changes failed, state acceptable: a warning is reported and the run continues
/// - changes succeeded, state not configured: the run aborts
/// - changes succeeded, only sufficiently configured: a warning is reported
/// - changes succeeded, fully configured: the entry is disabled, so running
///   the same table again does not repeat it
///
/// A failing query always aborts. Disabled entries are skipped untouched.
pub fn run_join_process(
    options: &JoinOptions,
    table: &mut ModuleStateTable,
    warnings: &mut dyn WarningCallback,
    progress: &mut dyn ProgressCallback,
) -> Result<RunSummary> {
    crate::validator::check_required_enabled(options, table)?;

    let total = table.iter().filter(|s| s.enabled()).count();
    let mut summary = RunSummary::default();
    let mut position = 0;

    for state in table.iter_mut() {
        if !state.enabled() {
            summary.skipped += 1;
            continue;
        }
        position += 1;
        progress.on_module_start(position, total, state);

        let outcome = run_module(options, state, warnings)?;

        progress.on_module_complete(state, outcome);
        summary.add_outcome(outcome);
    }

    log::info!(
        "Ran {} modules: {} completed, {} with warnings",
        summary.executed,
        summary.completed,
        summary.warnings()
    );
    Ok(summary)
}

/// Run without warning or progress callbacks
///
/// Resumable errors are still logged.
pub fn run_join_process_simple(
    options: &JoinOptions,
    table: &mut ModuleStateTable,
) -> Result<RunSummary> {
    run_join_process(options, table, &mut NoWarnings, &mut NoProgress)
}

fn run_module(
    options: &JoinOptions,
    state: &mut ModuleState,
    warnings: &mut dyn WarningCallback,
) -> Result<ModuleOutcome> {
    let module = state.short_name().to_string();
    log::info!("Running module '{module}' ({})", state.long_name());

    let changes = state.make_changes(options);
    let result = state.requery(options)?;

    match changes {
        Err(err) => match classify(result, state.enabled(), ChangesFailed) {
            FailureDecision::Abort => Err(Error::ModuleFailed {
                module,
                source: err,
            }),
            FailureDecision::Resumable => {
                let title =
                    format!("A resumable error occurred while processing the '{module}' module");
                let body = render_module_error(&err, options.show_traces);
                log::warn!("{title}: {err:#}");
                warnings.warning(&title, &body);
                Ok(ModuleOutcome::Resumable)
            }
        },
        Ok(()) => match classify(result, state.enabled(), ChangesSucceeded) {
            SuccessDecision::Abort => Err(Error::ModuleNotConfigured { module }),
            SuccessDecision::Incomplete => {
                let title = "A resumable error occurred while processing a module";
                let body = format!(
                    "Even though the configuration of '{module}' was executed, the configuration \
                     did not fully complete."
                );
                log::warn!("{body}");
                warnings.warning(title, &body);
                Ok(ModuleOutcome::Incomplete)
            }
            SuccessDecision::Complete => {
                log::info!("Module '{module}' is {result}");
                state.set_enabled(false);
                Ok(ModuleOutcome::Completed)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CollectWarnings, KnownDomain};
    use crate::error::ErrorCode;
    use crate::initializer::init_module_states;
    use crate::registry::ModuleRegistry;
    use crate::test_support::{CallLog, ScriptedModule};
    use crate::types::QueryResult;

    fn init(log: &CallLog, modules: Vec<ScriptedModule>) -> (JoinOptions, ModuleStateTable) {
        let mut registry = ModuleRegistry::new();
        for module in modules {
            registry.register(module.with_log(log)).unwrap();
        }
        let mut options = JoinOptions::join("corp.example.com");
        let table = init_module_states(&registry, &mut options, &KnownDomain(None)).unwrap();
        (options, table)
    }

    fn results(table: &ModuleStateTable) -> Vec<(String, QueryResult, bool)> {
        table
            .iter()
            .map(|s| (s.short_name().to_string(), s.last_result(), s.enabled()))
            .collect()
    }

    #[derive(Default)]
    struct RecordProgress {
        events: Vec<String>,
    }

    impl ProgressCallback for RecordProgress {
        fn on_module_start(&mut self, position: usize, total: usize, state: &ModuleState) {
            self.events
                .push(format!("start {position}/{total} {}", state.short_name()));
        }

        fn on_module_complete(&mut self, state: &ModuleState, outcome: ModuleOutcome) {
            self.events
                .push(format!("done {} {outcome:?}", state.short_name()));
        }
    }

    #[test]
    fn test_successful_run_disables_completed_modules() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
                ScriptedModule::new("b", QueryResult::FullyConfigured),
                ScriptedModule::new("c", QueryResult::SufficientlyConfigured)
                    .default_enabled(false),
            ],
        );
        let mut warnings = CollectWarnings::default();

        let summary =
            run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap();

        assert_eq!(
            results(&table),
            vec![
                ("a".into(), QueryResult::FullyConfigured, false),
                ("b".into(), QueryResult::FullyConfigured, false),
                ("c".into(), QueryResult::SufficientlyConfigured, false),
            ]
        );
        assert!(warnings.warnings.is_empty());
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(log.calls("changes:"), vec!["a"]);
    }

    #[test]
    fn test_second_run_is_a_noop() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::NotApplicable),
            ],
        );

        run_join_process_simple(&options, &mut table).unwrap();
        assert!(table.iter().all(|s| !s.enabled()));

        let second = run_join_process_simple(&options, &mut table).unwrap();

        assert_eq!(second.executed, 0);
        assert_eq!(log.calls("changes:"), vec!["a", "b"]);
    }

    #[test]
    fn test_failed_changes_without_progress_abort_the_run() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured).failing_changes("ldap down"),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
                ScriptedModule::new("c", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
            ],
        );
        let mut warnings = CollectWarnings::default();

        let err =
            run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap_err();

        assert_eq!(err.code(), ErrorCode::ModuleFailed);
        assert_eq!(err.module(), Some("a"));
        assert!(err.description().contains("ldap down"));
        assert_eq!(log.calls("changes:"), vec!["a"]);
        assert!(warnings.warnings.is_empty());
    }

    #[test]
    fn test_failed_changes_with_acceptable_state_are_resumable() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::SufficientlyConfigured)
                    .failing_changes("could not restart daemon"),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
            ],
        );
        let mut warnings = CollectWarnings::default();

        let summary =
            run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap();

        assert_eq!(warnings.warnings.len(), 1);
        let (title, body) = &warnings.warnings[0];
        assert!(title.contains("'a'"));
        assert_eq!(body, "could not restart daemon");
        assert_eq!(log.calls("changes:"), vec!["a", "b"]);
        assert_eq!(summary.resumable, 1);
        assert_eq!(summary.completed, 1);

        // resumable entries stay enabled
        let a = table.by_name("a").unwrap();
        assert_eq!(a.last_result(), QueryResult::SufficientlyConfigured);
        assert!(a.enabled());
    }

    #[test]
    fn test_failed_changes_that_cannot_configure_abort_the_run() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::CannotConfigure)
                    .failing_changes("keytab locked"),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
            ],
        );
        let mut warnings = CollectWarnings::default();

        let err =
            run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap_err();

        assert!(matches!(err, Error::ModuleFailed { ref module, .. } if module == "a"));
        assert!(err.description().contains("keytab locked"));
        assert_eq!(log.calls("changes:"), vec!["a"]);
        assert!(warnings.warnings.is_empty());
    }

    #[test]
    fn test_failed_changes_that_still_converged_warn_once_and_stay_enabled() {
        for after in [QueryResult::FullyConfigured, QueryResult::NotApplicable] {
            let log = CallLog::default();
            let (options, mut table) = init(
                &log,
                vec![
                    ScriptedModule::new("a", QueryResult::NotConfigured)
                        .after_changes(after)
                        .failing_changes("cache flush failed"),
                    ScriptedModule::new("b", QueryResult::NotConfigured)
                        .after_changes(QueryResult::FullyConfigured),
                ],
            );
            let mut warnings = CollectWarnings::default();

            let summary =
                run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap();

            assert_eq!(warnings.warnings.len(), 1, "{after}");
            assert!(warnings.warnings[0].0.contains("'a'"));
            assert_eq!(warnings.warnings[0].1, "cache flush failed");
            assert_eq!(summary.resumable, 1);
            assert_eq!(summary.completed, 1);
            assert_eq!(log.calls("changes:"), vec!["a", "b"]);

            let a = table.by_name("a").unwrap();
            assert_eq!(a.last_result(), after);
            assert!(a.enabled(), "{after}");
        }
    }

    #[test]
    fn test_success_but_not_configured_is_fatal() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured),
                ScriptedModule::new("b", QueryResult::NotConfigured),
            ],
        );

        let err = run_join_process_simple(&options, &mut table).unwrap_err();

        assert!(matches!(err, Error::ModuleNotConfigured { ref module } if module == "a"));
        assert_eq!(log.calls("changes:"), vec!["a"]);
    }

    #[test]
    fn test_success_but_cannot_configure_is_fatal() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::CannotConfigure),
            ],
        );

        let err = run_join_process_simple(&options, &mut table).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ModuleNotConfigured);
    }

    #[test]
    fn test_sufficiently_configured_after_success_warns_and_continues() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::SufficientlyConfigured),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
            ],
        );
        let mut warnings = CollectWarnings::default();

        let summary =
            run_join_process(&options, &mut table, &mut warnings, &mut NoProgress).unwrap();

        assert_eq!(warnings.warnings.len(), 1);
        assert!(warnings.warnings[0].1.contains("did not fully complete"));
        assert!(warnings.warnings[0].1.contains("'a'"));
        assert_eq!(summary.incomplete, 1);
        assert_eq!(summary.completed, 1);
        assert!(table.by_name("a").unwrap().enabled());
    }

    #[test]
    fn test_query_failure_after_changes_aborts() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured)
                    .failing_query_after_changes(),
                ScriptedModule::new("b", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
            ],
        );

        let err = run_join_process_simple(&options, &mut table).unwrap_err();

        assert!(matches!(err, Error::QueryFailed { ref module, .. } if module == "a"));
        assert_eq!(log.calls("changes:"), vec!["a"]);
    }

    #[test]
    fn test_failed_validation_changes_nothing() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
                ScriptedModule::new("b", QueryResult::FullyConfigured),
                ScriptedModule::new("c", QueryResult::CannotConfigure),
            ],
        );

        let err = run_join_process_simple(&options, &mut table).unwrap_err();

        assert!(matches!(err, Error::ManualConfigurationRequired { ref module, .. } if module == "c"));
        assert!(log.calls("changes:").is_empty());
    }

    #[test]
    fn test_progress_counts_enabled_modules() {
        let log = CallLog::default();
        let (options, mut table) = init(
            &log,
            vec![
                ScriptedModule::new("a", QueryResult::NotConfigured)
                    .after_changes(QueryResult::FullyConfigured),
                ScriptedModule::new("b", QueryResult::FullyConfigured),
                ScriptedModule::new("c", QueryResult::NotConfigured)
                    .after_changes(QueryResult::SufficientlyConfigured),
            ],
        );
        let mut progress = RecordProgress::default();

        run_join_process(&options, &mut table, &mut NoWarnings, &mut progress).unwrap();

        assert_eq!(
            progress.events,
            vec![
                "start 1/2 a",
                "done a Completed",
                "start 2/2 c",
                "done c Incomplete",
            ]
        );
    }

    #[test]
    fn test_leave_runs_in_reverse_order() {
        let log = CallLog::default();
        let mut registry = ModuleRegistry::new();
        for name in ["a", "b", "c"] {
            registry
                .register(
                    ScriptedModule::new(name, QueryResult::NotConfigured)
                        .after_changes(QueryResult::FullyConfigured)
                        .with_log(&log),
                )
                .unwrap();
        }
        let mut options = JoinOptions::leave();
        let mut table = init_module_states(
            &registry,
            &mut options,
            &KnownDomain(Some("corp.example.com".into())),
        )
        .unwrap();

        run_join_process_simple(&options, &mut table).unwrap();

        assert_eq!(log.calls("changes:"), vec!["c", "b", "a"]);
    }
}
