//! `join` and `leave` commands
//!
//! Both build run options, initialize the module table against the
//! membership record, apply enable/disable overrides (config file first,
//! then command line) and either preview or run it.

use anyhow::Result;
use joinprocess::{JoinOptions, JoinProcess, ModuleRegistry};
use serde_json::json;

use crate::Context;
use crate::cli::{CredentialArgs, JoinArgs, LeaveArgs, ModuleArgs};
use crate::modules;
use crate::state::MembershipStore;
use crate::ui;

pub fn join(ctx: &Context, args: JoinArgs) -> Result<()> {
    let mut options = JoinOptions::join(args.domain);
    options.ou_name = args.ou;
    options.short_domain_name = args.short_domain;
    options.computer_name = args.computer;
    apply_credentials(&mut options, args.credentials);
    execute(ctx, options, &args.modules)
}

pub fn leave(ctx: &Context, args: LeaveArgs) -> Result<()> {
    let mut options = JoinOptions::leave();
    apply_credentials(&mut options, args.credentials);
    execute(ctx, options, &args.modules)
}

fn apply_credentials(options: &mut JoinOptions, credentials: CredentialArgs) {
    options.username = credentials.user;
    options.password = credentials.password;
}

fn execute(ctx: &Context, mut options: JoinOptions, args: &ModuleArgs) -> Result<()> {
    options.show_traces = ctx.show_traces;
    let action = if options.is_joining() { "join" } else { "leave" };

    let registry = modules::registry(&ctx.config)?;
    let store = MembershipStore::new(ctx.config.membership_path());

    let mut process = JoinProcess::initialize(&registry, options, &store)?
        .with_warnings(ui::UiWarnings)
        .with_progress(ui::UiProgress {
            quiet: ctx.quiet || args.json,
        });

    apply_overrides(&registry, &mut process, &config_overrides(ctx), Strictness::Lenient)?;
    apply_overrides(&registry, &mut process, &cli_overrides(args), Strictness::Strict)?;

    if args.preview {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "modules": process.statuses() }))?
            );
        } else {
            ui::module_table(&format!("Modules to {action}"), &process.statuses());
        }
        process.validate()?;
        if !args.json {
            println!();
            ui::success(&format!("Ready to {action}"));
        }
        process.dispose();
        return Ok(());
    }

    if !ctx.quiet && !args.json {
        ui::module_table(&format!("Modules to {action}"), &process.statuses());
        println!();
    }

    let summary = process.run()?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "modules": process.statuses(),
                "summary": summary,
            }))?
        );
    } else if !ctx.quiet {
        ui::module_table("Result", &process.statuses());
        ui::run_summary(&summary);
        println!();
        match process.options().domain_name.as_deref() {
            Some(domain) if summary.is_clean() => {
                ui::success(&format!("Finished {action} for {domain}"))
            }
            Some(domain) => ui::warn(&format!(
                "Finished {action} for {domain} with {} warning(s)",
                summary.warnings()
            )),
            None => ui::success(&format!("Finished {action}")),
        }
    }

    process.dispose();
    Ok(())
}

/// How to treat an override naming a module that is not in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strictness {
    /// Skip registered modules that were left out as not applicable
    Lenient,
    /// Every name must be in the table
    Strict,
}

fn overrides(enable: &[String], disable: &[String]) -> Vec<(String, bool)> {
    enable
        .iter()
        .map(|name| (name.clone(), true))
        .chain(disable.iter().map(|name| (name.clone(), false)))
        .collect()
}

/// Defaults from the config file, applied first
fn config_overrides(ctx: &Context) -> Vec<(String, bool)> {
    overrides(&ctx.config.enable, &ctx.config.disable)
}

/// Explicit `--enable`/`--disable` flags, applied after the config file
fn cli_overrides(args: &ModuleArgs) -> Vec<(String, bool)> {
    overrides(&args.enable, &args.disable)
}

/// Apply overrides to the table
///
/// A name missing from the table fails with `module-not-found`, except that
/// lenient overrides skip registered modules that are not applicable here.
fn apply_overrides(
    registry: &ModuleRegistry,
    process: &mut JoinProcess,
    overrides: &[(String, bool)],
    strictness: Strictness,
) -> Result<()> {
    for (name, enabled) in overrides {
        if strictness == Strictness::Lenient
            && process.table().by_name(name).is_none()
            && registry.get(name).is_some()
        {
            log::debug!("Module '{name}' is not applicable, ignoring configured override");
            continue;
        }
        process.set_enabled(name, *enabled)?;
        log::debug!(
            "Module '{name}' {}",
            if *enabled { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}
