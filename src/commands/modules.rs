use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::modules;
use crate::ui;

/// List the registered modules in join order
pub fn run(ctx: &Context) -> Result<()> {
    let registry = modules::registry(&ctx.config)?;

    ui::header("Modules (join order)");
    let width = registry
        .iter()
        .map(|m| m.short_name().len())
        .max()
        .unwrap_or(0);
    for module in registry.iter() {
        let default = if module.run_by_default() {
            "default".green()
        } else {
            "opt-in".yellow()
        };
        println!(
            "  {:<width$}  {:<40} {}",
            module.short_name().bold(),
            module.long_name(),
            default
        );
    }
    println!();
    ui::dim("Leaving a domain runs these in reverse order.");
    Ok(())
}
