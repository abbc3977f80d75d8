use anyhow::Result;

use crate::Context;
use crate::state::MembershipStore;
use crate::ui;

/// Show the recorded domain membership
pub fn run(ctx: &Context) -> Result<()> {
    let store = MembershipStore::new(ctx.config.membership_path());
    let Some(membership) = store.load()? else {
        ui::info("Not joined to a domain");
        return Ok(());
    };

    ui::header("Domain membership");
    ui::kv("Domain", &membership.domain_name);
    if let Some(short) = &membership.short_domain_name {
        ui::kv("Short domain", short);
    }
    if let Some(computer) = &membership.computer_name {
        ui::kv("Computer", computer);
    }
    if let Some(ou) = &membership.ou_name {
        ui::kv("OU", ou);
    }
    if let Some(user) = &membership.joined_by {
        ui::kv("Joined by", user);
    }
    ui::kv(
        "Joined at",
        &membership
            .joined_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
    );
    if ctx.verbose > 0 {
        ui::dim(&format!("Record: {}", store.path().display()));
    }
    Ok(())
}
