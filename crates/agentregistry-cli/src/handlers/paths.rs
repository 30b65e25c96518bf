//! Paths command handler.

use agentregistry_core::{compose_file_path, gateway_file_path};

use crate::bootstrap::CliContext;

/// Print the resolved runtime paths in `key = value` form.
pub fn execute(ctx: &CliContext) {
    println!("runtime_dir = {}", ctx.runtime_dir.display());
    println!(
        "compose_file = {}",
        compose_file_path(&ctx.runtime_dir).display()
    );
    println!(
        "gateway_file = {}",
        gateway_file_path(&ctx.runtime_dir).display()
    );
    println!("project_name = {}", ctx.settings.effective_project_name());
    println!("gateway_port = {}", ctx.settings.effective_gateway_port());
}
