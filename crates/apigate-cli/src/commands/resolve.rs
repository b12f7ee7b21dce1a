//! Resolve command implementation.

use tracing::debug;

use apigate_config::ApigateConfig;
use apigate_index::ComponentId;

use crate::cli::ResolveArgs;
use crate::commands::build_baseline;
use crate::error::Result;
use crate::graph_file::GraphFile;
use crate::ui;

/// Print the providers of `args.package` for `args.requester`, one per line.
pub fn execute(args: ResolveArgs, config: &ApigateConfig) -> Result<()> {
    let graph = GraphFile::load(&args.graph.graph)?;
    let baseline = build_baseline(config, graph)?;

    let requester = ComponentId::new(&args.requester);
    let providers = baseline.resolve_package(&requester, &args.package)?;
    debug!(stats = ?baseline.resolver().stats(), "resolution finished");

    if providers.is_empty() {
        ui::warning(&format!(
            "no component makes {} visible to {}",
            args.package, requester
        ));
        return Ok(());
    }
    for provider in providers.iter() {
        println!("{provider}");
    }
    Ok(())
}
