//! Check command implementation.
//!
//! Validates the component graph: duplicate ids, mandatory requirements on
//! components that are not in the graph, and fragments without their host.

use apigate_config::ApigateConfig;
use apigate_index::ComponentId;
use apigate_resolver::ComponentState;

use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::graph_file::GraphFile;
use crate::ui;

pub fn execute(args: CheckArgs, config: &ApigateConfig) -> Result<()> {
    ui::success("Configuration is valid");

    ui::info(&format!("Checking {}...", args.graph.graph.display()));
    let graph = GraphFile::load(&args.graph.graph)?;

    let state = ComponentState::new();
    let mut problems = Vec::new();
    for component in graph.components {
        if let Err(err) = state.add_component(component) {
            problems.push(err.to_string());
        }
    }
    problems.extend(graph_problems(&state));

    if let Some(library) = config.resolver.system_library.as_deref() {
        if !state.contains(&ComponentId::new(library)) {
            ui::warning(&format!(
                "system library {library} is not part of the graph; system packages resolve to it anyway"
            ));
        }
    }

    if problems.is_empty() {
        ui::success(&format!("{} components, no problems found", state.len()));
        return Ok(());
    }
    for problem in &problems {
        ui::error(problem);
    }
    Err(CliError::CheckFailed {
        problems: problems.len(),
    })
}

/// Problems of a loaded graph, in component order.
pub fn graph_problems(state: &ComponentState) -> Vec<String> {
    let mut problems: Vec<String> = state
        .unresolved_requirements()
        .into_iter()
        .map(|(id, required)| format!("{id} requires missing component {}", required.id))
        .collect();
    problems.extend(state.orphan_fragments().into_iter().filter_map(|fragment| {
        fragment
            .host
            .as_ref()
            .map(|host| format!("fragment {} has no host {host}", fragment.id))
    }));
    problems
}
