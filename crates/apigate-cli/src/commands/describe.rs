//! Describe command implementation.

use apigate_config::ApigateConfig;
use apigate_index::{
    AnnotationIndex, Annotations, ComponentId, DescriptionVisitor, ElementDescriptor, ElementKind,
};

use crate::cli::DescribeArgs;
use crate::commands::build_baseline;
use crate::error::Result;
use crate::graph_file::GraphFile;
use crate::ui;

/// Print every element of the component's description with its resolved
/// annotations, children indented under their parents.
pub fn execute(args: DescribeArgs, config: &ApigateConfig) -> Result<()> {
    let graph = GraphFile::load(&args.graph.graph)?;
    let baseline = build_baseline(config, graph)?;

    let id = ComponentId::new(&args.component);
    let description = baseline.description(&id)?;
    let own = baseline.index(&id)?;

    let mut printer = Printer {
        own: &own,
        depth: 0,
        lines: Vec::new(),
    };
    description.accept(&mut printer);

    if printer.lines.is_empty() {
        ui::info(&format!("{id} declares no packages"));
    }
    for line in printer.lines {
        println!("{line}");
    }
    Ok(())
}

struct Printer<'a> {
    own: &'a AnnotationIndex,
    depth: usize,
    lines: Vec<String>,
}

impl DescriptionVisitor for Printer<'_> {
    fn visit_element(&mut self, element: &ElementDescriptor, annotations: &Annotations) -> bool {
        let name = element.to_string();
        let name = if name.is_empty() { "<default>" } else { &name };
        let mut line = format!("{}{name}  {annotations}", "  ".repeat(self.depth));

        if element.kind() == ElementKind::Package {
            let friends: Vec<String> = self
                .own
                .friends_of(element)
                .into_iter()
                .map(|(friend, _)| friend.to_string())
                .collect();
            if !friends.is_empty() {
                line.push_str(&ui::dim(&format!("  friends: {}", friends.join(", "))));
            }
        }

        self.lines.push(line);
        self.depth += 1;
        true
    }

    fn end_visit_element(&mut self, _element: &ElementDescriptor, _annotations: &Annotations) {
        self.depth = self.depth.saturating_sub(1);
    }
}
