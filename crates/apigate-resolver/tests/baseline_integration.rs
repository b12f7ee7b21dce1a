//! End-to-end checks against a graph loaded from TOML.

use std::thread;

use apigate_index::{ComponentId, ElementDescriptor, Visibility};
use apigate_resolver::{Baseline, Component, ResolverOptions};
use serde::Deserialize;

#[derive(Deserialize)]
struct GraphFile {
    #[serde(rename = "component")]
    components: Vec<Component>,
}

const GRAPH: &str = r#"
[[component]]
id = "org.acme.core"
version = "1.2.0"
packages = ["org.acme.core", "org.acme.core.internal"]

[[component.exports]]
name = "org.acme.core"

[[component.exports]]
name = "org.acme.core.internal"
friends = ["org.acme.ui"]

[[component]]
id = "org.acme.ui"
packages = ["org.acme.ui"]

[[component.requires]]
id = "org.acme.core"
version_range = "[1.0.0,2.0.0)"

[[component]]
id = "org.acme.cli"

[[component.requires]]
id = "org.acme.ui"

[[component.requires]]
id = "org.acme.core"
"#;

fn load() -> Baseline {
    let graph: GraphFile = toml::from_str(GRAPH).unwrap();
    let options = ResolverOptions {
        system_library: Some(ComponentId::new("jre")),
        ..ResolverOptions::default()
    };
    let baseline = Baseline::new(options);
    baseline.add_components(graph.components).unwrap();
    baseline
}

#[test]
fn friends_see_internal_packages() {
    let baseline = load();
    let internal = "org.acme.core.internal";

    let ui = baseline
        .resolve_package(&ComponentId::new("org.acme.ui"), internal)
        .unwrap();
    assert_eq!(ui.as_ref(), [ComponentId::new("org.acme.core")]);

    let cli = baseline
        .resolve_package(&ComponentId::new("org.acme.cli"), internal)
        .unwrap();
    assert!(cli.is_empty());
}

#[test]
fn system_packages_resolve_to_system_library() {
    let baseline = load();
    let providers = baseline
        .resolve_package(&ComponentId::new("org.acme.cli"), "java.lang")
        .unwrap();
    assert_eq!(providers.as_ref(), [ComponentId::new("jre")]);
}

#[test]
fn descriptions_reflect_exports() {
    let baseline = load();
    let core = baseline
        .description(&ComponentId::new("org.acme.core"))
        .unwrap();
    let internal = core
        .resolve_annotations(&ElementDescriptor::type_("org.acme.core.internal", "Impl"))
        .unwrap();
    assert_eq!(internal.visibility, Visibility::Private);
}

#[test]
fn concurrent_resolution_agrees() {
    let baseline = load();
    let requester = ComponentId::new("org.acme.cli");

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| baseline.resolve_package(&requester, "org.acme.core").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for providers in &results {
        assert_eq!(providers.as_ref(), [ComponentId::new("org.acme.core")]);
    }
}
