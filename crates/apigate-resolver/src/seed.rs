//! Seeds an API description from a component's package declarations.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::warn;

use apigate_index::{AccessLevel, AnnotationSink, ElementDescriptor, Visibility};

use crate::component::{Component, ExportedPackage};

/// Manifest notation for the default package.
const DEFAULT_PACKAGE_EXPORT: &str = ".";

fn package_name(export: &ExportedPackage) -> &str {
    if export.name == DEFAULT_PACKAGE_EXPORT {
        ""
    } else {
        &export.name
    }
}

/// Write package-level annotations for `component` into `sink`.
///
/// Every local package starts `Private`. Exports that cover a local package
/// (from the component itself, its host, or its fragments) then decide:
/// internal and friend exports stay `Private` (friends additionally get
/// [`AccessLevel::Friend`]), all others become `Api`.
///
/// Writes the sink rejects are logged and skipped.
pub fn annotate_component(
    sink: &mut dyn AnnotationSink,
    component: &Component,
    host: Option<&Component>,
    fragments: &[Arc<Component>],
) {
    let mut local: IndexSet<&str> = component.packages.iter().map(String::as_str).collect();
    local.extend(component.exports.iter().map(package_name));

    for package in &local {
        write(sink, component, package, |sink, element| {
            sink.set_visibility(element, Visibility::Private)
        });
    }

    let supplied = component
        .exports
        .iter()
        .chain(host.into_iter().flat_map(|h| h.exports.iter()))
        .chain(fragments.iter().flat_map(|f| f.exports.iter()))
        .filter(|export| local.contains(package_name(export)));

    for export in supplied {
        let package = package_name(export);
        if export.internal || !export.friends.is_empty() {
            for friend in &export.friends {
                write(sink, component, package, |sink, element| {
                    sink.set_access_level(friend, element, AccessLevel::Friend)
                });
            }
        } else {
            write(sink, component, package, |sink, element| {
                sink.set_visibility(element, Visibility::Api)
            });
        }
    }
}

fn write<F>(sink: &mut dyn AnnotationSink, component: &Component, package: &str, op: F)
where
    F: FnOnce(&mut dyn AnnotationSink, &ElementDescriptor) -> apigate_index::Result<()>,
{
    let element = ElementDescriptor::package(package);
    if let Err(err) = op(sink, &element) {
        warn!(component = %component.id, %package, error = %err, "skipping package annotation");
    }
}
