//! Tests for live indices driven by an in-memory source.

use std::sync::Arc;

use crate::{
    AnnotationIndex, Annotations, ComponentId, ElementDescriptor, InMemorySource, IndexError,
    RefreshState, RestrictionSet, Visibility,
};

fn live_index(source: &Arc<InMemorySource>) -> AnnotationIndex {
    AnnotationIndex::live(
        Some(ComponentId::new("com.acme.project")),
        source.clone(),
        source.clone(),
    )
}

fn restricted(restrictions: RestrictionSet) -> Annotations {
    Annotations::new(Visibility::Inherited, restrictions)
}

struct Fixture {
    source: Arc<InMemorySource>,
    index: AnnotationIndex,
    api_type: ElementDescriptor,
    internal_type: ElementDescriptor,
}

fn fixture() -> Fixture {
    let source = Arc::new(InMemorySource::new());
    let api_type = ElementDescriptor::type_("com.acme.api", "Service");
    let internal_type = ElementDescriptor::type_("com.acme.internal", "ServiceImpl");
    source.declare_type(
        &api_type,
        vec![
            (api_type.clone(), restricted(RestrictionSet::NO_IMPLEMENT)),
            (api_type.field("legacy"), restricted(RestrictionSet::NO_REFERENCE)),
        ],
    );
    source.declare_type(&internal_type, vec![]);
    source.export_package("com.acme.api", Visibility::Api);

    let index = live_index(&source);
    Fixture {
        source,
        index,
        api_type,
        internal_type,
    }
}

#[test]
fn test_lookup_materializes_declared_elements() {
    let f = fixture();
    let resolved = f.index.resolve_annotations(&f.api_type).unwrap();
    assert_eq!(resolved.visibility, Visibility::Api);
    assert_eq!(resolved.restrictions, RestrictionSet::NO_IMPLEMENT);

    let field = f.index.resolve_annotations(&f.api_type.field("legacy")).unwrap();
    assert_eq!(field.restrictions, RestrictionSet::NO_REFERENCE);
}

#[test]
fn test_unexported_package_is_private() {
    let f = fixture();
    let resolved = f.index.resolve_annotations(&f.internal_type).unwrap();
    assert_eq!(resolved.visibility, Visibility::Private);
}

#[test]
fn test_undeclared_elements_are_not_materialized() {
    let f = fixture();
    assert!(f
        .index
        .resolve_annotations(&ElementDescriptor::package("com.other"))
        .is_none());

    let err = f
        .index
        .set_visibility(&ElementDescriptor::type_("com.other", "X"), Visibility::Api)
        .unwrap_err();
    assert!(matches!(err, IndexError::ElementNotFound { .. }));

    let missing = ElementDescriptor::type_("com.acme.api", "Missing");
    let resolved = f.index.resolve_annotations(&missing).unwrap();
    assert_eq!(resolved.visibility, Visibility::Api);
    assert_eq!(f.index.refresh(&missing), None);
}

#[test]
fn test_refresh_without_change_is_a_no_op() {
    let f = fixture();
    f.index.resolve_annotations(&f.api_type);
    f.index.clear_modified();
    let derivations = f.source.derivations();

    assert_eq!(f.index.refresh(&f.api_type), Some(RefreshState::Clean));
    assert_eq!(f.index.refresh(&f.api_type), Some(RefreshState::Clean));
    assert!(!f.index.is_modified());
    assert_eq!(f.source.derivations(), derivations);
}

#[test]
fn test_changed_declaration_is_rederived() {
    let f = fixture();
    f.index.resolve_annotations(&f.api_type.field("legacy"));
    f.index.clear_modified();

    f.source.declare_type(
        &f.api_type,
        vec![(f.api_type.method("start", "()V"), restricted(RestrictionSet::NO_OVERRIDE))],
    );

    let ty = f.index.resolve_annotations(&f.api_type).unwrap();
    assert_eq!(ty.restrictions, RestrictionSet::NO_RESTRICTIONS);
    assert!(f.index.is_modified());

    let old = f.index.resolve_annotations(&f.api_type.field("legacy")).unwrap();
    assert_eq!(old.restrictions, RestrictionSet::NO_RESTRICTIONS);
    let new = f
        .index
        .resolve_annotations(&f.api_type.method("start", "()V"))
        .unwrap();
    assert_eq!(new.restrictions, RestrictionSet::NO_OVERRIDE);
}

#[test]
fn test_removed_declaration_is_detached() {
    let f = fixture();
    f.index.resolve_annotations(&f.api_type.field("legacy"));
    let before = f.index.node_count();

    f.source.remove_type(&f.api_type);
    let resolved = f.index.resolve_annotations(&f.api_type).unwrap();
    assert_eq!(resolved.restrictions, RestrictionSet::NO_RESTRICTIONS);
    assert_eq!(resolved.visibility, Visibility::Api);
    assert!(f.index.node_count() < before);
    assert_eq!(f.index.refresh(&f.api_type), None);
}

#[test]
fn test_removed_package_is_detached() {
    let f = fixture();
    f.index.resolve_annotations(&f.internal_type);
    f.source.remove_package("com.acme.internal");
    assert!(f.index.resolve_annotations(&f.internal_type).is_none());
}

#[test]
fn test_unavailable_source_keeps_previous_annotations() {
    let f = fixture();
    f.index.resolve_annotations(&f.api_type.field("legacy"));

    f.source.set_failing(&f.api_type, true);
    let resolved = f.index.resolve_annotations(&f.api_type).unwrap();
    assert_eq!(resolved.restrictions, RestrictionSet::NO_IMPLEMENT);
    let field = f.index.resolve_annotations(&f.api_type.field("legacy")).unwrap();
    assert_eq!(field.restrictions, RestrictionSet::NO_REFERENCE);
    assert_eq!(f.index.refresh(&f.api_type), Some(RefreshState::Stale));

    f.source.set_failing(&f.api_type, false);
    assert_eq!(f.index.refresh(&f.api_type), Some(RefreshState::Clean));
}

#[test]
fn test_manifest_change_updates_package_visibility() {
    let f = fixture();
    assert_eq!(
        f.index.resolve_annotations(&f.internal_type).unwrap().visibility,
        Visibility::Private
    );

    f.source.export_package("com.acme.internal", Visibility::Spi);
    assert_eq!(
        f.index.resolve_annotations(&f.internal_type).unwrap().visibility,
        Visibility::Spi
    );

    f.source.unexport_package("com.acme.api");
    assert_eq!(
        f.index.resolve_annotations(&f.api_type).unwrap().visibility,
        Visibility::Private
    );
}

#[test]
fn test_export_of_undeclared_package_is_skipped() {
    let f = fixture();
    f.source.export_package("com.acme.aaa", Visibility::Api);
    f.source.export_package("com.acme.internal", Visibility::Spi);

    assert_eq!(
        f.index.resolve_annotations(&f.internal_type).unwrap().visibility,
        Visibility::Spi
    );
    assert_eq!(
        f.index.resolve_annotations(&f.api_type).unwrap().visibility,
        Visibility::Api
    );
    assert!(f
        .index
        .resolve_annotations(&ElementDescriptor::package("com.acme.aaa"))
        .is_none());
}

#[test]
fn test_unreadable_manifest_keeps_package_visibility() {
    let f = fixture();
    f.index.resolve_annotations(&f.api_type);

    f.source.set_manifest_failing(true);
    assert_eq!(
        f.index.resolve_annotations(&f.api_type).unwrap().visibility,
        Visibility::Api
    );
}

#[test]
fn test_nested_types_come_from_enclosing_declaration() {
    let source = Arc::new(InMemorySource::new());
    let outer = ElementDescriptor::type_("p", "Outer");
    let inner = outer.nested_type("Inner");
    source.declare_type(
        &outer,
        vec![(inner.clone(), Annotations::new(Visibility::Private, RestrictionSet::NO_EXTEND))],
    );
    source.export_package("p", Visibility::Api);
    let index = live_index(&source);

    let resolved = index.resolve_annotations(&inner).unwrap();
    assert_eq!(resolved.visibility, Visibility::Private);
    assert_eq!(resolved.restrictions, RestrictionSet::NO_EXTEND);

    let before = index.node_count();
    let other = outer.nested_type("Other");
    assert_eq!(index.resolve_annotations(&other).unwrap().visibility, Visibility::Api);
    assert_eq!(index.node_count(), before);
}

#[test]
fn test_mutually_referencing_declarations_terminate() {
    let source = Arc::new(InMemorySource::new());
    let a = ElementDescriptor::type_("p", "A");
    let b = ElementDescriptor::type_("p", "B");
    source.declare_type(&a, vec![(b.clone(), restricted(RestrictionSet::NO_EXTEND))]);
    source.declare_type(&b, vec![(a.field("x"), restricted(RestrictionSet::NO_REFERENCE))]);
    let index = live_index(&source);

    index.resolve_annotations(&a);
    let field = index.resolve_annotations(&a.field("x")).unwrap();
    assert_eq!(field.restrictions, RestrictionSet::NO_REFERENCE);
    assert_eq!(index.refresh(&a), Some(RefreshState::Clean));
    assert_eq!(index.refresh(&b), Some(RefreshState::Clean));
}

#[test]
fn test_traversal_synchronizes_with_source() {
    let f = fixture();
    let names: Vec<String> = f
        .index
        .elements()
        .into_iter()
        .map(|(d, a)| format!("{d} {}", a.visibility))
        .collect();
    assert_eq!(
        names,
        vec![
            "com.acme.api API",
            "com.acme.api.Service API",
            "com.acme.api.Service#legacy API",
            "com.acme.internal PRIVATE",
            "com.acme.internal.ServiceImpl PRIVATE",
        ]
    );
}

#[test]
fn test_project_changed_picks_up_new_types() {
    let f = fixture();
    f.index.elements();

    let added = ElementDescriptor::type_("com.acme.api", "Added");
    f.source.declare_type(&added, vec![]);
    let contains = |index: &AnnotationIndex| index.elements().iter().any(|(d, _)| *d == added);
    assert!(!contains(&f.index));

    f.index.project_changed();
    assert!(contains(&f.index));
}

#[test]
fn test_clean_drops_all_nodes() {
    let f = fixture();
    f.index.elements();
    assert!(f.index.node_count() > 0);

    f.index.clean();
    assert_eq!(f.index.node_count(), 0);
    assert_eq!(
        f.index.resolve_annotations(&f.api_type).unwrap().restrictions,
        RestrictionSet::NO_IMPLEMENT
    );
}
