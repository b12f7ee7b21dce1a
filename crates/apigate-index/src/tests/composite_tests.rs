use std::sync::Arc;

use crate::{
    AccessLevel, AnnotationIndex, ApiDescription, ComponentId, CompositeIndex, ElementDescriptor,
    IndexError, InMemorySource, RestrictionSet, Visibility,
};

fn host_and_fragment() -> (AnnotationIndex, AnnotationIndex, CompositeIndex) {
    let host = AnnotationIndex::new(Some(ComponentId::new("host")));
    let fragment = AnnotationIndex::new(Some(ComponentId::new("host.fragment")));
    let parts: Vec<Arc<dyn ApiDescription>> =
        vec![Arc::new(host.clone()), Arc::new(fragment.clone())];
    (host, fragment, CompositeIndex::new(parts))
}

#[test]
fn test_first_part_with_result_wins() {
    let (host, fragment, composite) = host_and_fragment();
    let ty = ElementDescriptor::type_("p", "T");
    host.set_visibility(&ty, Visibility::Private).unwrap();
    fragment.set_visibility(&ty, Visibility::Spi).unwrap();
    fragment.set_restrictions(&ty, RestrictionSet::NO_EXTEND).unwrap();

    let resolved = composite.resolve_annotations(&ty).unwrap();
    assert_eq!(resolved.visibility, Visibility::Private);
    assert_eq!(resolved.restrictions, RestrictionSet::NO_RESTRICTIONS);
}

#[test]
fn test_falls_through_to_later_parts() {
    let (_, fragment, composite) = host_and_fragment();
    let ty = ElementDescriptor::type_("frag.only", "T");
    fragment.set_visibility(&ty, Visibility::Spi).unwrap();

    assert_eq!(
        composite.resolve_annotations(&ty).unwrap().visibility,
        Visibility::Spi
    );
    assert!(composite
        .resolve_annotations(&ElementDescriptor::package("unknown"))
        .is_none());
}

#[test]
fn test_writes_go_to_first_accepting_part() {
    let (host, fragment, composite) = host_and_fragment();
    let pkg = ElementDescriptor::package("p");
    composite.set_visibility(&pkg, Visibility::Private).unwrap();

    assert!(host.resolve_annotations(&pkg).is_some());
    assert!(fragment.resolve_annotations(&pkg).is_none());
}

#[test]
fn test_write_falls_back_when_primary_rejects() {
    // a live primary rejects writes to elements its source does not declare
    let source = Arc::new(InMemorySource::new());
    let live = AnnotationIndex::live(None, source.clone(), source);
    let fallback = AnnotationIndex::new(None);
    let parts: Vec<Arc<dyn ApiDescription>> =
        vec![Arc::new(live.clone()), Arc::new(fallback.clone())];
    let composite = CompositeIndex::new(parts);

    let ty = ElementDescriptor::type_("p", "T");
    composite.set_restrictions(&ty, RestrictionSet::NO_OVERRIDE).unwrap();
    assert_eq!(
        fallback.resolve_annotations(&ty).unwrap().restrictions,
        RestrictionSet::NO_OVERRIDE
    );
}

#[test]
fn test_all_parts_rejecting_reports_last_failure() {
    let first_source = Arc::new(InMemorySource::new());
    let second_source = Arc::new(InMemorySource::new());
    let parts: Vec<Arc<dyn ApiDescription>> = vec![
        Arc::new(AnnotationIndex::live(
            Some(ComponentId::new("first")),
            first_source.clone(),
            first_source,
        )),
        Arc::new(AnnotationIndex::live(
            Some(ComponentId::new("second")),
            second_source.clone(),
            second_source,
        )),
    ];
    let composite = CompositeIndex::new(parts);

    let err = composite
        .set_visibility(&ElementDescriptor::package("p"), Visibility::Api)
        .unwrap_err();
    assert!(matches!(err, IndexError::ElementNotFound { ref owner, .. } if owner == "second"));

    let empty = CompositeIndex::default();
    assert!(empty
        .set_visibility(&ElementDescriptor::package("p"), Visibility::Api)
        .is_err());
}

#[test]
fn test_accept_visits_each_part_in_order() {
    let (host, fragment, composite) = host_and_fragment();
    host.set_visibility(&ElementDescriptor::package("z"), Visibility::Api)
        .unwrap();
    fragment
        .set_visibility(&ElementDescriptor::package("a"), Visibility::Api)
        .unwrap();

    struct Packages(Vec<String>);
    impl crate::DescriptionVisitor for Packages {
        fn visit_element(
            &mut self,
            element: &ElementDescriptor,
            _annotations: &crate::Annotations,
        ) -> bool {
            self.0.push(element.to_string());
            false
        }
    }

    let mut packages = Packages(Vec::new());
    composite.accept(&mut packages);
    assert_eq!(packages.0, vec!["z", "a"]);
}

#[test]
fn test_access_levels_resolve_through_parts() {
    let (_, fragment, composite) = host_and_fragment();
    let pkg = ElementDescriptor::package("p.internal");
    let friend = ComponentId::new("friend");
    fragment
        .set_access_level(&friend, &pkg, AccessLevel::Friend)
        .unwrap();
    assert_eq!(
        composite.resolve_access_level(&friend, &pkg),
        Some(AccessLevel::Friend)
    );
}
