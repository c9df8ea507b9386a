mod common;

use symref::diagnostics::Replacement;
use symref::error::Error;
use symref::hasher::stable_hash;
use symref::resolver::{ExternalResolver, FailureKind, HierarchySource};
use symref::snapshot::LinkResolutionSnapshot;
use symref::symbol::Relationship;

use crate::common::mixed_context;

const RESIZE_INT: &str = "s:14MixedFramework7OptionsO6resize2toySi_tF";
const RESIZE_DOUBLE: &str = "s:14MixedFramework7OptionsO6resize2toySd_tF";

/// Links exercising every outcome, resolved by both resolvers.
fn authored_links() -> Vec<String> {
    vec![
        "/MixedFramework/Widget".to_string(),
        "/MixedFramework/Widget/spin()".to_string(),
        "/MixedFramework/MFWidget/spin".to_string(),
        "/MixedFramework/Widget-class".to_string(),
        "/MixedFramework/Widget-struct".to_string(),
        "/MixedFramework/Options/first".to_string(),
        "/MixedFramework/Options/first-enum.case".to_string(),
        "/MixedFramework/Options/first-type.property".to_string(),
        "/MixedFramework/Options/resize(to:)".to_string(),
        format!("/MixedFramework/Options/resize(to:)-{}", stable_hash(RESIZE_INT)),
        format!("/MixedFramework/Options/resize(to:)-method-{}", stable_hash(RESIZE_DOUBLE)),
        "/MixedFramework/Options/init".to_string(),
        "/MixedFramework/Options/init-init".to_string(),
        "/MixedFramework/Options/resize(for:)".to_string(),
        "/MixedFramework/Options/resize(for:)-method".to_string(),
        "/MixedFramework/Optoins".to_string(),
        "/MixedFramework/Spinning/spin()".to_string(),
        "spin()".to_string(),
        "spin".to_string(),
        "/MixedFramework/MFWidget/name".to_string(),
        "Options/first-enum.case".to_string(),
        "/MixedFramework/Widget/name-property/extra".to_string(),
        "/".to_string(),
    ]
}

#[test]
fn fixture_merges_without_problems() {
    let (context, engine) = mixed_context();
    assert!(engine.is_empty(), "unexpected problems: {:?}", engine.problems());

    let widget = context.store().symbol("c:objc(cs)MFWidget").unwrap();
    assert!(widget.relationships.values().any(|section| {
        section.relationships.iter().any(|r| matches!(r, Relationship::ConformsTo { .. }))
    }));
    let requirement = context.store().symbol("s:14MixedFramework8SpinningP4spinyyF").unwrap();
    assert!(requirement.is_required);

    let options = context.store().symbol("s:14MixedFramework7OptionsO").unwrap();
    let fallbacks: Vec<_> = options.relationships.values().flat_map(|s| s.target_fallbacks.values()).collect();
    assert_eq!(fallbacks, ["Swift.Equatable"]);
}

#[test]
fn swift_and_objective_c_spellings_share_a_page() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let swift = resolver.resolve("/MixedFramework/Widget/spin()", None).unwrap();
    let objc = resolver.resolve("/MixedFramework/MFWidget/spin", None).unwrap();
    assert_eq!(swift, objc);
    assert_eq!(swift.absolute_string(), "doc://org.swift.MixedFramework/documentation/MixedFramework/Widget/spin()");
}

#[test]
fn kind_collisions_need_a_kind_suffix() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let failure = resolver.resolve("/MixedFramework/Options/first", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Ambiguous);
    assert_eq!(failure.solutions.len(), 2);

    let case = resolver.resolve("/MixedFramework/Options/first-enum.case", None).unwrap();
    assert_eq!(case.path, "/documentation/MixedFramework/Options/first-swift.enum.case");
    let property = resolver.resolve("/MixedFramework/Options/first-type.property", None).unwrap();
    assert_eq!(property.path, "/documentation/MixedFramework/Options/first-swift.type.property");
}

#[test]
fn overloads_need_a_hash_suffix() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let failure = resolver.resolve("/MixedFramework/Options/resize(to:)", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Ambiguous);
    for solution in &failure.solutions {
        let fixed = solution.apply("/MixedFramework/Options/resize(to:)");
        assert!(resolver.resolve(&fixed, None).is_ok(), "{fixed} should resolve");
    }

    for id in [RESIZE_INT, RESIZE_DOUBLE] {
        let link = format!("/MixedFramework/Options/resize(to:)-{}", stable_hash(id));
        let reference = resolver.resolve(&link, None).unwrap();
        assert_eq!(&reference, context.reference(id).unwrap());
    }
}

#[test]
fn redundant_suffixes_are_accepted() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let plain = resolver.resolve("/MixedFramework/Widget", None).unwrap();
    assert_eq!(resolver.resolve("/MixedFramework/Widget-class", None).unwrap(), plain);
    assert_eq!(resolver.resolve("/MixedFramework/Widget-swift.class", None).unwrap(), plain);

    let failure = resolver.resolve("/MixedFramework/Widget-struct", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidDisambiguation);
    let fixed = failure.solutions[0].apply("/MixedFramework/Widget-struct");
    assert_eq!(fixed, "/MixedFramework/Widget");
}

#[test]
fn redundant_kind_and_hash_suffixes_are_accepted() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    for id in [RESIZE_INT, RESIZE_DOUBLE] {
        let link = format!("/MixedFramework/Options/resize(to:)-method-{}", stable_hash(id));
        assert_eq!(&resolver.resolve(&link, None).unwrap(), context.reference(id).unwrap(), "{link}");
    }

    let widget = context.reference("c:objc(cs)MFWidget").unwrap();
    let link = format!("/MixedFramework/Widget-class-{}", stable_hash("c:objc(cs)MFWidget"));
    assert_eq!(&resolver.resolve(&link, None).unwrap(), widget);
}

#[test]
fn missing_argument_lists_point_at_the_declared_spelling() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let authored = "/MixedFramework/Options/init-init";
    let failure = resolver.resolve(authored, None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::DoesNotExist);
    assert_eq!(failure.solutions.len(), 1);
    assert_eq!(failure.solutions[0].summary, "Replace 'init' with 'init()'");
    assert_eq!(failure.solutions[0].replacements, [Replacement { end: 28, start: 24, text: "init()".to_string() }]);
    let fixed = failure.solutions[0].apply(authored);
    assert_eq!(fixed, "/MixedFramework/Options/init()-init");
    assert_eq!(&resolver.resolve(&fixed, None).unwrap(), context.reference("s:14MixedFramework7OptionsOACycfc").unwrap());

    let failure = resolver.resolve("/MixedFramework/Options/init", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::PathComponentNotFound);
    assert!(failure.solutions.iter().any(|s| s.replacements == [Replacement { end: 28, start: 24, text: "init()".to_string() }]));
}

#[test]
fn relative_links_search_up_from_the_origin() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let from_property = resolver.resolve("spin()", Some("c:objc(cs)MFWidget(py)name")).unwrap();
    assert_eq!(from_property.path, "/documentation/MixedFramework/Widget/spin()");

    let from_protocol = resolver.resolve("spin()", Some("s:14MixedFramework8SpinningP")).unwrap();
    assert_eq!(from_protocol.path, "/documentation/MixedFramework/Spinning/spin()");

    let sibling = resolver.resolve("Options/first-enum.case", Some("c:objc(cs)MFWidget")).unwrap();
    assert_eq!(sibling.path, "/documentation/MixedFramework/Options/first-swift.enum.case");
}

#[test]
fn relative_links_use_either_language_spelling() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();
    let spin = context.reference("c:objc(cs)MFWidget(im)spin").unwrap();

    assert_eq!(&resolver.resolve("spin", Some("c:objc(cs)MFWidget(py)name")).unwrap(), spin);
    assert_eq!(&resolver.resolve("spin()", Some("c:objc(cs)MFWidget(py)name")).unwrap(), spin);
    assert_eq!(&resolver.resolve("MFWidget/spin", Some("s:14MixedFramework7OptionsO")).unwrap(), spin);
    assert_eq!(&resolver.resolve("/MixedFramework/Widget/spin", None).unwrap(), spin);
    assert_eq!(&resolver.resolve("/MixedFramework/MFWidget/spin()", None).unwrap(), spin);
}

#[test]
fn cyclic_snapshots_are_rejected() {
    let (context, _) = mixed_context();
    let mut snapshot = context.snapshot();
    let nodes = &mut snapshot.hierarchy.nodes;
    let module_element = nodes[0].children.remove(0);
    let child = nodes[module_element.node].children[0].node;
    nodes[child].children.push(module_element);

    match ExternalResolver::new(snapshot, context.linkable_summaries()) {
        Err(Error::SnapshotCorrupt { reason }) => assert!(reason.contains("unreachable"), "{reason}"),
        other => panic!("expected a corrupt snapshot, got {other:?}"),
    }
}

#[test]
fn typos_suggest_near_misses() {
    let (context, _) = mixed_context();
    let resolver = context.local_resolver();

    let failure = resolver.resolve("/MixedFramework/Optoins", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::PathComponentNotFound);
    assert!(failure.solutions.iter().any(|s| s.apply("/MixedFramework/Optoins") == "/MixedFramework/Options"));

    let failure = resolver.resolve("/MixedFramework/Options/resize(for:)", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::PathComponentNotFound);
    assert!(failure.solutions.iter().any(|s| s.summary.contains("resize(to:)")));

    let failure = resolver.resolve("/MixedFramework/Options/resize(for:)-method", None).unwrap_err();
    assert_eq!(failure.kind, FailureKind::DoesNotExist);
    let fixed = failure.solutions[0].apply("/MixedFramework/Options/resize(for:)-method");
    assert_eq!(fixed, "/MixedFramework/Options/resize(to:)-method");
}

#[test]
fn external_resolver_answers_like_the_local_one() {
    let (context, _) = mixed_context();
    let encoded = context.snapshot().encode().unwrap();
    let decoded = LinkResolutionSnapshot::decode(&encoded).unwrap();
    let external = ExternalResolver::new(decoded, context.linkable_summaries()).unwrap();
    let local = context.local_resolver();

    for link in authored_links() {
        for from in [None, Some("c:objc(cs)MFWidget(py)name")] {
            match (local.resolve(&link, from), external.resolve(&link, from)) {
                (Ok(l), Ok(e)) => assert_eq!(l, e, "{link}"),
                (Err(l), Err(e)) => {
                    assert_eq!(l.kind, e.kind, "{link}");
                    assert_eq!(l.message, e.message, "{link}");
                    assert_eq!(l.solutions.len(), e.solutions.len(), "{link}");
                    for (l, e) in l.solutions.iter().zip(&e.solutions) {
                        assert_eq!(l.summary, e.summary, "{link}");
                        assert_eq!(l.replacements, e.replacements, "{link}");
                    }
                },
                (l, e) => panic!("{link}: local {l:?} but external {e:?}"),
            }
        }
    }
}

#[test]
fn resolvers_can_be_shared_across_threads() {
    let (context, _) = mixed_context();
    let external = ExternalResolver::new(context.snapshot(), context.linkable_summaries()).unwrap();
    let links = authored_links();
    let expected: Vec<_> = links.iter().map(|link| external.resolve(link, None).ok()).collect();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let local = context.local_resolver();
                for (link, want) in links.iter().zip(&expected) {
                    assert_eq!(&external.resolve(link, None).ok(), want);
                    assert_eq!(&local.resolve(link, None).ok(), want);
                }
            });
        }
    });
}
