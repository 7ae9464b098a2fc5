use shrike_graph::{
    AccessFlags, ClassData, FieldData, FieldSig, GraphBuilder, MethodData, MethodDesc, MethodRef,
    MethodSig, ProgramGraph, TypeName,
};
use shrike_resolve::{ResolutionOutcome, Resolver};

fn sig(name: &str) -> MethodSig {
    MethodSig::new(name, MethodDesc::nullary_void())
}

fn object_class() -> ClassData {
    ClassData::new("java.lang.Object")
        .library()
        .method(MethodData::new("toString").desc([], TypeName::string()))
        .method(
            MethodData::new("clone")
                .access(AccessFlags::PROTECTED)
                .desc([], TypeName::object()),
        )
}

#[test]
fn resolves_along_superclass_chain() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Base").method(MethodData::new("run")))
        .add_class(ClassData::new("Derived").extends("Base"))
        .build();
    let resolver = Resolver::new(&graph);

    let outcome = resolver.resolve_method_on_class(&TypeName::new("Derived"), &sig("run"));
    let target = outcome.single_target().expect("run resolves");
    assert_eq!(graph.method(target).method.holder, TypeName::new("Base"));
}

#[test]
fn resolution_is_deterministic() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Base").method(MethodData::new("run")))
        .add_class(ClassData::new("Derived").extends("Base"))
        .build();
    let resolver = Resolver::new(&graph);

    let holder = TypeName::new("Derived");
    let first = resolver.resolve_method_on_class(&holder, &sig("run"));
    let second = resolver.resolve_method_on_class(&holder, &sig("run"));
    assert_eq!(first, second);
}

#[test]
fn class_resolution_of_interface_holder_is_incompatible() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("I").interface().method(MethodData::new("m").abstract_()))
        .build();
    let resolver = Resolver::new(&graph);

    assert_eq!(
        resolver.resolve_method_on_class(&TypeName::new("I"), &sig("m")),
        ResolutionOutcome::IncompatibleClass
    );
}

#[test]
fn interface_resolution_of_class_holder_is_incompatible() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("C").method(MethodData::new("m")))
        .build();
    let resolver = Resolver::new(&graph);

    assert_eq!(
        resolver.resolve_method_on_interface(&TypeName::new("C"), &sig("m")),
        ResolutionOutcome::IncompatibleClass
    );
}

#[test]
fn missing_holder_is_class_not_found() {
    let graph = GraphBuilder::new().add_class(object_class()).build();
    let resolver = Resolver::new(&graph);

    assert_eq!(
        resolver.resolve_method_on_class(&TypeName::new("Missing"), &sig("m")),
        ResolutionOutcome::ClassNotFound(TypeName::new("Missing"))
    );
}

#[test]
fn array_invocations_target_object_except_clone() {
    let graph = GraphBuilder::new().add_class(object_class()).build();
    let resolver = Resolver::new(&graph);

    let array = TypeName::new("int[]");
    let to_string = MethodSig::new("toString", MethodDesc::new([], TypeName::string()));
    let outcome = resolver.resolve_method_on_class(&array, &to_string);
    let target = outcome.single_target().expect("toString resolves");
    assert_eq!(graph.method(target).method.holder, TypeName::object());

    let clone = MethodSig::new("clone", MethodDesc::new([], TypeName::object()));
    assert_eq!(
        resolver.resolve_method_on_class(&array, &clone),
        ResolutionOutcome::ArrayCloneTarget
    );
}

#[test]
fn interface_resolution_finds_inherited_object_methods() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("I").interface())
        .build();
    let resolver = Resolver::new(&graph);

    let to_string = MethodSig::new("toString", MethodDesc::new([], TypeName::string()));
    let target = resolver
        .resolve_method_on_interface(&TypeName::new("I"), &to_string)
        .single_target()
        .expect("toString resolves via Object");
    assert_eq!(graph.method(target).method.holder, TypeName::object());

    // clone is protected on Object, so it is not inherited by interfaces.
    let clone = MethodSig::new("clone", MethodDesc::new([], TypeName::object()));
    assert_eq!(
        resolver.resolve_method_on_interface(&TypeName::new("I"), &clone),
        ResolutionOutcome::NoSuchMethod
    );
}

#[test]
fn unique_default_method_resolves() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("I").interface().method(MethodData::new("m")))
        .add_class(ClassData::new("X").implements("I"))
        .build();
    let resolver = Resolver::new(&graph);

    let target = resolver
        .resolve_method_on_class(&TypeName::new("X"), &sig("m"))
        .single_target()
        .expect("default resolves");
    assert_eq!(graph.method(target).method.holder, TypeName::new("I"));
}

#[test]
fn two_unrelated_defaults_are_ambiguous() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("A").interface().method(MethodData::new("m")))
        .add_class(ClassData::new("B").interface().method(MethodData::new("m")))
        .add_class(ClassData::new("X").implements("A").implements("B"))
        .build();
    let resolver = Resolver::new(&graph);

    let outcome = resolver.resolve_method_on_class(&TypeName::new("X"), &sig("m"));
    match &outcome {
        ResolutionOutcome::AmbiguousDefaultTargets(targets) => {
            assert_eq!(targets.len(), 2);
            let holders: Vec<_> = targets
                .iter()
                .map(|id| graph.method(*id).method.holder.clone())
                .collect();
            assert!(holders.contains(&TypeName::new("A")));
            assert!(holders.contains(&TypeName::new("B")));
        }
        other => panic!("expected ambiguous defaults, got {other:?}"),
    }
    assert_eq!(outcome.single_target(), None);
}

#[test]
fn more_specific_default_shadows_inherited_one() {
    // Sub redeclares m as a default, so Super's default is not maximally
    // specific and resolution is unambiguous.
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Super").interface().method(MethodData::new("m")))
        .add_class(
            ClassData::new("Sub")
                .interface()
                .implements("Super")
                .method(MethodData::new("m")),
        )
        .add_class(ClassData::new("X").implements("Sub"))
        .build();
    let resolver = Resolver::new(&graph);

    let target = resolver
        .resolve_method_on_class(&TypeName::new("X"), &sig("m"))
        .single_target()
        .expect("Sub.m resolves");
    assert_eq!(graph.method(target).method.holder, TypeName::new("Sub"));
}

#[test]
fn abstract_interface_method_is_returned_when_no_default_exists() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("I").interface().method(MethodData::new("m").abstract_()))
        .add_class(ClassData::new("X").abstract_().implements("I"))
        .build();
    let resolver = Resolver::new(&graph);

    let target = resolver
        .resolve_method_on_class(&TypeName::new("X"), &sig("m"))
        .single_target()
        .expect("abstract interface method resolves");
    assert!(graph.method(target).access.is_abstract());
}

#[test]
fn signature_polymorphic_invoke_on_method_handle() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(
            ClassData::new("java.lang.invoke.MethodHandle")
                .library()
                .method(
                    MethodData::new("invoke")
                        .desc(
                            [TypeName::object().array_of()],
                            TypeName::object(),
                        )
                        .native()
                        .varargs(),
                ),
        )
        .build();
    let resolver = Resolver::new(&graph);

    // The reference uses a site-specific descriptor; resolution still finds
    // the polymorphic (Object[])Object overload.
    let site_sig = MethodSig::new(
        "invoke",
        MethodDesc::new([TypeName::string()], TypeName::void()),
    );
    let target = resolver
        .resolve_method_on_class(&TypeName::method_handle(), &site_sig)
        .single_target()
        .expect("polymorphic invoke resolves");
    assert_eq!(
        graph.method(target).method.sig.desc,
        ProgramGraph::polymorphic_desc()
    );
}

#[test]
fn field_resolution_prefers_interfaces_over_superclass() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(
            ClassData::new("I")
                .interface()
                .field(FieldData::new("f", "int").static_()),
        )
        .add_class(ClassData::new("Base").field(FieldData::new("f", "int")))
        .add_class(ClassData::new("C").extends("Base").implements("I"))
        .build();
    let resolver = Resolver::new(&graph);

    let field = resolver
        .resolve_field(&TypeName::new("C"), &FieldSig::new("f", "int"))
        .expect("f resolves");
    assert_eq!(graph.field(field).field.holder, TypeName::new("I"));
}

#[test]
fn field_resolution_falls_back_to_superclass() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Base").field(FieldData::new("f", "int")))
        .add_class(ClassData::new("C").extends("Base"))
        .build();
    let resolver = Resolver::new(&graph);

    let field = resolver
        .resolve_field(&TypeName::new("C"), &FieldSig::new("f", "int"))
        .expect("f resolves");
    assert_eq!(graph.field(field).field.holder, TypeName::new("Base"));

    assert!(resolver
        .resolve_field(&TypeName::new("C"), &FieldSig::new("g", "int"))
        .is_none());
}

#[test]
fn dispatch_filters_reject_kind_mismatches() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(
            ClassData::new("C")
                .method(MethodData::new("s").static_())
                .method(MethodData::new("v")),
        )
        .build();
    let resolver = Resolver::new(&graph);

    let static_res = resolver.resolve_method_on_class(&TypeName::new("C"), &sig("s"));
    let virtual_res = resolver.resolve_method_on_class(&TypeName::new("C"), &sig("v"));

    assert!(resolver.dispatch_static_invoke(&static_res).is_some());
    assert!(resolver.dispatch_static_invoke(&virtual_res).is_none());
    assert!(resolver.dispatch_direct_invoke(&virtual_res).is_some());
    assert!(resolver.dispatch_direct_invoke(&static_res).is_none());
}

#[test]
fn super_invoke_rewrites_to_callers_superclass() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Base").method(MethodData::new("m")))
        .add_class(ClassData::new("Mid").extends("Base"))
        .add_class(ClassData::new("Leaf").extends("Mid").method(MethodData::new("m")))
        .build();
    let resolver = Resolver::new(&graph);

    let reference = MethodRef::new("Base", sig("m"));
    let rewritten = resolver.super_invoke_target(&reference, &TypeName::new("Leaf"));
    assert_eq!(rewritten.holder, TypeName::new("Mid"));

    let target = resolver
        .lookup_super_target(&reference, &TypeName::new("Leaf"))
        .expect("super target");
    assert_eq!(graph.method(target).method.holder, TypeName::new("Base"));
}

#[test]
fn super_invoke_on_interface_reference_is_unchanged() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("I").interface().method(MethodData::new("m")))
        .add_class(ClassData::new("C").implements("I").method(MethodData::new("m")))
        .build();
    let resolver = Resolver::new(&graph);

    let reference = MethodRef::new("I", sig("m"));
    let rewritten = resolver.super_invoke_target(&reference, &TypeName::new("C"));
    assert_eq!(rewritten, reference);

    let target = resolver
        .lookup_super_target(&reference, &TypeName::new("C"))
        .expect("interface super target");
    assert_eq!(graph.method(target).method.holder, TypeName::new("I"));
}

#[test]
fn virtual_dispatch_targets_collect_overrides() {
    let graph = GraphBuilder::new()
        .add_class(object_class())
        .add_class(ClassData::new("Base").method(MethodData::new("m")))
        .add_class(ClassData::new("Mid").extends("Base"))
        .add_class(ClassData::new("Leaf").extends("Mid").method(MethodData::new("m")))
        .add_class(ClassData::new("Other").method(MethodData::new("m")))
        .build();
    let resolver = Resolver::new(&graph);

    let resolved = resolver
        .resolve_method_on_class(&TypeName::new("Base"), &sig("m"))
        .single_target()
        .expect("Base.m");
    let targets = resolver.virtual_dispatch_targets(resolved);
    let holders: Vec<_> = targets
        .iter()
        .map(|id| graph.method(*id).method.holder.as_str().to_string())
        .collect();
    assert_eq!(targets.len(), 2);
    assert!(holders.contains(&"Base".to_string()));
    assert!(holders.contains(&"Leaf".to_string()));
}
