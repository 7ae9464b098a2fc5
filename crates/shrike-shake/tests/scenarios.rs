mod common;

use common::{ctor, fref, mref, object, run};

use shrike_graph::{
    ClassData, CodeInfo, FieldData, GraphBuilder, ItemRef, MethodData, TypeName,
};
use shrike_shake::{KeepReason, RootSet};

fn keep_main(roots: &mut RootSet) {
    let rule = roots.add_rule("-keep class Main { main }");
    roots.keep(ItemRef::Method(mref("Main", "main")), rule);
}

/// `Main.main` constructs `A` and calls a virtual method that only `Base`
/// declares: everything on the path is live, `Base` stays uninstantiated.
#[test]
fn virtual_call_resolving_to_superclass() {
    let graph = GraphBuilder::new()
        .add_class(object())
        .add_class(
            ClassData::new("Main").method(
                MethodData::new("main").static_().code(
                    CodeInfo::new()
                        .new_instance("A")
                        .invoke_direct(ctor("A"))
                        .invoke_virtual(mref("A", "virtualMethod")),
                ),
            ),
        )
        .add_class(ClassData::new("Base").method(MethodData::new("virtualMethod")))
        .add_class(ClassData::new("A").extends("Base").method(MethodData::constructor()))
        .build();

    let mut roots = RootSet::new();
    keep_main(&mut roots);
    let result = run(&graph, roots);

    let live: Vec<String> = result
        .live_classes()
        .into_iter()
        .map(|ty| ty.as_str().to_string())
        .collect();
    assert_eq!(live, vec!["A", "Base", "Main"]);

    let live_methods = result.live_methods();
    assert_eq!(
        live_methods,
        vec![
            ctor("A"),
            mref("Base", "virtualMethod"),
            mref("Main", "main"),
        ]
    );

    assert!(result.is_class_instantiated(&TypeName::new("A")));
    assert!(result.is_class_live(&TypeName::new("Base")));
    assert!(!result.is_class_instantiated(&TypeName::new("Base")));
    assert!(result.live_fields().is_empty());
}

/// A default method is live through the one implementor that is actually
/// instantiated; the other implementor vanishes entirely.
#[test]
fn default_method_keeps_only_instantiated_implementor() {
    let graph = GraphBuilder::new()
        .add_class(object())
        .add_class(
            ClassData::new("Main").method(
                MethodData::new("main").static_().code(
                    CodeInfo::new()
                        .new_instance("X")
                        .invoke_direct(ctor("X"))
                        .invoke_interface(mref("I", "m")),
                ),
            ),
        )
        .add_class(ClassData::new("I").interface().method(MethodData::new("m")))
        .add_class(
            ClassData::new("X")
                .implements("I")
                .method(MethodData::constructor()),
        )
        .add_class(
            ClassData::new("Y")
                .implements("I")
                .method(MethodData::constructor()),
        )
        .build();

    let mut roots = RootSet::new();
    keep_main(&mut roots);
    let result = run(&graph, roots);

    assert!(result.is_method_live(&mref("I", "m")));
    assert!(result.is_class_instantiated(&TypeName::new("X")));
    assert!(result.is_class_live(&TypeName::new("X")));
    assert!(!result.is_class_live(&TypeName::new("Y")));
    assert!(!result.is_method_live(&ctor("Y")));
    assert!(!result
        .live_classes()
        .contains(&TypeName::new("Y")));
}

/// A static field read through a subtype reference resolves to the
/// declaring class; the read forces the declaring class's initializer live.
#[test]
fn field_read_through_subtype_reference() {
    let graph = GraphBuilder::new()
        .add_class(object())
        .add_class(
            ClassData::new("Main").method(
                MethodData::new("main")
                    .static_()
                    .code(CodeInfo::new().read_static_field(fref("D", "F", "int"))),
            ),
        )
        .add_class(
            ClassData::new("C")
                .field(FieldData::new("F", "int").static_())
                .method(
                    MethodData::class_initializer()
                        .code(CodeInfo::new().write_static_field(fref("C", "F", "int"))),
                ),
        )
        .add_class(ClassData::new("D").extends("C"))
        .build();

    let mut roots = RootSet::new();
    keep_main(&mut roots);
    let result = run(&graph, roots);

    assert!(result.is_field_live(&fref("C", "F", "int")));
    assert!(result
        .reasons_for_field(&fref("C", "F", "int"))
        .iter()
        .any(|reason| matches!(reason, KeepReason::FieldReferencedIn(_))));
    assert!(result.is_class_live(&TypeName::new("C")));
    assert!(result.is_method_live(&mref("C", "<clinit>")));
}

/// Permuting the root order leaves the final fact set unchanged.
#[test]
fn root_order_does_not_change_the_live_set() {
    let build = || {
        GraphBuilder::new()
            .add_class(object())
            .add_class(
                ClassData::new("Main").method(
                    MethodData::new("main").static_().code(
                        CodeInfo::new()
                            .new_instance("X")
                            .invoke_direct(ctor("X"))
                            .invoke_interface(mref("I", "m")),
                    ),
                ),
            )
            .add_class(ClassData::new("I").interface().method(MethodData::new("m")))
            .add_class(
                ClassData::new("X")
                    .implements("I")
                    .method(MethodData::constructor())
                    .method(MethodData::new("helper")),
            )
            .add_class(ClassData::new("Util").method(MethodData::new("util").static_()))
            .build()
    };

    let roots_in = |order: &[usize]| {
        let mut roots = RootSet::new();
        let rule = roots.add_rule("-keep roots");
        let items = [
            ItemRef::Method(mref("Main", "main")),
            ItemRef::Class(TypeName::new("X")),
            ItemRef::Method(mref("Util", "util")),
        ];
        for &i in order {
            roots.keep(items[i].clone(), rule);
        }
        roots
    };

    let graph_a = build();
    let graph_b = build();
    let forward = run(&graph_a, roots_in(&[0, 1, 2]));
    let reversed = run(&graph_b, roots_in(&[2, 1, 0]));

    let a = serde_json::to_string(&forward.summary()).expect("summary serializes");
    let b = serde_json::to_string(&reversed.summary()).expect("summary serializes");
    assert_eq!(a, b);
    assert_eq!(forward.targeted_methods(), reversed.targeted_methods());
}

/// Liveness is upward-closed: live members imply live holders, live classes
/// imply live (program) supertypes.
#[test]
fn live_set_is_upward_closed() {
    let graph = GraphBuilder::new()
        .add_class(object())
        .add_class(
            ClassData::new("Main").method(
                MethodData::new("main").static_().code(
                    CodeInfo::new()
                        .new_instance("A")
                        .invoke_direct(ctor("A"))
                        .invoke_virtual(mref("A", "virtualMethod"))
                        .read_static_field(fref("Holder", "VALUE", "int")),
                ),
            ),
        )
        .add_class(ClassData::new("Base").method(MethodData::new("virtualMethod")))
        .add_class(ClassData::new("A").extends("Base").method(MethodData::constructor()))
        .add_class(ClassData::new("Holder").field(FieldData::new("VALUE", "int").static_()))
        .build();

    let mut roots = RootSet::new();
    keep_main(&mut roots);
    let result = run(&graph, roots);

    for method in result.live_methods() {
        assert!(
            result.is_class_live(&method.holder),
            "holder of live method {method} must be live"
        );
    }
    for field in result.live_fields() {
        assert!(
            result.is_class_live(&field.holder),
            "holder of live field {field} must be live"
        );
    }
    for class in result.live_classes() {
        let id = graph.program_class_by_name(&class).expect("program class");
        if let Some(super_name) = &graph.class(id).super_class {
            let super_is_program = graph.program_class_by_name(super_name).is_some();
            assert!(
                !super_is_program || result.is_class_live(super_name),
                "superclass of live class {class} must be live"
            );
        }
    }
}
