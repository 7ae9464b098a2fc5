#![allow(dead_code)]

use shrike_graph::{
    AccessFlags, ClassData, FieldRef, FieldSig, MethodData, MethodDesc, MethodRef, MethodSig,
    ProgramGraph, TypeName, INSTANCE_INITIALIZER,
};
use shrike_shake::{Enqueuer, LivenessResult, RootSet, ShakeOptions};

/// A minimal `java.lang.Object` library class for test graphs.
pub fn object() -> ClassData {
    ClassData::new("java.lang.Object")
        .library()
        .method(MethodData::constructor())
        .method(MethodData::new("toString").desc([], TypeName::string()))
        .method(
            MethodData::new("clone")
                .access(AccessFlags::PROTECTED)
                .desc([], TypeName::object()),
        )
}

pub fn sig(name: &str) -> MethodSig {
    MethodSig::new(name, MethodDesc::nullary_void())
}

pub fn mref(holder: &str, name: &str) -> MethodRef {
    MethodRef::new(holder, sig(name))
}

pub fn ctor(holder: &str) -> MethodRef {
    mref(holder, INSTANCE_INITIALIZER)
}

pub fn fref(holder: &str, name: &str, ty: &str) -> FieldRef {
    FieldRef::new(holder, FieldSig::new(name, ty))
}

pub fn run(graph: &ProgramGraph, roots: RootSet) -> LivenessResult<'_> {
    run_with(graph, roots, ShakeOptions::default())
}

pub fn run_with<'g>(
    graph: &'g ProgramGraph,
    roots: RootSet,
    options: ShakeOptions,
) -> LivenessResult<'g> {
    Enqueuer::new(graph, roots, options)
        .run()
        .expect("analysis completes")
}
