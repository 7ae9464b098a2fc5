//! The program graph for the shrinker's liveness analysis.
//!
//! Classes, methods and fields are loaded once (by an external loader) into
//! arena-backed tables addressed by integer handles; reference values
//! (`TypeName`, `MethodRef`, `FieldRef`) are structural keys. The graph is
//! immutable after construction and may be shared read-only across threads.

#![forbid(unsafe_code)]

mod builder;
mod flags;
mod graph;
mod refs;
mod trace;
mod ty;

pub use crate::builder::{ClassData, FieldData, GraphBuilder, MethodData};
pub use crate::flags::{AccessFlags, Visibility};
pub use crate::graph::{
    ClassDef, ClassId, ClassOrigin, ConstValue, FieldDef, FieldId, MethodDef, MethodId,
    ProgramGraph,
};
pub use crate::refs::{
    FieldRef, FieldSig, ItemRef, MethodDesc, MethodRef, MethodSig, CLASS_INITIALIZER,
    INSTANCE_INITIALIZER,
};
pub use crate::trace::{
    CodeInfo, CodeRef, CodeTracer, GraphCodeTracer, ReferenceSink, ReflectiveUse,
};
pub use crate::ty::TypeName;
