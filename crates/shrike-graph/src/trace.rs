use crate::graph::{MethodId, ProgramGraph};
use crate::refs::{FieldRef, MethodRef};
use crate::ty::TypeName;

/// A single symbolic reference found in a method body.
///
/// The analysis core never parses bytecode; the bytecode-reading collaborator
/// reports each instruction-level reference through one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeRef {
    InvokeVirtual(MethodRef),
    InvokeInterface(MethodRef),
    InvokeDirect(MethodRef),
    InvokeStatic(MethodRef),
    InvokeSuper(MethodRef),
    InstanceFieldRead(FieldRef),
    InstanceFieldWrite(FieldRef),
    StaticFieldRead(FieldRef),
    StaticFieldWrite(FieldRef),
    NewInstance(TypeName),
    ConstClass(TypeName),
}

/// A reflective operation whose argument the bytecode reader could determine
/// statically (a literal class constant or string).
///
/// These are deliberately not ordinary [`CodeRef`]s: they are deferred until
/// the worklist drains so that reflective consequences never race ordinary
/// tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectiveUse {
    ClassForName(TypeName),
    ClassNewInstance(TypeName),
    EnumValueOf(TypeName),
    ServiceLoaderLoad(TypeName),
}

/// The opaque view of a method body carried by the program graph.
///
/// The analysis only ever asks whether the body may have observable side
/// effects and which references it registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeInfo {
    pub may_have_side_effects: bool,
    pub refs: Vec<CodeRef>,
    pub reflective_uses: Vec<ReflectiveUse>,
}

impl CodeInfo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            may_have_side_effects: true,
            refs: Vec::new(),
            reflective_uses: Vec::new(),
        }
    }

    #[must_use]
    pub fn without_side_effects(mut self) -> Self {
        self.may_have_side_effects = false;
        self
    }

    #[must_use]
    pub fn invoke_virtual(mut self, method: MethodRef) -> Self {
        self.refs.push(CodeRef::InvokeVirtual(method));
        self
    }

    #[must_use]
    pub fn invoke_interface(mut self, method: MethodRef) -> Self {
        self.refs.push(CodeRef::InvokeInterface(method));
        self
    }

    #[must_use]
    pub fn invoke_direct(mut self, method: MethodRef) -> Self {
        self.refs.push(CodeRef::InvokeDirect(method));
        self
    }

    #[must_use]
    pub fn invoke_static(mut self, method: MethodRef) -> Self {
        self.refs.push(CodeRef::InvokeStatic(method));
        self
    }

    #[must_use]
    pub fn invoke_super(mut self, method: MethodRef) -> Self {
        self.refs.push(CodeRef::InvokeSuper(method));
        self
    }

    #[must_use]
    pub fn read_instance_field(mut self, field: FieldRef) -> Self {
        self.refs.push(CodeRef::InstanceFieldRead(field));
        self
    }

    #[must_use]
    pub fn write_instance_field(mut self, field: FieldRef) -> Self {
        self.refs.push(CodeRef::InstanceFieldWrite(field));
        self
    }

    #[must_use]
    pub fn read_static_field(mut self, field: FieldRef) -> Self {
        self.refs.push(CodeRef::StaticFieldRead(field));
        self
    }

    #[must_use]
    pub fn write_static_field(mut self, field: FieldRef) -> Self {
        self.refs.push(CodeRef::StaticFieldWrite(field));
        self
    }

    #[must_use]
    pub fn new_instance(mut self, ty: impl Into<TypeName>) -> Self {
        self.refs.push(CodeRef::NewInstance(ty.into()));
        self
    }

    #[must_use]
    pub fn const_class(mut self, ty: impl Into<TypeName>) -> Self {
        self.refs.push(CodeRef::ConstClass(ty.into()));
        self
    }

    #[must_use]
    pub fn reflective(mut self, use_: ReflectiveUse) -> Self {
        self.reflective_uses.push(use_);
        self
    }
}

impl Default for CodeInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for the references registered by one method body.
pub trait ReferenceSink {
    fn register_code_ref(&mut self, reference: &CodeRef);
    fn register_reflective_use(&mut self, use_: &ReflectiveUse);
}

/// Per-method code-reference registration callback, supplied by the bytecode
/// reader. Invoked once for every method that becomes live.
pub trait CodeTracer {
    fn register_code_references(&self, method: MethodId, sink: &mut dyn ReferenceSink);
}

/// Tracer that replays the [`CodeInfo`] embedded in the program graph.
pub struct GraphCodeTracer<'g> {
    graph: &'g ProgramGraph,
}

impl<'g> GraphCodeTracer<'g> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self { graph }
    }
}

impl CodeTracer for GraphCodeTracer<'_> {
    fn register_code_references(&self, method: MethodId, sink: &mut dyn ReferenceSink) {
        let Some(code) = self.graph.method(method).code.as_ref() else {
            return;
        };
        for reference in &code.refs {
            sink.register_code_ref(reference);
        }
        for use_ in &code.reflective_uses {
            sink.register_reflective_use(use_);
        }
    }
}
