use std::collections::HashMap;

use crate::flags::AccessFlags;
use crate::graph::{
    new_class_def, ClassDef, ClassId, ClassOrigin, ConstValue, FieldDef, FieldId, MethodDef,
    MethodId, ProgramGraph,
};
use crate::refs::{FieldRef, FieldSig, MethodDesc, MethodRef, MethodSig};
use crate::trace::CodeInfo;
use crate::ty::TypeName;

/// Fluent description of a class prior to graph construction. Used by
/// loaders and tests alike.
#[derive(Debug)]
pub struct ClassData {
    name: TypeName,
    access: AccessFlags,
    origin: ClassOrigin,
    super_class: Option<TypeName>,
    interfaces: Vec<TypeName>,
    methods: Vec<MethodData>,
    fields: Vec<FieldData>,
}

impl ClassData {
    /// A public program class extending `java.lang.Object`.
    pub fn new(name: impl Into<TypeName>) -> Self {
        let name = name.into();
        let super_class = if name == TypeName::object() {
            None
        } else {
            Some(TypeName::object())
        };
        Self {
            name,
            access: AccessFlags::PUBLIC,
            origin: ClassOrigin::Program,
            super_class,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn interface(mut self) -> Self {
        self.access = self.access | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
        self
    }

    #[must_use]
    pub fn annotation(mut self) -> Self {
        self.access =
            self.access | AccessFlags::INTERFACE | AccessFlags::ABSTRACT | AccessFlags::ANNOTATION;
        self
    }

    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.access = self.access | AccessFlags::ABSTRACT;
        self
    }

    #[must_use]
    pub fn enum_(mut self) -> Self {
        self.access = self.access | AccessFlags::ENUM;
        self
    }

    #[must_use]
    pub fn library(mut self) -> Self {
        self.origin = ClassOrigin::Library;
        self
    }

    #[must_use]
    pub fn extends(mut self, super_class: impl Into<TypeName>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    #[must_use]
    pub fn no_superclass(mut self) -> Self {
        self.super_class = None;
        self
    }

    #[must_use]
    pub fn implements(mut self, iface: impl Into<TypeName>) -> Self {
        self.interfaces.push(iface.into());
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodData) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldData) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug)]
pub struct MethodData {
    sig: MethodSig,
    access: AccessFlags,
    code: Option<CodeInfo>,
}

impl MethodData {
    /// A public `()void` method with an empty body.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            sig: MethodSig::new(name, MethodDesc::nullary_void()),
            access: AccessFlags::PUBLIC,
            code: Some(CodeInfo::new()),
        }
    }

    /// A public no-argument instance initializer.
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(crate::refs::INSTANCE_INITIALIZER)
    }

    /// A static class initializer.
    #[must_use]
    pub fn class_initializer() -> Self {
        Self::new(crate::refs::CLASS_INITIALIZER).access(AccessFlags::STATIC)
    }

    #[must_use]
    pub fn desc(mut self, params: impl IntoIterator<Item = TypeName>, ret: TypeName) -> Self {
        self.sig.desc = MethodDesc::new(params, ret);
        self
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn static_(mut self) -> Self {
        self.access = self.access | AccessFlags::STATIC;
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.access = (AccessFlags::PRIVATE).with(AccessFlags::from_bits(
            self.access.bits() & !AccessFlags::PUBLIC.bits() & !AccessFlags::PROTECTED.bits(),
        ));
        self
    }

    /// Abstract methods carry no body.
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.access = self.access | AccessFlags::ABSTRACT;
        self.code = None;
        self
    }

    #[must_use]
    pub fn native(mut self) -> Self {
        self.access = self.access | AccessFlags::NATIVE;
        self.code = None;
        self
    }

    #[must_use]
    pub fn varargs(mut self) -> Self {
        self.access = self.access | AccessFlags::VARARGS;
        self
    }

    #[must_use]
    pub fn code(mut self, code: CodeInfo) -> Self {
        self.code = Some(code);
        self
    }
}

#[derive(Debug)]
pub struct FieldData {
    sig: FieldSig,
    access: AccessFlags,
    constant_value: Option<ConstValue>,
}

impl FieldData {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            sig: FieldSig::new(name, ty),
            access: AccessFlags::PUBLIC,
            constant_value: None,
        }
    }

    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn static_(mut self) -> Self {
        self.access = self.access | AccessFlags::STATIC;
        self
    }

    #[must_use]
    pub fn constant(mut self, value: ConstValue) -> Self {
        self.constant_value = Some(value);
        self
    }
}

/// Builds a [`ProgramGraph`] from class descriptions. When two classes share
/// a name the first definition wins, matching classpath shadowing.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    classes: Vec<ClassData>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add_class(mut self, class: ClassData) -> Self {
        self.classes.push(class);
        self
    }

    #[must_use]
    pub fn build(self) -> ProgramGraph {
        let mut classes: Vec<ClassDef> = Vec::with_capacity(self.classes.len());
        let mut methods: Vec<MethodDef> = Vec::new();
        let mut fields: Vec<FieldDef> = Vec::new();
        let mut by_name: HashMap<TypeName, ClassId> = HashMap::new();

        for data in self.classes {
            if by_name.contains_key(&data.name) {
                continue;
            }
            let class_id = ClassId::from_raw(classes.len() as u32);
            by_name.insert(data.name.clone(), class_id);

            let mut method_ids = Vec::with_capacity(data.methods.len());
            for m in data.methods {
                let id = MethodId::from_raw(methods.len() as u32);
                methods.push(MethodDef {
                    holder: class_id,
                    method: MethodRef::new(data.name.clone(), m.sig),
                    access: m.access,
                    code: m.code,
                });
                method_ids.push(id);
            }

            let mut field_ids = Vec::with_capacity(data.fields.len());
            for f in data.fields {
                let id = FieldId::from_raw(fields.len() as u32);
                fields.push(FieldDef {
                    holder: class_id,
                    field: FieldRef::new(data.name.clone(), f.sig),
                    access: f.access,
                    constant_value: f.constant_value,
                });
                field_ids.push(id);
            }

            classes.push(new_class_def(
                data.name,
                data.access,
                data.origin,
                data.super_class,
                data.interfaces,
                method_ids,
                field_ids,
            ));
        }

        let mut subtypes: HashMap<TypeName, Vec<ClassId>> = HashMap::new();
        for (idx, class) in classes.iter().enumerate() {
            let id = ClassId::from_raw(idx as u32);
            for supertype in class.super_class.iter().chain(class.interfaces.iter()) {
                subtypes.entry(supertype.clone()).or_default().push(id);
            }
        }

        ProgramGraph::from_parts(classes, methods, fields, by_name, subtypes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_hierarchy_and_lookup() {
        let graph = GraphBuilder::new()
            .add_class(ClassData::new("java.lang.Object").library())
            .add_class(
                ClassData::new("Base").method(MethodData::new("run")).field(
                    FieldData::new("count", "int"),
                ),
            )
            .add_class(ClassData::new("Derived").extends("Base"))
            .build();

        let base = graph.class_by_name(&TypeName::new("Base")).expect("Base");
        let derived = graph
            .class_by_name(&TypeName::new("Derived"))
            .expect("Derived");

        assert_eq!(graph.superclass_of(derived), Some(base));
        assert!(graph
            .lookup_method(base, &MethodSig::new("run", MethodDesc::nullary_void()))
            .is_some());
        assert!(graph
            .lookup_field(base, &FieldSig::new("count", "int"))
            .is_some());
        assert_eq!(graph.immediate_subtypes(&TypeName::new("Base")), &[derived]);

        let chain: Vec<_> = graph.superclass_chain(derived).collect();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn first_definition_wins_on_duplicate_names() {
        let graph = GraphBuilder::new()
            .add_class(ClassData::new("A").method(MethodData::new("first")))
            .add_class(ClassData::new("A").method(MethodData::new("second")))
            .build();

        let a = graph.class_by_name(&TypeName::new("A")).expect("A");
        assert!(graph
            .lookup_method(a, &MethodSig::new("first", MethodDesc::nullary_void()))
            .is_some());
        assert!(graph
            .lookup_method(a, &MethodSig::new("second", MethodDesc::nullary_void()))
            .is_none());
    }

    #[test]
    fn serializable_is_transitive() {
        let graph = GraphBuilder::new()
            .add_class(ClassData::new("java.io.Serializable").library().interface())
            .add_class(ClassData::new("Base").implements("java.io.Serializable"))
            .add_class(ClassData::new("Derived").extends("Base"))
            .build();

        let derived = graph
            .class_by_name(&TypeName::new("Derived"))
            .expect("Derived");
        assert!(graph.is_serializable(derived));
    }
}
