use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use crate::flags::AccessFlags;
use crate::refs::{FieldRef, FieldSig, MethodDesc, MethodRef, MethodSig};
use crate::trace::CodeInfo;
use crate::ty::TypeName;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u32);

impl MethodId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        MethodId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

impl FieldId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        FieldId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldId({})", self.0)
    }
}

/// Whether a class belongs to the program being shrunk or to the library it
/// compiles against. Library definitions participate in resolution but are
/// never added to the live sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassOrigin {
    Program,
    Library,
}

/// A constant initializer value attached to a field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Str(String),
    /// IEEE-754 bits; stored raw so field definitions stay `Eq`.
    FloatBits(u64),
    Null,
}

#[derive(Debug)]
pub struct ClassDef {
    pub name: TypeName,
    pub access: AccessFlags,
    pub origin: ClassOrigin,
    pub super_class: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    methods: Vec<MethodId>,
    fields: Vec<FieldId>,
    lookup: OnceLock<MemberLookup>,
}

impl ClassDef {
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.access.is_annotation()
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.access.is_enum()
    }

    #[must_use]
    pub fn is_program(&self) -> bool {
        self.origin == ClassOrigin::Program
    }

    #[must_use]
    pub fn is_library(&self) -> bool {
        self.origin == ClassOrigin::Library
    }

    #[must_use]
    pub fn method_ids(&self) -> &[MethodId] {
        &self.methods
    }

    #[must_use]
    pub fn field_ids(&self) -> &[FieldId] {
        &self.fields
    }
}

#[derive(Debug)]
pub struct MethodDef {
    pub holder: ClassId,
    pub method: MethodRef,
    pub access: AccessFlags,
    pub code: Option<CodeInfo>,
}

impl MethodDef {
    /// Direct methods are dispatched without a receiver-type lookup:
    /// private methods, instance initializers and statics.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.access.is_private()
            || self.access.is_static()
            || self.method.sig.is_instance_initializer()
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        !self.is_direct() && !self.method.sig.is_class_initializer()
    }

    #[must_use]
    pub fn is_non_abstract_virtual(&self) -> bool {
        self.is_virtual() && !self.access.is_abstract()
    }

    #[must_use]
    pub fn is_class_initializer(&self) -> bool {
        self.method.sig.is_class_initializer()
    }

    #[must_use]
    pub fn is_instance_initializer(&self) -> bool {
        self.method.sig.is_instance_initializer()
    }

    #[must_use]
    pub fn may_have_side_effects(&self) -> bool {
        self.code
            .as_ref()
            .map(|code| code.may_have_side_effects)
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct FieldDef {
    pub holder: ClassId,
    pub field: FieldRef,
    pub access: AccessFlags,
    pub constant_value: Option<ConstValue>,
}

#[derive(Debug)]
struct MemberLookup {
    methods: HashMap<MethodSig, MethodId>,
    fields: HashMap<FieldSig, FieldId>,
}

/// The immutable-after-load program graph: every class definition (program
/// and library), member definitions, and the type-hierarchy edges between
/// them.
///
/// Definitions are stored in arenas and addressed by integer handles, so
/// membership tests are handle comparisons rather than pointer identity.
/// The per-class member lookup is computed lazily, at most once per class;
/// the graph can be shared read-only across threads.
#[derive(Debug)]
pub struct ProgramGraph {
    classes: Vec<ClassDef>,
    methods: Vec<MethodDef>,
    fields: Vec<FieldDef>,
    by_name: HashMap<TypeName, ClassId>,
    subtypes: HashMap<TypeName, Vec<ClassId>>,
}

impl ProgramGraph {
    pub(crate) fn from_parts(
        classes: Vec<ClassDef>,
        methods: Vec<MethodDef>,
        fields: Vec<FieldDef>,
        by_name: HashMap<TypeName, ClassId>,
        subtypes: HashMap<TypeName, Vec<ClassId>>,
    ) -> Self {
        Self {
            classes,
            methods,
            fields,
            by_name,
            subtypes,
        }
    }

    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.idx()]
    }

    #[must_use]
    pub fn method(&self, id: MethodId) -> &MethodDef {
        &self.methods[id.idx()]
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.idx()]
    }

    /// Definition lookup by type name. Arrays and primitives have no
    /// definition.
    #[must_use]
    pub fn class_by_name(&self, name: &TypeName) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Like [`Self::class_by_name`] but only for program classes.
    #[must_use]
    pub fn program_class_by_name(&self, name: &TypeName) -> Option<ClassId> {
        self.class_by_name(name)
            .filter(|id| self.class(*id).is_program())
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(|i| ClassId::from_raw(i as u32))
    }

    pub fn methods_of(&self, class: ClassId) -> impl Iterator<Item = MethodId> + '_ {
        self.class(class).methods.iter().copied()
    }

    pub fn fields_of(&self, class: ClassId) -> impl Iterator<Item = FieldId> + '_ {
        self.class(class).fields.iter().copied()
    }

    pub fn virtual_methods_of(&self, class: ClassId) -> impl Iterator<Item = MethodId> + '_ {
        self.methods_of(class)
            .filter(move |id| self.method(*id).is_virtual())
    }

    /// Declared-member lookup on a single class, not following the
    /// hierarchy. The underlying table is built on first use and then
    /// shared; concurrent first uses are safe.
    #[must_use]
    pub fn lookup_method(&self, class: ClassId, sig: &MethodSig) -> Option<MethodId> {
        self.member_lookup(class).methods.get(sig).copied()
    }

    #[must_use]
    pub fn lookup_virtual_method(&self, class: ClassId, sig: &MethodSig) -> Option<MethodId> {
        self.lookup_method(class, sig)
            .filter(|id| self.method(*id).is_virtual())
    }

    #[must_use]
    pub fn lookup_direct_method(&self, class: ClassId, sig: &MethodSig) -> Option<MethodId> {
        self.lookup_method(class, sig)
            .filter(|id| self.method(*id).is_direct())
    }

    #[must_use]
    pub fn lookup_field(&self, class: ClassId, sig: &FieldSig) -> Option<FieldId> {
        self.member_lookup(class).fields.get(sig).copied()
    }

    fn member_lookup(&self, class: ClassId) -> &MemberLookup {
        self.class(class).lookup.get_or_init(|| {
            let def = self.class(class);
            let mut methods = HashMap::with_capacity(def.methods.len());
            for &id in &def.methods {
                methods.insert(self.method(id).method.sig.clone(), id);
            }
            let mut fields = HashMap::with_capacity(def.fields.len());
            for &id in &def.fields {
                fields.insert(self.field(id).field.sig.clone(), id);
            }
            MemberLookup { methods, fields }
        })
    }

    #[must_use]
    pub fn class_initializer(&self, class: ClassId) -> Option<MethodId> {
        self.lookup_method(class, &MethodSig::class_initializer())
    }

    /// The no-argument instance initializer, if the class declares one.
    #[must_use]
    pub fn default_initializer(&self, class: ClassId) -> Option<MethodId> {
        self.lookup_method(class, &MethodSig::instance_initializer())
    }

    #[must_use]
    pub fn superclass_of(&self, class: ClassId) -> Option<ClassId> {
        self.class(class)
            .super_class
            .as_ref()
            .and_then(|name| self.class_by_name(name))
    }

    /// The superclass chain starting at `class` itself. Guards against
    /// malformed cyclic hierarchies.
    pub fn superclass_chain(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        let mut visited = HashSet::new();
        let mut current = Some(class);
        std::iter::from_fn(move || {
            let id = current?;
            if !visited.insert(id) {
                return None;
            }
            current = self.superclass_of(id);
            Some(id)
        })
    }

    /// Classes whose direct superclass or implements clause names `name`.
    #[must_use]
    pub fn immediate_subtypes(&self, name: &TypeName) -> &[ClassId] {
        self.subtypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `class` has `name` among its transitive supertypes
    /// (superclasses and superinterfaces, the class itself excluded).
    #[must_use]
    pub fn implements_transitively(&self, class: ClassId, name: &TypeName) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let def = self.class(current);
            for supertype in def
                .super_class
                .iter()
                .chain(def.interfaces.iter())
            {
                if supertype == name {
                    return true;
                }
                if let Some(id) = self.class_by_name(supertype) {
                    stack.push(id);
                }
            }
        }
        false
    }

    #[must_use]
    pub fn is_serializable(&self, class: ClassId) -> bool {
        self.implements_transitively(class, &TypeName::serializable())
    }

    /// Resolves a method reference to the declared definition on the exact
    /// holder, without any hierarchy search.
    #[must_use]
    pub fn definition_for_method(&self, reference: &MethodRef) -> Option<MethodId> {
        let class = self.class_by_name(&reference.holder)?;
        self.lookup_method(class, &reference.sig)
    }

    #[must_use]
    pub fn definition_for_field(&self, reference: &FieldRef) -> Option<FieldId> {
        let class = self.class_by_name(&reference.holder)?;
        self.lookup_field(class, &reference.sig)
    }

    /// The signature-polymorphic overload shape for
    /// `java.lang.invoke.MethodHandle`: `(Object[])Object`.
    #[must_use]
    pub fn polymorphic_desc() -> MethodDesc {
        MethodDesc::new([TypeName::object().array_of()], TypeName::object())
    }
}

pub(crate) fn new_class_def(
    name: TypeName,
    access: AccessFlags,
    origin: ClassOrigin,
    super_class: Option<TypeName>,
    interfaces: Vec<TypeName>,
    methods: Vec<MethodId>,
    fields: Vec<FieldId>,
) -> ClassDef {
    ClassDef {
        name,
        access,
        origin,
        super_class,
        interfaces,
        methods,
        fields,
        lookup: OnceLock::new(),
    }
}
