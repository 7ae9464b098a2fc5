use std::fmt;

use crate::ty::TypeName;

/// Name of the JVM instance initializer.
pub const INSTANCE_INITIALIZER: &str = "<init>";
/// Name of the JVM class (static) initializer.
pub const CLASS_INITIALIZER: &str = "<clinit>";

/// A method descriptor: parameter types and return type, holder-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodDesc {
    pub params: Vec<TypeName>,
    pub ret: TypeName,
}

impl MethodDesc {
    pub fn new(params: impl IntoIterator<Item = TypeName>, ret: TypeName) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
        }
    }

    /// `()void`, the descriptor of default and class initializers.
    #[must_use]
    pub fn nullary_void() -> Self {
        Self::new([], TypeName::void())
    }
}

impl fmt::Display for MethodDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.ret)
    }
}

/// A method signature: name plus descriptor. Two methods with equal
/// signatures override one another when declared along the same hierarchy
/// chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSig {
    pub name: String,
    pub desc: MethodDesc,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, desc: MethodDesc) -> Self {
        Self {
            name: name.into(),
            desc,
        }
    }

    #[must_use]
    pub fn instance_initializer() -> Self {
        Self::new(INSTANCE_INITIALIZER, MethodDesc::nullary_void())
    }

    #[must_use]
    pub fn class_initializer() -> Self {
        Self::new(CLASS_INITIALIZER, MethodDesc::nullary_void())
    }

    #[must_use]
    pub fn is_instance_initializer(&self) -> bool {
        self.name == INSTANCE_INITIALIZER
    }

    #[must_use]
    pub fn is_class_initializer(&self) -> bool {
        self.name == CLASS_INITIALIZER
    }

    #[must_use]
    pub fn is_initializer(&self) -> bool {
        self.is_instance_initializer() || self.is_class_initializer()
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.desc)
    }
}

/// A symbolic method reference: the holder type the reference is declared
/// against plus the signature. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub holder: TypeName,
    pub sig: MethodSig,
}

impl MethodRef {
    pub fn new(holder: impl Into<TypeName>, sig: MethodSig) -> Self {
        Self {
            holder: holder.into(),
            sig,
        }
    }

    #[must_use]
    pub fn with_holder(&self, holder: TypeName) -> MethodRef {
        MethodRef {
            holder,
            sig: self.sig.clone(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.holder, self.sig)
    }
}

/// A field signature: name plus field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSig {
    pub name: String,
    pub ty: TypeName,
}

impl FieldSig {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for FieldSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// A symbolic field reference. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub holder: TypeName,
    pub sig: FieldSig,
}

impl FieldRef {
    pub fn new(holder: impl Into<TypeName>, sig: FieldSig) -> Self {
        Self {
            holder: holder.into(),
            sig,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.holder, self.sig)
    }
}

/// A reference to any kind of program item, used by keep rules, pinning and
/// the reachability recorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Class(TypeName),
    Method(MethodRef),
    Field(FieldRef),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Class(ty) => ty.fmt(f),
            ItemRef::Method(m) => m.fmt(f),
            ItemRef::Field(fld) => fld.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let m = MethodRef::new(
            "java.lang.Object",
            MethodSig::new(
                "equals",
                MethodDesc::new([TypeName::object()], TypeName::new("boolean")),
            ),
        );
        assert_eq!(m.to_string(), "java.lang.Object.equals(java.lang.Object)boolean");

        let f = FieldRef::new("C", FieldSig::new("count", "int"));
        assert_eq!(f.to_string(), "C.count:int");
    }

    #[test]
    fn initializer_signatures() {
        assert!(MethodSig::instance_initializer().is_instance_initializer());
        assert!(MethodSig::class_initializer().is_class_initializer());
        assert!(!MethodSig::new("run", MethodDesc::nullary_void()).is_initializer());
    }
}
