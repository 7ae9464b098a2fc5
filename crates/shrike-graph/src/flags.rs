use std::fmt;
use std::ops::BitOr;

/// JVM access flags for classes, methods and fields, stored as the raw
/// `access_flags` bits from the class file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct AccessFlags(u16);

impl AccessFlags {
    pub const PUBLIC: AccessFlags = AccessFlags(0x0001);
    pub const PRIVATE: AccessFlags = AccessFlags(0x0002);
    pub const PROTECTED: AccessFlags = AccessFlags(0x0004);
    pub const STATIC: AccessFlags = AccessFlags(0x0008);
    pub const FINAL: AccessFlags = AccessFlags(0x0010);
    pub const BRIDGE: AccessFlags = AccessFlags(0x0040);
    pub const VARARGS: AccessFlags = AccessFlags(0x0080);
    pub const NATIVE: AccessFlags = AccessFlags(0x0100);
    pub const INTERFACE: AccessFlags = AccessFlags(0x0200);
    pub const ABSTRACT: AccessFlags = AccessFlags(0x0400);
    pub const SYNTHETIC: AccessFlags = AccessFlags(0x1000);
    pub const ANNOTATION: AccessFlags = AccessFlags(0x2000);
    pub const ENUM: AccessFlags = AccessFlags(0x4000);

    #[must_use]
    pub const fn empty() -> Self {
        AccessFlags(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        AccessFlags(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn with(self, other: AccessFlags) -> Self {
        AccessFlags(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, other: AccessFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    #[must_use]
    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    #[must_use]
    pub const fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    #[must_use]
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    #[must_use]
    pub const fn is_bridge(self) -> bool {
        self.contains(Self::BRIDGE)
    }

    #[must_use]
    pub const fn is_varargs(self) -> bool {
        self.contains(Self::VARARGS)
    }

    #[must_use]
    pub const fn is_native(self) -> bool {
        self.contains(Self::NATIVE)
    }

    #[must_use]
    pub const fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    #[must_use]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    #[must_use]
    pub const fn is_annotation(self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    #[must_use]
    pub const fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    #[must_use]
    pub fn visibility(self) -> Visibility {
        if self.is_public() {
            Visibility::Public
        } else if self.is_protected() {
            Visibility::Protected
        } else if self.is_private() {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

impl BitOr for AccessFlags {
    type Output = AccessFlags;

    fn bitor(self, rhs: AccessFlags) -> AccessFlags {
        self.with(rhs)
    }
}

impl fmt::Debug for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessFlags(0x{:04x})", self.0)
    }
}

/// Member visibility ordered from narrowest to widest, used by the
/// access-widening check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_composition() {
        let flags = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL;
        assert!(flags.is_public());
        assert!(flags.is_static());
        assert!(flags.is_final());
        assert!(!flags.is_private());
    }

    #[test]
    fn visibility_ordering_widens() {
        assert!(Visibility::Private < Visibility::Package);
        assert!(Visibility::Package < Visibility::Protected);
        assert!(Visibility::Protected < Visibility::Public);
        assert_eq!(AccessFlags::empty().visibility(), Visibility::Package);
        assert_eq!(AccessFlags::PROTECTED.visibility(), Visibility::Protected);
    }
}
