use std::fmt;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// A JVM type spelled as a dotted binary name, with `[]` suffixes for array
/// dimensions (`int`, `java.lang.Object`, `byte[][]`).
///
/// Equality is structural; `TypeName` is used as a map key throughout the
/// program graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn object() -> Self {
        Self::new("java.lang.Object")
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new("java.lang.String")
    }

    #[must_use]
    pub fn method_handle() -> Self {
        Self::new("java.lang.invoke.MethodHandle")
    }

    #[must_use]
    pub fn serializable() -> Self {
        Self::new("java.io.Serializable")
    }

    #[must_use]
    pub fn void() -> Self {
        Self::new("void")
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.0 == "void"
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.0.as_str())
    }

    /// A class type: not an array, not a primitive, not `void`.
    #[must_use]
    pub fn is_class(&self) -> bool {
        !self.is_array() && !self.is_primitive() && !self.is_void()
    }

    /// Strips one array dimension (`int[][]` -> `int[]`).
    #[must_use]
    pub fn element_type(&self) -> Option<TypeName> {
        self.0
            .strip_suffix("[]")
            .map(|elem| TypeName::new(elem.to_string()))
    }

    /// Strips every array dimension (`int[][]` -> `int`).
    #[must_use]
    pub fn base_type(&self) -> TypeName {
        let mut base = self.0.as_str();
        while let Some(elem) = base.strip_suffix("[]") {
            base = elem;
        }
        TypeName::new(base.to_string())
    }

    #[must_use]
    pub fn array_of(&self) -> TypeName {
        TypeName::new(format!("{}[]", self.0))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_queries() {
        let t = TypeName::new("byte[][]");
        assert!(t.is_array());
        assert!(!t.is_class());
        assert_eq!(t.element_type().unwrap().as_str(), "byte[]");
        assert_eq!(t.base_type().as_str(), "byte");
        assert!(t.base_type().is_primitive());
    }

    #[test]
    fn class_queries() {
        let t = TypeName::object();
        assert!(t.is_class());
        assert!(!t.is_primitive());
        assert_eq!(t.base_type(), t);
        assert_eq!(t.array_of().as_str(), "java.lang.Object[]");
    }

    #[test]
    fn void_is_neither_class_nor_primitive() {
        assert!(!TypeName::void().is_class());
        assert!(!TypeName::void().is_primitive());
        assert!(TypeName::void().is_void());
    }
}
