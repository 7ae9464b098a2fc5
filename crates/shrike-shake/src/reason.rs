use shrike_graph::{ClassId, MethodId, TypeName};

use crate::roots::RuleId;

/// Why a program element was retained. Every liveness fact carries at least
/// one reason; reasons also drive the reachability graph recorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeepReason {
    /// Matched an unconditional keep rule.
    KeepRule(RuleId),
    /// Became a root through the consequent of a conditional keep rule.
    ConditionalKeepRule(RuleId),
    /// Kept for compatibility-mode semantics (e.g. the default initializer
    /// of a kept class).
    CompatibilityRule,
    /// Invoked from a live method.
    InvokedFrom(MethodId),
    /// The runtime target of a super-invoke in a live method.
    InvokedViaSuper(MethodId),
    /// The symbolic resolution target of a super-invoke.
    TargetedBySuper(MethodId),
    /// Instantiated (`new`) in a live method.
    InstantiatedIn(MethodId),
    /// Referenced by a field access in a live method.
    FieldReferencedIn(MethodId),
    /// Referenced (type constant, parameter/return type, holder) from a
    /// live method.
    ReferencedFrom(MethodId),
    /// Required by a type that is itself live.
    ReachableFromType(ClassId),
    /// Overrides a method that a call site can reach.
    OverridesMethod(MethodId),
    /// Overrides a virtual method of the named library type.
    OverridesLibraryMethod(TypeName),
    /// Consequence of a statically-recognized reflective operation in a
    /// live method.
    ReflectiveUse(MethodId),
}
