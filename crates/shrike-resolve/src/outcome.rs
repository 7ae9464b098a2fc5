use shrike_graph::{MethodId, TypeName};

/// The result of resolving a symbolic method reference.
///
/// Exactly one variant holds per resolution; missing classes and
/// incompatible holders are outcomes, not errors. Repeated resolution of the
/// same reference against the same graph yields the same outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    SingleTarget(MethodId),
    /// More than one maximally-specific interface default method matched.
    /// All of them are reported; single-target consumers must treat this as
    /// "no single target".
    AmbiguousDefaultTargets(Vec<MethodId>),
    ClassNotFound(TypeName),
    /// The holder kind is incompatible with the invocation kind (ICCE), e.g.
    /// an interface method reference naming a non-interface holder.
    IncompatibleClass,
    NoSuchMethod,
    /// `clone()` on an array type has no resolvable target; the runtime
    /// synthesizes it.
    ArrayCloneTarget,
}

impl ResolutionOutcome {
    /// Collapses the outcome to a single dispatch basis; ambiguous and
    /// failed resolutions yield `None`.
    #[must_use]
    pub fn single_target(&self) -> Option<MethodId> {
        match self {
            ResolutionOutcome::SingleTarget(id) => Some(*id),
            _ => None,
        }
    }

    /// Every method the resolution selected: one for a single target, all
    /// maximally-specific defaults for an ambiguous one, none otherwise.
    pub fn targets(&self) -> impl Iterator<Item = MethodId> + '_ {
        let slice: &[MethodId] = match self {
            ResolutionOutcome::SingleTarget(id) => std::slice::from_ref(id),
            ResolutionOutcome::AmbiguousDefaultTargets(ids) => ids,
            _ => &[],
        };
        slice.iter().copied()
    }

    #[must_use]
    pub fn has_targets(&self) -> bool {
        self.targets().next().is_some()
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::ClassNotFound(_)
                | ResolutionOutcome::IncompatibleClass
                | ResolutionOutcome::NoSuchMethod
        )
    }
}
