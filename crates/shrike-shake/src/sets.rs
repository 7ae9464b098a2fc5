use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use shrike_graph::{ClassId, FieldRef, MethodId, MethodSig, ProgramGraph, Visibility};

use crate::reason::KeepReason;

/// A monotonic set of discovered facts, each carrying the non-empty list of
/// reasons it was discovered for. Items are never removed within one
/// analysis run.
#[derive(Debug)]
pub struct ReasonSet<T> {
    items: HashMap<T, Vec<KeepReason>>,
}

impl<T: Eq + Hash + Copy> ReasonSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Records `reason` for `item` and returns whether the item is new.
    pub fn add(&mut self, item: T, reason: KeepReason) -> bool {
        let reasons = self.items.entry(item).or_default();
        let newly = reasons.is_empty();
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
        newly
    }

    #[must_use]
    pub fn contains(&self, item: T) -> bool {
        self.items.contains_key(&item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn reasons(&self, item: T) -> &[KeepReason] {
        self.items.get(&item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, &[KeepReason])> {
        self.items.iter().map(|(item, reasons)| (*item, reasons.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = T> + '_ {
        self.items.keys().copied()
    }
}

impl<T: Eq + Hash + Copy> Default for ReasonSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A transient signature scope used while replaying reachable methods onto a
/// newly instantiated class: a method signature already seen closer to the
/// instantiated class shadows anything further up the hierarchy. Nested
/// scopes let each interface chain shadow against the class chain without
/// shadowing its sibling chains.
#[derive(Debug, Default)]
pub struct ShadowScope<'p> {
    sigs: HashSet<MethodSig>,
    parent: Option<&'p ShadowScope<'p>>,
}

impl<'p> ShadowScope<'p> {
    #[must_use]
    pub fn new() -> ShadowScope<'static> {
        ShadowScope {
            sigs: HashSet::new(),
            parent: None,
        }
    }

    #[must_use]
    pub fn nested(&self) -> ShadowScope<'_> {
        ShadowScope {
            sigs: HashSet::new(),
            parent: Some(self),
        }
    }

    #[must_use]
    pub fn contains(&self, sig: &MethodSig) -> bool {
        if self.sigs.contains(sig) {
            return true;
        }
        self.parent.map(|p| p.contains(sig)).unwrap_or(false)
    }

    /// Adds the signature unless it is already visible in this scope chain.
    pub fn add(&mut self, sig: MethodSig) -> bool {
        if self.contains(&sig) {
            return false;
        }
        self.sigs.insert(sig)
    }
}

/// Result of registering a virtual method's visibility against the methods
/// already visible above it in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddVisibility {
    Added,
    /// The signature was already visible with narrower access; removing the
    /// widened declaration would cause a linkage error.
    AddedMoreVisible,
    NotAdded,
}

/// Per-class visibility of virtual method signatures, populated as classes
/// become live. Lookups walk the superclass chain, so a class sees every
/// signature its live supertypes declared.
#[derive(Debug, Default)]
pub struct VisibleMethodScopes {
    scopes: HashMap<ClassId, HashMap<MethodSig, Visibility>>,
}

impl VisibleMethodScopes {
    pub fn add_if_more_visible(
        &mut self,
        graph: &ProgramGraph,
        class: ClassId,
        sig: &MethodSig,
        visibility: Visibility,
    ) -> AddVisibility {
        let mut widest: Option<Visibility> = None;
        for current in graph.superclass_chain(class) {
            if let Some(existing) = self
                .scopes
                .get(&current)
                .and_then(|scope| scope.get(sig))
            {
                widest = Some(widest.map_or(*existing, |w: Visibility| w.max(*existing)));
            }
        }
        let result = match widest {
            None => AddVisibility::Added,
            Some(existing) if visibility > existing => AddVisibility::AddedMoreVisible,
            Some(_) => return AddVisibility::NotAdded,
        };
        self.scopes
            .entry(class)
            .or_default()
            .insert(sig.clone(), visibility);
        result
    }
}

/// How a live field is accessed, derived from the recorded reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccessKind {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl FieldAccessKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldAccessKind::ReadOnly => "read-only",
            FieldAccessKind::WriteOnly => "write-only",
            FieldAccessKind::ReadWrite => "read-write",
        }
    }
}

/// Recorded accesses for one resolved field.
#[derive(Debug)]
pub struct FieldAccessInfo {
    pub field: FieldRef,
    pub reads: HashSet<MethodId>,
    pub writes: HashSet<MethodId>,
}

impl FieldAccessInfo {
    #[must_use]
    pub fn kind(&self) -> Option<FieldAccessKind> {
        match (self.reads.is_empty(), self.writes.is_empty()) {
            (false, true) => Some(FieldAccessKind::ReadOnly),
            (true, false) => Some(FieldAccessKind::WriteOnly),
            (false, false) => Some(FieldAccessKind::ReadWrite),
            (true, true) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldAccessSlot {
    /// The reference did not resolve; cached so repeated accesses skip
    /// resolution.
    Missing,
    Present(usize),
}

/// Field-access bookkeeping keyed by the resolved field, with indirect
/// (non-rebound) references aliased onto the same record.
#[derive(Debug, Default)]
pub struct FieldAccessTable {
    slots: HashMap<FieldRef, FieldAccessSlot>,
    infos: Vec<FieldAccessInfo>,
    seen: HashSet<(FieldRef, MethodId, bool)>,
}

impl FieldAccessTable {
    /// Records one access. Returns `false` when the same (reference,
    /// context, kind) was already recorded or the reference is known
    /// missing, so callers can skip re-tracing.
    pub fn record(
        &mut self,
        reference: &FieldRef,
        resolved: Option<&FieldRef>,
        context: MethodId,
        is_read: bool,
    ) -> bool {
        match self.slots.get(reference) {
            Some(FieldAccessSlot::Missing) => return false,
            Some(FieldAccessSlot::Present(idx)) => {
                let idx = *idx;
                self.record_access(idx, reference, context, is_read)
            }
            None => match resolved {
                None => {
                    self.slots.insert(reference.clone(), FieldAccessSlot::Missing);
                    true
                }
                Some(resolved) => {
                    let idx = match self.slots.get(resolved) {
                        Some(FieldAccessSlot::Present(idx)) => *idx,
                        _ => {
                            let idx = self.infos.len();
                            self.infos.push(FieldAccessInfo {
                                field: resolved.clone(),
                                reads: HashSet::new(),
                                writes: HashSet::new(),
                            });
                            self.slots
                                .insert(resolved.clone(), FieldAccessSlot::Present(idx));
                            idx
                        }
                    };
                    if reference != resolved {
                        self.slots
                            .insert(reference.clone(), FieldAccessSlot::Present(idx));
                    }
                    self.record_access(idx, reference, context, is_read)
                }
            },
        }
    }

    fn record_access(
        &mut self,
        idx: usize,
        reference: &FieldRef,
        context: MethodId,
        is_read: bool,
    ) -> bool {
        if !self.seen.insert((reference.clone(), context, is_read)) {
            return false;
        }
        let info = &mut self.infos[idx];
        if is_read {
            info.reads.insert(context);
        } else {
            info.writes.insert(context);
        }
        true
    }

    /// Access info for a field, looked up through any of its recorded
    /// references.
    #[must_use]
    pub fn info(&self, reference: &FieldRef) -> Option<&FieldAccessInfo> {
        match self.slots.get(reference)? {
            FieldAccessSlot::Present(idx) => Some(&self.infos[*idx]),
            FieldAccessSlot::Missing => None,
        }
    }

    #[must_use]
    pub fn classify(&self, reference: &FieldRef) -> Option<FieldAccessKind> {
        self.info(reference).and_then(FieldAccessInfo::kind)
    }

    pub fn infos(&self) -> impl Iterator<Item = &FieldAccessInfo> {
        self.infos.iter()
    }
}
