use std::collections::{HashSet, VecDeque};

use shrike_graph::{ClassId, FieldId, FieldSig, MethodId, MethodRef, MethodSig, ProgramGraph, TypeName};

use crate::outcome::ResolutionOutcome;

/// Method and field resolution following the JVM linking rules (JVMS
/// 5.4.3.2-5.4.3.4).
///
/// Resolution is a pure function of the graph and the reference: the
/// resolver holds no mutable state, and identical queries always return
/// identical outcomes. The resolved method is the basis for dispatch, not
/// necessarily the method that runs; dispatch filtering is layered on top.
pub struct Resolver<'g> {
    graph: &'g ProgramGraph,
}

impl<'g> Resolver<'g> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self { graph }
    }

    #[must_use]
    pub fn graph(&self) -> &'g ProgramGraph {
        self.graph
    }

    /// Resolution entry point where the reference kind is known: interface
    /// method references resolve per interface resolution, the rest per
    /// class resolution.
    #[must_use]
    pub fn resolve_method(
        &self,
        holder: &TypeName,
        sig: &MethodSig,
        as_interface: bool,
    ) -> ResolutionOutcome {
        if as_interface {
            self.resolve_method_on_interface(holder, sig)
        } else {
            self.resolve_method_on_class(holder, sig)
        }
    }

    /// Resolution entry point where the reference kind is unknown and the
    /// holder's own definition decides between class and interface
    /// resolution.
    #[must_use]
    pub fn resolve_method_on_holder(&self, holder: &TypeName, sig: &MethodSig) -> ResolutionOutcome {
        if holder.is_array() {
            return self.resolve_method_on_array(sig);
        }
        let Some(class) = self.graph.class_by_name(holder) else {
            return ResolutionOutcome::ClassNotFound(holder.clone());
        };
        self.resolve_method_from(class, sig)
    }

    /// Kind-directed resolution starting from a known definition.
    #[must_use]
    pub fn resolve_method_from(&self, class: ClassId, sig: &MethodSig) -> ResolutionOutcome {
        if self.graph.class(class).is_interface() {
            self.resolve_on_interface_def(class, sig)
        } else {
            self.resolve_on_class_def(class, sig)
        }
    }

    /// Class-kind method resolution (JVMS 5.4.3.3).
    #[must_use]
    pub fn resolve_method_on_class(&self, holder: &TypeName, sig: &MethodSig) -> ResolutionOutcome {
        if holder.is_array() {
            return self.resolve_method_on_array(sig);
        }
        let Some(class) = self.graph.class_by_name(holder) else {
            return ResolutionOutcome::ClassNotFound(holder.clone());
        };
        // Step 1: a class reference naming an interface fails with ICCE.
        if self.graph.class(class).is_interface() {
            return ResolutionOutcome::IncompatibleClass;
        }
        self.resolve_on_class_def(class, sig)
    }

    fn resolve_on_class_def(&self, class: ClassId, sig: &MethodSig) -> ResolutionOutcome {
        // Step 2: the superclass chain.
        if let Some(found) = self.resolve_on_superclass_chain(class, sig) {
            return ResolutionOutcome::SingleTarget(found);
        }
        // Step 3: maximally-specific superinterface methods.
        self.resolve_in_superinterfaces(class, sig)
    }

    /// Every invocation on an array type targets `java.lang.Object`, except
    /// `clone`, which has no resolvable target (JLS 10.7).
    fn resolve_method_on_array(&self, sig: &MethodSig) -> ResolutionOutcome {
        if sig.name == "clone" {
            ResolutionOutcome::ArrayCloneTarget
        } else {
            self.resolve_method_on_class(&TypeName::object(), sig)
        }
    }

    /// Step 2 of class resolution: walk the superclass chain looking for a
    /// declared method. On `java.lang.invoke.MethodHandle` the
    /// signature-polymorphic `(Object[])Object` overload is preferred when
    /// it carries the native+varargs attributes (JVMS 2.9).
    fn resolve_on_superclass_chain(&self, class: ClassId, sig: &MethodSig) -> Option<MethodId> {
        for current in self.graph.superclass_chain(class) {
            if self.graph.class(current).name == TypeName::method_handle() {
                let polymorphic = MethodSig::new(sig.name.clone(), ProgramGraph::polymorphic_desc());
                if let Some(found) = self.graph.lookup_method(current, &polymorphic) {
                    let def = self.graph.method(found);
                    if def.access.is_native() && def.access.is_varargs() {
                        return Some(found);
                    }
                }
            }
            if let Some(found) = self.graph.lookup_method(current, sig) {
                return Some(found);
            }
        }
        None
    }

    /// Step 3 shared between class and interface resolution: search the
    /// transitive superinterfaces for maximally-specific default methods.
    ///
    /// The walk is an explicit work queue rather than recursion so that
    /// pathological interface hierarchies cannot exhaust the stack. An
    /// interface that declares a matching default method terminates the
    /// descent below it; all defaults found that way are maximally specific.
    /// If no default exists, any matching (non-private, non-static)
    /// interface method is returned.
    fn resolve_in_superinterfaces(&self, class: ClassId, sig: &MethodSig) -> ResolutionOutcome {
        let mut defaults: Vec<MethodId> = Vec::new();
        let mut candidate: Option<MethodId> = None;
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut pending: VecDeque<ClassId> = VecDeque::new();

        for current in self.graph.superclass_chain(class) {
            for iface in &self.graph.class(current).interfaces {
                if let Some(id) = self.graph.class_by_name(iface) {
                    pending.push_back(id);
                }
                // Missing interface definitions are skipped, not errors.
            }
        }

        while let Some(iface) = pending.pop_front() {
            if !visited.insert(iface) {
                continue;
            }
            if let Some(found) = self.graph.lookup_method(iface, sig) {
                let def = self.graph.method(found);
                if candidate.is_none() && !def.access.is_private() && !def.access.is_static() {
                    candidate = Some(found);
                }
                if def.is_non_abstract_virtual() {
                    if !defaults.contains(&found) {
                        defaults.push(found);
                    }
                    continue;
                }
            }
            // No default here: keep searching this interface's own
            // superinterfaces, depth-first in declaration order.
            for iface_name in self.graph.class(iface).interfaces.iter().rev() {
                if let Some(id) = self.graph.class_by_name(iface_name) {
                    pending.push_front(id);
                }
            }
        }

        match defaults.len() {
            0 => candidate
                .map(ResolutionOutcome::SingleTarget)
                .unwrap_or(ResolutionOutcome::NoSuchMethod),
            1 => ResolutionOutcome::SingleTarget(defaults[0]),
            _ => ResolutionOutcome::AmbiguousDefaultTargets(defaults),
        }
    }

    /// Interface-kind method resolution (JVMS 5.4.3.4).
    #[must_use]
    pub fn resolve_method_on_interface(
        &self,
        holder: &TypeName,
        sig: &MethodSig,
    ) -> ResolutionOutcome {
        if holder.is_array() {
            return ResolutionOutcome::IncompatibleClass;
        }
        let Some(class) = self.graph.class_by_name(holder) else {
            return ResolutionOutcome::ClassNotFound(holder.clone());
        };
        if !self.graph.class(class).is_interface() {
            return ResolutionOutcome::IncompatibleClass;
        }
        self.resolve_on_interface_def(class, sig)
    }

    fn resolve_on_interface_def(&self, class: ClassId, sig: &MethodSig) -> ResolutionOutcome {
        // Step 2: a method declared on the interface itself.
        if let Some(found) = self.graph.lookup_method(class, sig) {
            return ResolutionOutcome::SingleTarget(found);
        }
        // Step 3: a matching public non-abstract method on Object covers the
        // methods every interface inherits (equals, hashCode, toString, ...).
        let object = TypeName::object();
        let Some(object_class) = self.graph.class_by_name(&object) else {
            return ResolutionOutcome::ClassNotFound(object);
        };
        if let Some(found) = self.graph.lookup_method(object_class, sig) {
            let def = self.graph.method(found);
            if def.access.is_public() && !def.access.is_abstract() {
                return ResolutionOutcome::SingleTarget(found);
            }
        }
        self.resolve_in_superinterfaces(class, sig)
    }

    /// Field resolution (JVMS 5.4.3.2): the holder itself, then its direct
    /// superinterfaces in declaration order, then the superclass.
    #[must_use]
    pub fn resolve_field(&self, holder: &TypeName, sig: &FieldSig) -> Option<FieldId> {
        let class = self.graph.class_by_name(holder)?;
        let mut visited = HashSet::new();
        self.resolve_field_on(class, sig, &mut visited)
    }

    fn resolve_field_on(
        &self,
        class: ClassId,
        sig: &FieldSig,
        visited: &mut HashSet<ClassId>,
    ) -> Option<FieldId> {
        if !visited.insert(class) {
            return None;
        }
        if let Some(found) = self.graph.lookup_field(class, sig) {
            return Some(found);
        }
        let def = self.graph.class(class);
        for iface in &def.interfaces {
            if let Some(id) = self.graph.class_by_name(iface) {
                if let Some(found) = self.resolve_field_on(id, sig, visited) {
                    return Some(found);
                }
            }
        }
        let superclass = self.graph.superclass_of(class)?;
        self.resolve_field_on(superclass, sig, visited)
    }

    /// Dispatch filter for `invoke-static`: the resolved method must be
    /// static. A mismatch is "no target", not an error, matching lenient VM
    /// behavior.
    #[must_use]
    pub fn dispatch_static_invoke(&self, resolved: &ResolutionOutcome) -> Option<MethodId> {
        resolved
            .single_target()
            .filter(|id| self.graph.method(*id).access.is_static())
    }

    /// Dispatch filter for the direct parts of `invoke-special`: the
    /// resolved method must not be static.
    #[must_use]
    pub fn dispatch_direct_invoke(&self, resolved: &ResolutionOutcome) -> Option<MethodId> {
        resolved
            .single_target()
            .filter(|id| !self.graph.method(*id).access.is_static())
    }

    /// Rewrites a super-invoke reference to start resolution at the caller's
    /// immediate superclass, per invokespecial semantics. Interface
    /// references and callers without a superclass keep the symbolic
    /// reference unchanged.
    #[must_use]
    pub fn super_invoke_target(&self, method: &MethodRef, context_holder: &TypeName) -> MethodRef {
        let holder_is_interface = self
            .graph
            .class_by_name(&method.holder)
            .map(|id| self.graph.class(id).is_interface())
            .unwrap_or(false);
        if holder_is_interface {
            return method.clone();
        }
        let Some(context) = self.graph.class_by_name(context_holder) else {
            return method.clone();
        };
        match &self.graph.class(context).super_class {
            Some(super_class) => method.with_holder(super_class.clone()),
            None => method.clone(),
        }
    }

    /// The runtime target of a super-invoke from `context_holder`: the
    /// symbolic reference must resolve, then the search resumes from the
    /// caller's superclass. Static results are rejected.
    #[must_use]
    pub fn lookup_super_target(
        &self,
        method: &MethodRef,
        context_holder: &TypeName,
    ) -> Option<MethodId> {
        let resolved = self.resolve_method_on_holder(&method.holder, &method.sig);
        if !resolved.has_targets() {
            return None;
        }
        // Per invokespecial, an interface symbolic reference is used as-is.
        if let Some(holder) = self.graph.class_by_name(&method.holder) {
            if self.graph.class(holder).is_interface() {
                return self
                    .resolve_on_interface_def(holder, &method.sig)
                    .single_target();
            }
        }
        let context = self.graph.class_by_name(context_holder)?;
        let super_class = self.graph.class(context).super_class.clone()?;
        let target = self
            .resolve_method_on_holder(&super_class, &method.sig)
            .single_target()?;
        (!self.graph.method(target).access.is_static()).then_some(target)
    }

    /// Resolves and keeps the target only if it is a static method.
    #[must_use]
    pub fn lookup_static_target(&self, method: &MethodRef) -> Option<MethodId> {
        let target = self
            .resolve_method_on_holder(&method.holder, &method.sig)
            .single_target()?;
        self.graph.method(target).access.is_static().then_some(target)
    }

    /// Resolves and keeps the target only if it is a direct method
    /// (private, constructor or static).
    #[must_use]
    pub fn lookup_direct_target(&self, method: &MethodRef) -> Option<MethodId> {
        let target = self
            .resolve_method_on_holder(&method.holder, &method.sig)
            .single_target()?;
        self.graph.method(target).is_direct().then_some(target)
    }

    /// Resolves starting at `receiver` and keeps the target only if it is a
    /// virtual method.
    #[must_use]
    pub fn lookup_virtual_target(&self, receiver: &TypeName, sig: &MethodSig) -> Option<MethodId> {
        let target = self.resolve_method_on_holder(receiver, sig).single_target()?;
        self.graph.method(target).is_virtual().then_some(target)
    }

    /// Every method a virtual/interface dispatch on the resolved target can
    /// select: the target itself plus each override declared in a transitive
    /// subtype of its holder.
    #[must_use]
    pub fn virtual_dispatch_targets(&self, resolved: MethodId) -> Vec<MethodId> {
        let def = self.graph.method(resolved);
        let sig = def.method.sig.clone();
        let mut targets = vec![resolved];
        let mut visited: HashSet<ClassId> = HashSet::new();
        visited.insert(def.holder);
        let mut stack = vec![def.holder];
        while let Some(class) = stack.pop() {
            let name = &self.graph.class(class).name;
            for &subtype in self.graph.immediate_subtypes(name) {
                if !visited.insert(subtype) {
                    continue;
                }
                if let Some(found) = self.graph.lookup_virtual_method(subtype, &sig) {
                    if !targets.contains(&found) {
                        targets.push(found);
                    }
                }
                stack.push(subtype);
            }
        }
        targets
    }
}
