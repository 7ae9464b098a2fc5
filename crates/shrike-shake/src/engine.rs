use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use thiserror::Error;

use shrike_graph::{
    ClassId, CodeRef, CodeTracer, FieldId, FieldRef, GraphCodeTracer, ItemRef, MethodDesc,
    MethodId, MethodRef, MethodSig, ProgramGraph, ReferenceSink, ReflectiveUse, TypeName,
};
use shrike_resolve::Resolver;

use crate::analysis::{FactView, FixpointAnalysis};
use crate::reason::KeepReason;
use crate::recorder::{class_node, field_node, method_node, EdgeRecorder, GraphConsumer};
use crate::result::LivenessResult;
use crate::roots::RootSet;
use crate::sets::{
    AddVisibility, FieldAccessTable, ReasonSet, ShadowScope, VisibleMethodScopes,
};
use crate::worklist::{Action, Worklist};

/// What the analysis is being run for. Main-dex tracing disables
/// unused-interface pruning and library-override liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    InitialTreeShaking,
    FinalTreeShaking,
    MainDexTracing,
}

impl Mode {
    #[must_use]
    pub fn is_initial_tree_shaking(self) -> bool {
        self == Mode::InitialTreeShaking
    }

    #[must_use]
    pub fn is_tracing_main_dex(self) -> bool {
        self == Mode::MainDexTracing
    }
}

/// Analysis configuration. All behavior toggles live here; there is no
/// ambient state.
#[derive(Debug, Clone)]
pub struct ShakeOptions {
    pub mode: Mode,
    /// Keep default initializers of kept classes and targeted interface
    /// defaults, the way the older shrinker did. Also downgrades the
    /// library-extends-program error to a warning.
    pub compatibility_mode: bool,
    /// Drop interfaces that are referenced only through implements clauses,
    /// have no superinterfaces and declare only abstract methods.
    pub prune_unused_interfaces: bool,
    /// Some runtimes skip private/static methods during virtual-invoke
    /// resolution instead of throwing. Off by default; this is a runtime
    /// quirk, not JVMS behavior.
    pub lenient_virtual_dispatch: bool,
}

impl Default for ShakeOptions {
    fn default() -> Self {
        Self {
            mode: Mode::InitialTreeShaking,
            compatibility_mode: false,
            prune_unused_interfaces: false,
            lenient_virtual_dispatch: false,
        }
    }
}

impl ShakeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_compatibility_mode(mut self, enabled: bool) -> Self {
        self.compatibility_mode = enabled;
        self
    }

    #[must_use]
    pub fn with_unused_interface_pruning(mut self, enabled: bool) -> Self {
        self.prune_unused_interfaces = enabled;
        self
    }

    #[must_use]
    pub fn with_lenient_virtual_dispatch(mut self, enabled: bool) -> Self {
        self.lenient_virtual_dispatch = enabled;
        self
    }
}

/// Fatal analysis failures. Recoverable conditions (missing references,
/// incompatible dispatch, broken super-invokes) are diagnostics on the
/// result instead.
#[derive(Debug, Error)]
pub enum ShakeError {
    #[error("library class {library} extends or implements program class {program}")]
    LibraryClassExtendsProgramClass { library: TypeName, program: TypeName },
}

/// A library class that depends on a program class. An error in initial
/// tree shaking, a warning in compatibility mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEscape {
    pub library: TypeName,
    pub program: TypeName,
}

/// Recoverable findings collected during the analysis, deduplicated by
/// reference.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub(crate) missing_classes: BTreeSet<TypeName>,
    pub(crate) missing_methods: BTreeSet<MethodRef>,
    pub(crate) missing_fields: BTreeSet<FieldRef>,
    pub(crate) library_escapes: Vec<LibraryEscape>,
}

impl Diagnostics {
    #[must_use]
    pub fn missing_classes(&self) -> Vec<&TypeName> {
        self.missing_classes.iter().collect()
    }

    #[must_use]
    pub fn missing_methods(&self) -> Vec<&MethodRef> {
        self.missing_methods.iter().collect()
    }

    #[must_use]
    pub fn missing_fields(&self) -> Vec<&FieldRef> {
        self.missing_fields.iter().collect()
    }

    #[must_use]
    pub fn library_escapes(&self) -> &[LibraryEscape] {
        &self.library_escapes
    }
}

/// The kind of invoke a call-site context was recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    Virtual,
    Interface,
    Super,
    Direct,
    Static,
}

/// Per-kind (reference -> calling contexts) maps, deduplicating repeated
/// registration of the same call-site pair.
#[derive(Debug, Default)]
pub(crate) struct InvokeContexts {
    maps: HashMap<InvokeKind, HashMap<MethodRef, BTreeSet<MethodId>>>,
}

impl InvokeContexts {
    fn add(&mut self, kind: InvokeKind, method: &MethodRef, context: MethodId) -> bool {
        self.maps
            .entry(kind)
            .or_default()
            .entry(method.clone())
            .or_default()
            .insert(context)
    }

    pub(crate) fn contexts(&self, kind: InvokeKind, method: &MethodRef) -> Vec<MethodId> {
        self.maps
            .get(&kind)
            .and_then(|map| map.get(method))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Every mutable fact discovered by the analysis, threaded explicitly
/// through the engine. All sets are monotonic.
#[derive(Debug, Default)]
pub(crate) struct AnalysisState {
    pub live_types: ReasonSet<ClassId>,
    pub live_library_types: HashSet<ClassId>,
    pub instantiated_types: ReasonSet<ClassId>,
    pub instantiated_interfaces: ReasonSet<ClassId>,
    /// Classes with an instantiated subtype (or instantiated themselves).
    pub instantiated_hierarchy: HashSet<ClassId>,
    pub targeted_methods: ReasonSet<MethodId>,
    pub live_methods: ReasonSet<MethodId>,
    pub live_fields: ReasonSet<FieldId>,
    /// Virtual methods reachable per holder class, pending an instantiation
    /// that makes them live.
    pub reachable_virtual: HashMap<ClassId, ReasonSet<MethodId>>,
    pub reachable_instance_fields: HashMap<ClassId, ReasonSet<FieldId>>,
    pub virtual_targets_marked_reachable: HashSet<MethodRef>,
    /// Caller -> super targets; replayed when the caller becomes live.
    pub super_invoke_dependencies: HashMap<MethodId, BTreeSet<MethodId>>,
    pub broken_super_invokes: BTreeSet<MethodRef>,
    pub virtual_methods_targeted_by_invoke_direct: HashSet<MethodRef>,
    pub pinned: HashSet<ItemRef>,
    pub field_access: FieldAccessTable,
    pub invokes: InvokeContexts,
    pub visible_methods: VisibleMethodScopes,
}

#[derive(Default)]
struct EventBuffer {
    refs: Vec<CodeRef>,
    reflective: Vec<ReflectiveUse>,
}

impl ReferenceSink for EventBuffer {
    fn register_code_ref(&mut self, reference: &CodeRef) {
        self.refs.push(reference.clone());
    }

    fn register_reflective_use(&mut self, use_: &ReflectiveUse) {
        self.reflective.push(use_.clone());
    }
}

/// Computes the transitive closure of live program elements from the root
/// set, to a fixpoint.
///
/// Draining the worklist resolves references, updates the liveness sets and
/// replays each newly live method's code references back into the queue.
/// When the queue runs dry, conditional rules, deferred reflective uses and
/// external analyses each get a chance to reseed it; the run ends when a
/// full pass adds nothing.
pub struct Enqueuer<'g, 'c> {
    graph: &'g ProgramGraph,
    resolver: Resolver<'g>,
    options: ShakeOptions,
    root_set: RootSet,
    tracer: Box<dyn CodeTracer + 'g>,
    recorder: EdgeRecorder<'c>,
    state: AnalysisState,
    worklist: Worklist,
    compat_worklist: Worklist,
    pending_reflective: Vec<(MethodId, ReflectiveUse)>,
    fired_rules: HashSet<usize>,
    analyses: Vec<Box<dyn FixpointAnalysis>>,
    diagnostics: Diagnostics,
}

impl<'g, 'c> Enqueuer<'g, 'c> {
    #[must_use]
    pub fn new(graph: &'g ProgramGraph, root_set: RootSet, options: ShakeOptions) -> Self {
        Self {
            graph,
            resolver: Resolver::new(graph),
            options,
            root_set,
            tracer: Box::new(GraphCodeTracer::new(graph)),
            recorder: EdgeRecorder::new(None),
            state: AnalysisState::default(),
            worklist: Worklist::new(),
            compat_worklist: Worklist::new(),
            pending_reflective: Vec::new(),
            fired_rules: HashSet::new(),
            analyses: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Replaces the default graph-embedded tracer with an external one.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Box<dyn CodeTracer + 'g>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Attaches a reachability-edge sink. Recording is purely additive;
    /// running without a consumer yields an identical live set.
    #[must_use]
    pub fn with_graph_consumer(mut self, consumer: &'c mut dyn GraphConsumer) -> Self {
        self.recorder = EdgeRecorder::new(Some(consumer));
        self
    }

    #[must_use]
    pub fn with_analysis(mut self, analysis: Box<dyn FixpointAnalysis>) -> Self {
        self.analyses.push(analysis);
        self
    }

    pub fn run(mut self) -> Result<LivenessResult<'g>, ShakeError> {
        self.enqueue_root_items();
        self.trace();
        if self.options.mode.is_initial_tree_shaking() && !self.options.compatibility_mode {
            if let Some(escape) = self.diagnostics.library_escapes.first() {
                return Err(ShakeError::LibraryClassExtendsProgramClass {
                    library: escape.library.clone(),
                    program: escape.program.clone(),
                });
            }
        }
        Ok(LivenessResult::new(self.graph, self.state, self.diagnostics))
    }

    fn enqueue_root_items(&mut self) {
        let items: Vec<_> = self.root_set.items().to_vec();
        for (item, rule) in items {
            self.enqueue_root_item(&item, KeepReason::KeepRule(rule));
        }
    }

    fn enqueue_root_item(&mut self, item: &ItemRef, reason: KeepReason) {
        match item {
            ItemRef::Class(ty) => {
                let Some(class) = self.graph.program_class_by_name(ty) else {
                    return;
                };
                let def = self.graph.class(class);
                let plain_interface = def.is_interface() && !def.is_annotation();
                if plain_interface {
                    self.mark_interface_instantiated(class, reason);
                } else {
                    self.worklist.enqueue_mark_instantiated(class, reason);
                    if self.options.compatibility_mode {
                        if let Some(init) = self.graph.default_initializer(class) {
                            self.compat_worklist
                                .enqueue_mark_method_kept(init, KeepReason::CompatibilityRule);
                        }
                    }
                }
            }
            ItemRef::Method(mref) => {
                let Some(method) = self.graph.definition_for_method(mref) else {
                    return;
                };
                self.worklist.enqueue_mark_method_kept(method, reason);
            }
            ItemRef::Field(fref) => {
                let Some(field) = self.graph.definition_for_field(fref) else {
                    return;
                };
                self.worklist.enqueue_mark_field_kept(field, reason);
            }
        }
        self.state.pinned.insert(item.clone());
    }

    /// Interfaces cannot be `new`'d, but keep rules and lambdas still pin
    /// them on a parallel instantiated-interface track.
    fn mark_interface_instantiated(&mut self, class: ClassId, reason: KeepReason) {
        if !self.add_instantiated_interface(class, reason.clone()) {
            return;
        }
        self.populate_instantiated_hierarchy(class);
        self.mark_class_live(class, reason);
    }

    fn trace(&mut self) {
        loop {
            let live_before = self.live_item_count();
            while let Some(action) = self.worklist.pop() {
                self.process_action(action);
            }

            if self.live_item_count() > live_before {
                self.evaluate_conditional_rules();
                if !self.worklist.is_empty() {
                    continue;
                }
            }

            if !self.pending_reflective.is_empty() {
                let pending = std::mem::take(&mut self.pending_reflective);
                for (context, use_) in pending {
                    self.handle_reflective_use(context, use_);
                }
            }
            if !self.compat_worklist.is_empty() {
                self.transfer_compat_actions();
            }
            if !self.worklist.is_empty() {
                continue;
            }

            self.notify_fixpoint_analyses();
            if !self.worklist.is_empty() {
                continue;
            }

            break;
        }
        tracing::debug!(
            live_types = self.state.live_types.len(),
            instantiated_types = self.state.instantiated_types.len(),
            live_methods = self.state.live_methods.len(),
            targeted_methods = self.state.targeted_methods.len(),
            live_fields = self.state.live_fields.len(),
            "fixpoint reached"
        );
    }

    fn live_item_count(&self) -> usize {
        self.state.live_types.len() + self.state.live_methods.len() + self.state.live_fields.len()
    }

    fn process_action(&mut self, action: Action) {
        match action {
            Action::MarkInstantiated { class, reason } => {
                self.process_newly_instantiated_class(class, reason);
            }
            Action::MarkReachableVirtual { method, reason } => {
                self.mark_virtual_method_reachable(method, false, reason);
            }
            Action::MarkReachableInterface { method, reason } => {
                self.mark_virtual_method_reachable(method, true, reason);
            }
            Action::MarkReachableDirect { method, reason } => {
                self.handle_invoke_of_direct_target(&method, reason);
            }
            Action::MarkReachableSuper { method, context } => {
                self.mark_super_method_reachable(&method, context);
            }
            Action::MarkReachableField { field, reason } => {
                self.mark_instance_field_reachable(field, reason);
            }
            Action::MarkMethodKept { method, reason } => {
                self.mark_method_kept(method, reason);
            }
            Action::MarkFieldKept { field, reason } => {
                self.mark_field_kept(field, reason);
            }
            Action::MarkMethodLive { method, reason } => {
                self.process_newly_live_method(method, reason);
            }
        }
    }

    //
    // Type liveness.
    //

    fn mark_type_live(&mut self, ty: &TypeName, reason: KeepReason) {
        if ty.is_array() {
            self.mark_type_live(&ty.base_type(), reason);
            return;
        }
        if !ty.is_class() {
            return;
        }
        let Some(class) = self.graph.class_by_name(ty) else {
            self.report_missing_class(ty);
            return;
        };
        self.mark_class_live(class, reason);
    }

    fn mark_class_live(&mut self, class: ClassId, reason: KeepReason) {
        if self.graph.class(class).is_library() {
            self.mark_library_class_live(class);
            return;
        }
        if !self.add_live_type(class, reason) {
            return;
        }
        tracing::debug!(class = %self.graph.class(class).name, "type became live");

        let cascade = KeepReason::ReachableFromType(class);
        let interfaces = self.graph.class(class).interfaces.clone();
        for iface in interfaces {
            self.mark_interface_live_via_inheritance(&iface, cascade.clone());
        }
        if let Some(super_class) = self.graph.class(class).super_class.clone() {
            self.mark_type_live(&super_class, cascade.clone());
        }

        self.ensure_methods_continue_to_widen_access(class, cascade.clone());

        if let Some(clinit) = self.graph.class_initializer(class) {
            if self.graph.method(clinit).may_have_side_effects() {
                self.mark_direct_method_live(clinit, cascade.clone());
            }
        }

        if self.graph.is_serializable(class) {
            self.enqueue_first_non_serializable_initializer(class, cascade);
        }
    }

    /// An interface referenced only through an implements clause, with no
    /// superinterfaces and only abstract methods, can be dropped from the
    /// hierarchy without changing runtime behavior.
    fn mark_interface_live_via_inheritance(&mut self, ty: &TypeName, reason: KeepReason) {
        if !self.options.prune_unused_interfaces || self.options.mode.is_tracing_main_dex() {
            self.mark_type_live(ty, reason);
            return;
        }
        let Some(class) = self.graph.program_class_by_name(ty) else {
            if self.graph.class_by_name(ty).is_some() {
                self.mark_type_live(ty, reason);
            }
            return;
        };
        if !self.graph.class(class).is_interface()
            || !self.graph.class(class).interfaces.is_empty()
        {
            self.mark_class_live(class, reason);
            return;
        }
        let has_default = self
            .graph
            .virtual_methods_of(class)
            .any(|m| !self.graph.method(m).access.is_abstract());
        if has_default {
            self.mark_class_live(class, reason);
        }
    }

    fn mark_library_class_live(&mut self, class: ClassId) {
        if !self.state.live_library_types.insert(class) {
            return;
        }
        // Library virtual methods join the visibility scopes so program
        // subclasses that widen access are still caught.
        let methods: Vec<MethodId> = self.graph.virtual_methods_of(class).collect();
        for method in methods {
            let sig = self.graph.method(method).method.sig.clone();
            let visibility = self.graph.method(method).access.visibility();
            self.state
                .visible_methods
                .add_if_more_visible(self.graph, class, &sig, visibility);
        }

        let name = self.graph.class(class).name.clone();
        let supertypes: Vec<TypeName> = {
            let def = self.graph.class(class);
            def.super_class
                .iter()
                .chain(def.interfaces.iter())
                .cloned()
                .collect()
        };
        for supertype in supertypes {
            let Some(super_id) = self.graph.class_by_name(&supertype) else {
                continue;
            };
            if self.graph.class(super_id).is_program() {
                tracing::warn!(
                    library = %name,
                    program = %supertype,
                    "library class extends or implements program class"
                );
                self.diagnostics.library_escapes.push(LibraryEscape {
                    library: name.clone(),
                    program: supertype.clone(),
                });
                self.mark_class_live(super_id, KeepReason::ReachableFromType(class));
            } else {
                self.mark_library_class_live(super_id);
            }
        }
    }

    /// A virtual method that widens access relative to a signature already
    /// visible above it cannot be removed: class loading would fail the
    /// override check. Such methods stay targeted even when unreferenced.
    fn ensure_methods_continue_to_widen_access(&mut self, class: ClassId, reason: KeepReason) {
        let methods: Vec<MethodId> = self.graph.virtual_methods_of(class).collect();
        for method in methods {
            let sig = self.graph.method(method).method.sig.clone();
            let visibility = self.graph.method(method).access.visibility();
            let added = self
                .state
                .visible_methods
                .add_if_more_visible(self.graph, class, &sig, visibility);
            if added == AddVisibility::AddedMoreVisible
                && self.method_defined_in_interfaces(class, &sig)
            {
                self.mark_method_targeted(method, reason.clone());
            }
        }
    }

    fn method_defined_in_interfaces(&self, class: ClassId, sig: &MethodSig) -> bool {
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for iface in &self.graph.class(current).interfaces {
                if let Some(id) = self.graph.class_by_name(iface) {
                    if self.graph.lookup_method(id, sig).is_some() {
                        return true;
                    }
                    stack.push(id);
                }
            }
            if let Some(super_id) = self.graph.superclass_of(current) {
                stack.push(super_id);
            }
        }
        false
    }

    /// Serialization bypasses constructors down to the first
    /// non-serializable superclass, whose default initializer must survive.
    fn enqueue_first_non_serializable_initializer(&mut self, class: ClassId, reason: KeepReason) {
        let mut current = class;
        while self.graph.is_serializable(current) {
            let Some(super_id) = self
                .graph
                .superclass_of(current)
                .filter(|id| self.graph.class(*id).is_program())
            else {
                return;
            };
            current = super_id;
        }
        if let Some(init) = self.graph.default_initializer(current) {
            self.mark_direct_method_live(init, reason);
        }
    }

    //
    // Instantiation.
    //

    fn process_newly_instantiated_class(&mut self, class: ClassId, reason: KeepReason) {
        // Analyses see every (class, reason) pair, not just the first, so
        // their behavior does not depend on processing order.
        let mut analyses = std::mem::take(&mut self.analyses);
        for analysis in &mut analyses {
            analysis.process_newly_instantiated_class(self.graph, class, &reason);
        }
        self.analyses = analyses;

        let def = self.graph.class(class);
        if def.is_interface() && !def.is_annotation() {
            self.mark_class_live(class, reason);
            return;
        }
        if !self.add_instantiated_type(class, reason.clone()) {
            return;
        }
        tracing::debug!(class = %self.graph.class(class).name, "class is instantiated");

        self.populate_instantiated_hierarchy(class);
        self.mark_class_live(class, reason);
        self.transition_methods_for_instantiated_class(class);
        self.transition_fields_for_instantiated_class(class);
    }

    fn populate_instantiated_hierarchy(&mut self, class: ClassId) {
        let mut stack = vec![class];
        while let Some(current) = stack.pop() {
            if !self.state.instantiated_hierarchy.insert(current) {
                continue;
            }
            let def = self.graph.class(current);
            let supertypes: Vec<TypeName> = def
                .super_class
                .iter()
                .chain(def.interfaces.iter())
                .cloned()
                .collect();
            for supertype in supertypes {
                if let Some(id) = self.graph.program_class_by_name(&supertype) {
                    stack.push(id);
                }
            }
        }
    }

    /// Replays every previously seen call that could target the newly
    /// instantiated class: reachable virtual methods on the class chain
    /// first, then unshadowed interface default methods, then overrides of
    /// library virtuals.
    fn transition_methods_for_instantiated_class(&mut self, class: ClassId) {
        let mut seen = ShadowScope::new();
        let mut interfaces: Vec<TypeName> = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            self.transition_reachable_virtual_methods(c, &mut seen);
            interfaces.extend(self.graph.class(c).interfaces.iter().cloned());
            current = self
                .graph
                .superclass_of(c)
                .filter(|s| self.graph.class(*s).is_program())
                .filter(|s| !self.state.instantiated_types.contains(*s));
        }

        // A default method is reachable only when nothing on the class chain
        // shadows it, and sibling interface chains do not shadow each other.
        let mut visited: HashSet<TypeName> = HashSet::new();
        let mut pending: VecDeque<TypeName> = interfaces.into();
        while let Some(name) = pending.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(iface) = self.graph.program_class_by_name(&name) else {
                if self.graph.class_by_name(&name).is_none() {
                    self.report_missing_class(&name);
                }
                continue;
            };
            let mut nested = seen.nested();
            self.transition_reachable_virtual_methods(iface, &mut nested);
            pending.extend(self.graph.class(iface).interfaces.iter().cloned());
        }

        if !self.options.mode.is_tracing_main_dex() {
            self.mark_library_override_methods_live(class);
        }
    }

    fn transition_reachable_virtual_methods(&mut self, class: ClassId, scope: &mut ShadowScope<'_>) {
        let items: Vec<(MethodId, KeepReason)> = self
            .state
            .reachable_virtual
            .get(&class)
            .map(|set| {
                set.iter()
                    .map(|(method, reasons)| (method, reasons[0].clone()))
                    .collect()
            })
            .unwrap_or_default();
        for (method, reason) in items {
            let sig = self.graph.method(method).method.sig.clone();
            if scope.add(sig) && !self.graph.method(method).access.is_abstract() {
                self.mark_virtual_method_live(method, reason);
            }
        }
    }

    /// A program override of a library virtual method is callable through
    /// the library, so instantiating the class makes the override live.
    fn mark_library_override_methods_live(&mut self, instantiated: ClassId) {
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut stack = vec![instantiated];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self.graph.class(current).is_library() {
                let library = self.graph.class(current).name.clone();
                let sigs: Vec<MethodSig> = self
                    .graph
                    .virtual_methods_of(current)
                    .map(|m| self.graph.method(m).method.sig.clone())
                    .collect();
                for sig in sigs {
                    let outcome = self.resolver.resolve_method_from(instantiated, &sig);
                    let targets: Vec<MethodId> = outcome.targets().collect();
                    for target in targets {
                        let access = self.graph.method(target).access;
                        if access.is_abstract() || !self.graph.method(target).is_virtual() {
                            continue;
                        }
                        let holder = self.graph.method(target).holder;
                        if self.graph.class(holder).is_program() {
                            let reason = KeepReason::OverridesLibraryMethod(library.clone());
                            self.mark_method_targeted(target, reason.clone());
                            self.mark_virtual_method_live(target, reason);
                        }
                    }
                }
            }
            let def = self.graph.class(current);
            let supertypes: Vec<TypeName> = def
                .super_class
                .iter()
                .chain(def.interfaces.iter())
                .cloned()
                .collect();
            for supertype in supertypes {
                if let Some(id) = self.graph.class_by_name(&supertype) {
                    stack.push(id);
                }
            }
        }
    }

    fn transition_fields_for_instantiated_class(&mut self, class: ClassId) {
        let mut current = Some(class);
        while let Some(c) = current {
            let fields: Vec<FieldId> = self
                .state
                .reachable_instance_fields
                .get(&c)
                .map(|set| set.keys().collect())
                .unwrap_or_default();
            for field in fields {
                self.mark_instance_field_live(field, KeepReason::ReachableFromType(c));
            }
            current = self
                .graph
                .superclass_of(c)
                .filter(|s| self.graph.class(*s).is_program())
                .filter(|s| !self.state.instantiated_types.contains(*s));
        }
    }

    //
    // Method reachability and liveness.
    //

    fn mark_virtual_method_reachable(
        &mut self,
        method: MethodRef,
        interface_invoke: bool,
        reason: KeepReason,
    ) {
        if !self
            .state
            .virtual_targets_marked_reachable
            .insert(method.clone())
        {
            return;
        }
        tracing::trace!(method = %method, "virtual method is reachable");
        if method.holder.is_array() {
            // Runtime-generated array classes have no subtypes that could
            // affect liveness; only the element type must survive.
            self.mark_type_live(&method.holder, reason);
            return;
        }
        if self.graph.class_by_name(&method.holder).is_none() {
            self.report_missing_class(&method.holder);
            return;
        }
        let Some(resolved) = self.find_and_mark_resolution_target(&method, interface_invoke, &reason)
        else {
            return;
        };
        if !self.graph.method(resolved).is_virtual() {
            return;
        }

        let possible = self.resolver.virtual_dispatch_targets(resolved);
        let overrides_reason = KeepReason::OverridesMethod(resolved);
        for target in possible {
            if self.graph.method(target).access.is_abstract() {
                continue;
            }
            let target_reason = if target == resolved {
                reason.clone()
            } else {
                overrides_reason.clone()
            };
            self.mark_possible_target_reachable(target, target_reason);
        }
    }

    /// Resolves a dispatch reference, keeping every resolution target
    /// targeted even when dispatch will fail, so failing call sites keep
    /// failing the same way after shrinking.
    fn find_and_mark_resolution_target(
        &mut self,
        method: &MethodRef,
        interface_invoke: bool,
        reason: &KeepReason,
    ) -> Option<MethodId> {
        let outcome = self
            .resolver
            .resolve_method(&method.holder, &method.sig, interface_invoke);
        let Some(target) = outcome.single_target() else {
            let ambiguous: Vec<MethodId> = outcome.targets().collect();
            for target in ambiguous {
                self.mark_method_targeted(target, reason.clone());
            }
            if outcome.is_failure() {
                self.report_missing_method(method);
            }
            return None;
        };
        self.mark_method_targeted(target, reason.clone());

        let access = self.graph.method(target).access;
        if access.is_private() || access.is_static() {
            // A virtual invoke resolving to a private/static method is a
            // verification-level inconsistency: targeted, never live. Some
            // runtimes instead keep searching the superclass chain.
            if !self.options.lenient_virtual_dispatch {
                return None;
            }
            return self.resolve_past_non_virtual_target(method, target, reason);
        }
        Some(target)
    }

    fn resolve_past_non_virtual_target(
        &mut self,
        method: &MethodRef,
        mut target: MethodId,
        reason: &KeepReason,
    ) -> Option<MethodId> {
        loop {
            let access = self.graph.method(target).access;
            if !access.is_private() && !access.is_static() {
                break;
            }
            let holder = self.graph.method(target).holder;
            let super_class = self.graph.class(holder).super_class.clone()?;
            let as_interface = self.graph.class(holder).is_interface();
            target = self
                .resolver
                .resolve_method(&super_class, &method.sig, as_interface)
                .single_target()?;
        }
        self.mark_method_targeted(target, reason.clone());
        Some(target)
    }

    fn mark_possible_target_reachable(&mut self, target: MethodId, reason: KeepReason) {
        let holder = self.graph.method(target).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if !self.add_reachable_virtual(holder, target, reason.clone()) {
            return;
        }
        if !self.state.instantiated_hierarchy.contains(&holder) {
            return;
        }
        let holder_item = ItemRef::Class(self.graph.class(holder).name.clone());
        if self.state.instantiated_types.contains(holder)
            || self.state.instantiated_interfaces.contains(holder)
            || self.state.pinned.contains(&holder_item)
        {
            self.mark_virtual_method_live(target, reason);
            return;
        }
        // Look for an instantiated subtype that does not shadow the method;
        // an overriding subtype ends that branch of the search.
        let sig = self.graph.method(target).method.sig.clone();
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut queue: VecDeque<ClassId> = self
            .graph
            .immediate_subtypes(&self.graph.class(holder).name)
            .iter()
            .copied()
            .collect();
        while let Some(subtype) = queue.pop_front() {
            if !visited.insert(subtype) {
                continue;
            }
            if self.graph.lookup_virtual_method(subtype, &sig).is_some() {
                continue;
            }
            if self.state.instantiated_types.contains(subtype)
                || self.state.instantiated_interfaces.contains(subtype)
            {
                self.mark_virtual_method_live(target, reason);
                return;
            }
            queue.extend(
                self.graph
                    .immediate_subtypes(&self.graph.class(subtype).name)
                    .iter()
                    .copied(),
            );
        }
    }

    /// Super-invokes resolve the symbolic reference first (a failure there
    /// is a resolution error at runtime), then compute the actual target in
    /// the calling context. The target only becomes live once the calling
    /// method does.
    fn mark_super_method_reachable(&mut self, method: &MethodRef, from: MethodId) {
        let outcome = self.resolver.resolve_method_on_holder(&method.holder, &method.sig);
        let Some(resolved) = outcome.single_target() else {
            self.state.broken_super_invokes.insert(method.clone());
            self.report_missing_method(method);
            return;
        };
        let access = self.graph.method(resolved).access;
        if access.is_private() || access.is_static() {
            self.state.broken_super_invokes.insert(method.clone());
        }
        self.mark_method_targeted(resolved, KeepReason::TargetedBySuper(from));

        let from_holder = self.graph.class(self.graph.method(from).holder).name.clone();
        let Some(target) = self.resolver.lookup_super_target(method, &from_holder) else {
            self.report_missing_method(method);
            return;
        };
        let target_holder = self.graph.method(target).holder;
        if !self.graph.class(target_holder).is_program() {
            return;
        }
        if self.graph.method(target).access.is_private() {
            self.state.broken_super_invokes.insert(method.clone());
        }
        tracing::trace!(
            from = %self.graph.method(from).method,
            to = %self.graph.method(target).method,
            "super-invoke dependency"
        );
        let newly = self
            .state
            .super_invoke_dependencies
            .entry(from)
            .or_default()
            .insert(target);
        if newly && self.state.live_methods.contains(from) {
            self.mark_method_targeted(target, KeepReason::InvokedViaSuper(from));
            if !self.graph.method(target).access.is_abstract() {
                self.mark_virtual_method_live(target, KeepReason::InvokedViaSuper(from));
            }
        }
    }

    fn mark_method_kept(&mut self, method: MethodId, reason: KeepReason) {
        let holder = self.graph.method(method).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if self.graph.method(method).is_virtual() {
            // Keep the method reachable so instantiated subclasses retain
            // their overrides; a keep rule alone does not prove the holder
            // is ever instantiated.
            let mref = self.graph.method(method).method.clone();
            if !self.graph.class(holder).is_interface() {
                self.worklist.enqueue_mark_reachable_virtual(mref, reason);
            } else {
                self.worklist
                    .enqueue_mark_reachable_interface(mref, reason.clone());
                if !self.graph.method(method).access.is_abstract() {
                    self.mark_virtual_method_live(method, reason);
                }
            }
        } else {
            self.mark_method_targeted(method, reason.clone());
            self.mark_direct_method_live(method, reason);
        }
    }

    fn mark_field_kept(&mut self, field: FieldId, reason: KeepReason) {
        let holder = self.graph.field(field).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if self.graph.field(field).access.is_static() {
            self.mark_static_field_live(field, reason);
        } else {
            self.mark_instance_field_reachable(field, reason);
        }
    }

    fn mark_method_targeted(&mut self, method: MethodId, reason: KeepReason) {
        let holder = self.graph.method(method).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if !self.add_targeted_method(method, reason) {
            return;
        }
        tracing::debug!(method = %self.graph.method(method).method, "method is targeted");

        self.mark_class_live(holder, KeepReason::ReferencedFrom(method));
        self.mark_parameter_and_return_types_live(method);

        if self.options.compatibility_mode
            && !self.graph.method(method).access.is_abstract()
            && self.graph.class(holder).is_interface()
        {
            // The pruner would otherwise turn targeted interface defaults
            // into abstract stubs; the older shrinker kept their bodies.
            self.compat_worklist
                .enqueue_mark_method_live(method, KeepReason::CompatibilityRule);
        }
    }

    fn mark_parameter_and_return_types_live(&mut self, method: MethodId) {
        let desc = self.graph.method(method).method.sig.desc.clone();
        for param in desc.params {
            self.mark_type_live(&param, KeepReason::ReferencedFrom(method));
        }
        self.mark_type_live(&desc.ret, KeepReason::ReferencedFrom(method));
    }

    fn mark_virtual_method_live(&mut self, method: MethodId, reason: KeepReason) {
        debug_assert!(
            !self.graph.method(method).access.is_abstract()
                || matches!(
                    reason,
                    KeepReason::KeepRule(_)
                        | KeepReason::ConditionalKeepRule(_)
                        | KeepReason::CompatibilityRule
                        | KeepReason::ReflectiveUse(_)
                )
        );
        if self.enqueue_mark_method_live(method, reason) {
            tracing::debug!(method = %self.graph.method(method).method, "virtual method is live");
        }
    }

    fn mark_direct_method_live(&mut self, method: MethodId, reason: KeepReason) {
        if self.enqueue_mark_method_live(method, reason) {
            tracing::debug!(method = %self.graph.method(method).method, "direct method is live");
        }
    }

    /// Commits liveness at enqueue time so duplicate work never enters the
    /// queue; the queued action performs the tracing.
    fn enqueue_mark_method_live(&mut self, method: MethodId, reason: KeepReason) -> bool {
        let holder = self.graph.method(method).holder;
        debug_assert!(self.graph.class(holder).is_program());
        if !self.add_live_method(method, reason.clone()) {
            return false;
        }
        self.mark_class_live(holder, reason.clone());
        self.worklist.enqueue_mark_method_live(method, reason);
        true
    }

    fn process_newly_live_method(&mut self, method: MethodId, _reason: KeepReason) {
        debug_assert!(self.state.live_methods.contains(method));

        // Super-invoke targets recorded earlier become targeted and live now
        // that a caller is live.
        let dependents: Vec<MethodId> = self
            .state
            .super_invoke_dependencies
            .get(&method)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for target in dependents {
            self.mark_method_targeted(target, KeepReason::InvokedViaSuper(method));
            if !self.graph.method(target).access.is_abstract() {
                self.mark_virtual_method_live(target, KeepReason::InvokedViaSuper(method));
            }
        }

        self.mark_parameter_and_return_types_live(method);

        let mut buffer = EventBuffer::default();
        self.tracer.register_code_references(method, &mut buffer);
        for reference in buffer.refs {
            self.process_code_ref(method, reference);
        }
        for use_ in buffer.reflective {
            self.pending_reflective.push((method, use_));
        }

        let mut analyses = std::mem::take(&mut self.analyses);
        for analysis in &mut analyses {
            analysis.process_newly_live_method(self.graph, method);
        }
        self.analyses = analyses;
    }

    //
    // Code-reference events, the bytecode-traversal interface.
    //

    fn process_code_ref(&mut self, context: MethodId, reference: CodeRef) {
        match reference {
            CodeRef::InvokeVirtual(method) => {
                if self.register_invoke(InvokeKind::Virtual, &method, context) {
                    tracing::trace!(method = %method, "register invoke-virtual");
                    self.worklist
                        .enqueue_mark_reachable_virtual(method, KeepReason::InvokedFrom(context));
                }
            }
            CodeRef::InvokeInterface(method) => {
                if self.register_invoke(InvokeKind::Interface, &method, context) {
                    tracing::trace!(method = %method, "register invoke-interface");
                    self.worklist
                        .enqueue_mark_reachable_interface(method, KeepReason::InvokedFrom(context));
                }
            }
            CodeRef::InvokeDirect(method) => {
                if self.register_invoke(InvokeKind::Direct, &method, context) {
                    tracing::trace!(method = %method, "register invoke-direct");
                    self.handle_invoke_of_direct_target(&method, KeepReason::InvokedFrom(context));
                }
            }
            CodeRef::InvokeStatic(method) => {
                if self.register_invoke(InvokeKind::Static, &method, context) {
                    tracing::trace!(method = %method, "register invoke-static");
                    self.handle_invoke_of_static_target(&method, KeepReason::InvokedFrom(context));
                }
            }
            CodeRef::InvokeSuper(method) => {
                // The same reference hits different targets depending on the
                // calling context, so the context rides along on the action.
                if self.register_invoke(InvokeKind::Super, &method, context) {
                    tracing::trace!(method = %method, "register invoke-super");
                    self.worklist.enqueue_mark_reachable_super(method, context);
                }
            }
            CodeRef::NewInstance(ty) => {
                self.register_new_instance(&ty, KeepReason::InstantiatedIn(context));
            }
            CodeRef::ConstClass(ty) => {
                let base = ty.base_type();
                if base.is_class() {
                    self.mark_type_live(&base, KeepReason::ReferencedFrom(context));
                }
            }
            CodeRef::InstanceFieldRead(field) => {
                self.register_instance_field_access(&field, context, true);
            }
            CodeRef::InstanceFieldWrite(field) => {
                self.register_instance_field_access(&field, context, false);
            }
            CodeRef::StaticFieldRead(field) => {
                self.register_static_field_access(&field, context, true);
            }
            CodeRef::StaticFieldWrite(field) => {
                self.register_static_field_access(&field, context, false);
            }
        }
    }

    fn register_invoke(&mut self, kind: InvokeKind, method: &MethodRef, context: MethodId) -> bool {
        let base = method.holder.base_type();
        if !base.is_class() {
            return false;
        }
        self.mark_type_live(&base, KeepReason::ReferencedFrom(context));
        self.state.invokes.add(kind, method, context)
    }

    fn register_new_instance(&mut self, ty: &TypeName, reason: KeepReason) {
        let Some(class) = self.graph.program_class_by_name(ty) else {
            if self.graph.class_by_name(ty).is_none() {
                self.report_missing_class(ty);
            }
            return;
        };
        if self.graph.class(class).is_interface() {
            self.mark_class_live(class, reason);
        } else {
            tracing::trace!(class = %ty, "register new-instance");
            self.worklist.enqueue_mark_instantiated(class, reason);
        }
    }

    fn register_instance_field_access(&mut self, field: &FieldRef, context: MethodId, is_read: bool) {
        let resolved = self.resolver.resolve_field(&field.holder, &field.sig);
        let resolved_ref = resolved.map(|id| self.graph.field(id).field.clone());
        if !self
            .state
            .field_access
            .record(field, resolved_ref.as_ref(), context, is_read)
        {
            return;
        }
        // The referenced types must survive even when the field is missing,
        // so the access keeps failing the same way.
        self.mark_type_live(&field.holder, KeepReason::ReferencedFrom(context));
        self.mark_type_live(&field.sig.ty, KeepReason::ReferencedFrom(context));

        let Some(resolved) = resolved else {
            self.report_missing_field(field);
            return;
        };
        let holder = self.graph.field(resolved).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        tracing::trace!(field = %field, "register instance field access");
        self.worklist
            .enqueue_mark_reachable_field(resolved, KeepReason::FieldReferencedIn(context));
    }

    fn register_static_field_access(&mut self, field: &FieldRef, context: MethodId, is_read: bool) {
        let resolved = self.resolver.resolve_field(&field.holder, &field.sig);
        let resolved_ref = resolved.map(|id| self.graph.field(id).field.clone());
        if !self
            .state
            .field_access
            .record(field, resolved_ref.as_ref(), context, is_read)
        {
            return;
        }
        let Some(resolved) = resolved else {
            self.mark_type_live(&field.holder, KeepReason::ReferencedFrom(context));
            self.mark_type_live(&field.sig.ty, KeepReason::ReferencedFrom(context));
            self.report_missing_field(field);
            return;
        };
        let holder = self.graph.field(resolved).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if self.graph.field(resolved).field != *field {
            // A non-rebound reference pins the named holder as well.
            self.mark_type_live(&field.holder, KeepReason::ReferencedFrom(context));
        }
        tracing::trace!(field = %field, "register static field access");
        self.mark_static_field_live(resolved, KeepReason::FieldReferencedIn(context));
    }

    fn handle_invoke_of_direct_target(&mut self, method: &MethodRef, reason: KeepReason) {
        let Some(class) = self.graph.program_class_by_name(&method.holder) else {
            return;
        };
        let Some(target) = self.graph.lookup_method(class, &method.sig) else {
            self.report_missing_method(method);
            return;
        };
        // Targeted even when invocation would fail, so the failure survives.
        self.mark_method_targeted(target, reason.clone());
        if self.graph.method(target).access.is_static() {
            return;
        }
        self.mark_direct_method_live(target, reason);
        // An invoke-direct may legally hit a default method of the same
        // interface; in a class this would be a verification error.
        if self.graph.method(target).is_virtual() {
            self.state
                .virtual_methods_targeted_by_invoke_direct
                .insert(method.clone());
        }
    }

    fn handle_invoke_of_static_target(&mut self, method: &MethodRef, reason: KeepReason) {
        let outcome = self.resolver.resolve_method_on_holder(&method.holder, &method.sig);
        let Some(target) = outcome.single_target() else {
            if outcome.is_failure() {
                self.report_missing_method(method);
            }
            return;
        };
        let holder = self.graph.method(target).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        self.mark_method_targeted(target, reason.clone());
        // Only invocations that succeed at runtime make the target live.
        if self.graph.method(target).access.is_static() {
            if let Some(clinit) = self.graph.class_initializer(holder) {
                self.recorder
                    .record(self.graph, &self.root_set, &reason, method_node(self.graph, clinit));
            }
            self.mark_direct_method_live(target, reason);
        }
    }

    //
    // Field liveness.
    //

    fn mark_instance_field_reachable(&mut self, field: FieldId, reason: KeepReason) {
        let fref = self.graph.field(field).field.clone();
        tracing::trace!(field = %fref, "instance field is reachable");
        self.mark_type_live(&fref.holder, reason.clone());
        self.mark_type_live(&fref.sig.ty, reason.clone());

        let holder = self.graph.field(field).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if self.graph.field(field).access.is_static() {
            // An instance access dispatched to a static field must keep the
            // static field so the dispatch keeps failing at runtime.
            self.mark_static_field_live(field, reason);
        } else if self.state.instantiated_hierarchy.contains(&holder) {
            self.mark_instance_field_live(field, reason);
        } else {
            self.add_reachable_instance_field(holder, field, reason);
        }
    }

    fn mark_static_field_live(&mut self, field: FieldId, reason: KeepReason) {
        let fref = self.graph.field(field).field.clone();
        self.mark_type_live(&fref.holder, reason.clone());
        self.mark_type_live(&fref.sig.ty, reason.clone());
        let holder = self.graph.field(field).holder;
        if !self.graph.class(holder).is_program() {
            return;
        }
        if let Some(clinit) = self.graph.class_initializer(holder) {
            self.recorder
                .record(self.graph, &self.root_set, &reason, method_node(self.graph, clinit));
        }
        if self.add_live_field(field, reason) {
            tracing::debug!(field = %fref, "static field is live");
            let mut analyses = std::mem::take(&mut self.analyses);
            for analysis in &mut analyses {
                analysis.process_newly_live_field(self.graph, field);
            }
            self.analyses = analyses;
        }
    }

    fn mark_instance_field_live(&mut self, field: FieldId, reason: KeepReason) {
        let fref = self.graph.field(field).field.clone();
        self.mark_type_live(&fref.holder, reason.clone());
        self.mark_type_live(&fref.sig.ty, reason.clone());
        if self.add_live_field(field, reason) {
            tracing::debug!(field = %fref, "instance field is live");
            let mut analyses = std::mem::take(&mut self.analyses);
            for analysis in &mut analyses {
                analysis.process_newly_live_field(self.graph, field);
            }
            self.analyses = analyses;
        }
    }

    //
    // Fixpoint stages.
    //

    fn evaluate_conditional_rules(&mut self) {
        let rules: Vec<_> = self
            .root_set
            .conditional_rules()
            .iter()
            .cloned()
            .enumerate()
            .filter(|(idx, _)| !self.fired_rules.contains(idx))
            .collect();
        for (idx, rule) in rules {
            if rule.if_live.iter().all(|item| self.is_item_live(item)) {
                self.fired_rules.insert(idx);
                tracing::debug!(rule = %self.root_set.rule(rule.rule).name, "conditional rule fired");
                for item in &rule.keep {
                    self.enqueue_root_item(item, KeepReason::ConditionalKeepRule(rule.rule));
                }
            }
        }
    }

    fn is_item_live(&self, item: &ItemRef) -> bool {
        match item {
            ItemRef::Class(ty) => self
                .graph
                .program_class_by_name(ty)
                .is_some_and(|class| self.state.live_types.contains(class)),
            ItemRef::Method(mref) => self.graph.definition_for_method(mref).is_some_and(|id| {
                self.state.live_methods.contains(id) || self.state.targeted_methods.contains(id)
            }),
            ItemRef::Field(fref) => self
                .graph
                .definition_for_field(fref)
                .is_some_and(|id| self.state.live_fields.contains(id)),
        }
    }

    fn handle_reflective_use(&mut self, context: MethodId, use_: ReflectiveUse) {
        let reason = KeepReason::ReflectiveUse(context);
        match use_ {
            ReflectiveUse::ClassForName(ty) => {
                self.mark_type_live(&ty, reason);
            }
            ReflectiveUse::ClassNewInstance(ty) => {
                let Some(class) = self.graph.program_class_by_name(&ty) else {
                    return;
                };
                if self.graph.class(class).is_interface() {
                    self.mark_class_live(class, reason);
                    return;
                }
                self.mark_class_instantiated_with_reason(class, reason);
            }
            ReflectiveUse::EnumValueOf(ty) => {
                let Some(class) = self.graph.program_class_by_name(&ty) else {
                    return;
                };
                self.mark_class_live(class, reason.clone());
                let value_of = MethodSig::new(
                    "valueOf",
                    MethodDesc::new([TypeName::string()], ty.clone()),
                );
                let values = MethodSig::new("values", MethodDesc::new([], ty.array_of()));
                for sig in [value_of, values] {
                    if let Some(method) = self.graph.lookup_method(class, &sig) {
                        self.worklist.enqueue_mark_method_kept(method, reason.clone());
                    }
                }
            }
            ReflectiveUse::ServiceLoaderLoad(ty) => {
                self.mark_type_live(&ty, reason.clone());
                let implementors: Vec<ClassId> = self.graph.immediate_subtypes(&ty).to_vec();
                for class in implementors {
                    let def = self.graph.class(class);
                    if def.is_program() && !def.is_interface() && !def.is_abstract() {
                        self.mark_class_instantiated_with_reason(class, reason.clone());
                    }
                }
            }
        }
    }

    fn mark_class_instantiated_with_reason(&mut self, class: ClassId, reason: KeepReason) {
        self.worklist.enqueue_mark_instantiated(class, reason.clone());
        if let Some(init) = self.graph.default_initializer(class) {
            let mref = self.graph.method(init).method.clone();
            self.worklist.enqueue_mark_reachable_direct(mref, reason);
        }
    }

    /// The compatibility bucket drains only once the primary queue is
    /// empty; already-live methods are dropped during the transfer.
    fn transfer_compat_actions(&mut self) {
        let mut compat = std::mem::take(&mut self.compat_worklist);
        while let Some(action) = compat.pop() {
            match action {
                Action::MarkMethodLive { method, reason } => {
                    self.enqueue_mark_method_live(method, reason);
                }
                other => self.worklist.push(other),
            }
        }
    }

    fn notify_fixpoint_analyses(&mut self) {
        let mut analyses = std::mem::take(&mut self.analyses);
        {
            let facts = FactView {
                live_types: &self.state.live_types,
                instantiated_types: &self.state.instantiated_types,
                live_methods: &self.state.live_methods,
                targeted_methods: &self.state.targeted_methods,
                live_fields: &self.state.live_fields,
            };
            for analysis in &mut analyses {
                analysis.notify_fixpoint(self.graph, &facts, &mut self.worklist);
            }
        }
        self.analyses = analyses;
    }

    //
    // Set insertion with provenance recording.
    //

    fn add_live_type(&mut self, class: ClassId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, class_node(self.graph, class));
        self.state.live_types.add(class, reason)
    }

    fn add_instantiated_type(&mut self, class: ClassId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, class_node(self.graph, class));
        self.state.instantiated_types.add(class, reason)
    }

    fn add_instantiated_interface(&mut self, class: ClassId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, class_node(self.graph, class));
        self.state.instantiated_interfaces.add(class, reason)
    }

    fn add_targeted_method(&mut self, method: MethodId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, method_node(self.graph, method));
        self.state.targeted_methods.add(method, reason)
    }

    fn add_live_method(&mut self, method: MethodId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, method_node(self.graph, method));
        self.state.live_methods.add(method, reason)
    }

    fn add_live_field(&mut self, field: FieldId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, field_node(self.graph, field));
        self.state.live_fields.add(field, reason)
    }

    fn add_reachable_virtual(&mut self, holder: ClassId, method: MethodId, reason: KeepReason) -> bool {
        self.recorder
            .record(self.graph, &self.root_set, &reason, method_node(self.graph, method));
        self.state
            .reachable_virtual
            .entry(holder)
            .or_default()
            .add(method, reason)
    }

    fn add_reachable_instance_field(&mut self, holder: ClassId, field: FieldId, reason: KeepReason) {
        self.recorder
            .record(self.graph, &self.root_set, &reason, field_node(self.graph, field));
        self.state
            .reachable_instance_fields
            .entry(holder)
            .or_default()
            .add(field, reason);
    }

    //
    // Diagnostics.
    //

    fn report_missing_class(&mut self, ty: &TypeName) {
        if self.diagnostics.missing_classes.insert(ty.clone()) {
            tracing::debug!(class = %ty, "class is missing");
        }
    }

    fn report_missing_method(&mut self, method: &MethodRef) {
        if self.diagnostics.missing_methods.insert(method.clone()) {
            tracing::debug!(method = %method, "method is missing");
        }
    }

    fn report_missing_field(&mut self, field: &FieldRef) {
        if self.diagnostics.missing_fields.insert(field.clone()) {
            tracing::debug!(field = %field, "field is missing");
        }
    }
}
