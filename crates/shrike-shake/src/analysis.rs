use shrike_graph::{ClassId, FieldId, MethodId, ProgramGraph};

use crate::reason::KeepReason;
use crate::sets::ReasonSet;
use crate::worklist::Worklist;

/// Read-only view of the committed facts, handed to external analyses.
pub struct FactView<'a> {
    pub(crate) live_types: &'a ReasonSet<ClassId>,
    pub(crate) instantiated_types: &'a ReasonSet<ClassId>,
    pub(crate) live_methods: &'a ReasonSet<MethodId>,
    pub(crate) targeted_methods: &'a ReasonSet<MethodId>,
    pub(crate) live_fields: &'a ReasonSet<FieldId>,
}

impl FactView<'_> {
    #[must_use]
    pub fn is_class_live(&self, class: ClassId) -> bool {
        self.live_types.contains(class)
    }

    #[must_use]
    pub fn is_class_instantiated(&self, class: ClassId) -> bool {
        self.instantiated_types.contains(class)
    }

    #[must_use]
    pub fn is_method_live(&self, method: MethodId) -> bool {
        self.live_methods.contains(method)
    }

    #[must_use]
    pub fn is_method_targeted(&self, method: MethodId) -> bool {
        self.targeted_methods.contains(method)
    }

    #[must_use]
    pub fn is_field_live(&self, field: FieldId) -> bool {
        self.live_fields.contains(field)
    }
}

/// An external analysis that rides along with the enqueuer.
///
/// The per-fact notifications fire as facts are committed; `notify_fixpoint`
/// fires once each time the engine runs out of work and may enqueue
/// follow-up actions. Analyses must never retract committed facts.
pub trait FixpointAnalysis {
    fn process_newly_instantiated_class(
        &mut self,
        graph: &ProgramGraph,
        class: ClassId,
        reason: &KeepReason,
    ) {
        let _ = (graph, class, reason);
    }

    fn process_newly_live_method(&mut self, graph: &ProgramGraph, method: MethodId) {
        let _ = (graph, method);
    }

    fn process_newly_live_field(&mut self, graph: &ProgramGraph, field: FieldId) {
        let _ = (graph, field);
    }

    fn notify_fixpoint(&mut self, graph: &ProgramGraph, facts: &FactView<'_>, worklist: &mut Worklist) {
        let _ = (graph, facts, worklist);
    }
}
