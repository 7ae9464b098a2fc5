use serde::Serialize;

use shrike_graph::{FieldRef, ItemRef, MethodRef, ProgramGraph, TypeName};

use crate::engine::{AnalysisState, Diagnostics, InvokeKind, LibraryEscape};
use crate::reason::KeepReason;
use crate::sets::FieldAccessKind;

/// The outcome of a completed analysis: every live element with its
/// provenance, the targeted-but-not-live methods that must remain as
/// abstract stubs, field-access classification, and the collected
/// diagnostics.
///
/// Set-valued accessors return references in sorted order so downstream
/// passes see deterministic output regardless of processing order.
#[derive(Debug)]
pub struct LivenessResult<'g> {
    graph: &'g ProgramGraph,
    state: AnalysisState,
    diagnostics: Diagnostics,
}

impl<'g> LivenessResult<'g> {
    pub(crate) fn new(
        graph: &'g ProgramGraph,
        state: AnalysisState,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            graph,
            state,
            diagnostics,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &'g ProgramGraph {
        self.graph
    }

    #[must_use]
    pub fn live_classes(&self) -> Vec<TypeName> {
        let mut names: Vec<TypeName> = self
            .state
            .live_types
            .keys()
            .map(|id| self.graph.class(id).name.clone())
            .collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn instantiated_classes(&self) -> Vec<TypeName> {
        let mut names: Vec<TypeName> = self
            .state
            .instantiated_types
            .keys()
            .map(|id| self.graph.class(id).name.clone())
            .collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn live_methods(&self) -> Vec<MethodRef> {
        let mut refs: Vec<MethodRef> = self
            .state
            .live_methods
            .keys()
            .map(|id| self.graph.method(id).method.clone())
            .collect();
        refs.sort();
        refs
    }

    #[must_use]
    pub fn targeted_methods(&self) -> Vec<MethodRef> {
        let mut refs: Vec<MethodRef> = self
            .state
            .targeted_methods
            .keys()
            .map(|id| self.graph.method(id).method.clone())
            .collect();
        refs.sort();
        refs
    }

    /// Methods that dispatch can reach but that never become live. The
    /// output program needs them as abstract stubs so failing invokes keep
    /// failing the same way.
    #[must_use]
    pub fn targeted_but_not_live_methods(&self) -> Vec<MethodRef> {
        let mut refs: Vec<MethodRef> = self
            .state
            .targeted_methods
            .keys()
            .filter(|id| !self.state.live_methods.contains(*id))
            .map(|id| self.graph.method(id).method.clone())
            .collect();
        refs.sort();
        refs
    }

    #[must_use]
    pub fn live_fields(&self) -> Vec<FieldRef> {
        let mut refs: Vec<FieldRef> = self
            .state
            .live_fields
            .keys()
            .map(|id| self.graph.field(id).field.clone())
            .collect();
        refs.sort();
        refs
    }

    #[must_use]
    pub fn is_class_live(&self, name: &TypeName) -> bool {
        self.graph
            .program_class_by_name(name)
            .is_some_and(|id| self.state.live_types.contains(id))
    }

    #[must_use]
    pub fn is_class_instantiated(&self, name: &TypeName) -> bool {
        self.graph
            .program_class_by_name(name)
            .is_some_and(|id| self.state.instantiated_types.contains(id))
    }

    #[must_use]
    pub fn is_interface_instantiated(&self, name: &TypeName) -> bool {
        self.graph
            .program_class_by_name(name)
            .is_some_and(|id| self.state.instantiated_interfaces.contains(id))
    }

    /// Liveness of the declared definition the reference names; no
    /// hierarchy search.
    #[must_use]
    pub fn is_method_live(&self, reference: &MethodRef) -> bool {
        self.graph
            .definition_for_method(reference)
            .is_some_and(|id| self.state.live_methods.contains(id))
    }

    #[must_use]
    pub fn is_method_targeted(&self, reference: &MethodRef) -> bool {
        self.graph
            .definition_for_method(reference)
            .is_some_and(|id| self.state.targeted_methods.contains(id))
    }

    #[must_use]
    pub fn is_field_live(&self, reference: &FieldRef) -> bool {
        self.graph
            .definition_for_field(reference)
            .is_some_and(|id| self.state.live_fields.contains(id))
    }

    #[must_use]
    pub fn reasons_for_class(&self, name: &TypeName) -> &[KeepReason] {
        self.graph
            .program_class_by_name(name)
            .map(|id| self.state.live_types.reasons(id))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn reasons_for_method(&self, reference: &MethodRef) -> &[KeepReason] {
        self.graph
            .definition_for_method(reference)
            .map(|id| self.state.live_methods.reasons(id))
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn reasons_for_field(&self, reference: &FieldRef) -> &[KeepReason] {
        self.graph
            .definition_for_field(reference)
            .map(|id| self.state.live_fields.reasons(id))
            .unwrap_or(&[])
    }

    /// Read/write classification for a field, looked up through any
    /// reference that resolved to it.
    #[must_use]
    pub fn field_access(&self, reference: &FieldRef) -> Option<FieldAccessKind> {
        self.state.field_access.classify(reference)
    }

    /// Call-site contexts recorded for a reference under the given invoke
    /// kind, in sorted order.
    #[must_use]
    pub fn invoke_contexts(&self, kind: InvokeKind, reference: &MethodRef) -> Vec<MethodRef> {
        self.state
            .invokes
            .contexts(kind, reference)
            .into_iter()
            .map(|id| self.graph.method(id).method.clone())
            .collect()
    }

    /// Super-invoke references that resolve to a private or static method
    /// and will fail at runtime. The caller decides whether these fail the
    /// compilation.
    #[must_use]
    pub fn broken_super_invokes(&self) -> Vec<&MethodRef> {
        self.state.broken_super_invokes.iter().collect()
    }

    #[must_use]
    pub fn pinned_items(&self) -> Vec<&ItemRef> {
        let mut items: Vec<&ItemRef> = self.state.pinned.iter().collect();
        items.sort();
        items
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn library_escapes(&self) -> &[LibraryEscape] {
        self.diagnostics.library_escapes()
    }

    /// A serializable snapshot of the result for external tooling.
    #[must_use]
    pub fn summary(&self) -> LivenessSummary {
        let field_access = {
            let mut entries: Vec<FieldAccessSummary> = self
                .state
                .field_access
                .infos()
                .filter_map(|info| {
                    info.kind().map(|kind| FieldAccessSummary {
                        field: info.field.to_string(),
                        access: kind.as_str().to_string(),
                    })
                })
                .collect();
            entries.sort();
            entries
        };
        LivenessSummary {
            live_classes: to_strings(self.live_classes()),
            instantiated_classes: to_strings(self.instantiated_classes()),
            live_methods: to_strings(self.live_methods()),
            targeted_but_not_live_methods: to_strings(self.targeted_but_not_live_methods()),
            live_fields: to_strings(self.live_fields()),
            field_access,
            broken_super_invokes: self
                .broken_super_invokes()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            missing_classes: self
                .diagnostics
                .missing_classes()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            missing_methods: self
                .diagnostics
                .missing_methods()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            missing_fields: self
                .diagnostics
                .missing_fields()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn to_strings<T: ToString>(items: Vec<T>) -> Vec<String> {
    items.into_iter().map(|item| item.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FieldAccessSummary {
    pub field: String,
    pub access: String,
}

/// String-rendered view of the result, stable across runs.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessSummary {
    pub live_classes: Vec<String>,
    pub instantiated_classes: Vec<String>,
    pub live_methods: Vec<String>,
    pub targeted_but_not_live_methods: Vec<String>,
    pub live_fields: Vec<String>,
    pub field_access: Vec<FieldAccessSummary>,
    pub broken_super_invokes: Vec<String>,
    pub missing_classes: Vec<String>,
    pub missing_methods: Vec<String>,
    pub missing_fields: Vec<String>,
}
