use std::collections::{HashMap, HashSet};
use std::fmt;

use shrike_graph::{ClassId, FieldId, FieldRef, MethodId, MethodRef, ProgramGraph, TypeName};

use crate::reason::KeepReason;
use crate::roots::RootSet;

/// A node in the reachability graph: one per class, method, field or keep
/// rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNode {
    Class(TypeName),
    Method(MethodRef),
    Field(FieldRef),
    Rule(String),
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Class(ty) => ty.fmt(f),
            GraphNode::Method(m) => m.fmt(f),
            GraphNode::Field(fld) => fld.fmt(f),
            GraphNode::Rule(name) => name.fmt(f),
        }
    }
}

/// The kind of dependency an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    KeepRule,
    ConditionalKeepRule,
    CompatibilityRule,
    InvokedFrom,
    InvokedViaSuper,
    TargetedBySuper,
    InstantiatedIn,
    FieldReferencedIn,
    ReferencedFrom,
    ReachableFromType,
    OverridingMethod,
    OverridesLibraryMethod,
    ReflectiveUse,
}

impl EdgeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::KeepRule => "keep-rule",
            EdgeKind::ConditionalKeepRule => "conditional-keep-rule",
            EdgeKind::CompatibilityRule => "compatibility-rule",
            EdgeKind::InvokedFrom => "invoked-from",
            EdgeKind::InvokedViaSuper => "invoked-via-super",
            EdgeKind::TargetedBySuper => "targeted-by-super",
            EdgeKind::InstantiatedIn => "instantiated-in",
            EdgeKind::FieldReferencedIn => "field-referenced-in",
            EdgeKind::ReferencedFrom => "referenced-from",
            EdgeKind::ReachableFromType => "reachable-from-type",
            EdgeKind::OverridingMethod => "overriding-method",
            EdgeKind::OverridesLibraryMethod => "overrides-library-method",
            EdgeKind::ReflectiveUse => "reflective-use",
        }
    }
}

/// An edge of the reachability graph, for diagnostics only; the analysis
/// never consults recorded edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityEdge {
    pub source: GraphNode,
    pub target: GraphNode,
    pub kind: EdgeKind,
}

/// External sink for reachability edges.
pub trait GraphConsumer {
    fn accept_edge(&mut self, source: &GraphNode, target: &GraphNode, kind: EdgeKind);
}

/// A consumer that keeps every edge in memory, mainly for tests and
/// "why is this kept" tooling.
#[derive(Debug, Default)]
pub struct CollectingConsumer {
    pub edges: Vec<ReachabilityEdge>,
}

impl GraphConsumer for CollectingConsumer {
    fn accept_edge(&mut self, source: &GraphNode, target: &GraphNode, kind: EdgeKind) {
        self.edges.push(ReachabilityEdge {
            source: source.clone(),
            target: target.clone(),
            kind,
        });
    }
}

/// Derives `(source, kind)` edges from `(reason, target)` registrations and
/// forwards them to the consumer, deduplicated through interned node
/// identities. With no consumer attached nothing is computed at all.
pub(crate) struct EdgeRecorder<'c> {
    consumer: Option<&'c mut dyn GraphConsumer>,
    node_ids: HashMap<GraphNode, u32>,
    seen: HashSet<(u32, u32, EdgeKind)>,
}

impl<'c> EdgeRecorder<'c> {
    pub(crate) fn new(consumer: Option<&'c mut dyn GraphConsumer>) -> Self {
        Self {
            consumer,
            node_ids: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    pub(crate) fn record(
        &mut self,
        graph: &ProgramGraph,
        rules: &RootSet,
        reason: &KeepReason,
        target: GraphNode,
    ) {
        if self.consumer.is_none() {
            return;
        }
        let (source, kind) = match reason {
            KeepReason::KeepRule(rule) => (
                GraphNode::Rule(rules.rule(*rule).name.clone()),
                EdgeKind::KeepRule,
            ),
            KeepReason::ConditionalKeepRule(rule) => (
                GraphNode::Rule(rules.rule(*rule).name.clone()),
                EdgeKind::ConditionalKeepRule,
            ),
            KeepReason::CompatibilityRule => (
                GraphNode::Rule("<compatibility>".to_string()),
                EdgeKind::CompatibilityRule,
            ),
            KeepReason::InvokedFrom(m) => (method_node(graph, *m), EdgeKind::InvokedFrom),
            KeepReason::InvokedViaSuper(m) => (method_node(graph, *m), EdgeKind::InvokedViaSuper),
            KeepReason::TargetedBySuper(m) => (method_node(graph, *m), EdgeKind::TargetedBySuper),
            KeepReason::InstantiatedIn(m) => (method_node(graph, *m), EdgeKind::InstantiatedIn),
            KeepReason::FieldReferencedIn(m) => {
                (method_node(graph, *m), EdgeKind::FieldReferencedIn)
            }
            KeepReason::ReferencedFrom(m) => (method_node(graph, *m), EdgeKind::ReferencedFrom),
            KeepReason::ReachableFromType(c) => (class_node(graph, *c), EdgeKind::ReachableFromType),
            KeepReason::OverridesMethod(m) => (method_node(graph, *m), EdgeKind::OverridingMethod),
            KeepReason::OverridesLibraryMethod(ty) => (
                GraphNode::Class(ty.clone()),
                EdgeKind::OverridesLibraryMethod,
            ),
            KeepReason::ReflectiveUse(m) => (method_node(graph, *m), EdgeKind::ReflectiveUse),
        };

        let source_id = self.intern(source.clone());
        let target_id = self.intern(target.clone());
        if !self.seen.insert((source_id, target_id, kind)) {
            return;
        }
        if let Some(consumer) = self.consumer.as_deref_mut() {
            consumer.accept_edge(&source, &target, kind);
        }
    }

    fn intern(&mut self, node: GraphNode) -> u32 {
        let next = self.node_ids.len() as u32;
        *self.node_ids.entry(node).or_insert(next)
    }
}

pub(crate) fn class_node(graph: &ProgramGraph, class: ClassId) -> GraphNode {
    GraphNode::Class(graph.class(class).name.clone())
}

pub(crate) fn method_node(graph: &ProgramGraph, method: MethodId) -> GraphNode {
    GraphNode::Method(graph.method(method).method.clone())
}

pub(crate) fn field_node(graph: &ProgramGraph, field: FieldId) -> GraphNode {
    GraphNode::Field(graph.field(field).field.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrike_graph::{ClassData, GraphBuilder};

    #[test]
    fn edges_are_deduplicated_by_interned_identity() {
        let graph = GraphBuilder::new().add_class(ClassData::new("A")).build();
        let class = graph.class_by_name(&"A".into()).unwrap();
        let mut rules = RootSet::new();
        let rule = rules.add_rule("-keep class A");

        let mut sink = CollectingConsumer::default();
        let mut recorder = EdgeRecorder::new(Some(&mut sink));
        let reason = KeepReason::KeepRule(rule);
        recorder.record(&graph, &rules, &reason, class_node(&graph, class));
        recorder.record(&graph, &rules, &reason, class_node(&graph, class));
        drop(recorder);

        assert_eq!(sink.edges.len(), 1);
        assert_eq!(sink.edges[0].kind, EdgeKind::KeepRule);
        assert_eq!(sink.edges[0].target, GraphNode::Class("A".into()));
    }
}
