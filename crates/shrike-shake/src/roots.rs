use std::fmt;

use shrike_graph::ItemRef;

/// Handle of a keep rule registered in a [`RootSet`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        RuleId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({})", self.0)
    }
}

/// An external keep directive. The analysis only needs its identity and a
/// human-readable name for provenance; matching items against rule patterns
/// is the keep-rule evaluator's job.
#[derive(Debug, Clone)]
pub struct KeepRule {
    pub name: String,
}

/// A conditional keep directive: when every precondition item is live, the
/// consequent items become roots.
#[derive(Debug, Clone)]
pub struct ConditionalRule {
    pub rule: RuleId,
    pub if_live: Vec<ItemRef>,
    pub keep: Vec<ItemRef>,
}

/// The set of root items seeding the analysis, with the rules that produced
/// them.
#[derive(Debug, Default)]
pub struct RootSet {
    rules: Vec<KeepRule>,
    items: Vec<(ItemRef, RuleId)>,
    conditional: Vec<ConditionalRule>,
}

impl RootSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, name: impl Into<String>) -> RuleId {
        let id = RuleId::from_raw(self.rules.len() as u32);
        self.rules.push(KeepRule { name: name.into() });
        id
    }

    pub fn keep(&mut self, item: ItemRef, rule: RuleId) {
        self.items.push((item, rule));
    }

    /// Registers a conditional rule; `rule` provides provenance for the
    /// consequent items.
    pub fn keep_if(&mut self, rule: RuleId, if_live: Vec<ItemRef>, keep: Vec<ItemRef>) {
        self.conditional.push(ConditionalRule {
            rule,
            if_live,
            keep,
        });
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> &KeepRule {
        &self.rules[id.idx()]
    }

    #[must_use]
    pub fn items(&self) -> &[(ItemRef, RuleId)] {
        &self.items
    }

    #[must_use]
    pub fn conditional_rules(&self) -> &[ConditionalRule] {
        &self.conditional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrike_graph::TypeName;

    #[test]
    fn rules_and_items_round_trip() {
        let mut roots = RootSet::new();
        let rule = roots.add_rule("-keep class Main");
        roots.keep(ItemRef::Class(TypeName::new("Main")), rule);

        assert_eq!(roots.rule(rule).name, "-keep class Main");
        assert_eq!(roots.items().len(), 1);
        assert!(roots.conditional_rules().is_empty());
    }
}
