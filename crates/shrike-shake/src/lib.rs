//! Whole-program liveness analysis for the shrinker.
//!
//! Given a [`shrike_graph::ProgramGraph`], a [`RootSet`] of keep-rule roots
//! and a per-method code-reference callback, the [`Enqueuer`] computes the
//! transitive closure of live classes, methods and fields to a fixpoint,
//! with provenance for every retained item and an optional reachability
//! edge stream for "why is this kept" tooling.

#![forbid(unsafe_code)]

mod analysis;
mod engine;
mod reason;
mod recorder;
mod result;
mod roots;
mod sets;
mod worklist;

pub use crate::analysis::{FactView, FixpointAnalysis};
pub use crate::engine::{
    Diagnostics, Enqueuer, InvokeKind, LibraryEscape, Mode, ShakeError, ShakeOptions,
};
pub use crate::reason::KeepReason;
pub use crate::recorder::{
    CollectingConsumer, EdgeKind, GraphConsumer, GraphNode, ReachabilityEdge,
};
pub use crate::result::{FieldAccessSummary, LivenessResult, LivenessSummary};
pub use crate::roots::{ConditionalRule, KeepRule, RootSet, RuleId};
pub use crate::sets::{FieldAccessInfo, FieldAccessKind};
pub use crate::worklist::{Action, Worklist};
