//! Logic propagation engine.
//!
//! This module drives signal values through a circuit graph.
//!
//! ## Settle passes
//!
//! A settle pass re-propagates from every primitive source in component
//! order. Propagating from an `OUT` connector sets every connected `IN`
//! connector, recomputes the owning component, and continues from that
//! component's outputs:
//!
//! ```text
//! source.out ──line──▶ gate.in ─recompute─▶ gate.out ──line──▶ ...
//! ```
//!
//! Blocks recompute by settling their interior graph with the same
//! [`Propagator`], so nesting consumes the same depth budget. The pass
//! performs no cycle detection; a feedback loop hits the depth bound and the
//! pass fails with [`PropagationOverflow`](crate::GatesimError::PropagationOverflow).
//! Pending work is kept on a heap frame stack, so the bound is reached
//! before the thread stack runs out.

mod propagate;
mod simulator;
mod truth;

pub use propagate::Propagator;
pub use simulator::{Simulator, SimulatorConfig};
pub use truth::{truth_table, TruthRow, TruthTable};

/// Default recursion bound for a settle pass.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Maximum number of input bits enumerated by [`truth_table`].
pub const MAX_TRUTH_TABLE_BITS: usize = 16;
