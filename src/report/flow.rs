//! Flow diagram model
//!
//! Every ledger entry becomes one directed edge: deposits run from the
//! counterparty to the target, withdrawals from the target to the counterparty.
//! Edges between the same pair of nodes are kept apart, never summed.
//!
//! Nodes are laid out in two columns like a Sankey diagram: every address that
//! appears as an edge source on the left, every edge destination on the right,
//! each in order of first appearance.

use crate::types::{Direction, LedgerEntry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Thinnest and thickest edge stroke, in points
pub const MIN_STROKE_PT: f32 = 0.5;
pub const MAX_STROKE_PT: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    /// Index into `FlowDiagram::sources`
    pub source: usize,

    /// Index into `FlowDiagram::targets`
    pub target: usize,

    pub amount: Decimal,
    pub direction: Direction,

    /// Position of this edge among the edges joining the same two nodes
    pub lane: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDiagram {
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub edges: Vec<FlowEdge>,
}

impl FlowDiagram {
    pub fn from_entries(target: &str, entries: &[LedgerEntry]) -> Self {
        let mut diagram = FlowDiagram::default();

        for entry in entries {
            let (from, to) = match entry.direction {
                Direction::Deposit => (entry.counterparty.as_str(), target),
                Direction::Withdrawal => (target, entry.counterparty.as_str()),
            };
            let source = index_of(&mut diagram.sources, from);
            let target = index_of(&mut diagram.targets, to);
            let lane = diagram
                .edges
                .iter()
                .filter(|edge| edge.source == source && edge.target == target)
                .count();

            diagram.edges.push(FlowEdge {
                source,
                target,
                amount: entry.amount,
                direction: entry.direction,
                lane,
            });
        }

        diagram
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges joining the same two nodes as `edge`
    pub fn lanes(&self, edge: &FlowEdge) -> usize {
        self.edges
            .iter()
            .filter(|other| other.source == edge.source && other.target == edge.target)
            .count()
    }

    pub fn max_amount(&self) -> Decimal {
        self.edges
            .iter()
            .map(|edge| edge.amount)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Stroke width in points, proportional to the edge amount
    pub fn stroke_width(&self, amount: Decimal) -> f32 {
        let max = self.max_amount();
        if max <= Decimal::ZERO {
            return MIN_STROKE_PT;
        }
        let ratio = (amount / max).to_f32().unwrap_or(0.0).clamp(0.0, 1.0);
        MIN_STROKE_PT + (MAX_STROKE_PT - MIN_STROKE_PT) * ratio
    }
}

fn index_of(nodes: &mut Vec<String>, address: &str) -> usize {
    match nodes.iter().position(|node| node == address) {
        Some(index) => index,
        None => {
            nodes.push(address.to_string());
            nodes.len() - 1
        }
    }
}

/// Sample a cubic Bézier curve from `start` to `end` with horizontal tangents
///
/// Returns `segments + 1` points including both ends.
pub fn curve_points(start: (f32, f32), end: (f32, f32), segments: usize) -> Vec<(f32, f32)> {
    let segments = segments.max(1);
    let mid_x = (start.0 + end.0) / 2.0;
    let c1 = (mid_x, start.1);
    let c2 = (mid_x, end.1);

    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            let b0 = u * u * u;
            let b1 = 3.0 * u * u * t;
            let b2 = 3.0 * u * t * t;
            let b3 = t * t * t;
            (
                b0 * start.0 + b1 * c1.0 + b2 * c2.0 + b3 * end.0,
                b0 * start.1 + b1 * c1.1 + b2 * c2.1 + b3 * end.1,
            )
        })
        .collect()
}
