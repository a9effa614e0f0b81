//! Offset compensation and nearest-node lookup.
//!
//! Diagnostics for extracted fragments carry positions relative to the
//! fragment, while the host tree keeps document positions. The line offset
//! bridges the two before the closest node on the diagnostic's line is
//! picked.

use sgraffito_relief::{Position, SyntaxNode};

/// Stand-in for an unknown node endpoint
const MISSING_ENDPOINT: Position = Position::new(1, 0);

/// Lines between the top of the host document and the fragment start.
///
/// Zero for standalone style files, otherwise one less than the start line
/// of the root's first child (never negative).
pub fn line_offset<N: SyntaxNode>(root: &N, is_style_file: bool) -> u32 {
    if is_style_file {
        return 0;
    }
    root.first_child()
        .and_then(|child| child.start())
        .map_or(0, |start| start.line.saturating_sub(1))
}

/// Shift a fragment position into host-document coordinates
#[inline]
pub fn document_position(start: Position, offset: u32) -> Position {
    Position::new(start.line.saturating_add(offset), start.column)
}

/// Every node below `root` whose start line is `line`, in traversal order
pub fn candidates_on_line<N: SyntaxNode>(root: &N, line: u32) -> Vec<&N> {
    root.descendants()
        .filter(|node| node.start().is_some_and(|start| start.line == line))
        .collect()
}

/// Euclidean distance over (line, column)
#[inline]
pub fn endpoint_distance(target: Position, endpoint: Option<Position>) -> f64 {
    let endpoint = endpoint.unwrap_or(MISSING_ENDPOINT);
    let lines = f64::from(target.line) - f64::from(endpoint.line);
    let columns = f64::from(target.column) - f64::from(endpoint.column);
    lines.hypot(columns)
}

/// Distance from `target` to the nearer of the node's endpoints
#[inline]
pub fn node_score<N: SyntaxNode>(node: &N, target: Position) -> f64 {
    endpoint_distance(target, node.start()).min(endpoint_distance(target, node.end()))
}

/// The node nearest to `target` among those starting on its line, or the
/// root if none does. Ties go to the node visited first.
pub fn closest_node<N: SyntaxNode>(root: &N, target: Position) -> &N {
    let mut best: Option<(&N, f64)> = None;
    for node in candidates_on_line(root, target.line) {
        let score = node_score(node, target);
        if best.map_or(true, |(_, current)| score < current) {
            best = Some((node, score));
        }
    }
    best.map_or(root, |(node, _)| node)
}
