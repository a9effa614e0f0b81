//! Host stylesheet tree types.

use serde::{Deserialize, Serialize};
use sgraffito_carton::CompactString;

/// A line/column pair (both 1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source span of a node. Either end may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Option<Position>,
    pub end: Option<Position>,
}

impl SourceSpan {
    /// Span with both ends known
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Shorthand for `SourceSpan::new(Position::new(..), Position::new(..))`
    pub const fn between(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self::new(
            Position::new(start_line, start_column),
            Position::new(end_line, end_column),
        )
    }

    /// Span with only a start position
    pub const fn starting_at(line: u32, column: u32) -> Self {
        Self {
            start: Some(Position::new(line, column)),
            end: None,
        }
    }
}

/// A node of the host syntax tree.
///
/// Implementors expose an optional source span and their children. The
/// tree root is the node the traversal starts from; it is never yielded by
/// [`SyntaxNode::descendants`].
pub trait SyntaxNode {
    /// Source span recorded for this node, if any
    fn span(&self) -> Option<&SourceSpan>;

    /// Direct children in document order
    fn children(&self) -> &[Self]
    where
        Self: Sized;

    /// Start position, if recorded
    #[inline]
    fn start(&self) -> Option<Position> {
        self.span().and_then(|span| span.start)
    }

    /// End position, if recorded
    #[inline]
    fn end(&self) -> Option<Position> {
        self.span().and_then(|span| span.end)
    }

    /// First direct child
    #[inline]
    fn first_child(&self) -> Option<&Self>
    where
        Self: Sized,
    {
        self.children().first()
    }

    /// Pre-order traversal over every node below `self`
    #[inline]
    fn descendants(&self) -> Descendants<'_, Self>
    where
        Self: Sized,
    {
        Descendants::new(self)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: SyntaxNode> Descendants<'a, N> {
    fn new(root: &'a N) -> Self {
        Self {
            stack: root.children().iter().rev().collect(),
        }
    }
}

impl<'a, N: SyntaxNode> Iterator for Descendants<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Node kind discriminant with the payload a stylesheet tree keeps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    Rule { selector: CompactString },
    AtRule { name: CompactString, params: CompactString },
    Declaration { prop: CompactString, value: CompactString },
    Comment { text: CompactString },
}

/// Concrete stylesheet tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StyleNode>,
}

impl StyleNode {
    /// Create a node without children
    pub fn new(kind: NodeKind, span: Option<SourceSpan>) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// Create a root node. Roots carry no span of their own.
    pub fn root(children: Vec<StyleNode>) -> Self {
        Self {
            kind: NodeKind::Root,
            span: None,
            children,
        }
    }

    /// Create a rule node (`selector { ... }`)
    pub fn rule(selector: impl Into<CompactString>, span: SourceSpan) -> Self {
        Self::new(
            NodeKind::Rule {
                selector: selector.into(),
            },
            Some(span),
        )
    }

    /// Create an at-rule node (`@name params`)
    pub fn at_rule(
        name: impl Into<CompactString>,
        params: impl Into<CompactString>,
        span: SourceSpan,
    ) -> Self {
        Self::new(
            NodeKind::AtRule {
                name: name.into(),
                params: params.into(),
            },
            Some(span),
        )
    }

    /// Create a declaration node (`prop: value`)
    pub fn decl(
        prop: impl Into<CompactString>,
        value: impl Into<CompactString>,
        span: SourceSpan,
    ) -> Self {
        Self::new(
            NodeKind::Declaration {
                prop: prop.into(),
                value: value.into(),
            },
            Some(span),
        )
    }

    /// Create a comment node
    pub fn comment(text: impl Into<CompactString>, span: SourceSpan) -> Self {
        Self::new(NodeKind::Comment { text: text.into() }, Some(span))
    }

    /// Replace the children of this node
    pub fn with_children(mut self, children: Vec<StyleNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node is a root
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }
}

impl SyntaxNode for StyleNode {
    #[inline]
    fn span(&self) -> Option<&SourceSpan> {
        self.span.as_ref()
    }

    #[inline]
    fn children(&self) -> &[Self] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StyleNode {
        StyleNode::root(vec![
            StyleNode::at_rule("use", "\"sass:math\"", SourceSpan::between(1, 1, 1, 17)),
            StyleNode::rule(".a", SourceSpan::between(2, 1, 5, 1)).with_children(vec![
                StyleNode::decl("color", "red", SourceSpan::between(3, 3, 3, 13)),
                StyleNode::rule("&:hover", SourceSpan::between(4, 3, 4, 30)).with_children(
                    vec![StyleNode::decl(
                        "color",
                        "blue",
                        SourceSpan::between(4, 14, 4, 25),
                    )],
                ),
            ]),
            StyleNode::comment("end", SourceSpan::between(6, 1, 6, 9)),
        ])
    }

    fn label(node: &StyleNode) -> String {
        match &node.kind {
            NodeKind::Root => "root".to_string(),
            NodeKind::Rule { selector } => selector.to_string(),
            NodeKind::AtRule { name, .. } => format!("@{}", name),
            NodeKind::Declaration { prop, value } => format!("{}:{}", prop, value),
            NodeKind::Comment { text } => format!("/*{}*/", text),
        }
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let root = sample();
        let visited: Vec<String> = root.descendants().map(label).collect();
        assert_eq!(
            visited,
            vec!["@use", ".a", "color:red", "&:hover", "color:blue", "/*end*/"]
        );
    }

    #[test]
    fn test_descendants_skip_root() {
        let root = sample();
        assert!(root.descendants().all(|node| !node.is_root()));
        assert_eq!(StyleNode::root(Vec::new()).descendants().count(), 0);
    }

    #[test]
    fn test_first_child() {
        let root = sample();
        let first = root.first_child().map(|n| n.start());
        assert_eq!(first, Some(Some(Position::new(1, 1))));
        assert!(StyleNode::root(Vec::new()).first_child().is_none());
    }

    #[test]
    fn test_missing_span_ends() {
        let node = StyleNode::new(
            NodeKind::Comment { text: "x".into() },
            Some(SourceSpan::starting_at(2, 4)),
        );
        assert_eq!(node.start(), Some(Position::new(2, 4)));
        assert_eq!(node.end(), None);
        assert_eq!(StyleNode::root(Vec::new()).start(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let node = StyleNode::decl("width", "1px", SourceSpan::between(1, 1, 1, 11));
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"declaration","prop":"width","value":"1px","span":{"start":{"line":1,"column":1},"end":{"line":1,"column":11}}}"#
        );
    }
}
