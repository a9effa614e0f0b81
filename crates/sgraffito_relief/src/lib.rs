//! # sgraffito_relief
//!
//! Relief - The sculptured syntax tree surface for Sgraffito.
//!
//! ## Name Origin
//!
//! A **relief** is a sculpture whose forms stand out from a flat background.
//! `sgraffito_relief` describes the host document's stylesheet tree: the
//! raised surface that compiler diagnostics are projected back onto.
//!
//! ## Overview
//!
//! Hosts that already own a parsed tree implement [`SyntaxNode`] for their
//! node type. Hosts without one can build a [`StyleNode`] tree directly.
//! Positions are 1-based and expressed in host-document coordinates.

pub mod ast;

pub use ast::{Descendants, NodeKind, Position, SourceSpan, StyleNode, SyntaxNode};
