//! Owned boolean expression trees.
//!
//! An [`Expr`] is a tagged tree over a fixed variable context: constants,
//! variables, a single-child negation, and associative `And`/`Or`/`Xor`
//! nodes with any number of children. Trees own their children outright, so
//! cloning is a deep copy and teardown is ordinary recursive drop.
//!
//! The canonical comparator defined here orders trees by *representation*,
//! not by the boolean function they denote; no rewriting is performed. It is
//! the order used to sort public-key clauses and to detect duplicates.

use std::cmp::Ordering;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ExprError;

/// Payload of an expression node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    /// A constant truth value.
    Constant(bool),
    /// An input variable, referenced by zero-based index.
    Variable(usize),
    /// Negation of exactly one child.
    Not(Box<Expr>),
    /// Conjunction of all children; the empty conjunction is `true`.
    And(Vec<Expr>),
    /// Disjunction of all children; the empty disjunction is `false`.
    Or(Vec<Expr>),
    /// Exclusive or of all children; the empty sum is `false`.
    Xor(Vec<Expr>),
}

/// A boolean function representation over a fixed number of input variables.
///
/// Every node carries the variable-count context of its tree; the context is
/// constant across a tree and bounds the indices `Variable` nodes may use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    vars: usize,
    kind: ExprKind,
}

impl Expr {
    /// A constant node.
    pub fn constant(vars: usize, value: bool) -> Self {
        Self {
            vars,
            kind: ExprKind::Constant(value),
        }
    }

    /// A variable node for the zero-based `index`.
    pub fn variable(vars: usize, index: usize) -> Self {
        Self {
            vars,
            kind: ExprKind::Variable(index),
        }
    }

    /// Negation of `child`, inheriting its variable context.
    pub fn not(child: Expr) -> Self {
        Self {
            vars: child.vars,
            kind: ExprKind::Not(Box::new(child)),
        }
    }

    /// Conjunction of `children`.
    pub fn and_of(vars: usize, children: Vec<Expr>) -> Self {
        Self {
            vars,
            kind: ExprKind::And(children),
        }
    }

    /// Disjunction of `children`.
    pub fn or_of(vars: usize, children: Vec<Expr>) -> Self {
        Self {
            vars,
            kind: ExprKind::Or(children),
        }
    }

    /// Exclusive or of `children`.
    pub fn xor_of(vars: usize, children: Vec<Expr>) -> Self {
        Self {
            vars,
            kind: ExprKind::Xor(children),
        }
    }

    /// Variable-count context of the tree.
    pub fn vars(&self) -> usize {
        self.vars
    }

    /// The node payload.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// The node's children; empty for leaves, one element for `Not`.
    pub fn children(&self) -> &[Expr] {
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::Variable(_) => &[],
            ExprKind::Not(child) => std::slice::from_ref(child),
            ExprKind::And(children) | ExprKind::Or(children) | ExprKind::Xor(children) => children,
        }
    }

    fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Evaluates the tree under `assignment`.
    ///
    /// `And`/`Or`/`Xor` fold their children with `&&`/`||`/`!=` and evaluate
    /// to `true`/`false`/`false` when childless. A `Variable` whose index
    /// falls outside the context (or the provided assignment) is an error.
    pub fn evaluate(&self, assignment: &[bool]) -> Result<bool, ExprError> {
        match &self.kind {
            ExprKind::Constant(value) => Ok(*value),
            ExprKind::Variable(index) => {
                if *index >= self.vars || *index >= assignment.len() {
                    Err(ExprError::VariableOutOfRange {
                        index: *index,
                        vars: self.vars,
                    })
                } else {
                    Ok(assignment[*index])
                }
            }
            ExprKind::Not(child) => Ok(!child.evaluate(assignment)?),
            ExprKind::And(children) => {
                let mut out = true;
                for child in children {
                    out = out && child.evaluate(assignment)?;
                }
                Ok(out)
            }
            ExprKind::Or(children) => {
                let mut out = false;
                for child in children {
                    out = out || child.evaluate(assignment)?;
                }
                Ok(out)
            }
            ExprKind::Xor(children) => {
                let mut out = false;
                for child in children {
                    out = out != child.evaluate(assignment)?;
                }
                Ok(out)
            }
        }
    }

    /// Evaluates the tree, substituting `false` for any malformed node.
    ///
    /// The substitution happens at the offending node, so an enclosing
    /// negation still inverts it. A warning is logged for each substitution.
    pub fn evaluate_lenient(&self, assignment: &[bool]) -> bool {
        match &self.kind {
            ExprKind::Variable(index) if *index >= self.vars || *index >= assignment.len() => {
                warn!(
                    "variable {} does not exist (expression is over {} variables)",
                    index, self.vars
                );
                false
            }
            ExprKind::Constant(value) => *value,
            // In-range by the guard on the arm above.
            ExprKind::Variable(index) => assignment[*index],
            ExprKind::Not(child) => !child.evaluate_lenient(assignment),
            ExprKind::And(children) => children
                .iter()
                .fold(true, |acc, child| acc && child.evaluate_lenient(assignment)),
            ExprKind::Or(children) => children
                .iter()
                .fold(false, |acc, child| acc || child.evaluate_lenient(assignment)),
            ExprKind::Xor(children) => children
                .iter()
                .fold(false, |acc, child| acc != child.evaluate_lenient(assignment)),
        }
    }

    /// Returns the signed one-based id of one variable the tree depends on.
    ///
    /// `Variable(i)` yields `i + 1`; a negation flips the sign of its child's
    /// dependence; `And`/`Or`/`Xor` report their first child, or `0` when
    /// childless. Most useful on literal-like subtrees, where the result is
    /// "the one variable this literal is about" with the sign encoding
    /// negation.
    pub fn dependence(&self) -> i64 {
        match &self.kind {
            ExprKind::Constant(_) => 0,
            ExprKind::Variable(index) => *index as i64 + 1,
            ExprKind::Not(child) => -child.dependence(),
            ExprKind::And(children) | ExprKind::Or(children) | ExprKind::Xor(children) => {
                children.first().map_or(0, Expr::dependence)
            }
        }
    }

    fn variant_rank(&self) -> u8 {
        match &self.kind {
            ExprKind::Constant(true) => 0,
            ExprKind::Constant(false) => 1,
            ExprKind::Variable(_) => 2,
            ExprKind::Not(_) => 3,
            ExprKind::And(_) => 4,
            ExprKind::Or(_) => 5,
            ExprKind::Xor(_) => 6,
        }
    }

    /// Canonical comparison of two trees sharing a variable context.
    ///
    /// Nodes with fewer children sort first; nodes with the same non-zero
    /// child count compare their children pairwise in current order; leaves
    /// compare by `|dependence()|`, then by a fixed variant ranking. Trees
    /// that only differ in an inner node's operator but agree on all children
    /// compare equal: the order is defined on the child structure, which is
    /// all the clause bookkeeping needs.
    pub fn canonical_cmp(&self, other: &Expr) -> Ordering {
        let lhs = self.child_count();
        let rhs = other.child_count();
        if lhs != rhs {
            return lhs.cmp(&rhs);
        }
        if lhs > 0 {
            for (a, b) in self.children().iter().zip(other.children()) {
                let ord = a.canonical_cmp(b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            return Ordering::Equal;
        }
        self.dependence()
            .abs()
            .cmp(&other.dependence().abs())
            .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
    }

    /// Sorts every node's children by the canonical comparator, depth-first,
    /// children before parent.
    ///
    /// Applied once to a public key before encryption so that clause indices
    /// follow the canonical order and the permutation bookkeeping is
    /// reproducible.
    pub fn recursive_sort(&mut self) {
        match &mut self.kind {
            ExprKind::Constant(_) | ExprKind::Variable(_) => {}
            ExprKind::Not(child) => child.recursive_sort(),
            ExprKind::And(children) | ExprKind::Or(children) | ExprKind::Xor(children) => {
                for child in children.iter_mut() {
                    child.recursive_sort();
                }
                children.sort_by(Expr::canonical_cmp);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Expr], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        }

        match &self.kind {
            ExprKind::Constant(true) => write!(f, "1"),
            ExprKind::Constant(false) => write!(f, "0"),
            ExprKind::Variable(index) => write!(f, "X{}", index + 1),
            ExprKind::Not(child) => write!(f, "!{child}"),
            ExprKind::And(children) => join(f, children, "AND"),
            ExprKind::Or(children) => join(f, children, "OR"),
            ExprKind::Xor(children) => join(f, children, "XOR"),
        }
    }
}
