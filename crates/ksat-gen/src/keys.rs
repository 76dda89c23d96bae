//! Key types and their serialization.

use ksat_core::{Expr, ExprError, ExprKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shape violations found when adopting a parsed tree as a public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyFormatError {
    /// The root of a public key must be a conjunction.
    #[error("public key root is not a conjunction")]
    NotConjunction,
    /// Every clause must be a disjunction.
    #[error("clause {clause} is not a disjunction")]
    ClauseNotDisjunction {
        /// Index of the offending clause.
        clause: usize,
    },
    /// Clauses must not be empty.
    #[error("clause {clause} is empty")]
    EmptyClause {
        /// Index of the offending clause.
        clause: usize,
    },
    /// Clause children must be variables or negated variables.
    #[error("clause {clause} contains a non-literal child")]
    InvalidLiteral {
        /// Index of the offending clause.
        clause: usize,
    },
    /// A literal referenced a variable outside the key's context.
    #[error("clause {clause} references variable {index} outside 0..{vars}")]
    LiteralOutOfRange {
        /// Index of the offending clause.
        clause: usize,
        /// Zero-based variable index of the literal.
        index: usize,
        /// Variable context of the key.
        vars: usize,
    },
}

/// The private key: a fixed-length bit vector, the satisfying assignment of
/// the matching public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    bits: Vec<bool>,
}

impl PrivateKey {
    /// Wraps a bit vector as a private key.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// The assignment bits.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Key length `n`.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// The public key: a planted CNF instance.
///
/// Structurally an `And` of `Or` clauses whose children are `Variable` or
/// `Not(Variable)` literals. Clauses generated by [`crate::KeyGenerator`]
/// are pairwise distinct under canonical comparison and individually
/// satisfied by the matching private key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    expr: Expr,
}

impl PublicKey {
    /// Adopts a parsed expression tree, validating the CNF shape.
    pub fn from_expr(expr: Expr) -> Result<Self, KeyFormatError> {
        let vars = expr.vars();
        let clauses = match expr.kind() {
            ExprKind::And(clauses) => clauses,
            _ => return Err(KeyFormatError::NotConjunction),
        };
        for (index, clause) in clauses.iter().enumerate() {
            let literals = match clause.kind() {
                ExprKind::Or(literals) => literals,
                _ => return Err(KeyFormatError::ClauseNotDisjunction { clause: index }),
            };
            if literals.is_empty() {
                return Err(KeyFormatError::EmptyClause { clause: index });
            }
            for literal in literals {
                let variable = match literal.kind() {
                    ExprKind::Variable(v) => *v,
                    ExprKind::Not(child) => match child.kind() {
                        ExprKind::Variable(v) => *v,
                        _ => return Err(KeyFormatError::InvalidLiteral { clause: index }),
                    },
                    _ => return Err(KeyFormatError::InvalidLiteral { clause: index }),
                };
                if variable >= vars {
                    return Err(KeyFormatError::LiteralOutOfRange {
                        clause: index,
                        index: variable,
                        vars,
                    });
                }
            }
        }
        Ok(Self { expr })
    }

    /// Builds a key from clauses the generator has already validated.
    pub(crate) fn from_clauses_unchecked(vars: usize, clauses: Vec<Expr>) -> Self {
        Self {
            expr: Expr::and_of(vars, clauses),
        }
    }

    /// The underlying expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Variable context `n`.
    pub fn vars(&self) -> usize {
        self.expr.vars()
    }

    /// Number of clauses `m`.
    pub fn clause_count(&self) -> usize {
        self.clauses().len()
    }

    /// The clause list.
    pub fn clauses(&self) -> &[Expr] {
        self.expr.children()
    }

    /// Sorts clauses and their literals into canonical order.
    ///
    /// Must be applied once before encryption so that clause indices are
    /// reproducible; keys are otherwise read-only after generation.
    pub fn canonicalize(&mut self) {
        self.expr.recursive_sort();
    }

    /// Evaluates the key under an assignment.
    pub fn evaluate(&self, assignment: &[bool]) -> Result<bool, ExprError> {
        self.expr.evaluate(assignment)
    }

    /// Whether the given private key satisfies every clause.
    pub fn is_satisfied_by(&self, key: &PrivateKey) -> Result<bool, ExprError> {
        self.evaluate(key.bits())
    }
}

/// A matching private/public key pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// The satisfying assignment.
    pub private: PrivateKey,
    /// The planted CNF instance.
    pub public: PublicKey,
}

impl KeyPair {
    /// Re-checks the planting guarantee `pub(priv) = 1`.
    pub fn is_valid(&self) -> bool {
        self.public
            .is_satisfied_by(&self.private)
            .unwrap_or(false)
    }

    /// Serializes the pair with `bincode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserializes a pair with `bincode`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(vars: usize, id: i64) -> Expr {
        if id < 0 {
            Expr::not(Expr::variable(vars, (-id - 1) as usize))
        } else {
            Expr::variable(vars, (id - 1) as usize)
        }
    }

    fn clause(vars: usize, ids: &[i64]) -> Expr {
        Expr::or_of(vars, ids.iter().map(|&id| literal(vars, id)).collect())
    }

    #[test]
    fn from_expr_accepts_well_formed_cnf() {
        let expr = Expr::and_of(3, vec![clause(3, &[1, 2, -3]), clause(3, &[-1, 3])]);
        let key = PublicKey::from_expr(expr).expect("valid CNF shape");
        assert_eq!(key.vars(), 3);
        assert_eq!(key.clause_count(), 2);
    }

    #[test]
    fn from_expr_rejects_malformed_trees() {
        let not_and = clause(3, &[1, 2]);
        assert_eq!(
            PublicKey::from_expr(not_and),
            Err(KeyFormatError::NotConjunction)
        );

        let bad_clause = Expr::and_of(3, vec![Expr::variable(3, 0)]);
        assert_eq!(
            PublicKey::from_expr(bad_clause),
            Err(KeyFormatError::ClauseNotDisjunction { clause: 0 })
        );

        let empty_clause = Expr::and_of(3, vec![Expr::or_of(3, vec![])]);
        assert_eq!(
            PublicKey::from_expr(empty_clause),
            Err(KeyFormatError::EmptyClause { clause: 0 })
        );

        let nested = Expr::and_of(
            3,
            vec![Expr::or_of(3, vec![Expr::not(Expr::not(Expr::variable(3, 0)))])],
        );
        assert_eq!(
            PublicKey::from_expr(nested),
            Err(KeyFormatError::InvalidLiteral { clause: 0 })
        );

        let out_of_range = Expr::and_of(3, vec![Expr::or_of(3, vec![Expr::variable(3, 5)])]);
        assert_eq!(
            PublicKey::from_expr(out_of_range),
            Err(KeyFormatError::LiteralOutOfRange {
                clause: 0,
                index: 5,
                vars: 3
            })
        );
    }

    #[test]
    fn planting_check_follows_the_assignment() {
        // With private = [true, false, true]: x1 ∨ x2 ∨ ¬x3 holds via x1;
        // ¬x1 ∨ x2 ∨ ¬x3 negates every bit and is the one falsified sign
        // pattern over these variables.
        let private = PrivateKey::new(vec![true, false, true]);
        let satisfied = PublicKey::from_expr(Expr::and_of(3, vec![clause(3, &[1, 2, -3])]))
            .expect("valid shape");
        assert_eq!(satisfied.is_satisfied_by(&private), Ok(true));

        let falsified = PublicKey::from_expr(Expr::and_of(3, vec![clause(3, &[-1, 2, -3])]))
            .expect("valid shape");
        assert_eq!(falsified.is_satisfied_by(&private), Ok(false));
    }

    #[test]
    fn key_pair_round_trips_through_bincode() {
        let private = PrivateKey::new(vec![true, false, true]);
        let public = PublicKey::from_expr(Expr::and_of(3, vec![clause(3, &[1, 2, -3])]))
            .expect("valid shape");
        let pair = KeyPair { private, public };
        assert!(pair.is_valid());
        let bytes = pair.to_bytes().expect("serialize");
        let decoded = KeyPair::from_bytes(&bytes).expect("deserialize");
        assert_eq!(decoded, pair);
    }
}
