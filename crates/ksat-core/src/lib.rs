//! Boolean expression trees and GF(2) polynomial arithmetic for kryptosat-rs.
//!
//! This crate provides the symbolic algebra that the key generator and the
//! encryption engine are built on:
//! - [`Expr`]: owned boolean expression trees with evaluation, dependence
//!   extraction, and a canonical representation order.
//! - [`Anf`] / [`Monomial`]: boolean functions in Algebraic Normal Form,
//!   i.e. GF(2) polynomials over sets of variable ids, with exact
//!   cancellation semantics and uniform random function sampling.
//!
//! The implementation aims for clarity and exactness rather than constant-time
//! guarantees; it should not be treated as side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod anf;
mod error;
mod expr;

pub use crate::anf::{Anf, Monomial, CONSTANT_ONE};
pub use crate::error::ExprError;
pub use crate::expr::{Expr, ExprKind};
