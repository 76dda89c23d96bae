//! GF(2) polynomial arithmetic over monomials (Algebraic Normal Form).
//!
//! A boolean function in ANF is an XOR of monomials, each monomial the AND
//! of a set of variables. Addition is XOR (a monomial present in both
//! operands cancels) and multiplication is AND (pairwise unions of the id
//! sets). Ids are one-based; the reserved id [`CONSTANT_ONE`] stands for the
//! constant-1 monomial and only ever appears as a singleton.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Reserved variable id representing the constant 1.
pub const CONSTANT_ONE: u32 = 0;

/// A conjunction of variables, stored as ascending one-based ids.
///
/// The reserved id [`CONSTANT_ONE`] forms the constant-1 monomial and is
/// never mixed with real ids in the same monomial.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Monomial(Vec<u32>);

impl Monomial {
    /// The constant-1 monomial.
    pub fn one() -> Self {
        Self(vec![CONSTANT_ONE])
    }

    /// The monomial of a single variable; `id` must be positive.
    pub fn variable(id: u32) -> Self {
        debug_assert!(id != CONSTANT_ONE, "the reserved id is not a variable");
        Self(vec![id])
    }

    /// A monomial from raw ids, as given; call [`Monomial::sort_ids`] before
    /// relying on ordered operations.
    pub fn from_ids(ids: Vec<u32>) -> Self {
        Self(ids)
    }

    /// Whether this is the constant-1 monomial.
    pub fn is_one(&self) -> bool {
        self.0.first() == Some(&CONSTANT_ONE)
    }

    /// The id sequence.
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    /// Sorts the id sequence ascending.
    pub fn sort_ids(&mut self) {
        self.0.sort_unstable();
    }

    /// The product (AND) of two monomials: the sorted union of their id
    /// sets, with the constant-1 monomial acting as identity.
    pub fn product(&self, rhs: &Monomial) -> Monomial {
        if self.is_one() {
            return rhs.clone();
        }
        if rhs.is_one() {
            return self.clone();
        }
        let mut ids = Vec::with_capacity(self.0.len() + rhs.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < rhs.0.len() {
            match self.0[i].cmp(&rhs.0[j]) {
                std::cmp::Ordering::Less => {
                    ids.push(self.0[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    ids.push(rhs.0[j]);
                    j += 1;
                }
                // x AND x = x: a shared variable appears once.
                std::cmp::Ordering::Equal => {
                    ids.push(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        ids.extend_from_slice(&self.0[i..]);
        ids.extend_from_slice(&rhs.0[j..]);
        Monomial(ids)
    }

    /// Multiplies the monomial by the variable `v`, which must precede every
    /// id already present: the constant-1 monomial becomes `{v}`, any other
    /// monomial gets `v` prepended.
    fn prefix_with(&mut self, v: u32) {
        if self.is_one() {
            self.0[0] = v;
        } else {
            self.0.insert(0, v);
        }
    }
}

/// A boolean function in Algebraic Normal Form: an XOR of monomials.
///
/// Canonical form requires the monomial list sorted ascending with no two
/// monomials equal (GF(2): a monomial XOR itself is 0) and the ids inside
/// each monomial sorted ascending. The empty polynomial is the constant 0;
/// the single constant-1 monomial is the constant 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anf(Vec<Monomial>);

impl Anf {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant-1 polynomial `{∅}`.
    pub fn one() -> Self {
        Self(vec![Monomial::one()])
    }

    /// A polynomial from raw monomials, as given.
    pub fn from_monomials(monomials: Vec<Monomial>) -> Self {
        Self(monomials)
    }

    /// The monomial list.
    pub fn monomials(&self) -> &[Monomial] {
        &self.0
    }

    /// Whether this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the constant-1 polynomial.
    pub fn is_one(&self) -> bool {
        self.0.len() == 1 && self.0[0].is_one()
    }

    /// Adds (XORs) `rhs` into `self`.
    ///
    /// Both operands must be in canonical monomial order. The result is the
    /// symmetric-difference merge: a monomial present in exactly one operand
    /// survives, one present in both cancels. Linear in the input sizes.
    pub fn add(&mut self, rhs: &Anf) {
        let lhs = std::mem::take(&mut self.0);
        let mut merged = Vec::with_capacity(lhs.len() + rhs.0.len());
        let (mut i, mut j) = (0, 0);
        while i < lhs.len() && j < rhs.0.len() {
            match lhs[i].cmp(&rhs.0[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(lhs[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(rhs.0[j].clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    // x + x = 0 over GF(2).
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&lhs[i..]);
        merged.extend_from_slice(&rhs.0[j..]);
        self.0 = merged;
    }

    /// Multiplies (ANDs) `self` by `rhs`.
    ///
    /// Degenerate cases short-circuit: either operand zero yields zero,
    /// either operand the constant 1 yields the other operand unchanged.
    /// Otherwise every monomial pair forms a product. With `sort_result`
    /// each product is merge-inserted into the growing result with immediate
    /// cancellation of an exact duplicate; without it, products are appended
    /// unsorted and the caller must canonicalize later via [`Anf::sort`]
    /// (individual product monomials are still internally sorted).
    pub fn multiply(&mut self, rhs: &Anf, sort_result: bool) {
        if self.is_zero() {
            return;
        }
        if rhs.is_zero() {
            self.0.clear();
            return;
        }
        if rhs.is_one() {
            return;
        }
        if self.is_one() {
            *self = rhs.clone();
            return;
        }

        let lhs = std::mem::take(&mut self.0);
        for a in &rhs.0 {
            for b in &lhs {
                let product = a.product(b);
                if sort_result {
                    self.insert_cancelling(product);
                } else {
                    self.0.push(product);
                }
            }
        }
    }

    /// Merge-inserts one monomial, cancelling against an exact duplicate.
    fn insert_cancelling(&mut self, monomial: Monomial) {
        match self.0.binary_search(&monomial) {
            Ok(position) => {
                self.0.remove(position);
            }
            Err(position) => {
                self.0.insert(position, monomial);
            }
        }
    }

    /// Appends `rhs` without any cancellation.
    ///
    /// Staging only: several concatenations followed by one [`Anf::sort`]
    /// are algebraically equivalent to successive [`Anf::add`]s.
    pub fn concat(&mut self, rhs: Anf) {
        self.0.extend(rhs.0);
    }

    /// Canonicalizes the polynomial.
    ///
    /// With `sub_sort`, first sorts the ids inside every monomial. Then
    /// sorts the monomial list and removes each *adjacent* equal pair.
    /// The pair scan cancels exactly two copies per adjacency, so an odd
    /// multiplicity of three or more leaves one residual copy; callers
    /// must not produce such multiplicities between sorts.
    pub fn sort(&mut self, sub_sort: bool) {
        if sub_sort {
            for monomial in &mut self.0 {
                monomial.sort_ids();
            }
        }
        self.0.sort();
        let monomials = std::mem::take(&mut self.0);
        let mut kept = Vec::with_capacity(monomials.len());
        let mut iter = monomials.into_iter().peekable();
        while let Some(monomial) = iter.next() {
            if iter.peek() == Some(&monomial) {
                iter.next();
            } else {
                kept.push(monomial);
            }
        }
        self.0 = kept;
    }

    /// Samples a uniformly random boolean function over exactly the given
    /// variables, in canonical ANF.
    ///
    /// Recursively: with no variables the result is 0 or 1 with probability
    /// ½ each; otherwise one coin decides the constant-1 monomial and, for
    /// each variable in order, a random function over the remaining suffix
    /// contributes its monomials with the variable prepended. Each of the
    /// `2^k` monomials over the power set is thereby included independently
    /// with probability ½, so all `2^(2^k)` functions over `k` variables are
    /// equally likely. The result is sorted and duplicate-free when
    /// `variables` is ascending.
    pub fn random<R: RngCore>(rng: &mut R, variables: &[u32]) -> Anf {
        let mut monomials = Vec::new();
        if rng.gen::<bool>() {
            monomials.push(Monomial::one());
        }
        for (index, &v) in variables.iter().enumerate() {
            let tail = Anf::random(rng, &variables[index + 1..]);
            for mut monomial in tail.0 {
                monomial.prefix_with(v);
                monomials.push(monomial);
            }
        }
        Anf(monomials)
    }

    /// Materializes the polynomial as an expression tree: an `Xor` of `And`
    /// summands whose literals are `Constant(true)` for the reserved id and
    /// `Variable(id - 1)` otherwise.
    pub fn to_expr(&self, vars: usize) -> Expr {
        let summands = self
            .0
            .iter()
            .map(|monomial| {
                let literals = monomial
                    .ids()
                    .iter()
                    .map(|&id| {
                        if id == CONSTANT_ONE {
                            Expr::constant(vars, true)
                        } else {
                            Expr::variable(vars, (id - 1) as usize)
                        }
                    })
                    .collect();
                Expr::and_of(vars, literals)
            })
            .collect();
        Expr::xor_of(vars, summands)
    }
}
