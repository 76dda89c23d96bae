//! The planted-SAT key generator.

use std::cmp::Ordering;

use ksat_core::Expr;
use log::debug;
use rand::{CryptoRng, Rng, RngCore};
use thiserror::Error;

use crate::keys::{KeyPair, PrivateKey, PublicKey};
use crate::params::KeyParams;

/// Errors from key generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyGenError {
    /// `k` must satisfy `0 < k < n` so that distinct-variable sampling and
    /// the sign-planting retry both terminate.
    #[error("clause width {width} is not in 1..{vars}")]
    InvalidClauseWidth {
        /// Requested literals per clause.
        width: usize,
        /// Number of variables.
        vars: usize,
    },
    /// A public key needs at least one clause.
    #[error("public key needs at least one clause")]
    NoClauses,
    /// The private key does not match the parameterized length.
    #[error("private key has {actual} bits but parameters expect {expected}")]
    KeyLengthMismatch {
        /// Length required by the parameters.
        expected: usize,
        /// Length of the supplied key.
        actual: usize,
    },
    /// The clause-planting search could not find enough distinct satisfied
    /// clauses within its attempt budget.
    #[error("gave up after {attempts} candidate clauses ({accepted} of {needed} accepted)")]
    Exhausted {
        /// Candidate clauses drawn before giving up.
        attempts: usize,
        /// Clauses accepted so far.
        accepted: usize,
        /// Clauses required.
        needed: usize,
    },
}

/// Key pair generator parametrized by an RNG.
///
/// Key generation should be driven by a non-deterministically seeded RNG;
/// reproducible seeding is only meant for tests.
pub struct KeyGenerator<R: RngCore + CryptoRng> {
    rng: R,
    params: KeyParams,
}

impl<R: RngCore + CryptoRng> KeyGenerator<R> {
    /// Creates a generator for the given parameters.
    pub fn new(rng: R, params: KeyParams) -> Self {
        Self { rng, params }
    }

    /// The parameters this generator was created with.
    pub fn params(&self) -> &KeyParams {
        &self.params
    }

    /// Draws `n` independent uniform bits.
    pub fn generate_private_key(&mut self) -> PrivateKey {
        let bits = (0..self.params.vars).map(|_| self.rng.gen::<bool>()).collect();
        PrivateKey::new(bits)
    }

    /// Plants a public key on `private`: repeatedly samples candidate
    /// clauses until `m` distinct satisfied ones are collected.
    ///
    /// Each candidate picks `k` distinct variables, then signs; a candidate
    /// falsified by the private key re-rolls its signs with the variable
    /// choice kept, and a duplicate of an accepted clause discards the
    /// variable choice too. The search is capped; exceeding the cap
    /// surfaces [`KeyGenError::Exhausted`] instead of looping forever.
    pub fn generate_public_key(&mut self, private: &PrivateKey) -> Result<PublicKey, KeyGenError> {
        let KeyParams {
            vars: n,
            clauses: m,
            clause_width: k,
        } = self.params;
        if k == 0 || k >= n {
            return Err(KeyGenError::InvalidClauseWidth { width: k, vars: n });
        }
        if m == 0 {
            return Err(KeyGenError::NoClauses);
        }
        if private.len() != n {
            return Err(KeyGenError::KeyLengthMismatch {
                expected: n,
                actual: private.len(),
            });
        }

        let cap = attempt_cap(m);
        let mut attempts = 0usize;
        let mut clauses: Vec<Expr> = Vec::with_capacity(m);
        'clauses: while clauses.len() < m {
            // Sample k distinct variables, rejecting repeats.
            let mut chosen: Vec<usize> = Vec::with_capacity(k);
            while chosen.len() < k {
                let candidate = self.rng.gen_range(0..n);
                if !chosen.contains(&candidate) {
                    chosen.push(candidate);
                }
            }

            // Sign the literals until the private key satisfies the clause.
            loop {
                attempts += 1;
                if attempts > cap {
                    return Err(KeyGenError::Exhausted {
                        attempts: cap,
                        accepted: clauses.len(),
                        needed: m,
                    });
                }

                let literals = chosen
                    .iter()
                    .map(|&v| {
                        if self.rng.gen::<bool>() {
                            Expr::variable(n, v)
                        } else {
                            Expr::not(Expr::variable(n, v))
                        }
                    })
                    .collect();
                let clause = Expr::or_of(n, literals);

                let satisfied = clause
                    .evaluate(private.bits())
                    .expect("clause variables are in range");
                if !satisfied {
                    // Planting: re-roll signs only, keeping the variables.
                    continue;
                }

                let duplicate = clauses
                    .iter()
                    .any(|accepted| accepted.canonical_cmp(&clause) == Ordering::Equal);
                if duplicate {
                    debug!(
                        "duplicate clause {clause} rejected ({} of {m} accepted)",
                        clauses.len()
                    );
                    continue 'clauses;
                }

                clauses.push(clause);
                continue 'clauses;
            }
        }

        Ok(PublicKey::from_clauses_unchecked(n, clauses))
    }

    /// Generates a fresh key pair.
    pub fn generate_pair(&mut self) -> Result<KeyPair, KeyGenError> {
        let private = self.generate_private_key();
        let public = self.generate_public_key(&private)?;
        Ok(KeyPair { private, public })
    }
}

/// Candidate-clause budget for the planting search.
fn attempt_cap(clauses: usize) -> usize {
    clauses.saturating_mul(64).max(4096)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cmp::Ordering;

    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use test_log::test;

    fn generator(seed: u8, params: KeyParams) -> KeyGenerator<ChaCha20Rng> {
        KeyGenerator::new(ChaCha20Rng::from_seed([seed; 32]), params)
    }

    #[test]
    fn generated_pairs_are_planted() {
        for seed in 0..5u8 {
            let params = KeyParams {
                vars: 12,
                clauses: 40,
                clause_width: 3,
            };
            let pair = generator(seed, params).generate_pair().expect("key pair");
            assert!(pair.is_valid());
            assert_eq!(pair.private.len(), 12);
            assert_eq!(pair.public.clause_count(), 40);
        }
    }

    #[test]
    fn every_clause_is_individually_satisfied() {
        let params = KeyParams {
            vars: 10,
            clauses: 30,
            clause_width: 3,
        };
        let mut gen = generator(9, params);
        let pair = gen.generate_pair().expect("key pair");
        for clause in pair.public.clauses() {
            assert_eq!(clause.evaluate(pair.private.bits()), Ok(true));
            assert_eq!(clause.children().len(), 3);
        }
    }

    #[test]
    fn clauses_are_pairwise_distinct() {
        let params = KeyParams {
            vars: 8,
            clauses: 50,
            clause_width: 3,
        };
        let pair = generator(1, params).generate_pair().expect("key pair");
        let clauses = pair.public.clauses();
        for (i, a) in clauses.iter().enumerate() {
            for b in &clauses[i + 1..] {
                assert_ne!(a.canonical_cmp(b), Ordering::Equal);
            }
        }
    }

    #[test]
    fn clause_variables_are_distinct() {
        let params = KeyParams {
            vars: 6,
            clauses: 20,
            clause_width: 3,
        };
        let pair = generator(4, params).generate_pair().expect("key pair");
        for clause in pair.public.clauses() {
            let mut ids: Vec<i64> = clause.children().iter().map(|l| l.dependence().abs()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), 3);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut gen = generator(0, KeyParams {
            vars: 3,
            clauses: 10,
            clause_width: 3,
        });
        let private = gen.generate_private_key();
        assert_eq!(
            gen.generate_public_key(&private),
            Err(KeyGenError::InvalidClauseWidth { width: 3, vars: 3 })
        );

        let mut gen = generator(0, KeyParams {
            vars: 4,
            clauses: 0,
            clause_width: 3,
        });
        let private = gen.generate_private_key();
        assert_eq!(gen.generate_public_key(&private), Err(KeyGenError::NoClauses));

        let mut gen = generator(0, KeyParams {
            vars: 4,
            clauses: 8,
            clause_width: 3,
        });
        let short = PrivateKey::new(vec![true; 2]);
        assert_eq!(
            gen.generate_public_key(&short),
            Err(KeyGenError::KeyLengthMismatch {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn exhaustion_surfaces_instead_of_spinning() {
        // Comparison is on representation, so ordered variable triples count
        // separately: 4 variables and width 3 admit 4·3·2 = 24 literal
        // sequences with 2^3 - 1 = 7 satisfied sign patterns each, a pool of
        // 168 clauses. Asking for more must terminate with an error.
        let params = KeyParams {
            vars: 4,
            clauses: 200,
            clause_width: 3,
        };
        let mut gen = generator(2, params);
        let private = gen.generate_private_key();
        match gen.generate_public_key(&private) {
            Err(KeyGenError::Exhausted { accepted, needed, .. }) => {
                assert!(accepted < needed);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let params = KeyParams {
            vars: 10,
            clauses: 24,
            clause_width: 3,
        };
        let a = generator(7, params).generate_pair().expect("key pair");
        let b = generator(7, params).generate_pair().expect("key pair");
        assert_eq!(a, b);
    }
}
