//! The per-bit encryption transform.

use ksat_core::{Anf, Expr, Monomial};
use ksat_gen::PublicKey;
use log::debug;
use rand::{CryptoRng, Rng, RngCore};
use thiserror::Error;

use crate::stream::{rng_for_seed, stream_seed, CipherStream};

/// Errors from encryption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EncryptError {
    /// The clause permutation had no unique inverse for a clause index.
    /// This is an internal consistency failure, not a recoverable state.
    #[error("clause permutation has no unique inverse for clause {clause}")]
    PermutationInverse {
        /// Original index of the clause that could not be placed.
        clause: usize,
    },
}

/// Configuration for the encryption transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncryptConfig {
    /// Window size `beta`: the number of consecutive permuted clauses whose
    /// dependency sets jointly mask one random function.
    pub beta: usize,
}

impl Default for EncryptConfig {
    fn default() -> Self {
        Self { beta: 3 }
    }
}

/// The encryption engine.
///
/// Stateless apart from its configuration; randomness is passed into each
/// call so that per-bit encryptions are independent consumers of one
/// advancing stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct Encryptor {
    config: EncryptConfig,
}

impl Encryptor {
    /// Creates an engine with the given configuration.
    pub fn new(config: EncryptConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EncryptConfig {
        &self.config
    }

    /// Encrypts a whole plaintext deterministically under `salt`.
    ///
    /// The public key is canonicalized once, the stream seed is derived from
    /// the salt and the plaintext, and each bit is encrypted with the
    /// advancing ChaCha20 stream. Replaying the same inputs reproduces the
    /// stream exactly.
    pub fn encrypt_stream(
        &self,
        public_key: &PublicKey,
        plaintext: &[bool],
        salt: u64,
    ) -> Result<CipherStream, EncryptError> {
        let mut key = public_key.clone();
        key.canonicalize();
        let mut rng = rng_for_seed(stream_seed(salt, plaintext));
        let bits = plaintext
            .iter()
            .map(|&bit| self.encrypt_bit(&mut rng, &key, bit))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CipherStream {
            salt,
            beta: self.config.beta,
            bits,
        })
    }

    /// Encrypts one plaintext bit.
    ///
    /// Expects a canonically sorted public key so that clause indices are
    /// reproducible (see [`PublicKey::canonicalize`]).
    pub fn encrypt_bit<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        public_key: &PublicKey,
        bit: bool,
    ) -> Result<Expr, EncryptError> {
        let n = public_key.vars();
        let m = public_key.clause_count();
        let beta = self.config.beta;
        debug!("encrypting one bit: n = {n}, m = {m}, beta = {beta}");

        // Uniform random permutation of the clause indices.
        let permutation = draw_permutation(rng, m);
        let mut inverse: Vec<Option<usize>> = vec![None; m];
        for (slot, &clause_index) in permutation.iter().enumerate() {
            inverse[clause_index] = Some(slot);
        }

        // Negated-clause ANFs and dependency sets, indexed by permuted slot.
        let mut negated: Vec<Anf> = vec![Anf::zero(); m];
        let mut depends: Vec<Vec<u32>> = vec![Vec::new(); m];
        let mut filled = vec![false; m];
        for (clause_index, clause) in public_key.clauses().iter().enumerate() {
            let slot = inverse[clause_index].ok_or(EncryptError::PermutationInverse {
                clause: clause_index,
            })?;
            if filled[slot] {
                return Err(EncryptError::PermutationInverse {
                    clause: clause_index,
                });
            }
            let (anf, vars) = negated_clause_anf(clause);
            negated[slot] = anf;
            depends[slot] = vars;
            filled[slot] = true;
        }

        // One random function per window position, each masked by the
        // dependency sets of the other clauses in its window and multiplied
        // by the negated clause just past the window.
        let mut cipher = Anf::zero();
        for i in 0..m {
            for j in 0..beta {
                let mut window_vars: Vec<u32> = Vec::new();
                for k in 0..beta {
                    if k != j {
                        window_vars.extend_from_slice(&depends[(i + k) % m]);
                    }
                }
                window_vars.sort_unstable();
                window_vars.dedup();

                let mut summand = Anf::random(rng, &window_vars);
                // Eager sorting is skipped here; one canonicalization below
                // covers all m * beta summands.
                summand.multiply(&negated[(i + beta) % m], false);
                cipher.concat(summand);
            }
        }
        cipher.sort(false);

        if bit {
            cipher.add(&Anf::one());
        }

        Ok(cipher.to_expr(n))
    }

    /// Honesty check: re-encrypts `plaintext` under the stream's recorded
    /// salt and window and compares the result for exact equality.
    ///
    /// Deterministic seeding makes an honestly produced stream reproduce
    /// bit-for-bit; any mismatch means the stream was not the claimed
    /// encryption of the claimed plaintext.
    pub fn verify_stream(
        public_key: &PublicKey,
        plaintext: &[bool],
        stream: &CipherStream,
    ) -> Result<bool, EncryptError> {
        if plaintext.len() != stream.len() {
            return Ok(false);
        }
        let engine = Encryptor::new(EncryptConfig { beta: stream.beta });
        let replayed = engine.encrypt_stream(public_key, plaintext, stream.salt)?;
        Ok(replayed == *stream)
    }
}

/// Draws a uniform permutation of `0..m` by walking a shrinking candidate
/// pool: at each position the walk stops with probability one over the
/// number of candidates still reachable, so every remaining candidate is
/// equally likely.
fn draw_permutation<R: RngCore>(rng: &mut R, m: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..m).collect();
    let mut permutation = Vec::with_capacity(m);
    while !pool.is_empty() {
        let mut reachable = pool.len();
        let mut pick = pool.len() - 1;
        for index in 0..pool.len() {
            if rng.gen_range(0..reachable) == 0 {
                pick = index;
                break;
            }
            reachable -= 1;
        }
        permutation.push(pool.remove(pick));
    }
    permutation
}

/// The ANF of a clause's negation, plus the deduplicated sorted variable
/// ids the clause mentions.
///
/// De Morgan over GF(2): the negation of `l_1 ∨ … ∨ l_k` is the product of
/// the negated literals, `1 + v` for a positive literal and `v` for a
/// negative one. The product evaluates to 1 exactly when the clause is
/// false.
fn negated_clause_anf(clause: &Expr) -> (Anf, Vec<u32>) {
    let mut anf = Anf::one();
    let mut vars: Vec<u32> = Vec::with_capacity(clause.children().len());
    for literal in clause.children() {
        let dependence = literal.dependence();
        let factor = if dependence > 0 {
            let id = dependence as u32;
            vars.push(id);
            Anf::from_monomials(vec![Monomial::one(), Monomial::variable(id)])
        } else {
            let id = (-dependence) as u32;
            vars.push(id);
            Anf::from_monomials(vec![Monomial::variable(id)])
        };
        anf.multiply(&factor, true);
    }
    vars.sort_unstable();
    vars.dedup();
    (anf, vars)
}
