//! Encryption and decryption runtime.
//!
//! Encryption hides one plaintext bit inside a random-looking GF(2)
//! polynomial built from the public key: every summand carries a factor
//! that is the ANF of a *negated* clause, and the planted private key
//! satisfies every clause, so under the private assignment every summand
//! collapses to zero. The only term that can survive is the constant
//! monomial mixed in for a plaintext 1, so decryption is plain evaluation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod decrypt;
mod encrypt;
mod stream;

pub use crate::decrypt::{decrypt_bit, decrypt_stream};
pub use crate::encrypt::{EncryptConfig, EncryptError, Encryptor};
pub use crate::stream::{rng_for_seed, stream_seed, CipherStream};
