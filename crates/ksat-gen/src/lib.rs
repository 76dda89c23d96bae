//! Planted-SAT key pair generation.
//!
//! A private key is a uniform bit vector; the matching public key is a
//! random CNF instance planted on it: every clause is generated so that the
//! private assignment satisfies it, which makes the key pair valid by
//! construction while the instance looks like ordinary random k-SAT.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod generator;
mod keys;
mod params;

pub use crate::generator::{KeyGenError, KeyGenerator};
pub use crate::keys::{KeyFormatError, KeyPair, PrivateKey, PublicKey};
pub use crate::params::KeyParams;
