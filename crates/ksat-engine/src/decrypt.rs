//! Decryption: evaluation of cipher trees under the private key.

use ksat_core::{Expr, ExprError};
use ksat_gen::PrivateKey;

use crate::stream::CipherStream;

/// Recovers one plaintext bit by evaluating the cipher tree under the
/// private assignment.
pub fn decrypt_bit(cipher: &Expr, key: &PrivateKey) -> Result<bool, ExprError> {
    cipher.evaluate(key.bits())
}

/// Decrypts every bit of a cipher stream.
pub fn decrypt_stream(stream: &CipherStream, key: &PrivateKey) -> Result<Vec<bool>, ExprError> {
    stream
        .bits
        .iter()
        .map(|cipher| decrypt_bit(cipher, key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_is_plain_evaluation() {
        let key = PrivateKey::new(vec![true, false]);
        // x1 XOR 1 under x1 = true is false.
        let cipher = Expr::xor_of(
            2,
            vec![
                Expr::and_of(2, vec![Expr::variable(2, 0)]),
                Expr::and_of(2, vec![Expr::constant(2, true)]),
            ],
        );
        assert_eq!(decrypt_bit(&cipher, &key), Ok(false));
    }

    #[test]
    fn malformed_ciphers_surface_evaluation_errors() {
        let key = PrivateKey::new(vec![true, false]);
        let cipher = Expr::xor_of(2, vec![Expr::and_of(2, vec![Expr::variable(2, 9)])]);
        assert_eq!(
            decrypt_bit(&cipher, &key),
            Err(ExprError::VariableOutOfRange { index: 9, vars: 2 })
        );
    }
}
