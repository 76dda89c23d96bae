//! Key generation parameters.

use serde::{Deserialize, Serialize};

/// Parameters describing a key pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyParams {
    /// Private key length `n` (number of variables).
    pub vars: usize,
    /// Number of clauses `m` in the public key.
    pub clauses: usize,
    /// Literals per clause `k`.
    pub clause_width: usize,
}

impl KeyParams {
    /// Default clause width.
    pub const DEFAULT_CLAUSE_WIDTH: usize = 3;

    /// Parameters for `n` variables with the default `m = 8n`, `k = 3`.
    pub fn for_vars(vars: usize) -> Self {
        Self {
            vars,
            clauses: 8 * vars,
            clause_width: Self::DEFAULT_CLAUSE_WIDTH,
        }
    }
}

impl Default for KeyParams {
    fn default() -> Self {
        Self::for_vars(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_three_sat_parameterization() {
        let params = KeyParams::for_vars(64);
        assert_eq!(params.clauses, 512);
        assert_eq!(params.clause_width, 3);
        assert_eq!(KeyParams::default().vars, 1024);
    }
}
