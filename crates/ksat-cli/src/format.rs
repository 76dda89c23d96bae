//! Text formats for bit vectors, CNF keys, ANF ciphers, and cipher streams.
//!
//! The formats are DIMACS-like: `c`/`#` lines are comments, a `p` line
//! announces the kind and dimensions, and each clause or summand is a
//! space-separated list of one-based ids terminated by `0`. Negative ids in
//! CNF mark negated literals; ANF ids are never negative, and the lone `0 0`
//! line encodes the constant-1 summand.

use anyhow::{bail, Context, Result};
use ksat_core::{Expr, ExprKind};
use ksat_engine::CipherStream;
use ksat_gen::{PrivateKey, PublicKey};

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('c') || line.starts_with('#')
}

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !is_comment(line))
}

/// Parses a line of `0`/`1` characters, with or without separators.
pub fn parse_bits(text: &str) -> Result<Vec<bool>> {
    let line = content_lines(text)
        .next()
        .context("no bit line found in input")?;
    let mut bits = Vec::with_capacity(line.len());
    for symbol in line.chars() {
        match symbol {
            '0' => bits.push(false),
            '1' => bits.push(true),
            c if c.is_whitespace() || c == ',' => {}
            other => bail!("unexpected character {other:?} in bit line"),
        }
    }
    if bits.is_empty() {
        bail!("bit line is empty");
    }
    Ok(bits)
}

/// Renders a bit vector as a single line.
pub fn render_bits(bits: &[bool]) -> String {
    let mut out = String::from("c Bit vector, most significant bit last.\nc\n");
    for &bit in bits {
        out.push(if bit { '1' } else { '0' });
    }
    out.push('\n');
    out
}

/// Parses a DIMACS CNF file into a validated public key.
pub fn parse_cnf(text: &str) -> Result<PublicKey> {
    let mut lines = content_lines(text);
    let header = lines.next().context("missing 'p cnf' header")?;
    let (vars, clause_count) = parse_problem_line(header, "cnf")?;

    let mut clauses = Vec::with_capacity(clause_count);
    for line in lines {
        let mut literals = Vec::new();
        let mut terminated = false;
        for token in line.split_whitespace() {
            if terminated {
                bail!("tokens after the clause terminator in {line:?}");
            }
            let id: i64 = token
                .parse()
                .with_context(|| format!("bad literal {token:?}"))?;
            if id == 0 {
                terminated = true;
            } else {
                literals.push(literal_expr(vars, id)?);
            }
        }
        if !terminated {
            bail!("clause line {line:?} is not terminated by 0");
        }
        clauses.push(Expr::or_of(vars, literals));
    }

    if clauses.len() != clause_count {
        bail!(
            "header announced {clause_count} clauses but {} were given",
            clauses.len()
        );
    }
    PublicKey::from_expr(Expr::and_of(vars, clauses)).context("CNF shape check failed")
}

/// Renders a public key as DIMACS CNF.
pub fn render_cnf(key: &PublicKey) -> String {
    let mut out = String::from("c CNF public key.\nc\n");
    out.push_str(&format!("p cnf {} {}\n", key.vars(), key.clause_count()));
    for clause in key.clauses() {
        for literal in clause.children() {
            out.push_str(&format!("{} ", literal.dependence()));
        }
        out.push_str("0\n");
    }
    out
}

/// Parses one ANF block (header plus summand lines) from `lines`, skipping
/// interleaved comment lines.
pub fn parse_anf<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<Expr> {
    let mut next_content = || {
        for line in lines.by_ref() {
            let line = line.trim_end();
            if !is_comment(line) {
                return Some(line);
            }
        }
        None
    };

    let header = next_content().context("missing 'p anf' header")?;
    let (vars, summand_count) = parse_problem_line(header, "anf")?;

    let mut summands = Vec::with_capacity(summand_count);
    while summands.len() < summand_count {
        let line =
            next_content().with_context(|| format!("expected {summand_count} summands"))?;
        let mut literals = Vec::new();
        let mut terminated = false;
        for token in line.split_whitespace() {
            let id: i64 = token
                .parse()
                .with_context(|| format!("bad summand id {token:?}"))?;
            if terminated && id != 0 {
                bail!("tokens after the summand terminator in {line:?}");
            }
            if id < 0 {
                bail!("ANF must not contain negations, got {id}");
            }
            if id == 0 {
                terminated = true;
            } else {
                literals.push(Expr::variable(vars, (id - 1) as usize));
            }
        }
        if !terminated {
            bail!("summand line {line:?} is not terminated by 0");
        }
        // A bare terminator is the constant-1 summand.
        if literals.is_empty() {
            literals.push(Expr::constant(vars, true));
        }
        summands.push(Expr::and_of(vars, literals));
    }
    Ok(Expr::xor_of(vars, summands))
}

/// Renders a cipher expression as an ANF block.
pub fn render_anf(expr: &Expr) -> Result<String> {
    let summands = match expr.kind() {
        ExprKind::Xor(summands) => summands,
        _ => bail!("function is not in ANF: root is not an XOR"),
    };
    let mut out = String::new();
    out.push_str("c The format of the next line is 'p anf numberOfVariables numberOfSummands'.\n");
    out.push_str(&format!("p anf {} {}\n", expr.vars(), summands.len()));
    out.push_str("c One summand per line: variable indices terminated by '0';\n");
    out.push_str("c a double '0 0' is the constant summand '1'.\n");
    for summand in summands {
        let literals = match summand.kind() {
            ExprKind::And(literals) => literals,
            _ => bail!("function is not in ANF: summand is not an AND"),
        };
        for literal in literals {
            match literal.kind() {
                ExprKind::Constant(true) | ExprKind::Variable(_) => {
                    out.push_str(&format!("{} ", literal.dependence()));
                }
                _ => bail!("function is not in ANF: unexpected literal"),
            }
        }
        out.push_str("0\n");
    }
    Ok(out)
}

/// Parses a cipher stream: an `s` scalar line followed by one ANF block per
/// encrypted bit.
pub fn parse_cipher(text: &str) -> Result<CipherStream> {
    let mut lines = content_lines(text).peekable();
    let scalar_line = lines.next().context("missing 's' scalar line")?;
    let mut tokens = scalar_line.split_whitespace();
    if tokens.next() != Some("s") {
        bail!("cipher must start with an 's salt textLength beta' line");
    }
    let salt: u64 = tokens
        .next()
        .context("missing salt")?
        .parse()
        .context("bad salt")?;
    let length: usize = tokens
        .next()
        .context("missing text length")?
        .parse()
        .context("bad text length")?;
    let beta: usize = tokens
        .next()
        .context("missing beta")?
        .parse()
        .context("bad beta")?;

    let mut bits = Vec::with_capacity(length);
    for index in 0..length {
        let bit = parse_anf(&mut lines).with_context(|| format!("cipher bit {index}"))?;
        bits.push(bit);
    }
    if lines.peek().is_some() {
        bail!("trailing content after {length} cipher bits");
    }
    Ok(CipherStream { salt, beta, bits })
}

/// Renders a cipher stream in the text format.
pub fn render_cipher(stream: &CipherStream) -> Result<String> {
    let mut out = String::from("c Cipher\nc Format of the next line: 's salt textLength beta'\n");
    out.push_str(&format!(
        "s {} {} {}\nc\n",
        stream.salt,
        stream.len(),
        stream.beta
    ));
    for bit in &stream.bits {
        out.push_str("c ----------------------------------------\n");
        out.push_str("c --------------next bit------------------\n");
        out.push_str("c ----------------------------------------\n");
        out.push_str(&render_anf(bit)?);
    }
    Ok(out)
}

fn parse_problem_line(line: &str, kind: &str) -> Result<(usize, usize)> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("p") {
        bail!("unrecognized header {line:?}: 'p' missing");
    }
    let found = tokens.next().unwrap_or("");
    if found != kind {
        bail!("unrecognized header {line:?}: expected 'p {kind}'");
    }
    let vars = tokens
        .next()
        .context("missing variable count")?
        .parse()
        .context("bad variable count")?;
    let count = tokens
        .next()
        .context("missing clause count")?
        .parse()
        .context("bad clause count")?;
    Ok((vars, count))
}

fn literal_expr(vars: usize, id: i64) -> Result<Expr> {
    let index = id.unsigned_abs() as usize - 1;
    if index >= vars {
        bail!("literal {id} is out of range for {vars} variables");
    }
    let variable = Expr::variable(vars, index);
    Ok(if id < 0 { Expr::not(variable) } else { variable })
}

#[cfg(test)]
mod tests {
    use super::*;

    use ksat_core::Anf;
    use ksat_core::Monomial;

    #[test]
    fn bits_round_trip() {
        let bits = vec![true, false, true, true];
        let text = render_bits(&bits);
        assert_eq!(parse_bits(&text).expect("parse"), bits);
        assert_eq!(parse_bits("c comment\n1 0 1 1\n").expect("parse"), bits);
    }

    #[test]
    fn bits_reject_garbage() {
        assert!(parse_bits("c only comments\n").is_err());
        assert!(parse_bits("10x1\n").is_err());
    }

    #[test]
    fn cnf_round_trips() {
        let text = "c planted instance\np cnf 4 2\n1 -2 4 0\n-1 3 0\n";
        let key = parse_cnf(text).expect("parse");
        assert_eq!(key.vars(), 4);
        assert_eq!(key.clause_count(), 2);
        let rendered = render_cnf(&key);
        let reparsed = parse_cnf(&rendered).expect("reparse");
        assert_eq!(reparsed, key);
    }

    #[test]
    fn cnf_rejects_count_mismatch_and_bad_lines() {
        assert!(parse_cnf("p cnf 3 2\n1 2 0\n").is_err());
        assert!(parse_cnf("p cnf 3 1\n1 2\n").is_err());
        assert!(parse_cnf("p dnf 3 1\n1 2 0\n").is_err());
        assert!(parse_cnf("p cnf 3 1\n1 7 0\n").is_err());
    }

    #[test]
    fn anf_round_trips_including_the_constant_summand() {
        let anf = Anf::from_monomials(vec![
            Monomial::one(),
            Monomial::from_ids(vec![1, 3]),
        ]);
        let expr = anf.to_expr(4);
        let text = render_anf(&expr).expect("render");
        let reparsed = parse_anf(&mut text.lines()).expect("parse");
        assert_eq!(reparsed, expr);
        assert!(text.contains("0 0\n"));
    }

    #[test]
    fn anf_rejects_negations() {
        assert!(parse_anf(&mut "p anf 3 1\n1 -2 0\n".lines()).is_err());
    }

    #[test]
    fn cipher_round_trips() {
        let bits = vec![
            Anf::from_monomials(vec![Monomial::one()]).to_expr(3),
            Anf::from_monomials(vec![Monomial::from_ids(vec![2]), Monomial::from_ids(vec![3])])
                .to_expr(3),
        ];
        let stream = CipherStream {
            salt: 987,
            beta: 3,
            bits,
        };
        let text = render_cipher(&stream).expect("render");
        let reparsed = parse_cipher(&text).expect("parse");
        assert_eq!(reparsed, stream);
    }

    #[test]
    fn cipher_rejects_missing_scalars() {
        assert!(parse_cipher("c Cipher\np anf 3 0\n").is_err());
        assert!(parse_cipher("s 1 2\n").is_err());
    }
}
