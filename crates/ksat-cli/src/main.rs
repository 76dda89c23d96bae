//! Command-line interface for `kryptosat-rs`.

#![forbid(unsafe_code)]

mod format;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use ksat_engine::{decrypt_stream, EncryptConfig, Encryptor};
use ksat_gen::{KeyGenerator, KeyParams, PrivateKey};

/// SAT-based public-key cryptosystem CLI.
#[derive(Parser)]
#[command(
    name = "ksat",
    version,
    author,
    about = "Planted-SAT public-key cryptosystem (keygen, encrypt, decrypt)"
)]
struct Cli {
    /// Log at debug level instead of info.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair and write PREFIX.pub / PREFIX.priv.
    Gen {
        /// Output path prefix for the key files.
        #[arg(long, value_name = "PREFIX")]
        out: PathBuf,
        /// Private key length n (number of variables).
        #[arg(long, default_value_t = 1024)]
        vars: usize,
        /// Number of clauses m (defaults to 8n).
        #[arg(long)]
        clauses: Option<usize>,
        /// Literals per clause k.
        #[arg(long, default_value_t = KeyParams::DEFAULT_CLAUSE_WIDTH)]
        width: usize,
        /// Optional RNG seed for reproducible generation (tests only).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encrypt a bit file with a public key.
    Enc {
        /// Path to the DIMACS CNF public key.
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,
        /// Input plaintext bit file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output cipher path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Salt for the deterministic stream seed; drawn from the OS when
        /// omitted.
        #[arg(long)]
        salt: Option<u64>,
        /// Window parameter beta.
        #[arg(long, default_value_t = 3)]
        beta: usize,
    },
    /// Decrypt a cipher file with a private key.
    Dec {
        /// Path to the private key bit file.
        #[arg(long, value_name = "FILE")]
        private_key: PathBuf,
        /// Input cipher path.
        #[arg(long, value_name = "FILE")]
        cipher: PathBuf,
        /// Output plaintext bit path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Check that a key pair is valid: pub(priv) = 1.
    Check {
        /// Path to the DIMACS CNF public key.
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,
        /// Path to the private key bit file.
        #[arg(long, value_name = "FILE")]
        private_key: PathBuf,
    },
    /// Verify that a cipher is the honest encryption of a clear text.
    Verify {
        /// Path to the DIMACS CNF public key.
        #[arg(long, value_name = "FILE")]
        public_key: PathBuf,
        /// Path to the claimed clear text bit file.
        #[arg(long, value_name = "FILE")]
        cleartext: PathBuf,
        /// Path to the cipher under scrutiny.
        #[arg(long, value_name = "FILE")]
        cipher: PathBuf,
    },
    /// Run a local demo: generate keys, encrypt random bits, decrypt back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
        /// Private key length for the demo pair.
        #[arg(long, default_value_t = 16)]
        vars: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    match cli.command {
        Commands::Gen {
            out,
            vars,
            clauses,
            width,
            seed,
        } => cmd_gen(&out, vars, clauses, width, seed),
        Commands::Enc {
            public_key,
            input,
            output,
            salt,
            beta,
        } => cmd_enc(&public_key, &input, &output, salt, beta),
        Commands::Dec {
            private_key,
            cipher,
            output,
        } => cmd_dec(&private_key, &cipher, &output),
        Commands::Check {
            public_key,
            private_key,
        } => cmd_check(&public_key, &private_key),
        Commands::Verify {
            public_key,
            cleartext,
            cipher,
        } => cmd_verify(&public_key, &cleartext, &cipher),
        Commands::Demo { seed, vars } => cmd_demo(seed, vars),
    }
}

fn cmd_gen(
    out: &Path,
    vars: usize,
    clauses: Option<usize>,
    width: usize,
    seed: Option<u64>,
) -> Result<()> {
    let params = KeyParams {
        vars,
        clauses: clauses.unwrap_or(8 * vars),
        clause_width: width,
    };
    let mut gen = KeyGenerator::new(seeded_rng(seed), params);
    let pair = gen.generate_pair().context("key generation")?;

    let pub_path = out.with_extension("pub");
    let priv_path = out.with_extension("priv");
    fs::write(&pub_path, format::render_cnf(&pair.public))
        .with_context(|| format!("write {}", pub_path.display()))?;
    fs::write(&priv_path, format::render_bits(pair.private.bits()))
        .with_context(|| format!("write {}", priv_path.display()))?;
    println!(
        "wrote public key to {} and private key to {}",
        pub_path.display(),
        priv_path.display()
    );
    Ok(())
}

fn cmd_enc(
    public_key_path: &Path,
    input_path: &Path,
    output_path: &Path,
    salt: Option<u64>,
    beta: usize,
) -> Result<()> {
    let public_key = format::parse_cnf(&read_text(public_key_path)?)
        .with_context(|| format!("read public key {}", public_key_path.display()))?;
    let plaintext = format::parse_bits(&read_text(input_path)?)
        .with_context(|| format!("read plaintext {}", input_path.display()))?;

    debug!(
        "public key: n = {}, m = {}",
        public_key.vars(),
        public_key.clause_count()
    );
    let salt = salt.unwrap_or_else(|| OsRng.next_u64());
    let engine = Encryptor::new(EncryptConfig { beta });
    let stream = engine
        .encrypt_stream(&public_key, &plaintext, salt)
        .context("encryption")?;

    fs::write(output_path, format::render_cipher(&stream)?)
        .with_context(|| format!("write {}", output_path.display()))?;
    println!(
        "encrypted {} bits with salt {salt} to {}",
        plaintext.len(),
        output_path.display()
    );
    Ok(())
}

fn cmd_dec(private_key_path: &Path, cipher_path: &Path, output_path: &Path) -> Result<()> {
    let private_key = PrivateKey::new(
        format::parse_bits(&read_text(private_key_path)?)
            .with_context(|| format!("read private key {}", private_key_path.display()))?,
    );
    let stream = format::parse_cipher(&read_text(cipher_path)?)
        .with_context(|| format!("read cipher {}", cipher_path.display()))?;
    debug!("cipher stream of {} bits, beta = {}", stream.len(), stream.beta);

    let plaintext = decrypt_stream(&stream, &private_key).context("decryption")?;
    fs::write(output_path, format::render_bits(&plaintext))
        .with_context(|| format!("write {}", output_path.display()))?;
    println!(
        "decrypted {} bits to {}",
        plaintext.len(),
        output_path.display()
    );
    Ok(())
}

fn cmd_check(public_key_path: &Path, private_key_path: &Path) -> Result<()> {
    let public_key = format::parse_cnf(&read_text(public_key_path)?)
        .with_context(|| format!("read public key {}", public_key_path.display()))?;
    let private_key = PrivateKey::new(
        format::parse_bits(&read_text(private_key_path)?)
            .with_context(|| format!("read private key {}", private_key_path.display()))?,
    );

    match public_key.is_satisfied_by(&private_key) {
        Ok(true) => {
            println!("[OK] pub(priv) = 1, key pair valid");
            Ok(())
        }
        Ok(false) => bail!("invalid key pair: the private key falsifies the public key"),
        Err(error) => bail!("key pair mismatch: {error}"),
    }
}

fn cmd_verify(public_key_path: &Path, cleartext_path: &Path, cipher_path: &Path) -> Result<()> {
    let public_key = format::parse_cnf(&read_text(public_key_path)?)
        .with_context(|| format!("read public key {}", public_key_path.display()))?;
    let plaintext = format::parse_bits(&read_text(cleartext_path)?)
        .with_context(|| format!("read clear text {}", cleartext_path.display()))?;
    let stream = format::parse_cipher(&read_text(cipher_path)?)
        .with_context(|| format!("read cipher {}", cipher_path.display()))?;

    if Encryptor::verify_stream(&public_key, &plaintext, &stream).context("re-encryption")? {
        println!("[OK] encryptions match");
        Ok(())
    } else {
        bail!("mismatch: the cipher is not the honest encryption of the clear text");
    }
}

fn cmd_demo(seed: Option<u64>, vars: usize) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let params = KeyParams::for_vars(vars);
    let gen_seed = rng.next_u64();
    let mut gen = KeyGenerator::new(seeded_rng(Some(gen_seed)), params);
    let pair = gen.generate_pair().context("key generation")?;
    if !pair.is_valid() {
        bail!("demo generated an invalid key pair");
    }

    let plaintext: Vec<bool> = (0..16).map(|_| rng.gen::<bool>()).collect();
    let salt = rng.next_u64();

    let engine = Encryptor::new(EncryptConfig::default());
    let stream = engine
        .encrypt_stream(&pair.public, &plaintext, salt)
        .context("encryption")?;
    let recovered = decrypt_stream(&stream, &pair.private).context("decryption")?;

    println!(
        "demo: n = {}, m = {}, salt = {salt}",
        pair.private.len(),
        pair.public.clause_count()
    );
    println!("plaintext: {}", format::render_bits(&plaintext).lines().last().unwrap_or(""));
    println!("decrypted: {}", format::render_bits(&recovered).lines().last().unwrap_or(""));
    if recovered != plaintext {
        bail!("demo roundtrip failed");
    }
    println!("[OK] demo roundtrip succeeded");
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}
