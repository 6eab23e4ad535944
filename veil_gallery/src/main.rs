//! Veil Gallery - CLI
//!
//! Producer and inspection commands for encrypted galleries.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use veil_keys::{KdfConfig, PasswordPolicy};

use veil_gallery::config::ENCRYPTED_SUFFIX;
use veil_gallery::{
    candidate_ids, encrypt_directory, AssetCipher, GalleryApi, LoaderConfig, ProducerConfig,
};

#[derive(Parser)]
#[command(name = "veil-gallery")]
#[command(version = veil_gallery::VERSION)]
#[command(about = "Veil Gallery - password-encrypted image assets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt every image in a directory
    Encrypt {
        /// Directory holding plaintext images
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory receiving .enc files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Producer config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decrypt a single asset
    Decrypt {
        /// Encrypted file
        file: PathBuf,

        /// Output path (defaults to the name without .enc)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Producer or loader config (JSON); selects the key derivation
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Probe a directory or URL prefix for numbered assets
    Scan {
        /// Local directory or http(s) prefix
        source: String,

        /// Highest index to probe
        #[arg(long)]
        max: Option<usize>,

        /// Extensions to probe (repeatable)
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Fetches in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Write recovered images here
        #[arg(long)]
        out: Option<PathBuf>,

        /// Loader config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the password hash for cross-checking
    Fingerprint {
        /// Producer or loader config (JSON); selects the key derivation
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Encrypt {
            input,
            output,
            config,
        } => {
            let mut config = match config {
                Some(path) => ProducerConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ProducerConfig::default(),
            };
            if let Some(input) = input {
                config.input_dir = input;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }

            let password = prompt_password()?;
            PasswordPolicy::default().enforce(password.expose_secret())?;

            let cipher = AssetCipher::with_kdf(&password, &config.kdf)?;
            println!("Password hash: {}", cipher.fingerprint());
            println!("Make sure this matches the hash configured on the viewing side.");

            let bar = ProgressBar::new(0);
            bar.set_style(ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} {msg}",
            )?);
            let on_file = |done: usize, total: usize, file: &str| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
                bar.set_message(file.to_string());
            };

            let report = encrypt_directory(&config, &cipher, Some(&on_file))?;
            bar.finish_and_clear();

            println!(
                "Encrypted {}/{} images into {}",
                report.succeeded,
                report.total,
                config.output_dir.display()
            );
            for failure in &report.failures {
                println!("  failed: {} ({})", failure.file, failure.reason);
            }
        }

        Commands::Decrypt { file, out, config } => {
            let out = match out {
                Some(out) => out,
                None => default_decrypted_path(&file)?,
            };
            let kdf = load_kdf(config.as_deref())?;

            let password = prompt_password()?;
            let cipher = AssetCipher::with_kdf(&password, &kdf)?;
            let plaintext = cipher.decrypt_file(&file)?;
            std::fs::write(&out, &plaintext)
                .with_context(|| format!("writing {}", out.display()))?;

            println!("Decrypted {} bytes to {}", plaintext.len(), out.display());
        }

        Commands::Scan {
            source,
            max,
            extensions,
            concurrency,
            out,
            config,
        } => {
            let mut config = match config {
                Some(path) => LoaderConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => LoaderConfig::default(),
            };
            config.image_dir = source;
            if let Some(max) = max {
                config.max_count = max;
            }
            if !extensions.is_empty() {
                config.extensions = extensions;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }

            let password = prompt_password()?;
            let api = GalleryApi::new(&password, config.clone())?;

            let bar = ProgressBar::new(config.candidate_count() as u64);
            let on_candidate = |done: usize, _total: usize, _id: &str| {
                bar.set_position(done as u64);
            };
            let outcomes = api.scan(Some(&on_candidate)).await?;
            bar.finish_and_clear();

            let ids = candidate_ids(&config.image_dir, &config.extensions, config.max_count);
            if let Some(dir) = &out {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }

            let mut found = 0;
            for (id, outcome) in ids.iter().zip(&outcomes) {
                let Some(image) = outcome.as_found() else {
                    continue;
                };
                found += 1;
                println!("  {} ({} bytes)", id, image.len());

                if let Some(dir) = &out {
                    let path = dir.join(recovered_name(id));
                    std::fs::write(&path, image)
                        .with_context(|| format!("writing {}", path.display()))?;
                }
            }

            println!("Recovered {} of {} candidates", found, outcomes.len());
        }

        Commands::Fingerprint { config } => {
            let kdf = load_kdf(config.as_deref())?;
            let password = prompt_password()?;
            let cipher = AssetCipher::with_kdf(&password, &kdf)?;
            println!("{}", cipher.fingerprint());
        }
    }

    Ok(())
}

fn prompt_password() -> anyhow::Result<SecretString> {
    let password = rpassword::prompt_password("Password: ").context("reading password")?;
    Ok(SecretString::from(password))
}

/// Key derivation named by a producer or loader config, SHA-256 without one.
///
/// Both config files carry `kdf` and default every other field, so either
/// parses as a `LoaderConfig`.
fn load_kdf(path: Option<&Path>) -> anyhow::Result<KdfConfig> {
    match path {
        Some(path) => Ok(LoaderConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?
            .kdf),
        None => Ok(KdfConfig::default()),
    }
}

fn default_decrypted_path(file: &Path) -> anyhow::Result<PathBuf> {
    let name = file.to_string_lossy();
    match name.strip_suffix(ENCRYPTED_SUFFIX) {
        Some(stem) if !stem.is_empty() => Ok(PathBuf::from(stem)),
        _ => bail!("{} has no {} suffix; pass --out", file.display(), ENCRYPTED_SUFFIX),
    }
}

/// `https://cdn/img/3.jpg.enc` → `3.jpg`
fn recovered_name(id: &str) -> String {
    let file = id.rsplit('/').next().unwrap_or(id);
    file.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(file).to_string()
}
