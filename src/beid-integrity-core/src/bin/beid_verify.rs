//! beid-verify CLI - integrity checks for files read from a Belgian eID card.
//!
//! Reads the raw identity, address, photo and signature files together with
//! the RRN certificate, runs the integrity engine and prints the verified
//! record. Exits with status 2 when tampering is detected.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use beid_integrity_core::{
    Address, Certificate, DigestAlgorithm, Identity, IntegrityConfig, IntegrityEngine,
    IntegrityError,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// beid-verify - integrity checks for Belgian eID card files.
///
/// Verifies the RRN signatures over the identity and address files and the
/// photo digest embedded in the identity file.
#[derive(Parser)]
#[command(name = "beid-verify")]
#[command(version = VERSION)]
#[command(about = "Integrity checks for Belgian eID card files")]
#[command(long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Digest for data signatures instead of the certificate's (sha1, sha256, ...)
    #[arg(long, global = true)]
    digest: Option<DigestAlgorithm>,

    /// Verify the address file as is, without stripping trailing zero padding
    #[arg(long, global = true)]
    keep_address_padding: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the identity file, and the photo if given
    Identity {
        /// Identity file (TLV)
        #[arg(long)]
        identity: PathBuf,

        /// Identity signature file
        #[arg(long)]
        signature: PathBuf,

        /// Photo file (JPEG)
        #[arg(long)]
        photo: Option<PathBuf>,

        /// RRN certificate (DER)
        #[arg(long)]
        cert: PathBuf,
    },

    /// Verify the address file against the identity signature
    Address {
        /// Address file (TLV)
        #[arg(long)]
        address: PathBuf,

        /// Identity signature file
        #[arg(long)]
        identity_signature: PathBuf,

        /// Address signature file
        #[arg(long)]
        signature: PathBuf,

        /// RRN certificate (DER)
        #[arg(long)]
        cert: PathBuf,
    },

    /// Show what the RRN certificate declares
    Certificate {
        /// RRN certificate (DER)
        #[arg(long)]
        cert: PathBuf,
    },
}

/// Reasons the CLI stops.
#[derive(Debug)]
enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Integrity(IntegrityError),
}

impl From<IntegrityError> for CliError {
    fn from(err: IntegrityError) -> Self {
        Self::Integrity(err)
    }
}

#[derive(Serialize)]
struct CertificateInfo {
    subject: String,
    issuer: String,
    serial: String,
    key: String,
    signature_scheme: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl From<&Certificate> for CertificateInfo {
    fn from(cert: &Certificate) -> Self {
        Self {
            subject: cert.subject(),
            issuer: cert.issuer(),
            serial: cert.serial_hex(),
            key: cert.public_key().description(),
            signature_scheme: cert.signature_scheme().jca_name(),
            not_before: DateTime::<Utc>::from(cert.not_before()),
            not_after: DateTime::<Utc>::from(cert.not_after()),
        }
    }
}

#[derive(Serialize)]
struct Failure {
    verified: bool,
    tampered: bool,
    state: Option<String>,
    kind: String,
    error: String,
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("JSON encoding failed: {e}"),
    }
}

fn opt_date(date: Option<chrono::NaiveDate>, raw: &str) -> String {
    date.map_or_else(|| raw.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn print_identity(identity: &Identity, photo_checked: bool) {
    println!("\nVERIFIED IDENTITY");
    println!("=================\n");
    println!("  Card number:      {}", identity.card_number());
    println!("  Chip number:      {}", identity.chip_number());
    println!(
        "  Valid:            {} .. {}",
        opt_date(identity.card_validity_begin(), ""),
        opt_date(identity.card_validity_end(), "")
    );
    println!("  Delivered by:     {}", identity.card_delivery_municipality());
    println!("  National number:  {}", identity.national_number());
    println!("  Name:             {}", identity.name());
    println!("  First name:       {}", identity.first_name());
    if !identity.middle_name().is_empty() {
        println!("  Middle name:      {}", identity.middle_name());
    }
    println!("  Nationality:      {}", identity.nationality());
    println!("  Place of birth:   {}", identity.place_of_birth());
    println!(
        "  Date of birth:    {}",
        opt_date(identity.date_of_birth(), identity.date_of_birth_text())
    );
    println!("  Gender:           {:?}", identity.gender());
    println!("  Document type:    {:?}", identity.document_type());
    println!("  Special status:   {:?}", identity.special_status());
    if photo_checked {
        println!("  Photo:            \x1b[32mdigest OK\x1b[0m");
    }
    println!();
}

fn print_address(address: &Address) {
    println!("\nVERIFIED ADDRESS");
    println!("================\n");
    println!("  Street:           {}", address.street_and_number());
    println!("  Zip:              {}", address.zip());
    println!("  Municipality:     {}", address.municipality());
    println!();
}

fn print_certificate(info: &CertificateInfo) {
    println!("\nRRN CERTIFICATE");
    println!("===============\n");
    println!("  Subject:          {}", info.subject);
    println!("  Issuer:           {}", info.issuer);
    println!("  Serial:           {}", info.serial);
    println!("  Key:              {}", info.key);
    println!("  Signature scheme: {}", info.signature_scheme);
    println!("  Not before:       {}", info.not_before.to_rfc3339());
    println!("  Not after:        {}", info.not_after.to_rfc3339());
    println!();
}

fn run(cli: &Cli, engine: &IntegrityEngine) -> Result<(), CliError> {
    let json = cli.format == OutputFormat::Json;

    match &cli.command {
        Commands::Identity {
            identity,
            signature,
            photo,
            cert,
        } => {
            let certificate = engine.load_certificate(&read(cert)?)?;
            let identity_file = read(identity)?;
            let signature = read(signature)?;

            let verified = match photo {
                Some(photo) => engine.verified_identity_with_photo(
                    &identity_file,
                    &signature,
                    &read(photo)?,
                    &certificate,
                )?,
                None => engine.verified_identity(&identity_file, &signature, &certificate)?,
            };

            if json {
                print_json(&verified);
            } else {
                print_identity(&verified, photo.is_some());
            }
        },
        Commands::Address {
            address,
            identity_signature,
            signature,
            cert,
        } => {
            let certificate = engine.load_certificate(&read(cert)?)?;
            let verified = engine.verified_address(
                &read(address)?,
                &read(identity_signature)?,
                &read(signature)?,
                &certificate,
            )?;

            if json {
                print_json(&verified);
            } else {
                print_address(&verified);
            }
        },
        Commands::Certificate { cert } => {
            let certificate = engine.load_certificate(&read(cert)?)?;
            let info = CertificateInfo::from(&certificate);

            if json {
                print_json(&info);
            } else {
                print_certificate(&info);
            }
        },
    }

    Ok(())
}

fn report(err: &CliError, json: bool) -> ExitCode {
    match err {
        CliError::Io { path, source } => {
            eprintln!("error: cannot read {}: {}", path.display(), source);
            ExitCode::FAILURE
        },
        CliError::Integrity(err) => {
            if json {
                print_json(&Failure {
                    verified: false,
                    tampered: err.is_tamper(),
                    state: err.tamper_state().map(|s| s.to_string()),
                    kind: format!("{:?}", err.kind()),
                    error: err.root_cause().to_string(),
                });
            } else if err.is_tamper() {
                println!("\x1b[31mTAMPERED\x1b[0m: {}", err);
            } else {
                eprintln!("error: {}", err);
            }

            if err.is_tamper() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_output = cli.format == OutputFormat::Json;

    // Initialize logging (suppress for JSON output)
    if json_output {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let engine = IntegrityEngine::with_config(IntegrityConfig {
        digest_override: cli.digest,
        strip_address_padding: !cli.keep_address_padding,
        ..IntegrityConfig::default()
    });

    match run(&cli, &engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, json_output),
    }
}
