//! certpolicy command-line client
//!
//! ```text
//! certpolicy verify --trust-store FILE [--intermediates FILE] [--at RFC3339] CERT_PEM
//! certpolicy inspect CERT_PEM
//! ```
//!
//! `verify` prints `CERT_OK` or the rejection code and exits 0 or 1.
//! Set `RUST_LOG=certpolicy_verify=debug` to trace chain building.

use certpolicy_crypto::{Certificate, SignatureAlgorithm};
use certpolicy_trust_root::TrustStoreConfig;
use certpolicy_verify::{ErrorKind, ValidationResult, Validator};
use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

use std::env;
use std::fs;
use std::process;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);

    let Some(command) = args.get(1) else {
        print_usage(program);
        process::exit(1);
    };
    let result = match command.as_str() {
        "verify" => parse_verify_args(&args[2..]).and_then(|args| run_verify(&args)),
        "inspect" => inspect(&args[2..]).map(|()| ValidationResult::Ok),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage(program);
            process::exit(1);
        }
    };

    match result {
        Ok(verdict) => {
            if command == "verify" {
                println!("{}", verdict.code());
            }
            process::exit(if verdict.is_ok() { 0 } else { 1 });
        }
        Err(e) => {
            eprintln!("Operation failed:\n{}", e);
            process::exit(1);
        }
    }
}

/// argv[0], which the OS is free to leave out
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("certpolicy")
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!(
        "  {} verify --trust-store FILE [--intermediates FILE] [--at RFC3339] CERT_PEM",
        program
    );
    eprintln!("  {} inspect CERT_PEM", program);
}

#[derive(Debug, PartialEq)]
struct VerifyArgs {
    trust_store: String,
    intermediates: Option<String>,
    at: Option<DateTime<Utc>>,
    certificate: String,
}

fn parse_verify_args(args: &[String]) -> CliResult<VerifyArgs> {
    let mut trust_store: Option<String> = None;
    let mut intermediates: Option<String> = None;
    let mut at: Option<DateTime<Utc>> = None;
    let mut certificate: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--trust-store" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --trust-store".into());
                }
                trust_store = Some(args[i].clone());
            }
            "--intermediates" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --intermediates".into());
                }
                intermediates = Some(args[i].clone());
            }
            "--at" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --at".into());
                }
                let time = DateTime::parse_from_rfc3339(&args[i])
                    .map_err(|e| format!("Invalid --at time {:?}: {}", args[i], e))?;
                at = Some(time.with_timezone(&Utc));
            }
            arg if !arg.starts_with("--") => {
                certificate = Some(arg.to_string());
            }
            unknown => {
                return Err(format!("Unknown option: {}", unknown).into());
            }
        }
        i += 1;
    }

    Ok(VerifyArgs {
        trust_store: trust_store.ok_or("Missing required --trust-store")?,
        intermediates,
        at,
        certificate: certificate.ok_or("Missing certificate path")?,
    })
}

fn run_verify(args: &VerifyArgs) -> CliResult<ValidationResult> {
    let config = TrustStoreConfig::from_file(&args.trust_store)?;
    let validator = Validator::from_config(&config)?;
    tracing::debug!(
        "Loaded {} anchors from {}",
        validator.store().len(),
        args.trust_store
    );

    // The certificate file may carry the leaf followed by its intermediates
    let mut certs = match Certificate::all_from_pem(&fs::read_to_string(&args.certificate)?) {
        Ok(certs) => certs,
        Err(e) => {
            eprintln!("Failed to parse {}: {}", args.certificate, e);
            return Ok(ValidationResult::Rejected(ErrorKind::MalformedCertificate));
        }
    };
    if let Some(path) = &args.intermediates {
        match Certificate::all_from_pem(&fs::read_to_string(path)?) {
            Ok(extra) => certs.extend(extra),
            Err(e) => {
                eprintln!("Failed to parse {}: {}", path, e);
                return Ok(ValidationResult::Rejected(ErrorKind::MalformedCertificate));
            }
        }
    }

    let (leaf, intermediates) = certs
        .split_first()
        .ok_or("Certificate file contains no certificates")?;

    Ok(match args.at {
        Some(time) => validator.validate(leaf, intermediates, time),
        None => validator.validate_now(leaf, intermediates),
    })
}

fn inspect(args: &[String]) -> CliResult<()> {
    let path = match args {
        [path] => path,
        _ => return Err("inspect takes exactly one certificate path".into()),
    };

    for (index, cert) in Certificate::all_from_pem(&fs::read_to_string(path)?)?
        .iter()
        .enumerate()
    {
        if index > 0 {
            println!();
        }
        print!("{}", describe(cert));
    }
    Ok(())
}

fn describe(cert: &Certificate) -> String {
    let algorithm = SignatureAlgorithm::from_oid(cert.signature_algorithm())
        .map(|alg| alg.name().to_string())
        .unwrap_or_else(|_| cert.signature_algorithm().to_string());
    let key_id = |id: Option<&[u8]>| id.map(hex::encode).unwrap_or_else(|| "-".to_string());

    format!(
        "Subject:         {}\n\
         Issuer:          {}\n\
         Serial:          {}\n\
         Not before:      {}\n\
         Not after:       {}\n\
         CA:              {}\n\
         Self-issued:     {}\n\
         Key type:        {:?}\n\
         Signature:       {}\n\
         Subject key ID:  {}\n\
         Authority key ID: {}\n\
         SHA-256:         {}\n\
         Identifier:      {}\n",
        cert.subject(),
        cert.issuer(),
        cert.serial_hex(),
        cert.not_before().to_rfc3339(),
        cert.not_after().to_rfc3339(),
        cert.is_ca(),
        cert.is_self_issued(),
        cert.public_key().key_type,
        algorithm,
        key_id(cert.subject_key_id()),
        key_id(cert.authority_key_id()),
        cert.fingerprint(),
        cert.id(),
    )
}
