//! qrseal CLI tool
//!
//! Seal text or files with a shared secret and verify sealed codes.
//! Codes are printed as armored text (`QRSEAL:H:<base64>`) which any QR
//! renderer can turn into an image.

use clap::{Parser, Subcommand};
use qrseal::{
    payload::SignedPayload,
    transport::{self, ArmoredCodec},
    DiskFile, Secret, SignMode, SigningSession, VerificationOutcome, Verifier,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// qrseal: shared-secret seals for text and files, carried in scannable codes
///
/// Seals are SHA-256(content || secret). Anyone holding the secret can both
/// verify and create seals; this is not a public-key signature.
#[derive(Parser)]
#[command(name = "qrseal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to secret file (default: ~/.qrseal/secret)
    #[arg(short = 'k', long, global = true)]
    secret_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new random secret
    Keygen {
        /// Save the secret to the secret file
        #[arg(short, long)]
        save: bool,

        /// Overwrite an existing secret file
        #[arg(short, long)]
        force: bool,
    },

    /// Seal a piece of text
    SignText {
        /// Text to seal
        text: String,

        /// Secret to seal with (default: read from the secret file)
        #[arg(short, long)]
        secret: Option<String>,

        /// Write the code to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Seal a file by its content hash
    SignFile {
        /// File to seal
        path: PathBuf,

        /// Secret to seal with (default: read from the secret file)
        #[arg(short, long)]
        secret: Option<String>,

        /// Write the code to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a code carries
    Inspect {
        /// Armored code, or a path to a file containing one
        code: String,
    },

    /// Verify a code
    Verify {
        /// Armored code, or a path to a file containing one
        code: String,

        /// Secret shared by the signer (default: read from the secret file)
        #[arg(short, long)]
        secret: Option<String>,

        /// The original file, required for file seals
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run a demo of sealing and verification
    Demo,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qrseal=warn".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let secret_path = cli.secret_file.unwrap_or_else(default_secret_path);

    match cli.command {
        Commands::Keygen { save, force } => cmd_keygen(&secret_path, save, force),
        Commands::SignText {
            text,
            secret,
            output,
        } => cmd_sign_text(&secret_path, text, secret, output.as_deref()).await,
        Commands::SignFile {
            path,
            secret,
            output,
        } => cmd_sign_file(&secret_path, &path, secret, output.as_deref()).await,
        Commands::Inspect { code } => cmd_inspect(&code).await,
        Commands::Verify { code, secret, file } => {
            cmd_verify(&secret_path, &code, secret, file).await
        }
        Commands::Demo => cmd_demo().await,
    }
}

fn default_secret_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qrseal")
        .join("secret")
}

fn fail(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("Error: {}", message);
    ExitCode::from(2)
}

fn resolve_secret(path: &Path, given: Option<String>) -> Result<String, String> {
    if let Some(secret) = given {
        return Ok(secret);
    }
    let stored = fs::read_to_string(path).map_err(|_| {
        format!(
            "No secret given and none found at {:?}. Pass --secret or run 'qrseal keygen --save'.",
            path
        )
    })?;
    // Only the trailing newline written by `keygen --save` is stripped
    Ok(stored
        .strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(stored.as_str())
        .to_string())
}

/// A path to an existing file is read; anything else is taken as the code
fn read_code(code: &str) -> Result<String, String> {
    let path = Path::new(code);
    if !path.is_file() {
        return Ok(code.to_string());
    }
    let contents =
        fs::read_to_string(path).map_err(|e| format!("reading code from {:?}: {}", path, e))?;
    debug!(path = %path.display(), "read code from file");
    Ok(contents)
}

fn emit_code(code: &str, output: Option<&Path>) -> ExitCode {
    match output {
        Some(path) => match fs::write(path, format!("{}\n", code)) {
            Ok(()) => {
                println!("Code written to: {:?}", path);
                ExitCode::SUCCESS
            }
            Err(e) => fail(format!("writing {:?}: {}", path, e)),
        },
        None => {
            println!("{}", code);
            ExitCode::SUCCESS
        }
    }
}

fn cmd_keygen(path: &Path, save: bool, force: bool) -> ExitCode {
    let secret = Secret::generate();

    if !save {
        println!("{}", secret.expose());
        return ExitCode::SUCCESS;
    }

    if path.exists() && !force {
        eprintln!("Secret already exists at {:?}", path);
        eprintln!("Use --force to overwrite.");
        return ExitCode::from(2);
    }
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            return fail(format!("creating directory: {}", e));
        }
    }
    if let Err(e) = fs::write(path, format!("{}\n", secret.expose())) {
        return fail(format!("saving secret: {}", e));
    }

    println!("Secret created and saved to: {:?}", path);
    println!();
    println!("Share it with verifiers over a separate channel.");
    println!("It is never stored inside a code.");
    ExitCode::SUCCESS
}

async fn cmd_sign_text(
    secret_path: &Path,
    text: String,
    secret: Option<String>,
    output: Option<&Path>,
) -> ExitCode {
    let secret = match resolve_secret(secret_path, secret) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut session = SigningSession::with_secret(secret);
    session.set_text(text);

    let codec = ArmoredCodec::new();
    match session.render(&codec).await {
        Ok(image) => emit_code(&ArmoredCodec::image_to_string(image), output),
        Err(e) => fail(e),
    }
}

async fn cmd_sign_file(
    secret_path: &Path,
    path: &Path,
    secret: Option<String>,
    output: Option<&Path>,
) -> ExitCode {
    let secret = match resolve_secret(secret_path, secret) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut session = SigningSession::with_secret(secret);
    session.set_mode(SignMode::File);
    if let Err(e) = session.select_file(&DiskFile::new(path)).await {
        return fail(e);
    }
    if let Some(hash) = session.file_hash() {
        eprintln!("Hash: {}", hash);
    }

    let codec = ArmoredCodec::new();
    match session.render(&codec).await {
        Ok(image) => emit_code(&ArmoredCodec::image_to_string(image), output),
        Err(e) => fail(e),
    }
}

fn print_payload(payload: &SignedPayload) {
    println!("Type: {}", payload.kind());
    match payload {
        SignedPayload::Text { data, .. } => println!("Data: {}", data),
        SignedPayload::File { name, hash, .. } => {
            println!("File name: {}", name);
            println!("Hash: {}", hash);
        }
    }
    println!("Signature: {}", payload.signature());
}

async fn cmd_inspect(code: &str) -> ExitCode {
    let code = match read_code(code) {
        Ok(code) => code,
        Err(e) => return fail(e),
    };
    let codec = ArmoredCodec::new();
    let image = ArmoredCodec::image_from_str(&code);

    match transport::decode_payload(&codec, &image).await {
        Ok(payload) => {
            print_payload(&payload);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

async fn cmd_verify(
    secret_path: &Path,
    code: &str,
    secret: Option<String>,
    file: Option<PathBuf>,
) -> ExitCode {
    let code = match read_code(code) {
        Ok(code) => code,
        Err(e) => return fail(e),
    };
    let codec = ArmoredCodec::new();
    let image = ArmoredCodec::image_from_str(&code);

    let mut verifier = Verifier::new();
    match verifier.load_image(&codec, &image).await {
        Ok(payload) => print_payload(payload),
        Err(e) => return fail(e),
    }

    if let Some(path) = file {
        if let Err(e) = verifier.supply_file(DiskFile::new(path)) {
            return fail(e);
        }
    }

    let secret = match resolve_secret(secret_path, secret) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    println!();
    match verifier.verify(&secret).await {
        Ok(outcome) => report_outcome(&outcome),
        Err(e) => fail(e),
    }
}

fn report_outcome(outcome: &VerificationOutcome) -> ExitCode {
    match outcome {
        VerificationOutcome::Accepted => {
            println!("VERIFICATION RESULT: VALID");
            println!("The seal matches and the content is unchanged.");
            ExitCode::SUCCESS
        }
        VerificationOutcome::RejectedSignatureMismatch => {
            println!("VERIFICATION RESULT: INVALID - seal does not match (the secret may be wrong)");
            ExitCode::from(1)
        }
        VerificationOutcome::RejectedContentMismatch => {
            println!("VERIFICATION RESULT: INVALID - file content was modified (hash mismatch)");
            ExitCode::from(1)
        }
        VerificationOutcome::RejectedFileNameMismatch => {
            println!("VERIFICATION RESULT: INVALID - file name does not match the sealed name");
            ExitCode::from(1)
        }
        VerificationOutcome::Error(reason) => fail(reason),
        VerificationOutcome::Pending => fail("verification did not run"),
    }
}

async fn cmd_demo() -> ExitCode {
    println!("=== qrseal Demo ===");
    println!();

    // Step 1: Signer seals some text
    println!("--- Step 1: Sealing ---");
    let mut session = SigningSession::new();
    session.set_text("Invoice #42: 1000 USD, due 2026-12-01");
    let secret = session.secret().to_string();
    println!("Secret (share out-of-band): {}", secret);

    let codec = ArmoredCodec::new();
    let code = match session.render(&codec).await {
        Ok(image) => ArmoredCodec::image_to_string(image),
        Err(e) => return fail(e),
    };
    println!("Code: {}", code);
    println!();

    // Step 2: Verifier scans the code
    println!("--- Step 2: Scanning ---");
    let mut verifier = Verifier::new();
    match verifier
        .load_image(&codec, &ArmoredCodec::image_from_str(&code))
        .await
    {
        Ok(payload) => print_payload(payload),
        Err(e) => return fail(e),
    }
    println!();

    // Step 3: Verification with the right and a wrong secret
    println!("--- Step 3: Verification ---");
    for attempt in [secret.as_str(), "privkey_guess"] {
        match verifier.verify(attempt).await {
            Ok(outcome) => println!("  secret {:<32} -> {:?}", attempt, outcome),
            Err(e) => return fail(e),
        }
        if let Err(e) = verifier.retry() {
            return fail(e);
        }
    }

    println!();
    println!("=== Demo Complete ===");
    ExitCode::SUCCESS
}
