//! Tessera token operations CLI.
//!
//! Offline signing, inspection, and PAT minting against the same primitives
//! the API deployment authenticates with. No network or store access; the
//! store-side half of refresh tokens and PATs (persisting records) stays
//! with the deployment.

pub use self::error::{Error, Result};
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use tessera_auth::{Role, RowStatus, User, pat, token};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "tessera_cli", about = "Tessera token operations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign and inspect access and refresh tokens.
    #[command(subcommand)]
    Token(TokenCommand),

    /// Mint and hash personal access tokens.
    #[command(subcommand)]
    Pat(PatCommand),
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Sign an access or refresh token.
    Issue {
        /// Signing secret shared with the API deployment.
        #[arg(long, env = "TESSERA_AUTH_SECRET", hide_env_values = true)]
        secret: String,

        /// Token kind to sign.
        #[arg(long, value_enum, default_value_t = TokenKindArg::Access)]
        kind: TokenKindArg,

        /// Numeric user ID (the token subject).
        #[arg(long)]
        user_id: i64,

        /// Username claim. Required for access tokens.
        #[arg(long)]
        username: Option<String>,

        /// Role claim for access tokens.
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,

        /// Refresh token identifier. Required for refresh tokens; must match
        /// the record the deployment stores.
        #[arg(long)]
        token_id: Option<String>,
    },

    /// Verify a token and print its claims as JSON.
    Inspect {
        /// Signing secret shared with the API deployment.
        #[arg(long, env = "TESSERA_AUTH_SECRET", hide_env_values = true)]
        secret: String,

        /// Token kind to verify against.
        #[arg(long, value_enum, default_value_t = TokenKindArg::Access)]
        kind: TokenKindArg,

        /// The token to verify.
        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum PatCommand {
    /// Mint a personal access token. The secret is shown once; persist only
    /// the hash.
    New,

    /// Print the SHA-256 hash of a token, as the credential store keys it.
    Hash { token: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum TokenKindArg {
    Access,
    Refresh,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Token(cmd) => run_token(cmd),
        Commands::Pat(cmd) => run_pat(cmd),
    }
}

fn run_token(cmd: TokenCommand) -> Result<()> {
    match cmd {
        TokenCommand::Issue {
            secret,
            kind,
            user_id,
            username,
            role,
            token_id,
        } => match kind {
            TokenKindArg::Access => {
                let username = username.ok_or_else(|| {
                    Error::Custom("--username is required for access tokens".into())
                })?;
                let user = User {
                    id: user_id,
                    nickname: username.clone(),
                    username,
                    email: String::new(),
                    password_hash: String::new(),
                    role: role.into(),
                    row_status: RowStatus::Normal,
                };
                println!("{}", token::issue_access_token(&user, secret.as_bytes())?);
            }
            TokenKindArg::Refresh => {
                let token_id = token_id.ok_or_else(|| {
                    Error::Custom("--token-id is required for refresh tokens".into())
                })?;
                println!(
                    "{}",
                    token::issue_refresh_token(user_id, &token_id, secret.as_bytes())?
                );
            }
        },
        TokenCommand::Inspect {
            secret,
            kind,
            token,
        } => match kind {
            TokenKindArg::Access => {
                let claims = token::verify_access_token(&token, secret.as_bytes())?;
                println!("{}", serde_json::to_string_pretty(&claims)?);
            }
            TokenKindArg::Refresh => {
                let claims = token::verify_refresh_token(&token, secret.as_bytes())?;
                println!("{}", serde_json::to_string_pretty(&claims)?);
            }
        },
    }

    Ok(())
}

fn run_pat(cmd: PatCommand) -> Result<()> {
    match cmd {
        PatCommand::New => {
            let (token_id, plaintext) = pat::generate();
            let token_hash = pat::hash(&plaintext);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "token_id": token_id,
                    "token": plaintext,
                    "token_hash": token_hash,
                }))?
            );
        }
        PatCommand::Hash { token } => {
            println!("{}", pat::hash(&token));
        }
    }

    Ok(())
}
