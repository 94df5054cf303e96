//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use roster_core::config::{Config, paths};
use roster_core::identity::google;
use roster_core::session::SessionContext;
use roster_core::token_store::mask_token;

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, requires = "password", conflicts_with_all = ["google", "google_id_token"])]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "ROSTER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Sign in with Google in the browser, then paste the redirect URL
    #[arg(long, conflicts_with = "google_id_token")]
    google: bool,

    /// Exchange an existing Google ID token
    #[arg(long, value_name = "TOKEN")]
    google_id_token: Option<String>,
}

pub async fn login(config: &Config, session: &mut SessionContext, args: LoginArgs) -> Result<()> {
    match (args.email, args.password, args.google, args.google_id_token) {
        (Some(email), Some(password), false, None) => {
            session.sign_in_with_password(&email, &password).await?;
        }
        (None, _, false, Some(token)) => {
            session.sign_in_with_federated_credential(&token).await?;
        }
        (None, _, true, None) => {
            let token = google_browser_flow(config)?;
            println!("Exchanging ID token...");
            session.sign_in_with_federated_credential(&token).await?;
        }
        _ => anyhow::bail!(
            "Please specify --email and --password, --google, or --google-id-token"
        ),
    }

    print_signed_in(session);
    Ok(())
}

pub async fn register(session: &mut SessionContext, email: &str, password: &str) -> Result<()> {
    session.register_then_sign_in(email, password).await?;
    println!("✓ Account created");
    print_signed_in(session);
    Ok(())
}

pub async fn logout(session: &mut SessionContext) -> Result<()> {
    if session.current().is_none() {
        println!("Not signed in (no stored session).");
        return Ok(());
    }

    session
        .sign_out()
        .await
        .context("Sign-out failed; the local session was removed anyway")?;
    println!("✓ Signed out");
    println!("  Session removed from: {}", paths::session_path().display());
    Ok(())
}

pub fn status(session: &SessionContext) -> Result<()> {
    println!("Start screen: {}", session.resolve_initial_route().as_str());
    match session.current() {
        Some(stored) => {
            println!(
                "Signed in as: {}",
                stored.email.as_deref().unwrap_or("(unknown)")
            );
            println!("Token: {}", mask_token(&stored.token));
            println!(
                "Since: {}",
                stored.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

pub fn google_url(config: &Config) -> Result<()> {
    let request = google_request(config)?;
    println!("{}", request.url);
    open_browser(&request.url);
    Ok(())
}

fn google_request(config: &Config) -> Result<google::AuthRequest> {
    let client_id = config.identity.google_client_id.as_deref().context(
        "Google sign-in needs identity.google_client_id in config.toml",
    )?;
    Ok(google::build_auth_request(
        client_id,
        &config.identity.google_redirect_uri,
    ))
}

/// Opens the Google consent page and reads the pasted redirect from stdin.
fn google_browser_flow(config: &Config) -> Result<String> {
    let request = google_request(config)?;

    println!("To sign in with Google:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Choose your Google account");
    println!("  3. Paste the URL you were redirected to (or the ID token)");
    println!();
    println!("Authorization URL:");
    println!("  {}", request.url);
    println!();
    open_browser(&request.url);

    print!("Paste redirect URL: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let params = google::parse_redirect_input(&input);
    if let Some(error) = params.error.as_deref() {
        anyhow::bail!("Google sign-in failed: {error}");
    }
    if !params.state_matches(&request.state) {
        anyhow::bail!("State mismatch");
    }
    params
        .id_token
        .context("No ID token found in the pasted input")
}

fn open_browser(url: &str) {
    // Skipped in tests.
    if std::env::var("ROSTER_NO_BROWSER").is_err()
        && let Err(err) = open::that(url)
    {
        tracing::warn!(error = %err, "Failed to open browser");
    }
}

fn print_signed_in(session: &SessionContext) {
    let email = session.user_email().unwrap_or("(unknown)");
    let token = session.cached_token().map(mask_token).unwrap_or_default();
    println!("✓ Signed in as {email} (token: {token})");
    println!("  Session saved to: {}", paths::session_path().display());
}
