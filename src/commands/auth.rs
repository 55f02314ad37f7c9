//! `auth`: the OAuth 2.0 authorization code flow.

use std::io::{BufRead, Write};

use tracing::info;

use super::common::ContextOptions;
use crate::{error::AuthError, Result};

/// Authorize with `code`, or print the authorization URL and read the code
/// from stdin.
pub async fn handle_auth(options: &ContextOptions, code: Option<String>) -> Result<()> {
    let session = options.session()?;

    let code = match code {
        Some(code) => code,
        None => {
            let url = session.authorization_url()?;
            println!("Open this URL in your browser and approve access:\n");
            println!("  {url}\n");
            print!("Paste the authorization code: ");
            std::io::stdout().flush()?;
            read_code(std::io::stdin().lock())?
        }
    };

    let token = session.authorize(&code).await?;
    info!("Token expires at {}", token.expires_at);
    println!(
        "✓ Authorized. Token saved to {}",
        session.token_path().display()
    );
    Ok(())
}

/// First line of `reader`, trimmed.
pub fn read_code<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let code = line.trim();
    if code.is_empty() {
        return Err(AuthError::MissingCode.into());
    }
    Ok(code.to_string())
}
