//! Interactive login flow (phone -> code -> optional 2FA password).
//!
//! Out of the export core; runs once at startup before any job. Uses the
//! same client clone as the gateway so the session file is shared.

use crate::domain::DomainError;
use grammers_client::{Client, SignInError};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;

/// Ensure the client is authorized, prompting for credentials when it isn't.
pub async fn ensure_authenticated(client: &Client, api_hash: &str) -> Result<(), DomainError> {
    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| DomainError::Auth(e.to_string()))?;
    if authorized {
        info!("session already authorized");
        return Ok(());
    }

    let phone = Text::new("Phone number (international format):")
        .prompt()
        .map_err(|e| DomainError::Auth(e.to_string()))?;
    let token = client
        .request_login_code(&phone, api_hash)
        .await
        .map_err(|e| DomainError::Auth(format!("request_login_code: {}", e)))?;

    let code = Text::new("Login code:")
        .prompt()
        .map_err(|e| DomainError::Auth(e.to_string()))?;

    match client.sign_in(&token, &code).await {
        Ok(_user) => {}
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token.hint().map(String::from).unwrap_or_default();
            let prompt = if hint.is_empty() {
                "2FA password:".to_string()
            } else {
                format!("2FA password (hint: {}):", hint)
            };
            let password = Password::new(&prompt)
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()
                .map_err(|e| DomainError::Auth(e.to_string()))?;
            client
                .check_password(password_token, password.as_bytes())
                .await
                .map_err(|e| DomainError::Auth(format!("check_password: {}", e)))?;
        }
        Err(SignInError::InvalidCode) => {
            return Err(DomainError::Auth(
                "Invalid login code. Run again and enter the correct code.".into(),
            ));
        }
        Err(SignInError::SignUpRequired) => {
            return Err(DomainError::Auth(
                "Sign-up required. Create an account with the official Telegram app first.".into(),
            ));
        }
        Err(e) => return Err(DomainError::Auth(format!("sign in: {}", e))),
    }

    info!("authorized");
    Ok(())
}
