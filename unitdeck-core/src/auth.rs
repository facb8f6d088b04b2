//! Login against the credential endpoint.

use serde_json::Value;
use tracing::instrument;

use crate::client::{extract_message, ApiClient};
use crate::error::{ClientError, Result};
use crate::models::LoginRequest;

/// Exchange username/password for a bearer token and store it on both
/// credential surfaces. Post-login navigation is the session guard's
/// business, not ours.
///
/// A non-OK response is an invalid-credentials failure (server message
/// when one can be extracted). An OK response without an `access_token`
/// is a contract violation, reported distinctly.
#[instrument(skip_all, fields(%username))]
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<()> {
    let (status, body) = client
        .post_public(
            "login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await?;

    if !status.is_success() {
        return Err(ClientError::Application {
            status: status.as_u16(),
            message: extract_message(&body).unwrap_or_else(|| "invalid credentials".to_string()),
        });
    }

    let value: Value = serde_json::from_slice(&body).map_err(|err| {
        ClientError::Format(format!("login response is not valid JSON: {err}"))
    })?;
    let token = value
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ClientError::Format("login response is missing access_token".into()))?;

    client.store().set(token)?;
    Ok(())
}

/// Drop the session on the user's request. Clears both surfaces; the
/// caller handles navigation.
pub fn logout(client: &ApiClient) -> Result<()> {
    client.store().clear()
}
