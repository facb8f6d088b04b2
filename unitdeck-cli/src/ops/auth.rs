//! Sign-in and sign-out commands.

use dialoguer::{theme::ColorfulTheme, Password};
use unitdeck_core::ApiClient;

use super::ui::{print_hint, print_success};

/// Log in and persist the session token. Prompts for the password when it
/// was not supplied as an argument.
pub async fn login(
    client: &ApiClient,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Password for {username}"))
            .interact()?,
    };

    unitdeck_core::login(client, username, &password).await?;

    print_success(&format!("Signed in as {username}."));
    print_hint("Use 'list' to fetch the service inventory");
    Ok(())
}

/// Drop the stored session from both credential surfaces.
pub fn logout(client: &ApiClient) -> anyhow::Result<()> {
    unitdeck_core::logout(client)?;
    print_success("Signed out.");
    Ok(())
}
