use super::GlobalArgs;
use crate::api::{ApiClient, WafApi};
use anyhow::{bail, Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username, defaults to api.username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password, defaults to api.password / WAF_CONSOLE_PASSWORD
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {}

/// Check that the credentials are accepted.
pub async fn login(global: &GlobalArgs, args: LoginArgs) -> Result<()> {
    let config = global.load_config()?;
    let username = args.username.or_else(|| config.api.username.clone());
    let password = args.password.or_else(|| config.api.password.clone());
    let (Some(username), Some(password)) = (username, password) else {
        bail!("Username and password are required (flags, config file or WAF_CONSOLE_USER/WAF_CONSOLE_PASSWORD)");
    };

    let client = ApiClient::from_config(&config.api)?;
    client
        .login(&username, &password)
        .await
        .with_context(|| format!("Login as '{}' failed", username))?;

    println!("[OK] Signed in to {} as {}", client.base_url(), username);
    Ok(())
}

/// Sign in with the configured credentials and end the server-side session.
pub async fn logout(global: &GlobalArgs, _args: LogoutArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = super::connect(&config).await?;
    super::require(client.logout().await?)?;
    println!("[OK] Signed out of {}", client.base_url());
    Ok(())
}
