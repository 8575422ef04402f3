//! Mock account commands.
//!
//! Any non-blank email and any password are accepted.

use clap::Subcommand;
use secrecy::SecretString;

use super::{CommandError, State};
use crate::output;

#[derive(Debug, Subcommand)]
pub enum AccountAction {
    /// Show the signed-in user
    Whoami,
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the cart
    Logout,
}

pub async fn run(state: &State, action: AccountAction) -> Result<(), CommandError> {
    let auth = state.auth();
    match action {
        AccountAction::Whoami => {}
        AccountAction::Login { email, password } => {
            auth.login(&email, &SecretString::from(password)).await?;
        }
        AccountAction::Register {
            name,
            email,
            password,
        } => {
            auth.register(&name, &email, &SecretString::from(password))
                .await?;
        }
        AccountAction::Logout => state.logout().await,
    }

    output::user(auth.current_user().as_ref());
    Ok(())
}
