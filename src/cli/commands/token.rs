use clap::Args;
use serde_json::json;

use crate::auth::{generate_token, Claims};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id placed in the `sub` claim")]
    pub user_id: i64,

    #[arg(long, default_value = "", help = "Username claim")]
    pub username: String,

    #[arg(long, default_value_t = 24, help = "Lifetime in hours")]
    pub ttl_hours: i64,
}

pub fn handle(args: TokenArgs, config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if args.user_id <= 0 {
        anyhow::bail!("--user-id must be positive");
    }

    let claims = Claims::new(args.user_id, args.username, args.ttl_hours);
    let token = generate_token(&claims, &config.security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user_id": claims.sub, "expires_at": claims.exp })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
