use clap::Args;
use nudger_core::Gateway;

use super::context::Context;

#[derive(Args)]
pub struct RegisterArgs {
    /// Push token to register; defaults to the configured one
    token: Option<String>,
    /// Also store the token as `identity.token`
    #[arg(long)]
    save: bool,
}

pub fn run(args: RegisterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let token = match args.token {
        Some(token) => token,
        None => ctx.require_token()?.to_string(),
    };

    ctx.runtime.block_on(ctx.gateway.register_identity(&token))?;
    println!("Token registered");

    if args.save {
        let mut config = nudger_core::ClientConfig::load()?;
        config.set("identity.token", &token)?;
        config.save()?;
        println!("Token saved to config");
    }
    Ok(())
}
