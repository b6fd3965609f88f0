use latchkey::application_impl::*;
use latchkey::application_port::*;
use latchkey::domain_model::*;
use latchkey::logger::*;
use latchkey::server::*;
use latchkey::settings::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let result = run(&project_settings, cli.command).await;
    if let Err(e) = &result {
        error!("command failed: {}", e);
    }
    result
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Issue { subject } => {
            let server = Server::try_new(settings).await?;
            let tokens = server
                .token_service
                .generate_auth_tokens(&Subject::new(subject))
                .await;
            server.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&tokens?)?);
        }
        Command::Verify { token, token_type } => {
            let server = Server::try_new(settings).await?;
            let record = server
                .token_service
                .verify_token(&token, &TokenType::new(token_type))
                .await;
            server.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&record?)?);
        }
        Command::Decode { token } => {
            // signature and expiry only, no store
            let signer = JwtSigner::new(Arc::new(SystemClock));
            let payload = signer.verify(&token, &settings.jwt.secret)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
