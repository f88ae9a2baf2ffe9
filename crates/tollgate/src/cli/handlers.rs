//! Command handlers.

use super::commands::{Commands, OutputFormat};
use std::path::Path;
use tollgate::{ChatMessage, Credentials, Gateway, GatewayConfig};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load configuration from `path` if given, otherwise from the layered
/// sources.
pub fn load_config(path: Option<&Path>) -> tollgate::TollgateResult<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path),
        None => GatewayConfig::load(),
    }
}

/// Dispatch one command.
pub async fn handle_command(command: Commands, config: GatewayConfig) -> CliResult {
    match command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Complete {
            prompt,
            system,
            profile,
            model,
            temperature,
            max_tokens,
            format,
        } => {
            let gateway = Gateway::new(config, &Credentials::from_env())?;
            let messages = system
                .map(ChatMessage::system)
                .into_iter()
                .chain(std::iter::once(ChatMessage::user(prompt)))
                .collect();

            let completion = match profile {
                Some(profile) => {
                    gateway
                        .complete_with_profile(&profile, messages, max_tokens)
                        .await?
                }
                None => {
                    gateway
                        .complete(messages, model.as_deref(), temperature, max_tokens)
                        .await?
                }
            };

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&completion)?),
                OutputFormat::Human => {
                    println!("{}", completion.content);
                    eprintln!(
                        "[{}] {} tokens in {:.2}s",
                        completion.model,
                        completion.usage.total_tokens,
                        completion.latency_secs()
                    );
                }
            }
            report_usage(&gateway);
        }

        Commands::Embed { texts, format } => {
            let gateway = Gateway::new(config, &Credentials::from_env())?;
            let vectors = if let [text] = texts.as_slice() {
                vec![gateway.embed(text).await?]
            } else {
                gateway.embed_batch(&texts).await?
            };

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&vectors)?),
                OutputFormat::Human => {
                    for (text, vector) in texts.iter().zip(&vectors) {
                        let head: Vec<String> =
                            vector.iter().take(4).map(|v| format!("{v:.4}")).collect();
                        println!("{} dims [{}, ...] {}", vector.len(), head.join(", "), text);
                    }
                }
            }
            report_usage(&gateway);
        }

        Commands::Sentiment { text } => {
            let gateway = Gateway::new(config, &Credentials::from_env())?;
            println!("{}", gateway.classify_sentiment(&text).await);
            report_usage(&gateway);
        }
    }

    Ok(())
}

fn report_usage(gateway: &Gateway) {
    let status = gateway.status();
    eprintln!(
        "Cost today: ${:.6} over {} request(s)",
        status.today.total_cost(),
        status.today.requests()
    );
}
