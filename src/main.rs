use std::{fs, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};
use whatsapp_cloud::{
    envelope,
    message::Text,
    webhook::{sign, verify_signature},
    Client, CloudConfig, Dispatcher, Handlers, Message, SendOptions, VerifyQuery,
};

/// Command line companion for the WhatsApp Cloud API.
///
/// Settings not given as flags are read from `WHATSAPP_*` variables.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log every request and build step.
    #[arg(long, short)]
    verbose: bool,

    /// Override the Graph API version.
    #[arg(long)]
    api_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the request body of a text message.
    Envelope {
        to: String,
        text: String,
        /// Quote this message id.
        #[arg(long)]
        reply_to: Option<String>,
        #[arg(long)]
        preview_url: bool,
    },
    /// Compute the x-hub-signature-256 header for a webhook body.
    Sign {
        #[arg(long, env = "WHATSAPP_APP_SECRET")]
        secret: String,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Check a webhook body against its x-hub-signature-256 header.
    Verify {
        #[arg(long, env = "WHATSAPP_APP_SECRET")]
        secret: String,
        #[arg(long)]
        signature: String,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Answer a GET verification handshake.
    Challenge {
        #[arg(long, default_value = "subscribe")]
        mode: String,
        #[arg(long)]
        token: String,
        challenge: String,
    },
    /// Send a text message, to several recipients in batches if needed.
    SendText {
        #[arg(long, env = "WHATSAPP_PHONE_ID")]
        phone_id: String,
        #[arg(long, required = true)]
        to: Vec<String>,
        text: String,
    },
    /// Print the effective configuration.
    ShowConfig,
}

#[derive(clap::Args, Debug)]
struct BodyArgs {
    /// Raw body as a string.
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,
    /// Read the raw body from a file.
    #[arg(long)]
    body_file: Option<PathBuf>,
}

impl BodyArgs {
    fn read(&self) -> std::io::Result<String> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => fs::read_to_string(path),
            (None, None) => Ok(String::new()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logger(cli.verbose)?;

    let mut config = CloudConfig::from_env();
    if let Some(version) = cli.api_version {
        config = config.with_api_version(version);
    }

    match cli.command {
        Commands::Envelope {
            to,
            text,
            reply_to,
            preview_url,
        } => {
            let text = if preview_url {
                Text::with_preview(text)?
            } else {
                Text::new(text)?
            };
            let options = SendOptions {
                context: reply_to,
                ..Default::default()
            };
            let body = envelope(&to, &Message::from(text), &options)?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Sign { secret, body } => {
            println!("sha256={}", sign(&body.read()?, &secret));
        }
        Commands::Verify {
            secret,
            signature,
            body,
        } => {
            if verify_signature(&body.read()?, &signature, Some(&secret))? {
                println!("Signature is valid.");
            } else {
                eprintln!("Signature does not match.");
                std::process::exit(1);
            }
        }
        Commands::Challenge {
            mode,
            token,
            challenge,
        } => {
            let dispatcher: Dispatcher =
                Dispatcher::new(Arc::new(Client::new(config)), Handlers::default());
            let query = VerifyQuery {
                mode: Some(mode),
                verify_token: Some(token),
                challenge: Some(challenge),
            };
            match dispatcher.verify(&query) {
                Ok(challenge) => println!("{challenge}"),
                Err(err) => {
                    eprintln!("{} {err}", err.status_code());
                    std::process::exit(1);
                }
            }
        }
        Commands::SendText { phone_id, to, text } => {
            let client = Client::new(config);
            let message = Message::from(Text::new(text)?);
            let results = client.broadcast(&phone_id, &to, &message).await;
            for (recipient, result) in to.iter().zip(results) {
                match result {
                    Ok(response) => println!(
                        "Sent to {recipient}: {}",
                        response.message_id().unwrap_or("<no id>")
                    ),
                    Err(err) => eprintln!("Failed to send to {recipient}: {err}"),
                }
            }
        }
        Commands::ShowConfig => {
            config.access_token = mask(&config.access_token);
            config.app_secret = config.app_secret.as_deref().map(mask);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn setup_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger_config = ConfigBuilder::new()
        .add_filter_allow_str("whatsapp_cloud")
        .build();
    SimpleLogger::init(level, logger_config)
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "****".to_string()
    }
}
