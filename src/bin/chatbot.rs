use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

use paper_rag::session::Session;
use paper_rag::{Config, HostedClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hosted model id (e.g. meta-llama/Meta-Llama-3-8B)
    #[arg(short = 'm', long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Some(model) = args.model {
        config.hosted.model = model;
    }

    let client = HostedClient::new(config.hosted.clone())?;
    let mut session = Session::new();

    println!("Generic chatbot ({})", config.hosted.model);
    println!("Enter your message (empty line to skip, Ctrl-D to exit).");

    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut buffer = String::new();
        if io::stdin().read_line(&mut buffer)? == 0 {
            break;
        }
        let prompt = buffer.trim();
        if prompt.is_empty() {
            continue;
        }

        session.push_user(prompt);
        match client.generate(prompt).await {
            Ok(reply) => {
                println!("Chatbot: {}", reply);
                session.push_assistant(reply);
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}
