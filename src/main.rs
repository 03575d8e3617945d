use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;

use paper_rag::datasource::{ArxivSource, LocalSource, PdfSource};
use paper_rag::pipeline::RagPipeline;
use paper_rag::session::{Role, Session};
use paper_rag::{Config, EmbeddingEngine, LLMEngine, VectorDB};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ollama host
    #[arg(short = 'e', long)]
    ollama_host: Option<String>,

    /// Qdrant host
    #[arg(short = 'q', long)]
    qdrant_host: Option<String>,

    /// Model to use for answering; skips the interactive picker
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// How many chunks to retrieve per query
    #[arg(short = 'k', long, default_value = "5")]
    top_k: u64,
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_string())
}

/// Print the local model list and let the user pick one by number or name
async fn pick_model(llm_defaults: &paper_rag::external::LLMConfig) -> Result<String> {
    let engine = LLMEngine::new(llm_defaults.clone()).await?;
    let models = engine.list_models().await?;

    if models.is_empty() {
        println!("No models available on the Ollama runtime; using '{}'.", llm_defaults.model);
        return Ok(llm_defaults.model.clone());
    }

    println!("Models available locally:");
    for (i, name) in models.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }

    let input = read_line("Pick a model (number or name, Enter for first): ")?;
    if input.is_empty() {
        return Ok(models[0].clone());
    }
    if let Ok(n) = input.parse::<usize>() {
        if n >= 1 && n <= models.len() {
            return Ok(models[n - 1].clone());
        }
    }
    if models.iter().any(|m| m == &input) {
        return Ok(input);
    }

    println!("Unknown model '{}', using '{}'.", input, models[0]);
    Ok(models[0].clone())
}

async fn load_document(pipeline: &RagPipeline, session: &mut Session, arg: &str) {
    let source: Box<dyn PdfSource> = if arg.ends_with(".pdf") || Path::new(arg).is_file() {
        match LocalSource::new(arg) {
            Ok(source) => Box::new(source),
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        }
    } else {
        match ArxivSource::new(arg) {
            Ok(source) => Box::new(source),
            Err(e) => {
                println!("Error: {}", e);
                return;
            }
        }
    };

    println!("Downloading and processing the PDF...");
    match pipeline.ingest(source.as_ref()).await {
        Ok(index) => {
            // Replacing a document drops the previous collection
            if let Some(old) = session.clear_document() {
                if let Err(e) = pipeline.drop_index(&old).await {
                    println!("Warning: could not delete old collection: {}", e);
                }
            }
            println!(
                "Indexed {} ({} chunks) into collection {}.",
                index.source, index.chunks, index.collection
            );
            session.set_document(index);
        }
        Err(e) => println!("Error downloading or processing the PDF: {}", e),
    }
}

async fn drop_document(pipeline: &RagPipeline, session: &mut Session) {
    match session.clear_document() {
        Some(index) => match pipeline.drop_index(&index).await {
            Ok(()) => println!("Collection {} deleted.", index.collection),
            Err(e) => println!("Error deleting collection: {}", e),
        },
        None => println!("No vector database found to delete."),
    }
}

fn print_history(session: &Session) {
    if session.messages().is_empty() {
        println!("No messages yet.");
        return;
    }
    for message in session.messages() {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {}", speaker, message.content);
    }
}

async fn ask(pipeline: &RagPipeline, session: &mut Session, question: &str) {
    let Some(index) = session.document().cloned() else {
        println!("Please load a PDF first (:load <arxiv-id | file.pdf>).");
        return;
    };

    session.push_user(question);
    println!("Generating response...");
    match pipeline.answer(&index, question).await {
        Ok(answer) => {
            println!("\n{}\n", answer);
            session.push_assistant(answer);
        }
        Err(e) => println!("Error processing the question: {}", e),
    }
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

    // CLI args override environment configuration
    if let Some(host) = args.ollama_host {
        config.embedding.host = host.clone();
        config.llm.host = host;
    }
    if let Some(host) = args.qdrant_host {
        config.vector_db.host = host;
    }

    println!("PDF RAG playground");
    config.llm.model = match args.model {
        Some(model) => model,
        None => pick_model(&config.llm).await?,
    };
    println!("Using model '{}'.", config.llm.model);

    let embedder = EmbeddingEngine::new(config.embedding.clone()).await?;
    let llm = LLMEngine::new(config.llm.clone()).await?;
    let store = VectorDB::new(config.vector_db.clone()).await?;
    let pipeline = RagPipeline::new(
        Box::new(embedder),
        Box::new(llm),
        Box::new(store),
        config.chunking.clone(),
        args.top_k,
    );

    let mut session = Session::new();

    println!("\nCommands:");
    println!("  :load <arxiv-id | file.pdf>   index a PDF");
    println!("  :drop                         delete the current collection");
    println!("  :history                      show the conversation");
    println!("  :quit                         exit");
    println!("Anything else is a question about the loaded PDF.");

    loop {
        let input = read_line("\n> ")?;
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix(":load") {
            let arg = rest.trim();
            if arg.is_empty() {
                println!("Usage: :load <arxiv-id | file.pdf>");
            } else {
                load_document(&pipeline, &mut session, arg).await;
            }
        } else if input == ":drop" {
            drop_document(&pipeline, &mut session).await;
        } else if input == ":history" {
            print_history(&session);
        } else if input == ":quit" || input == ":q" {
            break;
        } else if input.starts_with(':') {
            println!("Unknown command: {}", input);
        } else {
            ask(&pipeline, &mut session, &input).await;
        }
    }

    // Leave no collection behind on exit
    if let Some(index) = session.clear_document() {
        if let Err(e) = pipeline.drop_index(&index).await {
            println!("Warning: could not delete collection {}: {}", index.collection, e);
        }
    }

    Ok(())
}
