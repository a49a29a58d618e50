use std::io::Write;

use api::{AppConfig, source_labels};
use query::AnswerComposer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let api_key = AppConfig::api_key()?;

    let index = index::ingest(&config.ingest_config(), config.embedding_client(&api_key)).await?;
    let composer = AnswerComposer::new(config.chat_client(&api_key));

    println!();
    println!(
        "Grounded FAQ assistant ({} passages indexed)",
        index.len()
    );
    println!("Ask about degree requirements, policies, or academic integrity.");
    println!("Type 'exit' to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("Your question: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        match composer
            .answer(&index, question, config.retrieval.top_k)
            .await
        {
            Ok(result) => {
                println!("\nANSWER:\n");
                println!("{}", result.answer);
                println!("\nSOURCES USED:\n");
                for label in source_labels(&result.sources) {
                    println!("- {label}");
                }
                println!("\n{}\n", "=".repeat(70));
            }
            Err(err) => eprintln!("Could not answer: {err}"),
        }
    }

    Ok(())
}
