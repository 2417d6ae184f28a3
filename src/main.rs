use instacaption::app::CLI_LOG_FILTER;
use instacaption::{build_pipeline, init_tracing, AppPipeline};
use instacaption_core::{AppConfig, CoreError, ErrorExt, ErrorReporter, Profile, DEFAULT_CONFIG_FILE};
use std::io::{self, BufRead, Write};

const INPUT_PROMPT: &str = "Enter a keyword or theme for your Instagram post (e.g., 'beautiful sunset', 'morning coffee', 'new pet'): ";

fn print_banner() {
    println!("📸 Instagram Caption & Hashtag Generator (Command Line) 📸");
    println!("---------------------------------------------------------");
    println!("This tool generates captions, emojis, and hashtags for Instagram based on your text input.");
    println!("Models run locally by default; set the hosted backend in {DEFAULT_CONFIG_FILE} to use an inference API.");
    println!("Ensure you have an active internet connection for initial model download.");
    println!("---------------------------------------------------------");
}

fn read_prompt() -> io::Result<String> {
    print!("{INPUT_PROMPT}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

async fn generate_once(pipeline: &AppPipeline, reporter: &ErrorReporter) -> Result<(), CoreError> {
    let prompt = read_prompt()?;
    if prompt.trim().is_empty() {
        println!("🔴 No prompt entered. Exiting.");
        return Ok(());
    }

    println!("\n🧠 Generating Instagram content based on: '{}'...", prompt.trim());
    match pipeline.run(&prompt).await {
        Ok(outcome) => {
            let record = &outcome.record;
            println!("\n--- ✨ Generated Instagram Post ✨ ---");
            println!("Caption: {}", record.caption);
            println!("Emojis: {}", record.emojis);
            println!("Hashtags: {}", record.hashtags);
            println!("------------------------------------------");
            println!("\n✅ Generated post successfully saved to: {}", outcome.path.display());
        }
        Err(e) => {
            reporter.report_error(&e);
            println!(
                "❌ A critical error occurred during Instagram content generation: {}",
                e.user_friendly_message()
            );
            println!("Please review the error message and ensure all steps (installation, internet) are correct.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    init_tracing(CLI_LOG_FILTER);
    let reporter = ErrorReporter::new();

    print_banner();
    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE)?;

    println!("Loading text generation and sentiment analysis models (this happens once)...");
    let pipeline = build_pipeline(&config, Profile::Cli).await.map_err(|e| {
        reporter.report_error(&e);
        e
    })?;
    println!("AI models loaded successfully!");
    println!();

    generate_once(&pipeline, &reporter).await
}
