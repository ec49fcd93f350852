use clap::Parser;
use study_quiz::{Cli, Config, Quiz, QuizError, logging};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), QuizError> {
    let config = Config::from_cli(Cli::parse())?;
    logging::init(&config.log)?;

    let quiz = Quiz::from_config(&config)?;
    let summary = quiz.run()?;

    if config.print_result {
        if let Some(summary) = summary {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("failed to serialize result summary: {}", e),
            }
        }
    }

    Ok(())
}
