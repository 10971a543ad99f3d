use clap::{Parser, Subcommand};
use math_mentor::{
    agent::MathMentor,
    config::PipelineConfig,
    error::PipelineError,
    extraction::{TextExtractor, TranscriptExtractor},
    models::{
        Feedback, InputType, OriginalInput, PipelineOutcome, PipelineReport, Route, Submission,
        Verdict,
    },
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mentor", about = "Solve math problems with a verified pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one problem through the pipeline
    Solve {
        /// Problem text as typed or already extracted
        #[arg(long, conflicts_with = "transcript")]
        text: Option<String>,

        /// JSON transcript `{"text", "confidence"}` from an OCR or ASR tool
        #[arg(long)]
        transcript: Option<PathBuf>,

        #[arg(long, default_value = "text")]
        input_type: String,

        /// Override the extraction confidence
        #[arg(long)]
        confidence: Option<f64>,

        /// Confirm the extracted text is correct
        #[arg(long)]
        confirm: bool,

        /// Reuse a remembered solution for a similar problem
        #[arg(long)]
        reuse: bool,
    },

    /// Record whether a solution was right
    Feedback {
        #[arg(long)]
        problem: String,

        #[arg(long)]
        route: String,

        #[arg(long)]
        answer: String,

        #[arg(long)]
        step: Vec<String>,

        #[arg(long, requires = "correction")]
        incorrect: bool,

        #[arg(long)]
        correction: Option<String>,
    },
}

async fn build_submission(
    text: Option<String>,
    transcript: Option<PathBuf>,
    input_type: &str,
    confidence: Option<f64>,
    confirm: bool,
    reuse: bool,
) -> Result<Submission, PipelineError> {
    let input_type: InputType = input_type.parse()?;

    let (original_input, extracted_text, extracted_confidence) = match (text, transcript) {
        (_, Some(path)) => {
            let extraction = TranscriptExtractor.extract(input_type, &path).await?;
            (OriginalInput::File(path), extraction.text, extraction.confidence)
        }
        (Some(text), None) => (OriginalInput::Text(text.clone()), text, 1.0),
        (None, None) => {
            return Err(PipelineError::InvalidInput(
                "either --text or --transcript is required".to_string(),
            ))
        }
    };

    let confidence = match input_type {
        InputType::Text => 1.0,
        _ => confidence.unwrap_or(extracted_confidence),
    };

    Ok(Submission {
        input_type,
        original_input,
        extracted_text,
        confidence,
        user_confirmed: confirm,
        reuse_previous: reuse,
    })
}

fn print_report(report: &PipelineReport) {
    println!("\n=== RUN {} ({} confidence) ===", report.run_id, report.confidence_band);

    match &report.outcome {
        PipelineOutcome::NeedsHuman { review } => {
            println!("⚠️  Human review needed: {}", review.reason);
        }
        PipelineOutcome::Unroutable { .. } => {
            println!("⚠️  Could not determine how to solve this problem. Please rephrase it.");
        }
        PipelineOutcome::Recalled { record, .. } => {
            println!("Recalled answer: {}", record.final_answer);
            for (i, step) in record.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        PipelineOutcome::Rejected { verification, .. } => {
            println!(
                "❌ The solver could not produce a valid solution: {}",
                verification.reason.as_deref().unwrap_or("unknown reason")
            );
        }
        PipelineOutcome::Solved {
            route,
            solution,
            similar,
            ..
        } => {
            println!("Route: {}", route);
            println!("Answer: {}", solution.final_answer);
            for (i, step) in solution.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            if !solution.used_context.is_empty() {
                println!("\nContext:");
                for context in &solution.used_context {
                    println!("  - {}", context);
                }
            }
            if let Some(record) = similar {
                println!("\nSimilar problem seen before: {}", record.problem_text);
            }
        }
    }

    println!("\nTrace:");
    for (i, line) in report.trace.iter().enumerate() {
        println!("  {}: {}", i + 1, line);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env()?;
    let mentor = MathMentor::from_config(&config).await?;

    match cli.command {
        Command::Solve {
            text,
            transcript,
            input_type,
            confidence,
            confirm,
            reuse,
        } => {
            let submission =
                build_submission(text, transcript, &input_type, confidence, confirm, reuse).await?;
            info!(input_type = %submission.input_type, "Running submission");

            let report = mentor.run(submission).await?;
            print_report(&report);
        }
        Command::Feedback {
            problem,
            route,
            answer,
            step,
            incorrect,
            correction,
        } => {
            let route: Route = route.parse()?;
            let verdict = if incorrect {
                Verdict::Incorrect {
                    correction: correction.unwrap_or_default(),
                }
            } else {
                Verdict::Correct
            };

            let record = mentor
                .record_feedback(Feedback {
                    problem_text: problem,
                    route,
                    final_answer: answer,
                    steps: step,
                    verdict,
                })
                .await?;
            println!("Feedback saved ({:?}) for: {}", record.user_feedback, record.problem_text);
        }
    }

    Ok(())
}
