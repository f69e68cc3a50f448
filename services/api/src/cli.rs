use crate::batch::{run_generate, run_pipeline, run_score, GenerateArgs, RunArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use risk_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Applicant Risk Engine",
    about = "Validate, score, and partition insurance applicant records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic batch, score it, and write both output tables (default command)
    Run(RunArgs),
    /// Write a synthetic applicant table without scoring it
    Generate(GenerateArgs),
    /// Validate and score an existing applicant CSV
    Score(ScoreArgs),
    /// Start the HTTP scoring service
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_pipeline(args),
        Command::Generate(args) => run_generate(args),
        Command::Score(args) => run_score(args),
        Command::Serve(args) => server::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_engine::workflows::underwriting::RuleTable;

    #[test]
    fn no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["risk-engine-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "risk-engine-api",
            "run",
            "--records",
            "100",
            "--seed",
            "7",
            "--rules",
            "base",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.records, Some(100));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.rules, Some(RuleTable::Base));
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn score_requires_input() {
        assert!(Cli::try_parse_from(["risk-engine-api", "score"]).is_err());
    }

    #[test]
    fn unknown_rule_table_is_rejected() {
        assert!(Cli::try_parse_from(["risk-engine-api", "run", "--rules", "premium"]).is_err());
    }
}
