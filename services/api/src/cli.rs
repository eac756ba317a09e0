use crate::reports::{run_priority_rank, run_status_resolve, PriorityRankArgs, StatusResolveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sportdash::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Sport Dashboard",
    about = "Run the facility sport dashboard or query status and priority exports offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect legacy status exports
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },
    /// Rank groups by extra sport deficit
    Priority {
        #[command(subcommand)]
        command: PriorityCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StatusCommand {
    /// Resolve the effective status of one group from a legacy CSV export
    Resolve(StatusResolveArgs),
}

#[derive(Subcommand, Debug)]
enum PriorityCommand {
    /// Score and order groups from a moment count listing
    Rank(PriorityRankArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Persist dashboard data to this JSON file instead of keeping it in memory
    #[arg(long)]
    pub(crate) data_file: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Status {
            command: StatusCommand::Resolve(args),
        } => run_status_resolve(args),
        Command::Priority {
            command: PriorityCommand::Rank(args),
        } => run_priority_rank(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_defaults_to_serve() {
        let cli = Cli::try_parse_from(["sportdash-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_status_resolve_with_instant() {
        let cli = Cli::try_parse_from([
            "sportdash-api",
            "status",
            "resolve",
            "--csv",
            "statuses.csv",
            "--group",
            "Lier",
            "--at",
            "2025-06-15T12:00:00Z",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Status {
                command: StatusCommand::Resolve(args),
            }) => {
                assert_eq!(args.group, "Lier");
                assert_eq!(args.csv, std::path::PathBuf::from("statuses.csv"));
                assert!(args.at.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unreadable_instant() {
        let result = Cli::try_parse_from([
            "sportdash-api",
            "status",
            "resolve",
            "--csv",
            "statuses.csv",
            "--group",
            "Lier",
            "--at",
            "morgen",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_priority_rank_json_flag() {
        let cli = Cli::try_parse_from(["sportdash-api", "priority", "rank", "--csv", "groups.csv", "--json"])
            .expect("parses");

        match cli.command {
            Some(Command::Priority {
                command: PriorityCommand::Rank(args),
            }) => assert!(args.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
