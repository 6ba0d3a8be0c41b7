use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use hearth_domain::Role;

/// Budget periods, period reports and recurring-series reconciliation for a household.
#[derive(Parser, Debug)]
#[command(name = "hearth_cli", version, about, long_about = None)]
pub struct Cli {
    /// Household snapshot to read and write. Defaults to the configured location.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// User whose data the command works on. Optional when the snapshot holds one user.
    #[arg(long, global = true)]
    pub user: Option<Uuid>,

    /// Acting user for permission checks. Defaults to `--user`.
    #[arg(long = "as", global = true, value_name = "USER")]
    pub acting_as: Option<Uuid>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Pin the current date (YYYY-MM-DD).
    #[arg(long, global = true, hide = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List derived budget periods.
    Periods(RangeArgs),
    /// Per-period totals and account-type balances, newest first.
    Report(RangeArgs),
    /// Compare a recurring series with the transactions that actually happened.
    Reconcile {
        series: Uuid,
    },
    /// Open a new budget period.
    StartPeriod,
    /// Close the open budget period as of today.
    EndPeriod,
    /// Reopen the most recently closed period.
    ReopenPeriod,
    /// Change the user's budget start day (1-28).
    SetStartDay {
        day: u8,
    },
    /// Add a user profile to the snapshot.
    AddUser(AddUserArgs),
    /// Report dangling references and other snapshot anomalies.
    Check,
    /// Show or change preferences.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Default, Clone)]
pub struct RangeArgs {
    /// First day of the range (inclusive).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day of the range (inclusive).
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Show at most this many entries.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct AddUserArgs {
    pub email: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Member)]
    pub role: RoleArg,
    #[arg(long)]
    pub household: Option<Uuid>,
    /// Defaults to the configured default start day.
    #[arg(long)]
    pub start_day: Option<u8>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    Member,
    Admin,
    Superadmin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Member => Role::Member,
            RoleArg::Admin => Role::Admin,
            RoleArg::Superadmin => Role::Superadmin,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the active configuration.
    Show,
    /// Set the default budget start day for new users.
    SetStartDay { day: u8 },
    /// Save a named backup of the configuration.
    Backup {
        #[arg(long)]
        note: Option<String>,
    },
    /// List configuration backups, newest first.
    Backups,
    /// Restore a configuration backup by file name.
    Restore { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hearth_cli",
            "report",
            "--from",
            "2024-01-01",
            "--to",
            "2024-03-31",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Report(range) => {
                assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 3, 31));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["hearth_cli", "reconcile", "not-a-uuid"]).is_err());
    }
}
