use chrono::NaiveDate;
use uuid::Uuid;

use hearth_core::{CoreError, CurrencyFormatter, DateFormatter, HouseholdService, HouseholdStore};
use hearth_domain::{
    Actor, BudgetPeriod, DateRange, HouseholdSnapshot, PeriodRecord, PeriodReport,
    ReconciliationReport, UserProfile,
};
use hearth_storage_json::JsonHouseholdStore;

use super::{
    args::{AddUserArgs, Cli, Command, ConfigCommand, RangeArgs},
    output,
    table::{Table, TableColumn},
    CliContext,
};
use crate::errors::CliError;

type CommandResult = Result<String, CliError>;

pub fn dispatch(cli: &Cli, ctx: &CliContext) -> CommandResult {
    let service = HouseholdService::new(&ctx.store, ctx.clock.as_ref());
    let session = || -> Result<(Actor, Uuid), CliError> {
        let snapshot = ctx.store.load_snapshot()?;
        let target = resolve_target(&snapshot, cli.user)?;
        let actor = resolve_actor(&snapshot, cli.acting_as.unwrap_or(target))?;
        Ok((actor, target))
    };
    match &cli.command {
        Command::Periods(range) => {
            let (actor, target) = session()?;
            let periods = service.periods(&actor, target, to_range(range)?.as_ref())?;
            render_periods(ctx, &periods, limit(ctx, range))
        }
        Command::Report(range) => {
            let (actor, target) = session()?;
            let reports = service.period_reports(&actor, target, to_range(range)?.as_ref())?;
            render_reports(ctx, &reports, limit(ctx, range))
        }
        Command::Reconcile { series } => {
            let (actor, _) = session()?;
            let report = service.reconcile(&actor, *series)?;
            render_reconciliation(ctx, &report)
        }
        Command::StartPeriod => {
            let (actor, target) = session()?;
            let record = service.start_period(&actor, target)?;
            render_record(ctx, "Started budget period", &record)
        }
        Command::EndPeriod => {
            let (actor, target) = session()?;
            let record = service.end_period(&actor, target)?;
            render_record(ctx, "Closed budget period", &record)
        }
        Command::ReopenPeriod => {
            let (actor, target) = session()?;
            let record = service.reopen_period(&actor, target)?;
            render_record(ctx, "Reopened budget period", &record)
        }
        Command::SetStartDay { day } => {
            let (actor, target) = session()?;
            service.set_start_day(&actor, target, *day)?;
            Ok(output::success(format!("Budget start day set to {day}")))
        }
        Command::AddUser(args) => add_user(args, &service, ctx),
        Command::Check => check(&service, ctx),
        Command::Config(command) => config_command(command, ctx),
    }
}

/// Uses `requested`, or the only user in the snapshot.
fn resolve_target(
    snapshot: &HouseholdSnapshot,
    requested: Option<Uuid>,
) -> Result<Uuid, CliError> {
    if let Some(id) = requested {
        return Ok(id);
    }
    match snapshot.users.as_slice() {
        [only] => Ok(only.id),
        [] => Err(CliError::Input(
            "the snapshot has no users yet; create one with `add-user`".into(),
        )),
        _ => Err(CliError::Input(
            "the snapshot has several users; pick one with --user".into(),
        )),
    }
}

fn resolve_actor(snapshot: &HouseholdSnapshot, acting: Uuid) -> Result<Actor, CliError> {
    snapshot
        .user(acting)
        .map(Actor::from)
        .ok_or_else(|| CoreError::UserNotFound(acting).into())
}

fn to_range(args: &RangeArgs) -> Result<Option<DateRange>, CliError> {
    if args.from.is_none() && args.to.is_none() {
        return Ok(None);
    }
    let start = args.from.unwrap_or(NaiveDate::MIN);
    let end = args.to.unwrap_or(NaiveDate::MAX);
    Ok(Some(DateRange::new(start, end)?))
}

fn limit(ctx: &CliContext, args: &RangeArgs) -> Option<usize> {
    args.limit.or(ctx.config.report_limit)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CommandResult {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render_periods(
    ctx: &CliContext,
    periods: &[BudgetPeriod],
    limit: Option<usize>,
) -> CommandResult {
    let shown: Vec<&BudgetPeriod> = periods
        .iter()
        .rev()
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    if ctx.json {
        let records: Vec<PeriodRecord> = shown.iter().map(|period| period.to_record()).collect();
        return to_json(&records);
    }
    if shown.is_empty() {
        return Ok(output::warning("No budget periods in range"));
    }
    let precision = ctx.config.currency_precision;
    let mut table = Table::new(vec![
        TableColumn::left("Start"),
        TableColumn::left("End"),
        TableColumn::left("Status"),
        TableColumn::right("Saved"),
        TableColumn::right("Spent"),
    ]);
    for period in shown {
        table.push_row(vec![
            ctx.formatter.format_date(period.start),
            period
                .end
                .map(|end| ctx.formatter.format_date(end))
                .unwrap_or_else(|| "-".into()),
            output::status_label(period.is_open()).to_string(),
            output::amount(period.total_saved, precision),
            output::amount(period.total_spent, precision),
        ]);
    }
    Ok(table.render())
}

fn render_reports(
    ctx: &CliContext,
    reports: &[PeriodReport],
    limit: Option<usize>,
) -> CommandResult {
    let shown = &reports[..reports.len().min(limit.unwrap_or(usize::MAX))];
    if ctx.json {
        return to_json(shown);
    }
    if shown.is_empty() {
        return Ok(output::warning("No budget periods in range"));
    }
    let precision = ctx.config.currency_precision;
    let currency = ctx.config.currency.as_str();
    let mut blocks = Vec::with_capacity(shown.len());
    for report in shown {
        let end = report
            .end_date
            .map(|end| ctx.formatter.format_date(end))
            .unwrap_or_else(|| "now".into());
        let mut block = vec![
            output::section(format!(
                "{} to {} ({})",
                ctx.formatter.format_date(report.start_date),
                end,
                output::status_label(report.is_active)
            )),
            format!(
                "Earned {}  Spent {}",
                ctx.formatter.format_amount(report.total_earned, currency),
                ctx.formatter.format_amount(report.total_spent, currency)
            ),
        ];
        if !report.account_types.is_empty() {
            let mut table = Table::new(vec![
                TableColumn::left("Account type"),
                TableColumn::right("Earned"),
                TableColumn::right("Spent"),
                TableColumn::right("Start"),
                TableColumn::right("End"),
            ]);
            for (bucket, metrics) in &report.account_types {
                table.push_row(vec![
                    bucket.to_string(),
                    output::amount(metrics.earned, precision),
                    output::amount(metrics.spent, precision),
                    output::amount(metrics.start_balance, precision),
                    output::amount(metrics.end_balance, precision),
                ]);
            }
            block.push(table.render());
        }
        blocks.push(block.join("\n"));
    }
    Ok(blocks.join("\n\n"))
}

fn render_reconciliation(ctx: &CliContext, report: &ReconciliationReport) -> CommandResult {
    if ctx.json {
        return to_json(report);
    }
    let currency = ctx.config.currency.as_str();
    let series = &report.series;
    let summary = &report.summary;
    let mut lines = vec![
        output::section(format!(
            "{} {} {} from {}",
            series.category,
            ctx.formatter.format_amount(series.amount, currency),
            series.frequency,
            ctx.formatter.format_date(series.start_date)
        )),
        format!(
            "Executions: {} of {} expected ({} missed, {})",
            summary.actual_executions,
            summary.expected_executions,
            summary.missed_payments,
            output::percent(summary.success_rate)
        ),
        format!(
            "Paid {} of {} (difference {})",
            ctx.formatter.format_amount(summary.total_paid, currency),
            ctx.formatter.format_amount(summary.expected_total, currency),
            ctx.formatter.format_amount(summary.difference, currency)
        ),
    ];
    if !report.transactions.is_empty() {
        let mut table = Table::new(vec![
            TableColumn::left("Date"),
            TableColumn::right("Amount"),
            TableColumn::left("Description").max_width(40),
        ]);
        for txn in &report.transactions {
            table.push_row(vec![
                ctx.formatter.format_date(txn.date),
                output::amount(txn.amount, ctx.config.currency_precision),
                txn.description.clone().unwrap_or_default(),
            ]);
        }
        lines.push(table.render());
    }
    Ok(lines.join("\n"))
}

fn render_record(ctx: &CliContext, verb: &str, record: &PeriodRecord) -> CommandResult {
    if ctx.json {
        return to_json(record);
    }
    let period = BudgetPeriod::try_from(record).map_err(|err| CliError::Input(err.to_string()))?;
    let end = period
        .end
        .map(|end| ctx.formatter.format_date(end))
        .unwrap_or_else(|| "open".into());
    Ok(output::success(format!(
        "{verb} {} ({} to {end})",
        period.id,
        ctx.formatter.format_date(period.start)
    )))
}

fn add_user(
    args: &AddUserArgs,
    service: &HouseholdService<'_, JsonHouseholdStore>,
    ctx: &CliContext,
) -> CommandResult {
    let mut user = UserProfile::new(args.email.as_str()).with_role(args.role.into());
    user.household_id = args.household;
    user.budget_start_day = args
        .start_day
        .unwrap_or_else(|| ctx.config.budget_start_day());
    let user = service.register_user(user)?;
    if ctx.json {
        return to_json(&user);
    }
    Ok(output::success(format!(
        "Added {} ({}) with id {}",
        user.email, user.role, user.id
    )))
}

fn check(service: &HouseholdService<'_, JsonHouseholdStore>, ctx: &CliContext) -> CommandResult {
    let warnings = service.warnings()?;
    if ctx.json {
        return to_json(&warnings);
    }
    if warnings.is_empty() {
        return Ok(output::success("No problems found"));
    }
    Ok(warnings
        .iter()
        .map(output::warning)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn config_command(command: &ConfigCommand, ctx: &CliContext) -> CommandResult {
    let manager = &ctx.config_manager;
    match command {
        ConfigCommand::Show => {
            if ctx.json {
                return to_json(&ctx.config);
            }
            let config = &ctx.config;
            let snapshot = ctx.store.snapshot_path().display().to_string();
            let rows = [
                ("locale", config.locale.clone()),
                ("currency", config.currency.clone()),
                (
                    "default_budget_start_day",
                    config.budget_start_day().to_string(),
                ),
                ("currency_precision", config.currency_precision.to_string()),
                ("ui_color_enabled", config.ui_color_enabled.to_string()),
                ("snapshot_path", snapshot),
                (
                    "report_limit",
                    config
                        .report_limit
                        .map_or_else(|| "all".to_string(), |limit| limit.to_string()),
                ),
                ("config_file", manager.config_path().display().to_string()),
            ];
            let mut table = Table::new(vec![TableColumn::left("Key"), TableColumn::left("Value")]);
            for (key, value) in rows {
                table.push_row(vec![key.to_string(), value]);
            }
            Ok(table.render())
        }
        ConfigCommand::SetStartDay { day } => {
            let mut updated = ctx.config.clone();
            updated.set_budget_start_day(*day)?;
            manager.backup(&ctx.config, Some("before start day change"))?;
            manager.save(&updated)?;
            Ok(output::success(format!("Default budget start day set to {day}")))
        }
        ConfigCommand::Backup { note } => {
            let name = manager.backup(&ctx.config, note.as_deref())?;
            Ok(output::success(format!("Saved configuration backup {name}")))
        }
        ConfigCommand::Backups => {
            let names = manager.list_backups()?;
            if ctx.json {
                return to_json(&names);
            }
            if names.is_empty() {
                return Ok(output::warning("No configuration backups"));
            }
            Ok(names.join("\n"))
        }
        ConfigCommand::Restore { name } => {
            manager.restore(name)?;
            Ok(output::success(format!("Restored configuration from {name}")))
        }
    }
}
