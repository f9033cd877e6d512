mod cli;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, DateArgs, RecordArgs};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use renewal_reminder::{
    error::{self, RenewalError},
    import::{self, JsonRowSource, RowSource},
    reminder::{self, ReminderComposer, ReminderRequest, ReminderSweep},
    server::{self, AppState},
    storage::{self, Persistence, RecordStore, RenewalRecord},
    utils, Config,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("renewal_reminder=debug,info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init { force } => initialize(&config, &cli.config, force),

        Commands::Add { record, date } => add_record(&config, &record, &date),

        Commands::Update { id, record, date } => update_record(&config, id, &record, &date),

        Commands::Renew { id, years } => renew_record(&config, id, years),

        Commands::Delete { id, yes } => delete_record(&config, id, yes),

        Commands::List { format, flagged } => list_records(&config, &format, flagged),

        Commands::Import { file } => {
            info!("Importing rows from {}", file);
            import_rows(&config, &file)
        }

        Commands::Template { output } => write_template(&output),

        Commands::Remind { id, dry_run } => send_reminder(&config, id, dry_run).await,

        Commands::Sweep { interval, dry_run } => match interval {
            Some(secs) => {
                info!("Starting reminder sweep service (interval: {}s)", secs);
                run_sweep_service(&config, secs, dry_run).await
            }
            None => run_sweep(&config, dry_run).await,
        },

        Commands::Serve { port } => {
            info!("Starting reminder API...");
            serve(&config, port).await
        }
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn open_store(config: &Config) -> error::Result<RecordStore<Box<dyn Persistence>>> {
    let backend = storage::open_backend(&config.storage)?;
    RecordStore::open(backend)
}

fn composer_and_transport(
    config: &Config,
    dry_run: bool,
) -> error::Result<(ReminderComposer, Box<dyn reminder::MailTransport>)> {
    let transport = reminder::transport::from_config(&config.mail, dry_run)
        .map_err(|e| RenewalError::Config(e.to_string()))?;
    Ok((ReminderComposer::new(config.mail.from.clone()), transport))
}

fn print_record(record: &RenewalRecord) {
    let now = Utc::now();
    let days = record.days_remaining(now);
    println!("  Id:         {}", record.id);
    println!("  Payer:      {}", record.payer);
    println!("  Company:    {}", record.company);
    println!("  Term:       {} year(s)", record.years);
    println!("  Expires:    {}", record.expiry_string());
    println!(
        "  Remaining:  {} ({})",
        utils::format_days(days),
        utils::format_tier(record.urgency(now))
    );
    println!("  Email:      {}", record.email);
}

fn initialize(config: &Config, config_path: &str, force: bool) -> error::Result<()> {
    println!("{}", "Initializing renewal reminder...".green());

    let path = Path::new(config_path);
    if path.exists() && !force {
        println!("{}", format!("✓ Keeping existing {}", config_path).green());
    } else {
        std::fs::write(path, Config::default_toml()?)?;
        println!("{}", format!("✓ Wrote default configuration to {}", config_path).green());
    }

    let store = open_store(config)?;
    println!("{}", "✓ Storage ready".green());

    println!("\n{}", "Configuration:".cyan());
    println!("  Storage:        {:?} at {}", config.storage.backend, config.storage.path);
    println!("  Records:        {}", store.len());
    println!(
        "  Mail relay:     {}",
        config.mail.relay_url.as_deref().unwrap_or("(not set)")
    );
    println!("  Dry run:        {}", config.mail.dry_run);
    println!("  Horizon:        {} days", config.reminders.horizon_days);

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to create an import template", "renewal-reminder template".yellow());
    println!("  {} to list records", "renewal-reminder list".yellow());
    println!("  {} to send due reminders", "renewal-reminder sweep".yellow());
    Ok(())
}

fn add_record(config: &Config, record: &RecordArgs, date: &DateArgs) -> error::Result<()> {
    let (mode, base) = date.mode_and_date();
    let mut store = open_store(config)?;
    let created = store.create_record(&record.to_input(base), mode, Utc::now())?;

    println!("{}", "✓ Record saved".green());
    print_record(&created);
    Ok(())
}

fn update_record(config: &Config, id: i64, record: &RecordArgs, date: &DateArgs) -> error::Result<()> {
    let (mode, base) = date.mode_and_date();
    let mut store = open_store(config)?;
    let updated = store.update_record(id, &record.to_input(base), mode)?;

    println!("{}", "✓ Record updated".green());
    print_record(&updated);
    Ok(())
}

fn renew_record(config: &Config, id: i64, years: u32) -> error::Result<()> {
    let mut store = open_store(config)?;
    let renewed = store.renew_record(id, years)?;

    println!("{}", format!("✓ Renewed for {} year(s)", years).green());
    print_record(&renewed);
    Ok(())
}

fn delete_record(config: &Config, id: i64, yes: bool) -> error::Result<()> {
    let mut store = open_store(config)?;
    let record = store.find(id).ok_or(RenewalError::RecordNotFound(id))?;

    if !yes
        && !utils::confirm_action(&format!(
            "Delete record {} ({} / {})?",
            id, record.payer, record.company
        ))
    {
        println!("Cancelled");
        return Ok(());
    }

    store.delete_record(id)?;
    println!("{}", "✓ Record deleted".green());
    Ok(())
}

fn list_records(config: &Config, format: &str, flagged_only: bool) -> error::Result<()> {
    let store = open_store(config)?;
    let now = Utc::now();

    let records: Vec<&RenewalRecord> = if flagged_only {
        store.flagged(now, config.reminders.horizon_days)
    } else {
        store.records().iter().collect()
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No records".yellow());
        return Ok(());
    }

    let widths = [15, 16, 24, 6, 12, 20, 10, 30];
    utils::print_table_border(150);
    utils::print_table_row(
        &["Id", "Payer", "Company", "Years", "Expires", "Remaining", "Urgency", "Email"],
        &widths,
    );
    utils::print_table_border(150);

    for record in &records {
        let days = record.days_remaining(now);
        let tier = record.urgency(now);
        let remaining = utils::format_days(days);
        let line = [
            record.id.to_string(),
            utils::truncate(&record.payer, 16),
            utils::truncate(&record.company, 24),
            record.years.to_string(),
            record.expiry_string(),
            remaining,
            tier.to_string(),
            record.email.clone(),
        ];
        let columns: Vec<&str> = line.iter().map(String::as_str).collect();

        if days <= config.reminders.horizon_days {
            print!("{}", "! ".red());
        } else {
            print!("  ");
        }
        utils::print_table_row(&columns, &widths);
    }
    utils::print_table_border(150);

    let flagged = records
        .iter()
        .filter(|r| r.days_remaining(now) <= config.reminders.horizon_days)
        .count();
    println!(
        "{} records, {} within {} days",
        records.len(),
        flagged.to_string().red(),
        config.reminders.horizon_days
    );
    Ok(())
}

fn import_rows(config: &Config, file: &str) -> error::Result<()> {
    let rows = JsonRowSource::new(file).rows()?;
    let mut store = open_store(config)?;
    let outcome = store.import_batch(&rows, Utc::now())?;

    let summary = outcome.summary();
    if outcome.failed > 0 {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.green());
    }
    Ok(())
}

fn write_template(output: &str) -> error::Result<()> {
    let template = import::import_template();
    std::fs::write(output, serde_json::to_string_pretty(&template)?)?;
    println!(
        "{}",
        format!("✓ Template written to {}. Fill in rows and run `import`.", output).green()
    );
    Ok(())
}

async fn send_reminder(config: &Config, id: i64, dry_run: bool) -> error::Result<()> {
    let store = open_store(config)?;
    let record = store.find(id).ok_or(RenewalError::RecordNotFound(id))?;
    let (composer, transport) = composer_and_transport(config, dry_run)?;

    let now = Utc::now();
    let request = ReminderRequest::for_record(record, now);
    let payload = composer.compose(&request, record.urgency(now), now);
    composer.deliver(transport.as_ref(), &payload).await?;

    println!("{}", format!("✓ Reminder sent to {}", record.email).green());
    println!("  Subject: {}", payload.subject);
    Ok(())
}

async fn run_sweep(config: &Config, dry_run: bool) -> error::Result<()> {
    let store = open_store(config)?;
    let (composer, transport) = composer_and_transport(config, dry_run)?;
    let now = Utc::now();
    let due = store.flagged(now, config.reminders.horizon_days);

    if due.is_empty() {
        println!("{}", "No records inside the reminder horizon".green());
        return Ok(());
    }

    let progress = ProgressBar::new(due.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let summary = ReminderSweep::new(&composer, transport.as_ref())
        .run(&due, now, |entry| {
            progress.set_message(entry.to.clone());
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    println!("\n{}", "=== Reminder Sweep Summary ===".cyan().bold());
    println!("Due:        {}", due.len());
    println!("Sent:       {} ✓", summary.sent.to_string().green());
    println!("Failed:     {} ✗", summary.failed.to_string().red());

    for entry in summary.entries.iter().filter(|e| !e.delivered) {
        println!("  {} record {} <{}>", "✗".red(), entry.record_id, entry.to);
    }
    Ok(())
}

async fn run_sweep_service(config: &Config, interval: u64, dry_run: bool) -> error::Result<()> {
    println!("{}", "Starting reminder sweep service...".green());
    println!("Interval: {} seconds", interval);
    println!("Dry run: {}", dry_run || config.mail.dry_run);

    loop {
        info!("Running reminder sweep...");
        if let Err(e) = run_sweep(config, dry_run).await {
            warn!("Reminder sweep failed: {}", e);
        }
        tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
    }
}

async fn serve(config: &Config, port: Option<u16>) -> error::Result<()> {
    let (composer, transport) = composer_and_transport(config, false)?;

    let mut server_config = config.server.clone();
    if let Some(port) = port {
        server_config.port = port;
    }

    let state = AppState::new(composer, Arc::from(transport));
    server::run(&server_config, state).await
}
