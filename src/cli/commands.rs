use clap::{Args, Parser, Subcommand};

use renewal_reminder::{ExpiryMode, RecordInput};

#[derive(Parser)]
#[command(name = "renewal-reminder")]
#[command(about = "Track paid service renewals and send expiry reminders")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize storage and write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Add a renewal record
    Add {
        #[command(flatten)]
        record: RecordArgs,

        #[command(flatten)]
        date: DateArgs,
    },

    /// Replace the fields of an existing record
    Update {
        /// Record id
        id: i64,

        #[command(flatten)]
        record: RecordArgs,

        #[command(flatten)]
        date: DateArgs,
    },

    /// Extend a record from its current expiry date
    Renew {
        /// Record id
        id: i64,

        /// Years to add
        #[arg(short, long)]
        years: u32,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List records with days remaining and urgency
    List {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Only show records inside the reminder horizon
        #[arg(long)]
        flagged: bool,
    },

    /// Import decoded spreadsheet rows (JSON array of rows, header first)
    Import {
        /// Path to the rows file
        file: String,
    },

    /// Write an import template
    Template {
        /// Output file
        #[arg(short, long, default_value = "renewal-import-template.json")]
        output: String,
    },

    /// Send a reminder for one record
    Remind {
        /// Record id
        id: i64,

        /// Log the reminder instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Send reminders for every record inside the reminder horizon
    Sweep {
        /// Repeat every N seconds instead of running once
        #[arg(short, long)]
        interval: Option<u64>,

        /// Log reminders instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the reminder HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Record fields shared by `add` and `update`.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Person responsible for payment
    #[arg(long)]
    pub payer: String,

    /// Paying organisation
    #[arg(long)]
    pub company: String,

    /// Term in years
    #[arg(long)]
    pub years: String,

    /// Contact email
    #[arg(long)]
    pub email: String,
}

/// Exactly one base date, which also selects the expiry mode.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DateArgs {
    /// First purchase date; expiry is derived from it
    #[arg(long)]
    pub purchase_date: Option<String>,

    /// Current expiry date; the term is added to it
    #[arg(long)]
    pub current_expiry: Option<String>,
}

impl DateArgs {
    pub fn mode_and_date(&self) -> (ExpiryMode, String) {
        match (&self.purchase_date, &self.current_expiry) {
            (_, Some(expiry)) => (ExpiryMode::Renewal, expiry.clone()),
            (Some(purchase), None) => (ExpiryMode::InitialPurchase, purchase.clone()),
            (None, None) => (ExpiryMode::InitialPurchase, String::new()),
        }
    }
}

impl RecordArgs {
    pub fn to_input(&self, date: String) -> RecordInput {
        RecordInput {
            payer: self.payer.clone(),
            company: self.company.clone(),
            years: self.years.clone(),
            date,
            email: self.email.clone(),
        }
    }
}
