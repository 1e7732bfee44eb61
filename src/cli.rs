use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jiff::civil::{Date, Time};
use std::io;

use crate::catalog::{DiscoveryDraft, ResourceKind};
use crate::list::pager::validate_page_size;
use crate::list::{ItemId, SortDirection};

#[derive(Parser)]
#[command(name = "evcat")]
#[command(about = "Browse and manage firearm and narcotic evidence catalogs")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr (overridden by EVCAT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// How a command prints its result
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of a catalog collection
    #[command(visible_alias = "ls")]
    List {
        /// Collection: firearms, narcotics, users, history
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category filter as category=value, can be repeated
        #[arg(short, long = "filter", value_parser = parse_filter, action = clap::ArgAction::Append)]
        filters: Vec<(String, String)>,

        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<Date>,

        /// Latest date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<Date>,

        /// Sort direction: asc, desc, none
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortDirection>,

        /// Field to sort on (defaults to the collection's primary field)
        #[arg(long = "sort-field")]
        sort_by: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1", value_parser = parse_page)]
        page: usize,

        /// Items per page: 10, 20, 50, 100 (default from config)
        #[arg(long = "per-page", value_parser = parse_page_size)]
        per_page: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one item
    Show {
        /// Collection: firearms, narcotics, users, history
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: ItemId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create or edit discovery records
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Delete an item after confirmation
    #[command(visible_alias = "rm")]
    Delete {
        /// Collection: firearms, narcotics, users, history
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: ItemId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in and save the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and forget the saved session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RecordAction {
    /// Record a new discovery
    Add {
        #[command(flatten)]
        fields: RecordFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing discovery record
    Edit {
        /// Record ID
        #[arg(value_parser = parse_item_id)]
        id: ItemId,

        #[command(flatten)]
        fields: RecordFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Discovery record fields. Required fields are checked before sending.
#[derive(Args, Debug, Clone, Default)]
pub struct RecordFields {
    /// Exhibit the discovery belongs to
    #[arg(long = "exhibit")]
    pub exhibit_id: Option<i64>,

    /// Subdistrict ID of the discovery location (required for add)
    #[arg(long = "subdistrict")]
    pub subdistrict_id: Option<i64>,

    /// Discovery date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,

    /// Discovery time (HH:MM or HH:MM:SS)
    #[arg(long, value_parser = parse_time)]
    pub time: Option<Time>,

    /// Quantity found
    #[arg(long)]
    pub quantity: Option<f64>,

    /// Latitude (required for add)
    #[arg(long = "lat", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude (required for add)
    #[arg(long = "lon", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Photo URL
    #[arg(long = "photo-url")]
    pub photo_url: Option<String>,
}

impl From<RecordFields> for DiscoveryDraft {
    fn from(fields: RecordFields) -> Self {
        DiscoveryDraft {
            exhibit_id: fields.exhibit_id,
            subdistrict_id: fields.subdistrict_id,
            discovery_date: fields.date,
            discovery_time: fields.time,
            quantity: fields.quantity,
            latitude: fields.latitude,
            longitude: fields.longitude,
            photo_url: fields.photo_url,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, timeout_secs, items_per_page, notification_timeout_secs)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (base_url, timeout_secs, items_per_page, notification_timeout_secs)
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            DeleteOptions, ListOptions, cmd_config_get, cmd_config_set, cmd_config_show,
            cmd_delete, cmd_list, cmd_login, cmd_logout, cmd_record_add, cmd_record_edit,
            cmd_show, cmd_whoami,
        };

        match self {
            Commands::List {
                kind,
                search,
                filters,
                from,
                to,
                sort,
                sort_by,
                page,
                per_page,
                json,
            } => {
                cmd_list(
                    ListOptions {
                        kind,
                        search,
                        filters,
                        from,
                        to,
                        sort,
                        sort_by,
                        page,
                        per_page,
                    },
                    OutputOptions { json },
                )
                .await
            }

            Commands::Show { kind, id, json } => cmd_show(kind, id, OutputOptions { json }).await,

            Commands::Record { action } => match action {
                RecordAction::Add { fields, json } => {
                    cmd_record_add(fields.into(), OutputOptions { json }).await
                }
                RecordAction::Edit { id, fields, json } => {
                    cmd_record_edit(id, fields.into(), OutputOptions { json }).await
                }
            },

            Commands::Delete {
                kind,
                id,
                yes,
                json,
            } => cmd_delete(DeleteOptions { kind, id, yes }, OutputOptions { json }).await,

            Commands::Login {
                email,
                password,
                json,
            } => cmd_login(&email, password.as_deref(), OutputOptions { json }).await,
            Commands::Logout { json } => cmd_logout(OutputOptions { json }).await,
            Commands::Whoami { json } => cmd_whoami(OutputOptions { json }).await,

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(OutputOptions { json }),
                ConfigAction::Set { key, value, json } => {
                    cmd_config_set(&key, &value, OutputOptions { json })
                }
                ConfigAction::Get { key, json } => cmd_config_get(&key, OutputOptions { json }),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "evcat", &mut io::stdout());
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse().map_err(|e: crate::error::CatalogError| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortDirection, String> {
    s.parse().map_err(|e: crate::error::CatalogError| e.to_string())
}

fn parse_item_id(s: &str) -> Result<ItemId, String> {
    s.parse().map_err(|e: crate::error::CatalogError| e.to_string())
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((category, value)) if !category.trim().is_empty() && !value.trim().is_empty() => {
            Ok((category.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(crate::error::CatalogError::InvalidFilter(s.to_string()).to_string()),
    }
}

fn parse_date(s: &str) -> Result<Date, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
}

fn parse_time(s: &str) -> Result<Time, String> {
    let s = s.trim();
    let full = if s.matches(':').count() == 1 {
        format!("{s}:00")
    } else {
        s.to_string()
    };
    full.parse()
        .map_err(|_| format!("Invalid time '{s}'. Expected HH:MM or HH:MM:SS"))
}

fn parse_page(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(format!("Invalid page '{s}'. Must be a number starting at 1")),
    }
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let size = s
        .parse::<usize>()
        .map_err(|_| format!("Invalid page size '{s}'. Must be 10, 20, 50 or 100"))?;
    validate_page_size(size).map_err(|e| e.to_string())
}
