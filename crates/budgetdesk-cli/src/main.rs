//! budgetdesk - terminal front-end for the budget/procurement console.

mod terminal;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use budgetdesk_core::cache::Selector;
use budgetdesk_core::config::Config;
use budgetdesk_core::models::{compute_ttc, Category, PurchaseOrderFilter};
use budgetdesk_core::utils::format_amount_value;
use budgetdesk_core::{Console, View};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use terminal::TerminalSink;

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser)]
#[command(name = "budgetdesk")]
#[command(about = "Budget and procurement console", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session credential
    Login {
        #[arg(long, env = "BUDGETDESK_LOGIN")]
        login: Option<String>,
        #[arg(long, env = "BUDGETDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the reference data behind every selector
    Refs,
    /// KPIs and contract alerts
    Dashboard,
    /// Purchase orders, optionally filtered
    Orders {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        entity: Option<i64>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Allocate a validated purchase order to a budget line
    Impute { order: i64, line: i64 },
    /// Budget lines with their voted, committed and balance amounts
    Lines {
        #[arg(long)]
        budget: Option<i64>,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Contracts and their renewal alerts
    Contracts,
    /// Unread and read notifications
    Notifications,
    /// Inclusive-of-tax amount for a pre-tax amount and a VAT rate
    Ttc { ht: f64, vat: f64 },
}

// ============================================================================
// Logging
// ============================================================================

/// `RUST_LOG` filter (default `warn`) to stderr, plus a daily file when a
/// log directory is configured. The guard must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "budgetdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;
    let _guard = init_tracing(config.log_dir.as_deref());
    info!(api_root = %config.api_root(), "budgetdesk starting");

    let command = match cli.command {
        Commands::Ttc { ht, vat } => {
            println!("{} €", format_amount_value(compute_ttc(ht, vat)));
            return Ok(());
        }
        command => command,
    };

    let sink = Arc::new(TerminalSink::default());
    let mut console = Console::connect(config, sink.clone())?;

    match command {
        Commands::Login { login, password } => {
            login_command(&mut console, login, password).await?;
        }
        Commands::Logout => {
            console.logout();
            println!("Déconnecté.");
        }
        command => {
            if !console.startup(Utc::now()).await {
                bail!("Aucune session valide");
            }
            run(&mut console, &sink, command).await?;
        }
    }

    info!("budgetdesk done");
    Ok(())
}

/// Commands that need a restored session.
async fn run(console: &mut Console, sink: &TerminalSink, command: Commands) -> Result<()> {
    match command {
        Commands::Whoami => {
            if let Some(user) = console.user() {
                println!("{}", user.display_name());
            }
        }
        Commands::Refs => print_references(console),
        Commands::Dashboard => show(console, sink, View::Dashboard).await?,
        Commands::Orders {
            status,
            entity,
            search,
        } => {
            sink.focus(View::PurchaseOrders);
            console
                .set_order_filter(PurchaseOrderFilter {
                    statut: status,
                    entite_id: entity,
                    search,
                })
                .await?;
        }
        Commands::Impute { order, line } => {
            console.show_view(View::PurchaseOrders).await?;
            console.open_allocation(order)?;
            console.select(Selector::AllocationLine, Some(line))?;
            console.confirm_allocation().await?;
        }
        Commands::Lines { budget, search } => {
            sink.focus(View::BudgetLines);
            console.set_line_filter(budget, &search).await?;
        }
        Commands::Contracts => show(console, sink, View::Contracts).await?,
        Commands::Notifications => show(console, sink, View::Notifications).await?,
        Commands::Login { .. } | Commands::Logout | Commands::Ttc { .. } => {}
    }
    Ok(())
}

async fn show(console: &mut Console, sink: &TerminalSink, view: View) -> Result<()> {
    sink.focus(view);
    console.show_view(view).await?;
    Ok(())
}

async fn login_command(
    console: &mut Console,
    login: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let login = match login.or_else(|| console.config().last_login.clone()) {
        Some(login) => login,
        None => bail!("Identifiant requis (--login ou BUDGETDESK_LOGIN)"),
    };
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Mot de passe pour {}: ", login))?,
    };

    let user = console.login(&login, &password).await?;
    console.config().save()?;
    println!("Connecté : {}", user.display_name());
    Ok(())
}

fn print_references(console: &Console) {
    let snapshot = console.references();
    for category in Category::ALL {
        println!("{} ({})", category, snapshot.len(category));
        for option in snapshot.options(category) {
            println!("  {:>5}  {}", option.id, option.label);
        }
    }
}
