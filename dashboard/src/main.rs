//! pm-dashboard: command-line access to the project-management dashboard
//!
//! Loads a dataset (a JSON/YAML file, or the built-in sample data) and prints
//! dashboard views as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use dashboard::{
    BudgetCard, ContractCard, Dashboard, DashboardConfig, DataSource, FileSource, StaticSource,
};
use finance::FinanceSummary;
use portfolio::{ProjectFilter, ProjectStatus, ProjectType, Selection};

/// Crates whose events honour the configured log level.
const LOG_TARGETS: &[&str] = &["pm_dashboard", "dashboard", "hierarchy", "portfolio", "finance"];

#[derive(Debug, Parser)]
#[command(name = "pm-dashboard")]
#[command(about = "Project, role and finance views for the project-management dashboard")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pm-dashboard.yaml")]
    config: PathBuf,

    /// Dataset file (overrides config file)
    #[arg(short, long, env = "PM_DASHBOARD_DATA")]
    data: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(long, env = "PM_DASHBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Headline numbers across roles, projects and finance
    Summary,
    /// The role tree as rendered rows
    Roles {
        /// Show only roles whose name or description contains this text
        #[arg(long)]
        search: Option<String>,
        /// Role ids to show collapsed
        #[arg(long)]
        collapse: Vec<String>,
    },
    /// Projects passing the filter, with derived figures
    Projects {
        /// Text to look for in name, description or client
        #[arg(long, default_value = "")]
        search: String,
        /// Project status, or "all"
        #[arg(long, default_value = "all")]
        status: Selection<ProjectStatus>,
        /// Project type, or "all"
        #[arg(long = "type", default_value = "all")]
        project_type: Selection<ProjectType>,
    },
    /// Budget and contract cards with the finance summary
    Finance,
}

#[derive(Serialize)]
struct FinanceView<'a> {
    summary: FinanceSummary,
    budgets: Vec<BudgetCard<'a>>,
    contracts: Vec<ContractCard<'a>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load or create default config
    let mut config = DashboardConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(data) = cli.data {
        config.general.data_path = Some(data);
    }

    // Initialize tracing
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{}={}", target, config.general.log_level).parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(config = %cli.config.display(), "Starting pm-dashboard");

    let source: Box<dyn DataSource> = match &config.general.data_path {
        Some(path) => Box::new(FileSource::new(path.clone())?),
        None => {
            info!("No dataset configured, using sample data");
            Box::new(StaticSource::sample()?)
        }
    };
    info!(source = %source.describe(), "Loading dataset");

    let mut dashboard = Dashboard::new(source.load().await?, &config)?;
    println!("{}", render(&mut dashboard, cli.command)?);
    Ok(())
}

/// Apply a subcommand's view options and serialize the resulting view.
fn render(dashboard: &mut Dashboard, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::Summary => serde_json::to_string_pretty(&dashboard.overview())?,
        Command::Roles { search, collapse } => {
            let view = dashboard.role_view_mut();
            for id in &collapse {
                if view.is_expanded(id) {
                    view.toggle(id);
                }
            }
            if let Some(term) = search {
                view.set_search_term(term);
            }
            serde_json::to_string_pretty(&dashboard.role_rows())?
        }
        Command::Projects {
            search,
            status,
            project_type,
        } => {
            dashboard.set_project_filter(ProjectFilter {
                search_term: search,
                status,
                project_type,
            });
            serde_json::to_string_pretty(&dashboard.visible_projects())?
        }
        Command::Finance => {
            let view = FinanceView {
                summary: dashboard.overview().finance,
                budgets: dashboard.budget_cards(),
                contracts: dashboard.contract_cards(),
            };
            serde_json::to_string_pretty(&view)?
        }
    };
    Ok(output)
}
