//! `gsafe` - CLI for groundsafe
//!
//! This binary renders the ground-safety case catalog and the statistics
//! dashboard from a catalog document.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use groundsafe::cli::{CardsCommand, Cli, Command, ConfigCommand, DashboardCommand, OutputFormat};
use groundsafe::stats::build_dashboard_with;
use groundsafe::view::{card_to_text, dashboard_to_text};
use groundsafe::{init_logging, CardPresenter, Catalog, Config, Dataset, FsImageLoader, ImageLoader};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(path) = cli.dataset.clone() {
        config.dataset.path = Some(path);
    }

    match cli.command {
        Command::Cards(cmd) => handle_cards(&config, &cmd),
        Command::Dashboard(cmd) => handle_dashboard(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn load_dataset(config: &Config) -> anyhow::Result<Dataset> {
    let path = config.dataset_path();
    Dataset::load(&path).with_context(|| format!("cannot open catalog {}", path.display()))
}

fn handle_cards(config: &Config, cmd: &CardsCommand) -> anyhow::Result<()> {
    let dataset = load_dataset(config)?;
    let catalog = Catalog::new(dataset.cases);

    let records = match cmd.id {
        Some(id) => vec![catalog.get(id)?],
        None => catalog.search(&cmd.filter()),
    };

    let loader: Option<Arc<dyn ImageLoader>> = cmd
        .assets
        .clone()
        .or_else(|| config.dataset.asset_root.clone())
        .map(|root| Arc::new(FsImageLoader::new(root)) as Arc<dyn ImageLoader>);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    let mut cards = Vec::with_capacity(records.len());
    for record in records {
        let mut presenter = CardPresenter::with_rules(record.clone(), config.display_rules());
        presenter.render(&cmd.query);
        if let Some(loader) = &loader {
            runtime.block_on(presenter.load_images(Arc::clone(loader)));
            presenter.drain_signals();
        }
        cards.push(presenter.render(&cmd.query));
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No matching cases.");
            }
            for card in &cards {
                println!("{}", card_to_text(card));
            }
        }
    }
    Ok(())
}

fn handle_dashboard(config: &Config, cmd: &DashboardCommand) -> anyhow::Result<()> {
    let dataset = load_dataset(config)?;
    let view = build_dashboard_with(&dataset.yearly, &dataset.airports, &config.dashboard_options());

    match cmd.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "goals": dataset.goals,
                "findings": dataset.findings,
                "dashboard": view,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => print!(
            "{}",
            dashboard_to_text(&view, &dataset.findings, &dataset.goals)
        ),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Dataset]");
                println!("  Catalog path:       {}", config.dataset_path().display());
                match &config.dataset.asset_root {
                    Some(root) => println!("  Asset root:         {}", root.display()),
                    None => println!("  Asset root:         (images not probed)"),
                }
                println!();
                println!("[Display]");
                println!("  Company max chars:  {}", config.display.company_max_chars);
                println!("  Ellipsis:           {}", config.display.ellipsis);
                println!("  Airport suffix:     {}", config.display.airport_suffix);
                println!();
                println!("[Dashboard]");
                println!("  Trailing years:     {}", config.dashboard.trailing_years);
                println!("  Rate precision:     {}", config.dashboard.rate_precision);
                println!(
                    "  Ring radii:         {} / {}",
                    config.dashboard.inner_radius, config.dashboard.outer_radius
                );
                println!("  Padding angle:      {}", config.dashboard.padding_angle);
                println!("  Label offset:       {}", config.dashboard.label_offset);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
