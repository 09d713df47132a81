//! Deckhand - Android device provisioning over adb
//!
//! Usage:
//!   deckhand detect                      # Show device facts
//!   deckhand debloat --level standard    # Remove preinstalled packages
//!   deckhand apps --set default          # Install an app set
//!   deckhand config --device auto        # Apply a settings profile
//!   deckhand provision                   # All of the above, interactively

mod interactive;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckhand_core::commands::{
    self, AppsCommand, DebloatCommand, DebloatOptions, DetectCommand, ProvisionCommand,
    ProvisionReport, SettingsCommand,
};
use deckhand_core::debloat::Tier;
use deckhand_core::device::DeviceProfile;
use deckhand_core::exec::{InstallOutcome, RunSummary};
use deckhand_core::prelude::{AppContext, RunOptions};

use crate::interactive::{InteractiveFlow, PrefilledOptions};

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Android device provisioning over adb", long_about = None)]
struct Cli {
    /// Path to deckhand.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serial of the device to use (overrides the configured one)
    #[arg(long, short, global = true)]
    serial: Option<String>,

    /// Show what would change without touching the device
    #[arg(long, global = true)]
    dry_run: bool,

    /// Skip confirmations and bypass download caches
    #[arg(long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show facts about the connected device
    Detect {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove preinstalled packages
    Debloat {
        /// Tier (light, standard, aggressive); defaults to the suggested tier
        #[arg(long, short)]
        level: Option<Tier>,

        /// Also remove the Google services list
        #[arg(long)]
        degoogle: bool,
    },

    /// Install an app set
    Apps {
        /// App set name (file stem under apps/sets)
        #[arg(long)]
        set: Option<String>,

        /// Print the resolved entries without installing
        #[arg(long, requires = "set")]
        preview: bool,

        /// List available app sets
        #[arg(long, conflicts_with_all = ["set", "preview"])]
        list: bool,
    },

    /// Apply a device settings profile
    Config {
        /// Profile name under settings/, or "auto" for the detected device
        #[arg(long, default_value = "auto")]
        device: String,
    },

    /// Detect, debloat, install apps and apply settings in one run
    Provision,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deckhand=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run_cli(cli)
}

fn run_cli(cli: Cli) -> Result<()> {
    let ctx = AppContext::with_defaults(cli.config)?;
    if let Some(path) = ctx.config_path() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let run = RunOptions::new(cli.dry_run, cli.force);
    let serial = cli.serial.as_deref();

    match cli.command {
        Commands::Detect { format } => run_detect(&ctx, serial, format),
        Commands::Debloat { level, degoogle } => run_debloat(&ctx, serial, level, degoogle, run),
        Commands::Apps { set, preview, list } => run_apps(&ctx, serial, set, preview, list, run),
        Commands::Config { device } => run_config(&ctx, serial, &device, run),
        Commands::Provision => run_provision(&ctx, serial, run),
    }
}

fn run_detect(ctx: &AppContext, serial: Option<&str>, format: OutputFormat) -> Result<()> {
    let session = commands::connect(ctx, serial)?;
    let profile = DetectCommand::new(ctx).execute(&session)?;

    match format {
        OutputFormat::Table => print_profile(&profile),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
    }
    Ok(())
}

fn run_debloat(
    ctx: &AppContext,
    serial: Option<&str>,
    level: Option<Tier>,
    degoogle: bool,
    run: RunOptions,
) -> Result<()> {
    let session = commands::connect(ctx, serial)?;
    let profile = DetectCommand::new(ctx).execute(&session)?;

    let tier = level.unwrap_or(profile.suggested_tier);
    let options = DebloatOptions::new(tier.to_string())
        .with_vendor(profile.manufacturer.clone())
        .with_degoogle(degoogle);

    let command = DebloatCommand::new(ctx);
    let plan = command.plan(&options)?;

    println!(
        "Tier: {}  Vendor: {}  Degoogle: {}",
        style(plan.tier).cyan(),
        style(&profile.vendor).cyan(),
        if plan.degoogle { "yes" } else { "no" }
    );
    if plan.packages.is_empty() {
        println!("Nothing to remove.");
        return Ok(());
    }
    println!("{} packages selected", plan.packages.len());

    if !confirm(
        &format!("Remove up to {} packages from {}?", plan.packages.len(), profile.model),
        run,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    let summary = command.execute(&session, &plan, run)?;
    print_summary("Debloat", "removed", &summary);
    Ok(())
}

fn run_apps(
    ctx: &AppContext,
    serial: Option<&str>,
    set: Option<String>,
    preview: bool,
    list: bool,
    run: RunOptions,
) -> Result<()> {
    let command = AppsCommand::new(ctx);

    if list {
        let sets = command.list_sets()?;
        if sets.is_empty() {
            println!("No app sets found in {}", ctx.layout().app_sets_dir().display());
        } else {
            for name in sets {
                println!("{name}");
            }
        }
        return Ok(());
    }

    let Some(set) = set else {
        anyhow::bail!("Specify an app set with --set <name>, or --list to see available sets");
    };
    let plan = command.plan(&set)?;

    if preview {
        println!("App set '{}' ({} entries):", plan.set, plan.entries.len());
        for entry in &plan.entries {
            println!("  {entry}");
        }
        return Ok(());
    }

    let session = commands::connect(ctx, serial)?;
    println!("App set '{}': {} entries", plan.set, plan.entries.len());
    if !confirm(
        &format!("Install {} apps on {}?", plan.entries.len(), session.serial()),
        run,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    let outcome = command.execute(&session, &plan, run)?;
    print_install_outcome(&outcome);
    Ok(())
}

fn run_config(ctx: &AppContext, serial: Option<&str>, device: &str, run: RunOptions) -> Result<()> {
    let session = commands::connect(ctx, serial)?;
    let profile = if device == commands::settings::AUTO_PROFILE {
        Some(DetectCommand::new(ctx).execute(&session)?)
    } else {
        None
    };

    let command = SettingsCommand::new(ctx);
    let plan = command.plan(device, profile.as_ref())?;
    println!(
        "Settings profile '{}': {} values",
        style(&plan.profile).cyan(),
        plan.pokes.len()
    );

    let summary = command.execute(&session, &plan, run);
    print_summary("Config", "applied", &summary);
    Ok(())
}

fn run_provision(ctx: &AppContext, serial: Option<&str>, run: RunOptions) -> Result<()> {
    let session = commands::connect(ctx, serial)?;
    let profile = DetectCommand::new(ctx).execute(&session)?;
    print_profile(&profile);

    let command = ProvisionCommand::new(ctx);
    let defaults = command.defaults(&profile)?;

    let plan = if run.force {
        defaults
    } else {
        let prefilled = PrefilledOptions {
            yes: run.dry_run,
            ..Default::default()
        };
        let app_sets = AppsCommand::new(ctx).list_sets()?;
        let result = InteractiveFlow::new(defaults, app_sets, prefilled).collect()?;
        if !result.confirmed {
            println!("Aborted.");
            return Ok(());
        }
        result.plan
    };

    let report = command.execute(&session, &profile, &plan, run)?;
    print_provision_report(&report);
    Ok(())
}

/// Ask before mutating the device. Forced and dry runs never ask.
fn confirm(prompt: &str, run: RunOptions) -> Result<bool> {
    if run.force || run.dry_run {
        return Ok(true);
    }
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(answer)
}

fn print_profile(profile: &DeviceProfile) {
    let sdk = profile
        .sdk
        .map(|sdk| format!(" (SDK {sdk})"))
        .unwrap_or_default();
    let rows = [
        ("Serial", profile.serial.clone()),
        ("Manufacturer", profile.manufacturer.clone()),
        ("Model", profile.model.clone()),
        ("Android", format!("{}{sdk}", profile.android_version)),
        ("Rooted", if profile.rooted { "yes" } else { "no" }.to_string()),
        ("Skin", profile.skin.to_string()),
        ("Vendor", profile.vendor.clone()),
        ("Suggested tier", profile.suggested_tier.to_string()),
        (
            "Settings profile",
            profile
                .suggested_settings
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];

    for (label, value) in rows {
        println!("  {:<17} {}", style(label).bold(), value);
    }
    println!();
}

fn print_summary(step: &str, verb: &str, summary: &RunSummary) {
    let marker = if summary.has_failures() {
        style("!").yellow()
    } else {
        style("✓").green()
    };
    println!("{marker} {step}: {}", summary.describe(verb));
    for failure in &summary.failures {
        println!("  {} {}", style("✗").red(), failure);
    }
}

fn print_install_outcome(outcome: &InstallOutcome) {
    for artifact in &outcome.artifacts {
        let digest = artifact.info.digest.get(..16).unwrap_or(&artifact.info.digest);
        println!(
            "  {} {}  {} bytes  blake3:{}",
            style("↓").cyan(),
            artifact.entry,
            artifact.info.size,
            digest
        );
    }
    print_summary("Apps", "installed", &outcome.summary);
}

fn print_provision_report(report: &ProvisionReport) {
    println!();
    print_summary("Debloat", "removed", &report.debloat);
    match &report.apps {
        Some(outcome) => print_install_outcome(outcome),
        None => println!("• Apps: skipped"),
    }
    match &report.settings {
        Some(summary) => print_summary("Config", "applied", summary),
        None => println!("• Config: skipped"),
    }
}
