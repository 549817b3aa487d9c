// Binary entry point: drives the reminder engine against a vault on disk.
use anyhow::{Context, Result, bail};
use dayplan::cli::{self, Command};
use dayplan::clock::SystemClock;
use dayplan::config::{Config, ReminderStyle};
use dayplan::context::{AppContext, SharedContext, StandardContext};
use dayplan::controller::ReminderController;
use dayplan::index::{MarkdownIndex, TaskIndex};
use dayplan::logging::init_logging;
use dayplan::reminder::{render_reminder, status_label};
use dayplan::storage::FsVault;
use std::env;
use std::sync::Arc;
use strum::IntoEnumIterator;

#[tokio::main]
async fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match cli::parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("Run 'dayplan --help' for usage.");
            std::process::exit(2);
        }
    };
    if args.command == Command::Help {
        cli::print_help("dayplan");
        return Ok(());
    }

    let ctx: SharedContext = Arc::new(StandardContext::new(args.root.clone()));
    init_logging(ctx.as_ref(), args.verbose)?;
    let config = Config::load_or_default(ctx.as_ref())?;

    if args.command == Command::Config {
        print_config(ctx.as_ref(), &config)?;
        return Ok(());
    }

    let Some(vault_root) = args.vault.clone().or_else(|| config.vault_path.clone()) else {
        bail!("No vault given: pass --vault <dir> or set 'vault_path' in the config");
    };
    if !vault_root.is_dir() {
        bail!("Vault directory not found: {}", vault_root.display());
    }

    let vault = Arc::new(FsVault::new(vault_root));
    let index: Arc<dyn TaskIndex> = Arc::new(MarkdownIndex::new(vault.clone()));
    let controller = ReminderController::new(
        config,
        vault,
        Some(index),
        Arc::new(SystemClock),
        Some(ctx.clone()),
    );

    match args.command {
        Command::Today { json } => {
            let result = controller.get_task_data().await;
            let pending = controller.get_pending_recurring_tasks().await;
            if json {
                let out = serde_json::json!({ "result": result, "pending": pending });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", render_reminder(&result, &pending, controller.today()));
                if controller.config().await.show_status_bar {
                    println!("\n{}", status_label(&result));
                }
            }
        }
        Command::Remind { force } => {
            let outcome = controller.show_reminder(force).await?;
            if outcome.show_notice {
                println!("{}", outcome.notice);
            }
            if outcome.show_modal {
                print!(
                    "{}",
                    render_reminder(&outcome.result, &outcome.pending, controller.today())
                );
            }
            if !outcome.show_notice && !outcome.show_modal {
                log::info!("Nothing to remind about");
            }
        }
        Command::Add { text, date } => {
            let note = controller.add_task(&text, date).await?;
            if let Some(warning) = &note.warning {
                eprintln!("⚠️ {}", warning);
            }
            println!("✅ Added to {}", note.path);
        }
        Command::Move { path, line, date } => {
            let result = controller
                .move_line(&path, line, date)
                .await
                .context("Move failed")?;
            println!("✅ Moved to {}", result.to_path);
            if let Some(warning) = result.error {
                eprintln!("⚠️ {}", warning);
            }
        }
        Command::Generate => {
            let count = controller.generate_pending().await?;
            println!("✅ Generated {} recurring task(s)", count);
        }
        Command::Pending => {
            for task in controller.get_pending_recurring_tasks().await {
                println!("{}\t{}\t{}", task.name, task.periodicity, task.trigger);
            }
        }
        Command::Config | Command::Help => {}
    }

    Ok(())
}

fn print_config(ctx: &dyn AppContext, config: &Config) -> Result<()> {
    println!("Config file: {}", Config::get_path_string(ctx)?);
    if let Some(log) = ctx.get_log_path() {
        println!("Log file:    {}", log.display());
    }
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    println!();
    let styles: Vec<String> = ReminderStyle::iter().map(|s| s.to_string()).collect();
    println!("# reminder_style is one of: {}", styles.join(", "));
    Ok(())
}
