#![allow(clippy::print_stdout)]

mod console;

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use smartcity_client_core::transport::{DEVICES_PATH, ReqwestTransport, get_json};
use smartcity_client_core::{ClientConfig, ClientContext, ClientHost, CommandResult, MemoryStorage};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsolePage, TokioEventLoop};

#[derive(Parser)]
#[command(name = "smartcity-ctl")]
#[command(about = "Drive the smart city backend through the dashboard client layer")]
struct Cli {
    /// Backend origin; defaults to SMARTCITY_API_BASE_URL.
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an action to a device.
    Device(DeviceArgs),
    /// Run a named routine.
    Routine(RoutineArgs),
    /// Submit a payment in USD.
    Pay(PayArgs),
    /// Fetch dashboard statistics once, or keep polling with --watch.
    Stats(StatsArgs),
    /// Report how many notifications are pending.
    Notifications,
    /// List the devices the backend knows about.
    Devices,
}

#[derive(Args)]
struct DeviceArgs {
    device_id: String,
    action: String,
}

#[derive(Args)]
struct RoutineArgs {
    routine_type: String,
}

#[derive(Args)]
struct PayArgs {
    amount: String,
    #[arg(long = "type", default_value = "fiat")]
    kind: String,
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Args)]
struct StatsArgs {
    #[arg(long)]
    watch: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let local = tokio::task::LocalSet::new();
    match local.run_until(run(cli)).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(api_base: Option<&str>) -> Result<ClientConfig> {
    match api_base {
        Some(api_base) => ClientConfig::with_base_url(api_base).context("invalid --api-base"),
        None => ClientConfig::from_env().context("invalid SMARTCITY_* environment"),
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = resolve_config(cli.api_base.as_deref())?;
    let transport = ReqwestTransport::new(&config)
        .context("an absolute backend origin is required (--api-base or SMARTCITY_API_BASE_URL)")?;
    let page = match &cli.command {
        Commands::Stats(StatsArgs { watch: true }) => Rc::new(ConsolePage::watching()),
        _ => Rc::new(ConsolePage::new()),
    };
    let host = ClientHost {
        page: page.clone(),
        event_loop: Rc::new(TokioEventLoop),
        storage: Rc::new(MemoryStorage::new()),
        transport: Rc::new(transport),
    };
    let context = ClientContext::new(config, host);
    run_command(&context, &page, cli.command).await
}

/// Returns whether the command succeeded.
async fn run_command(
    context: &ClientContext,
    page: &ConsolePage,
    command: Commands,
) -> Result<bool> {
    match command {
        Commands::Device(args) => {
            let result = context
                .dispatcher
                .control_device(&args.device_id, &args.action)
                .await;
            print_result(&result)
        }
        Commands::Routine(args) => {
            let result = context.dispatcher.execute_routine(&args.routine_type).await;
            print_result(&result)
        }
        Commands::Pay(args) => {
            let result = context
                .dispatcher
                .process_payment(&args.amount, &args.kind, &args.description)
                .await;
            print_result(&result)
        }
        Commands::Stats(args) => {
            if args.watch {
                context.poller.start();
                tokio::signal::ctrl_c()
                    .await
                    .context("failed to listen for ctrl-c")?;
                return Ok(true);
            }
            let applied = context.poller.refresh_now().await;
            for (key, text) in page.stats() {
                println!("{key}: {text}");
            }
            Ok(applied)
        }
        Commands::Notifications => Ok(context
            .shortcuts
            .show_pending_notifications()
            .await
            .is_some()),
        Commands::Devices => {
            let devices: Value = get_json(context.transport.as_ref(), DEVICES_PATH)
                .await
                .context("failed to list devices")?;
            println!("{}", serde_json::to_string_pretty(&devices)?);
            Ok(true)
        }
    }
}

fn print_result(result: &CommandResult) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(result.success)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smartcity_client_core::testing::{ManualEventLoop, ScriptedTransport};

    use super::*;

    fn context_with(transport: &Rc<ScriptedTransport>, page: &Rc<ConsolePage>) -> ClientContext {
        let host = ClientHost {
            page: page.clone(),
            event_loop: Rc::new(ManualEventLoop::new()),
            storage: Rc::new(MemoryStorage::new()),
            transport: transport.clone(),
        };
        ClientContext::new(ClientConfig::default(), host)
    }

    #[test]
    fn parses_payment_flags() {
        let cli = Cli::try_parse_from([
            "smartcity-ctl",
            "--api-base",
            "http://127.0.0.1:5000",
            "pay",
            "12.5",
            "--type",
            "crypto",
            "--description",
            "Transit pass",
        ])
        .expect("cli parses");
        assert_eq!(cli.api_base.as_deref(), Some("http://127.0.0.1:5000"));
        assert!(matches!(
            &cli.command,
            Commands::Pay(args)
                if args.amount == "12.5"
                    && args.kind == "crypto"
                    && args.description == "Transit pass"
        ));
    }

    #[test]
    fn rejects_relative_api_base() {
        assert!(resolve_config(Some("localhost:5000")).is_err());
        assert!(resolve_config(Some("http://localhost:5000/")).is_ok());
    }

    #[tokio::test]
    async fn device_command_reports_dispatch_outcome() {
        let transport = Rc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"success": true}));
        transport.push_json(400, json!({"error": "Invalid action"}));
        let page = Rc::new(ConsolePage::new());
        let context = context_with(&transport, &page);

        let on = Commands::Device(DeviceArgs {
            device_id: "SL001".to_string(),
            action: "on".to_string(),
        });
        assert!(run_command(&context, &page, on).await.expect("run"));

        let blink = Commands::Device(DeviceArgs {
            device_id: "SL001".to_string(),
            action: "blink".to_string(),
        });
        assert!(!run_command(&context, &page, blink).await.expect("run"));
    }

    #[tokio::test]
    async fn stats_command_collects_stat_values() {
        let transport = Rc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"total_devices": 4, "uptime_formatted": "0:10:00"}));
        let page = Rc::new(ConsolePage::new());
        let context = context_with(&transport, &page);

        let stats = Commands::Stats(StatsArgs { watch: false });
        assert!(run_command(&context, &page, stats).await.expect("run"));
        assert_eq!(page.stats().get("total_devices").map(String::as_str), Some("4"));
    }

    #[tokio::test]
    async fn devices_command_propagates_http_errors() {
        let transport = Rc::new(ScriptedTransport::new());
        transport.push_json(500, json!({"error": "Internal server error"}));
        let page = Rc::new(ConsolePage::new());
        let context = context_with(&transport, &page);

        assert!(run_command(&context, &page, Commands::Devices).await.is_err());
    }
}
