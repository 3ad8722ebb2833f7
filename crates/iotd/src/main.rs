mod cli;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use iotd_core::kernel::constants;
use iotd_core::{DataServer, GetterCatalog, PluginSystemError, ServerSettings};

use crate::cli::{CliArgs, DumpFormat};

/// Every getter type this binary ships with
fn build_catalog() -> Result<GetterCatalog, PluginSystemError> {
    let mut catalog = GetterCatalog::new();
    getter_simulated::register(&mut catalog)?;
    getter_static::register(&mut catalog)?;
    Ok(catalog)
}

fn dump(server: &DataServer, format: DumpFormat) -> Result<String, Box<dyn std::error::Error>> {
    let frontend = server.frontend();
    Ok(match format {
        DumpFormat::Json => serde_json::to_string_pretty(&frontend.nodes_object()?)?,
        DumpFormat::Markup => frontend.nodes_markup()?,
    })
}

async fn run_until_ctrl_c(server: &DataServer) {
    let sweep = server
        .settings()
        .stale_after_secs
        .map(|secs| Duration::from_secs(secs.max(1)));
    info!("{} running, press Ctrl-C to stop", constants::APP_NAME);

    match sweep {
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => {
                        server.sweep_stale();
                    }
                }
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
        }
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = logging::init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut settings = match ServerSettings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings from {}: {}", args.config.display(), e);
            return ExitCode::from(2);
        }
    };
    args.apply_overrides(&mut settings);

    let catalog = match build_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to build getter catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Available getter types: {}", catalog.type_names().join(", "));

    let server = DataServer::new(settings, catalog);
    if !server.start().await {
        return ExitCode::FAILURE;
    }
    if let Some(report) = server.last_report() {
        for failure in &report.failures {
            warn!("{}", failure);
        }
    }

    let mut code = ExitCode::SUCCESS;
    if args.once {
        tokio::time::sleep(Duration::from_millis(args.dump_after_ms)).await;
        match dump(&server, args.format) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to dump nodes: {}", e);
                code = ExitCode::FAILURE;
            }
        }
    } else {
        run_until_ctrl_c(&server).await;
    }

    if !server.stop().await {
        warn!("Some getters did not stop cleanly");
    }
    code
}
