// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use unit_data_converter::backends::wasm::WasmEngineLoader;
use unit_data_converter::config::{load_config, Config};
use unit_data_converter::engine::{
    AttemptReport, ConverterView, FloatingFormat, PrecisionMode, RequestCoordinator, UnitType,
};

const HELP: &str = "\
Type a value to convert it. Commands:
  :unit <Byte|KiB|MiB|GiB|TiB>   input unit
  :format <scientific|decimal>   output notation
  :precision <auto|custom>       precision mode
  :slider <0-10>                 custom precision digits
  :clear                         reset everything
  :show                          print the current state
  :quit                          exit";

fn print_view(view: &ConverterView) {
    println!("input: \"{}\"", view.input_text);
    if !view.error_message.is_empty() {
        println!("error: {}", view.error_message);
    }
    for unit in UnitType::ALL {
        println!("  {:>4}: {}", unit, view.output(unit));
    }
}

fn print_report(report: &AttemptReport) {
    if let AttemptReport::Superseded = report {
        println!("(superseded by a newer request)");
    }
}

/// Apply one `:command`. Returns false when the session should end.
async fn run_command(coordinator: &RequestCoordinator, line: &str) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().unwrap_or_default();

    match command {
        ":quit" | ":q" => return Ok(false),
        ":help" => println!("{}", HELP),
        ":show" => print_view(&coordinator.view().await),
        ":clear" => {
            coordinator.clear().await;
            print_view(&coordinator.view().await);
        }
        ":unit" => {
            let unit: UnitType = argument.parse().map_err(|e: String| anyhow!(e))?;
            print_report(&coordinator.set_unit(unit).await);
            print_view(&coordinator.view().await);
        }
        ":format" => {
            let format: FloatingFormat = argument.parse().map_err(|e: String| anyhow!(e))?;
            print_report(&coordinator.set_format(format).await);
            print_view(&coordinator.view().await);
        }
        ":precision" => {
            let mode = match argument.to_ascii_lowercase().as_str() {
                "auto" => PrecisionMode::Auto,
                "custom" => PrecisionMode::Custom,
                other => return Err(anyhow!("unknown precision mode '{}', expected auto or custom", other)),
            };
            print_report(&coordinator.set_precision_mode(mode).await);
            print_view(&coordinator.view().await);
        }
        ":slider" => {
            let value: i32 = argument
                .parse()
                .with_context(|| format!("slider value '{}' is not a number", argument))?;
            print_report(&coordinator.commit_precision_slider(value).await);
            print_view(&coordinator.view().await);
        }
        other => return Err(anyhow!("unknown command '{}', try :help", other)),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => load_config(path).with_context(|| format!("loading config {}", path))?,
        None => Config::default(),
    };

    let loader = WasmEngineLoader::new(config.module_path.clone(), config.wasm.fuel.effective());
    let coordinator = RequestCoordinator::new(
        Arc::new(loader),
        config.defaults.to_settings(),
        config.debounce(),
    );

    println!("Unit data converter ({})", config.module_path.display());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.starts_with(':') {
            match run_command(&coordinator, line).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("❌ {:#}", e),
            }
            continue;
        }

        let pending = coordinator.edit(line).await;
        match pending.await {
            Ok(Some(report)) => print_report(&report),
            Ok(None) => {}
            Err(e) => eprintln!("❌ Conversion task failed: {}", e),
        }
        print_view(&coordinator.view().await);
    }

    Ok(())
}
