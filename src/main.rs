use std::path::PathBuf;

use anyhow::Context;
use cakekit::settings::default_config_path;
use cakekit::{init_logging, parse_script, Config, Workbench, BUILD_DATE, VERSION};

const USAGE: &str = "usage: cakekit <script.json> [--restore-local] [--save-local]";

struct Args {
    script: PathBuf,
    restore_local: bool,
    save_local: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut script = None;
    let mut restore_local = false;
    let mut save_local = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--restore-local" => restore_local = true,
            "--save-local" => save_local = true,
            "--version" => {
                println!("cakekit {} ({})", VERSION, BUILD_DATE);
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => anyhow::bail!("unknown flag {flag}\n{USAGE}"),
            path if script.is_none() => script = Some(PathBuf::from(path)),
            extra => anyhow::bail!("unexpected argument {extra}\n{USAGE}"),
        }
    }

    Ok(Args {
        script: script.context(USAGE)?,
        restore_local,
        save_local,
    })
}

fn load_config() -> anyhow::Result<Config> {
    let path = match std::env::var_os("CAKEKIT_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };
    Config::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = load_config()?;
    init_logging(&config.logging)?;

    let bench = Workbench::from_config(config)?;
    let loader = bench.coordinator(std::sync::Arc::new(
        cakekit::designer::MemoryDesignStore::new(),
    ));

    if args.restore_local {
        let restored = loader
            .restore_local(bench.local_store())
            .context("failed to restore the local design")?;
        tracing::info!("Local design restored: {}", restored);
    }

    let body = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let report = bench.replay(&parse_script(&body)?);
    tracing::info!(
        "Replayed {} actions ({} ignored)",
        report.applied,
        report.ignored
    );

    if args.save_local {
        loader
            .save_local(bench.local_store())
            .context("failed to save the design locally")?;
    }

    let output = serde_json::json!({
        "report": report,
        "history": {
            "length": bench.session().history_len(),
            "currentIndex": bench.session().with_state(|s| s.history.current_index_signed()),
        },
        "snapshot": bench.session().snapshot(),
        "quote": bench.quote(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
