use anyhow::Context;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    manifest: Option<String>,
    assets: Option<PathBuf>,
    null_audio: bool,
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    init_logging(args.verbose)?;

    let mut settings = tapedeck::config::load_settings()?;
    if let Some(manifest) = args.manifest {
        settings.manifest = manifest;
    }
    if let Some(assets) = args.assets {
        settings.asset_root = assets;
    }
    settings.null_audio |= args.null_audio;

    tapedeck::app::run(settings)
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use simplelog::{Config, LevelFilter, WriteLogger};

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    tapedeck::config::ensure_config_dir()?;
    let path = tapedeck::config::log_path()?;
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    WriteLogger::init(level, Config::default(), file).context("failed to initialise logging")?;

    log::info!("tapedeck starting (log level: {level:?})");
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--manifest" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--manifest requires a path");
                };
                out.manifest = Some(value.trim().to_string());
            }
            "--assets" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--assets requires a directory");
                };
                out.assets = Some(PathBuf::from(value.trim()));
            }
            "--null" => out.null_audio = true,
            "-v" | "--verbose" => out.verbose = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("Tapedeck");
    println!("  --manifest path   Track list, relative to the asset root");
    println!("  --assets dir      Directory assets are read from");
    println!("  --null            Run without audio output");
    println!("  --verbose         Debug logging");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn overrides_are_parsed() {
        let parsed = parse_args(args(&["--manifest", "list.json", "--null", "-v"])).expect("parse");
        assert_eq!(parsed.manifest.as_deref(), Some("list.json"));
        assert!(parsed.null_audio);
        assert!(parsed.verbose);
    }

    #[test]
    fn missing_value_and_unknown_flags_fail() {
        assert!(parse_args(args(&["--assets"])).is_err());
        assert!(parse_args(args(&["--host"])).is_err());
    }
}
