use appkit::prelude::*;
use clap::{Parser, Subcommand};
use harness::{CheckCommand, CollectionHook, PolicyHooks, SetupHook, TestItem};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "harness")]
#[command(about = "Test classification, timeout policy, and static checks for scaffold projects")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Print planned actions without executing them
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify discovered tests and print the execution plan
    Classify {
        /// Directory to discover test sources under
        #[arg(short, long, default_value = "tests")]
        root: PathBuf,
        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the static-analysis checks (formatter and type checker)
    Check {
        /// Keep running remaining checks after a failure
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the effective configuration
    Config {
        /// Override a field, e.g. --set debug=true
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Emit the configuration as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let options = RuntimeOptions::new(cli.verbose, cli.quiet, cli.dry_run);
    let env = EnvSnapshot::capture();

    match cli.command {
        Commands::Classify { root, json } => classify(&root, json, &options, &env),
        Commands::Check { keep_going } => check(keep_going, &options),
        Commands::Config { set, json } => show_config(&set, json, &options, &env),
    }
}

fn classify(
    root: &Path,
    json: bool,
    options: &RuntimeOptions,
    env: &EnvSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    let hooks = PolicyHooks::from_env(env)?;

    let pattern = root.join("**/*.rs");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format!("root path is not valid UTF-8: {}", root.display()))?;

    let mut items = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(path = %path.display(), "discovered test source");
        items.push(TestItem::new(name, path));
    }

    let mut items = hooks.on_collect(items);
    for item in &mut items {
        hooks.on_setup(item);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if !options.quiet {
        if items.is_empty() {
            println!("No test sources found under {}", root.display());
        }
        for item in &items {
            let category = item.category.map(|c| c.label()).unwrap_or("unclassified");
            let timeout = item
                .timeout_override
                .or(item.timeout)
                .map(|secs| format!("{secs}s"))
                .unwrap_or_else(|| "none".to_string());
            println!(
                "{:<12} {:<40} timeout={:<8} [{}]",
                category,
                item.name,
                timeout,
                item.labels.join(", ")
            );
        }
    }

    Ok(())
}

fn check(keep_going: bool, options: &RuntimeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let checks = [CheckCommand::formatter(), CheckCommand::type_checker()];

    if options.dry_run {
        for check in &checks {
            println!("would run: {}", check.command_line());
        }
        return Ok(());
    }

    let mut failed = 0usize;
    for command in &checks {
        let report = command.run()?;
        if report.passed {
            if !options.quiet {
                println!("✓ {} passed", report.name);
            }
        } else {
            failed += 1;
            error!(check = %report.name, "check failed");
            eprintln!("✗ {} failed:\n{}", report.name, report.output);
            if !keep_going {
                break;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} static check(s) failed").into());
    }
    Ok(())
}

fn show_config(
    set: &[String],
    json: bool,
    options: &RuntimeOptions,
    env: &EnvSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = load_config(env);
    let config = base.with_overrides(&parse_overrides(set)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else if !options.quiet {
        println!("app_name: {}", config.app_name());
        println!("version:  {}", config.version());
        println!("debug:    {}", config.debug());
    }

    Ok(())
}

/// Parse `field=value` pairs; values are JSON, with bare words falling back
/// to plain strings so `--set app_name=myapp` works unquoted.
fn parse_overrides(set: &[String]) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    let mut changes = Map::new();
    for entry in set {
        let (field, raw) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got '{entry}'"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        changes.insert(field.to_string(), value);
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_overrides_json_and_bare_values() {
        let changes = parse_overrides(&[
            "debug=true".to_string(),
            "app_name=myapp".to_string(),
            "version=\"2.0.0\"".to_string(),
        ])
        .unwrap();
        assert_eq!(changes["debug"], json!(true));
        assert_eq!(changes["app_name"], json!("myapp"));
        assert_eq!(changes["version"], json!("2.0.0"));
    }

    #[test]
    fn test_parse_overrides_rejects_missing_equals() {
        assert!(parse_overrides(&["debug".to_string()]).is_err());
    }
}
