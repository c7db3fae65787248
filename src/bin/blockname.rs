//! blockname: CLI tool for checking names against block rules.

use blockname::{BlockNameConfig, BlockRules, Decision, RuleKind};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blockname")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Check DNS names against name-blocking rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check names against the rules named by a config file
    Check {
        /// Plugin config (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Print one JSON object per name
        #[arg(long)]
        json: bool,

        /// Names to check
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Compile a rule file and report what it contains
    Lint {
        /// Rule file
        #[arg(short, long)]
        rules: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            config,
            json,
            names,
        } => {
            if let Err(e) = check_names(&config, json, &names) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Lint { rules } => {
            if let Err(e) = lint_rules(&rules) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn check_names(config: &PathBuf, json: bool, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = BlockNameConfig::load(config)?;
    let file = fs::File::open(&config.blocked_names_file)?;
    let rules = BlockRules::compile(file, config.schedules()?)?
        .with_schedule_enforcement(config.enforce_schedules);

    for name in names {
        let decision = rules.decide(name);
        if json {
            println!("{}", serde_json::json!({ "name": name, "decision": decision }));
        } else {
            print_decision(name, &decision);
        }
    }

    Ok(())
}

fn print_decision(name: &str, decision: &Decision) {
    if decision.blocked {
        println!("{}\tBLOCKED\t{}", name, decision.reason);
    } else {
        println!("{}\tALLOWED", name);
    }
}

fn lint_rules(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let file = fs::File::open(path)?;
    let rules = BlockRules::from_reader(file)?;
    let stats = rules.stats();

    println!("Rules in {:?}:", path);
    for kind in RuleKind::ALL {
        println!("  {:<10} {}", format!("{}:", kind), stats.count(kind));
    }
    println!("  {:<10} {}", "skipped:", stats.skipped);

    if stats.skipped > 0 {
        return Err(format!("{} invalid line(s)", stats.skipped).into());
    }
    Ok(())
}
