use std::fs::File;
use std::io::BufReader;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tinker_crypto::DigestAlgorithm;
use tinker_engine::{GenesisTinker, Plan, TaskQueue, TinkerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, &cli.format),
        Command::Check(args) => cmd_check(args, &cli.format),
        Command::Digest(args) => cmd_digest(args, &cli.format),
    }
}

fn apply_overrides(config: &mut TinkerConfig, args: &RunArgs) {
    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(shasum) = &args.shasum {
        config.shasum = Some(shasum.clone());
    }
    if let Some(path) = &args.preprocessing {
        config.preprocessing = Some(path.clone());
    }
    if args.keep_preprocessing {
        config.keep_preprocessing = true;
    }
    if let Some(digest) = args.digest {
        config.digest = digest.into();
    }
    if let Some(style) = args.style {
        config.output_style = style.into();
    }
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut plan = Plan::load(&args.plan)
        .with_context(|| format!("failed to load plan {}", args.plan.display()))?;
    let tasks = plan.tasks()?;
    apply_overrides(&mut plan.tinker, &args);

    let mut tinker = GenesisTinker::new(plan.tinker);
    for task in tasks {
        tinker.add_task(task);
    }
    let report = tinker.run_tasks()?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "output": report.output,
                "algorithm": report.digest.algorithm().to_string(),
                "digest": report.digest.to_hex(),
                "steps": report.steps,
            })
        ),
        OutputFormat::Text => {
            println!(
                "{} Wrote {} in {} steps",
                "✓".green().bold(),
                report.output.display().to_string().bold(),
                report.steps
            );
            println!(
                "  {}: {}",
                report.digest.algorithm().sum_label(),
                report.digest.to_hex().yellow()
            );
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let plan = Plan::load(&args.plan)
        .with_context(|| format!("failed to load plan {}", args.plan.display()))?;
    let mut queue = TaskQueue::new();
    for task in plan.tasks()? {
        queue.add(task);
    }
    queue.validate()?;

    let names: Vec<_> = queue.tasks().iter().map(|t| t.name()).collect();
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "input": plan.tinker.input, "output": plan.tinker.output, "tasks": names })
        ),
        OutputFormat::Text => {
            println!("{} Plan is valid", "✓".green().bold());
            println!("  Input: {}", plan.tinker.input.bold());
            println!("  Output: {}", plan.tinker.output.display());
            for (i, task) in queue.tasks().iter().enumerate() {
                println!("  {:>3}. {} ({})", i + 1, task.name().cyan(), task.phase());
            }
        }
    }
    Ok(())
}

fn cmd_digest(args: DigestArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let algorithm = DigestAlgorithm::from(args.algorithm);
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let digest = algorithm.digest_reader(BufReader::new(file))?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "file": args.file, "algorithm": algorithm.to_string(), "digest": digest.to_hex() })
        ),
        OutputFormat::Text => println!("{}  {}", digest.to_hex(), args.file.display()),
    }
    Ok(())
}
