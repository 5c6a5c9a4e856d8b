//! loadsplit CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use loadsplit::config::cli::{Cli, Command};
use loadsplit::config::toml::{override_agents, parse_toml_file};
use loadsplit::config::validator::{validate_plan, ValidatedPlan};
use loadsplit::data::{ArgumentValue, ParameterDataConfig, UsernameSource};
use loadsplit::distributed::{read_assignment, write_assignment, AgentAssignment, DistributionPlan, DistributionPlanner};
use loadsplit::pattern::schedule::{executions_per_thread, IterationPacer, RampUpSchedule};
use loadsplit::provider::{ParameterDataProvider, ProviderRegistry};
use loadsplit::util::logging::init_logging;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Command::Plan {
            file,
            agents,
            json,
            export,
        } => run_plan(&file, agents, json, export),
        Command::Preview {
            file,
            agents,
            agent,
            threads,
            calls,
        } => run_preview(&file, agents, agent, threads, calls),
        Command::Inspect { assignment, json } => run_inspect(&assignment, json),
    }
}

/// Load, validate and distribute a plan file
fn load_plan(file: &Path, agents: Option<usize>) -> Result<(ValidatedPlan, DistributionPlan)> {
    let mut config = parse_toml_file(file)?;
    if let Some(count) = agents {
        override_agents(&mut config, count);
    }

    let validated = validate_plan(&config).context("Plan validation failed")?;
    let planner = DistributionPlanner::new(validated.loader.clone(), validated.agents.clone())?;
    let plan = planner
        .plan(&validated.pattern, &validated.data)
        .with_context(|| format!("Failed to distribute loader '{}'", validated.loader))?;

    Ok((validated, plan))
}

fn run_plan(file: &Path, agents: Option<usize>, json: bool, export: Option<PathBuf>) -> Result<()> {
    let (validated, plan) = load_plan(file, agents)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan).context("Failed to render plan as JSON")?);
    } else {
        println!("Loader: {}", plan.loader);
        println!("Pattern: {}", plan.description);
        println!();
        for assignment in &plan.assignments {
            print_assignment(assignment);
            println!();
        }
        for idle in plan.idle_agents(&validated.agents) {
            println!("Agent {} gets no work", idle);
        }
    }

    if let Some(dir) = export {
        export_assignments(&plan, &dir)?;
    }

    Ok(())
}

fn export_assignments(plan: &DistributionPlan, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    for assignment in &plan.assignments {
        let path = dir.join(format!("{}-agent-{}.msgpack", assignment.loader, assignment.agent_index));
        let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_assignment(&mut writer, assignment)
            .with_context(|| format!("Failed to write assignment to {}", path.display()))?;
        info!("Wrote assignment for agent {} to {}", assignment.agent, path.display());
    }

    Ok(())
}

fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open assignment: {}", path.display()))?;
    let assignment = read_assignment(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read assignment: {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assignment).context("Failed to render assignment as JSON")?);
    } else {
        println!(
            "Assignment for loader '{}' from {} at {}",
            assignment.loader,
            assignment.controller_host,
            assignment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        print_assignment(&assignment);
    }
    Ok(())
}

fn run_preview(file: &Path, agents: Option<usize>, agent: usize, threads: usize, calls: usize) -> Result<()> {
    let (_, plan) = load_plan(file, agents)?;
    let assignment = plan.assignments.get(agent).with_context(|| {
        format!(
            "Agent index {} has no assignment ({} agents received work)",
            agent,
            plan.assignments.len()
        )
    })?;

    print_assignment(assignment);
    print_schedule(assignment)?;

    let registry = ProviderRegistry::new();
    let providers = registry
        .create_all(&assignment.data)
        .with_context(|| format!("Failed to create providers for agent {}", assignment.agent))?;

    let outputs = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|thread| {
                let providers = &providers;
                s.spawn(move |_| preview_thread(providers, thread as u64, calls))
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    })
    .map_err(|_| anyhow::anyhow!("Preview worker panicked"))?;

    println!();
    for (thread, output) in outputs.into_iter().enumerate() {
        let lines = output.map_err(|_| anyhow::anyhow!("Preview thread {} panicked", thread))??;
        println!("Thread {}:", thread);
        for line in lines {
            println!("  {}", line);
        }
    }

    Ok(())
}

/// Draw `calls` invocations worth of values on one simulated worker
fn preview_thread(
    providers: &[Box<dyn ParameterDataProvider>],
    thread_id: u64,
    calls: usize,
) -> loadsplit::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(calls);
    for _ in 0..calls {
        let mut previous: Vec<ArgumentValue> = Vec::with_capacity(providers.len());
        for provider in providers {
            let value = provider.get_value_for_thread(thread_id, &previous)?;
            previous.push(value);
        }
        let rendered: Vec<String> = previous.iter().map(|arg| format!("{}={}", arg.name, arg.value)).collect();
        lines.push(rendered.join(", "));
    }
    Ok(lines)
}

fn print_schedule(assignment: &AgentAssignment) -> Result<()> {
    let pattern = &assignment.pattern;

    if pattern.is_ramp_up() {
        let schedule = RampUpSchedule::for_pattern(pattern);
        println!(
            "  Ramp-up: {} groups over {:.1}s, last group {} threads",
            schedule.group_count(),
            schedule.ramp_up_duration().as_secs_f64(),
            schedule.last_group_size()
        );
    }

    if pattern.execution_speed().is_some() {
        let per_thread = executions_per_thread(pattern)?;
        println!(
            "  Executions per thread per {}s: {:?}",
            pattern.time_frame(),
            per_thread
        );
    }

    let mut pacer = IterationPacer::new(pattern.pacing());
    let intervals: Vec<u128> = (0..3).map(|_| pacer.next_interval().as_millis()).collect();
    println!("  Sample intervals (ms): {:?}", intervals);
    Ok(())
}

fn print_assignment(assignment: &AgentAssignment) {
    let pattern = &assignment.pattern;
    println!(
        "Agent {} ({}) - {} of {}",
        assignment.agent_index,
        assignment.agent,
        assignment.agent_index + 1,
        assignment.agent_count
    );
    println!("  Pattern: {}", pattern.describe_for_threads(pattern.thread_count() as u64));

    if assignment.data.is_empty() {
        println!("  Parameters: none");
        return;
    }
    println!("  Parameters:");
    for parameter in assignment.data.parameter_configurations() {
        println!(
            "    {} ({}, {}): {}",
            parameter.parameter_name(),
            parameter.type_name(),
            parameter.level(),
            summarize(parameter)
        );
    }
}

fn summarize(parameter: &ParameterDataConfig) -> String {
    match parameter {
        ParameterDataConfig::List(list) => format!("{} values", list.values.len()),
        ParameterDataConfig::Range(range) => match &range.template {
            Some(template) => format!("'{}' over [{}, {}]", template, range.start, range.end),
            None => format!("[{}, {}]", range.start, range.end),
        },
        ParameterDataConfig::FileNames(files) => {
            let folders: Vec<String> = files
                .containers
                .iter()
                .map(|c| format!("{} {}%", c.folder.display(), c.percentage))
                .collect();
            folders.join(", ")
        }
        ParameterDataConfig::Username(users) => match &users.source {
            UsernameSource::List { values } => format!("{} user names", values.len()),
            UsernameSource::Range { template, start, end } => format!("'{}' over [{}, {}]", template, start, end),
        },
        ParameterDataConfig::Custom(custom) => format!("provider '{}'", custom.provider_tag),
    }
}
