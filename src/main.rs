use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;

use crystal_console::{
    builtins, Console, ConsoleConfig, Native, StdoutSink, ValueTable, Variable,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match &options.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };

    let values = ValueTable::new();
    let mut console = Console::with_parts(config, values, Arc::new(StdoutSink));
    builtins::register_all(&mut console).context("failed to register builtin commands")?;
    register_demo_identifiers(&mut console).context("failed to register demo identifiers")?;
    info!("Registered {} identifiers", console.registry().len());

    let autoexec = console.config().autoexec.clone();
    for script in &autoexec {
        if let Err(err) = console.exec_file(script) {
            eprintln!("Skipping autoexec {script}: {err:#}");
        }
    }

    for script in &options.scripts {
        console
            .exec_file(script)
            .with_context(|| format!("failed to execute {script}"))?;
    }

    for line in &options.lines {
        run_line(&mut console, line);
    }

    if options.read_stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read command from stdin")?;
            run_line(&mut console, &line);
        }
    }

    if let Some(path) = &options.write_config {
        console.write_config_file(path)?;
        println!("Wrote {path}");
    }

    if options.list {
        let snapshot = console.registry().snapshot(console.values());
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}

fn run_line(console: &mut Console, line: &str) {
    match console.execute(line) {
        Ok(value) => info!("{line:?} -> {value}"),
        Err(err) => info!("{line:?} failed: {err}"),
    }
}

/// Sample game-side identifiers so the console can be exercised from the shell.
fn register_demo_identifiers(console: &mut Console) -> Result<()> {
    let values = console.values().clone();

    let brightness = values.allocate(50);
    console.register(Variable::new("brightness", 0, 100, brightness).persistent())?;

    let fov = values.allocate(90);
    let fov_values = values.clone();
    console.register(
        Variable::new("fov", 10, 150, fov)
            .persistent()
            .on_change(move || {
                info!("fov changed to {}", fov_values.get(fov).unwrap_or_default());
            }),
    )?;

    let version = values.allocate(1);
    console.register(Variable::new("version", 1, 0, version))?;

    console.add_command(
        "damage",
        Native::int2(|console, amount, target| {
            console.report(format!("damage {amount} {target}"));
        }),
    )?;
    console.add_command(
        "+jump",
        Native::down(|console, is_down| {
            let edge = if is_down { "pressed" } else { "released" };
            console.report(format!("jump {edge}"));
        }),
    )?;
    console.add_command(
        "spawn",
        Native::opt_str3(|console, kind, x, y| {
            console.report(format!(
                "spawn {} at {},{}",
                kind.unwrap_or("player"),
                x.unwrap_or("origin"),
                y.unwrap_or("origin")
            ));
        }),
    )?;
    Ok(())
}

struct CliOptions {
    scripts: Vec<String>,
    lines: Vec<String>,
    read_stdin: bool,
    config: Option<String>,
    write_config: Option<String>,
    list: bool,
}

const USAGE: &str = "Usage: crystal-console [script.cfg...] [--exec LINE]... [--stdin] \
     [--config console.xml] [--write-config FILE] [--list]";

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            scripts: Vec::new(),
            lines: Vec::new(),
            read_stdin: false,
            config: None,
            write_config: None,
            list: false,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--exec" => options.lines.push(value_for(&mut args, "--exec")?),
                "--stdin" => options.read_stdin = true,
                "--config" => options.config = Some(value_for(&mut args, "--config")?),
                "--write-config" => {
                    options.write_config = Some(value_for(&mut args, "--write-config")?)
                }
                "--list" => options.list = true,
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                script => options.scripts.push(script.to_string()),
            }
        }
        Ok(options)
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}
