use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::interpreter::{
    Block, BlockMap, Engine, EngineError, Instr, RunReport, SpawnerKind, Stop,
};
use crate::script::{Script, Sink};

#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "weave - a domain-independent flow-control engine", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the weave.toml search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program (.toml or .json)
    Run {
        /// Program file
        program: PathBuf,

        /// Block to start in
        #[arg(short = 'e', long = "entry", default_value = "main")]
        entry: String,

        /// Index of the first instruction to dispatch
        #[arg(long = "start-at", default_value = "0")]
        start_at: usize,

        /// Step budget per branch (0 = unlimited; overrides config)
        #[arg(long = "max-steps", allow_hyphen_values = true)]
        max_steps: Option<i64>,

        /// Where split branches run (overrides config)
        #[arg(long = "runtime", value_enum)]
        runtime: Option<RuntimeArg>,

        /// What to do when a called block does not exist
        #[arg(long = "on-missing", value_enum, default_value = "fail")]
        on_missing: MissingPolicy,

        /// Milliseconds to keep the process alive for split branches
        #[arg(long = "linger-ms", default_value = "0")]
        linger_ms: u64,
    },

    /// Load a program and list its blocks
    Check {
        /// Program file
        program: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuntimeArg {
    Thread,
    Tokio,
}

impl From<RuntimeArg> for SpawnerKind {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::Thread => SpawnerKind::Thread,
            RuntimeArg::Tokio => SpawnerKind::Tokio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingPolicy {
    /// Abort the branch
    Fail,
    /// Treat the block as empty
    Skip,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Internal function that handles CLI commands
fn run_cli_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            program,
            entry,
            start_at,
            max_steps,
            runtime,
            on_missing,
            linger_ms,
        } => {
            let config = EngineConfig::builder()
                .config_path(cli.config)
                .from_env(true)
                .max_steps(max_steps)
                .spawner(runtime.map(SpawnerKind::from))
                .build()
                .context("Failed to load engine configuration")?;

            let script = Script::load(&program)
                .with_context(|| format!("Failed to load program {}", program.display()))?;

            let sink: Sink = Arc::new(|line: &str| println!("{}", line));
            let options = RunOptions {
                entry,
                start_at,
                on_missing,
                linger: Duration::from_millis(linger_ms),
            };
            let report = run_program(script.to_program(sink), &config, &options)?;

            let reason = match report.stop {
                Stop::Exhausted => "completed",
                Stop::Halted => "halted",
            };
            eprintln!("{} after {} steps", reason, report.steps);
        }

        Commands::Check { program } => {
            let script = Script::load(&program)
                .with_context(|| format!("Failed to load program {}", program.display()))?;
            print!("{}", describe(&script));
        }
    }

    Ok(())
}

/// Options for a single `weave run`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub entry: String,
    pub start_at: usize,
    pub on_missing: MissingPolicy,
    pub linger: Duration,
}

/// Build an engine for `program` and run it to completion
///
/// With the tokio spawner the run happens inside a dedicated runtime, which is
/// shut down after `linger`; with threads the process simply waits `linger`.
pub fn run_program(
    program: BlockMap<Instr>,
    config: &EngineConfig,
    options: &RunOptions,
) -> Result<RunReport> {
    info!(
        entry = %options.entry,
        start_at = options.start_at,
        max_steps = config.max_steps,
        spawner = config.spawner.as_str(),
        "starting run"
    );

    match config.spawner {
        SpawnerKind::Thread => {
            let report = build_and_run(program, config, options)?;
            std::thread::sleep(options.linger);
            Ok(report)
        }
        SpawnerKind::Tokio => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start tokio runtime")?;
            let report = {
                let _guard = runtime.enter();
                build_and_run(program, config, options)
            };
            runtime.shutdown_timeout(options.linger);
            report
        }
    }
}

fn build_and_run(
    program: BlockMap<Instr>,
    config: &EngineConfig,
    options: &RunOptions,
) -> Result<RunReport> {
    let blocks = program.len();
    let mut engine = Engine::from_config(program, config)?;
    info!(branch = %engine.branch_id(), blocks, "engine ready");

    if options.on_missing == MissingPolicy::Skip {
        engine = engine.with_missing_block_resolver(
            |name: &str| -> Result<Block<Instr>, EngineError> {
                warn!(block = %name, "skipping missing block");
                Ok(Arc::from(Vec::new()))
            },
        );
    }

    let report = engine
        .run(&options.entry, (), options.start_at)
        .with_context(|| format!("Run of '{}' aborted", options.entry))?;

    Ok(report)
}

/// Human-readable listing of a script's blocks
pub fn describe(script: &Script) -> String {
    let program = script.to_program(Arc::new(|_: &str| {}));
    let mut out = String::new();
    if program.is_empty() {
        out.push_str("no blocks\n");
        return out;
    }

    for name in program.names() {
        let Some(block) = program.get(name) else {
            continue;
        };
        out.push_str(&format!("{} ({} instructions)\n", name, block.len()));
        for (index, instr) in block.iter().enumerate() {
            out.push_str(&format!("  {:>3}  {}\n", index, instr));
        }
    }

    for call in script.undefined_calls() {
        out.push_str(&format!(
            "warning: {}[{}] calls undefined block '{}'\n",
            call.block, call.index, call.target
        ));
    }

    out
}
