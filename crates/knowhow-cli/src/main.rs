//! Command-line interface for the knowing-how model checker.

use clap::{Parser, Subcommand};
use knowhow_mc::{lts_to_dot, parse_lts, CheckConfig, Lts, ModelChecker};
use knowhow_syntax::{expr_to_dot, parse, Expr, ExprKind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI error with source context for pretty printing.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("formula error: {message}")]
    #[diagnostic(code(knowhow::formula_error))]
    Formula {
        message: String,
        #[source_code]
        src: NamedSource<Arc<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("model error: {message}")]
    Model { message: String },

    #[error("check error: {message}")]
    Check { message: String },

    #[error("failed to write {path}: {message}")]
    Output { path: String, message: String },
}

impl CliError {
    fn from_formula_error(e: knowhow_syntax::ParseError, source: &str) -> Self {
        let span = e.span();
        CliError::Formula {
            message: e.to_string(),
            src: NamedSource::new("<formula>", Arc::new(source.to_string())),
            span: (span.start, span.len()).into(),
        }
    }
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "knowhow", version)]
#[command(about = "Knowing-how logic model checker", long_about = None)]
struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a formula and show its tree
    Parse {
        /// The formula, e.g. 'kh(p and q, s or t)'
        formula: String,

        /// Print the tree as Graphviz DOT instead
        #[arg(long)]
        dot: bool,
    },

    /// Check a formula against a model at a pointed state
    Check {
        /// Model file in DOT format
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// The pointed state to check at
        #[arg(short, long)]
        state: String,

        /// The formula to check
        formula: String,

        /// Minimize intermediate automata while checking
        #[arg(long)]
        minimize: bool,

        /// For a kh formula that holds, also list witness plans up to this
        /// length
        #[arg(long, value_name = "LENGTH")]
        witnesses: Option<usize>,

        /// Maximum number of witness plans to list
        #[arg(long, default_value = "10", value_name = "N")]
        max_witnesses: usize,
    },

    /// Enumerate witness plans for kh(init, goal)
    Witnesses {
        /// Model file in DOT format
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// The pointed state
        #[arg(short, long)]
        state: String,

        /// The init expression
        #[arg(long)]
        init: String,

        /// The goal expression
        #[arg(long)]
        goal: String,

        /// Maximum plan length
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Maximum number of plans to list
        #[arg(long, default_value = "10", value_name = "N")]
        count: usize,

        /// Minimize intermediate automata while checking
        #[arg(long)]
        minimize: bool,
    },

    /// Re-render a model as DOT
    Export {
        /// Model file in DOT format
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Walk randomly through a model, printing states and actions
    Simulate {
        /// Model file in DOT format
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// The starting state
        #[arg(short, long)]
        state: String,

        /// Number of steps to take
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Seed for reproducible walks
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Parse { formula, dot } => cmd_parse(&formula, dot, cli.verbose),
        Commands::Check {
            model,
            state,
            formula,
            minimize,
            witnesses,
            max_witnesses,
        } => cmd_check(&model, &state, &formula, minimize, witnesses, max_witnesses),
        Commands::Witnesses {
            model,
            state,
            init,
            goal,
            limit,
            count,
            minimize,
        } => cmd_witnesses(&model, &state, &init, &goal, limit, count, minimize),
        Commands::Export { model, output } => cmd_export(&model, output.as_deref()),
        Commands::Simulate {
            model,
            state,
            steps,
            seed,
        } => cmd_simulate(&model, &state, steps, seed),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn parse_formula(source: &str) -> CliResult<Expr> {
    parse(source).map_err(|e| CliError::from_formula_error(e, source))
}

fn load_model(path: &PathBuf) -> CliResult<Lts<String, String>> {
    let text = fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let lts = parse_lts(&text).map_err(|e| CliError::Model {
        message: e.to_string(),
    })?;
    info!(
        states = lts.state_count(),
        actions = lts.actions().len(),
        "model loaded"
    );
    Ok(lts)
}

fn checker<'a>(
    lts: &'a Lts<String, String>,
    state: &str,
    minimize: bool,
) -> CliResult<ModelChecker<'a, String, String>> {
    ModelChecker::new(lts, state.to_string(), CheckConfig { minimize }).map_err(|e| {
        CliError::Check {
            message: e.to_string(),
        }
    })
}

fn format_plan(plan: &[String]) -> String {
    format!("[{}]", plan.join(", "))
}

fn cmd_parse(formula: &str, dot: bool, verbose: bool) -> CliResult<()> {
    let expr = parse_formula(formula)?;
    if dot {
        print!("{}", expr_to_dot(&expr));
    } else if verbose {
        println!("{expr:#?}");
    } else {
        println!("{expr}");
        println!("{} nodes", expr.size());
    }
    Ok(())
}

fn cmd_check(
    model: &PathBuf,
    state: &str,
    formula: &str,
    minimize: bool,
    witnesses: Option<usize>,
    max_witnesses: usize,
) -> CliResult<()> {
    let lts = load_model(model)?;
    let mc = checker(&lts, state, minimize)?;
    let expr = parse_formula(formula)?;

    let holds = mc.check(&expr).map_err(|e| CliError::Check {
        message: e.to_string(),
    })?;
    println!(
        "{} at state {state}: {}",
        expr,
        if holds { "holds" } else { "does not hold" }
    );

    if holds {
        if let (Some(limit), ExprKind::Kh(init, goal)) = (witnesses, &expr.kind) {
            println!("witness plans (length <= {limit}):");
            let plans = mc.witnesses(init, goal, limit).map_err(|e| CliError::Check {
                message: e.to_string(),
            })?;
            for plan in plans.take(max_witnesses) {
                println!("  {}", format_plan(&plan));
            }
        }
    }
    Ok(())
}

fn cmd_witnesses(
    model: &PathBuf,
    state: &str,
    init: &str,
    goal: &str,
    limit: usize,
    count: usize,
    minimize: bool,
) -> CliResult<()> {
    let lts = load_model(model)?;
    let mc = checker(&lts, state, minimize)?;
    let init = parse_formula(init)?;
    let goal = parse_formula(goal)?;

    let plans = mc
        .witnesses(&init, &goal, limit)
        .map_err(|e| CliError::Check {
            message: e.to_string(),
        })?;

    let mut found = 0;
    for plan in plans.take(count) {
        println!("{}", format_plan(&plan));
        found += 1;
    }
    if found == 0 {
        println!("no witness plan of length <= {limit}");
    }
    Ok(())
}

fn cmd_export(model: &PathBuf, output: Option<&std::path::Path>) -> CliResult<()> {
    let lts = load_model(model)?;
    let dot = lts_to_dot(&lts);
    match output {
        Some(path) => fs::write(path, dot).map_err(|e| CliError::Output {
            path: path.display().to_string(),
            message: e.to_string(),
        })?,
        None => print!("{dot}"),
    }
    Ok(())
}

fn cmd_simulate(model: &PathBuf, state: &str, steps: usize, seed: Option<u64>) -> CliResult<()> {
    let lts = load_model(model)?;
    if !lts.contains_state(&state.to_string()) {
        return Err(CliError::Check {
            message: format!("state {state} is not part of the model"),
        });
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut current = state.to_string();
    for step in 0..steps {
        let mut labels: Vec<String> = lts
            .labels(&current)
            .map_err(|e| CliError::Check {
                message: e.to_string(),
            })?
            .into_iter()
            .collect();
        labels.sort();
        println!("{step}: {current} {{{}}}", labels.join(", "));

        let mut enabled: Vec<&String> = lts
            .actions()
            .iter()
            .filter(|action| {
                lts.targets(&current, *action)
                    .map(|targets| !targets.is_empty())
                    .unwrap_or(false)
            })
            .collect();
        enabled.sort();

        let Some(&action) = enabled.choose(&mut rng) else {
            println!("   no enabled actions, stopping");
            break;
        };

        let mut targets: Vec<String> = lts
            .targets(&current, action)
            .map_err(|e| CliError::Check {
                message: e.to_string(),
            })?
            .into_iter()
            .collect();
        targets.sort();
        let Some(target) = targets.choose(&mut rng) else {
            break;
        };

        println!("   --{action}--> {target}");
        current = target.clone();
    }
    Ok(())
}
