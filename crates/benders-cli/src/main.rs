use benders::{Config, Framework, LpForm, ProblemSpec, SubproblemReturn};
use benders_solver::{Model, SimplexBackend};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "benders")]
#[command(about = "Benders decomposition for block-structured MILPs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration as JSON
    ConfigExample,
    /// Decompose and solve a model. Integer and binary variables become the
    /// complicating variables; all others form one subproblem.
    Solve {
        /// Model file (JSON)
        file: PathBuf,
        /// callback or iterative
        #[arg(long)]
        framework: Option<Framework>,
        /// primal or dual
        #[arg(long)]
        lp_form: Option<LpForm>,
        /// subgradient or duals
        #[arg(long)]
        sub_return: Option<SubproblemReturn>,
        /// Configuration file (JSON); flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the solution to a .sol or .mst file
        #[arg(short, long)]
        result_file: Option<PathBuf>,
        /// trace, debug, info, warn or error
        #[arg(long, default_value = "info")]
        log_level: Level,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::ConfigExample => println!("{}", Config::example()),
        Commands::Solve {
            file,
            framework,
            lp_form,
            sub_return,
            config,
            result_file,
            log_level,
        } => {
            let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                eprintln!("Failed to set tracing subscriber: {}", e);
                std::process::exit(1);
            }

            let mut config = match config {
                Some(path) => match Config::from_path(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error reading config: {}", e);
                        std::process::exit(1);
                    }
                },
                None => Config::default(),
            };
            if let Some(framework) = framework {
                config.framework = framework;
            }
            if let Some(lp_form) = lp_form {
                config.lp_form = lp_form;
            }
            if let Some(sub_return) = sub_return {
                config.sub_return = sub_return;
            }

            let source = match std::fs::read_to_string(&file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading file: {}", e);
                    std::process::exit(1);
                }
            };
            let model: Model = match serde_json::from_str(&source) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Model error: {}", e);
                    std::process::exit(1);
                }
            };

            let complicating: Vec<usize> = model
                .variables
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.vtype.is_continuous())
                .map(|(j, _)| j)
                .collect();
            let names: Vec<String> = model.variables.iter().map(|v| v.name.clone()).collect();
            let mut spec = ProblemSpec::new(model);
            if let Err(e) = spec.set_complicating_vars(complicating) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            let result = match benders::solve(&mut spec, &config, &SimplexBackend) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Termination: {}", result.termination());
            println!("Objective: {}", result.obj_val());
            println!("Bound: {}", result.obj_bound());
            println!("Gap: {:.6}", result.mip_gap());
            println!("Runtime: {:.3}s", result.runtime());
            if let Some(x) = result.x() {
                println!();
                for (name, value) in names.iter().zip(x) {
                    if value.abs() > 1e-9 {
                        println!("  {:20} {:12.6}", name, value);
                    }
                }
            }

            if let Some(path) = result_file {
                if let Err(e) = result.write(&path) {
                    eprintln!("Error writing result: {}", e);
                    std::process::exit(1);
                }
                println!();
                println!("Wrote {}", path.display());
            }
        }
    }
}
