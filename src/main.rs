use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use lp_duality::experiments::{Banner, Experiment};
use lp_duality::plot::{self, PlotScene};
use lp_duality::render::{self, Formulation, Report, Symbol, Topic};
use lp_duality::{analyze, Parameters, Sense, Settings};

#[derive(Parser)]
#[command(name = "lp-duality")]
#[command(about = "Explore the dual of a two-variable linear program")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    problem: ProblemArgs,

    /// JSON file with solver tolerances and plot settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Primal problem: sense c1 x1 + c2 x2 s.t. a_i x1 + b_i x2 (<= | >=) d_i
#[derive(Args)]
struct ProblemArgs {
    /// Start from a preset experiment instead of the default problem
    #[arg(long, global = true, value_enum)]
    experiment: Option<Experiment>,

    /// Optimization direction (maximize uses <= constraints, minimize >=)
    #[arg(long, global = true, value_enum)]
    sense: Option<Sense>,

    #[arg(long, global = true, allow_negative_numbers = true)]
    c1: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    c2: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    a1: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    b1: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    d1: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    a2: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    b2: Option<f64>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    d2: Option<f64>,
}

impl ProblemArgs {
    fn parameters(&self) -> Parameters {
        let mut params = self.experiment
            .and_then(|e| e.parameters())
            .unwrap_or_default();
        if let Some(sense) = self.sense {
            params.sense = sense;
        }
        let overrides = [
            (self.c1, &mut params.c1),
            (self.c2, &mut params.c2),
            (self.a1, &mut params.a1),
            (self.b1, &mut params.b1),
            (self.d1, &mut params.d1),
            (self.a2, &mut params.a2),
            (self.b2, &mut params.b2),
            (self.d2, &mut params.d2),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }
        params
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve primal and dual and print the duality analysis
    Report {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the primal and dual formulations
    Formulate {
        /// Emit LaTeX align blocks
        #[arg(long)]
        latex: bool,
    },
    /// Draw the objective surface and feasible region
    Plot {
        /// SVG output file
        #[arg(long, default_value = "duality.svg")]
        out: PathBuf,
        /// Also write the plot data as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Explain part of duality theory
    Explain {
        #[arg(value_enum)]
        topic: Topic,
    },
    /// List the preset experiments
    Experiments,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = match cli.settings {
        Some(ref path) => Settings::from_json_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let params = cli.problem.parameters();

    let banner = cli.problem.experiment.map(Banner);
    if let Some(ref banner) = banner {
        info!("{}", banner.0.label());
    }

    match cli.command {
        Commands::Report { json } => {
            let report = analyze(&params, &settings)?;
            if json {
                if let Some(banner) = banner {
                    eprintln!("{}\n", banner);
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                if let Some(banner) = banner {
                    println!("{}\n", banner);
                }
                println!("{}", Report(&report));
            }
        },
        Commands::Formulate { latex } => {
            params.validate()?;
            if let Some(banner) = banner {
                println!("{}\n", banner);
            }
            let primal = params.primal();
            let dual = params.dual();
            if latex {
                println!("{}\n", render::latex(&primal, Symbol::X));
                println!("{}", render::latex(&dual, Symbol::Lambda));
            } else {
                println!("Primal Problem\n{}\n", Formulation { lp: &primal, symbol: Symbol::X });
                println!("Dual Problem\n{}", Formulation { lp: &dual, symbol: Symbol::Lambda });
            }
        },
        Commands::Plot { out, json } => {
            if let Some(banner) = banner {
                println!("{}\n", banner);
            }
            let report = analyze(&params, &settings)?;
            let scene = PlotScene::build(&params, &report.primal, &settings);
            plot::render_svg(&scene, &out, &settings)
                .with_context(|| format!("drawing {}", out.display()))?;
            println!("wrote {}", out.display());
            if let Some(path) = json {
                fs::write(&path, scene.to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("wrote {}", path.display());
            }
        },
        Commands::Explain { topic } => {
            println!("{}", render::topic_text(topic, params.sense));
        },
        Commands::Experiments => {
            for experiment in Experiment::all().iter() {
                let (_, message) = experiment.message();
                let name = clap::ValueEnum::to_possible_value(experiment)
                    .map(|v| v.get_name().to_string())
                    .unwrap_or_default();
                println!("{:<18} {}\n{:<18} {}", name, experiment.label(), "", message);
            }
        },
    }
    Ok(())
}

#[cfg(test)]
fn parse_parameters(args: &[&str]) -> Parameters {
    let cli = Cli::try_parse_from(args.iter().copied()).expect("Arguments should parse");
    cli.problem.parameters()
}

#[test]
fn flags_override_preset() {
    let params = parse_parameters(&["lp-duality", "--experiment", "unbounded-primal",
                                    "--c2", "3", "report"]);
    assert_eq!(params.sense, Sense::Minimize);
    assert_eq!(params.c1, -1.0);
    assert_eq!(params.c2, 3.0);
    assert_eq!(params.d2, 6.0);

    let params = parse_parameters(&["lp-duality", "--experiment", "infeasible-primal",
                                    "--sense", "min", "report"]);
    assert_eq!(params.sense, Sense::Minimize);
    assert_eq!(params.a2, -1.0);
}

#[test]
fn negative_values_parse() {
    let params = parse_parameters(&["lp-duality", "--c1", "-2", "--d2", "-6.5", "formulate"]);
    assert_eq!(params.c1, -2.0);
    assert_eq!(params.d2, -6.5);
    assert_eq!(params.c2, 2.0);
}

#[test]
fn custom_experiment_starts_from_defaults() {
    let params = parse_parameters(&["lp-duality", "--experiment", "custom", "--b1", "2.5",
                                    "report"]);
    assert_eq!(params, Parameters { b1: 2.5, ..Parameters::default() });

    let params = parse_parameters(&["lp-duality", "report", "--json"]);
    assert_eq!(params, Parameters::default());
}
