//! Gatesim - Digital Logic Circuit Simulator
//!
//! Inspect, evaluate and drive saved circuit projects from the command line.
//!
//! # Usage
//!
//! ```bash
//! gatesim demo adder.gsim
//! gatesim info adder.gsim
//! gatesim table adder.gsim --block 0
//! gatesim run adder.gsim --set A=1 --set B=1
//! ```

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use gatesim_core::circuit::{Color, ComponentId, ConnectorRef, Point};
use gatesim_core::components::{Component, Gate, GateKind, Input, Output};
use gatesim_core::error::Result;
use gatesim_core::solver::{truth_table, DEFAULT_MAX_DEPTH};
use gatesim_core::{Project, Simulator, SimulatorConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Digital logic circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Recursion bound for one propagation pass
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the canvas and palette of a project file
    Info {
        #[arg(value_name = "PROJECT_FILE")]
        file: PathBuf,
    },

    /// Print the truth table of the canvas or of a palette block
    Table {
        #[arg(value_name = "PROJECT_FILE")]
        file: PathBuf,

        /// Palette index of the block to tabulate
        #[arg(short, long)]
        block: Option<usize>,
    },

    /// Drive labelled inputs and print every output
    Run {
        #[arg(value_name = "PROJECT_FILE")]
        file: PathBuf,

        /// Input assignment, `LABEL=VALUE` (bus values are integers)
        #[arg(
            short = 's',
            long = "set",
            value_name = "LABEL=VALUE",
            value_parser = parse_assignment
        )]
        assignments: Vec<(String, i32)>,
    },

    /// Write a half-adder example project
    Demo {
        #[arg(value_name = "PROJECT_FILE")]
        file: PathBuf,
    },
}

fn parse_assignment(s: &str) -> std::result::Result<(String, i32), String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{s}'"))?;
    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid value '{value}': {e}"))?;
    Ok((label.trim().to_string(), value))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SimulatorConfig::new().with_max_depth(args.max_depth);
    let result = match args.command {
        Command::Info { file } => info(file),
        Command::Table { file, block } => table(file, block, &config),
        Command::Run { file, assignments } => run(file, &assignments, config),
        Command::Demo { file } => demo(file, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn info(file: PathBuf) -> Result<()> {
    let project = Project::load_file(&file)?;

    println!("{}", file.display());
    println!(
        "canvas: {} components, {} lines",
        project.canvas.len(),
        project.canvas.lines().len()
    );
    for (id, component) in project.canvas.iter() {
        println!(
            "  {:<4} {:<10} {:<8} in={} out={}",
            id.to_string(),
            component.kind_name(),
            component.label(),
            component.inputs().len(),
            component.outputs().len()
        );
    }
    println!("palette: {} blocks", project.palette.len());
    for (i, block) in project.palette.iter().enumerate() {
        println!(
            "  [{i}] {:<8} in={} out={} interior={}",
            block.label,
            block.num_inputs(),
            block.num_outputs(),
            block.graph.len()
        );
    }
    Ok(())
}

fn table(file: PathBuf, block: Option<usize>, config: &SimulatorConfig) -> Result<()> {
    let project = Project::load_file(&file)?;
    let graph = match block {
        Some(index) => &project.template(index)?.graph,
        None => &project.canvas,
    };
    print!("{}", truth_table(graph, config)?);
    Ok(())
}

fn run(file: PathBuf, assignments: &[(String, i32)], config: SimulatorConfig) -> Result<()> {
    let mut sim = Simulator::with_config(Project::load_file(&file)?, config);
    sim.settle()?;

    for (label, value) in assignments {
        let id = sim.canvas().find_label(label)?;
        let is_bus = matches!(sim.canvas().component(id), Some(Component::InputBus(_)));
        if is_bus {
            sim.set_bus_value(id, *value)?;
        } else {
            sim.set_input(id, 0, *value != 0)?;
        }
    }

    let sinks: Vec<ComponentId> = sim.canvas().sinks().collect();
    for id in sinks {
        let bits = sim.read(id)?;
        let label = sim.canvas().component(id).map(|c| c.label()).unwrap_or("?");
        match sim.canvas().component(id) {
            Some(Component::OutputBus(bus)) => {
                let text: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
                println!("{label} = {text} ({})", bus.value());
            }
            _ => println!("{label} = {}", u8::from(bits.first().copied().unwrap_or(false))),
        }
    }
    Ok(())
}

fn labelled(mut component: Component, label: &str) -> Component {
    component.set_label(label);
    component
}

/// Build a half adder, package it as a block, and wire one instance to pins.
fn demo(file: PathBuf, config: SimulatorConfig) -> Result<()> {
    let mut sim = Simulator::with_config(Project::new(), config);
    let pin_in = |label| labelled(Component::Input(Input::new(Point::default())), label);
    let pin_out = |label| labelled(Component::Output(Output::new(Point::default())), label);
    let gate = |kind| Component::Gate(Gate::new(kind, Point::default()));

    let a = sim.place(&pin_in("A"), Point::new(20.0, 20.0))?;
    let b = sim.place(&pin_in("B"), Point::new(20.0, 80.0))?;
    let xor = sim.place(&gate(GateKind::Xor), Point::new(120.0, 20.0))?;
    let and = sim.place(&gate(GateKind::And), Point::new(120.0, 80.0))?;
    let s = sim.place(&pin_out("S"), Point::new(260.0, 20.0))?;
    let c = sim.place(&pin_out("C"), Point::new(260.0, 80.0))?;
    for (from, to) in [(a, xor), (b, and)] {
        sim.connect(ConnectorRef::output(from, 0), ConnectorRef::input(to, 0))?;
    }
    for (from, to) in [(b, xor), (a, and)] {
        sim.connect(ConnectorRef::output(from, 0), ConnectorRef::input(to, 1))?;
    }
    sim.connect(ConnectorRef::output(xor, 0), ConnectorRef::input(s, 0))?;
    sim.connect(ConnectorRef::output(and, 0), ConnectorRef::input(c, 0))?;

    let index = sim.create_block(&[a, b, xor, and, s, c], "HADD", Color::BLUE)?;
    sim.clear();

    let a = sim.place(&pin_in("A"), Point::new(20.0, 20.0))?;
    let b = sim.place(&pin_in("B"), Point::new(20.0, 80.0))?;
    let adder = sim.place_block(index, Point::new(120.0, 40.0))?;
    let s = sim.place(&pin_out("S"), Point::new(260.0, 20.0))?;
    let c = sim.place(&pin_out("C"), Point::new(260.0, 80.0))?;
    sim.connect(ConnectorRef::output(a, 0), ConnectorRef::input(adder, 0))?;
    sim.connect(ConnectorRef::output(b, 0), ConnectorRef::input(adder, 1))?;
    sim.connect(ConnectorRef::output(adder, 0), ConnectorRef::input(s, 0))?;
    sim.connect(ConnectorRef::output(adder, 1), ConnectorRef::input(c, 0))?;

    sim.save_file(&file)?;
    println!("wrote half adder demo to {}", file.display());
    Ok(())
}
