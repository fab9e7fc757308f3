//! fleetmip: solve airline fleet allocation instances.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solver_alloc::{formulate, solve_allocation, AllocationData, AllocationReport};
use solver_mip::{MilpSolution, MipSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fleet allocation by branch-and-cut")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve an instance and print the allocation
    Solve(SolveArgs),
    /// Print the dimensions of an instance's MILP
    Formulate {
        /// Instance JSON file
        instance: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Instance JSON file
    instance: PathBuf,

    /// Run the Gomory cut pass before branching
    #[arg(long)]
    cuts: bool,

    /// Relative gap to the root relaxation at which to stop
    #[arg(long, default_value_t = 0.03)]
    gap_tol: f64,

    /// Maximum number of LP relaxations to solve
    #[arg(long)]
    max_nodes: Option<u64>,

    /// Time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Write the allocation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log search progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Solve(args) if args.verbose);
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Command::Solve(args) => solve(args),
        Command::Formulate { instance } => describe(instance),
    }
}

fn load(path: &Path) -> Result<AllocationData> {
    AllocationData::load(path).with_context(|| format!("Failed to load instance {}", path.display()))
}

fn solve(args: SolveArgs) -> Result<()> {
    let data = load(&args.instance)?;

    let mut settings = MipSettings::default().with_gap_tol(args.gap_tol);
    if args.cuts {
        settings = settings.with_cut_planes(true);
    }
    if let Some(n) = args.max_nodes {
        settings = settings.with_max_nodes(n);
    }
    if let Some(secs) = args.time_limit {
        settings = settings.with_time_limit(secs);
    }
    settings.verbose = args.verbose;

    let outcome = solve_allocation(&data, &settings).context("Solve failed")?;
    print_summary(&outcome.solution);

    let Some(report) = outcome.report else {
        println!("\nNo feasible allocation.");
        return Ok(());
    };
    print_report(&data, &report);

    if let Some(path) = &args.report {
        report
            .save_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

fn describe(path: PathBuf) -> Result<()> {
    let data = load(&path)?;
    let prob = formulate(&data).context("Formulation failed")?;

    println!("{}", path.display());
    println!("  routes:          {}", data.num_routes());
    println!("  aircraft types:  {}", data.num_types());
    println!("  variables:       {} ({} integer)", prob.num_vars(), prob.num_integers());
    println!(
        "  rows:            {} ({} continuous-only, {} with trips)",
        prob.a.nrows(),
        prob.ineq_rows.continuous.len(),
        prob.ineq_rows.integer.len()
    );
    Ok(())
}

fn print_summary(sol: &MilpSolution) {
    println!("{}", "=".repeat(60));
    println!("Status:        {} ({})", sol.termination, sol.stop_reason);
    if sol.success {
        println!("Objective:     {:.4}", sol.obj_val);
    }
    if let Some(root) = sol.root_bound() {
        println!("Root bound:    {:.4}", root);
    }
    if sol.success {
        println!("Gap:           {:.2}%", sol.gap * 100.0);
    }
    println!("LP solves:     {}", sol.oracle_calls);
    println!("Branched:      {}", sol.nodes_branched);
    println!("Fathomed:      {}", sol.nodes_fathomed);
    println!("Cuts:          {}", sol.cuts_added);
    println!("Candidates:    {}", sol.candidates.len());
    println!("Time:          {} ms", sol.solve_time_ms);
    println!("{}", "=".repeat(60));
}

fn print_report(data: &AllocationData, report: &AllocationReport) {
    println!("\nRound-trip allocation");
    for (k, t) in report.types.iter().enumerate() {
        let name = if t.name.is_empty() { format!("type {}", k) } else { t.name.clone() };
        println!(
            "  {:<16} trips {:>6.0}  fleet {:>3.0}  pax {:>8.0}  seats {:>8.0}  fuel {:>10.1}",
            name, t.trips, t.fleet_used, t.pax, t.seat_capacity, t.fuel
        );
    }

    println!("\nRoutes");
    for (j, r) in report.routes.iter().enumerate() {
        let name = if r.name.is_empty() { format!("route {}", j) } else { r.name.clone() };
        let flown: Vec<String> = r
            .allocations
            .iter()
            .map(|a| format!("{}x{:.0}", data.aircraft[a.aircraft].name, a.trips))
            .collect();
        println!(
            "  {:<16} pax {:>8.0}  revenue {:>12.2}  cost {:>12.2}  profit {:>12.2}  [{}]",
            name,
            r.pax,
            r.revenue,
            r.cost,
            r.profit,
            flown.join(", ")
        );
    }

    println!("\nTotal cost:     {:.2}", report.total_cost);
    println!("Total revenue:  {:.2}", report.total_revenue);
    println!("Profit:         {:.2}", report.profit);
    println!("Profit / pnm:   {:.6}", report.profit_per_pax_mile);
}
