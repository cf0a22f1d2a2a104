use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use gch_complex::{ComplexInfo, GraphComplex, PipelineOpts};
use gch_core::Config;
use gch_exec::RunReport;
use gch_hairy::{hairy_complex, HairyDifferential};
use gch_linalg::RankMode;
use gch_ordinary::ordinary_contract_complex;
use gch_store::{FsStore, Store};
use gch_wohairy::{wohairy_complex, WoHairyDifferential};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    /// Ordinary graphs with the contract-edges differential.
    #[value(name = "o_ce")]
    OrdinaryContract,
    /// Hairy graphs with the contract-edges differential.
    #[value(name = "h_ce")]
    HairyContract,
    /// Hairy graphs with contract-edges and edge-to-one-hair differentials.
    #[value(name = "h_etoh")]
    HairyEdgeToHair,
    /// Wo-hairy graphs with contract-edges and eps-to-omega differentials.
    #[value(name = "wo_ce")]
    WoHairyContract,
}

fn parse_range(arg: &str) -> Result<Range<usize>, String> {
    let (min, max) = arg
        .split_once(',')
        .ok_or_else(|| "expected min,max".to_string())?;
    let min: usize = min.trim().parse().map_err(|_| "bad minimum".to_string())?;
    let max: usize = max.trim().parse().map_err(|_| "bad maximum".to_string())?;
    if min >= max {
        return Err("range min,max with min < max expected".to_string());
    }
    Ok(min..max)
}

/// Compute the cohomology of a graph complex.
#[derive(Debug, Parser)]
#[command(name = "gch", version)]
struct Cli {
    /// Graph complex family.
    family: Family,

    /// Even edges.
    #[arg(long = "even-e")]
    even_e: bool,
    /// Odd edges.
    #[arg(long = "odd-e")]
    odd_e: bool,
    /// Even hairs.
    #[arg(long = "even-h")]
    even_h: bool,
    /// Odd hairs.
    #[arg(long = "odd-h")]
    odd_h: bool,

    /// Range min,max for the number of vertices.
    #[arg(short = 'v', value_parser = parse_range)]
    vertices: Option<Range<usize>>,
    /// Range min,max for the number of loops.
    #[arg(short = 'l', value_parser = parse_range)]
    loops: Option<Range<usize>>,
    /// Range min,max for the number of hairs.
    #[arg(long, value_parser = parse_range)]
    hairs: Option<Range<usize>>,
    /// Range min,max for the number of omega decorations.
    #[arg(long, value_parser = parse_range)]
    ws: Option<Range<usize>>,

    /// Ignore existing store files and rebuild.
    #[arg(long = "ignore-ex")]
    ignore_existing: bool,
    /// Number of parallel jobs.
    #[arg(long = "n-jobs", default_value_t = 1)]
    n_jobs: usize,
    /// Show per-job progress (single-job runs only).
    #[arg(long)]
    progress: bool,

    /// Exact integer rank computation.
    #[arg(long = "exact-rank")]
    exact_rank: bool,
    /// Compute ranks modulo this many primes.
    #[arg(long = "n-primes", default_value_t = 1)]
    n_primes: usize,
    /// Never fall back to the randomised rank estimate.
    #[arg(long = "no-est-rank")]
    no_estimate: bool,

    /// Build bases and operator matrices, then stop.
    #[arg(long)]
    build: bool,
    /// Build only the bases.
    #[arg(long = "build-b")]
    build_basis: bool,
    /// Build only the operator matrices.
    #[arg(long = "build-op")]
    build_operator: bool,
    /// Compute matrix ranks.
    #[arg(long)]
    rank: bool,
    /// Compute cohomology dimensions.
    #[arg(long)]
    coho: bool,
    /// Run the square-zero test.
    #[arg(long = "square-zero")]
    square_zero: bool,

    /// Data directory of the persistent store.
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let even_edges = match (cli.even_e, cli.odd_e) {
        (true, false) => true,
        (false, true) => false,
        _ if cli.family == Family::WoHairyContract => false,
        _ => return Err("specify exactly one of --even-e and --odd-e".to_string()),
    };
    let v_range = cli
        .vertices
        .clone()
        .ok_or_else(|| "specify -v: range for the number of vertices".to_string())?;
    let l_range = cli
        .loops
        .clone()
        .ok_or_else(|| "specify -l: range for the number of loops".to_string())?;

    let complex = match cli.family {
        Family::OrdinaryContract => ordinary_contract_complex(v_range, l_range, even_edges),
        Family::HairyContract | Family::HairyEdgeToHair => {
            let even_hairs = match (cli.even_h, cli.odd_h) {
                (true, false) => true,
                (false, true) => false,
                _ => return Err("specify exactly one of --even-h and --odd-h".to_string()),
            };
            let h_range = cli
                .hairs
                .clone()
                .ok_or_else(|| "specify --hairs: range for the number of hairs".to_string())?;
            let differentials: &[HairyDifferential] = if cli.family == Family::HairyContract {
                &[HairyDifferential::Contract]
            } else {
                &[HairyDifferential::Contract, HairyDifferential::EdgeToOneHair]
            };
            hairy_complex(
                v_range,
                l_range,
                h_range,
                even_edges,
                even_hairs,
                differentials,
            )
        }
        Family::WoHairyContract => {
            let h_range = cli
                .hairs
                .clone()
                .ok_or_else(|| "specify --hairs: range for the number of hairs".to_string())?;
            let w_range = cli
                .ws
                .clone()
                .ok_or_else(|| "specify --ws: range for the number of omegas".to_string())?;
            wohairy_complex(
                v_range,
                l_range,
                h_range,
                w_range,
                &[WoHairyDifferential::Contract, WoHairyDifferential::EpsToOmega],
            )
        }
    };

    let rank_mode = if cli.exact_rank {
        RankMode::Exact
    } else if cli.n_primes > 0 {
        RankMode::Modular {
            n_primes: cli.n_primes,
        }
    } else if !cli.no_estimate {
        RankMode::Estimate { seed: 0 }
    } else {
        return Err("no rank mode left: pass --exact-rank or --n-primes N".to_string());
    };

    let store: Arc<dyn Store> = Arc::new(FsStore::new(&cli.data_dir));
    let config = Config::with_data_dir(&cli.data_dir);
    let opts = PipelineOpts {
        ignore_existing: cli.ignore_existing,
        n_jobs: cli.n_jobs,
        progress: cli.progress,
        skip_if_no_basis: true,
    };

    println!("{}", complex.name());
    let run_all =
        !(cli.build || cli.build_basis || cli.build_operator || cli.rank || cli.coho || cli.square_zero);
    let mut failed = false;

    if run_all || cli.build || cli.build_basis {
        let report = complex.build_basis(Arc::clone(&store), &config, &opts);
        failed |= print_report("build basis", &report);
    }
    if run_all || cli.build || cli.build_operator {
        let report = complex.build_matrix(Arc::clone(&store), &opts);
        failed |= print_report("build matrix", &report);
    }
    if cli.square_zero {
        let reports = complex
            .square_zero_test(store.as_ref(), &config)
            .map_err(|err| err.to_string())?;
        for (name, report) in reports {
            println!("square zero [{name}]: {}", report.summary());
            for failure in &report.failures {
                eprintln!("square zero [{name}] failed: {failure}");
            }
            if report.failed() > 0 {
                failed = true;
            }
        }
    }
    if run_all || cli.rank {
        let report = complex.compute_rank(Arc::clone(&store), rank_mode, &config, &opts);
        failed |= print_report("compute rank", &report);
    }
    if run_all || cli.coho {
        match complex.compute_cohomology(store.as_ref()) {
            Ok(tables) => {
                for table in &tables {
                    println!("cohomology [{}]:", table.differential);
                    for entry in &table.entries {
                        match entry.dim {
                            Some(dim) => println!("  {}: {dim}", entry.space),
                            None => println!("  {}: unknown", entry.space),
                        }
                    }
                }
            }
            Err(err) => {
                eprintln!("cohomology failed: {err}");
                failed = true;
            }
        }
        let info = ComplexInfo::collect(&complex, store.as_ref());
        if let Err(err) = info.write(store.as_ref(), &info_key(&complex)) {
            eprintln!("info dump failed: {err}");
        }
    }

    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn info_key(complex: &GraphComplex) -> String {
    let slug: String = complex
        .name()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("info/{slug}.json")
}

fn print_report(step: &str, report: &RunReport) -> bool {
    println!(
        "{step}: {} completed, {} failed, {} skipped",
        report.completed,
        report.failed.len(),
        report.skipped
    );
    for (label, err) in &report.failed {
        eprintln!("{step} failed for {label}: {err}");
    }
    !report.failed.is_empty()
}
