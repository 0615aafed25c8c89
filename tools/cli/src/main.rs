use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};
use tenure_probe::{
    DEFAULT_INITIAL_SIZE, GenerationalHeap, HeapConfig, ManagedRuntime, ProbeConfig, ProbeReport,
    Prober, Reporter, RuntimeIntrospector,
};

/// Environment variable naming a TOML heap configuration
const HEAP_CONFIG_ENV: &str = "TENURE_PROBE_HEAP";

/// Find the allocation size at which objects go straight to the tenured generation
#[derive(Debug, Parser)]
#[command(name = "tenure-probe", version)]
struct CliArgs {
    /// Initial probe size in bytes
    #[arg(value_name = "SIZE", default_value_t = DEFAULT_INITIAL_SIZE)]
    size: usize,
}

fn load_heap_config() -> Result<HeapConfig> {
    match std::env::var_os(HEAP_CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            HeapConfig::from_file(&path)
                .with_context(|| format!("Failed to load heap config {}", path.display()))
        }
        None => Ok(HeapConfig::default()),
    }
}

/// Search `runtime` starting at `size`, writing findings to `reporter`
fn search<R, O, E>(runtime: &R, size: usize, mut reporter: Reporter<O, E>) -> Result<ProbeReport>
where
    R: ManagedRuntime + ?Sized,
    O: Write,
    E: Write,
{
    reporter.tracking()?;
    let mut prober = Prober::new(runtime, ProbeConfig::with_initial_size(size), reporter)
        .context("Failed to bind runtime collectors")?;
    prober.run().context("Search aborted")
}

fn run(args: &CliArgs) -> Result<()> {
    let heap = GenerationalHeap::new(load_heap_config()?).context("Invalid heap config")?;
    debug!("Heap config: {:?}", heap.config());

    let reporter = Reporter::stdio(
        heap.young_generation_name(),
        heap.tenured_generation_name(),
    );
    let report = search(&heap, args.size, reporter)?;

    debug!(
        "{} rounds, first direct tenured size {:?}, collections {:?}",
        report.rounds.len(),
        report.first_direct_tenured(),
        heap.collection_stats()
    );
    Ok(())
}

/// Process exit status for the outcome of a run
fn exit_status<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    let result = run(&args);
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    process::exit(exit_status(&result));
}
