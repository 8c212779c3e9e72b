use clap::Parser;
use env_logger::Target;
use log::*;
use stealpool::thread_pool::{ThreadPool, WorkStealingThreadPool};
use stealpool::PoolEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new().target(Target::Stderr).build();
    env_logger::init();

    let cli = Cli::parse();
    info!("version {}", env!("CARGO_PKG_VERSION"));

    let mut builder = WorkStealingThreadPool::builder().max_queue_size(cli.capacity);
    if let Some(workers) = cli.workers {
        builder = builder.workers(workers);
    }
    if cli.events {
        builder = builder.observer(|event: PoolEvent| {
            // One JSON object per line keeps the stream machine-readable.
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
        });
    }
    let pool = builder.build()?;
    info!("pool running with {} workers", pool.workers());

    let completed = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    for seed in 0..cli.tasks {
        let completed = Arc::clone(&completed);
        let spin_us = cli.task_spin_us;
        pool.submit(move || {
            burn(seed as u64, spin_us);
            completed.fetch_add(1, Ordering::Relaxed);
        });
    }
    info!("{} tasks submitted in {:?}", cli.tasks, started.elapsed());

    // The pool hands out no completion handle, so completion is observed
    // through the caller-owned counter captured by every task.
    while completed.load(Ordering::Relaxed) < cli.tasks {
        std::thread::sleep(Duration::from_millis(1));
    }
    info!("{} tasks finished in {:?}", cli.tasks, started.elapsed());

    drop(pool);
    info!("pool shut down cleanly");

    Ok(())
}

/// Spin on integer mixing for roughly `spin_us` microseconds of CPU-bound
/// work per task.
fn burn(seed: u64, spin_us: u64) {
    let deadline = Instant::now() + Duration::from_micros(spin_us);
    let mut x = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(1);
    while Instant::now() < deadline {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
    }
    std::hint::black_box(x);
}

#[derive(Parser)]
#[command(version)]
pub struct Cli {
    #[arg(
        short,
        long,
        help = "worker thread count; defaults to a clamped cpu estimate"
    )]
    workers: Option<usize>,
    #[arg(short, long, default_value_t = 200)]
    tasks: usize,
    #[arg(
        short,
        long,
        default_value_t = 50,
        help = "per-queue capacity before submit blocks"
    )]
    capacity: usize,
    #[arg(long, default_value_t = 250, help = "busy work per task, in microseconds")]
    task_spin_us: u64,
    #[arg(long, help = "emit pool lifecycle events as JSON lines on stdout")]
    events: bool,
}
