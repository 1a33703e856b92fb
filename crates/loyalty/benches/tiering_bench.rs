//! Benchmarks for tier generation and reward calculation.
//! Run with: cargo bench -p rewards-loyalty

use rewards_core::{ProgramConfig, TierConfig};
use rewards_loyalty::{Catalog, RewardCalculator, TierGenerator};

fn create_catalog(size: usize) -> Catalog {
    Catalog::from_entries((0..size).map(|i| {
        let price = 0.5 + ((i * 7919) % 10_000) as f64 / 20.0;
        (format!("item-{:05}", i), price)
    }))
}

fn main() {
    let program = ProgramConfig::default();
    let generator = TierGenerator::new(&program, &TierConfig::default());
    let calculator = RewardCalculator::new(&program);
    let catalog = create_catalog(5_000);

    // Warmup
    for _ in 0..10 {
        let tiers = generator.generate(&catalog);
        let _ = calculator.calculate(&catalog, &tiers);
    }

    let iterations = 1_000u32;
    let start = std::time::Instant::now();

    for _ in 0..iterations {
        let tiers = generator.generate(&catalog);
        let _ = calculator.calculate(&catalog, &tiers);
    }

    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations;

    println!("=== Tiering Benchmark ===");
    println!("Iterations:  {}", iterations);
    println!("Total time:  {:?}", elapsed);
    println!("Per run:     {:?}", per_iter);
    println!("Throughput:  {:.0} runs/sec", iterations as f64 / elapsed.as_secs_f64());
    println!("Catalog:     {} items", catalog.len());
}
