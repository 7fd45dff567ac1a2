//! Drive a TAGE predictor with a synthetic branch stream and report how 
//! well it does.

use anyhow::Result;
use clap::{ Parser, ValueEnum };
use log::{ debug, info };
use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };
use std::time::Instant;

use tagebp::*;
use tagebp::stats::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Pattern {
    /// One branch, strictly alternating
    Alternating,
    /// A counted loop with a fixed trip count
    Loop,
    /// A branch whose outcome repeats that of an earlier branch
    Correlated,
    /// Uniformly random outcomes over a set of branches
    Random,
    /// All of the above, interleaved
    Mixed,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Simple,
    UseAlt,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Aging {
    Halve,
    ClearHighBit,
}

#[derive(Parser)]
#[command(name = "evaluate-tage", about = "Evaluate a TAGE predictor on synthetic branches")]
struct Args {
    /// Shape of the synthetic branch stream
    #[arg(short, long, value_enum, default_value = "mixed")]
    pattern: Pattern,

    /// Number of conditional branches to simulate
    #[arg(short, long, default_value_t = 1_000_000)]
    branches: usize,

    /// Seed for both the workload and the predictor
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value = "simple")]
    policy: Policy,

    #[arg(long, value_enum, default_value = "halve")]
    aging: Aging,

    /// Number of low hit-rate branches to list
    #[arg(long, default_value_t = 8)]
    worst: usize,
}

/// Generates a stream of branches resembling some simple program shapes.
struct Workload {
    rng: StdRng,
    pattern: Pattern,
    step: usize,
    last: Outcome,
}
impl Workload {
    const LOOP_TRIP_COUNT: usize = 7;

    fn new(pattern: Pattern, seed: u64) -> Self {
        Self { 
            rng: StdRng::seed_from_u64(seed ^ 0x5eed), 
            pattern, 
            step: 0, 
            last: Outcome::N,
        }
    }

    /// Emit the records for the next conditional branch, preceded by any 
    /// unconditional branches on the way to it.
    fn next_block(&mut self, out: &mut Vec<BranchRecord>) {
        let pattern = match self.pattern {
            Pattern::Mixed => match self.rng.gen_range(0..4) {
                0 => Pattern::Alternating,
                1 => Pattern::Loop,
                2 => Pattern::Correlated,
                _ => Pattern::Random,
            },
            p => p,
        };
        self.step += 1;

        match pattern {
            Pattern::Alternating => {
                let outcome = Outcome::from(self.step % 2 == 0);
                out.push(BranchRecord::conditional(0x0040_1000, outcome));
            },
            Pattern::Loop => {
                let outcome = Outcome::from(self.step % Self::LOOP_TRIP_COUNT != 0);
                out.push(BranchRecord::unconditional(0x0040_2000));
                out.push(BranchRecord::conditional(0x0040_2010, outcome));
            },
            Pattern::Correlated => {
                let first = Outcome::from(self.rng.gen::<bool>());
                out.push(BranchRecord::conditional(0x0040_3000, first));
                out.push(BranchRecord::unconditional(0x0040_3008));
                out.push(BranchRecord::conditional(0x0040_3020, self.last));
                self.last = first;
            },
            Pattern::Random => {
                let pc = 0x0040_4000 + (self.rng.gen_range(0..64) << 2);
                out.push(BranchRecord::conditional(pc, self.rng.gen::<bool>().into()));
            },
            Pattern::Mixed => unreachable!(),
        }
    }

    fn generate(mut self, branches: usize) -> Vec<BranchRecord> {
        let mut records = Vec::with_capacity(branches * 2);
        let mut conditional = 0;
        while conditional < branches {
            let start = records.len();
            self.next_block(&mut records);
            conditional += records[start..].iter()
                .filter(|r| r.is_conditional()).count();
        }
        records
    }
}

fn build_tage(args: &Args) -> Result<TAGEPredictor> {
    let policy = match args.policy {
        Policy::Simple => AltPolicy::Simple,
        Policy::UseAlt => AltPolicy::UseAltOnNewAlloc,
    };
    let aging = match args.aging {
        Aging::Halve => UsefulAging::Halve,
        Aging::ClearHighBit => UsefulAging::ClearHighBit,
    };
    let cfg = TAGEConfig::default()
        .with_alt_policy(policy)
        .with_aging(aging);
    Ok(cfg.build_seeded(args.seed)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = Workload::new(args.pattern, args.seed).generate(args.branches);
    debug!("generated {} records ({:?})", records.len(), args.pattern);

    let mut tage = build_tage(&args)?;
    let cfg = tage.config();
    println!("[*] TAGE configuration:");
    println!("      Entries (in total): {}", cfg.total_entries());
    println!("        {} entries (base component)", cfg.base.size());
    for (idx, c) in cfg.comp.iter().enumerate() {
        println!("        {} entries (tagged component {}, {} history bits, {} tag bits)", 
            c.size(), idx + 1, c.history_len, c.tag_bits,
        );
    }
    let storage_bits = cfg.storage_bits();
    let storage_kib = storage_bits as f64 / 1024.0 / 8.0;
    println!("      Storage bits: {}b, {:.2}KiB", storage_bits, storage_kib);
    println!("      Policy: {:?}, aging: {:?}", cfg.alt_policy, cfg.aging);

    let mut stats = BranchStats::new();
    let start = Instant::now();
    for record in records.iter() {
        if record.is_conditional() {
            let prediction = tage.predict(record.pc);
            stats.record(record, prediction);
            tage.update(record.pc, record.outcome);
        } else {
            tage.add_non_conditional_branch();
        }
    }
    info!("simulated {} records in {:.3?}", records.len(), start.elapsed());
    println!();

    println!("[*] Global statistics:");
    println!("      Unique branches: {}", stats.num_unique_branches());
    println!("      Global hit rate: {}/{} ({:.2}% correct) ({} misses)", 
        stats.global_hits, stats.global_brns, 
        stats.hit_rate() * 100.0, stats.global_miss()
    );
    println!();

    let tstat = tage.stats();
    println!("[*] Per-component statistics:");
    println!("      Base component:");
    println!("        {} misses, {} hits", tstat.base_miss, tstat.base_hits);
    for (idx, comp) in tage.components().iter().enumerate() {
        println!("      Component[{}] (history {:3}):", idx + 1, comp.cfg.history_len);
        println!("        {} misses, {} hits, {} allocations, {} useful entries", 
            tstat.comp_miss[idx], tstat.comp_hits[idx], tstat.alcs[idx],
            comp.num_useful_entries(),
        );
    }
    println!("      Failed allocations: {}", tstat.failed_alcs);
    println!("      Alternate predictions used: {}", tstat.alt_used);
    println!("      Useful counter agings: {}", tstat.resets);
    println!();

    println!("[*] Low hit-rate branches:");
    for (pc, data) in stats.get_low_rate_branches(args.worst, 100, 0.55) {
        println!("      {:08x} {:8}/{:8} {:.4}", pc, data.hits, data.occ, data.hit_rate());
    }
    Ok(())
}
