use std::path::PathBuf;

use clap::Parser;
use pack_allocator::config::Config;
use pack_allocator::render;
use pack_allocator::solver::{AllocationStrategy, Strategy};
use pack_allocator::{AllocationService, Fulfillment};

#[derive(Parser)]
#[command(
    name = "pack_allocator",
    about = "Fulfill an order with the fewest items, then the fewest packs"
)]
struct Cli {
    /// Number of items ordered
    #[arg(long, allow_negative_numbers = true)]
    items: i64,

    /// Pack sizes (e.g. 250 500 1000); defaults to the configured catalog
    #[arg(long = "packs", num_args = 1.., allow_negative_numbers = true)]
    packs: Vec<i64>,

    /// Strategy: bounded-dp or shortest-path
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// Run every strategy and fail if they disagree
    #[arg(long)]
    compare: bool,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show a bar per pack size
    #[arg(long)]
    layout: bool,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_fulfillment(items: u64, fulfillment: &Fulfillment, layout: bool) {
    for (size, count) in fulfillment.iter() {
        println!("  {} x {}", size, count);
    }
    if layout {
        print!("{}", render::render_fulfillment(fulfillment));
    }
    println!();

    let packs = fulfillment.pack_count();
    println!(
        "Summary: {} pack{} used, {} items shipped, {} over",
        packs,
        if packs == 1 { "" } else { "s" },
        fulfillment.total_items(),
        fulfillment.overage(items),
    );
}

fn main() {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(e));
    if !cli.packs.is_empty() {
        config.solver.pack_sizes = cli.packs.clone();
    }
    if let Some(strategy) = cli.strategy {
        config.solver.strategy = strategy;
    }

    // One-shot runs gain nothing from the cache.
    config.cache.enabled = false;
    let service =
        AllocationService::from_config(&config.solver, &config.cache).unwrap_or_else(|e| fail(e));

    let fulfillment = service.solve(cli.items).unwrap_or_else(|e| fail(e));
    let items = cli.items as u64;

    if cli.compare {
        let snapshot = service.list_catalog();
        for strategy in Strategy::ALL {
            let required = strategy.state_space(items, &snapshot.catalog);
            if required > config.solver.max_table_len {
                println!(
                    "Skipping {}: needs {} states, above the budget of {}.",
                    strategy.name(),
                    required,
                    config.solver.max_table_len
                );
                continue;
            }
            let other = strategy
                .solve(items, &snapshot.catalog)
                .unwrap_or_else(|e| fail(e));
            if other != fulfillment {
                fail(format!(
                    "{} returned {} but {} returned {}",
                    service.strategy_name(),
                    fulfillment,
                    strategy.name(),
                    other
                ));
            }
        }
        println!("All strategies agree.");
    }

    println!("Order of {} items:", items);
    print_fulfillment(items, &fulfillment, cli.layout);
}
