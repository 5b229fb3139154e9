//! List strategies command.

use anyhow::Result;
use quant_strategies::StrategyRegistry;

pub fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.kind);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Defaults: {}", serde_json::to_string(&info.default_config)?);
        println!();
    }

    println!("Use --strategy <kind> to select a strategy and --params '<json>' to override defaults.");

    Ok(())
}
