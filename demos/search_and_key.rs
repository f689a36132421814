//! Demo: planning and running a search, then exchanging a key, on the simulator.
//! Shows how the iteration strategies differ and how an eavesdropper shows up
//! in the CHSH value.

use qkit::search::{self, IterationStrategy};
use qkit::{
    BackendConfig, KeyDistributionOptions, QkitError, QuantumContext, SamplingStrategy, SearchOptions, Simulator,
};

// Helper printing a key-exchange report line
fn report(label: &str, ctx: &QuantumContext<Simulator>, options: &KeyDistributionOptions) -> Result<(), QkitError> {
    let report = ctx.verify_channel_security(options)?;
    println!(
        "{:<18} secure={:<5} S={:.4} margin={:>5.1}% QBER={:.4}",
        label,
        report.is_secure,
        report.security_parameter,
        qkit::security_margin(report.security_parameter),
        report.error_rate
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- qkit Demo: Amplitude amplification search ---");

    let items: Vec<u32> = (0..4096).collect();
    let is_target = |x: &u32| x % 1024 == 7;

    // Iteration counts for 4 matches among 4096 items
    for strategy in [
        IterationStrategy::Optimal,
        IterationStrategy::Aggressive,
        IterationStrategy::Conservative,
        IterationStrategy::HalfOptimal,
        IterationStrategy::SingleIteration,
    ] {
        println!("{:<16} {:>3} rounds", format!("{:?}", strategy), search::compute_iterations(4096, 4, strategy));
    }

    let ctx = QuantumContext::new(BackendConfig::simulator(), Simulator::new().with_seed(2024))?;
    let options = SearchOptions {
        sampling_strategy: SamplingStrategy::FullScan,
        ..SearchOptions::default()
    };
    let plan = ctx.plan_search(&items, &is_target, &options)?;
    println!("\nPlan: {}", plan);

    match ctx.search(&items, &is_target, &options) {
        Ok(found) => {
            for m in &found {
                println!("  found index {} (value {})", m.index, m.item);
            }
        }
        Err(QkitError::NoMatches) => println!("  no match within {} attempts", plan.max_attempts),
        Err(e) => return Err(e.into()),
    }

    println!("\n--- qkit Demo: E91 key distribution ---");
    let key_options = KeyDistributionOptions { key_length: 128, ..KeyDistributionOptions::default() };

    let outcome = ctx.generate_key_with_retries(&key_options)?;
    println!("Outcome: {}", outcome);

    let clean = QuantumContext::new(BackendConfig::simulator(), Simulator::new().with_seed(1))?;
    let noisy = QuantumContext::new(BackendConfig::simulator(), Simulator::new().with_seed(1).with_noise(0.05))?;
    let tapped = QuantumContext::new(BackendConfig::simulator(), Simulator::new().with_seed(1).with_eavesdropper(1.0))?;
    report("clean channel", &clean, &key_options)?;
    report("noisy channel", &noisy, &key_options)?;
    report("eavesdropped", &tapped, &key_options)?;

    Ok(())
}
