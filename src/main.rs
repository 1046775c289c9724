use feedopt::{init_logging, run, FeedTargets, SolverConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = SolverConfig::from_env();
    let stdout = std::io::stdout();
    run(config, &FeedTargets::default(), &mut stdout.lock())?;

    Ok(())
}
