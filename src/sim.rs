use sim_lib::flags::SimArgs;
use sim_lib::run_wrapper;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let args = SimArgs::from_env_or_exit();
    let policy = args.policy();

    // RUST_LOG overrides the verbosity flag
    let default_level = if policy.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let report =
        run_wrapper::run(&args.program, args.kind(), policy, args.data_size())?;
    run_wrapper::print_results(&report);

    Ok(())
}
