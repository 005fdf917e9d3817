use anyhow::Context;
use mdtext::{load_config, ConversionService, ConversionServiceImpl};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Arguments: input directory, optional output directory
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: convert_dir <input_dir> [output_dir]");
        std::process::exit(2);
    }
    let input_dir = PathBuf::from(&args[1]);

    let mut config = load_config().context("Failed to load configuration")?;
    if let Some(output_dir) = args.get(2) {
        config.output.output_dir = Some(PathBuf::from(output_dir));
    }

    let service = ConversionServiceImpl::new(Arc::new(config));
    let report = service
        .convert_directory(&input_dir)
        .await
        .with_context(|| format!("Failed to convert {:?}", input_dir))?;

    println!(
        "Converted {} file(s), skipped {}, failed {}",
        report.converted,
        report.skipped,
        report.failures.len()
    );
    for (path, reason) in &report.failures {
        eprintln!("  {}: {}", path.display(), reason);
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
