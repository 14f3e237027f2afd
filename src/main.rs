//! outline2pcb - Turn a board outline into Gerber, drill and SVG files

use outline2pcb::{config::Config, error::Result, generator::Generator};
use tracing::{error, info};

fn main() -> Result<()> {
    // Parse configuration and initialize logging
    let config = Config::from_args().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let output_path = config.output_path.clone();
    let mut generator = Generator::new(config);

    match generator.run() {
        Ok(()) => {
            let stats = generator.get_generation_stats();
            info!("Generated {} files", stats.total_files());

            println!(
                "Generated {} Gerber, {} drill and {} SVG files in {}",
                stats.gerber_files,
                stats.drill_files,
                stats.svg_files,
                output_path.display()
            );
            if let Some(archive) = &stats.archive {
                println!("Upload bundle: {}", archive.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
