use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use pc_render::{pipeline, Mitsuba, RenderArgs, RenderConfig};

#[derive(Parser)]
#[command(name = "pc-render", about = "Point cloud scene rendering.")]
#[command(author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a point cloud into an image with the external renderer
    Render(RenderArgs),
    /// Write the final sphere positions and colors as ascii ply next to the output
    Export(RenderArgs),
}

fn main() -> anyhow::Result<()> {
    // load .env
    dotenvy::dotenv().ok();

    // setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pc_render=info,pc_io=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            let config = RenderConfig::try_from(args)?;
            let pc = pipeline::load(&config)
                .with_context(|| format!("Load {}", config.path.display()))?;

            let renderer = Mitsuba::new(&config.renderer);
            let images = pipeline::render(&pc, &config, &renderer).context("Render")?;
            for image in images {
                tracing::info!("Wrote {}", image.display());
            }
        }
        Commands::Export(args) => {
            let config = RenderConfig::try_from(args)?;
            let pc = pipeline::load(&config)
                .with_context(|| format!("Load {}", config.path.display()))?;

            let target = config.output.with_extension("ply");
            pipeline::export(&pc, &config, &target).context("Export")?;
        }
    }

    Ok(())
}
