use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use hospital_analyzer::config::Config;
use hospital_analyzer::logging;
use hospital_analyzer::pipeline::chart::ChartConfig;
use hospital_analyzer::pipeline::Analyzer;
use hospital_analyzer::server;

#[derive(Parser)]
#[command(name = "hospital_analyzer")]
#[command(about = "Hospital department load analyzer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a visits CSV and write the outputs to a directory
    Analyze {
        /// Input CSV; the bundled sample dataset when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory for counts.csv, chart.png and summary.txt
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },
    /// Start the demo server with the upload form
    Serve {
        /// Bind address (overrides config.toml)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config.toml)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn chart_config(config: &Config) -> ChartConfig {
    ChartConfig { width: config.chart.width, height: config.chart.height }
}

fn run_analyze(input: Option<PathBuf>, out_dir: PathBuf, config: &Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(chart_config(config));
    let analysis = match &input {
        Some(path) => {
            info!(path = %path.display(), "analyzing input file");
            analyzer.analyze_path(path)?
        }
        None => {
            info!("analyzing bundled sample dataset");
            analyzer.analyze(server::SAMPLE_CSV.as_bytes())?
        }
    };

    fs::create_dir_all(&out_dir)?;

    let counts_path = out_dir.join("counts.csv");
    let mut writer = csv::Writer::from_path(&counts_path)?;
    writer.write_record(["department", "patient_count", "percentage"])?;
    for stat in &analysis.aggregate {
        let patient_count = stat.patient_count.to_string();
        let percentage = format!("{:.2}", stat.percentage);
        writer.write_record([stat.department.as_str(), patient_count.as_str(), percentage.as_str()])?;
    }
    writer.flush()?;

    fs::write(out_dir.join("chart.png"), &analysis.chart_png)?;
    let summary_text = analysis.summary.render_text();
    fs::write(out_dir.join("summary.txt"), &summary_text)?;

    println!("{summary_text}");
    println!("\n📊 Wrote {} aggregate rows to {}", analysis.aggregate.len(), counts_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { input, out_dir } => run_analyze(input, out_dir, &config)?,
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            server::start_server(&host, port, chart_config(&config)).await?;
        }
    }

    Ok(())
}
