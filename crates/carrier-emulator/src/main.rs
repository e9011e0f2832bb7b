//! Carrier Emulator CLI
//!
//! 承运商模拟器的命令行入口点。

use carrier_emulator::cli::{Cli, CommandRunner, Commands};
use clap::Parser;
use trackbox_shared::config::AppConfig;
use trackbox_shared::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("carrier-emulator").unwrap_or_else(|e| {
        eprintln!("加载配置失败，使用默认配置: {}", e);
        AppConfig::default()
    });
    if config.service_name.is_empty() {
        config.service_name = "carrier-emulator".to_string();
        config.observability.service_name = config.service_name.clone();
    }

    // RUST_LOG 优先于这里的级别
    cli.apply_to(&mut config);
    let _guard = observability::init(&config.observability).await?;

    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Server {
            port,
            seed_file,
            random_seed,
        } => {
            runner.run_server(port, seed_file, random_seed).await?;
        }
        Commands::Generate {
            count,
            carriers,
            step_seconds,
            progress_prob,
            output,
        } => {
            runner
                .run_generate(count, carriers, step_seconds, progress_prob, output)
                .await?;
        }
        Commands::Seed {
            emulator_base,
            file,
            kind,
        } => {
            runner.run_seed(&emulator_base, &file, kind).await?;
        }
    }

    Ok(())
}
