//! Ping-pong 仿真
//!
//! 运行若干对互相收发消息的实体，打印最终时钟与统计信息

use clap::Parser;
use cloudsim_rs::demo::{PingPongOpts, build_ping_pong};
use cloudsim_rs::sim::{SimConfig, SimStats, SimTime, Simulation};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Parser)]
#[command(name = "ping_pong", about = "Ping-pong 仿真：N 对实体互相收发 PING/PONG")]
struct Args {
    #[arg(long, default_value_t = 2)]
    pairs: usize,
    #[arg(long, default_value_t = 5)]
    rounds: u64,
    /// 每次回复的延迟（秒）
    #[arg(long, default_value_t = 1.0)]
    delay: f64,
    /// 在此时刻（秒）终止仿真
    #[arg(long)]
    terminate_at: Option<f64>,
    /// JSON 配置文件（SimConfig）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    final_time: f64,
    completed_rounds: u64,
    stats: SimStats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化 tracing（输出到 stderr，stdout 留给结果）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => SimConfig::from_path(path)?,
        None => SimConfig::default(),
    };
    let mut sim = Simulation::new(cfg)?;
    if let Some(t) = args.terminate_at {
        sim.terminate_at(SimTime::from_secs(t));
    }

    let opts = PingPongOpts {
        pairs: args.pairs,
        rounds: args.rounds,
        delay: args.delay,
    };
    let completed = Arc::new(AtomicU64::new(0));
    build_ping_pong(&mut sim, &opts, &completed)?;

    let final_time = sim.start()?;

    let summary = Summary {
        final_time: final_time.as_secs(),
        completed_rounds: completed.load(Ordering::Relaxed),
        stats: sim.stats(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "done @ {}, completed_rounds={}, processed_events={}",
            final_time, summary.completed_rounds, summary.stats.processed_events
        );
    }
    Ok(())
}
