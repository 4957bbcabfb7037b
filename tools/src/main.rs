//! draw-runner: headless driver for the numdraw engine.
//!
//! Usage:
//!   draw-runner --data-dir ./data --mode mode1 --max 50 --count 3
//!   draw-runner --data-dir ./data --mode mode1 --max 50 --gender female
//!   draw-runner --data-dir ./data --set-rate mode1:7:3
//!   draw-runner --data-dir ./data --set-chain mode1:5:9
//!   draw-runner --data-dir ./data --list-rules
//!   draw-runner --data-dir ./data --import mode1 --file history.txt
//!   draw-runner --data-dir ./data --reset mode1
//!
//! The runner stands in for the real front end: it checks the gates,
//! wires an engine over the data directory, and prints audit records
//! as JSON lines.

use anyhow::{bail, Context, Result};
use numdraw_core::{
    audit::FileAuditSink,
    config::DataPaths,
    engine::DrawEngine,
    gates::{AccessGate, AlwaysOpen, AuthLevel, DrawGate},
    types::{Gender, Mode},
};
use std::env;
use std::fs;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag_value(&args, "--data-dir").unwrap_or_else(|| "./data".to_string());
    let paths = DataPaths::new(&data_dir);

    let seed = match flag_value(&args, "--seed") {
        Some(raw) => raw.parse().context("--seed must be a u64")?,
        None => chrono::Utc::now().timestamp_millis() as u64,
    };

    let gate = AlwaysOpen;
    let sink = Box::new(FileAuditSink::new(paths.audit_log()));
    let mut engine = DrawEngine::open(&paths, seed, sink).context("open engine")?;
    log::info!("engine ready: data-dir={data_dir} seed={seed}");

    // Admin operations first; each one is exclusive.
    if let Some(spec) = flag_value(&args, "--set-rate") {
        require_admin(&gate)?;
        let (mode, number, rate) = parse_triple(&spec)?;
        if !engine.rules().set_rate(mode, number, rate) {
            bail!("set-rate failed (see log)");
        }
        println!("rate rule set: ({mode}, {number}) every {rate}");
        return Ok(());
    }

    if let Some(spec) = flag_value(&args, "--set-chain") {
        require_admin(&gate)?;
        let (mode, trigger, target) = parse_triple(&spec)?;
        if !engine.rules().set_chain(mode, trigger, target) {
            bail!("set-chain failed (see log)");
        }
        println!("chain rule set: ({mode}, {trigger} -> {target})");
        return Ok(());
    }

    if args.iter().any(|a| a == "--clear-rates") {
        require_admin(&gate)?;
        let mode = flag_value(&args, "--mode").map(|m| parse_mode(&m)).transpose()?;
        if !engine.rules().clear_rates(mode) {
            bail!("clear-rates failed (see log)");
        }
        return Ok(());
    }

    if args.iter().any(|a| a == "--clear-chains") {
        require_admin(&gate)?;
        let mode = flag_value(&args, "--mode").map(|m| parse_mode(&m)).transpose()?;
        if !engine.rules().clear_chains(mode) {
            bail!("clear-chains failed (see log)");
        }
        return Ok(());
    }

    if args.iter().any(|a| a == "--list-rules") {
        for (mode, rules) in engine.rules().list_rates() {
            println!("rate rules for {mode}:");
            for r in rules {
                println!("  {}", serde_json::to_string(&r)?);
            }
        }
        for (mode, rules) in engine.rules().list_chains() {
            println!("chain rules for {mode}:");
            for r in rules {
                println!("  {}", serde_json::to_string(&r)?);
            }
        }
        return Ok(());
    }

    if let Some(mode) = flag_value(&args, "--import") {
        require_admin(&gate)?;
        let mode = parse_mode(&mode)?;
        let path = flag_value(&args, "--file").context("--import needs --file <path>")?;
        let source = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
        if !engine.ledger_mut().import(mode, &source) {
            bail!("import yielded no valid numbers");
        }
        println!("imported history into {mode}");
        return Ok(());
    }

    if args.iter().any(|a| a == "--reset") {
        require_admin(&gate)?;
        let mode = flag_value(&args, "--mode").map(|m| parse_mode(&m)).transpose()?;
        if !engine.ledger_mut().reset(mode) {
            bail!("reset failed (see log)");
        }
        return Ok(());
    }

    // Default operation: one draw batch.
    if !gate.is_drawing_allowed() {
        bail!("drawing is not allowed right now");
    }
    let mode = parse_mode(&flag_value(&args, "--mode").context("--mode is required")?)?;
    let max: u32 = flag_value(&args, "--max")
        .unwrap_or_else(|| "100".to_string())
        .parse()
        .context("--max must be a positive integer")?;
    if max == 0 {
        bail!("--max must be >= 1");
    }
    let count: usize = flag_value(&args, "--count")
        .unwrap_or_else(|| "1".to_string())
        .parse()
        .context("--count must be a positive integer")?;
    let gender = match flag_value(&args, "--gender") {
        Some(raw) => Some(Gender::parse(&raw).context("--gender must be male or female")?),
        None => None,
    };

    let batch = engine.draw_batch(mode, max, count, gender);
    for record in &batch.records {
        println!("{}", serde_json::to_string(record)?);
    }
    if batch.pool_exhausted {
        eprintln!(
            "pool exhausted: drew {} of {count} requested",
            batch.numbers.len()
        );
    }
    Ok(())
}

fn require_admin(gate: &impl AccessGate) -> Result<()> {
    if gate.authorization() != AuthLevel::Admin {
        bail!("admin authorization required");
    }
    Ok(())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

fn parse_mode(raw: &str) -> Result<Mode> {
    Mode::parse(raw).with_context(|| format!("unknown mode '{raw}' (mode1..mode5)"))
}

/// Parse "mode1:7:3" into (mode, first number, second number).
fn parse_triple(spec: &str) -> Result<(Mode, u32, u32)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        bail!("expected <mode>:<number>:<number>, got '{spec}'");
    }
    let mode = parse_mode(parts[0])?;
    let a: u32 = parts[1].parse().context("numbers must be integers")?;
    let b: u32 = parts[2].parse().context("numbers must be integers")?;
    if a == 0 || b == 0 {
        bail!("numbers must be >= 1");
    }
    Ok((mode, a, b))
}
