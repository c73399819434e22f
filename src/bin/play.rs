use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use maze_chase::config::{
    load_layout, normalize_frame_ms, resolve_layout_path, resolve_seed, LAYOUT_ENV, SEED_ENV,
};
use maze_chase::control_protocol::{apply_control_message, parse_control_message};
use maze_chase::engine::{GameEngine, GameEngineOptions};
use maze_chase::logging::{emit_log, now_ms, now_rfc3339, LogContext};
use maze_chase::roster::STANDARD_ROSTER;
use maze_chase::types::RuntimeEvent;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

/// Interactive host: JSON control lines on stdin, JSON snapshots on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    frame_ms: Option<u64>,
    #[arg(long)]
    autostart: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let seed = resolve_seed(cli.seed, std::env::var(SEED_ENV).ok().as_deref());
    let run_id = format!("play-{seed}-{}", now_ms());
    let context = LogContext {
        seed: Some(seed),
        ..LogContext::default()
    };

    let layout_path = resolve_layout_path(
        cli.layout.clone(),
        std::env::var(LAYOUT_ENV).ok().as_deref(),
    );
    let layout = match load_layout(layout_path.as_deref()) {
        Ok(layout) => layout,
        Err(error) => {
            emit_log(
                "error",
                "layout_invalid",
                &run_id,
                context,
                json!({
                    "path": layout_path.as_ref().map(|path| path.to_string_lossy().to_string()),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    };

    let frame_ms = normalize_frame_ms(cli.frame_ms);
    let mut engine = GameEngine::new(GameEngineOptions {
        seed,
        layout: Some(layout),
        roster: STANDARD_ROSTER.to_vec(),
    });
    emit_log(
        "info",
        "session_ready",
        &run_id,
        context,
        json!({
            "width": engine.config.width,
            "frameMs": frame_ms,
            "adversaries": engine.adversaries().len(),
            "consumables": engine.grid().remaining_consumables(),
        }),
    );
    println!(
        "{}",
        serde_json::to_string(&json!({ "type": "config", "config": engine.config }))
            .expect("config should serialize")
    );
    if cli.autostart {
        engine.start();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut frame = tokio::time::interval(Duration::from_millis(frame_ms));
    frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_frame = Instant::now();
    let mut last_revision: Option<u64> = None;

    loop {
        tokio::select! {
            _ = frame.tick() => {
                let now = Instant::now();
                let dt_ms = now.duration_since(last_frame).as_millis() as u64;
                last_frame = now;
                engine.step(dt_ms);
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(raw)) => {
                        let Some(message) = parse_control_message(raw.trim()) else {
                            emit_log(
                                "debug",
                                "control_ignored",
                                &run_id,
                                context,
                                json!({ "line": raw }),
                            );
                            continue;
                        };
                        if apply_control_message(&mut engine, message) {
                            last_revision = None;
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        emit_log(
                            "warn",
                            "input_failed",
                            &run_id,
                            context,
                            json!({ "error": error.to_string() }),
                        );
                        break;
                    }
                }
            }
        }
        publish(&mut engine, &mut last_revision, &run_id, context);
    }

    emit_log(
        "info",
        "session_closed",
        &run_id,
        context,
        json!({ "summary": engine.build_summary() }),
    );
}

fn publish(
    engine: &mut GameEngine,
    last_revision: &mut Option<u64>,
    run_id: &str,
    context: LogContext<'_>,
) {
    if *last_revision == Some(engine.revision()) {
        return;
    }
    *last_revision = Some(engine.revision());

    let snapshot = engine.build_snapshot(true);
    let game_over = snapshot
        .events
        .iter()
        .any(|event| matches!(event, RuntimeEvent::GameOver { .. }));
    println!(
        "{}",
        serde_json::to_string(&json!({ "type": "state", "snapshot": snapshot }))
            .expect("snapshot should serialize")
    );

    if !game_over {
        return;
    }
    let Some(summary) = engine.last_summary() else {
        return;
    };
    println!(
        "{}",
        serde_json::to_string(&json!({
            "type": "game_over",
            "finishedAt": now_rfc3339(),
            "summary": summary,
        }))
        .expect("summary should serialize")
    );
    emit_log(
        "info",
        "game_over",
        run_id,
        LogContext {
            tick: Some(snapshot.tick),
            ..context
        },
        json!({
            "score": summary.score,
            "level": summary.level,
            "durationMs": summary.duration_ms,
        }),
    );
}
