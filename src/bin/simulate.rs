use clap::Parser;
use maze_chase::autopilot::Autopilot;
use maze_chase::config::load_layout;
use maze_chase::engine::{GameEngine, GameEngineOptions};
use maze_chase::grid::Grid;
use maze_chase::logging::{emit_log, now_ms, LogContext};
use maze_chase::roster::STANDARD_ROSTER;
use maze_chase::types::{CellKind, GameSummary, RuntimeEvent, SessionState, Snapshot};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const SIM_FRAME_MS: u64 = 50;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    minutes: Option<i32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    layout: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    minutes: i32,
    seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunOutcome {
    GameOver,
    TimeLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    minutes: i32,
    outcome: RunOutcome,
    #[serde(flatten)]
    summary: GameSummary,
    #[serde(rename = "levelUps")]
    level_ups: u32,
    #[serde(rename = "boostsStarted")]
    boosts_started: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: i64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: i64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));

    let layout = match load_layout(cli.layout.as_deref()) {
        Ok(layout) => layout,
        Err(error) => {
            emit_log(
                "error",
                "layout_invalid",
                &run_id,
                LogContext::default(),
                json!({
                    "path": cli.layout.as_ref().map(|path| path.to_string_lossy().to_string()),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        let context = LogContext {
            scenario: Some(scenario.name.as_str()),
            seed: Some(scenario.seed),
            tick: None,
        };
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            context,
            json!({
                "minutes": scenario.minutes,
                "width": layout.width(),
            }),
        );
        let scenario_run = run_scenario(&scenario, &layout);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                LogContext {
                    tick: Some(anomaly.tick),
                    ..context
                },
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            LogContext {
                tick: Some(scenario_run.finished_tick),
                ..context
            },
            json!({
                "outcome": scenario_run.result.outcome,
                "score": scenario_run.result.summary.score,
                "level": scenario_run.result.summary.level,
                "durationMs": scenario_run.result.summary.duration_ms,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                LogContext::default(),
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        LogContext::default(),
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, layout: &Grid) -> ScenarioRunResult {
    let mut engine = GameEngine::new(GameEngineOptions {
        seed: scenario.seed,
        layout: Some(layout.clone()),
        roster: STANDARD_ROSTER.to_vec(),
    });
    let mut pilot = Autopilot::new(scenario.seed ^ 0x9e37_79b9);
    let time_limit_ms = scenario.minutes.max(1) as u64 * 60_000;
    let player_move_ms = engine.config.player_move_ms;

    let mut level_ups = 0;
    let mut boosts_started = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut since_player_move = 0u64;
    let mut last_tick = 0u64;
    let mut outcome = RunOutcome::TimeLimit;
    let mut final_summary = None;

    engine.start();
    let max_frames = time_limit_ms / SIM_FRAME_MS;
    for _ in 0..max_frames {
        engine.step(SIM_FRAME_MS);
        since_player_move += SIM_FRAME_MS;
        if since_player_move >= player_move_ms && engine.state() == SessionState::Running {
            since_player_move = 0;
            if let Some(dir) = pilot.next_direction(&engine) {
                engine.apply_player_move(dir);
            }
        }

        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                RuntimeEvent::LevelUp { .. } => level_ups += 1,
                RuntimeEvent::BoostStarted { .. } => boosts_started += 1,
                _ => {}
            }
        }

        if engine.state() == SessionState::GameOver {
            outcome = RunOutcome::GameOver;
            final_summary = engine.last_summary().cloned();
            break;
        }
    }

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            minutes: scenario.minutes,
            outcome,
            summary: final_summary.unwrap_or_else(|| engine.build_summary()),
            level_ups,
            boosts_started,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    let cell_at = |index: usize| snapshot.cells.get(index).copied().unwrap_or(CellKind::Wall);

    let mut held = HashSet::new();
    for adversary in &snapshot.adversaries {
        if !held.insert(adversary.index) {
            anomalies.push(format!("adversaries share cell {}", adversary.index));
        }
        if cell_at(adversary.index) == CellKind::Wall {
            anomalies.push(format!(
                "adversary on wall: {} at {}",
                adversary.name, adversary.index
            ));
        }
    }
    if cell_at(snapshot.player_index) == CellKind::Wall {
        anomalies.push(format!("player on wall at {}", snapshot.player_index));
    }

    let counted = snapshot
        .cells
        .iter()
        .filter(|kind| **kind == CellKind::Consumable)
        .count();
    if counted != snapshot.session.remaining_consumables {
        anomalies.push(format!(
            "consumable counter drift: counter {} grid {}",
            snapshot.session.remaining_consumables, counted
        ));
    }

    if snapshot.session.state == SessionState::Running && snapshot.session.lives == 0 {
        anomalies.push("running session with zero lives".to_string());
    }
    if snapshot.session.score >= snapshot.session.next_level_score {
        anomalies.push(format!(
            "score {} reached threshold {} without level-up",
            snapshot.session.score, snapshot.session.next_level_score
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);

    if cli.single || cli.minutes.is_some() {
        let minutes = cli.minutes.unwrap_or(3).clamp(1, 30);
        return vec![Scenario {
            name: format!("custom-{minutes}m"),
            minutes,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check".to_string(),
            minutes: 2,
            seed,
        },
        Scenario {
            name: "endurance-check".to_string(),
            minutes: 10,
            seed: seed.wrapping_add(1),
        },
    ]
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: i64,
    finished_at_ms: i64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_duration_ms: u64 = scenarios.iter().map(|s| s.summary.duration_ms).sum();
    let total_score: u64 = scenarios.iter().map(|s| s.summary.score as u64).sum();
    let (average_duration_ms, average_score) = if scenario_count == 0 {
        (0, 0)
    } else {
        (
            total_duration_ms / scenario_count as u64,
            (total_score / scenario_count as u64) as u32,
        )
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        average_score,
        outcome_counts,
        scenarios,
    }
}

fn outcome_key(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::GameOver => "game_over",
        RunOutcome::TimeLimit => "time_limit",
    }
    .to_string()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(outcome: RunOutcome, duration_ms: u64, score: u32) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            minutes: 1,
            outcome,
            summary: GameSummary {
                score,
                duration_ms,
                level: 1,
                ..GameSummary::default()
            },
            level_ups: 0,
            boosts_started: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_averages() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result(RunOutcome::TimeLimit, 60_000, 300),
                make_scenario_result(RunOutcome::GameOver, 90_000, 100),
            ],
            BTreeMap::from([
                ("time_limit".to_string(), 1usize),
                ("game_over".to_string(), 1usize),
            ]),
            1,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.average_score, 200);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result(RunOutcome::TimeLimit, 60_000, 0)],
            BTreeMap::from([("time_limit".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn healthy_snapshots_have_no_anomalies() {
        let mut engine = GameEngine::new(GameEngineOptions::with_seed(3));
        engine.start();
        engine.step(2_000);
        let snapshot = engine.build_snapshot(false);
        assert!(collect_snapshot_anomalies(&snapshot).is_empty());
    }

    #[test]
    fn overlapping_adversaries_are_flagged() {
        let mut engine = GameEngine::new(GameEngineOptions::with_seed(4));
        let mut snapshot = engine.build_snapshot(false);
        snapshot.adversaries[1].index = snapshot.adversaries[0].index;
        snapshot.session.remaining_consumables += 1;
        let anomalies = collect_snapshot_anomalies(&snapshot);
        assert_eq!(anomalies.len(), 2);
    }

    #[test]
    fn short_scenario_runs_clean() {
        let scenario = Scenario {
            name: "test".to_string(),
            minutes: 1,
            seed: 11,
        };
        let run = run_scenario(&scenario, &Grid::standard());
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert!(run.result.summary.consumables_collected > 0);
    }
}
