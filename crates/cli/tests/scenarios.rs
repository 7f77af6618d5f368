//! End-to-end scenarios for the Hearth context pipeline.
//!
//! These tests drive the public crates the CLI wires together: stores,
//! scorers, selectors, and the engine, against temp directories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hearth_config::{AppConfig, ConfigError};
use hearth_context::window;
use hearth_context::{
    ArchivalBoost, AssemblyError, AssemblyInput, BlockKind, ContextAssembler, ContextEngine,
    ContextRequest, EngineSettings, HeuristicScorer, RelevanceScorer, ScoringContext,
    select_top_k, select_top_k_with_boost,
};
use hearth_core::dialogue::{DialogueLog, DialogueTurn};
use hearth_core::error::Error;
use hearth_core::memory::{MemoryKind, MemoryLog, MemoryRecord};
use hearth_core::persona::Persona;
use hearth_memory::{
    DirectoryTimeline, FileDialogueLog, FileMemoryLog, ImportedArchive, InMemoryDialogueLog, NoopMemory,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn turns(n: usize) -> Vec<DialogueTurn> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                DialogueTurn::user(format!("user line {i}"))
            } else {
                DialogueTurn::assistant(format!("assistant line {i}"))
            }
        })
        .collect()
}

fn ids(selected: &[hearth_context::ScoredCandidate]) -> Vec<&str> {
    selected.iter().map(|c| c.record.id.as_str()).collect()
}

// ── Mock Scorer ──────────────────────────────────────────────────────────

/// Scores every record the same.
struct Constant(f64);

#[async_trait]
impl RelevanceScorer for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    async fn score(&self, _record: &MemoryRecord, _ctx: &ScoringContext<'_>) -> Result<f64, Error> {
        Ok(self.0)
    }
}

// ── Scoring & Selection ──────────────────────────────────────────────────

#[tokio::test]
async fn cafe_memory_outranks_weather_small_talk() {
    let now = fixed_now();
    let records = vec![
        MemoryRecord::new("날씨 얘기")
            .with_id("weather")
            .with_importance(0.1)
            .with_created_at(now - Duration::days(40)),
        MemoryRecord::new("좋아하는 카페는 시청 근처")
            .with_id("cafe")
            .with_kind(MemoryKind::Preference)
            .with_importance(0.9)
            .with_tags(["cafe"])
            .with_created_at(now - Duration::days(2)),
    ];

    let scorer = HeuristicScorer::default();
    let ctx = ScoringContext::new("카페 어디였지", &[], now);
    let top = select_top_k(&scorer, &ctx, records, 1).await;

    assert_eq!(ids(&top), vec!["cafe"]);
    // 0.9 * 2.0 + week tier 0.7
    assert!((top[0].score - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn archival_boost_lifts_imported_record() {
    let now = fixed_now();
    let at = now - Duration::hours(3);
    let records = || {
        vec![
            MemoryRecord::new("likes jazz").with_id("live").with_importance(0.5).with_created_at(at),
            MemoryRecord::new("used to paint murals")
                .with_id("old")
                .with_importance(0.45)
                .with_source("imported")
                .with_created_at(at),
        ]
    };

    let scorer = HeuristicScorer::default();
    let ctx = ScoringContext::new("tell me something", &[], now);

    let plain = select_top_k(&scorer, &ctx, records(), 2).await;
    assert_eq!(ids(&plain), vec!["live", "old"]);

    let boost = ArchivalBoost {
        marker: "imported",
        boost: 0.3,
    };
    let boosted = select_top_k_with_boost(&scorer, &ctx, records(), 2, boost).await;
    assert_eq!(ids(&boosted), vec!["old", "live"]);
    assert!((boosted[0].score - plain[1].score - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn ties_break_newest_first_then_by_id() {
    let now = fixed_now();
    let records = vec![
        MemoryRecord::new("a").with_id("b-id").with_created_at(now - Duration::days(1)),
        MemoryRecord::new("b").with_id("z-id").with_created_at(now),
        MemoryRecord::new("c").with_id("a-id").with_created_at(now - Duration::days(1)),
        MemoryRecord::new("d").with_id("undated"),
    ];
    let ctx = ScoringContext::new("q", &[], now);
    let top = select_top_k(&Constant(1.0), &ctx, records, 4).await;
    assert_eq!(ids(&top), vec!["z-id", "a-id", "b-id", "undated"]);
}

#[test]
fn newer_record_never_scores_lower_than_older_twin() {
    let now = fixed_now();
    let scorer = HeuristicScorer::default();
    let ages = [0, 1, 3, 7, 10, 30, 31, 400];
    let scores: Vec<f64> = ages
        .iter()
        .map(|d| {
            let r = MemoryRecord::new("same fact")
                .with_importance(0.6)
                .with_created_at(now - Duration::days(*d));
            scorer.score_now(&r, "same fact", now)
        })
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "recency must be monotone: {scores:?}");
    }
}

#[tokio::test]
async fn selection_is_idempotent_and_sized() {
    let now = fixed_now();
    let records: Vec<MemoryRecord> = (0..7)
        .map(|i| {
            MemoryRecord::new(format!("fact number {i}"))
                .with_id(format!("m{i}"))
                .with_importance(f64::from(i) / 10.0)
                .with_created_at(now - Duration::days(i64::from(i)))
        })
        .collect();
    let scorer = HeuristicScorer::default();
    let ctx = ScoringContext::new("fact", &[], now);

    for k in [0, 1, 3, 7, 20] {
        let first = select_top_k(&scorer, &ctx, records.clone(), k).await;
        let second = select_top_k(&scorer, &ctx, records.clone(), k).await;
        assert_eq!(first.len(), k.min(records.len()));
        assert_eq!(ids(&first), ids(&second));
    }
}

// ── Dialogue Window ──────────────────────────────────────────────────────

#[test]
fn trim_edges() {
    let five = turns(5);
    assert!(window::trim(&five, 0).is_empty());
    assert_eq!(window::trim(&five, 1000), five);
    assert_eq!(window::trim(&five, 2), five[3..].to_vec());
}

#[tokio::test]
async fn unknown_owner_has_no_history() {
    let tmp = tempfile::tempdir().unwrap();
    let file_log = FileDialogueLog::new(tmp.path());
    assert!(file_log.load_recent("nobody", 10).await.is_empty());

    let mem_log = InMemoryDialogueLog::new();
    assert!(mem_log.load_recent("nobody", 10).await.is_empty());

    let memories = FileMemoryLog::new(tmp.path());
    assert!(memories.load_recent("nobody", 10).await.is_empty());
}

// ── Budget ───────────────────────────────────────────────────────────────

#[test]
fn assembled_context_never_exceeds_budget() {
    let transcript = turns(40);
    let digest = window::summarize_recent_user_turns(&transcript, 8, 80);
    let memories: Vec<MemoryRecord> = (0..5)
        .map(|i| MemoryRecord::new(format!("memory body {i} with some words")))
        .collect();

    for budget in [120, 200, 400, 800, 5000] {
        let input = AssemblyInput {
            persona: "You are a warm companion.",
            utterance: "what did we talk about?",
            transcript: &transcript,
            digest: &digest,
            memories: &memories,
            timeline: &[],
            imported: &[],
        };
        let ctx = ContextAssembler::new(budget).assemble(&input).unwrap();
        assert!(ctx.total_chars <= budget, "budget {budget}: {}", ctx.total_chars);
        assert_eq!(ctx.total_chars, ctx.render().chars().count());
        assert!(ctx.block(BlockKind::Persona).is_some());
        assert!(ctx.block(BlockKind::Utterance).is_some());
    }
}

#[test]
fn persona_plus_message_over_budget_is_an_error() {
    let persona = "p".repeat(100);
    let input = AssemblyInput {
        persona: &persona,
        utterance: "hello",
        transcript: &[],
        digest: &[],
        memories: &[],
        timeline: &[],
        imported: &[],
    };
    let err = ContextAssembler::new(50).assemble(&input).unwrap_err();
    assert!(matches!(err, AssemblyError::BudgetExceeded { budget: 50, .. }));
}

// ── Configuration ────────────────────────────────────────────────────────

#[test]
fn malformed_config_file_is_a_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[context\nbudget_chars = ").unwrap();
    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn zero_budget_fails_validation() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[context]\nbudget_chars = 0\n").unwrap();
    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

// ── Full Pipeline ────────────────────────────────────────────────────────

#[tokio::test]
async fn engine_over_file_stores() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let now = Utc::now();

    let memory = FileMemoryLog::new(root.join("memory"));
    memory
        .append(
            "ana",
            MemoryRecord::new("좋아하는 카페는 시청 근처")
                .with_kind(MemoryKind::Preference)
                .with_importance(0.9)
                .with_tags(["카페"]),
        )
        .await
        .unwrap();
    memory
        .append("ana", MemoryRecord::new("날씨 얘기").with_importance(0.1))
        .await
        .unwrap();

    let transcript = FileDialogueLog::new(root.join("history"));
    transcript.append("ana", DialogueTurn::user("요즘 바빠")).await.unwrap();
    transcript.append("ana", DialogueTurn::assistant("무슨 일 있어?")).await.unwrap();

    let timeline_dir = root.join("timeline");
    std::fs::create_dir_all(&timeline_dir).unwrap();
    std::fs::write(
        timeline_dir.join("cafe.json"),
        r#"{"date":"2025-06-01","title":"카페 오픈","tags":["카페"]}"#,
    )
    .unwrap();

    let archive = root.join("imported.jsonl");
    std::fs::write(
        &archive,
        "{\"summary\":\"예전에 벽화를 그렸다\",\"importance\":0.7}\n",
    )
    .unwrap();

    let settings = EngineSettings {
        max_memories: 1,
        ..EngineSettings::default()
    };
    let engine = ContextEngine::new(
        Arc::new(memory),
        Arc::new(HeuristicScorer::default()),
        Persona::from_prompt("Hearth", "You are Hearth."),
        settings,
    )
    .with_timeline(Arc::new(DirectoryTimeline::new(timeline_dir)))
    .with_imported(ImportedArchive::new(archive, "imported"));

    let recent = transcript.load_recent("ana", 100).await;
    let ctx = engine
        .assemble(ContextRequest::new("ana", "카페 어디였지").with_turns(recent).at(now))
        .await
        .unwrap();

    let rendered = ctx.render();
    assert!(rendered.starts_with("[CORE_SYSTEM]\nYou are Hearth."));
    assert!(rendered.ends_with("[USER_MESSAGE]\n카페 어디였지"));

    let memories = ctx.block(BlockKind::Memories).unwrap();
    assert!(memories.body.contains("시청 근처"));
    assert!(!memories.body.contains("날씨"));

    assert!(ctx.block(BlockKind::Transcript).unwrap().body.contains("무슨 일 있어?"));
    assert!(ctx.block(BlockKind::Timeline).unwrap().body.contains("카페 오픈"));
    assert!(ctx.block(BlockKind::Imported).unwrap().body.contains("벽화"));
    assert!(ctx.total_chars <= engine.settings().budget_chars);
}

#[tokio::test]
async fn disabled_memory_still_yields_persona_and_message() {
    let engine = ContextEngine::new(
        Arc::new(NoopMemory),
        Arc::new(HeuristicScorer::default()),
        Persona::from_prompt("Hearth", "You are Hearth."),
        EngineSettings::default(),
    );
    let ctx = engine
        .assemble(ContextRequest::new("ana", "안녕").at(fixed_now()))
        .await
        .unwrap();
    let kinds: Vec<BlockKind> = ctx.blocks.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![BlockKind::Persona, BlockKind::Utterance]);
    assert!(ctx.metadata.drops.is_empty());
}
