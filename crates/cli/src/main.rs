use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tsm::prelude::*;

mod dataset;
mod provenance;

#[derive(Parser)]
#[command(name = "tsm-cli")]
#[command(about = "Replay labeling sessions through the three-set learner")]
struct Cmd {
    /// Optional run tag; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Train on labeled rows, then classify candidates
    Replay {
        /// Session configuration (JSON)
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        labeled: PathBuf,
        #[arg(long)]
        candidates: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Replay {
            config,
            labeled,
            candidates,
            out,
        } => {
            let summary = replay(&config, &labeled, &candidates, &out, cmd.tag)?;
            tracing::info!(
                positive = summary.counts.positive,
                negative = summary.counts.negative,
                unknown = summary.counts.unknown,
                "replay_done"
            );
            Ok(())
        }
        Action::Report => report(cmd.tag),
    }
}

#[derive(Debug, Default, Serialize)]
struct Counts {
    positive: usize,
    negative: usize,
    unknown: usize,
}

#[derive(Debug, Serialize)]
struct Prediction {
    id: usize,
    label: i8,
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    labels: Vec<Prediction>,
    counts: Counts,
    running: bool,
    relabel: bool,
    groups: Vec<String>,
}

fn read_config(path: &Path) -> Result<TsmConfig> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn replay(
    config: &Path,
    labeled: &Path,
    candidates: &Path,
    out: &Path,
    tag: Option<String>,
) -> Result<ReplaySummary> {
    let cfg = read_config(config)?;
    tracing::info!(config = %cfg, tag = ?tag, "replay");
    let mut learner = cfg
        .build()?
        .with_context(|| format!("{} disables the learner (has_tsm = false)", config.display()))?;

    let labeled_points = dataset::read_labeled(labeled, &cfg.columns, learner.num_groups())?;
    learner
        .update(&labeled_points)
        .context("updating learner with labeled rows")?;
    tracing::info!(points = labeled_points.len(), "learner_updated");

    let pool = dataset::read_points(candidates, &cfg.columns)?;
    let predicted = learner.predict_all(&pool)?;

    let mut counts = Counts::default();
    for label in &predicted {
        match label {
            ExtendedLabel::Positive => counts.positive += 1,
            ExtendedLabel::Negative => counts.negative += 1,
            ExtendedLabel::Unknown => counts.unknown += 1,
        }
    }
    let summary = ReplaySummary {
        labels: pool
            .iter()
            .zip(&predicted)
            .map(|(p, l)| Prediction {
                id: p.id,
                label: l.as_sign(),
            })
            .collect(),
        counts,
        running: learner.is_running(),
        relabel: learner.trigger_relabeling(),
        groups: (0..learner.num_groups())
            .filter_map(|i| learner.group_state(i))
            .map(|s| s.to_string())
            .collect(),
    };

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let params = json!({
        "config": config.to_string_lossy(),
        "labeled": labeled.to_string_lossy(),
        "candidates": candidates.to_string_lossy(),
        "feature_groups": cfg.feature_groups,
        "error_threshold": cfg.error_threshold,
        "labeled_rows": labeled_points.len(),
        "candidate_rows": pool.len(),
    });
    let prov = provenance::write_sidecar(out, provenance::Payload::new(params, tag))?;
    tracing::info!(out = %out.display(), provenance = %prov.display(), "outputs_written");
    Ok(summary)
}

fn report(tag: Option<String>) -> Result<()> {
    let mut obj = provenance::block(tag.as_deref());
    obj["params"] = json!({});
    obj["outputs"] = json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
