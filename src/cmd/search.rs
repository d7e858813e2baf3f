use crate::reports;
use clap::Args;
use layerforge::api;
use layerforge::config::Config;
use layerforge::error::LfResult;
use layerforge::optimizer::{ProgressCallback, StageReport};
use layerforge::scorer::ScoreTable;
use std::time::Instant;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Number of layouts to print.
    #[arg(long, default_value_t = 10)]
    pub show: usize,

    /// Write the ranked result set to this JSON file.
    #[arg(long)]
    pub json: Option<String>,
}

struct StagePrinter {
    start: Instant,
}

impl ProgressCallback for StagePrinter {
    fn on_stage(&self, report: &StageReport) {
        let cycle = match report.cycle {
            Some(c) => format!("cycle {:3}/{}", c + 1, report.cycles),
            None => "pooled".to_string(),
        };
        let best = report
            .best
            .map(|b| format!("{:.4}", b))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Layer {} | {} | kept {:6} | best {} | scored {} | {:.1}s",
            report.stage,
            cycle,
            report.kept,
            best,
            report.evaluated,
            self.start.elapsed().as_secs_f32()
        );
    }
}

pub fn run(args: &SearchArgs, config: Config, table: ScoreTable) -> LfResult<()> {
    println!("\n🚀 Initializing LayerForge...");
    let prepared = api::prepare(config, table)?;
    reports::print_letter_sets(&prepared);

    println!("\n🔥 Optimizing {} layers", prepared.config.search.layers);
    let outcome = prepared.run(&StagePrinter {
        start: Instant::now(),
    })?;
    let summary = prepared.summarize(&outcome);

    println!("\n=== 🏆 FINAL RESULT ===");
    let shown = args.show.min(summary.layouts.len());
    reports::print_ranking(
        &summary.layouts[..shown],
        prepared.config.search.letters_per_layer,
    );
    if let Some(best) = summary.layouts.first() {
        reports::print_layout_grid(
            "BEST",
            &best.layout,
            prepared.config.search.letters_per_layer,
        );
    }

    if let Some(path) = &args.json {
        super::write_json(path, &summary)?;
    }
    Ok(())
}
