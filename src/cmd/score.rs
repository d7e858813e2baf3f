use crate::reports;
use clap::Args;
use layerforge::api;
use layerforge::config::Config;
use layerforge::error::LfResult;
use layerforge::scorer::ScoreTable;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    /// Layout in slot order, '-' for an empty slot. Repeatable.
    #[arg(short, long = "layout", required = true)]
    pub layouts: Vec<String>,

    #[arg(long)]
    pub json: Option<String>,
}

pub fn run(args: &ScoreArgs, config: Config, table: ScoreTable) -> LfResult<()> {
    let mut prepared = api::prepare(config, table)?;
    let mut results = prepared.score_layouts(&args.layouts)?;
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("\n🔎 === LAYOUT SCORES === 🔎");
    let per_layer = prepared.config.search.letters_per_layer;
    for r in &results {
        reports::print_layout_grid(&r.layout, &r.layout, per_layer);
    }
    reports::print_ranking(&results, per_layer);

    if let Some(path) = &args.json {
        super::write_json(path, &results)?;
    }
    Ok(())
}
