//! `indexa compose`
//!
//! Builds the composite table. Flags override a JSON config file, which overrides the
//! built-in defaults.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use indexa::loader::{PanelColumn, load_panel_path, load_percent_changes};
use indexa::{
    CompositionConfig, DeflatorVariant, Indexa, JoinTolerance, PercentChangeSeries, SpliceBoundary,
    summarize,
};

use super::parse_day;
use crate::output::{self, Format};

/// Monthly alternative estimate bundled with the binary, starting at 09-2020.
const ALT_ESTIMATE: &str = include_str!("../../data/alt_estimate.csv");

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Deflator {
    PriceIndex,
    Alternative,
    Average,
}

impl From<Deflator> for DeflatorVariant {
    fn from(d: Deflator) -> Self {
        match d {
            Deflator::PriceIndex => Self::PriceIndex,
            Deflator::Alternative => Self::Alternative,
            Deflator::Average => Self::Average,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PanelPrice {
    #[default]
    Dollar,
    Local,
    Adjusted,
}

impl From<PanelPrice> for PanelColumn {
    fn from(p: PanelPrice) -> Self {
        match p {
            PanelPrice::Dollar => Self::DollarPrice,
            PanelPrice::Local => Self::LocalPrice,
            PanelPrice::Adjusted => Self::AdjustedPrice,
        }
    }
}

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Start date (DD-MM-YYYY or YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_day)]
    start: Option<NaiveDate>,

    /// End date (DD-MM-YYYY or YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_day)]
    end: Option<NaiveDate>,

    /// Deflator used when recomposing the ratio series
    #[arg(long, value_enum)]
    deflator: Option<Deflator>,

    /// Rebase index columns to 100 at the start date
    #[arg(long)]
    normalize: bool,

    /// Emit the alternative estimate and its average with the price index
    #[arg(long)]
    alternative: bool,

    /// Fetch the ratio series and recompose it with the deflator
    #[arg(long)]
    recompose: bool,

    /// Percent-change table (`period,pct`) replacing the bundled estimate
    #[arg(long)]
    alt_table: Option<PathBuf>,

    /// Splice at the first month of the percent-change table instead of 09-2020
    #[arg(long)]
    splice_at_table_start: bool,

    /// Retail-price panel CSV (`date` plus price columns)
    #[arg(long)]
    panel: Option<PathBuf>,

    /// Panel column to compose
    #[arg(long, value_enum, default_value_t = PanelPrice::Dollar)]
    panel_column: PanelPrice,

    /// Keep the panel at its native dates instead of expanding it monthly
    #[arg(long)]
    no_expand: bool,

    /// Point-observation series used to deflate the panel (e.g. CPIAUCSL)
    #[arg(long)]
    reference: Option<String>,

    /// Nearest-date tolerance in days
    #[arg(long)]
    tolerance_days: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Print summary statistics for every column
    #[arg(long)]
    stats: bool,

    /// JSON composition config; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ComposeArgs {
    fn config(&self) -> anyhow::Result<CompositionConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str::<CompositionConfig>(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => CompositionConfig::default(),
        };
        if let Some(s) = self.start {
            cfg.start = s;
        }
        if let Some(e) = self.end {
            cfg.end = e;
        }
        if let Some(d) = self.deflator {
            cfg.deflator = d.into();
        }
        cfg.normalize |= self.normalize;
        cfg.include_alternative |= self.alternative;
        cfg.recompose |= self.recompose;
        if self.splice_at_table_start {
            cfg.splice_boundary = SpliceBoundary::FirstTablePeriod;
        }
        if self.no_expand {
            cfg.panel.expand = false;
        }
        if let Some(r) = &self.reference {
            cfg.reference_code = Some(r.clone());
        }
        if let Some(t) = self.tolerance_days {
            cfg.join_tolerance = JoinTolerance::from_days(t);
        }
        Ok(cfg)
    }

    fn alternative_table(&self) -> anyhow::Result<PercentChangeSeries> {
        match &self.alt_table {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("opening {}", path.display()))?;
                Ok(load_percent_changes(file, "alternative")?)
            }
            None => Ok(load_percent_changes(ALT_ESTIMATE.as_bytes(), "alternative")?),
        }
    }
}

pub async fn run(indexa: &Indexa, args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = args.config()?;
    let mut builder = indexa
        .composition(cfg)
        .alternative(args.alternative_table()?);
    if let Some(path) = &args.panel {
        builder = builder.panel(load_panel_path(path, "panel", args.panel_column.into())?);
    }
    tracing::info!(
        stages = ?builder.stages().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "composing"
    );

    let report = builder.run().await?;
    let mut stats = Vec::new();
    if args.stats {
        for key in report.table.keys() {
            if let Some(s) = summarize(&report.table.series(key)?) {
                stats.push(s);
            }
        }
    }

    match args.format {
        Format::Table => {
            print!("{}", output::table(&report.table));
            for s in &stats {
                println!();
                print!("{}", output::summary(s));
            }
            for (code, connector, _) in &report.attribution.sources {
                eprintln!("source: {code} <- {connector}");
            }
        }
        Format::Csv => print!("{}", output::csv(&report.table)?),
        Format::Json => println!("{}", output::json(&report, &stats)?),
    }
    output::warnings(&report.warnings);
    Ok(())
}
