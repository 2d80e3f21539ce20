//! `indexa observe`

use chrono::NaiveDate;
use clap::Args;
use indexa::{Indexa, JoinTolerance, ObservationReport};

use super::parse_day;
use crate::output::{self, Format};

#[derive(Debug, Args)]
pub struct ObserveArgs {
    /// Series code
    #[arg(default_value = "CPIAUCSL")]
    code: String,

    /// Date to look up; the latest observation is reported when omitted
    #[arg(short, long, value_parser = parse_day)]
    date: Option<NaiveDate>,

    /// Second date; reports the inflation between --date and --to
    #[arg(long, value_parser = parse_day, requires = "date")]
    to: Option<NaiveDate>,

    /// Warn when the nearest observation is further than this many days
    #[arg(long)]
    tolerance_days: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

fn line(o: &ObservationReport) -> String {
    match o.requested {
        Some(req) if o.distance_days != 0 => format!(
            "{} {} {:.4} (requested {req}, {} days away) via {}",
            o.code, o.date, o.value, o.distance_days, o.connector
        ),
        _ => format!("{} {} {:.4} via {}", o.code, o.date, o.value, o.connector),
    }
}

fn csv_row(o: &ObservationReport) -> String {
    format!(
        "{},{},{},{},{}",
        o.code,
        o.date,
        o.value,
        o.distance_days,
        o.connector
    )
}

pub async fn run(indexa: &Indexa, args: ObserveArgs) -> anyhow::Result<()> {
    let tolerance = args.tolerance_days.map(JoinTolerance::from_days);
    match (args.date, args.to) {
        (Some(start), Some(end)) => {
            let r = indexa
                .inflation_between(&args.code, start, end, tolerance)
                .await?;
            match args.format {
                Format::Table => {
                    println!("{}", line(&r.start));
                    println!("{}", line(&r.end));
                    println!("inflation {:.2}%", r.change_pct);
                }
                Format::Csv => {
                    println!("code,date,value,distance_days,connector");
                    println!("{}", csv_row(&r.start));
                    println!("{}", csv_row(&r.end));
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&r)?),
            }
            output::warnings(&r.start.warnings);
            output::warnings(&r.end.warnings);
        }
        (date, _) => {
            let r = match date {
                Some(d) => indexa.nearest_observation(&args.code, d, tolerance).await?,
                None => indexa.latest_observation(&args.code).await?,
            };
            match args.format {
                Format::Table => println!("{}", line(&r)),
                Format::Csv => {
                    println!("code,date,value,distance_days,connector");
                    println!("{}", csv_row(&r));
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&r)?),
            }
            output::warnings(&r.warnings);
        }
    }
    Ok(())
}
