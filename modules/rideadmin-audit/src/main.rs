//! Offline audit over a JSON snapshot exported from the document store.
//!
//! Reads only. `sync` prints the writes a status sync would make; applying
//! them is left to the dashboard. Results go to stdout, logs to stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use rideadmin_common::{
    decode_snapshot, parse_status, validate_ad, AdStatus, CarouselAd, Config, GeoPoint,
    IncompleteSchedulePolicy,
};
use rideadmin_search::{filter, DiscreteFilters, FieldSelector, SearchMode};
use rideadmin_targeting::{evaluate_with, plan_status_sync, visible_ads};

const DEFAULT_DIRECTIVE: &str = "rideadmin=info";

#[derive(Parser)]
#[command(name = "rideadmin-audit")]
#[command(about = "Inspect ad status, targeting and search over a document snapshot")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON (still on stderr)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print id, title and computed status of every ad
    Status {
        #[arg(short, long)]
        input: PathBuf,
        /// Evaluation instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Only ads whose computed status is this one
        #[arg(long, value_parser = parse_only)]
        only: Option<AdStatus>,
    },

    /// Print the status writes a sync would make
    Sync {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print the ads a viewer at the given point would see, in carousel order
    Near {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Search and filter arbitrary documents
    Search {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "")]
        query: String,
        /// "all" or a single field name
        #[arg(short, long, default_value = "all")]
        mode: String,
        /// Searchable field (repeatable)
        #[arg(long = "field", default_values_t = [String::from("name"), String::from("email")])]
        fields: Vec<String>,
        /// Exact-match filter as field=value (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let subscriber = build_subscriber(cli.json_logs, DEFAULT_DIRECTIVE, std::io::stderr)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    let config = Config::from_env().context("Failed to load configuration")?;
    let policy = config.incomplete_schedule;

    let lines = match cli.command {
        Commands::Status { input, at, only } => {
            let ads: Vec<CarouselAd> = read_snapshot(&input)?;
            status_lines(&ads, at.unwrap_or_else(Utc::now), policy, only)
        }
        Commands::Sync { input, at } => {
            let ads: Vec<CarouselAd> = read_snapshot(&input)?;
            sync_lines(&ads, at.unwrap_or_else(Utc::now), policy)
        }
        Commands::Near { input, lat, lng, at } => {
            let ads: Vec<CarouselAd> = read_snapshot(&input)?;
            near_lines(&ads, GeoPoint::new(lat, lng), at.unwrap_or_else(Utc::now), policy)?
        }
        Commands::Search {
            input,
            query,
            mode,
            fields,
            filters,
        } => {
            let docs: Vec<Value> = read_snapshot(&input)?;
            let selector = FieldSelector::new(fields).with_mode(SearchMode::parse(&mode));
            let filters = filters
                .into_iter()
                .collect::<DiscreteFilters>()
                .with_sentinel(config.all_sentinel);
            search_lines(&docs, &query, &selector, &filters)?
        }
    };

    let mut out = std::io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Log subscriber writing to `writer` in either format. The binary always
/// passes stderr so stdout carries data only.
fn build_subscriber<W>(
    json: bool,
    directive: &str,
    writer: W,
) -> Result<Box<dyn Subscriber + Send + Sync>>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    Ok(if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    })
}

// ---------------------------------------------------------------------------
// Snapshot loading
// ---------------------------------------------------------------------------

fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    decode_docs(&raw, &path.display().to_string())
}

fn decode_docs<T: DeserializeOwned>(raw: &str, label: &str) -> Result<Vec<T>> {
    let records: Vec<T> = decode_snapshot(raw)
        .with_context(|| format!("{label} is not a JSON array of documents"))?;
    info!(source = label, count = records.len(), "Snapshot loaded");
    Ok(records)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn status_lines(
    ads: &[CarouselAd],
    now: DateTime<Utc>,
    policy: IncompleteSchedulePolicy,
    only: Option<AdStatus>,
) -> Vec<String> {
    ads.iter()
        .filter_map(|ad| {
            let status = evaluate_with(&ad.ad_record(), now, policy);
            if only.is_some_and(|wanted| wanted != status) {
                return None;
            }
            Some(match validate_ad(ad) {
                Ok(()) => format!("{}\t{}\t{}", ad.id, ad.title, status),
                Err(e) => format!("{}\t{}\t{}\t({})", ad.id, ad.title, status, e),
            })
        })
        .collect()
}

fn sync_lines(ads: &[CarouselAd], now: DateTime<Utc>, policy: IncompleteSchedulePolicy) -> Vec<String> {
    let (changes, stats) = plan_status_sync(ads, now, policy);
    info!(checked = stats.checked, stale = stats.stale, "Sync audit done");
    changes
        .iter()
        .map(|change| {
            format!(
                "{}\t{} -> {}",
                change.id,
                change.stored.as_deref().unwrap_or("<none>"),
                change.computed
            )
        })
        .collect()
}

fn near_lines(
    ads: &[CarouselAd],
    viewer: GeoPoint,
    now: DateTime<Utc>,
    policy: IncompleteSchedulePolicy,
) -> Result<Vec<String>> {
    if !viewer.is_valid() {
        bail!("({}, {}) is not a valid coordinate", viewer.lat, viewer.lng);
    }
    Ok(visible_ads(ads, now, Some(&viewer), policy)
        .into_iter()
        .map(|ad| format!("{}\t{}\t{}", ad.priority, ad.id, ad.title))
        .collect())
}

fn search_lines(
    docs: &[Value],
    query: &str,
    selector: &FieldSelector,
    filters: &DiscreteFilters,
) -> Result<Vec<String>> {
    filter(docs, query, selector, filters)
        .into_iter()
        .map(|doc| serde_json::to_string(doc).context("Failed to encode document"))
        .collect()
}

// ---------------------------------------------------------------------------
// Argument parsers
// ---------------------------------------------------------------------------

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected field=value, got `{s}`")),
    }
}

fn parse_only(s: &str) -> Result<AdStatus, String> {
    parse_status(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    const ADS: &str = r#"[
        {
            "id": "jan", "title": "New year rides", "isActive": true, "status": "upcoming",
            "priority": 2,
            "scheduling": { "enabled": true, "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-01-31T23:59:00Z" },
            "targetArea": { "center": { "latitude": 27.7172, "longitude": 85.3240 }, "radiusKm": 10.0 }
        },
        { "id": "always", "title": "Safety first", "isActive": true, "status": "active", "priority": 1 },
        { "id": "off", "title": "", "isActive": false, "status": "active" }
    ]"#;

    const DOCS: &str = r#"[
        { "id": "u1", "name": "Anita", "email": "anita@himal.np", "status": "active" },
        { "id": "u2", "name": "Bikash", "email": "bikash@yatra.np", "status": "active" }
    ]"#;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn mid_january() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn ads() -> Vec<CarouselAd> {
        decode_docs(ADS, "ads.json").unwrap()
    }

    #[test]
    fn json_logs_stay_off_the_data_stream() {
        let logs = Captured::default();
        let sink = logs.clone();
        let subscriber = build_subscriber(true, "rideadmin=debug", move || sink.clone()).unwrap();

        let lines = tracing::subscriber::with_default(subscriber, || {
            let docs: Vec<Value> = decode_docs(DOCS, "docs.json").unwrap();
            search_lines(
                &docs,
                "himal",
                &FieldSelector::new(["name", "email"]),
                &DiscreteFilters::new(),
            )
            .unwrap()
        });

        assert_eq!(lines.len(), 1);
        let doc: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(doc["id"], "u1");
        assert!(doc.get("level").is_none());

        let logged = logs.contents();
        let first: Value = serde_json::from_str(logged.lines().next().unwrap()).unwrap();
        assert_eq!(first["level"], "INFO");
        assert!(logged.contains("Snapshot loaded"));
        assert!(!logged.contains("anita@himal.np"));
    }

    #[test]
    fn status_prints_id_title_status() {
        let lines = status_lines(&ads(), mid_january(), IncompleteSchedulePolicy::AlwaysActive, None);
        assert_eq!(lines[0], "jan\tNew year rides\tactive");
        assert_eq!(lines[1], "always\tSafety first\tactive");
        assert_eq!(lines[2], "off\t\tinactive\t(Validation error: title is required)");
    }

    #[test]
    fn status_only_keeps_matching_ads() {
        let lines = status_lines(
            &ads(),
            mid_january(),
            IncompleteSchedulePolicy::AlwaysActive,
            Some(AdStatus::Inactive),
        );
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("off\t"));
    }

    #[test]
    fn sync_lists_stale_ads() {
        let lines = sync_lines(&ads(), mid_january(), IncompleteSchedulePolicy::AlwaysActive);
        assert_eq!(lines, vec!["jan\tupcoming -> active", "off\tactive -> inactive"]);
    }

    #[test]
    fn near_orders_by_priority_and_respects_fence() {
        let patan = GeoPoint::new(27.6644, 85.3188);
        let lines = near_lines(&ads(), patan, mid_january(), IncompleteSchedulePolicy::AlwaysActive)
            .unwrap();
        assert_eq!(lines, vec!["1\talways\tSafety first", "2\tjan\tNew year rides"]);

        let pokhara = GeoPoint::new(28.2096, 83.9856);
        let lines = near_lines(&ads(), pokhara, mid_january(), IncompleteSchedulePolicy::AlwaysActive)
            .unwrap();
        assert_eq!(lines, vec!["1\talways\tSafety first"]);
    }

    #[test]
    fn near_rejects_invalid_viewer() {
        let err = near_lines(
            &ads(),
            GeoPoint::new(95.0, 0.0),
            mid_january(),
            IncompleteSchedulePolicy::AlwaysActive,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a valid coordinate"));
    }

    #[test]
    fn search_applies_filters_and_sentinel() {
        let docs: Vec<Value> = decode_docs(DOCS, "docs.json").unwrap();
        let filters = DiscreteFilters::new().with("status", "all");
        let lines = search_lines(&docs, "", &FieldSelector::new(["name"]), &filters).unwrap();
        assert_eq!(lines.len(), 2);

        let email_only = FieldSelector::new(["name", "email"]).with_mode(SearchMode::parse("email"));
        let lines = search_lines(&docs, "bikash", &email_only, &DiscreteFilters::new()).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn malformed_snapshot_reports_source() {
        let err = decode_docs::<CarouselAd>("{}", "ads.json").unwrap_err();
        assert!(format!("{err:#}").contains("ads.json is not a JSON array"));
    }

    #[test]
    fn parse_filter_splits_on_first_equals() {
        assert_eq!(
            parse_filter("status=active").unwrap(),
            ("status".to_string(), "active".to_string())
        );
        assert_eq!(
            parse_filter("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=active").is_err());
    }

    #[test]
    fn cli_parses_status_only_flag() {
        let cli = Cli::try_parse_from([
            "rideadmin-audit",
            "status",
            "--input",
            "ads.json",
            "--only",
            "Expired",
        ])
        .unwrap();
        match cli.command {
            Commands::Status { only, .. } => assert_eq!(only, Some(AdStatus::Expired)),
            _ => panic!("expected status command"),
        }

        assert!(Cli::try_parse_from(["rideadmin-audit", "status", "-i", "ads.json", "--only", "paused"])
            .is_err());
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "rideadmin-audit",
            "search",
            "--input",
            "users.json",
            "--query",
            "himal",
            "--field",
            "email",
            "--filter",
            "status=active",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { fields, filters, mode, .. } => {
                assert_eq!(fields, vec!["email".to_string()]);
                assert_eq!(filters, vec![("status".to_string(), "active".to_string())]);
                assert_eq!(mode, "all");
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn cli_parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "rideadmin-audit",
            "near",
            "--input",
            "ads.json",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--at",
            "2024-01-15T12:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Near { lat, at, .. } => {
                assert_eq!(lat, -33.86);
                assert!(at.is_some());
            }
            _ => panic!("expected near command"),
        }
    }
}
