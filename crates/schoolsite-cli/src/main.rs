//! schoolsite - read the school website's content from the terminal.
//!
//! Every section reads the same school document through the shared
//! single-flight cache, so rendering several sections at once costs one
//! request.

mod render;

use std::io;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schoolsite_core::site::Lab;
use schoolsite_core::{Config, SchoolSite};

// ============================================================================
// Constants
// ============================================================================

/// Prefix of the daily log files written under `log_dir`.
const LOG_FILE_PREFIX: &str = "schoolsite.log";

/// Sections rendered together by `overview`.
const OVERVIEW_SECTIONS: [Section; 4] = [
    Section::About,
    Section::Leaders,
    Section::Events,
    Section::Achievements,
];

const USAGE: &str = "\
Usage: schoolsite [--refresh] [--json] <section> [id]

Sections:
  overview            school summary, leaders, events and achievements
  about               school identity, contact and latest notices
  notices             notice board
  notice <id>         one notice
  news                latest news
  events              all events
  event <id>          one event with its gallery
  teachers            teacher list
  teacher <id>        one teacher
  staff               staff list
  committee           managing committee
  leaders             chairman and principal
  fees                current tuition fee table
  gallery [page]      event photos
  videos [page]       event videos
  achievements        published achievements
  routine             current class routine
  calendar            academic calendar
  exam-schedule       exam schedules
  exam-system         exam system
  admission           how to apply
  lab <name>          lab page: ict, physics or chemistry
  activities          extra activities
  history             school history
  vision              mission and vision
  status              backend and cache state

Options:
  --refresh           invalidate the cache and fetch again
  --json              print the section as JSON
  -h, --help          show this help

Environment:
  SCHOOLSITE_API_URL       backend API root
  SCHOOLSITE_TIMEOUT_SECS  request timeout in seconds
  RUST_LOG                 log filter (default: warn)";

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    About,
    Notices,
    Notice(i64),
    News,
    Events,
    Event(i64),
    Teachers,
    Teacher(i64),
    Staff,
    Committee,
    Leaders,
    Fees,
    Gallery(usize),
    Videos(usize),
    Achievements,
    Routine,
    Calendar,
    ExamSchedule,
    ExamSystem,
    Admission,
    Lab(Lab),
    Activities,
    History,
    Vision,
    Status,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    refresh: bool,
    json: bool,
    section: Section,
}

impl Args {
    /// Parse command-line arguments. Returns `None` when help was requested.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let mut refresh = false;
        let mut json = false;
        let mut positional = Vec::new();
        for arg in args {
            match arg.as_str() {
                "--refresh" => refresh = true,
                "--json" => json = true,
                "-h" | "--help" => return Ok(None),
                flag if flag.starts_with("--") => bail!("Unknown option: {}\n\n{}", flag, USAGE),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let name = positional.next().unwrap_or_else(|| "overview".to_string());
        let arg = positional.next();
        if let Some(extra) = positional.next() {
            bail!("Unexpected argument: {}", extra);
        }

        let id = |what: &str| -> Result<i64> {
            let raw = arg
                .as_deref()
                .ok_or_else(|| anyhow!("Missing {} id\n\n{}", what, USAGE))?;
            raw.parse()
                .with_context(|| format!("Invalid {} id: {}", what, raw))
        };
        let page = || -> Result<usize> {
            match arg.as_deref() {
                Some(raw) => raw.parse().with_context(|| format!("Invalid page: {}", raw)),
                None => Ok(1),
            }
        };

        let section = match name.as_str() {
            "overview" => Section::Overview,
            "about" => Section::About,
            "notices" => Section::Notices,
            "notice" => Section::Notice(id("notice")?),
            "news" => Section::News,
            "events" => Section::Events,
            "event" => Section::Event(id("event")?),
            "teachers" => Section::Teachers,
            "teacher" => Section::Teacher(id("teacher")?),
            "staff" => Section::Staff,
            "committee" => Section::Committee,
            "leaders" => Section::Leaders,
            "fees" => Section::Fees,
            "gallery" => Section::Gallery(page()?),
            "videos" => Section::Videos(page()?),
            "achievements" => Section::Achievements,
            "routine" => Section::Routine,
            "calendar" => Section::Calendar,
            "exam-schedule" => Section::ExamSchedule,
            "exam-system" => Section::ExamSystem,
            "admission" => Section::Admission,
            "lab" => {
                let raw = arg
                    .as_deref()
                    .ok_or_else(|| anyhow!("Missing lab name\n\n{}", USAGE))?;
                Section::Lab(Lab::from_name(raw).ok_or_else(|| anyhow!("Unknown lab: {}", raw))?)
            }
            "activities" => Section::Activities,
            "history" => Section::History,
            "vision" => Section::Vision,
            "status" => Section::Status,
            other => bail!("Unknown section: {}\n\n{}", other, USAGE),
        };

        Ok(Some(Self {
            refresh,
            json,
            section,
        }))
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`). When the config
/// names a log directory, a daily rolling file gets the same events; the
/// returned guard flushes it on drop.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_tracing(&config);
    info!(api = %config.api_base_url(), section = ?args.section, "schoolsite starting");

    match run(&config, &args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, args: &Args) -> Result<String> {
    let site = SchoolSite::new(config)?;

    if args.section == Section::Status {
        let result = if args.refresh {
            site.refresh().await
        } else {
            site.school_data().await
        };
        return Ok(render::status(
            site.status(),
            result.as_deref(),
            site.last_updated(),
            &site.client().school_url(),
        ));
    }

    if args.refresh {
        site.refresh().await?;
    }

    let sections: &[Section] = match args.section {
        Section::Overview => &OVERVIEW_SECTIONS,
        ref single => std::slice::from_ref(single),
    };

    // Each section awaits the document on its own; the cache coalesces them.
    if args.json {
        let values = try_join_all(sections.iter().map(|&section| section_json(&site, section))).await?;
        let value = match <[Value; 1]>::try_from(values) {
            Ok([only]) => only,
            Err(values) => Value::Array(values),
        };
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let rendered = try_join_all(sections.iter().map(|&section| section_text(&site, section))).await?;
    debug!(sections = rendered.len(), "Rendered sections");
    Ok(rendered.join("\n\n"))
}

async fn section_text(site: &SchoolSite, section: Section) -> Result<String> {
    let data = site.school_data().await?;
    render::text(&data, section)
}

async fn section_json(site: &SchoolSite, section: Section) -> Result<Value> {
    let data = site.school_data().await?;
    render::json(&data, section)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))?.ok_or_else(|| anyhow!("help requested"))
    }

    #[test]
    fn test_default_section_is_overview() {
        let args = parse(&[]).unwrap();
        assert_eq!(
            args,
            Args {
                refresh: false,
                json: false,
                section: Section::Overview
            }
        );
    }

    #[test]
    fn test_sections_with_ids_and_flags() {
        assert_eq!(parse(&["notice", "12"]).unwrap().section, Section::Notice(12));
        assert_eq!(parse(&["gallery"]).unwrap().section, Section::Gallery(1));
        assert_eq!(parse(&["videos", "3"]).unwrap().section, Section::Videos(3));

        let args = parse(&["--refresh", "teacher", "4", "--json"]).unwrap();
        assert!(args.refresh && args.json);
        assert_eq!(args.section, Section::Teacher(4));
    }

    #[test]
    fn test_document_sections() {
        assert_eq!(parse(&["routine"]).unwrap().section, Section::Routine);
        assert_eq!(parse(&["calendar"]).unwrap().section, Section::Calendar);
        assert_eq!(parse(&["exam-schedule"]).unwrap().section, Section::ExamSchedule);
        assert_eq!(parse(&["exam-system"]).unwrap().section, Section::ExamSystem);
        assert_eq!(parse(&["admission"]).unwrap().section, Section::Admission);
        assert_eq!(parse(&["activities"]).unwrap().section, Section::Activities);
        assert_eq!(parse(&["history"]).unwrap().section, Section::History);
        assert_eq!(parse(&["vision"]).unwrap().section, Section::Vision);
        assert_eq!(parse(&["lab", "Physics"]).unwrap().section, Section::Lab(Lab::Physics));

        assert!(parse(&["lab"]).unwrap_err().to_string().starts_with("Missing lab name"));
        assert_eq!(parse(&["lab", "biology"]).unwrap_err().to_string(), "Unknown lab: biology");
    }

    #[test]
    fn test_help_is_not_an_error() {
        let help = |args: &[&str]| Args::parse(args.iter().map(|s| s.to_string())).unwrap();
        assert_eq!(help(&["--help"]), None);
        assert_eq!(help(&["-h"]), None);
        assert_eq!(help(&["notice", "--help"]), None);
    }

    #[test]
    fn test_invalid_arguments() {
        let err = parse(&["notice"]).unwrap_err();
        assert!(err.to_string().starts_with("Missing notice id"));

        let err = parse(&["event", "abc"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid event id: abc");

        assert!(parse(&["library"]).unwrap_err().to_string().starts_with("Unknown section: library"));
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["news", "1", "2"]).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let args = parse(&["overview"]).unwrap();
        let err = run(&config, &args).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to fetch school data"));

        let args = parse(&["status"]).unwrap();
        let report = run(&config, &args).await.unwrap();
        assert!(report.contains("Cache:   Empty"));
        assert!(report.contains("Error:   Failed to fetch school data"));
    }
}
