use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracematch::io::load_pixels;
use tracematch::{KernelKind, MatchConfig, Matcher, PixelView, SearchRegion, TemplateStore};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "tracematch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output (per-template scores, cache hits, skipped files).
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KernelConfig {
    Direct,
    #[default]
    Integral,
}

impl From<KernelConfig> for KernelKind {
    fn from(value: KernelConfig) -> Self {
        match value {
            KernelConfig::Direct => KernelKind::Direct,
            KernelConfig::Integral => KernelKind::Integral,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    kernel: KernelConfig,
    parallel: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RegionJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<RegionJson> for SearchRegion {
    fn from(value: RegionJson) -> Self {
        SearchRegion::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    template_dirs: Vec<PathBuf>,
    source_path: String,
    templates: Vec<String>,
    threshold: f64,
    region: Option<RegionJson>,
    output_path: Option<String>,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dirs: Vec::new(),
            source_path: String::new(),
            templates: Vec::new(),
            threshold: 0.9,
            region: None,
            output_path: None,
            match_cfg: MatchConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    template: String,
    success: bool,
    x: usize,
    y: usize,
    center_x: usize,
    center_y: usize,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl MatchRecord {
    fn failed(template: &str, error: String) -> Self {
        Self {
            template: template.to_owned(),
            success: false,
            x: 0,
            y: 0,
            center_x: 0,
            center_y: 0,
            score: 0.0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    loaded: usize,
    skipped: usize,
    first_match: Option<String>,
    results: Vec<MatchRecord>,
}

/// Tries every template in order; a template that cannot be resolved or
/// matched is reported as a failed record and the run continues.
fn match_all(
    store: &TemplateStore,
    matcher: &Matcher<'_>,
    source: PixelView<'_>,
    names: &[String],
    threshold: f64,
    region: SearchRegion,
) -> (Vec<MatchRecord>, Option<String>) {
    let mut results = Vec::with_capacity(names.len());
    let mut first_match = None;
    for name in names {
        let outcome = store.resolve(name).and_then(|record| {
            let result = matcher.find_record(source, &record, threshold, region)?;
            Ok((result, record.width(), record.height()))
        });
        let (result, tpl_width, tpl_height) = match outcome {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(template = name.as_str(), error = %err, "template skipped");
                results.push(MatchRecord::failed(name, err.to_string()));
                continue;
            }
        };

        let (center_x, center_y) = result.center(tpl_width, tpl_height);
        if result.success && first_match.is_none() {
            first_match = Some(name.clone());
        }
        results.push(MatchRecord {
            template: name.clone(),
            success: result.success,
            x: result.x,
            y: result.y,
            center_x,
            center_y,
            score: result.score,
            error: None,
        });
    }
    (results, first_match)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("tracematch=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.source_path.is_empty() || config.templates.is_empty() {
        return Err("source_path and templates must be set in the config".into());
    }
    if !(0.0..=1.0).contains(&config.threshold) {
        return Err("threshold must be within [0, 1]".into());
    }

    let store = TemplateStore::new();
    let report = store.reload(&config.template_dirs);
    let source = load_pixels(&config.source_path)?;
    let region: SearchRegion = config.region.map(Into::into).unwrap_or_default();

    let matcher = Matcher::new(&store).with_config(MatchConfig {
        kernel: config.match_cfg.kernel.into(),
        parallel: config.match_cfg.parallel,
    });

    let (results, first_match) = match_all(
        &store,
        &matcher,
        source.view(),
        &config.templates,
        config.threshold,
        region,
    );
    tracing::info!(
        templates = results.len(),
        matched = first_match.as_deref().unwrap_or("none"),
        "match run finished"
    );

    let output = Output {
        loaded: report.loaded,
        skipped: report.skipped,
        first_match,
        results,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
