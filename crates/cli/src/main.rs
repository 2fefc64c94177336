#![deny(warnings)]

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use kokoro_core::analytics::{
    CommitmentKeywords, CommitmentLabels, CommitmentMatcher, EngineError, InsightEngine,
    IntentCategory, IntentClassifier, KeywordIntentClassifier, LabelMapClassifier,
};
use kokoro_core::config::{
    resolve_analytics_config, resolve_api_key, resolve_string_with_default, AnalyticsConfig,
    AnalyticsOverrides, Env, ProviderConfig, StdEnv, DEFAULT_DEEPGRAM_LANGUAGE,
    DEFAULT_DEEPGRAM_MODEL, DEFAULT_OUTPUT_DIR, ENV_DEEPGRAM_API_KEY, ENV_DEEPGRAM_LANGUAGE,
    ENV_DEEPGRAM_MODEL, ENV_OUTPUT_DIR,
};
use kokoro_core::provider::{AudioSource, DeepgramClient, SavedResponseProvider, SpeechProvider};
use kokoro_core::report::{export_json, export_text, render_text, render_timeline};
use kokoro_core::transcript::normalize_value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

const REPORT_FILE: &str = "vibe_report.json";
const TIMELINE_FILE: &str = "sentiment_timeline.txt";

#[derive(Parser, Debug)]
#[command(name = "kokoro")]
#[command(about = "Meeting insights from speech analytics (vibe shifts, hot topics, consensus, action items)")]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a recording, a remote URL or a saved provider response.
    Analyze(AnalyzeArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(false)
        .args(["file", "url", "response"])
))]
struct AnalyzeArgs {
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long)]
    url: Option<String>,

    /// Saved provider JSON; no network access needed.
    #[arg(long)]
    response: Option<PathBuf>,

    #[arg(long)]
    shift_threshold: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    negative_threshold: Option<f64>,

    #[arg(long)]
    intent_floor: Option<f64>,

    #[arg(long)]
    topic_floor: Option<f64>,

    /// Classify intents by exact label instead of keywords.
    #[arg(long = "intent-map", value_name = "LABEL=CATEGORY")]
    intent_map: Vec<String>,

    /// Treat exactly these intent labels as commitments.
    #[arg(long = "commitment-label", value_name = "LABEL")]
    commitment_labels: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the sentiment timeline after the report.
    #[arg(long)]
    chart: bool,

    #[arg(long)]
    save: bool,

    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    deepgram_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let env = StdEnv;
    match cli.command {
        Command::Analyze(args) => run_analyze(args, &env).await,
    }
}

async fn run_analyze(args: AnalyzeArgs, env: &impl Env) -> anyhow::Result<()> {
    let config = build_analytics_config(&args, env)?;
    tracing::info!(
        shift_threshold = config.shift_threshold.value(),
        negative_threshold = config.negative_threshold.value(),
        intent_floor = config.intent_confidence_floor.value(),
        topic_floor = config.topic_confidence_floor.value(),
        "config loaded"
    );
    let engine = build_engine(&args, config)?;

    let (provider, source) = match &args.response {
        Some(path) => (
            Box::new(SavedResponseProvider::new(path.clone())) as Box<dyn SpeechProvider>,
            AudioSource::File(path.clone()),
        ),
        None => {
            let provider_config = build_provider_config(&args, env)?;
            let client = DeepgramClient::new(&provider_config)?;
            (Box::new(client) as Box<dyn SpeechProvider>, audio_source(&args)?)
        }
    };

    let raw = provider
        .analyze(source)
        .await
        .context("speech analysis request failed")?;
    let transcript = normalize_value(&raw).map_err(EngineError::from)?;
    let report = engine.analyze(&transcript);

    match args.format {
        OutputFormat::Text => println!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    let timeline = render_timeline(&report, Some(&transcript));
    if args.chart {
        println!("{timeline}");
    }

    if args.save {
        let out_dir = PathBuf::from(resolve_string_with_default(
            args.output.as_ref().map(|p| p.display().to_string()),
            ENV_OUTPUT_DIR,
            env,
            DEFAULT_OUTPUT_DIR,
        ));
        let json_path = export_json(&report, out_dir.join(REPORT_FILE))?;
        let timeline_path = export_text(&timeline, out_dir.join(TIMELINE_FILE))?;
        println!("JSON report saved to {}", json_path.display());
        println!("Sentiment timeline saved to {}", timeline_path.display());
    }

    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_analytics_config(args: &AnalyzeArgs, env: &impl Env) -> anyhow::Result<AnalyticsConfig> {
    let overrides = AnalyticsOverrides {
        shift_threshold: args.shift_threshold,
        negative_threshold: args.negative_threshold,
        intent_confidence_floor: args.intent_floor,
        topic_confidence_floor: args.topic_floor,
    };
    Ok(resolve_analytics_config(overrides, env)?)
}

fn build_provider_config(args: &AnalyzeArgs, env: &impl Env) -> anyhow::Result<ProviderConfig> {
    let api_key = resolve_api_key(args.deepgram_api_key.clone(), ENV_DEEPGRAM_API_KEY, env)?
        .with_context(|| {
            format!("a Deepgram API key is required (--deepgram-api-key or {ENV_DEEPGRAM_API_KEY})")
        })?;

    Ok(ProviderConfig {
        api_key: Some(api_key),
        model: resolve_string_with_default(None, ENV_DEEPGRAM_MODEL, env, DEFAULT_DEEPGRAM_MODEL),
        language: resolve_string_with_default(
            None,
            ENV_DEEPGRAM_LANGUAGE,
            env,
            DEFAULT_DEEPGRAM_LANGUAGE,
        ),
        ..Default::default()
    })
}

fn audio_source(args: &AnalyzeArgs) -> anyhow::Result<AudioSource> {
    match (&args.file, &args.url) {
        (Some(path), None) => Ok(AudioSource::File(path.clone())),
        (None, Some(url)) => Ok(AudioSource::Url(
            Url::parse(url).with_context(|| format!("invalid --url: {url}"))?,
        )),
        _ => anyhow::bail!("exactly one of --file, --url or --response must be provided"),
    }
}

/// Swaps in label-map classification and an exact commitment label set when
/// the corresponding flags are given.
fn build_engine(
    args: &AnalyzeArgs,
    config: AnalyticsConfig,
) -> anyhow::Result<
    InsightEngine<
        impl Fn(&str) -> IntentCategory + Send + Sync,
        impl Fn(&str) -> bool + Send + Sync,
    >,
> {
    let classifier: Box<dyn IntentClassifier> = if args.intent_map.is_empty() {
        Box::new(KeywordIntentClassifier::default())
    } else {
        Box::new(parse_intent_map(&args.intent_map)?)
    };
    let matcher: Box<dyn CommitmentMatcher> = if args.commitment_labels.is_empty() {
        Box::new(CommitmentKeywords::default())
    } else {
        Box::new(CommitmentLabels::new(&args.commitment_labels))
    };

    Ok(InsightEngine::new(
        config,
        move |label: &str| classifier.classify(label),
        move |label: &str| matcher.is_commitment(label),
    ))
}

fn parse_intent_map(entries: &[String]) -> anyhow::Result<LabelMapClassifier> {
    let pairs = entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(label, category)| (label.trim(), category.trim()))
                .with_context(|| format!("--intent-map expects LABEL=CATEGORY, got {entry:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(LabelMapClassifier::from_pairs(pairs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kokoro_core::config::{MapEnv, ENV_SHIFT_THRESHOLD};

    fn args(extra: &[&str]) -> AnalyzeArgs {
        let argv = ["kokoro", "analyze", "--response", "saved.json"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::parse_from(argv).command {
            Command::Analyze(args) => args,
        }
    }

    #[test]
    fn flags_override_env() {
        let env = MapEnv::default().with_var(ENV_SHIFT_THRESHOLD, "0.9");
        let from_env = build_analytics_config(&args(&[]), &env).expect("valid");
        assert_eq!(from_env.shift_threshold.value(), 0.9);

        let from_flag =
            build_analytics_config(&args(&["--shift-threshold", "0.2"]), &env).expect("valid");
        assert_eq!(from_flag.shift_threshold.value(), 0.2);
    }

    #[test]
    fn negative_threshold_accepts_negative_numbers() {
        let parsed = args(&["--negative-threshold", "-0.5"]);
        let cfg = build_analytics_config(&parsed, &MapEnv::default()).expect("valid");
        assert_eq!(cfg.negative_threshold.value(), -0.5);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let err = build_analytics_config(&args(&["--shift-threshold", "0"]), &MapEnv::default());
        assert!(err.is_err());
    }

    #[test]
    fn intent_map_parses_pairs() {
        let entries = [
            "Agree to plan=affirmation".to_owned(),
            "Push back = disagreement".to_owned(),
        ];
        let classifier = parse_intent_map(&entries).expect("valid map");
        assert_eq!(classifier.classify("agree to plan"), IntentCategory::Affirmation);
        assert_eq!(classifier.classify("Push back"), IntentCategory::Disagreement);
        assert_eq!(classifier.classify("Other"), IntentCategory::Neutral);
    }

    #[test]
    fn intent_map_rejects_bad_entries() {
        assert!(parse_intent_map(&["no separator".to_owned()]).is_err());
        assert!(parse_intent_map(&["Label=maybe".to_owned()]).is_err());
    }

    #[test]
    fn provider_requires_api_key() {
        let parsed = args(&[]);
        assert!(build_provider_config(&parsed, &MapEnv::default()).is_err());

        let env = MapEnv::default().with_var(ENV_DEEPGRAM_API_KEY, "dg-key");
        let cfg = build_provider_config(&parsed, &env).expect("key from env");
        assert_eq!(cfg.model, DEFAULT_DEEPGRAM_MODEL);
        assert!(cfg.api_key.is_some());
    }

    #[test]
    fn input_flags_are_exclusive() {
        let parsed =
            Cli::try_parse_from(["kokoro", "analyze", "--file", "a.wav", "--url", "https://x"]);
        assert!(parsed.is_err());
        assert!(Cli::try_parse_from(["kokoro", "analyze"]).is_err());
    }
}
