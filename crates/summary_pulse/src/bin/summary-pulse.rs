use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use summary_datastore::PgDataStore;
use summary_pulse::{
    archive::{ArchiveBackend, GcsArchive, LocalArchive},
    chat::{answer_question, QuestionContext},
    format_summary_markdown,
    parser::extract_video_id,
    telemetry::init_tracing_subscriber,
    yt::{
        metadata::YtDataClient, transcript::YtTranscriptClient, MetadataSource, TranscriptSource,
    },
    OpenAIClient, SummaryOutcome, SummaryService, SummaryServiceBuilder,
};

#[derive(Parser)]
#[command(
    name = "summary-pulse",
    about = "Structured summaries of YouTube videos, cached in postgres"
)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: Option<String>,

    /// Chat completion model
    #[arg(long, env = "OPENAI_MODEL", default_value = OpenAIClient::DEFAULT_MODEL)]
    model: String,

    /// YouTube Data API key, used for title/channel metadata
    #[arg(long, env = "YOUTUBE_API_KEY")]
    youtube_api_key: Option<String>,

    /// Caption languages in order of preference
    #[arg(
        long,
        env = "TRANSCRIPT_LANGUAGES",
        value_delimiter = ',',
        default_value = "ja,en"
    )]
    languages: Vec<String>,

    /// Cloud Storage bucket receiving archive copies
    #[arg(long, env = "GCS_BUCKET_NAME")]
    gcs_bucket: Option<String>,

    /// OAuth access token for the Cloud Storage bucket
    #[arg(long, env = "GCS_ACCESS_TOKEN", hide_env_values = true)]
    gcs_access_token: Option<String>,

    /// Local directory receiving archive copies when no bucket is set
    #[arg(long, env = "ARCHIVE_DIR")]
    archive_dir: Option<PathBuf>,

    /// Run the rewrite-for-brevity pass after drafting
    #[arg(long, env = "REFINE_SUMMARY")]
    refine: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a video, serving the cached summary when one exists
    Summarize {
        /// Video URL or id
        video: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the transcript of a video
    Transcript {
        /// Video URL or id
        video: String,
    },
    /// Ask a question about a video
    Ask {
        /// Video URL or id
        video: String,

        #[arg(long)]
        question: String,

        /// Answer from the raw transcript or from the summary
        #[arg(long, value_enum, default_value_t = ContextArg::Transcript)]
        context: ContextArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, ValueEnum)]
enum ContextArg {
    Transcript,
    Summary,
}

#[derive(Clone)]
struct Config {
    db_url: Option<String>,
    openai_key: Option<String>,
    model: String,
    youtube_api_key: Option<String>,
    languages: Vec<String>,
    gcs_bucket: Option<String>,
    gcs_access_token: Option<String>,
    archive_dir: Option<PathBuf>,
    refine: bool,
}

impl Config {
    fn openai(&self) -> anyhow::Result<OpenAIClient> {
        let key = self
            .openai_key
            .as_deref()
            .context("OPENAI_API_KEY not set")?;
        Ok(OpenAIClient::new(key).with_model(&self.model))
    }

    fn archive(&self) -> anyhow::Result<Option<ArchiveBackend>> {
        match (&self.gcs_bucket, &self.archive_dir) {
            (Some(bucket), _) => {
                let token = self
                    .gcs_access_token
                    .as_deref()
                    .context("GCS_ACCESS_TOKEN must be set together with GCS_BUCKET_NAME")?;
                Ok(Some(ArchiveBackend::Gcs(GcsArchive::new(bucket, token))))
            }
            (None, Some(dir)) => Ok(Some(ArchiveBackend::Local(LocalArchive::new(dir)))),
            (None, None) => {
                tracing::info!("No archive configured, summaries are only cached");
                Ok(None)
            }
        }
    }
}

type Service = SummaryService<PgDataStore, OpenAIClient, Option<ArchiveBackend>>;

async fn build_service(config: &Config) -> anyhow::Result<(Service, PgDataStore)> {
    let db_url = config.db_url.as_deref().context("DATABASE_URL not set")?;
    let store = PgDataStore::init(db_url).await?;

    let service = SummaryServiceBuilder::new()
        .store(store.clone())
        .completion(config.openai()?)
        .archive(config.archive()?)
        .with_refinement(config.refine)
        .build();

    Ok((service, store))
}

async fn summarize_video(
    config: &Config,
    video_id: &str,
) -> anyhow::Result<(SummaryOutcome, OpenAIClient)> {
    let (service, store) = build_service(config).await?;
    let outcome = cached_or_summarize(&service, config, video_id).await;
    store.close().await;

    Ok((outcome?, service.completion().clone()))
}

/// Transcript and metadata are only fetched on a cache miss
async fn cached_or_summarize(
    service: &Service,
    config: &Config,
    video_id: &str,
) -> anyhow::Result<SummaryOutcome> {
    if let Some(outcome) = service.cached(video_id).await {
        return Ok(outcome);
    }

    let transcript = YtTranscriptClient::new(config.languages.clone())
        .fetch_transcript(video_id)
        .await
        .context("Failed to fetch transcript")?;
    let metadata = YtDataClient::new(config.youtube_api_key.clone())
        .fetch_metadata(video_id)
        .await;

    service
        .summarize(video_id, &transcript, &metadata)
        .await
        .context("Failed to summarize video")
}

async fn run_summarize(config: &Config, video: &str, format: OutputFormat) -> anyhow::Result<()> {
    let video_id = extract_video_id(video)?;
    let (outcome, _) = summarize_video(config, &video_id).await?;

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "video_id": video_id,
                "source": outcome.source,
                "archive_path": outcome.archive_path,
                "summary": outcome.summary,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Markdown => {
            print!("{}", format_summary_markdown(&outcome.summary));
            if let Some(path) = &outcome.archive_path {
                println!("\n_Archived at {path}_");
            }
        }
    }

    Ok(())
}

async fn run_transcript(config: &Config, video: &str) -> anyhow::Result<()> {
    let video_id = extract_video_id(video)?;
    let transcript = YtTranscriptClient::new(config.languages.clone())
        .fetch_transcript(&video_id)
        .await
        .context("Failed to fetch transcript")?;
    let metadata = YtDataClient::new(config.youtube_api_key.clone())
        .fetch_metadata(&video_id)
        .await;

    let body = serde_json::json!({
        "video_id": video_id,
        "title": metadata.title,
        "description": metadata.description,
        "transcript": transcript,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}

async fn run_ask(
    config: &Config,
    video: &str,
    question: &str,
    context: ContextArg,
) -> anyhow::Result<()> {
    let video_id = extract_video_id(video)?;

    let (context, context_text, openai) = match context {
        ContextArg::Transcript => {
            let transcript = YtTranscriptClient::new(config.languages.clone())
                .fetch_transcript(&video_id)
                .await
                .context("Failed to fetch transcript")?;
            (
                QuestionContext::Transcript,
                transcript.full_text(),
                config.openai()?,
            )
        }
        ContextArg::Summary => {
            let (outcome, openai) = summarize_video(config, &video_id).await?;
            (
                QuestionContext::Summary,
                serde_json::to_string_pretty(&outcome.summary)?,
                openai,
            )
        }
    };

    let answer = answer_question(&openai, context, &context_text, question).await?;
    println!("{answer}");

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = Config {
        db_url: cli.database_url,
        openai_key: cli.openai_key,
        model: cli.model,
        youtube_api_key: cli.youtube_api_key,
        languages: cli.languages,
        gcs_bucket: cli.gcs_bucket,
        gcs_access_token: cli.gcs_access_token,
        archive_dir: cli.archive_dir,
        refine: cli.refine,
    };

    match cli.command {
        Command::Summarize { video, format } => run_summarize(&config, &video, format).await,
        Command::Transcript { video } => run_transcript(&config, &video).await,
        Command::Ask {
            video,
            question,
            context,
        } => run_ask(&config, &video, &question, context).await,
    }
}
