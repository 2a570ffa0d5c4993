use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relget_config::{Settings, ToolDescriptor, ToolRegistry};
use relget_core::{
    pick_latest, resolve_tools, retain_platform, select, Arch, AssetRef, Error, NormalizedResult,
    Os, ParsedVersion, Pipeline, Platform,
};
use relget_provider::ProviderError;

#[derive(Parser)]
#[command(name = "relget")]
#[command(version, about = "List a tool's releases with their per-platform downloads")]
struct Cli {
    /// Tool to look up, by name or display name (repeatable)
    #[arg(long = "tool", value_name = "NAME", default_value = "kubectx")]
    tools: Vec<String>,

    /// Look up every registered tool
    #[arg(long, conflicts_with = "tools")]
    all: bool,

    /// Releases to keep per tool, newest first
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    limit: i64,

    /// Only show assets for this OS (defaults to the current one when --arch is set)
    #[arg(long)]
    os: Option<String>,

    /// Only show assets for this architecture (defaults to the current one when --os is set)
    #[arg(long)]
    arch: Option<String>,

    /// Allow prereleases when picking the latest asset
    #[arg(long)]
    prerelease: bool,

    /// Maximum number of tools fetched at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// JSON file with extra tool definitions
    #[arg(long, value_name = "PATH")]
    tools_file: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Print the registered tools and exit
    #[arg(long)]
    list: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Picked {
    platform: Platform,
    tag: String,
    version: ParsedVersion,
    asset: AssetRef,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolOutput {
    #[serde(flatten)]
    result: NormalizedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<Picked>,
}

#[derive(Serialize)]
struct ToolFailure<'a> {
    tool: &'a str,
    error: String,
}

fn init_logging(verbose: bool) {
    let mut filter = EnvFilter::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        let level = if verbose { "debug" } else { "warn" };
        filter = filter
            .add_directive(level.parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("rustls=warn".parse().unwrap());
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Provider(ProviderError::Network(_)) => 2,
        Error::Provider(ProviderError::NotFound { .. }) => 3,
        Error::Provider(ProviderError::RateLimited { .. }) => 4,
        Error::Provider(ProviderError::InvalidResponse { .. }) => 5,
        Error::Provider(ProviderError::Cancelled) => 130,
        Error::UnknownTool(_) | Error::UnknownProvider { .. } | Error::Config(_) => 1,
    }
}

fn report(tool: &str, err: &Error) {
    match err {
        Error::Provider(ProviderError::RateLimited { .. }) => {
            eprintln!("{}: {}; retry later or set GITHUB_TOKEN", tool, err)
        }
        _ => eprintln!("{}: {}", tool, err),
    }
}

fn target_platform(os: Option<&str>, arch: Option<&str>) -> Result<Option<Platform>, String> {
    if os.is_none() && arch.is_none() {
        return Ok(None);
    }
    let os = match os {
        Some(s) => Os::parse(s).ok_or_else(|| format!("unknown OS '{}'", s))?,
        None => Os::current().ok_or("cannot detect the current OS; pass --os")?,
    };
    let arch = match arch {
        Some(s) => Arch::parse(s).ok_or_else(|| format!("unknown architecture '{}'", s))?,
        None => Arch::current().ok_or("cannot detect the current architecture; pass --arch")?,
    };
    Ok(Some(Platform::new(os, arch)))
}

fn load_registry(tools_file: Option<&PathBuf>) -> Result<ToolRegistry, Error> {
    match tools_file {
        Some(path) => Ok(ToolRegistry::load(path)?),
        None => Ok(ToolRegistry::builtin()),
    }
}

fn settings(cli: &Cli) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(base) = &cli.api_base {
        settings.github_api = Some(base.clone());
    }
    if let Some(secs) = cli.timeout {
        settings.timeout = Duration::from_secs(secs.max(1));
    }
    if let Some(n) = cli.concurrency {
        settings.concurrency = n;
    }
    settings
}

/// Pick the latest asset from every release, then trim the listing to
/// `limit` and the requested platform.
fn shape(
    result: NormalizedResult,
    platform: Option<Platform>,
    allow_prerelease: bool,
    limit: i64,
) -> ToolOutput {
    let latest = platform.and_then(|platform| {
        pick_latest(&result, platform, allow_prerelease).map(|(release, asset)| Picked {
            platform,
            tag: release.tag.clone(),
            version: release.version.clone(),
            asset: asset.clone(),
        })
    });
    let result = select(result, limit);
    let result = match platform {
        Some(platform) => retain_platform(result, platform),
        None => result,
    };
    ToolOutput { result, latest }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let registry = match load_registry(cli.tools_file.as_ref()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(exit_code(&e)));
        }
    };

    if cli.list {
        let tools: Vec<&ToolDescriptor> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(ExitCode::SUCCESS);
    }

    let platform = match target_platform(cli.os.as_deref(), cli.arch.as_deref()) {
        Ok(platform) => platform,
        Err(message) => {
            eprintln!("{}", message);
            return Ok(ExitCode::from(1));
        }
    };

    let tools: Vec<&ToolDescriptor> = if cli.all {
        registry.iter().collect()
    } else {
        match resolve_tools(&registry, cli.tools.as_slice()) {
            Ok(tools) => tools,
            Err(e) => {
                eprintln!("{}", e);
                return Ok(ExitCode::from(exit_code(&e)));
            }
        }
    };

    let pipeline = Pipeline::new(settings(&cli));
    debug!(
        tools = tools.len(),
        concurrency = pipeline.settings().concurrency,
        "starting"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let results = pipeline.fetch_many(&tools, &cancel).await;

    let mut code = 0;
    let mut outputs = Vec::with_capacity(results.len());
    for (tool, result) in tools.iter().zip(results) {
        match result {
            Ok(result) => outputs.push(serde_json::to_value(shape(
                result,
                platform,
                cli.prerelease,
                cli.limit,
            ))?),
            Err(e) => {
                report(&tool.name, &e);
                if code == 0 {
                    code = exit_code(&e);
                }
                outputs.push(serde_json::to_value(ToolFailure {
                    tool: &tool.name,
                    error: e.to_string(),
                })?);
            }
        }
    }

    if code == 130 {
        return Ok(ExitCode::from(code));
    }
    if outputs.len() == 1 {
        if code == 0 {
            println!("{}", serde_json::to_string_pretty(&outputs[0])?);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    }
    Ok(ExitCode::from(code))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
