//! Minimal demo entrypoint (SPEC_FULL.md §6): wires a `StubDriver` scan end
//! to end against an in-code fixture session and prints the resulting
//! `ScanResult` as JSON, the way the teacher's `cli/run.rs` wires
//! `Browser`/`FlowExecutor` together for a demo path. No YAML session
//! loading or report rendering here - that's out of scope for the CLI
//! wrapper (spec.md's Non-goals).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use vulcn_plugin::builtins::{
    ReflectedXssDetector, ReflectionGateDetector, ReportPlugin, SqlErrorBaselineDetector,
};
use vulcn_plugin::PluginHost;
use vulcn_types::{Session, Step, StepKind};

use crate::config::VulcnConfig;

#[derive(Parser, Debug)]
#[command(name = "vulcn", version, about = "Vulcn DAST scan orchestrator")]
pub struct Cli {
    /// Optional config file (TOML/YAML/JSON) layered over defaults and env.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = VulcnConfig::load(cli.config.as_deref())?;
    tracing::info!(?config, "loaded configuration");

    let driver = vulcn_driver::launch(config.to_driver_config()).await?;

    let plugins = PluginHost::new();
    plugins.register(Arc::new(ReflectedXssDetector::new()))?;
    plugins.register(Arc::new(ReflectionGateDetector::new()))?;
    plugins.register(Arc::new(SqlErrorBaselineDetector::new()))?;
    plugins.register(Arc::new(ReportPlugin::new()))?;
    let plugins = Arc::new(plugins);

    let orchestrator = vulcn_orchestrator::ScanOrchestrator::new(driver, plugins);

    let sessions = vec![demo_session()];
    let payload_sets = vec![
        vulcn_payload::builtins::reflected_xss()?,
        vulcn_payload::builtins::sql_error_based()?,
        vulcn_payload::builtins::sql_blind_timing()?,
    ];

    let result = orchestrator.run(&sessions, &payload_sets).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    std::process::exit(crate::errors::exit_code(&result));
}

/// One navigate step with a reflected query parameter - enough to exercise
/// the baseline pass, the payload loop, and every built-in detector.
fn demo_session() -> Session {
    Session::new(
        "search-reflection-demo",
        vec![Step::new(StepKind::Navigate {
            url: "https://example.test/search?q=hello".to_string(),
            injectable_param: Some("q".to_string()),
            form_field: None,
        })],
    )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
