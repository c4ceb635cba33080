use clap::{Parser, Subcommand};
use pipeline::{InvocationContext, InvocationResponse, SystemClock};
use pipeline_consumer::ConsumerEngine;
use pipeline_local::LocalBackends;
use pipeline_producer::{AccessLogConfig, AccessLogHandler, EventGenerator, HttpRequest, Producer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// Ejecuta una invocación del pipeline contra los backends locales
/// (`PIPELINE_DATA_DIR`) e imprime la respuesta JSON en stdout. Los logs van
/// a stderr; el nivel se controla con `RUST_LOG`.
#[derive(Debug, Parser)]
#[command(name = "record-pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Un tick del producer: envía un lote de eventos sintéticos.
    Produce {
        /// Semilla fija para obtener siempre el mismo lote.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Procesa una notificación de almacenamiento (fichero o `-` para stdin).
    Consume {
        #[arg(long, env = "PIPELINE_EVENT", default_value = "-")]
        event: String,
    },
    /// Atiende una petición HTTP del productor de logs de acceso.
    ServeRequest {
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
        /// Header en formato `nombre=valor`; se puede repetir.
        #[arg(long = "header", value_parser = parse_key_value)]
        headers: Vec<(String, String)>,
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    #[error("no se pudo leer el evento: {0}")]
    Input(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("se esperaba nombre=valor, se recibió '{}'", raw)),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init también instala el puente de `log`, que usan las librerías.
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn read_event(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(source)
    }
}

async fn run(command: Command, backends: LocalBackends) -> Result<serde_json::Value, CliError> {
    let response = match command {
        Command::Produce { seed } => {
            let config = pipeline::ProducerConfig::from_env()?;
            let rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_os_rng(),
            };
            let generator = EventGenerator::new(rng, SystemClock);
            let mut producer = Producer::new(backends.stream, backends.metrics, config, generator);
            response_json(producer.invoke().await)?
        }
        Command::Consume { event } => {
            let config = pipeline::ConsumerConfig::from_env()?;
            let raw = read_event(&event)?;
            let engine = ConsumerEngine::new(backends.objects, backends.metrics, backends.notifier, config);
            let ctx = InvocationContext::new();
            tracing::info!(request_id = %ctx.request_id, "consume");
            response_json(engine.handle_json(&raw, &ctx).await)?
        }
        Command::ServeRequest { path, method, headers, body } => {
            let config = AccessLogConfig::from_env()?;
            let handler = AccessLogHandler::new(backends.stream, Arc::new(SystemClock), config);
            let mut request = HttpRequest::get(&path);
            request.http_method = Some(method);
            request.body = body;
            for (k, v) in headers {
                request = request.with_header(&k, &v);
            }
            serde_json::to_value(handler.handle(&request).await)?
        }
    };
    Ok(response)
}

fn response_json(response: InvocationResponse) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::to_value(response)?)
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let backends = pipeline_local::new_from_env();
    match run(cli.command, backends).await {
        Ok(value) => {
            println!("{}", value);
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("record-pipeline: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
