//! CLI command implementations
//!
//! Every command loads the configuration file, applies the
//! `FILES_TABLE_NAME` override, builds the configured store and then either
//! serves HTTP or handles exactly one request from stdin.
//!
//! A missing table is not a boot failure: each request reports it as a
//! fatal configuration response.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::api::{decode_deletion, decode_notification, Response};
use crate::config::{ServiceConfig, StoreBackend};
use crate::http_server::{HttpServer, IndexState};
use crate::index::{IndexResult, Indexer, Outcome, Remover};
use crate::model::DeletionRequest;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::store::{IndexStore, MemoryIndexStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Index { config } => index(&config),
        Command::Remove { config, key } => remove(&config, key),
    }
}

/// Serve `/objects/created`, `/objects/delete`, `/health` and `/metrics`
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = boot(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let rt = runtime()?;
    rt.block_on(async {
        let store = build_store(&config).await;
        let state = Arc::new(IndexState::new(store, config.index_config(), config.retry));
        let server = HttpServer::new(config.http.clone(), state);

        log_event(Event::BootComplete);
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Index one notification (flat or event-bus envelope) read from stdin
pub fn index(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let body = read_request()?;

    let rt = runtime()?;
    let response = rt.block_on(async {
        let result: IndexResult<Outcome> = match decode_notification(&body) {
            Ok(notification) => {
                let store = build_store(&config).await;
                Indexer::new(store, config.index_config())
                    .with_retry(config.retry)
                    .index(&notification)
                    .await
            }
            Err(err) => Err(err),
        };
        Response::from_result(result)
    });

    respond(response)
}

/// Remove one object named by `--key`, or by a deletion request on stdin
pub fn remove(config_path: &Path, key: Option<String>) -> CliResult<()> {
    let config = boot(config_path)?;

    let request = match key {
        Some(key) => Ok(DeletionRequest::new(key)),
        None => decode_deletion(&read_request()?),
    };

    let rt = runtime()?;
    let response = rt.block_on(async {
        let result = match request {
            Ok(request) => {
                let store = build_store(&config).await;
                Remover::new(store, config.index_config())
                    .with_retry(config.retry)
                    .remove(&request)
                    .await
            }
            Err(err) => Err(err),
        };
        Response::from_result(result)
    });

    respond(response)
}

fn boot(config_path: &Path) -> CliResult<ServiceConfig> {
    log_event(Event::BootStart);
    let config = ServiceConfig::load(config_path)?;

    let backend = match config.backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Dynamodb => "dynamodb",
    };
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("backend", backend),
            ("table_name", config.table_name.as_deref().unwrap_or("")),
        ],
    );
    Ok(config)
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Build the configured store. The memory backend lives only as long as
/// the process.
async fn build_store(config: &ServiceConfig) -> Arc<dyn IndexStore> {
    match config.backend {
        #[cfg(feature = "dynamodb")]
        StoreBackend::Dynamodb => Arc::new(
            crate::store::DynamoDbIndexStore::from_env(config.dynamodb.clone()).await,
        ),
        // Without the feature, `ServiceConfig::load` rejects the dynamodb backend
        _ => Arc::new(MemoryIndexStore::new()),
    }
}

/// Print the response; non-success responses also fail the process
fn respond(response: Response) -> CliResult<()> {
    write_response(&response)?;
    if response.is_success() {
        Ok(())
    } else {
        Err(CliError::request_failed(&response))
    }
}
