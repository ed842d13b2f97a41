// SPDX-License-Identifier: MIT

//! `agentgated`: the AgentGate daemon binary. Wires a driver registry, builds
//! the [`agentgate_daemon::Application`], and runs it until SIGINT/SIGTERM.

use std::sync::Arc;

use agentgate_core::SystemClock;
use agentgate_daemon::{env, Application};
use agentgate_driver::{AgentCapabilities, ArgvBuilder, DriverRegistry, SubprocessAgentDriver};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = setup_logging()?;

    let driver_registry = build_driver_registry();
    let state_dir = env::state_dir()?;
    let app = Arc::new(Application::new(
        state_dir,
        driver_registry,
        env::max_queue_size(),
        env::max_concurrent(),
        SystemClock,
    )?);

    let shutdown = CancellationToken::new();
    let run_handle = {
        let app = Arc::clone(&app);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { app.run(shutdown).await })
    };

    tracing::info!("agentgated ready");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!(error = %err, "failed to listen for ctrl_c");
            }
            tracing::info!("shutdown requested");
        }
        () = sigterm() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }

    shutdown.cancel();
    let _ = run_handle.await;
    app.shutdown(env::drain_timeout(), env::kill_grace()).await;

    tracing::info!("agentgated stopped");
    Ok(())
}

/// Resolves once a SIGTERM arrives. On non-Unix platforms this future never
/// resolves, leaving `ctrl_c` as the only shutdown trigger.
#[cfg(unix)]
async fn sigterm() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending::<()>().await;
}

/// Builds the argv for the default subprocess driver: `<prompt-file> --workspace <dir>`.
/// The agent binary is expected to read the task prompt and prior feedback from
/// the prompt file and report completion via its structured final-output line.
fn default_argv_builder() -> ArgvBuilder {
    Arc::new(|request| {
        let mut argv = vec!["--workspace".to_string(), request.workspace_path.display().to_string()];
        if let Some(session_id) = &request.session_id {
            argv.push("--resume".to_string());
            argv.push(session_id.clone());
        }
        argv
    })
}

fn build_driver_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    let capabilities = AgentCapabilities {
        supports_session_resume: true,
        supports_structured_output: true,
        supports_tool_restriction: false,
        supports_timeout: true,
        max_turns: None,
    };
    let driver = SubprocessAgentDriver::new(
        "default",
        env::agent_binary(),
        default_argv_builder(),
        vec!["ANTHROPIC_API_KEY".to_string(), "OPENAI_API_KEY".to_string()],
        capabilities,
    );
    registry.register("default", Arc::new(driver));
    registry
}

fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, agentgate_daemon::ApplicationError> {
    let log_dir = env::log_dir()?;
    std::fs::create_dir_all(&log_dir).map_err(|_| agentgate_daemon::ApplicationError::NoStateDir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "agentgated.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
