//! OS signal handling for graceful shutdown.
//!
//! On Unix, SIGINT, SIGTERM and SIGQUIT are handled alongside
//! [`tokio::signal::ctrl_c`]. Elsewhere only Ctrl-C is awaited.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Completes when the process receives a termination signal.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be installed.
#[cfg(unix)]
pub async fn wait_for_termination_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives Ctrl-C.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
#[cfg(not(unix))]
pub async fn wait_for_termination_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Spawns a task that cancels `token` on the first termination signal.
///
/// The task also exits quietly if `token` is cancelled by something else
/// first. If the handlers cannot be installed the error is logged and the
/// token is left alone.
pub fn cancel_on_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            result = wait_for_termination_signal() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "failed to install signal handlers");
                    return;
                }
                tracing::info!("termination signal received");
                token.cancel();
            }
        }
    })
}
