use tokio::signal;

#[derive(Debug, Clone, Copy)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM. The server then stops accepting and drains
/// in-flight requests; open transactions finish or roll back with them.
pub(crate) async fn shutdown_signal() {
    let received = tokio::select! {
        received = interrupt() => received,
        received = terminate() => received,
    };

    tracing::info!(signal = received.name(), "Shutdown requested, draining requests");
}

async fn interrupt() -> StopSignal {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    StopSignal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> StopSignal {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
    StopSignal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> StopSignal {
    std::future::pending().await
}
