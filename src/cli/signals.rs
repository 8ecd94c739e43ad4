//! Stop signals for an in-progress recording

use std::io::BufRead;
use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tracing::debug;

/// Why a recording was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enter pressed on the terminal
    Enter,
    /// SIGINT / Ctrl-C
    Interrupt,
    /// The `--duration` limit elapsed
    TimeLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Interrupt => "interrupt",
            Self::TimeLimit => "time limit",
        }
    }
}

/// Merges every stop source into one channel.
///
/// Ctrl-C and the time limit are tokio tasks. Stdin is read on a plain
/// thread that is never joined, so a pending read cannot hold up runtime
/// shutdown. End of input is not a stop request.
pub struct StopSignal {
    receiver: mpsc::Receiver<StopReason>,
}

impl StopSignal {
    /// Start listening for stop requests.
    ///
    /// Returns the signal and a sender other sources can use to request a stop.
    pub fn listen(limit: Option<StdDuration>) -> (Self, mpsc::Sender<StopReason>) {
        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx_int.send(StopReason::Interrupt).await;
            }
        });

        if let Some(limit) = limit {
            let tx_limit = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                let _ = tx_limit.send(StopReason::TimeLimit).await;
            });
        }

        let tx_enter = tx.clone();
        let spawned = std::thread::Builder::new()
            .name("voice-memos-stdin".to_string())
            .spawn(move || {
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) | Err(_) => debug!("Stdin closed, Enter will not stop recording"),
                    Ok(_) => {
                        let _ = tx_enter.blocking_send(StopReason::Enter);
                    }
                }
            });
        if let Err(e) = spawned {
            debug!(error = %e, "Could not watch stdin");
        }

        (Self { receiver: rx }, tx)
    }

    /// Wait for the first stop request
    pub async fn recv(&mut self) -> Option<StopReason> {
        self.receiver.recv().await
    }
}
