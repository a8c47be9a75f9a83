//! Live flight tracking loop
//!
//! Polls one flight on a fixed interval in a background task and reports each
//! result over a channel. Iterations never overlap: the next wait starts only
//! after the previous query finished. Shutdown is checked between iterations.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::data::FlightStatusRecord;
use crate::providers::FlightProvider;
use crate::service::FlightService;

/// Messages sent from the tracking task to the caller
#[derive(Debug, Clone)]
pub enum TrackMessage {
    /// A fresh status was fetched
    Updated {
        record: FlightStatusRecord,
        fetched_at: DateTime<Utc>,
    },
    /// The query failed; tracking continues with the next interval
    Failed(String),
}

/// Configuration for the tracking loop
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Time between the end of one query and the start of the next
    pub interval: Duration,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Handle for controlling a running tracking loop
pub struct TrackHandle {
    /// Channel for receiving tracking updates
    pub receiver: mpsc::Receiver<TrackMessage>,
    /// Signals the loop to stop
    shutdown_tx: mpsc::Sender<()>,
}

impl TrackHandle {
    /// Spawns the tracking loop for `flight_number`
    ///
    /// The first query runs immediately. The loop ends when [`shutdown`] is
    /// called, when the handle is dropped, or when the receiver is closed.
    ///
    /// [`shutdown`]: TrackHandle::shutdown
    pub fn spawn<P>(service: FlightService<P>, flight_number: String, config: TrackConfig) -> Self
    where
        P: FlightProvider + 'static,
    {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            loop {
                let message = match service.get_status(&flight_number).await {
                    Ok(fetched) => TrackMessage::Updated {
                        record: fetched.data,
                        fetched_at: Utc::now(),
                    },
                    Err(e) => TrackMessage::Failed(e.to_string()),
                };

                if msg_tx.send(message).await.is_err() {
                    log::debug!("track receiver closed, stopping");
                    break;
                }

                tokio::select! {
                    _ = tokio::time::sleep(config.interval) => {}
                    _ = shutdown_rx.recv() => {
                        log::debug!("tracking of {} stopped", flight_number);
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Stops the tracking loop after the current iteration
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    /// Hands every update to `on_message` until `stop` resolves
    ///
    /// `stop` is polled for the whole run, so a stop request that arrives
    /// while `on_message` is busy is seen on the next turn. Returns early with
    /// the first error from `on_message`, and also returns once the loop ends
    /// on its own.
    pub async fn run_until<S, F, E>(mut self, stop: S, mut on_message: F) -> Result<(), E>
    where
        S: Future<Output = ()>,
        F: FnMut(TrackMessage) -> Result<(), E>,
    {
        tokio::pin!(stop);

        let stopped = loop {
            tokio::select! {
                message = self.receiver.recv() => match message {
                    Some(message) => on_message(message)?,
                    None => break false,
                },
                _ = &mut stop => break true,
            }
        };

        if stopped {
            self.shutdown().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixtureProvider;

    fn fixture_service() -> FlightService<FixtureProvider> {
        FlightService::new(FixtureProvider::default(), None)
    }

    #[tokio::test]
    async fn test_first_update_arrives_immediately() {
        let config = TrackConfig {
            interval: Duration::from_secs(3600),
        };
        let mut handle = TrackHandle::spawn(fixture_service(), "DL123".to_string(), config);

        let message = tokio::time::timeout(Duration::from_secs(5), handle.receiver.recv())
            .await
            .expect("first update should not wait for the interval")
            .expect("channel should be open");

        match message {
            TrackMessage::Updated { record, .. } => assert_eq!(record.flight_number, "DL123"),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_polls_repeatedly_until_shutdown() {
        let config = TrackConfig {
            interval: Duration::from_millis(10),
        };
        let mut handle = TrackHandle::spawn(fixture_service(), "KE038".to_string(), config);

        for _ in 0..3 {
            let message = handle.receiver.recv().await.expect("loop should still run");
            assert!(matches!(message, TrackMessage::Updated { .. }));
        }

        handle.shutdown().await;

        // Drain whatever was in flight; the channel must then close
        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while handle.receiver.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "loop should stop after shutdown");
    }

    #[tokio::test]
    async fn test_failures_are_reported_and_tracking_continues() {
        let config = TrackConfig {
            interval: Duration::from_millis(10),
        };
        let mut handle = TrackHandle::spawn(fixture_service(), "ZZ999".to_string(), config);

        for _ in 0..2 {
            match handle.receiver.recv().await.expect("loop should still run") {
                TrackMessage::Failed(msg) => assert!(msg.contains("ZZ999")),
                other => panic!("expected failure, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_run_until_stops_on_signal() {
        let config = TrackConfig {
            interval: Duration::from_millis(10),
        };
        let handle = TrackHandle::spawn(fixture_service(), "DL123".to_string(), config);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let mut stop_tx = Some(stop_tx);
        let mut updates = 0;

        let stop = async {
            let _ = stop_rx.await;
        };
        let result: Result<(), ()> = tokio::time::timeout(
            Duration::from_secs(5),
            handle.run_until(stop, |message| {
                assert!(matches!(message, TrackMessage::Updated { .. }));
                updates += 1;
                // Request the stop while an update is being handled
                if updates == 3 {
                    if let Some(tx) = stop_tx.take() {
                        let _ = tx.send(());
                    }
                }
                Ok(())
            }),
        )
        .await
        .expect("stop request should end the run");

        assert!(result.is_ok());
        assert!(updates >= 3);
    }

    #[tokio::test]
    async fn test_run_until_returns_handler_error() {
        let handle = TrackHandle::spawn(fixture_service(), "DL123".to_string(), TrackConfig::default());

        let result = handle
            .run_until(std::future::pending::<()>(), |_| Err("render failed"))
            .await;
        assert_eq!(result, Err("render failed"));
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(TrackConfig::default().interval, Duration::from_secs(30));
    }
}
