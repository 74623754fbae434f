//! Background thread that runs outcome estimates off the command path. Only the newest queued
//! request is ever computed, and every result carries the generation it was requested for so the
//! session can throw away anything that a later command has made stale.

use super::{OutcomeSimulator, WinRates};
use crate::SimulationError;
use blackjack_lib::{BlackjackGameError, Card};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// An immutable snapshot of everything the simulator needs for one estimate.
#[derive(Debug, Clone)]
pub struct EstimateRequest {
    pub generation: u64,
    pub player: Vec<Card>,
    pub up_card: Card,
    pub unseen: Vec<Card>,
    pub seed: u64,
}

impl EstimateRequest {
    /// Runs the estimate described by this request.
    pub fn run(&self, simulator: &OutcomeSimulator) -> EstimateResult {
        EstimateResult {
            generation: self.generation,
            rates: simulator.estimate_with_seed(&self.player, self.up_card, &self.unseen, self.seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimateResult {
    pub generation: u64,
    pub rates: Result<WinRates, BlackjackGameError>,
}

/// Handle to the estimate thread. Dropping the handle closes the request channel and joins the thread.
pub struct EstimateWorker {
    requests: Option<Sender<EstimateRequest>>,
    results: Receiver<EstimateResult>,
    handle: Option<JoinHandle<()>>,
}

impl EstimateWorker {
    /// Spawns the worker thread.
    pub fn spawn(simulator: OutcomeSimulator) -> EstimateWorker {
        let (request_sender, request_receiver) = mpsc::channel::<EstimateRequest>();
        let (result_sender, result_receiver) = mpsc::channel::<EstimateResult>();

        let handle = thread::spawn(move || run(simulator, request_receiver, result_sender));

        EstimateWorker {
            requests: Some(request_sender),
            results: result_receiver,
            handle: Some(handle),
        }
    }

    /// Queues `request`, superseding any request the worker has not started yet.
    pub fn submit(&self, request: EstimateRequest) -> Result<(), SimulationError> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| SimulationError::SendingError("estimate worker has shut down".into()))?;
        sender
            .send(request)
            .map_err(|e| SimulationError::SendingError(format!("{}", e)))
    }

    /// Returns the most recent finished result without blocking, dropping any older ones.
    pub fn try_latest(&self) -> Option<EstimateResult> {
        let mut latest = None;
        while let Ok(result) = self.results.try_recv() {
            latest = Some(result);
        }
        latest
    }

    /// Blocks for up to `timeout` waiting for the next finished result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EstimateResult> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for EstimateWorker {
    fn drop(&mut self) {
        // Closing the sender ends the worker's receive loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    simulator: OutcomeSimulator,
    requests: Receiver<EstimateRequest>,
    results: Sender<EstimateResult>,
) {
    while let Ok(mut request) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            debug!(
                superseded = request.generation,
                by = newer.generation,
                "dropping stale estimate request"
            );
            request = newer;
        }

        let result = request.run(&simulator);
        if results.send(result).is_err() {
            break;
        }
    }
}
