//! Average moves remaining across in-progress games.
//!
//! The figure is recomputed on demand from the stored in-progress games and
//! held for a fixed time-to-live. Any write that changes a game's move count
//! or status invalidates it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::games::tictactoe::{Game, SQUARES};

/// Mean of `9 - moves` over `games`, or `None` when there are none.
pub fn average_moves_remaining(games: &[Game]) -> Option<f64> {
    if games.is_empty() {
        return None;
    }
    let played: usize = games.iter().map(Game::number_of_moves).sum();
    let remaining = SQUARES * games.len() - played;
    Some(remaining as f64 / games.len() as f64)
}

/// Caller-facing message for an average; empty when there is no average.
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("The average moves remaining is {:.2}", value),
        None => String::new(),
    }
}

#[derive(Debug)]
struct Cached {
    message: String,
    computed_at: Instant,
}

/// Time-boxed cache for the moves-remaining message.
#[derive(Debug)]
pub struct MovesRemainingCache {
    ttl: Duration,
    entry: Mutex<Option<Cached>>,
}

impl MovesRemainingCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Returns the cached message, or computes and stores a fresh one.
    ///
    /// A poisoned lock is treated as a miss.
    #[instrument(skip(self, compute))]
    pub fn get_or_compute<E>(
        &self,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Ok(guard) = self.entry.lock() {
            if let Some(cached) = guard.as_ref() {
                if cached.computed_at.elapsed() < self.ttl {
                    debug!("Moves remaining served from cache");
                    return Ok(cached.message.clone());
                }
            }
        }

        let message = compute()?;
        if let Ok(mut guard) = self.entry.lock() {
            *guard = Some(Cached {
                message: message.clone(),
                computed_at: Instant::now(),
            });
        }
        debug!("Moves remaining recomputed");
        Ok(message)
    }

    /// Drops the cached entry.
    pub fn invalidate(&self) {
        match self.entry.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
