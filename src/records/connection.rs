//! Lazily-established, memoized database connection.
//!
//! The cell holds one of three states: no attempt yet, an open in flight, or
//! a live handle. Operations issued while an open is in flight all await the
//! same shared attempt, so at most one underlying open ever runs at a time.
//! A failed attempt empties the cell; the next operation retries from
//! scratch. The owning facade calls [`ConnectionCell::reset`] after a failed
//! operation for the same effect.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::{LocalBoxFuture, Shared};
use futures_util::FutureExt;

use crate::error::StoreError;
use crate::records::config::StoreConfig;
use crate::records::Connection;

type OpenFuture = Shared<LocalBoxFuture<'static, Result<Connection, StoreError>>>;

enum State {
    /// No attempt since construction or the last reset.
    Idle,
    /// An open is in flight; every caller awaits this same attempt.
    Opening(OpenFuture),
    /// The live connection handle.
    Ready(Connection),
}

pub(crate) struct ConnectionCell {
    config: StoreConfig,
    state: Rc<RefCell<State>>,
}

impl Clone for ConnectionCell {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

impl ConnectionCell {
    pub(crate) fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: Rc::new(RefCell::new(State::Idle)),
        }
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the live connection, opening it on first use.
    pub(crate) async fn connect(&self) -> Result<Connection, StoreError> {
        let attempt = {
            let mut state = self.state.borrow_mut();
            match &*state {
                State::Ready(conn) => return Ok(conn.clone()),
                State::Opening(attempt) => attempt.clone(),
                State::Idle => {
                    let config = self.config.clone();
                    let attempt = async move { Connection::open(&config).await }
                        .boxed_local()
                        .shared();
                    *state = State::Opening(attempt.clone());
                    attempt
                }
            }
        };

        let outcome = attempt.await;

        // The cell may have been reset while the open was in flight; only
        // an untouched cell records the outcome.
        let mut state = self.state.borrow_mut();
        match &outcome {
            Ok(conn) => {
                if matches!(&*state, State::Opening(_)) {
                    *state = State::Ready(conn.clone());
                }
            }
            Err(err) => {
                if matches!(&*state, State::Opening(_)) {
                    log::warn!("failed to open database {:?}: {err}", self.config.db_name);
                    *state = State::Idle;
                }
            }
        }
        outcome
    }

    /// Empties the cell; the next `connect` starts a fresh open.
    pub(crate) fn reset(&self) {
        *self.state.borrow_mut() = State::Idle;
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        matches!(&*self.state.borrow(), State::Idle)
    }

    #[cfg(test)]
    pub(crate) fn is_ready(&self) -> bool {
        matches!(&*self.state.borrow(), State::Ready(_))
    }
}
