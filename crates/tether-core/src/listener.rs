// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Listener identity and per-call fault isolation.

use core::fmt;
use std::any::Any;
use std::ops::AddAssign;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Error a listener may return to report that it failed.
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Return type of every listener.
pub type ListenerResult = Result<(), ListenerError>;

/// Identifies one registration in a callback list or on the channel.
///
/// Registering the same closure twice yields two ids and two invocations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ListenerId(pub(crate) u64);

/// Counts from one dispatch pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DispatchReport {
    /// Listeners that were invoked (including ones that faulted).
    pub invoked: usize,
    /// Listeners that returned an error or panicked.
    pub faulted: usize,
}

impl AddAssign for DispatchReport {
    fn add_assign(&mut self, rhs: Self) {
        self.invoked += rhs.invoked;
        self.faulted += rhs.faulted;
    }
}

/// Why a single listener invocation failed.
#[derive(Debug)]
pub(crate) enum ListenerFault {
    Error(ListenerError),
    Panic(String),
}

impl fmt::Display for ListenerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Runs one listener, converting both `Err` returns and panics into a fault.
pub(crate) fn invoke_isolated(f: impl FnOnce() -> ListenerResult) -> Result<(), ListenerFault> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(ListenerFault::Error(err)),
        Err(payload) => Err(ListenerFault::Panic(panic_message(payload.as_ref()))),
    }
}
