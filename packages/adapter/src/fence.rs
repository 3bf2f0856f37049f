//! Per-record write sequencing.
//!
//! Each write gets a ticket. Only the response to the most recently issued
//! write for a record may touch the store; older ones are stale. A ticket
//! that is dropped without being settled (the write future was cancelled, or
//! failed before its response was applied) releases its record.

use std::collections::HashMap;
use std::sync::Mutex;

use restmap_store::ClientId;

use crate::Error;

#[derive(Debug, Default)]
pub(crate) struct WriteFence {
    inner: Mutex<FenceState>,
}

#[derive(Debug, Default)]
struct FenceState {
    next_ticket: u64,
    latest: HashMap<ClientId, u64>,
}

impl WriteFence {
    /// Issue a ticket for a new write, superseding any in flight.
    pub(crate) fn issue(&self, record: ClientId) -> Result<WriteTicket<'_>, Error> {
        let mut state = self.inner.lock().map_err(|_| Error::StorePoisoned)?;
        state.next_ticket += 1;
        let ticket = state.next_ticket;
        state.latest.insert(record, ticket);
        Ok(WriteTicket {
            fence: self,
            record,
            ticket,
            settled: false,
        })
    }

    fn release(&self, record: ClientId, ticket: u64) -> Result<bool, Error> {
        let mut state = self.inner.lock().map_err(|_| Error::StorePoisoned)?;
        if state.latest.get(&record) == Some(&ticket) {
            state.latest.remove(&record);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn is_pending(&self, record: ClientId) -> bool {
        self.inner
            .lock()
            .map(|state| state.latest.contains_key(&record))
            .unwrap_or(false)
    }
}

/// An in-flight write. Releases its record when settled or dropped.
#[derive(Debug)]
pub(crate) struct WriteTicket<'a> {
    fence: &'a WriteFence,
    record: ClientId,
    ticket: u64,
    settled: bool,
}

impl WriteTicket<'_> {
    /// Settle the write. Returns `false` if a newer write has been issued for
    /// the record since, in which case the caller must drop its response.
    pub(crate) fn settle(mut self) -> Result<bool, Error> {
        self.settled = true;
        self.fence.release(self.record, self.ticket)
    }
}

impl Drop for WriteTicket<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let _ = self.fence.release(self.record, self.ticket);
        }
    }
}
