//! Turning a solver trace into a [`Fulfillment`].

use crate::error::{AllocationError, Result};
use crate::types::{Fulfillment, PackQuantity, PackSize};

/// Predecessor links recorded during one solve.
pub trait Trace {
    /// Size of the last pack on the chosen path to `total`, or `None` if the
    /// trace holds no link for it.
    fn predecessor(&self, total: u64) -> Option<PackSize>;
}

/// Accumulates pack counts while a trace is walked back to zero.
#[derive(Debug, Default)]
pub struct ResultAssembler {
    fulfillment: Fulfillment,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, size: PackSize, count: PackQuantity) {
        self.fulfillment.add(size, count);
    }

    /// Follows predecessors from `total` down to zero, counting one pack per step.
    pub fn walk<T: Trace + ?Sized>(&mut self, trace: &T, mut total: u64) -> Result<()> {
        while total > 0 {
            let size = match trace.predecessor(total) {
                Some(size) if size > 0 && size <= total => size,
                _ => return Err(AllocationError::TraceCorruption { total }),
            };
            self.fulfillment.add(size, 1);
            total -= size;
        }
        Ok(())
    }

    pub fn finish(self) -> Fulfillment {
        self.fulfillment
    }
}

/// Walks `trace` from `terminal` and returns the resulting fulfillment.
pub fn assemble<T: Trace + ?Sized>(trace: &T, terminal: u64) -> Result<Fulfillment> {
    let mut assembler = ResultAssembler::new();
    assembler.walk(trace, terminal)?;
    Ok(assembler.finish())
}
