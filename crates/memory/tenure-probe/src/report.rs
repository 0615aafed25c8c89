//! Line-oriented output of findings and notices
//!
//! Findings go to the `out` stream, interference and failure notices to
//! the `err` stream.

use std::io::{self, Write};

use crate::ProbeResult;
use crate::classifier::Classification;
use crate::introspect::CollectorId;

/// Writer pair for probe output
pub struct Reporter<O, E> {
    out: O,
    err: E,
    young_name: String,
    tenured_name: String,
}

impl Reporter<io::Stdout, io::Stderr> {
    /// Reporter writing to the process standard streams
    pub fn stdio(young_name: impl Into<String>, tenured_name: impl Into<String>) -> Self {
        Self::new(io::stdout(), io::stderr(), young_name, tenured_name)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    /// Create a reporter over arbitrary writers
    pub fn new(
        out: O,
        err: E,
        young_name: impl Into<String>,
        tenured_name: impl Into<String>,
    ) -> Self {
        Self {
            out,
            err,
            young_name: young_name.into(),
            tenured_name: tenured_name.into(),
        }
    }

    /// Banner naming the tracked regions
    pub fn tracking(&mut self) -> ProbeResult<()> {
        writeln!(
            self.out,
            "Tracking memory usage with {} and {}",
            self.young_name, self.tenured_name
        )?;
        Ok(())
    }

    /// An accepted classification
    pub fn classified(
        &mut self,
        classification: Classification,
        size: usize,
        young_capacity: usize,
    ) -> ProbeResult<()> {
        match classification {
            Classification::DirectTenuredAllocation => writeln!(
                self.out,
                "Direct allocation in {}: {} ({} capacity: {})",
                self.tenured_name, size, self.young_name, young_capacity
            )?,
            Classification::YoungGenerationAllocation => writeln!(
                self.out,
                "Allocation in {}: {} (capacity: {})",
                self.young_name, size, young_capacity
            )?,
        }
        Ok(())
    }

    /// A collection ran during an attempt
    pub fn interference(&mut self, collector: &CollectorId) -> ProbeResult<()> {
        writeln!(self.err, "Collection in {}", collector)?;
        Ok(())
    }

    /// Every attempt for `size` was interfered with
    pub fn unclassified(&mut self, size: usize) -> ProbeResult<()> {
        writeln!(
            self.err,
            "Can't allocate {} bytes without triggering a collection",
            size
        )?;
        Ok(())
    }

    /// The search stopped because `size` exceeded the young generation
    pub fn exceeded(&mut self, size: usize, young_capacity: usize) -> ProbeResult<()> {
        writeln!(
            self.out,
            "Allocation size ({}) greater than {} capacity ({})",
            size, self.young_name, young_capacity
        )?;
        Ok(())
    }

    /// Consume the reporter and return the writers
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
