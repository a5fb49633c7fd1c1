//! Reassembly buffer for multi-part command responses.
//!
//! A reply too large for one datagram arrives as `total_parts` fragments,
//! each tagged with its 0-based index. Fragments may arrive in any order and
//! are concatenated by index once every slot has been filled.

use super::SessionError;

/// Fragments collected so far for the pending command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassembly {
    parts: Vec<Option<String>>,
    received: usize,
}

impl Reassembly {
    /// Creates an empty buffer for a reply split into `total_parts` fragments.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFragment`] when `total_parts` is zero.
    pub fn new(total_parts: u8) -> Result<Self, SessionError> {
        if total_parts == 0 {
            return Err(SessionError::InvalidFragment {
                total_parts,
                part_index: 0,
                reason: "total part count is zero",
            });
        }
        Ok(Self {
            parts: vec![None; usize::from(total_parts)],
            received: 0,
        })
    }

    /// Declared number of fragments.
    pub fn total_parts(&self) -> u8 {
        // Constructed from a u8, so the length always fits.
        self.parts.len() as u8
    }

    /// Number of distinct indices stored so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Stores one fragment. Returns the full text once every index is present.
    ///
    /// A repeated index replaces the earlier fragment and does not count twice.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidFragment`] when `total_parts` differs
    /// from the count this buffer was created with, or `part_index` is out of
    /// range.
    pub fn insert(
        &mut self,
        total_parts: u8,
        part_index: u8,
        text: String,
    ) -> Result<Option<String>, SessionError> {
        if total_parts != self.total_parts() {
            return Err(SessionError::InvalidFragment {
                total_parts,
                part_index,
                reason: "total part count changed mid-response",
            });
        }
        let slot = self
            .parts
            .get_mut(usize::from(part_index))
            .ok_or(SessionError::InvalidFragment {
                total_parts,
                part_index,
                reason: "part index out of range",
            })?;

        if slot.is_none() {
            self.received += 1;
        }
        *slot = Some(text);

        if self.received < self.parts.len() {
            return Ok(None);
        }
        Ok(Some(self.parts.iter().flatten().map(String::as_str).collect()))
    }
}
