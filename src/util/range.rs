use std::{num::IntErrorKind, str::FromStr};

use crate::error::VaultError;

/// Inclusive `bytes=<start>-<end>` range over a job output body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn parse(range: &str) -> Result<Self, VaultError> {
        let invalid = || VaultError::InvalidRange {
            range: range.to_string(),
        };

        let bounds = range.trim().strip_prefix("bytes=").ok_or_else(invalid)?;
        let (start, end) = bounds.split_once('-').ok_or_else(invalid)?;

        let start = parse_bound(start).ok_or_else(invalid)?;
        let end = parse_bound(end).ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// Clamps to the body; never fails.
    pub fn slice<'a>(&self, body: &'a [u8]) -> &'a [u8] {
        let len = body.len();
        let start = usize::try_from(self.start).unwrap_or(usize::MAX).min(len);
        let end = usize::try_from(self.end)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
            .min(len);

        if start >= end {
            return &[];
        }

        &body[start..end]
    }
}

/// Digit strings too large for a `u64` saturate; `slice` clamps them anyway.
fn parse_bound(bound: &str) -> Option<u64> {
    match bound.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

impl FromStr for ByteRange {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
