// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Readable, Writeable};
use chrono::DateTime;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read, Write};

/// The producer's canonical timestamp rendering, millisecond precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// 2000-01-01T00:00:00.000 UTC, the block timestamp epoch.
const BLOCK_TIMESTAMP_EPOCH_MS: i64 = 946_684_800_000;
const BLOCK_INTERVAL_MS: i64 = 500;

/// Microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePoint(pub i64);

impl Readable for TimePoint {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(TimePoint(i64::read_from(reader)?))
    }
}

impl Writeable for TimePoint {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_micros(self.0) {
            Some(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            // Out of chrono's range; show the raw microsecond count.
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePointSec(pub u32);

impl Readable for TimePointSec {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(TimePointSec(u32::read_from(reader)?))
    }
}

impl Writeable for TimePointSec {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(i64::from(self.0), 0) {
            Some(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for TimePointSec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Count of half-second block slots since [`BLOCK_TIMESTAMP_EPOCH_MS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlockTimestamp(pub u32);

impl BlockTimestamp {
    fn unix_millis(self) -> i64 {
        BLOCK_TIMESTAMP_EPOCH_MS + i64::from(self.0) * BLOCK_INTERVAL_MS
    }
}

impl Readable for BlockTimestamp {
    fn read_from(reader: impl Read) -> io::Result<Self> {
        Ok(BlockTimestamp(u32::read_from(reader)?))
    }
}

impl Writeable for BlockTimestamp {
    fn write_to(&self, writer: impl Write) -> io::Result<()> {
        self.0.write_to(writer)
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.unix_millis()) {
            Some(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for BlockTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_point_renders_millis() {
        // 2018-06-01T12:00:00.500
        assert_eq!(
            TimePoint(1_527_854_400_500_000).to_string(),
            "2018-06-01T12:00:00.500"
        );
        assert_eq!(TimePoint(0).to_string(), "1970-01-01T00:00:00.000");
    }

    #[test]
    fn block_timestamp_epoch() {
        assert_eq!(BlockTimestamp(0).to_string(), "2000-01-01T00:00:00.000");
        assert_eq!(BlockTimestamp(1).to_string(), "2000-01-01T00:00:00.500");
        assert_eq!(BlockTimestamp(2).to_string(), "2000-01-01T00:00:01.000");
    }

    #[test]
    fn time_point_sec_has_no_fraction_bits() {
        assert_eq!(
            TimePointSec(1_527_854_400).to_string(),
            "2018-06-01T12:00:00.000"
        );
    }
}
