use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The coordinate system a range is expressed in.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RangeKind {
    ClockRegion,
    /// Sites of one type, keyed by the site name prefix (`SLICE`, `RAMB18`, …).
    Site(String),
}

/// An inclusive rectangle of sites or clock regions, as written in a pblock
/// constraint: `SLICE_X0Y0:SLICE_X9Y59`, `CLOCKREGION_X0Y0:CLOCKREGION_X1Y3`,
/// a single `RAMB36_X2Y5`, or the bare clock region form `X0Y0:X1Y3`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TileRange {
    pub kind: RangeKind,
    pub lo: (u32, u32),
    pub hi: (u32, u32),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RangeError {
    Malformed(String),
    PrefixMismatch(String),
    UnknownSite(String),
    UnknownClockRegion(String),
}

impl Display for RangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::Malformed(s) => write!(f, "malformed range `{s}`"),
            RangeError::PrefixMismatch(s) => write!(f, "range `{s}` mixes site types"),
            RangeError::UnknownSite(s) => write!(f, "unknown site `{s}`"),
            RangeError::UnknownClockRegion(s) => write!(f, "clock region `{s}` out of bounds"),
        }
    }
}

impl std::error::Error for RangeError {}

/// Splits `PREFIX_X<x>Y<y>` into its parts.  The prefix is empty for a bare
/// `X<x>Y<y>`.
pub fn split_xy(s: &str) -> Option<(&str, u32, u32)> {
    let xpos = s.rfind('X')?;
    let (x, y) = s[xpos + 1..].split_once('Y')?;
    if x.is_empty() || y.is_empty() {
        return None;
    }
    if !x.bytes().all(|c| c.is_ascii_digit()) || !y.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let prefix = &s[..xpos];
    let prefix = match prefix.strip_suffix('_') {
        Some(p) => p,
        None if prefix.is_empty() => prefix,
        None => return None,
    };
    Some((prefix, x.parse().ok()?, y.parse().ok()?))
}

impl TileRange {
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let (a, b) = s.split_once(':').unwrap_or((s, s));
        let (pa, xa, ya) = split_xy(a).ok_or_else(|| RangeError::Malformed(s.to_string()))?;
        let (pb, xb, yb) = split_xy(b).ok_or_else(|| RangeError::Malformed(s.to_string()))?;
        if pa != pb {
            return Err(RangeError::PrefixMismatch(s.to_string()));
        }
        let kind = match pa {
            "" | "CLOCKREGION" => RangeKind::ClockRegion,
            _ => RangeKind::Site(pa.to_string()),
        };
        Ok(TileRange {
            kind,
            lo: (xa.min(xb), ya.min(yb)),
            hi: (xa.max(xb), ya.max(yb)),
        })
    }

    pub fn prefix(&self) -> &str {
        match self.kind {
            RangeKind::ClockRegion => "CLOCKREGION",
            RangeKind::Site(ref p) => p,
        }
    }

    /// Block RAM, DSP and UltraRAM columns: ranges over these only pin the
    /// cascade sites and carry no routing geometry of their own.
    pub fn is_cascade_column(&self) -> bool {
        match self.kind {
            RangeKind::ClockRegion => false,
            RangeKind::Site(ref p) => {
                p.starts_with("RAMB") || p.starts_with("DSP") || p.starts_with("URAM")
            }
        }
    }

    pub fn corner_names(&self) -> (String, String) {
        let p = self.prefix();
        (
            format!("{p}_X{x}Y{y}", x = self.lo.0, y = self.lo.1),
            format!("{p}_X{x}Y{y}", x = self.hi.0, y = self.hi.1),
        )
    }
}

impl FromStr for TileRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, RangeError> {
        TileRange::parse(s)
    }
}

impl Display for TileRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.corner_names();
        write!(f, "{lo}:{hi}")
    }
}
