use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BandCalculus;
use crate::errors::{Error, Result};

/// Discrete regime signal selecting how wide the trading band is.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Gear {
    /// Tight band: small oscillations trade often.
    Slow,
    /// The default regime.
    #[default]
    Normal,
    /// Wide band: only large moves trade.
    Dynamic,
}

impl Gear {
    /// Parses a provider symbol into a gear.
    ///
    /// Symbols are single letters (`"S"`, `"N"`, `"D"`), matched
    /// case-insensitively with surrounding whitespace ignored. Anything else
    /// returns `None` so the caller can substitute the default gear.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::Slow),
            "N" => Some(Self::Normal),
            "D" => Some(Self::Dynamic),
            _ => None,
        }
    }

    /// Returns the provider symbol for the gear.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Slow => "S",
            Self::Normal => "N",
            Self::Dynamic => "D",
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Mapping from gear to a symmetric band width around the reference price.
///
/// A width of 0.05 puts the buy threshold 5% below the reference price and
/// the sell threshold 5% above it. The mapping is total: a gear with no
/// configured width resolves to the default gear's width, so the engine can
/// never be stalled by an unmapped signal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GearProfile {
    bands: BTreeMap<Gear, f64>,
    default_gear: Gear,
}

impl Default for GearProfile {
    fn default() -> Self {
        Self {
            bands: BTreeMap::from([(Gear::Slow, 0.03), (Gear::Normal, 0.05), (Gear::Dynamic, 0.10)]),
            default_gear: Gear::Normal,
        }
    }
}

impl GearProfile {
    /// Overrides the band width for one gear.
    ///
    /// ### Arguments
    /// * `gear` - The gear to configure.
    /// * `width` - The symmetric band width as a fraction (e.g., 0.05 for 5%).
    pub fn with_band(mut self, gear: Gear, width: f64) -> Self {
        self.bands.insert(gear, width);
        self
    }

    /// Sets the gear unrecognized or unmapped signals fall back to.
    pub fn with_default_gear(mut self, gear: Gear) -> Self {
        self.default_gear = gear;
        self
    }

    /// Returns the fallback gear.
    pub fn default_gear(&self) -> Gear {
        self.default_gear
    }

    /// Returns the band width for a gear, falling back to the default gear.
    pub fn band(&self, gear: Gear) -> f64 {
        match self.bands.get(&gear).or_else(|| self.bands.get(&self.default_gear)) {
            Some(width) => *width,
            // both the gear and the fallback unmapped; Normal's stock width
            None => 0.05,
        }
    }

    /// Returns the `(buy, sell)` thresholds for a gear around a reference price.
    pub fn thresholds(&self, gear: Gear, reference_price: f64) -> (f64, f64) {
        let width = self.band(gear);
        (reference_price.subfrac(width), reference_price.addfrac(width))
    }

    /// Validates every configured band width.
    pub(crate) fn validate(&self) -> Result<()> {
        for width in self.bands.values() {
            if !width.is_finite() || *width <= 0.0 || *width >= 1.0 {
                return Err(Error::BandWidth(*width));
            }
        }
        Ok(())
    }
}
