//! Categorical levels derived from raw readings.

use std::fmt;

/// Upper edges (exclusive) of wind levels 0..=12, in m/s.
///
/// Level 0 is 0.0-0.2, level 1 is 0.3-1.5, ..., level 12 is 32.7-36.9.
const WIND_BANDS: [f64; 13] = [
    0.3, 1.6, 3.4, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7, 37.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindLevel {
    Scale(u8),
    /// Faster than the top band.
    AboveScale,
}

impl WindLevel {
    /// Classify a non-negative speed in m/s. Negative or NaN input counts as calm.
    pub fn from_speed(speed: f64) -> Self {
        if speed.is_nan() || speed < 0.0 {
            return Self::Scale(0);
        }

        WIND_BANDS
            .iter()
            .position(|&upper| speed < upper)
            .map_or(Self::AboveScale, |level| Self::Scale(level as u8))
    }
}

impl fmt::Display for WindLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale(n) => write!(f, "level {n}"),
            Self::AboveScale => f.write_str("level 12+"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityLevel {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityLevel {
    pub fn from_fraction(humidity: f64) -> Self {
        if humidity < 0.3 {
            Self::Dry
        } else if humidity < 0.7 {
            Self::Comfortable
        } else {
            Self::Humid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Comfortable => "comfortable",
            Self::Humid => "humid",
        }
    }
}

impl fmt::Display for HumidityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(speed: f64) -> String {
        WindLevel::from_speed(speed).to_string()
    }

    #[test]
    fn wind_band_edges() {
        assert_eq!(level(0.0), "level 0");
        assert_eq!(level(0.2), "level 0");
        assert_eq!(level(0.3), "level 1");
        assert_eq!(level(1.5), "level 1");
        assert_eq!(level(1.6), "level 2");
        assert_eq!(level(3.3), "level 2");
        assert_eq!(level(3.4), "level 3");
        assert_eq!(level(5.4), "level 3");
        assert_eq!(level(5.5), "level 4");
        assert_eq!(level(7.9), "level 4");
        assert_eq!(level(8.0), "level 5");
        assert_eq!(level(10.7), "level 5");
        assert_eq!(level(10.8), "level 6");
        assert_eq!(level(13.8), "level 6");
        assert_eq!(level(13.9), "level 7");
        assert_eq!(level(17.1), "level 7");
        assert_eq!(level(17.2), "level 8");
        assert_eq!(level(20.7), "level 8");
        assert_eq!(level(20.8), "level 9");
        assert_eq!(level(24.4), "level 9");
        assert_eq!(level(24.5), "level 10");
        assert_eq!(level(28.4), "level 10");
        assert_eq!(level(28.5), "level 11");
        assert_eq!(level(32.6), "level 11");
        assert_eq!(level(32.7), "level 12");
        assert_eq!(level(36.9), "level 12");
        assert_eq!(level(37.0), "level 12+");
        assert_eq!(level(60.0), "level 12+");
    }

    #[test]
    fn wind_between_listed_edges_has_no_gap() {
        assert_eq!(WindLevel::from_speed(1.55), WindLevel::Scale(1));
        assert_eq!(WindLevel::from_speed(0.25), WindLevel::Scale(0));
    }

    #[test]
    fn invalid_wind_speed_is_calm() {
        assert_eq!(WindLevel::from_speed(-1.0), WindLevel::Scale(0));
        assert_eq!(WindLevel::from_speed(f64::NAN), WindLevel::Scale(0));
    }

    #[test]
    fn humidity_boundaries() {
        assert_eq!(HumidityLevel::from_fraction(0.29).as_str(), "dry");
        assert_eq!(HumidityLevel::from_fraction(0.3).as_str(), "comfortable");
        assert_eq!(HumidityLevel::from_fraction(0.69).as_str(), "comfortable");
        assert_eq!(HumidityLevel::from_fraction(0.7).as_str(), "humid");
    }
}
