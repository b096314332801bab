//! Demand and urgency color encodings
//!
//! Both encoders are pure functions of their inputs. Demand uses a three-step
//! scale; urgency interpolates linearly in RGB across fixed keyframes.

use std::fmt;
use std::str::FromStr;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Blend toward the color's own gray level
    pub fn desaturate(self, amount: f64) -> Color {
        let gray = self.luminance().round().clamp(0.0, 255.0) as u8;
        self.lerp(Color::rgb(gray, gray, gray), amount)
    }

    /// Rec. 709 luma on the 0-255 scale
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid color '{}': expected #rrggbb", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("Invalid color '{}': expected #rrggbb", s))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

// Demand

/// Lowest demand, in liters, that falls in the mid tier
pub const DEMAND_MID_TIER_FROM: f64 = 10_000.0;
/// Highest demand, in liters, that still falls in the mid tier
pub const DEMAND_MID_TIER_TO: f64 = 20_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DemandTier {
    Low,
    Mid,
    High,
}

impl DemandTier {
    pub fn color(&self) -> Color {
        match self {
            DemandTier::Low => Color::rgb(0x16, 0xa3, 0x4a),
            DemandTier::Mid => Color::rgb(0xca, 0x8a, 0x04),
            DemandTier::High => Color::rgb(0xdc, 0x26, 0x26),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DemandTier::Low => "< 10,000 L",
            DemandTier::Mid => "10,000 - 20,000 L",
            DemandTier::High => "> 20,000 L",
        }
    }

    pub fn all() -> [DemandTier; 3] {
        [DemandTier::Low, DemandTier::Mid, DemandTier::High]
    }
}

/// Tier for a demand in liters. A NaN demand counts as zero.
pub fn demand_tier(demand: f64) -> DemandTier {
    if demand.is_nan() || demand < DEMAND_MID_TIER_FROM {
        DemandTier::Low
    } else if demand <= DEMAND_MID_TIER_TO {
        DemandTier::Mid
    } else {
        DemandTier::High
    }
}

pub fn demand_color(demand: f64) -> Color {
    demand_tier(demand).color()
}

// Urgency

/// Ordered `(urgency, color)` keyframes of the urgency ramp
pub const URGENCY_KEYFRAMES: [(f64, Color); 4] = [
    (0.0, Color::rgb(0xc6, 0xf6, 0xd5)),
    (0.3, Color::rgb(0x86, 0xef, 0xac)),
    (0.5, Color::rgb(0x4a, 0xde, 0x80)),
    (0.7, Color::rgb(0x16, 0xa3, 0x4a)),
];

/// How depleted the vehicle is on arrival, in `[0, 1]`
///
/// A non-positive capacity gives 0.
pub fn urgency(load_before_stop: f64, vehicle_capacity: f64) -> f64 {
    if !(vehicle_capacity > 0.0) {
        return 0.0;
    }
    let ratio = load_before_stop / vehicle_capacity;
    if ratio.is_nan() {
        return 0.0;
    }
    1.0 - ratio.clamp(0.0, 1.0)
}

/// Color for an urgency value
pub fn urgency_ramp(urgency: f64) -> Color {
    let (first_at, first) = URGENCY_KEYFRAMES[0];
    if urgency.is_nan() || urgency <= first_at {
        return first;
    }

    for pair in URGENCY_KEYFRAMES.windows(2) {
        let (from_at, from) = pair[0];
        let (to_at, to) = pair[1];
        if urgency <= to_at {
            return from.lerp(to, (urgency - from_at) / (to_at - from_at));
        }
    }

    URGENCY_KEYFRAMES[URGENCY_KEYFRAMES.len() - 1].1
}

pub fn urgency_color(load_before_stop: f64, vehicle_capacity: f64) -> Color {
    urgency_ramp(urgency(load_before_stop, vehicle_capacity))
}

pub fn urgency_label(urgency: f64) -> &'static str {
    if urgency < 0.3 {
        "Low urgency (mostly full)"
    } else if urgency < 0.5 {
        "Normal refill"
    } else if urgency < 0.7 {
        "Planned refill"
    } else {
        "Critical refill (nearly empty)"
    }
}

// Vehicles

/// Route colors, indexed by a route's position in the result
pub const ROUTE_PALETTE: [Color; 8] = [
    Color::rgb(0x1d, 0x4e, 0xd8),
    Color::rgb(0xc0, 0x26, 0xd3),
    Color::rgb(0xdb, 0x27, 0x77),
    Color::rgb(0xea, 0x58, 0x0c),
    Color::rgb(0xca, 0x8a, 0x04),
    Color::rgb(0x05, 0x96, 0x69),
    Color::rgb(0x7c, 0x3a, 0xed),
    Color::rgb(0xdc, 0x26, 0x26),
];

pub fn route_color(index: usize) -> Color {
    ROUTE_PALETTE[index % ROUTE_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_demand_tier_boundaries() {
        assert_eq!(demand_tier(0.0), DemandTier::Low);
        assert_eq!(demand_tier(9999.0), DemandTier::Low);
        assert_eq!(demand_tier(10000.0), DemandTier::Mid);
        assert_eq!(demand_tier(20000.0), DemandTier::Mid);
        assert_eq!(demand_tier(20001.0), DemandTier::High);
        assert_eq!(demand_tier(f64::NAN), DemandTier::Low);
        assert_eq!(demand_color(9999.0).to_hex(), "#16a34a");
        assert_eq!(demand_color(20001.0).to_hex(), "#dc2626");
    }

    #[test]
    fn test_full_and_empty_tank() {
        let cap = 5000.0;
        assert_eq!(urgency_color(cap, cap), URGENCY_KEYFRAMES[0].1);
        assert_eq!(urgency_color(0.0, cap), URGENCY_KEYFRAMES[3].1);
        assert_eq!(urgency_color(-10.0, cap), URGENCY_KEYFRAMES[3].1);
        assert_eq!(urgency_color(9000.0, cap), URGENCY_KEYFRAMES[0].1);
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(urgency(100.0, 0.0), 0.0);
        assert_eq!(urgency(100.0, -5.0), 0.0);
        assert_eq!(urgency(100.0, f64::NAN), 0.0);
        assert_eq!(urgency_color(100.0, 0.0), URGENCY_KEYFRAMES[0].1);
    }

    #[test]
    fn test_ramp_hits_keyframes() {
        for (at, color) in URGENCY_KEYFRAMES {
            assert_eq!(urgency_ramp(at), color, "keyframe at {}", at);
        }
        assert_eq!(urgency_ramp(0.95), URGENCY_KEYFRAMES[3].1);
    }

    #[test]
    fn test_ramp_midpoint() {
        // halfway between #c6f6d5 and #86efac
        assert_eq!(urgency_ramp(0.15), Color::rgb(0xa6, 0xf3, 0xc1));
    }

    #[test]
    fn test_urgency_labels() {
        assert_eq!(urgency_label(0.1), "Low urgency (mostly full)");
        assert_eq!(urgency_label(0.3), "Normal refill");
        assert_eq!(urgency_label(0.5), "Planned refill");
        assert_eq!(urgency_label(0.7), "Critical refill (nearly empty)");
    }

    #[test]
    fn test_route_palette_wraps() {
        assert_eq!(route_color(0).to_hex(), "#1d4ed8");
        assert_eq!(route_color(8), route_color(0));
        assert_eq!(route_color(15).to_hex(), "#dc2626");
    }

    #[test]
    fn test_hex_parse() {
        assert_eq!("#ca8a04".parse::<Color>().unwrap(), Color::rgb(0xca, 0x8a, 0x04));
        assert!("ca8a0".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    proptest! {
        #[test]
        fn ramp_darkens_monotonically(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(urgency_ramp(lo).luminance() >= urgency_ramp(hi).luminance());
        }

        #[test]
        fn ramp_is_continuous(u in 0.0f64..1.0) {
            let a = urgency_ramp(u);
            let b = urgency_ramp(u + 1e-6);
            prop_assert!((a.r as i16 - b.r as i16).abs() <= 1);
            prop_assert!((a.g as i16 - b.g as i16).abs() <= 1);
            prop_assert!((a.b as i16 - b.b as i16).abs() <= 1);
        }

        #[test]
        fn urgency_stays_in_unit_range(load in -1e6f64..1e6, cap in -10.0f64..1e5) {
            let u = urgency(load, cap);
            prop_assert!((0.0..=1.0).contains(&u));
        }
    }
}
