//! Treatment bubble glyphs
//!
//! A bubble is two half-discs: carbs on top, insulin (converted to carb
//! equivalents via the carb ratio) on the bottom. The smaller amount is a solid
//! core shared by both halves; the larger amount adds a lighter ring on its own
//! side. An outer transparent ring carries the text label.

use std::f32::consts::{FRAC_PI_2, PI};

use super::store::Treatment;

/// Drawn radius per unit of bubble radius
pub const ARC_PIXEL_FACTOR: f32 = 5.0;
/// Label ring thickness before tier scaling
const LABEL_RING: f32 = 8.0;

/// Size divisor picked from chart width; narrower charts get smaller bubbles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTier {
    Narrow,
    Medium,
    Wide,
}

impl BubbleTier {
    pub fn for_width(chart_width: f32) -> Self {
        if chart_width < 400.0 {
            BubbleTier::Narrow
        } else if chart_width < 600.0 {
            BubbleTier::Medium
        } else {
            BubbleTier::Wide
        }
    }

    pub fn divisor(self) -> f32 {
        match self {
            BubbleTier::Narrow => 4.0,
            BubbleTier::Medium => 3.0,
            BubbleTier::Wide => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcFill {
    CarbsCore,
    CarbsRing,
    InsulinCore,
    InsulinRing,
    Transparent,
}

impl ArcFill {
    /// RGBA, straight alpha
    pub fn rgba(self) -> [u8; 4] {
        match self {
            ArcFill::CarbsCore => [0x9c, 0x43, 0x33, 0xff],
            ArcFill::CarbsRing => [0xd4, 0x89, 0x7b, 0xff],
            ArcFill::InsulinCore => [0x3d, 0x53, 0xb7, 0xff],
            ArcFill::InsulinRing => [0x5d, 0x72, 0xc9, 0xff],
            ArcFill::Transparent => [0, 0, 0, 0],
        }
    }
}

/// Annular sector; angles in radians, 0 at twelve o'clock, clockwise
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    pub fill: ArcFill,
    pub start_angle: f32,
    pub end_angle: f32,
    /// Pixels from the anchor
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub label: Option<String>,
}

impl ArcSegment {
    /// Midpoint of the sector relative to the anchor, y down
    pub fn centroid(&self) -> (f32, f32) {
        let r = (self.inner_radius + self.outer_radius) / 2.0;
        let a = (self.start_angle + self.end_angle) / 2.0;
        (r * a.sin(), -r * a.cos())
    }
}

/// Bubble radii before the pixel factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleRadii {
    pub r1: f32,
    pub r2: f32,
    pub r3: f32,
}

impl BubbleRadii {
    pub fn new(treatment: &Treatment, tier: BubbleTier) -> Self {
        let (lo, hi) = magnitudes(treatment);
        let d = tier.divisor();
        let r1 = lo.sqrt() as f32 / d;
        let r2 = hi.sqrt() as f32 / d;
        Self { r1, r2, r3: r2 + LABEL_RING / d }
    }
}

fn magnitudes(t: &Treatment) -> (f64, f64) {
    let carbs = t.carbs.max(0.0);
    let insulin_carbs = (t.insulin * t.carb_ratio).max(0.0);
    (carbs.min(insulin_carbs), carbs.max(insulin_carbs))
}

/// Six arcs: carbs core/ring/label then insulin core/ring/label
pub fn bubble_arcs(treatment: &Treatment, tier: BubbleTier) -> Vec<ArcSegment> {
    let BubbleRadii { r1, r2, r3 } = BubbleRadii::new(treatment, tier);
    let insulin_carbs = treatment.insulin * treatment.carb_ratio;

    let carbs_ring = if treatment.carbs < insulin_carbs { ArcFill::Transparent } else { ArcFill::CarbsRing };
    let insulin_ring =
        if treatment.carbs > insulin_carbs { ArcFill::Transparent } else { ArcFill::InsulinRing };

    let carbs_label = (treatment.carbs > 0.0).then(|| format!("{} g", treatment.carbs.round() as i64));
    let insulin_label = (treatment.insulin > 0.0).then(|| format!("{:.1} U", treatment.insulin));

    let top = (-FRAC_PI_2, FRAC_PI_2);
    let bottom = (FRAC_PI_2, PI + FRAC_PI_2);
    let arc = |(start, end): (f32, f32), fill, inner: f32, outer: f32, label| ArcSegment {
        fill,
        start_angle: start,
        end_angle: end,
        inner_radius: inner * ARC_PIXEL_FACTOR,
        outer_radius: outer * ARC_PIXEL_FACTOR,
        label,
    };

    vec![
        arc(top, ArcFill::CarbsCore, 0.0, r1, None),
        arc(top, carbs_ring, r1, r2, None),
        arc(top, ArcFill::Transparent, r2, r3, carbs_label),
        arc(bottom, ArcFill::InsulinCore, 0.0, r1, None),
        arc(bottom, insulin_ring, r1, r2, None),
        arc(bottom, ArcFill::Transparent, r2, r3, insulin_label),
    ]
}

/// Label font size for a tier
pub fn label_font_size(tier: BubbleTier) -> f32 {
    30.0 / tier.divisor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn treatment(carbs: f64, insulin: f64, carb_ratio: f64) -> Treatment {
        Treatment { timestamp: 0, display_value: 120.0, carbs, insulin, carb_ratio }
    }

    #[test]
    fn test_tiers_by_width() {
        assert_eq!(BubbleTier::for_width(399.0), BubbleTier::Narrow);
        assert_eq!(BubbleTier::for_width(400.0), BubbleTier::Medium);
        assert_eq!(BubbleTier::for_width(599.0), BubbleTier::Medium);
        assert_eq!(BubbleTier::for_width(600.0), BubbleTier::Wide);
    }

    #[test]
    fn test_insulin_only_bubble() {
        let t = treatment(0.0, 2.0, 10.0);
        let tier = BubbleTier::Wide;
        let radii = BubbleRadii::new(&t, tier);
        assert_eq!(radii.r1, 0.0);
        assert!((radii.r2 * tier.divisor() - 20f32.sqrt()).abs() < 1e-5);

        let arcs = bubble_arcs(&t, tier);
        assert_eq!(arcs.len(), 6);
        assert_eq!(arcs[1].fill, ArcFill::Transparent);
        assert_eq!(arcs[4].fill, ArcFill::InsulinRing);
        assert_eq!(arcs[2].label, None);
        assert_eq!(arcs[5].label.as_deref(), Some("2.0 U"));
    }

    #[test]
    fn test_carbs_heavy_bubble_hides_insulin_ring() {
        let t = treatment(45.0, 1.0, 10.0);
        let arcs = bubble_arcs(&t, BubbleTier::Medium);
        assert_eq!(arcs[1].fill, ArcFill::CarbsRing);
        assert_eq!(arcs[4].fill, ArcFill::Transparent);
        assert_eq!(arcs[2].label.as_deref(), Some("45 g"));
        assert_eq!(arcs[5].label.as_deref(), Some("1.0 U"));
    }

    #[test]
    fn test_arc_radii_are_pixel_scaled() {
        let t = treatment(16.0, 0.0, 10.0);
        let arcs = bubble_arcs(&t, BubbleTier::Wide);
        // sqrt(16) / 2 = 2, times 5
        assert!((arcs[1].outer_radius - 10.0).abs() < 1e-5);
        assert!((arcs[2].outer_radius - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_label_centroids_above_and_below() {
        let arcs = bubble_arcs(&treatment(20.0, 3.0, 10.0), BubbleTier::Wide);
        let (_, carbs_y) = arcs[2].centroid();
        let (_, insulin_y) = arcs[5].centroid();
        assert!(carbs_y < 0.0);
        assert!(insulin_y > 0.0);
    }
}
