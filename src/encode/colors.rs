//! Color rules: risk category and confidence score to fill color.
//!
//! Both are pure lookups. Risk colors are keyed by the [`RiskLabel`] variant,
//! so adding a category is one new arm the compiler will ask for.
//! Confidence colors come from an ordered band table.

use crate::model::RiskLabel;
use crate::style::{palette, Color};

pub fn risk_color(label: RiskLabel) -> Color {
    match label {
        RiskLabel::Safe => palette::SAFE,
        RiskLabel::AdjustDosage => palette::ADJUST,
        RiskLabel::Toxic => palette::TOXIC,
        RiskLabel::Ineffective => palette::INEFFECTIVE,
        RiskLabel::Unknown => palette::UNKNOWN,
    }
}

/// Inclusive lower bounds, most favorable first. First match wins.
const CONFIDENCE_BANDS: [(f64, Color); 4] = [
    (0.85, palette::SAFE),
    (0.65, palette::LIME),
    (0.50, palette::ADJUST),
    (0.35, palette::INEFFECTIVE),
];

/// Below every band.
const CONFIDENCE_FLOOR: Color = palette::TOXIC;

pub fn confidence_color(score: f64) -> Color {
    CONFIDENCE_BANDS
        .iter()
        .find(|(lower, _)| score >= *lower)
        .map(|(_, color)| *color)
        .unwrap_or(CONFIDENCE_FLOOR)
}

/// Badge background: `min(255, channel * 0.25 + 10)` of the risk color.
pub fn badge_fill(color: Color) -> Color {
    color.map_channels(|c| (c * 0.25 + 10.0).min(255.0))
}

/// Whole-number percentage shown next to a confidence bar.
pub fn confidence_percent(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_table() {
        assert_eq!(risk_color(RiskLabel::Safe), palette::SAFE);
        assert_eq!(risk_color(RiskLabel::AdjustDosage), palette::ADJUST);
        assert_eq!(risk_color(RiskLabel::Toxic), palette::TOXIC);
        assert_eq!(risk_color(RiskLabel::Ineffective), palette::INEFFECTIVE);
        assert_eq!(risk_color(RiskLabel::Unknown), palette::UNKNOWN);
    }

    #[test]
    fn unrecognised_label_is_unknown_color() {
        assert_eq!(risk_color(RiskLabel::parse("Lethal")), palette::UNKNOWN);
        assert_eq!(risk_color(RiskLabel::parse("")), palette::UNKNOWN);
        assert_eq!(risk_color(RiskLabel::parse("Adjust Dosage")), palette::ADJUST);
    }

    #[test]
    fn boundaries_select_higher_band() {
        assert_eq!(confidence_color(0.85), palette::SAFE);
        assert_eq!(confidence_color(0.65), palette::LIME);
        assert_eq!(confidence_color(0.50), palette::ADJUST);
        assert_eq!(confidence_color(0.35), palette::INEFFECTIVE);
    }

    #[test]
    fn just_below_boundaries() {
        assert_eq!(confidence_color(0.8499), palette::LIME);
        assert_eq!(confidence_color(0.6499), palette::ADJUST);
        assert_eq!(confidence_color(0.4999), palette::INEFFECTIVE);
        assert_eq!(confidence_color(0.3499), palette::TOXIC);
        assert_eq!(confidence_color(0.0), palette::TOXIC);
    }

    #[test]
    fn favorability_never_increases_as_score_drops() {
        let rank = |c: Color| {
            [palette::SAFE, palette::LIME, palette::ADJUST, palette::INEFFECTIVE, palette::TOXIC]
                .iter()
                .position(|x| *x == c)
                .unwrap()
        };
        let mut last = 0;
        for step in (0..=100).rev() {
            let r = rank(confidence_color(step as f64 / 100.0));
            assert!(r >= last, "band got more favorable at {step}%");
            last = r;
        }
    }

    #[test]
    fn badge_fill_darkens() {
        assert_eq!(badge_fill(palette::TOXIC), Color::rgb(70, 27, 27));
        assert_eq!(badge_fill(Color::rgb(255, 255, 255)), Color::rgb(74, 74, 74));
        assert_eq!(badge_fill(Color::BLACK), Color::rgb(10, 10, 10));
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(confidence_percent(0.92), 92);
        assert_eq!(confidence_percent(0.846), 85);
        assert_eq!(confidence_percent(1.4), 100);
    }
}
