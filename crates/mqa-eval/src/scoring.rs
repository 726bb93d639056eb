use serde::{Deserialize, Serialize};

use crate::errors::{IssueTarget, ValidationIssue, ValidationReport};

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `count / population`, or 0 for an empty population.
///
/// A sentinel count keeps its sign, so an unevaluated indicator reads as a
/// negative share in the report.
pub fn coverage(count: i64, population: u64) -> f64 {
    if population == 0 {
        0.0
    } else {
        count as f64 / population as f64
    }
}

/// Weighted points for a count; only positive counts earn points.
pub fn points(count: i64, population: u64, weight: u32) -> f64 {
    if count > 0 {
        round2(coverage(count, population) * f64::from(weight))
    } else {
        0.0
    }
}

/// Running total of indicator points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreAccumulator {
    total: f64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add non-negative points; negative input is ignored.
    pub fn add(&mut self, points: f64) {
        if points > 0.0 {
            self.total += points;
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// A rating label and the minimum score that earns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub label: String,
    pub minimum: f64,
}

/// Rating bands ordered from the highest threshold down, plus the maximum score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub bands: Vec<RatingBand>,
    pub weight_total: u32,
}

impl Default for RatingScale {
    fn default() -> Self {
        let band = |label: &str, minimum: f64| RatingBand {
            label: label.to_string(),
            minimum,
        };
        Self {
            bands: vec![
                band("Excellent", 351.0),
                band("Good", 221.0),
                band("Sufficient", 121.0),
                band("Bad", 0.0),
            ],
            weight_total: 405,
        }
    }
}

impl RatingScale {
    /// Label of the first band whose minimum `score` reaches; the lowest band otherwise.
    ///
    /// The score is compared at two decimals, the precision the report shows.
    pub fn rating_for(&self, score: f64) -> &str {
        let score = round2(score);
        self.bands
            .iter()
            .find(|band| score >= band.minimum)
            .or_else(|| self.bands.last())
            .map(|band| band.label.as_str())
            .unwrap_or("")
    }

    /// Score as a fraction of the maximum, rounded to two decimals.
    pub fn ratio(&self, score: f64) -> f64 {
        if self.weight_total == 0 {
            0.0
        } else {
            round2(score / f64::from(self.weight_total))
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.bands.is_empty() {
            report.push(ValidationIssue::error(
                "empty_rating_scale",
                IssueTarget::rating("bands"),
                "rating scale has no bands",
            ));
        }
        for (index, pair) in self.bands.windows(2).enumerate() {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.minimum >= upper.minimum {
                report.push(ValidationIssue::error(
                    "rating_not_decreasing",
                    IssueTarget::rating(format!("bands[{}]", index + 1)),
                    format!(
                        "'{}' ({}) must sit below '{}' ({}); list bands from the highest threshold down",
                        lower.label, lower.minimum, upper.label, upper.minimum
                    ),
                ));
            }
        }
        if self.bands.iter().any(|band| band.label.trim().is_empty()) {
            report.push(ValidationIssue::error(
                "empty_rating_label",
                IssueTarget::rating("bands"),
                "rating band labels must not be empty",
            ));
        }
        if self.weight_total == 0 {
            report.push(ValidationIssue::error(
                "invalid_weight_total",
                IssueTarget::rating("weight_total"),
                "weight total must be positive",
            ));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_is_zero_for_empty_population() {
        assert_eq!(coverage(3, 0), 0.0);
        assert_eq!(coverage(-1, 0), 0.0);
        assert_eq!(coverage(1, 4), 0.25);
    }

    #[test]
    fn sentinel_counts_give_negative_coverage_and_no_points() {
        assert_eq!(round2(coverage(-1, 3)), -0.33);
        assert_eq!(round2(coverage(-1, 5)), -0.2);
        assert_eq!(points(-1, 3, 30), 0.0);
    }

    #[test]
    fn points_need_a_positive_count() {
        assert_eq!(points(0, 10, 30), 0.0);
        assert_eq!(points(-1, 10, 30), 0.0);
        assert_eq!(points(2, 3, 50), 33.33);
        assert_eq!(points(5, 5, 30), 30.0);
        assert_eq!(points(1, 3, 10), 3.33);
    }

    #[test]
    fn accumulator_never_decreases() {
        let mut score = ScoreAccumulator::new();
        let mut previous = score.total();
        for value in [30.0, 0.0, -5.0, 12.5] {
            score.add(value);
            assert!(score.total() >= previous);
            previous = score.total();
        }
        assert_eq!(score.total(), 42.5);
    }

    #[test]
    fn rating_thresholds() {
        let scale = RatingScale::default();
        assert_eq!(scale.rating_for(351.0), "Excellent");
        assert_eq!(scale.rating_for(350.99), "Good");
        assert_eq!(scale.rating_for(221.0), "Good");
        assert_eq!(scale.rating_for(120.99), "Bad");
        assert_eq!(scale.rating_for(121.0), "Sufficient");
        assert_eq!(scale.rating_for(0.0), "Bad");
        assert_eq!(scale.ratio(202.5), 0.5);
    }

    #[test]
    fn score_below_every_band_maps_to_lowest() {
        let scale = RatingScale {
            bands: vec![
                RatingBand {
                    label: "High".into(),
                    minimum: 10.0,
                },
                RatingBand {
                    label: "Low".into(),
                    minimum: 5.0,
                },
            ],
            weight_total: 20,
        };
        assert_eq!(scale.rating_for(1.0), "Low");
    }

    #[test]
    fn validation_requires_strictly_decreasing_bands() {
        assert!(RatingScale::default().validate().is_ok());
        let mut scale = RatingScale::default();
        scale.bands[2].minimum = 221.0;
        let report = scale.validate();
        assert_eq!(report.error_codes(), ["rating_not_decreasing"]);
    }
}
