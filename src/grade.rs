use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GradebookError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Letter grade derived from a numeric score and stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SS")]
    Fail,
    #[serde(rename = "AP")]
    Pass,
    #[serde(rename = "NT")]
    Notable,
    #[serde(rename = "SB")]
    Outstanding,
}

impl Category {
    pub const PASSING: [Category; 3] = [Category::Pass, Category::Notable, Category::Outstanding];

    pub fn as_code(self) -> &'static str {
        match self {
            Category::Fail => "SS",
            Category::Pass => "AP",
            Category::Notable => "NT",
            Category::Outstanding => "SB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Fail => "fail",
            Category::Pass => "pass",
            Category::Notable => "notable",
            Category::Outstanding => "outstanding",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SS" => Ok(Category::Fail),
            "AP" => Ok(Category::Pass),
            "NT" => Ok(Category::Notable),
            "SB" => Ok(Category::Outstanding),
            other => Err(format!("unknown category code: {other}")),
        }
    }
}

/// Half-open intervals with inclusive lower bounds: 5, 7 and 9 land in the
/// upper bucket. Range checking is the caller's job.
pub fn classify(score: f64) -> Category {
    if score < 5.0 {
        Category::Fail
    } else if score < 7.0 {
        Category::Pass
    } else if score < 9.0 {
        Category::Notable
    } else {
        Category::Outstanding
    }
}

pub fn check_score(score: f64) -> Result<f64, GradebookError> {
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(GradebookError::InvalidScore(
            "score must be between 0 and 10".into(),
        ));
    }
    Ok(score)
}

/// Parses a score typed by the user and checks it against [0, 10].
pub fn parse_score(text: &str) -> Result<f64, GradebookError> {
    let score: f64 = text
        .trim()
        .parse()
        .map_err(|_| GradebookError::InvalidScore("score must be a number".into()))?;
    check_score(score)
}

/// `7` prints as `7.0`, `6.25` stays `6.25`.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        score.to_string()
    }
}
