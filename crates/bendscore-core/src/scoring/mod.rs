//! Scoring types and the adapter-boundary entry point.
//!
//! A score is a derived view: it is recomputed from a record on every read and
//! never stored. [`engine::score`] is total over [`ScoringInput`];
//! [`score_record`] additionally absorbs any panic so that a broken record
//! degrades to "no score" instead of failing the caller.

pub mod coerce;
pub mod engine;
pub mod rules;

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{EnumIter, IntoStaticStr};

use crate::adapter;

/// The global maximum a product can score.
pub const MAX_TOTAL: u32 = 100;

// ─── Categories ──────────────────────────────────────────────────────────────

/// The fixed scoring categories, in breakdown order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
  ValueForMoney,
  EaseOfUse,
  MaxDiameter,
  BendAngle,
  WallThickness,
  DieSelection,
  YearsInBusiness,
  UpgradePath,
  Mandrel,
  SBend,
  UsaManufacturing,
  OriginTransparency,
  SingleSource,
  Warranty,
}

impl Category {
  /// Point budget for the category. The budgets sum to [`MAX_TOTAL`].
  pub fn max_points(self) -> u32 {
    match self {
      Self::ValueForMoney => 20,
      Self::EaseOfUse => 12,
      Self::MaxDiameter => 10,
      Self::BendAngle => 10,
      Self::WallThickness => 9,
      Self::DieSelection => 8,
      Self::YearsInBusiness => 3,
      Self::UpgradePath => 8,
      Self::Mandrel => 4,
      Self::SBend => 2,
      Self::UsaManufacturing => 5,
      Self::OriginTransparency => 4,
      Self::SingleSource => 2,
      Self::Warranty => 3,
    }
  }

  /// Human-readable name used in reasoning strings and on pages.
  pub fn label(self) -> &'static str {
    match self {
      Self::ValueForMoney => "Value for money",
      Self::EaseOfUse => "Ease of use & setup",
      Self::MaxDiameter => "Max diameter",
      Self::BendAngle => "Bend angle",
      Self::WallThickness => "Wall thickness",
      Self::DieSelection => "Die selection",
      Self::YearsInBusiness => "Years in business",
      Self::UpgradePath => "Upgrade path",
      Self::Mandrel => "Mandrel compatibility",
      Self::SBend => "True S-bend",
      Self::UsaManufacturing => "USA manufacturing",
      Self::OriginTransparency => "Origin transparency",
      Self::SingleSource => "Single-source system",
      Self::Warranty => "Warranty",
    }
  }

  /// The snake_case identifier, as serialised.
  pub fn key(self) -> &'static str { self.into() }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// A numeric field that was present in the record. Unparseable values keep
/// their raw text so the reasoning can name them.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
  Parsed(f64),
  Invalid(String),
}

/// The engine's strict input shape. Every field is optional; absence only
/// removes points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringInput {
  pub entry_price:             Option<Numeric>,
  pub ease_of_use:             Option<String>,
  /// Free-form capacity string, e.g. `2.5" OD`.
  pub max_capacity:            Option<String>,
  /// Degrees.
  pub bend_angle:              Option<Numeric>,
  /// Inches.
  pub wall_thickness_capacity: Option<Numeric>,
  pub materials:               Vec<String>,
  pub die_shapes:              Vec<String>,
  pub years_in_business:       Option<Numeric>,
  pub upgrades:                Vec<String>,
  pub mandrel:                 Option<String>,
  pub s_bend_capability:       Option<bool>,
  pub usa_manufacturing:       Option<String>,
  pub origin_transparency:     Option<String>,
  pub single_source_system:    Option<bool>,
  pub warranty:                Option<String>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Points awarded for one category, with the justification shown to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdownItem {
  pub category:   Category,
  pub points:     u32,
  pub max_points: u32,
  pub reasoning:  String,
}

impl ScoreBreakdownItem {
  /// Build an item, capping `points` at the category budget.
  pub fn new(category: Category, points: u32, reasoning: impl Into<String>) -> Self {
    let max_points = category.max_points();
    Self {
      category,
      points: points.min(max_points),
      max_points,
      reasoning: reasoning.into(),
    }
  }

  pub fn zero(category: Category, reasoning: impl Into<String>) -> Self {
    Self::new(category, 0, reasoning)
  }
}

/// The engine's result for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
  /// `min(raw_total, MAX_TOTAL)`.
  pub total:     u32,
  /// Sum of every breakdown item's points.
  pub raw_total: u32,
  /// Set when `raw_total` exceeded [`MAX_TOTAL`] and `total` was capped.
  pub clamped:   bool,
  pub breakdown: Vec<ScoreBreakdownItem>,
}

/// Where a [`ProductScore`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
  Computed,
  None,
}

/// The score as exposed to pages and the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductScore {
  pub total:     Option<u32>,
  pub source:    ScoreSource,
  pub raw_total: Option<u32>,
  pub clamped:   bool,
  pub breakdown: Vec<ScoreBreakdownItem>,
}

impl ProductScore {
  /// "No score available": what readers see when scoring could not run.
  pub fn none() -> Self {
    Self {
      total:     None,
      source:    ScoreSource::None,
      raw_total: None,
      clamped:   false,
      breakdown: Vec::new(),
    }
  }

  pub fn is_available(&self) -> bool { self.source == ScoreSource::Computed }
}

impl From<ScoreReport> for ProductScore {
  fn from(report: ScoreReport) -> Self {
    Self {
      total:     Some(report.total),
      source:    ScoreSource::Computed,
      raw_total: Some(report.raw_total),
      clamped:   report.clamped,
      breakdown: report.breakdown,
    }
  }
}

// ─── Boundary ────────────────────────────────────────────────────────────────

/// Adapt a loosely-typed record and score it.
///
/// Never panics and never fails: anything unexpected inside adaptation or
/// scoring yields [`ProductScore::none`].
pub fn score_record(record: &Map<String, Value>) -> ProductScore {
  score_with(record, |r| engine::score(&adapter::adapt(r)))
}

fn score_with<F>(record: &Map<String, Value>, f: F) -> ProductScore
where
  F: FnOnce(&Map<String, Value>) -> ScoreReport,
{
  match panic::catch_unwind(AssertUnwindSafe(|| f(record))) {
    Ok(report) => report.into(),
    Err(payload) => {
      let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
      tracing::error!(%message, "scoring panicked; reporting no score");
      ProductScore::none()
    }
  }
}
