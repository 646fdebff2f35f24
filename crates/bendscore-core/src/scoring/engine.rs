//! The scoring engine: every category rule applied to one input.

use strum::IntoEnumIterator;

use super::{Category, MAX_TOTAL, ScoreReport, ScoringInput, rules};

/// Score `input` against every category.
///
/// Pure and total: the breakdown always holds one item per [`Category`], in
/// declaration order, and the same input always yields the same report.
pub fn score(input: &ScoringInput) -> ScoreReport {
  let breakdown: Vec<_> = Category::iter()
    .map(|category| rules::evaluate(category, input))
    .collect();

  let raw_total: u32 = breakdown.iter().map(|item| item.points).sum();
  let clamped = raw_total > MAX_TOTAL;
  if clamped {
    tracing::warn!(raw_total, "raw score above maximum; clamping");
  }

  ScoreReport {
    total: raw_total.min(MAX_TOTAL),
    raw_total,
    clamped,
    breakdown,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scoring::{Numeric, ScoreBreakdownItem};

  fn item(report: &ScoreReport, category: Category) -> &ScoreBreakdownItem {
    report
      .breakdown
      .iter()
      .find(|i| i.category == category)
      .expect("every category is present")
  }

  fn full_input() -> ScoringInput {
    ScoringInput {
      entry_price:             Some(Numeric::Parsed(950.0)),
      ease_of_use:             Some("very easy".into()),
      max_capacity:            Some("3\" OD".into()),
      bend_angle:              Some(Numeric::Parsed(200.0)),
      wall_thickness_capacity: Some(Numeric::Parsed(0.25)),
      materials:               vec![
        "mild steel".into(),
        "chromoly".into(),
        "stainless".into(),
        "aluminum".into(),
        "titanium".into(),
        "copper".into(),
      ],
      die_shapes:              vec![
        "round tube".into(),
        "pipe".into(),
        "square".into(),
        "rectangular".into(),
        "emt".into(),
        "solid rod".into(),
      ],
      years_in_business:       Some(Numeric::Parsed(30.0)),
      upgrades:                vec![
        "hydraulic".into(),
        "electric pump".into(),
        "foot pedal".into(),
        "stand".into(),
        "angle gauge".into(),
        "auto stop".into(),
        "cart".into(),
        "rotation kit".into(),
      ],
      mandrel:                 Some("available".into()),
      s_bend_capability:       Some(true),
      usa_manufacturing:       Some("Made in USA".into()),
      origin_transparency:     Some("full".into()),
      single_source_system:    Some(true),
      warranty:                Some("lifetime".into()),
    }
  }

  #[test]
  fn empty_input_scores_zero_everywhere() {
    let report = score(&ScoringInput::default());
    assert_eq!(report.total, 0);
    assert_eq!(report.raw_total, 0);
    assert!(!report.clamped);
    assert_eq!(report.breakdown.len(), Category::iter().count());
    for item in &report.breakdown {
      assert_eq!(item.points, 0, "{:?}", item.category);
      assert!(
        item.reasoning.contains("not specified"),
        "{:?}: {}",
        item.category,
        item.reasoning
      );
    }
  }

  #[test]
  fn perfect_input_reaches_exactly_max() {
    let report = score(&full_input());
    assert_eq!(report.total, MAX_TOTAL);
    assert_eq!(report.raw_total, MAX_TOTAL);
    assert!(!report.clamped);
    for item in &report.breakdown {
      assert_eq!(item.points, item.max_points, "{:?}", item.category);
    }
  }

  #[test]
  fn total_is_sum_of_points_and_points_within_budget() {
    let mut partial = full_input();
    partial.entry_price = Some(Numeric::Parsed(2_400.0));
    partial.materials.truncate(2);
    partial.upgrades.truncate(3);
    partial.mandrel = Some("standard".into());

    let report = score(&partial);
    let sum: u32 = report.breakdown.iter().map(|i| i.points).sum();
    assert_eq!(report.total, sum);
    assert!(report.total <= MAX_TOTAL);
    for item in &report.breakdown {
      assert!(item.points <= item.max_points);
    }
  }

  #[test]
  fn scoring_is_idempotent() {
    let input = full_input();
    assert_eq!(score(&input), score(&input));
  }

  #[test]
  fn breakdown_follows_category_order() {
    let report = score(&ScoringInput::default());
    let order: Vec<_> = report.breakdown.iter().map(|i| i.category).collect();
    assert_eq!(order, Category::iter().collect::<Vec<_>>());
  }

  #[test]
  fn reference_bender_scores_expected_tiers() {
    let input = ScoringInput {
      max_capacity: Some("2.5\" OD".into()),
      bend_angle: Some(Numeric::Parsed(195.0)),
      wall_thickness_capacity: Some(Numeric::Parsed(0.156)),
      materials: vec!["mild steel".into(), "4130 chromoly".into()],
      mandrel: Some("Available".into()),
      s_bend_capability: Some(true),
      ..ScoringInput::default()
    };
    let report = score(&input);

    assert_eq!(item(&report, Category::MaxDiameter).points, 10);
    assert_eq!(item(&report, Category::BendAngle).points, 10);

    let wall = item(&report, Category::WallThickness);
    assert!(wall.reasoning.contains("(5/5)"), "{}", wall.reasoning);
    assert!(wall.points > 5, "materials sub-score must be nonzero");

    assert_eq!(item(&report, Category::Mandrel).points, 4);
    assert_eq!(item(&report, Category::SBend).points, 2);

    for category in [
      Category::ValueForMoney,
      Category::EaseOfUse,
      Category::DieSelection,
      Category::YearsInBusiness,
      Category::UpgradePath,
      Category::UsaManufacturing,
      Category::OriginTransparency,
      Category::SingleSource,
      Category::Warranty,
    ] {
      let i = item(&report, category);
      assert_eq!(i.points, 0, "{category:?}");
      assert!(i.reasoning.contains("not specified"), "{}", i.reasoning);
    }

    assert_eq!(report.total, 10 + 10 + 6 + 4 + 2);
  }

  #[test]
  fn invalid_numerics_do_not_fail_and_are_named() {
    let input = ScoringInput {
      bend_angle: Some(Numeric::Invalid("lots".into())),
      years_in_business: Some(Numeric::Invalid("since forever".into())),
      ..ScoringInput::default()
    };
    let report = score(&input);
    assert_eq!(report.total, 0);
    assert!(item(&report, Category::BendAngle).reasoning.contains("\"lots\""));
    assert!(
      item(&report, Category::YearsInBusiness)
        .reasoning
        .contains("\"since forever\"")
    );
  }
}
