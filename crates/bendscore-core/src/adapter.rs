//! Record adapter: loosely-typed catalog record → [`ScoringInput`].
//!
//! Records come from the base catalog with overlay and published fields merged
//! on top, so they carry optional keys, mixed string/number encodings, and
//! legacy aliases. The adapter looks each field up under every known alias,
//! coerces it through [`crate::scoring::coerce`], and never fails. Unknown keys
//! are ignored.
//!
//! Delimited strings are *not* split into lists here; that happens in the
//! overlay layer before merge.

use serde_json::{Map, Value};

use crate::scoring::{
  Numeric, ScoringInput,
  coerce::{
    MM_PER_INCH, is_millimetres, leading_number, to_bool_flag, to_numeric,
    to_text,
  },
};

// ─── Field aliases ───────────────────────────────────────────────────────────

const FRAME_PRICE: &[&str] = &["framePriceRange", "frame_price_range"];
const DIE_PRICE: &[&str] = &["diePriceRange", "die_price_range"];
const HYDRAULICS_PRICE: &[&str] =
  &["hydraulicsPriceRange", "hydraulics_price_range"];
const STAND_PRICE: &[&str] = &["standPriceRange", "stand_price_range"];
const LEGACY_PRICE: &[&str] = &["price", "priceRange", "price_range"];

const EASE_OF_USE: &[&str] = &["easeOfUse", "ease_of_use", "easeOfSetup"];
const MAX_CAPACITY: &[&str] =
  &["maxCapacity", "max_capacity", "maxDiameter", "max_diameter"];
const BEND_ANGLE: &[&str] = &["bendAngle", "bend_angle", "maxBendAngle"];
const WALL_THICKNESS: &[&str] = &[
  "wallThicknessCapacity",
  "wall_thickness_capacity",
  "wallThickness",
  "maxWallThickness",
];
const MATERIALS: &[&str] = &["materials"];
const DIE_SHAPES: &[&str] = &["dieShapes", "die_shapes", "dies"];
const YEARS_IN_BUSINESS: &[&str] = &["yearsInBusiness", "years_in_business"];
const UPGRADES: &[&str] = &["upgrades", "upgradePath", "upgrade_path"];
const MANDREL: &[&str] = &["mandrel"];
const S_BEND: &[&str] = &["sBendCapability", "s_bend_capability", "sBend"];
const USA_MANUFACTURING: &[&str] =
  &["usaManufacturing", "usa_manufacturing", "madeInUsa"];
const ORIGIN_TRANSPARENCY: &[&str] =
  &["originTransparency", "origin_transparency"];
const SINGLE_SOURCE: &[&str] =
  &["singleSourceSystem", "single_source_system", "singleSource"];
const WARRANTY: &[&str] = &["warranty"];

/// Individual upgrade flags some records carry instead of an `upgrades` list.
/// Each truthy flag contributes the named upgrade.
const UPGRADE_FLAGS: &[(&str, &str)] = &[
  ("hydraulicUpgrade", "hydraulic"),
  ("electricPump", "electric pump"),
  ("footPedal", "foot pedal"),
  ("standUpgrade", "stand"),
  ("angleGauge", "angle gauge"),
  ("autoStop", "auto stop"),
  ("cart", "cart"),
  ("rotationKit", "rotation kit"),
];

// ─── Adapter ─────────────────────────────────────────────────────────────────

/// Map `record` into the engine's input shape.
pub fn adapt(record: &Map<String, Value>) -> ScoringInput {
  let text = |keys: &[&str]| lookup(record, keys).and_then(to_text);
  let numeric = |keys: &[&str]| lookup(record, keys).and_then(to_numeric);
  let flag = |keys: &[&str]| lookup(record, keys).map(to_bool_flag);
  let list = |keys: &[&str]| lookup(record, keys).map(string_list).unwrap_or_default();

  let mut upgrades = list(UPGRADES);
  for (key, name) in UPGRADE_FLAGS {
    if record.get(*key).is_some_and(to_bool_flag) {
      upgrades.push((*name).to_owned());
    }
  }

  ScoringInput {
    entry_price: entry_price(record),
    ease_of_use: text(EASE_OF_USE),
    max_capacity: text(MAX_CAPACITY),
    bend_angle: numeric(BEND_ANGLE),
    wall_thickness_capacity: lookup(record, WALL_THICKNESS).and_then(inches),
    materials: list(MATERIALS),
    die_shapes: list(DIE_SHAPES),
    years_in_business: numeric(YEARS_IN_BUSINESS),
    upgrades,
    mandrel: text(MANDREL),
    s_bend_capability: flag(S_BEND),
    usa_manufacturing: text(USA_MANUFACTURING),
    origin_transparency: text(ORIGIN_TRANSPARENCY),
    single_source_system: flag(SINGLE_SOURCE),
    warranty: text(WARRANTY),
  }
}

/// The first alias present with a non-null value.
fn lookup<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
  keys
    .iter()
    .filter_map(|k| record.get(*k))
    .find(|v| !v.is_null())
}

/// Like [`to_numeric`], with lengths written in millimetres converted to
/// inches.
fn inches(value: &Value) -> Option<Numeric> {
  match (to_numeric(value)?, value) {
    (Numeric::Parsed(mm), Value::String(raw)) if is_millimetres(raw) => {
      Some(Numeric::Parsed(mm / MM_PER_INCH))
    }
    (numeric, _) => Some(numeric),
  }
}

/// Pass through JSON arrays of strings; anything else is not a list here.
fn string_list(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => items
      .iter()
      .filter_map(Value::as_str)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
      .collect(),
    _ => Vec::new(),
  }
}

// ─── Entry price ─────────────────────────────────────────────────────────────

/// A price bracket as read from a record. Either end may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
  pub min: Option<f64>,
  pub max: Option<f64>,
}

impl PriceRange {
  fn single(v: f64) -> Self { Self { min: Some(v), max: Some(v) } }

  pub fn is_empty(&self) -> bool { self.min.is_none() && self.max.is_none() }
}

/// Read a price bracket from a number, a `{min, max}` object, a `[min, max]`
/// array, or a string such as `"$1,200 - $1,500"` or `"1200 to 1500"`.
pub fn price_range(value: &Value) -> PriceRange {
  match value {
    Value::Number(_) => parsed(value).map(PriceRange::single).unwrap_or_default(),
    Value::String(s) => {
      let normalised = s.to_lowercase().replace(" to ", "-");
      let mut parts = normalised.split('-').map(leading_number);
      let min = parts.next().flatten();
      let max = parts.next().flatten();
      match (min, max) {
        (Some(lo), None) => PriceRange::single(lo),
        (min, max) => PriceRange { min, max },
      }
    }
    Value::Object(obj) => {
      let pick = |keys: &[&str]| lookup(obj, keys).and_then(parsed);
      PriceRange {
        min: pick(&["min", "low", "from"]),
        max: pick(&["max", "high", "to"]),
      }
    }
    Value::Array(items) => PriceRange {
      min: items.first().and_then(parsed),
      max: items.get(1).and_then(parsed),
    },
    Value::Bool(_) | Value::Null => PriceRange::default(),
  }
}

/// Derive the entry price.
///
/// 1. Sum of the component minimums, when any component has one.
/// 2. Otherwise the sum of the component maximums.
/// 3. Otherwise the legacy single price field.
///
/// A component that is present but unparseable makes the sum unreliable, so
/// its raw text is returned as [`Numeric::Invalid`] for the value-for-money
/// reasoning to name. If no component parses at all, the legacy price is
/// tried before giving up the same way.
pub fn entry_price(record: &Map<String, Value>) -> Option<Numeric> {
  let components: Vec<&Value> =
    [FRAME_PRICE, DIE_PRICE, HYDRAULICS_PRICE, STAND_PRICE]
      .iter()
      .filter_map(|keys| lookup(record, keys))
      .collect();
  let ranges: Vec<PriceRange> =
    components.iter().map(|v| price_range(v)).collect();

  let unparsed = components
    .iter()
    .zip(&ranges)
    .find(|(_, range)| range.is_empty())
    .map(|(value, _)| invalid(value));

  let mins: Vec<f64> = ranges.iter().filter_map(|r| r.min).collect();
  if !mins.is_empty() {
    return Some(unparsed.unwrap_or(Numeric::Parsed(mins.iter().sum())));
  }
  let maxes: Vec<f64> = ranges.iter().filter_map(|r| r.max).collect();
  if !maxes.is_empty() {
    return Some(unparsed.unwrap_or(Numeric::Parsed(maxes.iter().sum())));
  }

  if let Some(legacy) = lookup(record, LEGACY_PRICE) {
    let range = price_range(legacy);
    if let Some(p) = range.min.or(range.max) {
      return Some(Numeric::Parsed(p));
    }
    return to_numeric(legacy).or_else(|| components.first().map(|v| invalid(v)));
  }

  components.first().map(|v| invalid(v))
}

fn parsed(value: &Value) -> Option<f64> {
  match to_numeric(value) {
    Some(Numeric::Parsed(f)) => Some(f),
    _ => None,
  }
}

fn invalid(value: &Value) -> Numeric {
  match value {
    Value::String(s) => Numeric::Invalid(s.clone()),
    other => Numeric::Invalid(other.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(v: Value) -> Map<String, Value> {
    v.as_object().cloned().expect("test records are objects")
  }

  #[test]
  fn empty_record_adapts_to_default_input() {
    assert_eq!(adapt(&Map::new()), ScoringInput::default());
  }

  #[test]
  fn entry_price_sums_component_minimums() {
    let r = record(json!({
      "framePriceRange": "$1,200 - $1,500",
      "diePriceRange": { "min": 300, "max": 450 },
      "hydraulicsPriceRange": 600,
      "price": 99999,
    }));
    assert_eq!(entry_price(&r), Some(Numeric::Parsed(2_100.0)));
  }

  #[test]
  fn entry_price_falls_back_to_maximums_then_legacy() {
    let maxes = record(json!({
      "framePriceRange": { "max": 1400 },
      "standPriceRange": { "high": 200 },
    }));
    assert_eq!(entry_price(&maxes), Some(Numeric::Parsed(1_600.0)));

    let legacy = record(json!({ "priceRange": "$2,495+" }));
    assert_eq!(entry_price(&legacy), Some(Numeric::Parsed(2_495.0)));

    let none = record(json!({ "brand": "Acme" }));
    assert_eq!(entry_price(&none), None);
  }

  #[test]
  fn unparseable_price_is_kept_for_reasoning() {
    let r = record(json!({ "framePriceRange": "call for quote" }));
    assert_eq!(
      entry_price(&r),
      Some(Numeric::Invalid("call for quote".into()))
    );
  }

  #[test]
  fn unparseable_component_is_not_dropped_from_the_sum() {
    let r = record(json!({
      "framePriceRange": "call for quote",
      "diePriceRange": 400,
    }));
    assert_eq!(
      entry_price(&r),
      Some(Numeric::Invalid("call for quote".into()))
    );

    let report = crate::scoring::engine::score(&adapt(&r));
    let value = &report.breakdown[0];
    assert_eq!(value.points, 0);
    assert!(value.reasoning.contains("call for quote"), "{}", value.reasoning);
  }

  #[test]
  fn unparseable_components_fall_back_to_legacy_price() {
    let r = record(json!({ "framePriceRange": "ask", "price": 1800 }));
    assert_eq!(entry_price(&r), Some(Numeric::Parsed(1_800.0)));
  }

  #[test]
  fn fractional_and_metric_lengths() {
    let r = record(json!({
      "wallThicknessCapacity": "3/16\"",
      "maxCapacity": "1-3/4\" OD",
    }));
    let input = adapt(&r);
    assert_eq!(input.wall_thickness_capacity, Some(Numeric::Parsed(0.1875)));

    let report = crate::scoring::engine::score(&input);
    let points = |c: crate::scoring::Category| {
      report.breakdown.iter().find(|i| i.category == c).map(|i| i.points)
    };
    assert_eq!(points(crate::scoring::Category::WallThickness), Some(5));
    assert_eq!(points(crate::scoring::Category::MaxDiameter), Some(6));

    let metric = record(json!({ "wallThickness": "3.2 mm" }));
    let Some(Numeric::Parsed(t)) = adapt(&metric).wall_thickness_capacity else {
      panic!("metric wall thickness should parse");
    };
    assert!((t - 3.2 / 25.4).abs() < 1e-9);

    let garbled = record(json!({ "wallThickness": "1.2.3" }));
    assert_eq!(
      adapt(&garbled).wall_thickness_capacity,
      Some(Numeric::Invalid("1.2.3".into()))
    );
  }

  #[test]
  fn price_range_shapes() {
    assert_eq!(price_range(&json!(500)), PriceRange::single(500.0));
    assert_eq!(
      price_range(&json!("1200 to 1500")),
      PriceRange { min: Some(1_200.0), max: Some(1_500.0) }
    );
    assert_eq!(
      price_range(&json!([10, "20"])),
      PriceRange { min: Some(10.0), max: Some(20.0) }
    );
    assert!(price_range(&json!(true)).is_empty());
    assert!(price_range(&json!("n/a")).is_empty());
  }

  #[test]
  fn adapts_mixed_encodings_and_aliases() {
    let r = record(json!({
      "maxDiameter": "2.5\" OD",
      "maxBendAngle": "195",
      "wallThickness": ".156",
      "materials": ["mild steel", 4130, "  "],
      "dies": "round tube, pipe",
      "yearsInBusiness": 12,
      "mandrel": "Available",
      "sBend": "yes",
      "singleSource": "0",
      "warranty": "Lifetime",
      "unrelated": { "nested": true },
    }));
    let input = adapt(&r);
    assert_eq!(input.max_capacity.as_deref(), Some("2.5\" OD"));
    assert_eq!(input.bend_angle, Some(Numeric::Parsed(195.0)));
    assert_eq!(input.wall_thickness_capacity, Some(Numeric::Parsed(0.156)));
    assert_eq!(input.materials, vec!["mild steel".to_owned()]);
    // Delimited strings are the overlay layer's job.
    assert!(input.die_shapes.is_empty());
    assert_eq!(input.years_in_business, Some(Numeric::Parsed(12.0)));
    assert_eq!(input.mandrel.as_deref(), Some("Available"));
    assert_eq!(input.s_bend_capability, Some(true));
    assert_eq!(input.single_source_system, Some(false));
    assert_eq!(input.warranty.as_deref(), Some("Lifetime"));
  }

  #[test]
  fn camel_case_wins_over_later_aliases() {
    let r = record(json!({ "bendAngle": 180, "bend_angle": 90 }));
    assert_eq!(adapt(&r).bend_angle, Some(Numeric::Parsed(180.0)));
  }

  #[test]
  fn null_alias_falls_through_to_next() {
    let r = record(json!({ "maxCapacity": null, "max_diameter": "2\"" }));
    assert_eq!(adapt(&r).max_capacity.as_deref(), Some("2\""));
  }

  #[test]
  fn upgrade_flags_join_the_upgrade_list() {
    let r = record(json!({
      "upgrades": ["stand"],
      "hydraulicUpgrade": "Y",
      "footPedal": 1,
      "autoStop": "no",
    }));
    let input = adapt(&r);
    assert_eq!(input.upgrades, vec!["stand", "hydraulic", "foot pedal"]);
  }

  #[test]
  fn invalid_numeric_keeps_raw() {
    let r = record(json!({ "bendAngle": "lots" }));
    assert_eq!(adapt(&r).bend_angle, Some(Numeric::Invalid("lots".into())));
  }
}
