//! Category rules.
//!
//! Each rule reads a slice of [`ScoringInput`] and returns exactly one
//! [`ScoreBreakdownItem`]. Rules come in three shapes:
//!
//! - **tiered**: the first matching threshold or token group wins;
//! - **checklist**: recognised tokens contribute fixed raw weights, normalised
//!   to the category budget;
//! - **binary**: the full budget or nothing.
//!
//! No rule fails. Missing data scores 0 with a "not specified" reason, and
//! unparseable data scores 0 with the raw value quoted.

use std::collections::BTreeSet;

use super::{Category, Numeric, ScoreBreakdownItem, ScoringInput, coerce};

/// Evaluate one category against `input`.
pub fn evaluate(category: Category, input: &ScoringInput) -> ScoreBreakdownItem {
  match category {
    Category::ValueForMoney => value_for_money(input.entry_price.as_ref()),
    Category::EaseOfUse => ease_of_use(input.ease_of_use.as_deref()),
    Category::MaxDiameter => max_diameter(input.max_capacity.as_deref()),
    Category::BendAngle => bend_angle(input.bend_angle.as_ref()),
    Category::WallThickness => wall_thickness(
      input.wall_thickness_capacity.as_ref(),
      &input.materials,
    ),
    Category::DieSelection => die_selection(&input.die_shapes),
    Category::YearsInBusiness => {
      years_in_business(input.years_in_business.as_ref())
    }
    Category::UpgradePath => upgrade_path(&input.upgrades),
    Category::Mandrel => mandrel(input.mandrel.as_deref()),
    Category::SBend => binary_flag(
      Category::SBend,
      input.s_bend_capability,
      "true S-bend capability",
    ),
    Category::UsaManufacturing => {
      usa_manufacturing(input.usa_manufacturing.as_deref())
    }
    Category::OriginTransparency => {
      origin_transparency(input.origin_transparency.as_deref())
    }
    Category::SingleSource => binary_flag(
      Category::SingleSource,
      input.single_source_system,
      "single-source system",
    ),
    Category::Warranty => warranty(input.warranty.as_deref()),
  }
}

// ─── Shared shapes ───────────────────────────────────────────────────────────

/// Values at or above `min` earn `points`. Tables are ordered highest first.
type Floor = (f64, u32);

/// A group of equivalent tokens and the points they earn.
type TokenTier = (&'static [&'static str], u32);

/// A recognised checklist entry: display name, matching tokens, raw weight.
type ChecklistEntry = (&'static str, &'static [&'static str], u32);

fn not_specified(category: Category) -> ScoreBreakdownItem {
  ScoreBreakdownItem::zero(
    category,
    format!("{} not specified", category.label().to_lowercase()),
  )
}

fn unparseable(category: Category, raw: &str) -> ScoreBreakdownItem {
  ScoreBreakdownItem::zero(
    category,
    format!(
      "{} value {raw:?} could not be parsed; not specified",
      category.label().to_lowercase()
    ),
  )
}

fn floor_points(value: f64, floors: &[Floor]) -> Option<(f64, u32)> {
  floors.iter().copied().find(|(min, _)| value >= *min)
}

fn token_points(value: &str, tiers: &[TokenTier]) -> Option<(&'static str, u32)> {
  let lowered = value.to_lowercase();
  tiers.iter().find_map(|(tokens, points)| {
    tokens
      .iter()
      .find(|t| lowered.contains(*t))
      .map(|t| (*t, *points))
  })
}

/// Whether `needle` occurs in `haystack` bounded by non-alphanumerics or the
/// ends of the string, so `stand` does not match `standard`.
fn contains_word(haystack: &str, needle: &str) -> bool {
  haystack.match_indices(needle).any(|(start, _)| {
    let before = haystack[..start].chars().next_back();
    let after = haystack[start + needle.len()..].chars().next();
    !before.is_some_and(char::is_alphanumeric)
      && !after.is_some_and(char::is_alphanumeric)
  })
}

/// Raw weights present in `items`, each entry counted once, plus the names of
/// the entries that matched.
fn checklist(items: &[String], entries: &[ChecklistEntry]) -> (u32, Vec<&'static str>) {
  let lowered: Vec<String> = items.iter().map(|i| i.to_lowercase()).collect();
  let mut raw = 0;
  let mut matched = Vec::new();
  for (name, tokens, weight) in entries {
    let hit = lowered
      .iter()
      .any(|item| tokens.iter().any(|t| contains_word(item, t)));
    if hit {
      raw += weight;
      matched.push(*name);
    }
  }
  (raw, matched)
}

fn normalise(raw: u32, entries: &[ChecklistEntry], budget: u32) -> u32 {
  let max_raw: u32 = entries.iter().map(|(_, _, w)| w).sum();
  if max_raw == 0 {
    return 0;
  }
  (f64::from(raw) / f64::from(max_raw) * f64::from(budget)).round() as u32
}

fn binary_flag(
  category: Category,
  flag: Option<bool>,
  feature: &str,
) -> ScoreBreakdownItem {
  match flag {
    None => not_specified(category),
    Some(true) => ScoreBreakdownItem::new(
      category,
      category.max_points(),
      format!("offers {feature}"),
    ),
    Some(false) => {
      ScoreBreakdownItem::zero(category, format!("does not offer {feature}"))
    }
  }
}

fn fmt_num(value: f64) -> String {
  let s = format!("{value:.3}");
  s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

// ─── Value for money ─────────────────────────────────────────────────────────

/// Entry price ceilings, cheapest first. Anything dearer earns the fallback.
const PRICE_CEILINGS: &[(f64, u32)] = &[
  (1_000.0, 20),
  (1_500.0, 17),
  (2_000.0, 14),
  (3_000.0, 10),
  (4_000.0, 6),
];
const PRICE_FALLBACK_POINTS: u32 = 3;

fn value_for_money(price: Option<&Numeric>) -> ScoreBreakdownItem {
  let c = Category::ValueForMoney;
  let price = match price {
    None => return not_specified(c),
    Some(Numeric::Invalid(raw)) => return unparseable(c, raw),
    Some(Numeric::Parsed(p)) => *p,
  };
  if price <= 0.0 {
    return ScoreBreakdownItem::zero(
      c,
      format!("entry price ${} is not a real price; not specified", fmt_num(price)),
    );
  }
  match PRICE_CEILINGS.iter().find(|(ceiling, _)| price <= *ceiling) {
    Some((ceiling, points)) => ScoreBreakdownItem::new(
      c,
      *points,
      format!(
        "entry price ${} is at or under ${}",
        fmt_num(price),
        fmt_num(*ceiling)
      ),
    ),
    None => ScoreBreakdownItem::new(
      c,
      PRICE_FALLBACK_POINTS,
      format!("entry price ${} is above every value bracket", fmt_num(price)),
    ),
  }
}

// ─── Ease of use ─────────────────────────────────────────────────────────────

const EASE_TIERS: &[TokenTier] = &[
  (&["very easy", "excellent"], 12),
  (&["easy"], 10),
  (&["moderate", "average"], 6),
  (&["difficult", "complex"], 2),
];

fn ease_of_use(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::EaseOfUse;
  let Some(value) = value else {
    return not_specified(c);
  };
  match token_points(value, EASE_TIERS) {
    Some((token, points)) => {
      ScoreBreakdownItem::new(c, points, format!("setup rated {token:?}"))
    }
    None => ScoreBreakdownItem::zero(
      c,
      format!("ease of use {value:?} is unknown; not specified"),
    ),
  }
}

// ─── Max diameter ────────────────────────────────────────────────────────────

/// Inches of tube OD.
const DIAMETER_FLOORS: &[Floor] = &[
  (2.5, 10),
  (2.0, 8),
  (1.75, 6),
  (1.5, 4),
  (f64::MIN_POSITIVE, 2),
];

fn max_diameter(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::MaxDiameter;
  let Some(raw) = value else {
    return not_specified(c);
  };
  let Some(mut inches) = coerce::leading_number(raw) else {
    return unparseable(c, raw);
  };
  if coerce::is_millimetres(raw) {
    inches /= coerce::MM_PER_INCH;
  }
  match floor_points(inches, DIAMETER_FLOORS) {
    Some((min, points)) if min >= 1.0 => ScoreBreakdownItem::new(
      c,
      points,
      format!("{raw} capacity meets the {}\" tier", fmt_num(min)),
    ),
    Some((_, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("{raw} capacity is below 1.5\""),
    ),
    None => unparseable(c, raw),
  }
}

// ─── Bend angle ──────────────────────────────────────────────────────────────

const ANGLE_FLOORS: &[Floor] = &[
  (195.0, 10),
  (180.0, 8),
  (120.0, 5),
  (90.0, 3),
  (f64::MIN_POSITIVE, 1),
];

fn bend_angle(value: Option<&Numeric>) -> ScoreBreakdownItem {
  let c = Category::BendAngle;
  let degrees = match value {
    None => return not_specified(c),
    Some(Numeric::Invalid(raw)) => return unparseable(c, raw),
    Some(Numeric::Parsed(d)) => *d,
  };
  match floor_points(degrees, ANGLE_FLOORS) {
    Some((min, points)) if min >= 1.0 => ScoreBreakdownItem::new(
      c,
      points,
      format!("{}° bend meets the {}° tier", fmt_num(degrees), fmt_num(min)),
    ),
    Some((_, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("{}° bend is under 90°", fmt_num(degrees)),
    ),
    None => ScoreBreakdownItem::zero(
      c,
      format!("bend angle {}° is not positive; not specified", fmt_num(degrees)),
    ),
  }
}

// ─── Wall thickness + materials ──────────────────────────────────────────────

const THICKNESS_MAX: u32 = 5;
const MATERIALS_MAX: u32 = 4;

/// Inches of wall.
const THICKNESS_FLOORS: &[Floor] = &[
  (0.156, 5),
  (0.120, 4),
  (0.095, 3),
  (0.065, 2),
  (f64::MIN_POSITIVE, 1),
];

const MATERIALS: &[ChecklistEntry] = &[
  ("mild steel", &["mild steel", "dom", "hrew"], 1),
  ("chromoly", &["chromoly", "chrome moly", "4130"], 2),
  ("stainless", &["stainless"], 2),
  ("aluminum", &["aluminum", "aluminium"], 1),
  ("titanium", &["titanium"], 2),
  ("copper", &["copper"], 1),
];

fn wall_thickness(
  thickness: Option<&Numeric>,
  materials: &[String],
) -> ScoreBreakdownItem {
  let c = Category::WallThickness;
  if thickness.is_none() && materials.is_empty() {
    return not_specified(c);
  }

  let (thickness_points, thickness_reason) = match thickness {
    None => (0, "wall thickness not specified".to_owned()),
    Some(Numeric::Invalid(raw)) => (
      0,
      format!("wall thickness {raw:?} could not be parsed; not specified"),
    ),
    Some(Numeric::Parsed(t)) => match floor_points(*t, THICKNESS_FLOORS) {
      Some((min, points)) => (
        points,
        format!(
          "{}\" wall meets the {}\" tier ({points}/{THICKNESS_MAX})",
          fmt_num(*t),
          fmt_num(min.max(0.0))
        ),
      ),
      None => (
        0,
        format!("wall thickness {}\" is not positive", fmt_num(*t)),
      ),
    },
  };

  let (materials_points, materials_reason) = if materials.is_empty() {
    (0, "materials not specified; not scored".to_owned())
  } else {
    let (raw, matched) = checklist(materials, MATERIALS);
    let points = normalise(raw, MATERIALS, MATERIALS_MAX);
    let names = if matched.is_empty() {
      "none recognised".to_owned()
    } else {
      matched.join(", ")
    };
    (points, format!("materials: {names} ({points}/{MATERIALS_MAX})"))
  };

  ScoreBreakdownItem::new(
    c,
    thickness_points + materials_points,
    format!("{thickness_reason}; {materials_reason}"),
  )
}

// ─── Die selection ───────────────────────────────────────────────────────────

const DIE_SHAPES: &[ChecklistEntry] = &[
  ("round tube", &["round tube", "round tubing"], 3),
  ("pipe", &["pipe"], 2),
  ("square", &["square"], 1),
  ("rectangular", &["rectangular", "rectangle"], 1),
  ("EMT/conduit", &["emt", "conduit"], 1),
  ("solid rod", &["solid rod", "rod", "bar", "round bar", "flat bar"], 1),
];

fn die_selection(shapes: &[String]) -> ScoreBreakdownItem {
  let c = Category::DieSelection;
  if shapes.is_empty() {
    return ScoreBreakdownItem::zero(c, "die shapes not specified; not scored");
  }
  let (raw, matched) = checklist(shapes, DIE_SHAPES);
  let points = normalise(raw, DIE_SHAPES, c.max_points());
  if matched.is_empty() {
    return ScoreBreakdownItem::zero(
      c,
      format!("no recognised die shapes in {shapes:?}"),
    );
  }
  ScoreBreakdownItem::new(c, points, format!("dies for {}", matched.join(", ")))
}

// ─── Years in business ───────────────────────────────────────────────────────

const YEARS_FLOORS: &[Floor] = &[(20.0, 3), (10.0, 2), (1.0, 1)];

fn years_in_business(value: Option<&Numeric>) -> ScoreBreakdownItem {
  let c = Category::YearsInBusiness;
  let years = match value {
    None => return not_specified(c),
    Some(Numeric::Invalid(raw)) => return unparseable(c, raw),
    Some(Numeric::Parsed(y)) => *y,
  };
  match floor_points(years, YEARS_FLOORS) {
    Some((min, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("{} years in business (≥ {})", fmt_num(years), fmt_num(min)),
    ),
    None => ScoreBreakdownItem::zero(
      c,
      format!("{} years in business is under one year", fmt_num(years)),
    ),
  }
}

// ─── Upgrade path ────────────────────────────────────────────────────────────

/// Each distinct upgrade is worth one point.
const UPGRADES: &[(&str, &[&str])] = &[
  ("hydraulic", &["hydraulic"]),
  ("electric pump", &["electric", "pump"]),
  ("foot pedal", &["pedal", "foot"]),
  ("stand", &["stand"]),
  ("angle gauge", &["gauge", "degree ring", "protractor"]),
  ("auto stop", &["auto stop", "autostop", "stop"]),
  ("cart", &["cart"]),
  ("bend-over-center kit", &["rotation", "over center", "bend-over"]),
];

fn upgrade_path(upgrades: &[String]) -> ScoreBreakdownItem {
  let c = Category::UpgradePath;
  if upgrades.is_empty() {
    return not_specified(c);
  }
  let mut present = BTreeSet::new();
  let mut ignored = Vec::new();
  for upgrade in upgrades {
    let lowered = upgrade.to_lowercase();
    match UPGRADES
      .iter()
      .find(|(_, tokens)| tokens.iter().any(|t| contains_word(&lowered, t)))
    {
      Some((name, _)) => {
        present.insert(*name);
      }
      None => ignored.push(upgrade.as_str()),
    }
  }

  let count = u32::try_from(present.len()).unwrap_or(u32::MAX);
  let points = count.min(c.max_points());
  let mut reason = if present.is_empty() {
    "no recognised upgrades".to_owned()
  } else {
    format!(
      "{count} upgrade option(s): {}",
      present.into_iter().collect::<Vec<_>>().join(", ")
    )
  };
  if count > c.max_points() {
    reason.push_str(&format!("; capped at {}", c.max_points()));
  }
  if !ignored.is_empty() {
    reason.push_str(&format!("; ignored {ignored:?}"));
  }
  ScoreBreakdownItem::new(c, points, reason)
}

// ─── Mandrel ─────────────────────────────────────────────────────────────────

fn mandrel(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::Mandrel;
  match value {
    None => not_specified(c),
    Some(v) if v.eq_ignore_ascii_case("available") => {
      ScoreBreakdownItem::new(c, c.max_points(), "mandrel tooling available")
    }
    Some(v) => ScoreBreakdownItem::zero(
      c,
      format!("mandrel listed as {v:?}; only \"available\" earns points"),
    ),
  }
}

// ─── Origin ──────────────────────────────────────────────────────────────────

const USA_TIERS: &[TokenTier] = &[
  (&["made in usa", "made in the usa", "usa made", "100% usa"], 5),
  (&["assembled in usa", "assembled in the usa"], 3),
  (&["partial", "some components", "mixed"], 2),
  (&["imported", "overseas"], 1),
];

fn usa_manufacturing(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::UsaManufacturing;
  let Some(value) = value else {
    return not_specified(c);
  };
  match token_points(value, USA_TIERS) {
    Some((token, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("manufacturing disclosed as {token:?}"),
    ),
    None => ScoreBreakdownItem::zero(
      c,
      format!("manufacturing disclosure {value:?} is unknown; not specified"),
    ),
  }
}

const ORIGIN_TIERS: &[TokenTier] = &[
  (&["full", "complete"], 4),
  (&["partial"], 2),
  (&["minimal", "limited"], 1),
  (&["none", "undisclosed"], 0),
];

fn origin_transparency(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::OriginTransparency;
  let Some(value) = value else {
    return not_specified(c);
  };
  match token_points(value, ORIGIN_TIERS) {
    Some((token, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("component origin disclosure is {token:?}"),
    ),
    None => ScoreBreakdownItem::zero(
      c,
      format!("origin transparency {value:?} is unknown; not specified"),
    ),
  }
}

// ─── Warranty ────────────────────────────────────────────────────────────────

const WARRANTY_YEAR_FLOORS: &[Floor] = &[(3.0, 2), (1.0, 1)];

fn warranty(value: Option<&str>) -> ScoreBreakdownItem {
  let c = Category::Warranty;
  let Some(raw) = value else {
    return not_specified(c);
  };
  let lowered = raw.to_lowercase();
  if lowered.contains("lifetime") {
    return ScoreBreakdownItem::new(c, c.max_points(), "lifetime warranty");
  }
  let Some(amount) = coerce::leading_number(raw) else {
    return unparseable(c, raw);
  };
  let years = if lowered.contains("day") {
    amount / 365.0
  } else if lowered.contains("month") {
    amount / 12.0
  } else {
    amount
  };
  match floor_points(years, WARRANTY_YEAR_FLOORS) {
    Some((min, points)) => ScoreBreakdownItem::new(
      c,
      points,
      format!("{raw} warranty (≥ {} year(s))", fmt_num(min)),
    ),
    None => ScoreBreakdownItem::zero(
      c,
      format!("{raw} warranty is under one year"),
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
  }

  #[test]
  fn price_tiers_reward_cheaper_entry() {
    let p = |v: f64| value_for_money(Some(&Numeric::Parsed(v))).points;
    assert_eq!(p(899.0), 20);
    assert_eq!(p(1_000.0), 20);
    assert_eq!(p(1_200.0), 17);
    assert_eq!(p(2_500.0), 10);
    assert_eq!(p(9_999.0), 3);
    assert_eq!(p(0.0), 0);
  }

  #[test]
  fn invalid_price_names_raw_value() {
    let item = value_for_money(Some(&Numeric::Invalid("call us".into())));
    assert_eq!(item.points, 0);
    assert!(item.reasoning.contains("\"call us\""), "{}", item.reasoning);
    assert!(item.reasoning.contains("not specified"));
  }

  #[test]
  fn ease_tiers_match_most_specific_first() {
    assert_eq!(ease_of_use(Some("Very easy, bolt together")).points, 12);
    assert_eq!(ease_of_use(Some("Easy")).points, 10);
    assert_eq!(ease_of_use(Some("moderate")).points, 6);
    assert_eq!(ease_of_use(Some("Difficult")).points, 2);
    let unknown = ease_of_use(Some("meh"));
    assert_eq!(unknown.points, 0);
    assert!(unknown.reasoning.contains("unknown"));
  }

  #[test]
  fn diameter_reads_leading_number_and_metric() {
    assert_eq!(max_diameter(Some("2.5\" OD")).points, 10);
    assert_eq!(max_diameter(Some("2\"")).points, 8);
    assert_eq!(max_diameter(Some("1-3/4\"")).points, 6);
    assert_eq!(max_diameter(Some("1 3/4\" OD")).points, 6);
    assert_eq!(max_diameter(Some("1-1/2\"")).points, 4);
    assert_eq!(max_diameter(Some("50mm")).points, 6);
    let bad = max_diameter(Some("big"));
    assert_eq!(bad.points, 0);
    assert!(bad.reasoning.contains("\"big\""));
  }

  #[test]
  fn angle_tiers() {
    let a = |v: f64| bend_angle(Some(&Numeric::Parsed(v))).points;
    assert_eq!(a(195.0), 10);
    assert_eq!(a(200.0), 10);
    assert_eq!(a(180.0), 8);
    assert_eq!(a(150.0), 5);
    assert_eq!(a(90.0), 3);
    assert_eq!(a(45.0), 1);
    assert_eq!(a(-5.0), 0);
  }

  #[test]
  fn wall_thickness_combines_sub_scores() {
    let item = wall_thickness(
      Some(&Numeric::Parsed(0.156)),
      &strings(&["mild steel", "4130 chromoly"]),
    );
    // 5 for thickness + round(3 / 9 * 4) for materials
    assert_eq!(item.points, 6);
    assert!(item.points <= item.max_points);

    let all = wall_thickness(
      Some(&Numeric::Parsed(0.25)),
      &strings(&[
        "mild steel",
        "chromoly",
        "stainless",
        "aluminum",
        "titanium",
        "copper",
      ]),
    );
    assert_eq!(all.points, 9);
  }

  #[test]
  fn wall_thickness_without_materials_still_scores_thickness() {
    let item = wall_thickness(Some(&Numeric::Parsed(0.095)), &[]);
    assert_eq!(item.points, 3);
    assert!(item.reasoning.contains("not scored"));
  }

  #[test]
  fn materials_checklist_is_monotonic() {
    let mut list = strings(&["mild steel"]);
    let mut last = wall_thickness(None, &list).points;
    for extra in ["aluminum", "stainless", "stainless", "copper", "titanium"] {
      list.push(extra.to_owned());
      let now = wall_thickness(None, &list).points;
      assert!(now >= last, "adding {extra} dropped {last} -> {now}");
      last = now;
    }
  }

  #[test]
  fn die_checklist_is_monotonic_and_capped() {
    let mut list = strings(&["Round Tube"]);
    let mut last = die_selection(&list).points;
    assert_eq!(last, 3);
    for extra in ["pipe", "square", "rectangular", "EMT", "solid rod"] {
      list.push(extra.to_owned());
      let now = die_selection(&list).points;
      assert!(now >= last);
      last = now;
    }
    assert_eq!(last, 8);
  }

  #[test]
  fn empty_die_list_is_not_scored() {
    let item = die_selection(&[]);
    assert_eq!(item.points, 0);
    assert!(item.reasoning.contains("not scored"));
  }

  #[test]
  fn upgrades_one_point_each_and_deduplicated() {
    let item = upgrade_path(&strings(&[
      "Hydraulic ram",
      "hydraulic cylinder",
      "Stand",
      "Degree ring",
      "hat rack",
    ]));
    assert_eq!(item.points, 3);
    assert!(item.reasoning.contains("ignored"));
  }

  #[test]
  fn all_upgrades_reach_budget() {
    let item = upgrade_path(&strings(&[
      "hydraulic",
      "electric pump",
      "foot pedal",
      "stand",
      "angle gauge",
      "auto stop",
      "cart",
      "rotation kit",
    ]));
    assert_eq!(item.points, 8);
  }

  #[test]
  fn upgrade_tokens_match_whole_words() {
    let item = upgrade_path(&strings(&[
      "standard dies",
      "nonstop support",
      "small footprint",
    ]));
    assert_eq!(item.points, 0);
    assert!(item.reasoning.contains("no recognised upgrades"), "{}", item.reasoning);

    let item = upgrade_path(&strings(&["Roll-around stand", "Foot pedal", "stop collar"]));
    assert_eq!(item.points, 3);
  }

  #[test]
  fn die_tokens_match_whole_words() {
    let item = die_selection(&strings(&["barrel", "rodent guard", "solid construction"]));
    assert_eq!(item.points, 0);

    let bar = die_selection(&strings(&["bar"]));
    let rod = die_selection(&strings(&["Solid Rod"]));
    assert!(bar.points > 0);
    assert_eq!(bar.points, rod.points);
  }

  #[test]
  fn word_match_respects_boundaries() {
    assert!(contains_word("stand", "stand"));
    assert!(contains_word("heavy-duty stand", "stand"));
    assert!(contains_word("1-1/2\" bar", "bar"));
    assert!(!contains_word("standard", "stand"));
    assert!(!contains_word("crowbar", "bar"));
    assert!(contains_word("rod, bar", "bar"));
  }

  #[test]
  fn mandrel_is_exact_and_case_insensitive() {
    assert_eq!(mandrel(Some("Available")).points, 4);
    assert_eq!(mandrel(Some("AVAILABLE")).points, 4);
    assert_eq!(mandrel(Some("standard")).points, 0);
    assert_eq!(mandrel(Some("")).points, 0);
    assert_eq!(mandrel(Some("available soon")).points, 0);
    assert_eq!(mandrel(None).points, 0);
  }

  #[test]
  fn binary_flags_distinguish_false_from_absent() {
    let yes = binary_flag(Category::SBend, Some(true), "true S-bend capability");
    assert_eq!(yes.points, 2);
    let no = binary_flag(Category::SBend, Some(false), "true S-bend capability");
    assert_eq!(no.points, 0);
    assert!(no.reasoning.contains("does not offer"));
    let absent = binary_flag(Category::SBend, None, "true S-bend capability");
    assert!(absent.reasoning.contains("not specified"));
  }

  #[test]
  fn usa_and_origin_tiers() {
    assert_eq!(usa_manufacturing(Some("Made in USA")).points, 5);
    assert_eq!(usa_manufacturing(Some("Assembled in USA")).points, 3);
    assert_eq!(usa_manufacturing(Some("imported")).points, 1);
    assert_eq!(origin_transparency(Some("Fully disclosed")).points, 4);
    assert_eq!(origin_transparency(Some("partial")).points, 2);
    assert_eq!(origin_transparency(Some("undisclosed")).points, 0);
  }

  #[test]
  fn warranty_tiers_and_units() {
    assert_eq!(warranty(Some("Lifetime")).points, 3);
    assert_eq!(warranty(Some("5 years")).points, 2);
    assert_eq!(warranty(Some("1 year")).points, 1);
    assert_eq!(warranty(Some("18 months")).points, 1);
    assert_eq!(warranty(Some("90 days")).points, 0);
    let bad = warranty(Some("ask dealer"));
    assert_eq!(bad.points, 0);
    assert!(bad.reasoning.contains("\"ask dealer\""));
  }

  #[test]
  fn years_tiers() {
    let y = |v: f64| years_in_business(Some(&Numeric::Parsed(v))).points;
    assert_eq!(y(25.0), 3);
    assert_eq!(y(12.0), 2);
    assert_eq!(y(3.0), 1);
    assert_eq!(y(0.5), 0);
  }
}
