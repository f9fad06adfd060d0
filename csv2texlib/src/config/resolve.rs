//! Configuration merging.
//!
//! Turns a raw YAML mapping into a [`Configuration`]. Each top-level section
//! is read on its own, so one malformed section only reverts that section to
//! its default and leaves a [`ConfigWarning`] behind.
//!
//! Precedence, per column:
//! 1. Generalized keys (`value_replacements.model`, `row_filtering...`)
//! 2. Legacy keys (`latex_model_names`, `ignored_models`, ...), which only
//!    ever describe the `model` column
//! 3. Defaults
//!
//! Legacy keys are merged additively: they fill in the `model` column only
//! where the generalized section says nothing about it.

use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

use super::format::{FormatSpec, MAX_PRECISION};
use super::model::{
    ConfigWarning, Configuration, ExtraColumn, FilterRules, SortConfig, SuffixRule, TableStyle,
    ValueMatcher,
};
use crate::data::CellValue;
use crate::error::Csv2TexError;
use crate::Result;

/// The only column legacy keys apply to.
pub const LEGACY_COLUMN: &str = "model";

/// Every top-level key the resolver understands.
const KNOWN_KEYS: &[&str] = &[
    "display_names",
    "column_formats",
    "column_underline",
    "row_sorting",
    "value_replacements",
    "row_filtering",
    "pattern_formatting",
    "extra_columns",
    "table_style",
    "underline_min_values",
    "default_decimal_places",
    "caption",
    "label",
    "placement",
    "rule_between_rows",
    "bold_headers",
    "math_mode",
    "column_alignment",
    "latex_model_names",
    "model_order",
    "ignored_models",
    "ignored_models_in_calculation",
    "model_patterns",
];

/// A YAML scalar read as text.
///
/// Column keys and values are often written unquoted (`2022: "Year 1"`,
/// `exclude_values: {cluster: [4, 5]}`), so numbers and booleans are
/// accepted wherever text is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(CellValue::number(v).as_text().into_owned()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

type ScalarMap = IndexMap<Scalar, Scalar>;

#[derive(Debug, Deserialize)]
struct RawSorting {
    #[serde(default)]
    columns: Vec<Scalar>,
    #[serde(default)]
    sort_orders: IndexMap<Scalar, IndexMap<Scalar, i64>>,
}

#[derive(Debug, Deserialize)]
struct RawFiltering {
    #[serde(default)]
    exclude_values: IndexMap<Scalar, Vec<Scalar>>,
    #[serde(default)]
    exclude_from_calculations: IndexMap<Scalar, Vec<Scalar>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPatterns {
    Nested { suffixes: ScalarMap },
    Flat(ScalarMap),
}

impl RawPatterns {
    fn into_rules(self) -> Vec<SuffixRule> {
        let map = match self {
            RawPatterns::Nested { suffixes } => suffixes,
            RawPatterns::Flat(map) => map,
        };
        map.into_iter()
            .map(|(suffix, latex)| SuffixRule {
                suffix: suffix.0,
                latex: latex.0,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawExtraColumn {
    position: i64,
    #[serde(default)]
    display_name: Option<Scalar>,
    value: Scalar,
}

/// Section reader over one raw mapping, collecting warnings as it goes.
struct Sections<'a> {
    map: &'a Mapping,
    warnings: Vec<ConfigWarning>,
}

impl<'a> Sections<'a> {
    fn new(map: &'a Mapping) -> Self {
        Sections {
            map,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, section: &str, message: impl Into<String>) {
        let warning = ConfigWarning {
            section: section.to_string(),
            message: message.into(),
        };
        tracing::warn!(section = %warning.section, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Read a section. Absent or null sections give `None`; sections of the
    /// wrong shape give `None` plus a warning.
    fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.map.get(key)?;
        if value.is_null() {
            return None;
        }
        match serde_yaml::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.warn(key, format!("malformed section, using default: {}", e));
                None
            }
        }
    }

    fn warn_unknown_keys(&mut self) {
        let unknown: Vec<String> = self
            .map
            .keys()
            .filter_map(|k| match k {
                Value::String(s) if KNOWN_KEYS.contains(&s.as_str()) => None,
                Value::String(s) => Some(s.clone()),
                other => Some(format!("{:?}", other)),
            })
            .collect();
        for key in unknown {
            self.warn(&key, "unknown configuration key, ignored");
        }
    }
}

impl Configuration {
    /// Resolve a raw configuration mapping over the built-in defaults.
    ///
    /// `Value::Null` (an empty document) resolves to the defaults. Anything
    /// other than a mapping or null is a fatal error.
    pub fn resolve(raw: &Value) -> Result<Configuration> {
        Self::resolve_with(raw, &Configuration::default())
    }

    /// Resolve a raw configuration mapping over `defaults`.
    ///
    /// Sections absent from `raw`, or malformed in it, keep the value they
    /// have in `defaults`.
    pub fn resolve_with(raw: &Value, defaults: &Configuration) -> Result<Configuration> {
        let empty = Mapping::new();
        let map = match raw {
            Value::Mapping(m) => m,
            Value::Null => &empty,
            other => {
                return Err(Csv2TexError::ConfigNotMapping {
                    found: value_kind(other).to_string(),
                })
            }
        };

        let mut sections = Sections::new(map);
        sections.warn_unknown_keys();

        let display_names = sections
            .get::<ScalarMap>("display_names")
            .map(|m| m.into_iter().map(|(k, v)| (k.0, v.0)).collect())
            .unwrap_or_else(|| defaults.display_names.clone());

        let column_formats = match sections.get::<ScalarMap>("column_formats") {
            Some(raw_formats) => parse_formats(raw_formats, &mut sections),
            None => defaults.column_formats.clone(),
        };

        let column_underline = sections
            .get::<IndexMap<Scalar, bool>>("column_underline")
            .map(|m| m.into_iter().map(|(k, v)| (k.0, v)).collect())
            .unwrap_or_else(|| defaults.column_underline.clone());

        // Sections the legacy keys fold into stay optional until then, so
        // defaults only apply when neither form is present in `raw`.
        let mut row_sorting = sections
            .get::<RawSorting>("row_sorting")
            .map(|raw| SortConfig {
                columns: raw.columns.into_iter().map(|c| c.0).collect(),
                sort_orders: raw
                    .sort_orders
                    .into_iter()
                    .map(|(col, ranks)| (col.0, ranks.into_iter().map(|(v, r)| (v.0, r)).collect()))
                    .collect(),
            });

        let mut value_replacements: Option<IndexMap<String, IndexMap<String, String>>> = sections
            .get::<IndexMap<Scalar, ScalarMap>>("value_replacements")
            .map(|m| m.into_iter().map(|(col, map)| (col.0, into_strings(map))).collect());

        let mut row_filtering = match sections.get::<RawFiltering>("row_filtering") {
            Some(raw) => Some(FilterRules {
                exclude_values: compile_rules(
                    raw.exclude_values,
                    "row_filtering",
                    &mut sections,
                ),
                exclude_from_calculations: compile_rules(
                    raw.exclude_from_calculations,
                    "row_filtering",
                    &mut sections,
                ),
            }),
            None => None,
        };

        let mut pattern_formatting: Option<IndexMap<String, Vec<SuffixRule>>> = sections
            .get::<IndexMap<Scalar, RawPatterns>>("pattern_formatting")
            .map(|m| m.into_iter().map(|(col, p)| (col.0, p.into_rules())).collect());

        let extra_columns = sections
            .get::<Vec<RawExtraColumn>>("extra_columns")
            .map(|cols| {
                cols.into_iter()
                    .map(|c| ExtraColumn {
                        position: c.position,
                        display_name: c.display_name.map(|s| s.0).unwrap_or_default(),
                        value: c.value.0,
                    })
                    .collect()
            })
            .unwrap_or_else(|| defaults.extra_columns.clone());

        let table_style = sections
            .get::<TableStyle>("table_style")
            .unwrap_or(defaults.table_style);

        let underline_min_values = sections
            .get::<bool>("underline_min_values")
            .unwrap_or(defaults.underline_min_values);

        let default_decimal_places = match sections.get::<usize>("default_decimal_places") {
            Some(n) if n > MAX_PRECISION => {
                sections.warn(
                    "default_decimal_places",
                    format!("{} exceeds {}, using default", n, MAX_PRECISION),
                );
                defaults.default_decimal_places
            }
            Some(n) => n,
            None => defaults.default_decimal_places,
        };

        let mut latex = defaults.latex.clone();
        if let Some(caption) = sections.get::<Scalar>("caption") {
            latex.caption = Some(caption.0).filter(|c| !c.is_empty());
        }
        if let Some(label) = sections.get::<Scalar>("label") {
            latex.label = Some(label.0).filter(|l| !l.is_empty());
        }
        if let Some(placement) = sections.get::<Scalar>("placement") {
            latex.placement = placement.0;
        }
        if let Some(flag) = sections.get::<bool>("rule_between_rows") {
            latex.rule_between_rows = flag;
        }
        if let Some(flag) = sections.get::<bool>("bold_headers") {
            latex.bold_headers = flag;
        }
        if let Some(flag) = sections.get::<bool>("math_mode") {
            latex.math_mode = flag;
        }
        match sections.get::<char>("column_alignment") {
            Some(c @ ('l' | 'c' | 'r')) => latex.column_alignment = c,
            Some(c) => sections.warn(
                "column_alignment",
                format!("'{}' is not one of l, c, r, using default", c),
            ),
            None => {}
        }

        // Legacy keys: fill in the `model` column where the generalized
        // sections leave it unset.
        if let Some(names) = sections.get::<ScalarMap>("latex_model_names") {
            value_replacements
                .get_or_insert_with(IndexMap::new)
                .entry(LEGACY_COLUMN.to_string())
                .or_insert_with(|| into_strings(names));
        }

        if let Some(order) = sections.get::<IndexMap<Scalar, i64>>("model_order") {
            if !order.is_empty() {
                let row_sorting = row_sorting.get_or_insert_with(SortConfig::default);
                row_sorting
                    .sort_orders
                    .entry(LEGACY_COLUMN.to_string())
                    .or_insert_with(|| order.into_iter().map(|(k, v)| (k.0, v)).collect());
                if !row_sorting.columns.iter().any(|c| c == LEGACY_COLUMN) {
                    row_sorting.columns.push(LEGACY_COLUMN.to_string());
                }
            }
        }

        if let Some(ignored) = sections.get::<Vec<Scalar>>("ignored_models") {
            let row_filtering = row_filtering.get_or_insert_with(FilterRules::default);
            if !row_filtering.exclude_values.contains_key(LEGACY_COLUMN) {
                let rules = compile_list(ignored, "ignored_models", &mut sections);
                row_filtering
                    .exclude_values
                    .insert(LEGACY_COLUMN.to_string(), rules);
            }
        }

        if let Some(ignored) = sections.get::<Vec<Scalar>>("ignored_models_in_calculation") {
            let row_filtering = row_filtering.get_or_insert_with(FilterRules::default);
            if !row_filtering
                .exclude_from_calculations
                .contains_key(LEGACY_COLUMN)
            {
                let rules = compile_list(ignored, "ignored_models_in_calculation", &mut sections);
                row_filtering
                    .exclude_from_calculations
                    .insert(LEGACY_COLUMN.to_string(), rules);
            }
        }

        if let Some(patterns) = sections.get::<RawPatterns>("model_patterns") {
            pattern_formatting
                .get_or_insert_with(IndexMap::new)
                .entry(LEGACY_COLUMN.to_string())
                .or_insert_with(|| patterns.into_rules());
        }

        Ok(Configuration {
            display_names,
            column_formats,
            column_underline,
            row_sorting: row_sorting.unwrap_or_else(|| defaults.row_sorting.clone()),
            value_replacements: value_replacements
                .unwrap_or_else(|| defaults.value_replacements.clone()),
            row_filtering: row_filtering.unwrap_or_else(|| defaults.row_filtering.clone()),
            pattern_formatting: pattern_formatting
                .unwrap_or_else(|| defaults.pattern_formatting.clone()),
            extra_columns,
            table_style,
            underline_min_values,
            default_decimal_places,
            latex,
            warnings: sections.warnings,
        })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn into_strings(map: ScalarMap) -> IndexMap<String, String> {
    map.into_iter().map(|(k, v)| (k.0, v.0)).collect()
}

/// Parse each column's format code, dropping (and reporting) unknown ones.
fn parse_formats(raw: ScalarMap, sections: &mut Sections) -> IndexMap<String, FormatSpec> {
    let mut formats = IndexMap::new();
    for (column, code) in raw {
        match FormatSpec::from_str(&code.0) {
            Ok(spec) => {
                formats.insert(column.0, spec);
            }
            Err(e) => sections.warn(
                "column_formats",
                format!("column '{}': {}, using default decimals", column.0, e),
            ),
        }
    }
    formats
}

fn compile_list(values: Vec<Scalar>, section: &str, sections: &mut Sections) -> Vec<ValueMatcher> {
    values
        .into_iter()
        .map(|v| {
            let (matcher, problem) = ValueMatcher::new(v.0);
            if let Some(message) = problem {
                sections.warn(section, format!("{}, matching it literally", message));
            }
            matcher
        })
        .collect()
}

fn compile_rules(
    raw: IndexMap<Scalar, Vec<Scalar>>,
    section: &str,
    sections: &mut Sections,
) -> IndexMap<String, Vec<ValueMatcher>> {
    raw.into_iter()
        .map(|(column, values)| (column.0, compile_list(values, section, sections)))
        .collect()
}
