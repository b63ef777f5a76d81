// tarmac_sim/src/simulation/config/resolver.rs

use super::catalog::PresetCatalog;
use crate::error::{SimError, SimResult};
use figment::value::{Dict, Tag, Value};

/// Presets may build on presets, but not forever.
const MAX_PRESET_DEPTH: usize = 16;

/// Expands every `{ from = "namespace.name", ...overrides }` table inside
/// `value` against the catalog. Overrides deep-merge over the preset; the
/// `from` key itself never survives into the output.
pub fn resolve_value(value: &Value, catalog: &PresetCatalog) -> SimResult<Value> {
    resolve_value_recursively(value, catalog, 0)
}

/// A recursive deep merge helper.
/// It merges the contents of `override_dict` into `base`.
fn deep_merge(base: &mut Dict, override_dict: &Dict) {
    for (key, override_val) in override_dict {
        // An override that is itself a `from` table replaces the base wholesale.
        if let Some(d) = override_val.as_dict() {
            if d.contains_key("from") {
                base.insert(key.clone(), override_val.clone());
                continue;
            }
        }

        if let Some(base_val) = base.get_mut(key) {
            if let (Some(base_sub_dict), Some(override_sub_dict)) =
                (base_val.as_dict(), override_val.as_dict())
            {
                let mut new_sub_dict = base_sub_dict.clone();
                deep_merge(&mut new_sub_dict, override_sub_dict);
                *base_val = Value::Dict(Tag::Default, new_sub_dict);
                continue;
            }
        }
        base.insert(key.clone(), override_val.clone());
    }
}

fn resolve_value_recursively(
    value: &Value,
    catalog: &PresetCatalog,
    depth: usize,
) -> SimResult<Value> {
    if depth > MAX_PRESET_DEPTH {
        return Err(SimError::Resolve(format!(
            "presets nest deeper than {MAX_PRESET_DEPTH} levels (is one referencing itself?)"
        )));
    }

    // --- STEP 1: Resolve the current node if it's a 'from' reference. ---
    let current_node = match value.as_dict() {
        Some(dict) if dict.contains_key("from") => {
            let from_key = dict.get("from").and_then(|v| v.as_str()).ok_or_else(|| {
                SimError::Resolve("`from` must name a preset, e.g. \"vehicles.sedan\"".into())
            })?;
            let base_preset = catalog
                .get(from_key)
                .ok_or_else(|| SimError::Resolve(format!("Preset '{from_key}' not found in catalog")))?;

            // Resolve the base preset first to get its complete structure.
            let resolved_base = resolve_value_recursively(base_preset, catalog, depth + 1)?;
            let mut final_dict = resolved_base.into_dict().ok_or_else(|| {
                SimError::Resolve(format!(
                    "Preset '{from_key}' must resolve to a table to be merged."
                ))
            })?;

            // The `dict` here contains the `from` key and any sibling override keys.
            deep_merge(&mut final_dict, dict);
            Value::Dict(Tag::Default, final_dict)
        }
        _ => value.clone(),
    };

    // --- STEP 2: Now that the current node is resolved, resolve its children. ---
    match &current_node {
        Value::Dict(tag, dict) => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                // The 'from' key has been processed, so we strip it from the final output.
                if key == "from" {
                    continue;
                }
                new_dict.insert(
                    key.clone(),
                    resolve_value_recursively(val, catalog, depth + 1)?,
                );
            }
            Ok(Value::Dict(*tag, new_dict))
        }
        Value::Array(tag, arr) => {
            let resolved_arr = arr
                .iter()
                .map(|item| resolve_value_recursively(item, catalog, depth + 1))
                .collect::<SimResult<Vec<_>>>()?;
            Ok(Value::Array(*tag, resolved_arr))
        }
        _ => Ok(current_node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };

    fn parse(toml: &str) -> Value {
        Figment::new()
            .merge(Toml::string(toml))
            .extract::<Value>()
            .unwrap()
    }

    fn catalog() -> PresetCatalog {
        let mut catalog = PresetCatalog::default();
        catalog.0.insert(
            "vehicles.sedan".into(),
            parse("mass = 1500.0\nwheelbase = 2.7\ndrivetrain_type = \"RWD\""),
        );
        catalog.0.insert(
            "vehicles.sedan_awd".into(),
            parse("from = \"vehicles.sedan\"\ndrivetrain_type = \"AWD\""),
        );
        catalog.0.insert(
            "tires.street".into(),
            parse("grip_multiplier = 1.0\nlateral_grip = 1.0"),
        );
        catalog.0.insert("loop.a".into(), parse("from = \"loop.b\""));
        catalog.0.insert("loop.b".into(), parse("from = \"loop.a\""));
        catalog
    }

    fn number(value: &Value, path: &[&str]) -> Option<f64> {
        let mut node = value;
        for key in path {
            node = node.as_dict()?.get(*key)?;
        }
        node.to_f64()
    }

    #[test]
    fn overrides_merge_over_presets() {
        let raw = parse(
            r#"
            name = "test"
            vehicle = { from = "vehicles.sedan", mass = 1800.0 }
            [tires.front]
            from = "tires.street"
            grip_multiplier = 0.9
            "#,
        );
        let resolved = resolve_value(&raw, &catalog()).unwrap();
        assert_eq!(number(&resolved, &["vehicle", "mass"]), Some(1800.0));
        assert_eq!(number(&resolved, &["vehicle", "wheelbase"]), Some(2.7));
        assert_eq!(number(&resolved, &["tires", "front", "grip_multiplier"]), Some(0.9));
        assert_eq!(number(&resolved, &["tires", "front", "lateral_grip"]), Some(1.0));

        let vehicle = resolved.as_dict().unwrap().get("vehicle").unwrap();
        assert!(!vehicle.as_dict().unwrap().contains_key("from"));
    }

    #[test]
    fn presets_can_build_on_presets() {
        let raw = parse("vehicle = { from = \"vehicles.sedan_awd\" }");
        let resolved = resolve_value(&raw, &catalog()).unwrap();
        let vehicle = resolved.as_dict().unwrap().get("vehicle").unwrap();
        let drivetrain = vehicle.as_dict().unwrap().get("drivetrain_type").unwrap();
        assert_eq!(drivetrain.as_str(), Some("AWD"));
        assert_eq!(number(&resolved, &["vehicle", "mass"]), Some(1500.0));
    }

    #[test]
    fn unknown_presets_and_cycles_are_errors() {
        let raw = parse("vehicle = { from = \"vehicles.hovercraft\" }");
        let err = resolve_value(&raw, &catalog()).unwrap_err();
        assert!(err.to_string().contains("hovercraft"));

        let raw = parse("vehicle = { from = \"loop.a\" }");
        assert!(matches!(
            resolve_value(&raw, &catalog()),
            Err(SimError::Resolve(_))
        ));
    }
}
