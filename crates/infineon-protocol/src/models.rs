//! Controller model catalog.
//!
//! Raw byte values and physical units are related by per-model affine
//! transforms. The shunt and divider networks differ between the FET count
//! variants, so each model carries its own coefficients, stored explicitly
//! in both directions.

use crate::error::UnknownModel;

/// Affine mapping `f(x) = mul * x + add`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub mul: f64,
    pub add: f64,
}

impl Affine {
    pub const fn new(mul: f64, add: f64) -> Self {
        Self { mul, add }
    }

    pub fn apply(&self, x: f64) -> f64 {
        self.mul * x + self.add
    }
}

/// One EB3 hardware variant and its unit transforms.
#[derive(Debug, Clone, Copy)]
pub struct ControllerModel {
    pub name: &'static str,
    pub phase_to_raw: Affine,
    pub phase_to_display: Affine,
    pub battery_to_raw: Affine,
    pub battery_to_display: Affine,
    pub voltage_to_raw: Affine,
    pub voltage_to_display: Affine,
}

const fn model(
    name: &'static str,
    phase: f64,
    battery: f64,
    voltage: f64,
) -> ControllerModel {
    // Voltage sense carries a one-count offset; currents are pure scaling.
    ControllerModel {
        name,
        phase_to_raw: Affine::new(phase, 0.0),
        phase_to_display: Affine::new(1.0 / phase, 0.0),
        battery_to_raw: Affine::new(battery, 0.0),
        battery_to_display: Affine::new(1.0 / battery, 0.0),
        voltage_to_raw: Affine::new(voltage, -1.0),
        voltage_to_display: Affine::new(1.0 / voltage, 1.0 / voltage),
    }
}

const MODELS: [ControllerModel; 5] = [
    model("EB306", 3.0, 6.0, 3.9),
    model("EB309", 2.0, 4.0, 3.9),
    model("EB312", 1.5, 3.0, 3.25),
    model("EB315", 1.25, 2.5, 3.25),
    model("EB318", 1.0, 2.0, 2.78),
];

/// Immutable model table. Indexed 1-based; index 0 is reserved.
#[derive(Debug)]
pub struct Catalog {
    models: &'static [ControllerModel],
}

static CATALOG: Catalog = Catalog { models: &MODELS };

/// The EB3 controller catalog.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// All models, in index order (index = position + 1).
    pub fn models(&self) -> &'static [ControllerModel] {
        self.models
    }

    /// Model lookup by 1-based index.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownModel`] when `index` is outside `1..=len`.
    pub fn model(&self, index: i64) -> Result<&'static ControllerModel, UnknownModel> {
        if index < 1 {
            return Err(UnknownModel(index));
        }
        self.models
            .get(index as usize - 1)
            .ok_or(UnknownModel(index))
    }

    /// Display name for an index, falling back to `"???"` so listing code
    /// always has something to show.
    pub fn model_name(&self, index: i64) -> &'static str {
        self.model(index).map(|m| m.name).unwrap_or("???")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lookup_is_one_based() {
        let cat = catalog();
        assert_eq!(cat.model(1).expect("first model").name, "EB306");
        assert_eq!(cat.model(5).expect("last model").name, "EB318");
    }

    #[test]
    fn test_index_zero_is_reserved() {
        assert!(catalog().model(0).is_err());
        assert_eq!(catalog().model_name(0), "???");
    }

    #[test]
    fn test_out_of_range_indexes_fall_back() {
        assert!(catalog().model(6).is_err());
        assert!(catalog().model(-3).is_err());
        assert_eq!(catalog().model_name(6), "???");
        assert_eq!(catalog().model_name(-3), "???");
    }

    #[test]
    fn test_transforms_are_inverse_pairs() {
        for m in catalog().models() {
            for amps in [0.0, 12.5, 40.0, 75.0] {
                let raw = m.phase_to_raw.apply(amps);
                let back = m.phase_to_display.apply(raw);
                assert!((back - amps).abs() < 1e-9, "{}: phase {amps}", m.name);

                let raw = m.battery_to_raw.apply(amps);
                let back = m.battery_to_display.apply(raw);
                assert!((back - amps).abs() < 1e-9, "{}: battery {amps}", m.name);
            }
            for volts in [20.0, 42.0, 58.0, 84.0] {
                let raw = m.voltage_to_raw.apply(volts);
                let back = m.voltage_to_display.apply(raw);
                assert!((back - volts).abs() < 1e-9, "{}: voltage {volts}", m.name);
            }
        }
    }
}
