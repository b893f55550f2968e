//! Temperature unit conversion between Kelvin and degrees Celsius.
//!
use ndarray::ArrayD;

use crate::{
    errors::{Error, Result},
    field::{text_attr, Attributes, Field},
    index::Quantity,
};

pub const CELSIUS: &str = "°C";
pub const KELVIN: &str = "K";

const ZERO_CELSIUS: f64 = 273.15;
const KELVIN_NAMES: [&str; 2] = ["k", "kelvin"];
const CELSIUS_NAMES: [&str; 7] = ["°c", "celsius", "degc", "deg c", "c", "degrees_c", "degree_c"];

fn is_kelvin(units: &str) -> bool {
    KELVIN_NAMES.contains(&units)
}

fn is_celsius(units: &str) -> bool {
    CELSIUS_NAMES.contains(&units)
}

/// Anything carrying gridded values with a `units` attribute
pub trait HasUnits {
    fn values_mut(&mut self) -> &mut ArrayD<f64>;
    fn attrs(&self) -> &Attributes;
    fn attrs_mut(&mut self) -> &mut Attributes;
}

/// Convert temperatures between Kelvin and degrees Celsius, based on the `units` attribute.
///
/// Converting to Celsius fails for units that aren't recognized as either. Converting to
/// Kelvin leaves unrecognized units untouched.
///
pub fn set_temperature_unit<T: HasUnits>(array: &mut T, to_celsius: bool) -> Result<()> {
    convert(array, to_celsius, ZERO_CELSIUS)
}

/// Relabel a temperature difference as Kelvin or degrees Celsius. Values are unchanged, as a
/// difference of one Kelvin is a difference of one degree Celsius.
///
pub fn set_temperature_difference_unit<T: HasUnits>(array: &mut T, to_celsius: bool) -> Result<()> {
    convert(array, to_celsius, 0.0)
}

/// Apply the conversion appropriate for `quantity`. Other quantities are left alone.
///
pub fn convert_quantity<T: HasUnits>(
    array: &mut T,
    quantity: Quantity,
    to_celsius: bool,
) -> Result<()> {
    match quantity {
        Quantity::Temperature => set_temperature_unit(array, to_celsius),
        Quantity::TemperatureDifference => set_temperature_difference_unit(array, to_celsius),
        _ => Ok(()),
    }
}

impl HasUnits for Field {
    fn values_mut(&mut self) -> &mut ArrayD<f64> {
        &mut self.data
    }

    fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }
}

fn convert<T: HasUnits>(array: &mut T, to_celsius: bool, offset: f64) -> Result<()> {
    let units = text_attr(array.attrs(), "units")
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if to_celsius {
        if is_kelvin(&units) {
            array.values_mut().mapv_inplace(|value| value - offset);
            array.attrs_mut().insert("units".into(), CELSIUS.into());
        } else if !is_celsius(&units) {
            return Err(Error::Units {
                from: units,
                to: CELSIUS,
            });
        }
    } else if is_celsius(&units) {
        array.values_mut().mapv_inplace(|value| value + offset);
        array.attrs_mut().insert("units".into(), KELVIN.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Coordinate;
    use ndarray::array;

    fn make_field(units: Option<&str>, values: ndarray::Array1<f64>) -> Field {
        let spatial = vec![Coordinate::new("site", array![0.0, 1.0])];
        let mut field = Field::new("t", spatial, values.into_dyn()).unwrap();
        if let Some(units) = units {
            field.attrs.insert("units".into(), units.into());
        }
        field
    }

    #[test]
    fn test_kelvin_to_celsius() {
        let mut field = make_field(Some("K"), array![273.15, 300.0]);
        set_temperature_unit(&mut field, true).unwrap();
        assert_eq!(field.units(), Some(CELSIUS));
        assert!((field.data[[0]] - 0.0).abs() < 1e-9);
        assert!((field.data[[1]] - 26.85).abs() < 1e-9);
    }

    #[test]
    fn test_celsius_stays_celsius() {
        for units in ["°C", "Celsius", "degC", "deg C", "C"] {
            let mut field = make_field(Some(units), array![1.0, 2.0]);
            set_temperature_unit(&mut field, true).unwrap();
            assert_eq!(field.data, array![1.0, 2.0].into_dyn());
            assert_eq!(field.units(), Some(units));
        }
    }

    #[test]
    fn test_unknown_to_celsius_fails() {
        let mut field = make_field(Some("days"), array![1.0, 2.0]);
        assert!(matches!(
            set_temperature_unit(&mut field, true),
            Err(Error::Units { from, to: CELSIUS }) if from == "days"
        ));

        let mut field = make_field(None, array![1.0, 2.0]);
        assert!(set_temperature_unit(&mut field, true).is_err());
    }

    #[test]
    fn test_celsius_to_kelvin() {
        let mut field = make_field(Some("degC"), array![0.0, -273.15]);
        set_temperature_unit(&mut field, false).unwrap();
        assert_eq!(field.units(), Some(KELVIN));
        assert!((field.data[[0]] - 273.15).abs() < 1e-9);
        assert!(field.data[[1]].abs() < 1e-9);
    }

    #[test]
    fn test_to_kelvin_leaves_others() {
        let mut field = make_field(Some("kelvin"), array![1.0, 2.0]);
        set_temperature_unit(&mut field, false).unwrap();
        assert_eq!(field.units(), Some("kelvin"));

        let mut field = make_field(Some("mm"), array![1.0, 2.0]);
        set_temperature_unit(&mut field, false).unwrap();
        assert_eq!(field.data, array![1.0, 2.0].into_dyn());
    }

    #[test]
    fn test_difference_only_relabels() {
        let mut field = make_field(Some("K"), array![8.5, 12.0]);
        convert_quantity(&mut field, Quantity::TemperatureDifference, true).unwrap();
        assert_eq!(field.units(), Some(CELSIUS));
        assert_eq!(field.data, array![8.5, 12.0].into_dyn());
    }

    #[test]
    fn test_other_quantities_untouched() {
        let mut field = make_field(Some("days"), array![8.5, 12.0]);
        convert_quantity(&mut field, Quantity::Days, true).unwrap();
        assert_eq!(field.units(), Some("days"));
    }
}
