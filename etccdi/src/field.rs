//! Labeled arrays: a time series of gridded values for one ensemble member, and the time
//! collapsed field it is reduced to.
//!
use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD, Axis};

use crate::{
    errors::{Error, Result},
    time::{Calendar, Date},
};

#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(String),
    Numbers(Vec<f64>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            AttrValue::Numbers(_) => None,
        }
    }

    /// The first number of a numeric attribute
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Text(_) => None,
            AttrValue::Numbers(numbers) => numbers.first().copied(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        AttrValue::Text(text.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        AttrValue::Text(text)
    }
}

impl From<f64> for AttrValue {
    fn from(number: f64) -> Self {
        AttrValue::Numbers(vec![number])
    }
}

/// Descriptive metadata attached to an array or a coordinate
pub type Attributes = BTreeMap<String, AttrValue>;

/// Convenience accessor for text attributes
pub fn text_attr<'a>(attrs: &'a Attributes, name: &str) -> Option<&'a str> {
    attrs.get(name).and_then(AttrValue::as_text)
}

/// A labeled spatial axis, e.g. latitude
///
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub values: Array1<f64>,
    pub attrs: Attributes,
}

impl Coordinate {
    pub fn new<S: Into<String>>(name: S, values: Array1<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attrs: Attributes::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Index values of one ensemble member over time.
///
/// Axis 0 of `data` is time, the remaining axes follow `spatial`.
///
#[derive(Clone, Debug)]
pub struct TimeSeries {
    pub name: String,
    pub times: Vec<Date>,
    pub calendar: Calendar,
    pub spatial: Vec<Coordinate>,
    pub data: ArrayD<f64>,
    pub attrs: Attributes,
}

impl TimeSeries {
    pub fn new<S: Into<String>>(
        name: S,
        times: Vec<Date>,
        calendar: Calendar,
        spatial: Vec<Coordinate>,
        data: ArrayD<f64>,
    ) -> Result<Self> {
        let mut expected = vec![times.len()];
        expected.extend(spatial.iter().map(Coordinate::len));
        check_shape(data.shape(), &expected)?;

        Ok(Self {
            name: name.into(),
            times,
            calendar,
            spatial,
            data,
            attrs: Attributes::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn has_missing(&self) -> bool {
        self.data.iter().any(|value| value.is_nan())
    }

    /// Keep only the time steps at `indices`, in the given order
    pub fn select(&self, indices: &[usize]) -> TimeSeries {
        TimeSeries {
            name: self.name.clone(),
            times: indices.iter().map(|&i| self.times[i]).collect(),
            calendar: self.calendar,
            spatial: self.spatial.clone(),
            data: self.data.select(Axis(0), indices),
            attrs: self.attrs.clone(),
        }
    }
}

/// A spatial field with no time axis, e.g. one member's period mean
///
#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub spatial: Vec<Coordinate>,
    pub data: ArrayD<f64>,
    pub attrs: Attributes,
}

impl Field {
    pub fn new<S: Into<String>>(
        name: S,
        spatial: Vec<Coordinate>,
        data: ArrayD<f64>,
    ) -> Result<Self> {
        let expected: Vec<usize> = spatial.iter().map(Coordinate::len).collect();
        check_shape(data.shape(), &expected)?;

        Ok(Self {
            name: name.into(),
            spatial,
            data,
            attrs: Attributes::new(),
        })
    }

    pub fn units(&self) -> Option<&str> {
        text_attr(&self.attrs, "units")
    }
}

pub(crate) fn check_shape(actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual != expected {
        return Err(Error::GridMismatch(format!(
            "data has shape {actual:?}, coordinates describe {expected:?}"
        )));
    }

    Ok(())
}
