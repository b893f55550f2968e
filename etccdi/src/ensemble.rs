//! Per-member fields stacked along a leading `member` axis.
//!
use std::collections::HashSet;

use ndarray::{stack, ArrayD, ArrayViewD, Axis};

use crate::{
    aggregate::reduce_axis,
    errors::{Error, Result},
    field::{check_shape, text_attr, Attributes, Coordinate, Field},
    index::{Aggregation, Index},
    units::HasUnits,
};

pub const MEMBER_DIM: &str = "member";

#[derive(Clone, Debug)]
pub struct Ensemble {
    /// Variable name, the short name of the index
    pub name: String,

    /// Member labels, in the order of axis 0 of `data`
    pub members: Vec<String>,

    pub spatial: Vec<Coordinate>,
    pub data: ArrayD<f64>,
    pub attrs: Attributes,
}

impl Ensemble {
    /// Build an ensemble directly from stacked data, e.g. as read back from a store.
    pub fn new<S: Into<String>>(
        name: S,
        members: Vec<String>,
        spatial: Vec<Coordinate>,
        data: ArrayD<f64>,
    ) -> Result<Self> {
        check_unique(&members)?;
        let mut expected = vec![members.len()];
        expected.extend(spatial.iter().map(Coordinate::len));
        check_shape(data.shape(), &expected)?;

        Ok(Self {
            name: name.into(),
            members,
            spatial,
            data,
            attrs: Attributes::new(),
        })
    }

    /// Concatenate per-member fields along a new leading member axis, in the order given.
    ///
    /// All fields must be on the same grid. Attributes of the first field are kept.
    ///
    pub fn stack<S: Into<String>>(name: S, members: Vec<(String, Field)>) -> Result<Self> {
        let (_, first) = members.first().ok_or(Error::NoMembers)?;
        let spatial = first.spatial.clone();
        let attrs = first.attrs.clone();

        for (label, field) in &members[1..] {
            check_same_grid(&spatial, &field.spatial, label)?;
        }

        let labels: Vec<String> = members.iter().map(|(label, _)| label.clone()).collect();
        check_unique(&labels)?;

        let views: Vec<ArrayViewD<f64>> =
            members.iter().map(|(_, field)| field.data.view()).collect();
        let data = stack(Axis(0), &views).map_err(|err| Error::GridMismatch(err.to_string()))?;

        Ok(Self {
            name: name.into(),
            members: labels,
            spatial,
            data,
            attrs,
        })
    }

    /// Replace all attributes with the catalog metadata for `index`
    pub fn with_metadata(mut self, index: Index) -> Self {
        self.attrs = Attributes::new();
        self.attrs.insert("units".into(), index.units().into());
        self.attrs.insert("long_name".into(), index.acronym().into());
        self.attrs.insert("description".into(), index.description().into());

        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn units(&self) -> Option<&str> {
        text_attr(&self.attrs, "units")
    }

    /// The field of a single member
    pub fn member(&self, label: &str) -> Option<Field> {
        let position = self.members.iter().position(|member| member == label)?;
        Some(Field {
            name: self.name.clone(),
            spatial: self.spatial.clone(),
            data: self.data.index_axis(Axis(0), position).to_owned(),
            attrs: self.attrs.clone(),
        })
    }

    /// Mean over all members, skipping missing values
    pub fn mean(&self) -> Field {
        Field {
            name: self.name.clone(),
            spatial: self.spatial.clone(),
            data: reduce_axis(self.data.view(), Axis(0), Aggregation::Mean),
            attrs: self.attrs.clone(),
        }
    }
}

impl HasUnits for Ensemble {
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

fn check_same_grid(expected: &[Coordinate], actual: &[Coordinate], member: &str) -> Result<()> {
    let describe = |spatial: &[Coordinate]| -> Vec<(String, usize)> {
        spatial
            .iter()
            .map(|coord| (coord.name.clone(), coord.len()))
            .collect()
    };

    let (expected, actual) = (describe(expected), describe(actual));
    if expected != actual {
        return Err(Error::GridMismatch(format!(
            "member {member} has grid {actual:?}, expected {expected:?}"
        )));
    }

    Ok(())
}

fn check_unique(labels: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(Error::DuplicateMember(label.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn field(values: Array1<f64>) -> Field {
        let n = values.len();
        let spatial = vec![Coordinate::new("lon", Array1::linspace(0.0, 10.0, n))];
        Field::new("txx", spatial, values.into_dyn()).unwrap()
    }

    #[test]
    fn test_stack() {
        let ensemble = Ensemble::stack(
            "txx",
            vec![
                ("r1i1p1".to_string(), field(array![1.0, 2.0, 3.0])),
                ("r2i1p1".to_string(), field(array![4.0, 5.0, 6.0])),
            ],
        )
        .unwrap();

        assert_eq!(ensemble.members, vec!["r1i1p1", "r2i1p1"]);
        assert_eq!(ensemble.data.shape(), &[2, 3]);
        assert_eq!(ensemble.data, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn());
        assert_eq!(ensemble.spatial[0].name, "lon");
        assert_eq!(ensemble.len(), 2);
    }

    #[test]
    fn test_stack_empty() {
        assert!(matches!(Ensemble::stack("txx", vec![]), Err(Error::NoMembers)));
    }

    #[test]
    fn test_stack_grid_mismatch() {
        let result = Ensemble::stack(
            "txx",
            vec![
                ("r1".to_string(), field(array![1.0, 2.0, 3.0])),
                ("r2".to_string(), field(array![4.0, 5.0])),
            ],
        );
        assert!(matches!(result, Err(Error::GridMismatch(message)) if message.contains("r2")));
    }

    #[test]
    fn test_stack_duplicate_member() {
        let result = Ensemble::stack(
            "txx",
            vec![
                ("r1".to_string(), field(array![1.0])),
                ("r1".to_string(), field(array![4.0])),
            ],
        );
        assert!(matches!(result, Err(Error::DuplicateMember(label)) if label == "r1"));
    }

    #[test]
    fn test_with_metadata() {
        let ensemble = Ensemble::stack("txx", vec![("r1".to_string(), field(array![1.0]))])
            .unwrap()
            .with_metadata(Index::Txx);
        assert_eq!(ensemble.units(), Some("°C"));
        assert_eq!(text_attr(&ensemble.attrs, "long_name"), Some("TXx"));
        assert_eq!(
            text_attr(&ensemble.attrs, "description"),
            Some(Index::Txx.description())
        );
    }

    #[test]
    fn test_member_and_mean() {
        let ensemble = Ensemble::stack(
            "txx",
            vec![
                ("r1".to_string(), field(array![1.0, f64::NAN])),
                ("r2".to_string(), field(array![3.0, 5.0])),
            ],
        )
        .unwrap();

        let r2 = ensemble.member("r2").unwrap();
        assert_eq!(r2.data, array![3.0, 5.0].into_dyn());
        assert!(ensemble.member("r3").is_none());

        let mean = ensemble.mean();
        assert_eq!(mean.data, array![2.0, 5.0].into_dyn());
    }

    #[test]
    fn test_new_checks_shape() {
        let spatial = vec![Coordinate::new("lon", array![0.0, 1.0])];
        let members = vec!["a".to_string(), "b".to_string()];
        let data = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        assert!(Ensemble::new("x", members.clone(), spatial.clone(), data).is_ok());

        let data = array![[1.0, 2.0]].into_dyn();
        assert!(Ensemble::new("x", members, spatial, data).is_err());
    }
}
