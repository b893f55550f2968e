//! Locating the per-member index files of an ensemble.
//!
//! File names follow the ETCCDI convention
//! `<var>_<freq>_<model>_<scenario>_<member>_<period>.nc`, e.g.
//! `txxETCCDI_mon_MPI-ESM_historical_r10i1850p3_185001-200512.nc`, from which the member label
//! is taken.
//!
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    errors::{Error, Result},
    index::Index,
    source::Source,
    store::Store,
};

/// Position of the member label among the `_` separated fields of a file name
const MEMBER_FIELD: usize = 4;

/// Glob pattern matching the files of all members of `index` from `source`
pub fn pattern(config: &Config, index: Index, source: Source) -> String {
    let path = match source {
        Source::Model => config
            .model_root
            .join(index.name())
            .join(&config.scenario)
            .join("*.nc"),
        Source::Reanalysis => config
            .reanalysis_root
            .join(format!("{}_*.nc", index.variable_name())),
    };

    path.to_string_lossy().into_owned()
}

/// Member files for `index` from `source`, in natural order, each with its member label.
///
pub fn discover(
    store: &dyn Store,
    config: &Config,
    index: Index,
    source: Source,
) -> Result<Vec<(String, PathBuf)>> {
    let pattern = pattern(config, index, source);
    let mut paths = store.list(&pattern)?;
    if paths.is_empty() {
        return Err(Error::NoFiles(pattern));
    }

    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    paths
        .into_iter()
        .map(|path| member_label(&path).map(|member| (member, path)))
        .collect()
}

/// The ensemble member a file belongs to, taken from its name
pub fn member_label(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('_').nth(MEMBER_FIELD))
        .filter(|member| !member.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::FileName(path.to_path_buf()))
}

/// Compare strings so that runs of digits are ordered by numeric value, e.g. "r2" < "r10".
///
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x = take_digits(&mut a);
                let y = take_digits(&mut b);
                let ordering = compare_numeric(&x, &y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }

    digits
}

/// Compare digit strings of arbitrary length by value, then by length so that "01" and "1"
/// still have a stable order.
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let xs = x.trim_start_matches('0');
    let ys = y.trim_start_matches('0');

    xs.len()
        .cmp(&ys.len())
        .then_with(|| xs.cmp(ys))
        .then_with(|| x.len().cmp(&y.len()))
}
