use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;

use crate::index::Index;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown ETCCDI index: {0}")]
    UnknownIndex(String),

    #[error("nan found in index={index}, member={member}")]
    MissingValues { index: Index, member: String },

    #[error("file does not start in January: index={index}, member={member}, month={month}")]
    CalendarStart {
        index: Index,
        member: String,
        month: u32,
    },

    #[error("no time steps between {start} and {end}")]
    EmptyPeriod { start: i32, end: i32 },

    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    #[error("duplicate ensemble member: {0}")]
    DuplicateMember(String),

    #[error("no ensemble members to stack")]
    NoMembers,

    #[error("no files found matching {0}")]
    NoFiles(String),

    #[error("cannot derive ensemble member from file name: {}", .0.display())]
    FileName(PathBuf),

    #[error("cannot convert from unit '{from}' to {to}")]
    Units { from: String, to: &'static str },

    #[error("invalid time units: {0}")]
    TimeUnits(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    IO(#[from] io::Error),
}

pub type Result<T> = result::Result<T, Error>;
