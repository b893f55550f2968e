//! Catalog of the ETCCDI climate extreme indices handled by this crate.
//!
//! Each index knows how its values are reduced to one value per year, what units and
//! descriptive names the aggregated output carries, and which quirks of the input files are
//! expected for it.
//!
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// How values of one calendar year are reduced to a single annual value.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// The index is already annual, every time step stands for one year
    Identity,
    Mean,
    Sum,
    Max,
    Min,
}

/// The physical kind of value an index holds. Only matters for unit conversion.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    /// An absolute temperature, converted between K and °C with an offset
    Temperature,

    /// A temperature range, K and °C only differ in name
    TemperatureDifference,

    /// A count of days
    Days,

    /// A percentage of days
    Percent,

    /// A precipitation amount or intensity
    Precipitation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Index {
    Fd,
    Su,
    Id,
    Tr,
    Gsl,
    Txx,
    Tnx,
    Txn,
    Tnn,
    Tn10p,
    Tx10p,
    Tn90p,
    Tx90p,
    Wsdi,
    Csdi,
    Dtr,
    Rx1day,
    Rx5day,
    Sdii,
    R10mm,
    R20mm,
    Cdd,
    Cwd,
    R95p,
    R99p,
    Prcptot,
}

struct Entry {
    name: &'static str,
    acronym: &'static str,
    description: &'static str,
    units: &'static str,
    aggregation: Aggregation,
    quantity: Quantity,
}

use Aggregation::{Identity, Max, Mean, Min, Sum};
use Quantity::{Days, Percent, Precipitation, Temperature, TemperatureDifference};

macro_rules! entry {
    (
        $name:literal,
        $acronym:literal,
        $units:literal,
        $aggregation:expr,
        $quantity:expr,
        $description:literal $(,)?
    ) => {
        Entry {
            name: $name,
            acronym: $acronym,
            description: $description,
            units: $units,
            aggregation: $aggregation,
            quantity: $quantity,
        }
    };
}

static FD: Entry = entry!(
    "fd",
    "FD",
    "days",
    Sum,
    Days,
    "Annual count of days when daily minimum temperature < 0°C",
);
static SU: Entry = entry!(
    "su",
    "SU",
    "days",
    Sum,
    Days,
    "Annual count of days when daily maximum temperature > 25°C",
);
static ID: Entry = entry!(
    "id",
    "ID",
    "days",
    Sum,
    Days,
    "Annual count of days when daily maximum temperature < 0°C",
);
static TR: Entry = entry!(
    "tr",
    "TR",
    "days",
    Sum,
    Days,
    "Annual count of days when daily minimum temperature > 20°C",
);
static GSL: Entry = entry!("gsl", "GSL", "days", Identity, Days, "Growing season length");
static TXX: Entry = entry!(
    "txx",
    "TXx",
    "°C",
    Max,
    Temperature,
    "Maximum value of daily maximum temperature",
);
static TNX: Entry = entry!(
    "tnx",
    "TNx",
    "°C",
    Max,
    Temperature,
    "Maximum value of daily minimum temperature",
);
static TXN: Entry = entry!(
    "txn",
    "TXn",
    "°C",
    Min,
    Temperature,
    "Minimum value of daily maximum temperature",
);
static TNN: Entry = entry!(
    "tnn",
    "TNn",
    "°C",
    Min,
    Temperature,
    "Minimum value of daily minimum temperature",
);
static TN10P: Entry = entry!(
    "tn10p",
    "TN10p",
    "%",
    Mean,
    Percent,
    "Percentage of days when daily minimum temperature < 10th percentile",
);
static TX10P: Entry = entry!(
    "tx10p",
    "TX10p",
    "%",
    Mean,
    Percent,
    "Percentage of days when daily maximum temperature < 10th percentile",
);
static TN90P: Entry = entry!(
    "tn90p",
    "TN90p",
    "%",
    Mean,
    Percent,
    "Percentage of days when daily minimum temperature > 90th percentile",
);
static TX90P: Entry = entry!(
    "tx90p",
    "TX90p",
    "%",
    Mean,
    Percent,
    "Percentage of days when daily maximum temperature > 90th percentile",
);
static WSDI: Entry = entry!("wsdi", "WSDI", "days", Identity, Days, "Warm spell duration index");
static CSDI: Entry = entry!("csdi", "CSDI", "days", Identity, Days, "Cold spell duration index");
static DTR: Entry = entry!(
    "dtr",
    "DTR",
    "°C",
    Mean,
    TemperatureDifference,
    "Mean difference between daily maximum and daily minimum temperature",
);
static RX1DAY: Entry = entry!(
    "rx1day",
    "Rx1day",
    "mm",
    Max,
    Precipitation,
    "Maximum 1-day precipitation",
);
static RX5DAY: Entry = entry!(
    "rx5day",
    "Rx5day",
    "mm",
    Max,
    Precipitation,
    "Maximum consecutive 5-day precipitation",
);
static SDII: Entry = entry!(
    "sdii",
    "SDII",
    "mm/day",
    Identity,
    Precipitation,
    "Simple precipitation intensity index",
);
static R10MM: Entry = entry!(
    "r10mm",
    "R10mm",
    "days",
    Identity,
    Days,
    "Annual count of days when daily precipitation >= 10mm",
);
static R20MM: Entry = entry!(
    "r20mm",
    "R20mm",
    "days",
    Identity,
    Days,
    "Annual count of days when daily precipitation >= 20mm",
);
static CDD: Entry = entry!("cdd", "CDD", "days", Identity, Days, "Maximum length of dry spell");
static CWD: Entry = entry!("cwd", "CWD", "days", Identity, Days, "Maximum length of wet spell");
static R95P: Entry = entry!(
    "r95p",
    "R95p",
    "mm",
    Identity,
    Precipitation,
    "Annual total precipitation when daily precipitation > 95th percentile",
);
static R99P: Entry = entry!(
    "r99p",
    "R99p",
    "mm",
    Identity,
    Precipitation,
    "Annual total precipitation when daily precipitation > 99th percentile",
);
static PRCPTOT: Entry = entry!(
    "prcptot",
    "PRCPTOT",
    "mm",
    Identity,
    Precipitation,
    "Annual total precipitation in wet days",
);

impl Index {
    pub const ALL: [Index; 26] = [
        Index::Fd,
        Index::Su,
        Index::Id,
        Index::Tr,
        Index::Gsl,
        Index::Txx,
        Index::Tnx,
        Index::Txn,
        Index::Tnn,
        Index::Tn10p,
        Index::Tx10p,
        Index::Tn90p,
        Index::Tx90p,
        Index::Wsdi,
        Index::Csdi,
        Index::Dtr,
        Index::Rx1day,
        Index::Rx5day,
        Index::Sdii,
        Index::R10mm,
        Index::R20mm,
        Index::Cdd,
        Index::Cwd,
        Index::R95p,
        Index::R99p,
        Index::Prcptot,
    ];

    fn entry(&self) -> &'static Entry {
        match self {
            Index::Fd => &FD,
            Index::Su => &SU,
            Index::Id => &ID,
            Index::Tr => &TR,
            Index::Gsl => &GSL,
            Index::Txx => &TXX,
            Index::Tnx => &TNX,
            Index::Txn => &TXN,
            Index::Tnn => &TNN,
            Index::Tn10p => &TN10P,
            Index::Tx10p => &TX10P,
            Index::Tn90p => &TN90P,
            Index::Tx90p => &TX90P,
            Index::Wsdi => &WSDI,
            Index::Csdi => &CSDI,
            Index::Dtr => &DTR,
            Index::Rx1day => &RX1DAY,
            Index::Rx5day => &RX5DAY,
            Index::Sdii => &SDII,
            Index::R10mm => &R10MM,
            Index::R20mm => &R20MM,
            Index::Cdd => &CDD,
            Index::Cwd => &CWD,
            Index::R95p => &R95P,
            Index::R99p => &R99P,
            Index::Prcptot => &PRCPTOT,
        }
    }

    /// Lower case short name, as used in directory and file names
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// Name of the variable holding this index in the per-member input files
    pub fn variable_name(&self) -> String {
        format!("{}ETCCDI", self.name())
    }

    /// Conventional mixed case acronym, e.g. "TXx". Used as `long_name` on output.
    pub fn acronym(&self) -> &'static str {
        self.entry().acronym
    }

    /// Human readable definition. Used as `description` on output.
    pub fn description(&self) -> &'static str {
        self.entry().description
    }

    pub fn units(&self) -> &'static str {
        self.entry().units
    }

    pub fn aggregation(&self) -> Aggregation {
        self.entry().aggregation
    }

    pub fn quantity(&self) -> Quantity {
        self.entry().quantity
    }

    /// Percentile indices are stamped one month late in the model output, so a file starting
    /// in February is expected for these and can be shifted back.
    pub fn has_calendar_offset(&self) -> bool {
        matches!(
            self,
            Index::Tn10p | Index::Tn90p | Index::Tx10p | Index::Tx90p
        )
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Index {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_suffix("etccdi").unwrap_or(&lower);

        Index::ALL
            .iter()
            .copied()
            .find(|index| index.name() == name)
            .ok_or_else(|| Error::UnknownIndex(s.to_string()))
    }
}
