mod aggregate;
mod config;
mod discover;
mod ensemble;
mod errors;
mod field;
mod index;
mod pipeline;
mod source;
mod store;
mod time;
mod units;
mod validate;

#[cfg(test)]
mod testing;

pub use aggregate::aggregate_period;
pub use aggregate::annual_values;
pub use aggregate::reduce;
pub use aggregate::select_years;
pub use aggregate::Annual;
pub use config::Config;
pub use discover::discover;
pub use discover::member_label;
pub use discover::natural_cmp;
pub use ensemble::Ensemble;
pub use ensemble::MEMBER_DIM;
pub use errors::Error;
pub use errors::Result;
pub use field::text_attr;
pub use field::AttrValue;
pub use field::Attributes;
pub use field::Coordinate;
pub use field::Field;
pub use field::TimeSeries;
pub use index::Aggregation;
pub use index::Index;
pub use index::Quantity;
pub use pipeline::global_attributes;
pub use pipeline::load_aggregate;
pub use pipeline::load_data;
pub use pipeline::output_path;
pub use pipeline::run;
pub use pipeline::Outcome;
pub use source::Source;
pub use store::Store;
pub use time::Calendar;
pub use time::Date;
pub use time::TimeUnits;
pub use units::convert_quantity;
pub use units::set_temperature_unit;
pub use units::HasUnits;
pub use validate::check_missing;
pub use validate::correct_calendar;
