//! Route and phone number ingestion.

mod parser;
mod records;

pub use parser::{
    load_routes, load_routes_from_path, parse_number_line, parse_route_line, read_numbers,
    read_numbers_from_path, IngestError, IngestStats, InvalidRecordPolicy, RecordError,
};
pub use records::{PhoneNumber, RouteRecord};
