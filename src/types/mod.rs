//! The HDB type system (§4.2): wire `TypeId`s, HANA's own temporal encodings, and the
//! 16-byte fixed-point decimal layout.

mod daydate;
mod decimal;
mod longdate;
mod seconddate;
mod secondtime;
mod type_id;

pub use daydate::DayDate;
pub use longdate::LongDate;
pub use seconddate::SecondDate;
pub use secondtime::SecondTime;
pub use type_id::TypeId;

pub(crate) use decimal::{decode as decode_decimal, encode as encode_decimal, null_raw as decimal_null_raw};
pub use decimal::type_for_precision;
