mod client;
mod serde;

pub use client::{Client, FetchError, Result as NetResult};
pub use self::serde::{
    lenient_string_deserialize, lenient_vec_deserialize, value_to_text,
};
