pub mod standoff;
pub mod tagged;

pub use standoff::{parse_standoff, DEFAULT_SOURCE};
pub use tagged::{typename_and_species, ConvertError, Mention, TaggedDocument};
