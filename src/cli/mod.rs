pub mod compare;
pub mod convert;
