pub mod cities;
pub mod enquiries;
pub mod franchises;
