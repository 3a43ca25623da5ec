pub mod math;
pub mod poly;
pub mod radix;
