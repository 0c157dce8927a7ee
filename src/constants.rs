/// Decimal precision for stored monetary amounts
pub const DECIMAL_PRECISION: u32 = 6;
