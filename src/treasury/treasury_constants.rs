use lazy_static::lazy_static;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

lazy_static! {
    /// Historical annual IPCA by year, in percent. Should eventually come
    /// from the central bank series instead of a static table.
    pub static ref ANNUAL_INFLATION_BY_YEAR: HashMap<i32, Decimal> = {
        let mut table = HashMap::new();
        table.insert(2019, dec!(4.31));
        table.insert(2020, dec!(4.52));
        table.insert(2021, dec!(10.06));
        table.insert(2022, dec!(5.79));
        table.insert(2023, dec!(4.62));
        table
    };
}

/// Flat annual inflation estimate, in percent, for years absent from the table.
pub const DEFAULT_ANNUAL_INFLATION: Decimal = dec!(4.5);

/// Face value a treasury bond converges to at maturity.
pub const TREASURY_FACE_VALUE: Decimal = dec!(1000);
