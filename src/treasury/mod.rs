pub(crate) mod coupon_calculator;
pub(crate) mod treasury_constants;
pub(crate) mod treasury_model;
pub(crate) mod yield_calculator;

// Re-export the public interface
pub use coupon_calculator::{semiannual_payment_schedule, total_payments, upcoming_payments};
pub use treasury_constants::{ANNUAL_INFLATION_BY_YEAR, DEFAULT_ANNUAL_INFLATION};
pub use treasury_model::{AccumulatedReturn, PaymentStatus, SemiannualPayment, UpcomingPayment};
pub use yield_calculator::{
    accumulated_inflation, accumulated_return, estimated_annual_inflation,
    inflation_linked_yield, inflation_linked_yield_semiannual, theoretical_price,
};
