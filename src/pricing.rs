//! Price arithmetic shared by the cart display, order creation and order history.
//!
//! Amounts are kept in major units (`10.50` means ten euros fifty). The payment
//! provider wants integer minor units, see [`to_minor_units`].

use derive_more::{Display, Error};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Currency of every amount handled by the storefront
pub const CURRENCY: &str = "EUR";

/// Fixed delivery charge added once per order
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);

#[derive(Debug, Display, Error, PartialEq)]
pub enum PricingError {
    #[display("negative amount {_0}")]
    Negative(#[error(not(source))] Decimal),
    #[display("amount {_0} is not a whole number of cents")]
    FractionalCents(#[error(not(source))] Decimal),
    #[display("amount {_0} does not fit in minor units")]
    Overflow(#[error(not(source))] Decimal),
}

/// Anything priced per unit and ordered in some quantity.
pub trait PricedLine {
    fn unit_price(&self) -> Decimal;
    fn quantity(&self) -> u32;

    fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity())
    }
}

/// Sum of all line totals, without delivery
pub fn subtotal<'a, L>(lines: impl IntoIterator<Item = &'a L>) -> Decimal
where
    L: PricedLine + 'a,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |total, line| total + line.line_total())
}

/// What the customer pays: line items plus one delivery fee.
pub fn order_total<'a, L>(lines: impl IntoIterator<Item = &'a L>) -> Decimal
where
    L: PricedLine + 'a,
{
    subtotal(lines) + DELIVERY_FEE
}

/// Convert a major-unit amount to the integer minor units the provider expects.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::Negative(amount));
    }
    let cents = amount * Decimal::ONE_HUNDRED;
    if !cents.fract().is_zero() {
        return Err(PricingError::FractionalCents(amount));
    }
    cents.to_i64().ok_or(PricingError::Overflow(amount))
}

/// Render an amount for display, e.g. `€27.00`.
pub fn format_price(amount: Decimal) -> String {
    format!("€{:.2}", amount.round_dp(2))
}
