/// Round a dollar amount to cents. Applied at every computation boundary so
/// running totals stay comparable across passes.
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
