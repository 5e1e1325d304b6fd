//! Referral bonus math: direct and second-tier credits.

use crate::domain::Amount;

/// The grand-referrer earns a quarter of the direct bonus.
const GRAND_SHARE_DIVISOR: i64 = 4;

/// Secondary bonus paid to the referrer's own referrer.
pub fn grand_referrer_bonus(direct: Amount) -> Amount {
    direct / Amount::from(GRAND_SHARE_DIVISOR)
}
