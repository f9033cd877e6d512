use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::renewal::dates;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpiryError {
    #[error("expiry date out of range: {base} + {years} years")]
    OutOfRange { base: NaiveDate, years: u32 },
}

/// Where the new expiry date is counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryMode {
    /// First payment: expiry = purchase date + term.
    #[default]
    InitialPurchase,
    /// Extension: expiry = current expiry + term.
    Renewal,
}

/// Compute the expiry produced by paying `years` from `base` in either mode.
///
/// Both modes count forward from the supplied base; the mode decides what
/// that base means to the caller.
pub fn compute_expiry(_mode: ExpiryMode, base: NaiveDate, years: u32) -> Result<NaiveDate, ExpiryError> {
    dates::add_years(base, years).ok_or(ExpiryError::OutOfRange { base, years })
}

/// Form-level expiry state.
///
/// In initial-purchase mode the expiry is derived from the purchase date and
/// cannot be typed in. In renewal mode the current expiry is a required
/// input and the new expiry is derived from it. The derived value lives in
/// its own slot, so recomputing never feeds its own output back in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryForm {
    mode: ExpiryMode,
    years: Option<u32>,
    purchase_date: Option<NaiveDate>,
    current_expiry: Option<NaiveDate>,
    computed: Option<NaiveDate>,
}

impl ExpiryForm {
    pub fn new(mode: ExpiryMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ExpiryMode {
        self.mode
    }

    /// Switch modes, clearing the inputs that belong to the other mode.
    pub fn set_mode(&mut self, mode: ExpiryMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        match mode {
            ExpiryMode::InitialPurchase => self.current_expiry = None,
            ExpiryMode::Renewal => self.purchase_date = None,
        }
        self.recompute();
    }

    pub fn set_years(&mut self, years: Option<u32>) {
        self.years = years.filter(|y| *y >= 1);
        self.recompute();
    }

    /// Ignored outside initial-purchase mode.
    pub fn set_purchase_date(&mut self, date: Option<NaiveDate>) {
        if self.mode == ExpiryMode::InitialPurchase {
            self.purchase_date = date;
            self.recompute();
        }
    }

    /// Ignored outside renewal mode; the expiry is read-only there.
    pub fn set_current_expiry(&mut self, date: Option<NaiveDate>) {
        if self.mode == ExpiryMode::Renewal {
            self.current_expiry = date;
            self.recompute();
        }
    }

    /// Whether the user types the expiry directly.
    pub fn expiry_is_input(&self) -> bool {
        self.mode == ExpiryMode::Renewal
    }

    /// The date the term is counted from in the current mode.
    pub fn base_date(&self) -> Option<NaiveDate> {
        match self.mode {
            ExpiryMode::InitialPurchase => self.purchase_date,
            ExpiryMode::Renewal => self.current_expiry,
        }
    }

    pub fn computed_expiry(&self) -> Option<NaiveDate> {
        self.computed
    }

    /// Re-derive the expiry from the current inputs. Idempotent.
    pub fn recompute(&mut self) -> Option<NaiveDate> {
        self.computed = match (self.base_date(), self.years) {
            (Some(base), Some(years)) => compute_expiry(self.mode, base, years).ok(),
            _ => None,
        };
        self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn initial_purchase_counts_from_purchase_date() {
        assert_eq!(
            compute_expiry(ExpiryMode::InitialPurchase, ymd(2025, 1, 1), 1),
            Ok(ymd(2026, 1, 1))
        );
    }

    #[test]
    fn renewal_counts_from_current_expiry() {
        assert_eq!(
            compute_expiry(ExpiryMode::Renewal, ymd(2026, 1, 1), 2),
            Ok(ymd(2028, 1, 1))
        );
    }

    #[test]
    fn out_of_range_is_an_error() {
        assert!(compute_expiry(ExpiryMode::Renewal, ymd(2026, 1, 1), 500_000).is_err());
    }

    #[test]
    fn form_derives_expiry_in_initial_mode() {
        let mut form = ExpiryForm::new(ExpiryMode::InitialPurchase);
        assert!(!form.expiry_is_input());

        form.set_purchase_date(Some(ymd(2025, 1, 1)));
        assert_eq!(form.computed_expiry(), None);

        form.set_years(Some(1));
        assert_eq!(form.computed_expiry(), Some(ymd(2026, 1, 1)));

        form.set_current_expiry(Some(ymd(2030, 1, 1)));
        assert_eq!(form.computed_expiry(), Some(ymd(2026, 1, 1)));
    }

    #[test]
    fn recompute_is_idempotent_in_renewal_mode() {
        let mut form = ExpiryForm::new(ExpiryMode::Renewal);
        form.set_years(Some(2));
        form.set_current_expiry(Some(ymd(2026, 1, 1)));

        let first = form.recompute();
        let second = form.recompute();
        let third = form.recompute();
        assert_eq!(first, Some(ymd(2028, 1, 1)));
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn switching_modes_clears_the_other_base() {
        let mut form = ExpiryForm::new(ExpiryMode::InitialPurchase);
        form.set_years(Some(1));
        form.set_purchase_date(Some(ymd(2025, 1, 1)));
        assert!(form.computed_expiry().is_some());

        form.set_mode(ExpiryMode::Renewal);
        assert!(form.expiry_is_input());
        assert_eq!(form.base_date(), None);
        assert_eq!(form.computed_expiry(), None);

        form.set_current_expiry(Some(ymd(2026, 6, 30)));
        assert_eq!(form.computed_expiry(), Some(ymd(2027, 6, 30)));

        form.set_mode(ExpiryMode::InitialPurchase);
        assert_eq!(form.base_date(), None);
        assert_eq!(form.computed_expiry(), None);
    }

    #[test]
    fn zero_years_never_derives() {
        let mut form = ExpiryForm::new(ExpiryMode::InitialPurchase);
        form.set_purchase_date(Some(ymd(2025, 1, 1)));
        form.set_years(Some(0));
        assert_eq!(form.computed_expiry(), None);
    }
}
