use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SpedError;

/// Company registration data emitted in block 0 of every layout.
///
/// Every field except the legal name is optional: onboarding data in the
/// surrounding system is incremental, and a half-registered company must
/// still be able to produce a structurally valid file (with blank fields
/// flagged for manual review by the accountant).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Company {
    /// Legal name (razão social), truncated to 100 characters on output.
    pub name: String,
    /// Trading name (nome fantasia); falls back to the legal name.
    pub trading_name: Option<String>,
    /// CNPJ, with or without punctuation — only digits are emitted.
    pub cnpj: Option<String>,
    /// State code (UF, e.g. "SP").
    pub state: Option<String>,
    /// IBGE municipality code (7 digits).
    pub city_code: Option<String>,
    /// Postal code (CEP).
    pub postal_code: Option<String>,
    /// Street address (logradouro).
    pub street: Option<String>,
    /// Street number.
    pub number: Option<String>,
    /// District (bairro).
    pub district: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// One incoming NF-e, reduced to the totals the EFD layouts need.
///
/// Amounts are optional because upstream capture (XML import, OCR) can leave
/// gaps; a missing amount is emitted as the zero value, never skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invoice {
    /// Document number (NUM_DOC).
    pub number: String,
    /// 44-digit NF-e access key (CHV_NFE).
    pub access_key: Option<String>,
    /// Issue date (DT_DOC).
    pub issue_date: Option<NaiveDate>,
    /// Total document value (VL_DOC).
    pub total_value: Option<Decimal>,
    /// ICMS calculation base (VL_BC_ICMS).
    pub icms_base: Option<Decimal>,
    /// ICMS amount (VL_ICMS).
    pub icms_value: Option<Decimal>,
    /// IPI amount (VL_IPI).
    pub ipi_value: Option<Decimal>,
    /// PIS amount (VL_PIS).
    pub pis_value: Option<Decimal>,
    /// COFINS amount (VL_COFINS).
    pub cofins_value: Option<Decimal>,
}

/// One expense receipt (cupom fiscal), emitted in block F of EFD
/// Contribuições as an acquisition generating PIS/COFINS credit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expense {
    /// Receipt date.
    pub receipt_date: Option<NaiveDate>,
    /// Total amount paid.
    pub total_amount: Option<Decimal>,
}

/// An inclusive bookkeeping period.
///
/// Construction is the only place [`SpedError::InvalidPeriod`] can arise;
/// a `Period` in hand is always well ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Create a period, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SpedError> {
        if start > end {
            return Err(SpedError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the period.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the period.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_accepts_single_day() {
        let p = Period::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(p.start(), p.end());
    }

    #[test]
    fn period_rejects_reversed_dates() {
        let err = Period::new(date(2024, 3, 2), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, SpedError::InvalidPeriod { .. }));
    }
}
