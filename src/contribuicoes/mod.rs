//! EFD Contribuições (PIS/COFINS) file generation.
//!
//! Layout per the Receita Federal practical guide, version code 006:
//!
//! - Block 0: opening, company identification, apuração regime
//! - Block A: service fiscal documents (no movement)
//! - Block C: goods fiscal documents (NF-e)
//! - Block F: other documents and operations (expense receipts)
//! - Block M: contribution and credit apuração
//! - Block 1: bookkeeping complement (no movement)
//! - Block 9: control and closing

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::{Company, Expense, Invoice, Period, SpedError};
use crate::engine::{RecordStream, fmt};

/// Fixed block sequence of the layout; block 9 is appended by the engine.
const BLOCK_ORDER: &[char] = &['0', 'A', 'C', 'F', 'M', '1'];

/// Bookkeeping type emitted in record 0000 (TIPO_ESCRIT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookkeepingType {
    /// Original filing.
    Original,
    /// Rectifying filing.
    Rectification,
}

impl BookkeepingType {
    fn code(&self) -> &'static str {
        match self {
            Self::Original => "0",
            Self::Rectification => "1",
        }
    }
}

/// Configuration for the EFD Contribuições export.
///
/// The PIS/COFINS rates are deliberately injectable: which rates apply is a
/// tax-law question the serialization engine does not decide. The defaults
/// are the non-cumulative regime values (1.65% / 7.60%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContribuicoesConfig {
    /// Layout version code (COD_VER), "006" for the current guide.
    pub layout_version: String,
    /// Bookkeeping type (TIPO_ESCRIT).
    pub bookkeeping: BookkeepingType,
    /// PIS/PASEP rate, percent.
    pub pis_rate: Decimal,
    /// COFINS rate, percent.
    pub cofins_rate: Decimal,
    /// Accountant name emitted in record 0100.
    pub accountant_name: String,
    /// Accountant CRC registration number.
    pub accountant_crc: String,
}

impl Default for ContribuicoesConfig {
    fn default() -> Self {
        Self {
            layout_version: "006".into(),
            bookkeeping: BookkeepingType::Original,
            pis_rate: dec!(1.65),
            cofins_rate: dec!(7.60),
            accountant_name: "CONTADOR RESPONSÁVEL".into(),
            accountant_crc: "CRC".into(),
        }
    }
}

/// Builder for [`ContribuicoesConfig`].
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use sped::contribuicoes::ContribuicoesConfigBuilder;
///
/// let config = ContribuicoesConfigBuilder::new()
///     .rates(dec!(0.65), dec!(3.00)) // cumulative regime
///     .accountant("MARIA DA SILVA", "CRC-CE 12345/O-6")
///     .build();
/// assert_eq!(config.pis_rate, dec!(0.65));
/// ```
#[derive(Debug, Default)]
pub struct ContribuicoesConfigBuilder {
    config: ContribuicoesConfig,
}

impl ContribuicoesConfigBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bookkeeping type.
    pub fn bookkeeping(mut self, bookkeeping: BookkeepingType) -> Self {
        self.config.bookkeeping = bookkeeping;
        self
    }

    /// Set the PIS and COFINS rates (percent).
    pub fn rates(mut self, pis: Decimal, cofins: Decimal) -> Self {
        self.config.pis_rate = pis;
        self.config.cofins_rate = cofins;
        self
    }

    /// Set the accountant identification for record 0100.
    pub fn accountant(mut self, name: impl Into<String>, crc: impl Into<String>) -> Self {
        self.config.accountant_name = name.into();
        self.config.accountant_crc = crc.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ContribuicoesConfig {
        self.config
    }
}

/// Download file name encoding the period:
/// `efd_contribuicoes_YYYY-MM-DD_YYYY-MM-DD.txt`.
pub fn export_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "efd_contribuicoes_{}_{}.txt",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// Generate a complete EFD Contribuições file.
///
/// `invoices` and `expenses` must already be in the order the filing
/// requires; rows are emitted as given, never re-sorted.
///
/// # Errors
///
/// [`SpedError::InvalidPeriod`] if `start` is after `end`.
pub fn to_efd_contribuicoes(
    company: &Company,
    start: NaiveDate,
    end: NaiveDate,
    invoices: &[Invoice],
    expenses: &[Expense],
    config: &ContribuicoesConfig,
) -> Result<String, SpedError> {
    let period = Period::new(start, end)?;

    let mut out = RecordStream::new();
    block_0(&mut out, company, &period, config);
    block_a(&mut out);
    block_c(&mut out, invoices, config);
    block_f(&mut out, expenses, config);
    block_m(&mut out, invoices, config);
    block_1(&mut out);
    Ok(out.finish(BLOCK_ORDER))
}

fn pct(base: Decimal, rate: Decimal) -> Decimal {
    base * rate / dec!(100)
}

/// Block 0 — opening, identification, apuração regime.
fn block_0(
    out: &mut RecordStream,
    company: &Company,
    period: &Period,
    config: &ContribuicoesConfig,
) {
    // 0000 — digital file opening
    out.write(
        "0000",
        &[
            &config.layout_version,
            config.bookkeeping.code(),
            "0", // IND_SIT_ESP
            "",  // NUM_REC_ANTERIOR
            &fmt::date(Some(period.start())),
            &fmt::date(Some(period.end())),
            &fmt::text(Some(company.name.as_str()), 100),
            &fmt::digits(company.cnpj.as_deref()),
            &fmt::text(company.state.as_deref(), 2),
            &fmt::text(company.city_code.as_deref(), 7),
            "",  // SUFRAMA
            "1", // IND_NAT_PJ — lucro real
            "0", // IND_ATIV — industrial
        ],
    );

    out.write("0001", &["0"]);

    // 0100 — accountant
    out.write(
        "0100",
        &[
            &fmt::text(Some(config.accountant_name.as_str()), 100),
            "", // CPF
            &config.accountant_crc,
            "", // office CNPJ
            "", // CEP
            "", // street
            "", // number
            "", // complement
            "", // district
            "", // phone
            "", // fax
            "", // email
            &fmt::text(company.city_code.as_deref(), 7),
        ],
    );

    // 0110 — apuração regime
    out.write(
        "0110",
        &[
            "1", // COD_INC_TRIB — consolidated
            "2", // IND_APRO_CRED — proportional apportionment
            "1", // COD_TIPO_CONT
            "",  // IND_REG_CUM
        ],
    );
}

/// Block A — service documents, filed without movement.
fn block_a(out: &mut RecordStream) {
    out.write("A001", &["1"]);
}

/// Block C — goods fiscal documents with per-item PIS/COFINS detail.
fn block_c(out: &mut RecordStream, invoices: &[Invoice], config: &ContribuicoesConfig) {
    let has_movement = !invoices.is_empty();
    out.write("C001", &[if has_movement { "0" } else { "1" }]);

    for inv in invoices {
        let total = inv.total_value.unwrap_or(Decimal::ZERO);
        let pis = pct(total, config.pis_rate);
        let cofins = pct(total, config.cofins_rate);

        // C100 — document header
        out.write(
            "C100",
            &[
                "0",  // IND_OPER — aquisição
                "0",  // IND_EMIT — terceiros
                "",   // COD_PART
                "55", // COD_MOD — NF-e
                "00", // COD_SIT — regular
                "1",  // SER
                &inv.number,
                &fmt::digits(inv.access_key.as_deref()),
                &fmt::date(inv.issue_date),
                &fmt::amount(inv.total_value, 2),
                "9", // IND_PGTO
                &fmt::amount(None, 2), // VL_DESC
                &fmt::amount(None, 2), // VL_ABAT_NT
                &fmt::amount(inv.total_value, 2), // VL_MERC
            ],
        );

        // C170 — item detail; the document is carried as a single
        // consolidated item, with the contribution bases and values derived
        // from the same total the header just stated
        out.write(
            "C170",
            &[
                "1",          // NUM_ITEM
                "",           // COD_ITEM
                "MERCADORIA", // DESCR_COMPL
                "1",          // QTD
                "UN",         // UNID
                &fmt::amount(inv.total_value, 2),
                &fmt::amount(None, 2), // VL_DESC
                "0",          // IND_MOV
                "50",         // CST
                "01",         // CFOP
                "9999.99.99", // COD_NAT
                &fmt::amount(inv.total_value, 2), // base
                &fmt::amount(Some(config.pis_rate), 4),
                &fmt::amount(Some(pis), 2),
                &fmt::amount(inv.total_value, 2), // base
                &fmt::amount(Some(config.cofins_rate), 4),
                &fmt::amount(Some(cofins), 2),
            ],
        );
    }
}

/// Block F — other documents and operations: expense receipts generating
/// proportional credit.
fn block_f(out: &mut RecordStream, expenses: &[Expense], config: &ContribuicoesConfig) {
    let has_movement = !expenses.is_empty();
    out.write("F001", &[if has_movement { "0" } else { "1" }]);

    for exp in expenses {
        let total = exp.total_amount.unwrap_or(Decimal::ZERO);

        // F100 — other documents
        out.write(
            "F100",
            &[
                "0", // IND_OPER — aquisição
                "",  // COD_PART
                "",  // COD_ITEM
                &fmt::date(exp.receipt_date),
                &fmt::amount(exp.total_amount, 2),
                "1",  // IND_NAT_FRT
                "50", // CST_PIS
                &fmt::amount(exp.total_amount, 2), // VL_BC_PIS
                &fmt::amount(Some(config.pis_rate), 4),
                &fmt::amount(Some(pct(total, config.pis_rate)), 2),
                "50", // CST_COFINS
                &fmt::amount(exp.total_amount, 2), // VL_BC_COFINS
                &fmt::amount(Some(config.cofins_rate), 4),
                &fmt::amount(Some(pct(total, config.cofins_rate)), 2),
                "9999.99.99", // NAT_BC_CRED
                "",           // IND_ORIG_CRED
                "",           // COD_CTA
                "",           // COD_CCUS
            ],
        );
    }
}

/// Block M — contribution apuração. Totals are computed from the same
/// invoice rows block C processed, so detail and summary cannot drift.
fn block_m(out: &mut RecordStream, invoices: &[Invoice], config: &ContribuicoesConfig) {
    out.write("M001", &["0"]);

    let revenue: Decimal = invoices.iter().filter_map(|i| i.total_value).sum();
    let total_pis = pct(revenue, config.pis_rate);
    let total_cofins = pct(revenue, config.cofins_rate);

    contribution_summary(out, "M200", total_pis);
    contribution_detail(out, "M210", revenue, config.pis_rate, total_pis);
    contribution_summary(out, "M600", total_cofins);
    contribution_detail(out, "M610", revenue, config.cofins_rate, total_cofins);
}

/// M200/M600 — period contribution totals (non-cumulative columns carry the
/// value, cumulative columns stay zero).
fn contribution_summary(out: &mut RecordStream, record_type: &str, total: Decimal) {
    let value = fmt::amount(Some(total), 2);
    let zero = fmt::amount(None, 2);
    out.write(
        record_type,
        &[
            &value, // VL_TOT_CONT_NC_PER
            &zero,  // VL_TOT_CRED_DESC
            &zero,  // VL_TOT_CRED_DESC_ANT
            &value, // VL_TOT_CONT_NC_DEV
            &zero,  // VL_RET_NC
            &zero,  // VL_OUT_DED_NC
            &value, // VL_CONT_NC_REC
            &zero,  // VL_TOT_CONT_CUM_PER
            &zero,  // VL_RET_CUM
            &zero,  // VL_OUT_DED_CUM
            &zero,  // VL_CONT_CUM_REC
            &value, // VL_TOT_CONT_REC
        ],
    );
}

/// M210/M610 — contribution detail per revenue group.
fn contribution_detail(
    out: &mut RecordStream,
    record_type: &str,
    revenue: Decimal,
    rate: Decimal,
    total: Decimal,
) {
    out.write(
        record_type,
        &[
            "01", // COD_CONT
            &fmt::amount(Some(revenue), 2), // VL_REC_BRT
            &fmt::amount(Some(revenue), 2), // VL_BC_CONT
            &fmt::amount(Some(rate), 4),
            &fmt::amount(Some(total), 2),
            "0", // COD_CTA
            "",  // DESC_COMPL
        ],
    );
}

/// Block 1 — bookkeeping complement, filed without movement.
fn block_1(out: &mut RecordStream) {
    out.write("1001", &["1"]);
}
