//! SPED Fiscal (EFD ICMS/IPI) file generation.
//!
//! Layout per the Receita Federal practical guide, version code 018:
//!
//! - Block 0: opening, company identification, accountant
//! - Block C: goods fiscal documents (NF-e)
//! - Block E: ICMS/IPI apuração
//! - Block H: physical inventory (no movement)
//! - Block 1: other information (no movement)
//! - Block 9: control and closing

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Company, Invoice, Period, SpedError};
use crate::engine::{RecordStream, fmt};

/// Fixed block sequence of the layout; block 9 is appended by the engine.
const BLOCK_ORDER: &[char] = &['0', 'C', 'E', 'H', '1'];

/// Filing purpose emitted in record 0000 (COD_FIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilePurpose {
    /// Regular filing (remessa original).
    Original,
    /// Replacement of a previous filing (retificação).
    Rectification,
}

impl FilePurpose {
    fn code(&self) -> &'static str {
        match self {
            Self::Original => "0",
            Self::Rectification => "1",
        }
    }
}

/// Configuration for the EFD ICMS/IPI export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcmsConfig {
    /// Layout version code (COD_VER), "018" for the current guide.
    pub layout_version: String,
    /// Filing purpose (COD_FIN).
    pub purpose: FilePurpose,
    /// Accountant name emitted in record 0100.
    pub accountant_name: String,
    /// Accountant CRC registration number.
    pub accountant_crc: String,
}

impl Default for IcmsConfig {
    fn default() -> Self {
        Self {
            layout_version: "018".into(),
            purpose: FilePurpose::Original,
            accountant_name: "CONTADOR RESPONSÁVEL".into(),
            accountant_crc: "CRC".into(),
        }
    }
}

/// Download file name encoding the period, as exposed by the export
/// endpoint: `sped_fiscal_YYYY-MM-DD_YYYY-MM-DD.txt`.
pub fn export_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!("sped_fiscal_{}_{}.txt", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

/// Generate a complete EFD ICMS/IPI file.
///
/// `invoices` must already be in the order the filing requires
/// (chronological); rows are emitted as given, never re-sorted. Returns the
/// joined file text; writing it anywhere is the caller's concern.
///
/// # Errors
///
/// [`SpedError::InvalidPeriod`] if `start` is after `end`. Field-level data
/// problems never fail generation (see [`crate::engine::fmt`]).
pub fn to_efd_icms_ipi(
    company: &Company,
    start: NaiveDate,
    end: NaiveDate,
    invoices: &[Invoice],
    config: &IcmsConfig,
) -> Result<String, SpedError> {
    let period = Period::new(start, end)?;

    let mut out = RecordStream::new();
    block_0(&mut out, company, &period, config);
    block_c(&mut out, invoices);
    block_e(&mut out, &period, invoices);
    block_h(&mut out);
    block_1(&mut out);
    Ok(out.finish(BLOCK_ORDER))
}

/// Block 0 — opening, identification, references.
fn block_0(out: &mut RecordStream, company: &Company, period: &Period, config: &IcmsConfig) {
    // 0000 — digital file opening
    out.write(
        "0000",
        &[
            &config.layout_version,
            config.purpose.code(),
            &fmt::date(Some(period.start())),
            &fmt::date(Some(period.end())),
            &fmt::text(Some(company.name.as_str()), 100),
            &fmt::digits(company.cnpj.as_deref()),
            "", // CPF — legal entities only
            &fmt::text(company.state.as_deref(), 2),
            "", // IE
            &fmt::text(company.city_code.as_deref(), 7),
            "", // IM
            "", // SUFRAMA
            "0", // IND_PERFIL
            "1", // IND_ATIV
        ],
    );

    // 0001 — block opening, always with movement (identification records follow)
    out.write("0001", &["0"]);

    // 0005 — complementary company data
    out.write(
        "0005",
        &[
            &fmt::text(
                company.trading_name.as_deref().or(Some(company.name.as_str())),
                60,
            ),
            &fmt::digits(company.postal_code.as_deref()),
            &fmt::text(company.street.as_deref(), 60),
            &fmt::text(company.number.as_deref(), 10),
            "", // complement
            &fmt::text(company.district.as_deref(), 60),
            &fmt::digits(company.phone.as_deref()),
            "", // fax
            &fmt::text(company.email.as_deref(), 60),
        ],
    );

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
}

/// Block C — goods fiscal documents. Emits the explicit no-movement flag
/// when the period has no invoices.
fn block_c(out: &mut RecordStream, invoices: &[Invoice]) {
    let has_movement = !invoices.is_empty();
    out.write("C001", &[if has_movement { "0" } else { "1" }]);

    for inv in invoices {
        // C100 — NF-e document header
        out.write(
            "C100",
            &[
                "0",  // IND_OPER — entrada
                "0",  // IND_EMIT — emissão própria
                "00", // COD_PART
                "55", // COD_MOD — NF-e
                "00", // COD_SIT — regular
                "1",  // SER
                &inv.number,
                &fmt::digits(inv.access_key.as_deref()),
                &fmt::date(inv.issue_date),
                &fmt::date(inv.issue_date), // DT_E_S
                &fmt::amount(inv.total_value, 2),
                "1", // IND_PGTO
                &fmt::amount(None, 2), // VL_DESC
                &fmt::amount(None, 2), // VL_ABAT_NT
                &fmt::amount(inv.total_value, 2), // VL_MERC
                "0", // IND_FRT
                &fmt::amount(None, 2), // VL_FRT
                &fmt::amount(None, 2), // VL_SEG
                &fmt::amount(None, 2), // VL_OUT_DA
                &fmt::amount(inv.icms_base, 2),
                &fmt::amount(inv.icms_value, 2),
                &fmt::amount(None, 2), // VL_BC_ICMS_ST
                &fmt::amount(None, 2), // VL_ICMS_ST
                &fmt::amount(inv.ipi_value, 2),
                &fmt::amount(inv.pis_value, 2),
                &fmt::amount(inv.cofins_value, 2),
                &fmt::amount(None, 2), // VL_PIS_ST
                &fmt::amount(None, 2), // VL_COFINS_ST
            ],
        );
    }
}

/// Block E — ICMS apuração. Always present; totals come from the same
/// invoice rows block C just emitted so detail and summary cannot drift.
fn block_e(out: &mut RecordStream, period: &Period, invoices: &[Invoice]) {
    out.write("E001", &["0"]);

    // E100 — apuração period
    out.write(
        "E100",
        &[&fmt::date(Some(period.start())), &fmt::date(Some(period.end()))],
    );

    let total_icms: Decimal = invoices.iter().filter_map(|i| i.icms_value).sum();
    let icms = fmt::amount(Some(total_icms), 2);
    let zero = fmt::amount(None, 2);

    // E110 — ICMS apuração totals
    out.write(
        "E110",
        &[
            &icms, // VL_TOT_DEBITOS
            &zero, // VL_AJ_DEBITOS
            &icms, // VL_TOT_AJ_DEBITOS
            &zero, // VL_ESTORNOS_CRED
            &zero, // VL_TOT_CREDITOS
            &zero, // VL_AJ_CREDITOS
            &zero, // VL_TOT_AJ_CREDITOS
            &zero, // VL_ESTORNOS_DEB
            &icms, // VL_SLD_CREDOR_ANT
            &icms, // VL_SLD_APURADO
            &zero, // VL_TOT_DED
            &icms, // VL_ICMS_RECOLHER
            &zero, // VL_SLD_CREDOR_TRANSPORTAR
            &zero, // DEB_ESP
        ],
    );
}

/// Block H — physical inventory, filed without movement.
fn block_h(out: &mut RecordStream) {
    out.write("H001", &["1"]);
}

/// Block 1 — other information, filed without movement.
fn block_1(out: &mut RecordStream) {
    out.write("1001", &["1"]);
}
