use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sped::core::*;
use sped::icms::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn company() -> Company {
    Company {
        name: "ACME COMERCIO LTDA".into(),
        trading_name: Some("ACME".into()),
        cnpj: Some("12.345.678/0001-95".into()),
        state: Some("SP".into()),
        city_code: Some("3550308".into()),
        postal_code: Some("60115-000".into()),
        street: Some("RUA DAS FLORES".into()),
        number: Some("100".into()),
        district: Some("CENTRO".into()),
        phone: Some("(85) 99999-0000".into()),
        email: Some("fiscal@acme.com.br".into()),
    }
}

fn invoice() -> Invoice {
    Invoice {
        number: "4321".into(),
        access_key: Some("35240112345678000195550010000043211000043217".into()),
        issue_date: Some(date(2024, 1, 15)),
        total_value: Some(dec!(1500.50)),
        icms_base: Some(dec!(1000)),
        icms_value: Some(dec!(170)),
        ipi_value: Some(dec!(50)),
        pis_value: Some(dec!(24.76)),
        cofins_value: Some(dec!(114.04)),
    }
}

fn generate(invoices: &[Invoice]) -> String {
    to_efd_icms_ipi(
        &company(),
        date(2024, 1, 1),
        date(2024, 1, 31),
        invoices,
        &IcmsConfig::default(),
    )
    .unwrap()
}

fn fields(line: &str) -> Vec<&str> {
    line.trim_matches('|').split('|').collect()
}

/// Assert the count invariants every generated file must satisfy: the final
/// record's declared total, each block closing's declared size, and one
/// exact 9900 tally per record type.
fn assert_structure(text: &str) {
    let lines: Vec<&str> = text.lines().collect();

    let last = fields(lines.last().unwrap());
    assert_eq!(last[0], "9999");
    assert_eq!(last[1].parse::<usize>().unwrap(), lines.len());

    for line in &lines {
        let f = fields(line);
        let reg = f[0];
        if reg.len() == 4 && reg.ends_with("990") && reg != "9990" {
            let letter = reg.as_bytes()[0];
            let declared: usize = f[1].parse().unwrap();
            let actual = lines.iter().filter(|l| l.as_bytes()[1] == letter).count();
            assert_eq!(declared, actual, "closing {reg}");
        }
    }

    let start9 = lines.iter().position(|l| l.starts_with("|9001|")).unwrap();
    let end9 = lines.iter().position(|l| l.starts_with("|9990|")).unwrap();
    let declared: usize = fields(lines[end9])[1].parse().unwrap();
    assert_eq!(declared, end9 - start9 + 1, "block 9 closing");

    for line in &lines {
        let f = fields(line);
        if f[0] != "9900" {
            continue;
        }
        let declared: usize = f[2].parse().unwrap();
        let actual = lines.iter().filter(|l| fields(l)[0] == f[1]).count();
        assert_eq!(declared, actual, "tally for {}", f[1]);
    }
}

#[test]
fn opening_record_carries_period_and_company() {
    let text = generate(&[invoice()]);
    assert!(text.starts_with(
        "|0000|018|0|01012024|31012024|ACME COMERCIO LTDA|12345678000195||SP||3550308|||0|1|"
    ));
}

#[test]
fn complementary_record_strips_identifier_punctuation() {
    let text = generate(&[]);
    assert!(text.contains("|0005|ACME|60115000|RUA DAS FLORES|100||CENTRO|85999990000||fiscal@acme.com.br|"));
}

#[test]
fn document_header_carries_invoice_fields() {
    let text = generate(&[invoice()]);
    let c100 = text.lines().find(|l| l.starts_with("|C100|")).unwrap();
    let f = fields(c100);
    assert_eq!(f[7], "4321");
    assert_eq!(f[8], "35240112345678000195550010000043211000043217");
    assert_eq!(f[9], "15012024");
    assert_eq!(f[11], "1500,50");
    assert_eq!(f[20], "1000,00"); // VL_BC_ICMS
    assert_eq!(f[21], "170,00"); // VL_ICMS
}

#[test]
fn apuracao_totals_sum_the_document_rows() {
    let mut second = invoice();
    second.number = "4322".into();
    second.icms_value = Some(dec!(30));
    let text = generate(&[invoice(), second]);
    let e110 = text.lines().find(|l| l.starts_with("|E110|")).unwrap();
    let f = fields(e110);
    assert_eq!(f[1], "200,00"); // VL_TOT_DEBITOS
    assert_eq!(f[12], "200,00"); // VL_ICMS_RECOLHER
}

#[test]
fn structure_holds_with_documents() {
    assert_structure(&generate(&[invoice()]));
}

#[test]
fn no_movement_file_is_structurally_complete() {
    let text = generate(&[]);
    assert!(text.contains("|C001|1|"));
    assert!(text.contains("|H001|1|"));
    assert!(text.contains("|1001|1|"));
    // apuração block stays present even with nothing to apportion
    assert!(text.contains("|E110|0,00|"));
    assert_structure(&text);
}

#[test]
fn single_document_tallies_one_header_record() {
    let text = generate(&[invoice()]);
    let tally = text
        .lines()
        .find(|l| l.starts_with("|9900|C100|"))
        .unwrap();
    assert_eq!(fields(tally)[2], "1");
}

#[test]
fn missing_amounts_emit_scaled_zero_not_blank() {
    let bare = Invoice {
        number: "77".into(),
        ..Default::default()
    };
    let text = generate(&[bare]);
    let c100 = text.lines().find(|l| l.starts_with("|C100|")).unwrap();
    let f = fields(c100);
    assert_eq!(f[9], ""); // missing date stays blank
    assert_eq!(f[11], "0,00"); // missing amount becomes scaled zero
    assert_eq!(f[21], "0,00");
}

#[test]
fn rejects_reversed_period() {
    let err = to_efd_icms_ipi(
        &company(),
        date(2024, 2, 1),
        date(2024, 1, 1),
        &[],
        &IcmsConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SpedError::InvalidPeriod { .. }));
}

#[test]
fn generation_is_idempotent() {
    let invoices = [invoice()];
    assert_eq!(generate(&invoices), generate(&invoices));
}

#[test]
fn rectification_changes_purpose_code() {
    let config = IcmsConfig {
        purpose: FilePurpose::Rectification,
        ..Default::default()
    };
    let text =
        to_efd_icms_ipi(&company(), date(2024, 1, 1), date(2024, 1, 31), &[], &config).unwrap();
    assert!(text.starts_with("|0000|018|1|"));
}

#[test]
fn invoice_hydrates_from_json_row() {
    let inv: Invoice = serde_json::from_value(serde_json::json!({
        "number": "123",
        "issue_date": "2024-01-15",
        "total_value": "1500.50"
    }))
    .unwrap();
    assert_eq!(inv.total_value, Some(dec!(1500.50)));
    assert_eq!(inv.access_key, None);
    let text = generate(&[inv]);
    assert_structure(&text);
}

#[test]
fn export_file_name_encodes_period() {
    assert_eq!(
        export_file_name(date(2024, 1, 1), date(2024, 1, 31)),
        "sped_fiscal_2024-01-01_2024-01-31.txt"
    );
}
