use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Result};
use csv::StringRecord;
use tempfile::NamedTempFile;

const OUTPUT_HEADER: [&str; 7] = [
    "id",
    "deal_unique_id",
    "from_currency_iso_code",
    "to_currency_iso_code",
    "deal_timestamp",
    "deal_amount",
    "imported_at"
];

fn run_cli(input: &Path) -> Result<Vec<StringRecord>> {
    let binary_path = env!("CARGO_BIN_EXE_fx-deal-warehouse");

    let output = Command::new(binary_path)
        .arg(input)
        .output()?;

    assert!(output.status.success());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(output.stdout.as_slice());

    Ok(reader.records().collect::<Result<Vec<_>, _>>()?)
}

fn run_sample() -> Result<Vec<StringRecord>> {
    run_cli(&Path::new("samples").join("deals.csv"))
}

#[test]
fn test_cli_outputs_well_formed_deal_rows() -> Result<()> {
    let rows = run_sample()?;
    let (header, deals) = rows.split_first().ok_or_else(|| anyhow!("no output"))?;

    assert_eq!(header.iter().collect::<Vec<_>>(), OUTPUT_HEADER);

    for deal in deals {
        assert_eq!(deal.len(), 7);

        let _: u64 = deal[0].parse()?;
        assert_eq!(deal[2].len(), 3);
        assert_eq!(deal[3].len(), 3);
        let _: f64 = deal[5].parse()?;
    }

    Ok(())
}

#[test]
fn test_cli_imports_only_valid_unique_deals() -> Result<()> {
    let rows = run_sample()?;
    let mut results = HashMap::new();

    for deal in rows.iter().skip(1) {
        results.insert(deal[1].to_string(), (deal[2].to_string(), deal[3].to_string(), deal[5].to_string()));
    }

    assert_eq!(results.len(), 3);

    let deal_1 = results.get("DEAL-001").ok_or_else(|| anyhow!("DEAL-001 missing from output"))?;

    assert_eq!(deal_1.0, "USD");
    assert_eq!(deal_1.1, "EUR");
    assert_eq!(deal_1.2, "1000.50");

    let deal_2 = results.get("DEAL-002").ok_or_else(|| anyhow!("DEAL-002 missing from output"))?;

    assert_eq!(deal_2.2, "1234567.89");
    assert!(results.contains_key("DEAL-008"));

    Ok(())
}

#[test]
fn test_cli_quotes_identifiers_with_delimiters_and_quotes() -> Result<()> {
    let mut file = NamedTempFile::new()?;

    writeln!(file, "deal_unique_id,from_currency_iso_code,to_currency_iso_code,deal_timestamp,deal_amount")?;
    writeln!(file, "\"A,B\",USD,EUR,2024-01-15T10:30:00Z,10")?;
    writeln!(file, "\"say \"\"hi\"\"\",GBP,JPY,2024-01-15T10:30:00Z,20")?;

    let rows = run_cli(file.path())?;

    assert_eq!(rows.len(), 3);

    for deal in &rows {
        assert_eq!(deal.len(), 7);
    }

    let deals: HashMap<&str, &StringRecord> = rows.iter().skip(1).map(|deal| (&deal[1], deal)).collect();

    let comma = deals.get("A,B").ok_or_else(|| anyhow!("A,B missing from output"))?;
    let quote = deals.get("say \"hi\"").ok_or_else(|| anyhow!("quoted identifier missing from output"))?;

    assert_eq!(&comma[2], "USD");
    assert_eq!(&comma[5], "10");
    assert_eq!(&quote[3], "JPY");
    assert_eq!(&quote[5], "20");

    Ok(())
}

#[test]
fn test_cli_fails_for_missing_input_file() -> Result<()> {
    let binary_path = env!("CARGO_BIN_EXE_fx-deal-warehouse");

    let output = Command::new(binary_path)
        .arg(Path::new("samples").join("does_not_exist.csv"))
        .output()?;

    assert!(!output.status.success());

    Ok(())
}
