use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};

use fx_deal_warehouse::importer::DealImporter;
use fx_deal_warehouse::models::{DealRecord, ImportError, PersistedDeal};
use fx_deal_warehouse::storage::{DealStorage, DealStore};
use fx_deal_warehouse::types::{Clock, CurrencyRegistry, SystemClock};

fn create_importer() -> (Arc<DealStorage>, DealImporter<DealStorage>) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let storage = Arc::new(DealStorage::new(clock.clone()));
    let importer = DealImporter::new(storage.clone(), Arc::new(CurrencyRegistry::default()), clock);

    (storage, importer)
}

fn create_record(deal_unique_id: &str, from: &str, to: &str, amount: &str) -> Result<DealRecord> {
    Ok(DealRecord {
        deal_unique_id: Some(deal_unique_id.to_string()),
        from_currency_iso_code: Some(from.to_string()),
        to_currency_iso_code: Some(to.to_string()),
        deal_timestamp: Some((Utc::now() - Duration::hours(1)).to_rfc3339()),
        deal_amount: Some(amount.to_string())
    })
}

fn identifiers(deals: &[PersistedDeal]) -> Vec<&str> {
    deals.iter().map(PersistedDeal::deal_unique_id).collect()
}

#[test]
fn test_batch_with_invalid_currency_in_the_middle() -> Result<()> {
    let (storage, importer) = create_importer();
    let batch = [
        create_record("D1", "USD", "EUR", "100")?,
        create_record("B", "XXX", "EUR", "100")?,
        create_record("D2", "GBP", "USD", "100")?
    ];

    let deals = importer.import_batch(&batch);

    assert_eq!(identifiers(&deals), vec!["D1", "D2"]);
    assert_eq!(identifiers(&storage.all()?), vec!["D1", "D2"]);

    Ok(())
}

#[test]
fn test_batch_with_repeated_identifier_keeps_one_record() -> Result<()> {
    let (storage, importer) = create_importer();
    let batch = [
        create_record("D1", "USD", "EUR", "100")?,
        create_record("D1", "USD", "JPY", "200")?
    ];

    let deals = importer.import_batch(&batch);

    assert_eq!(identifiers(&deals), vec!["D1"]);
    assert_eq!(storage.len(), 1);

    Ok(())
}

#[test]
fn test_single_import_then_duplicate() -> Result<()> {
    let (_, importer) = create_importer();
    let record = create_record("D1", "USD", "EUR", "1234567.89")?;

    let deal = importer.import_one(&record)?;
    let repeat = importer.import_one(&record).err().ok_or_else(|| anyhow!("expected duplicate"))?;

    assert!(deal.imported_at() >= deal.deal_timestamp());
    assert!(matches!(repeat, ImportError::DuplicateDeal { .. }));
    assert_eq!(repeat.to_string(), "Deal with ID D1 already exists");

    Ok(())
}
