use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};

use super::backup_errors::{BackupError, Result};
use super::backup_model::{BackupSnapshot, CsvExport, RestoreSummary};
use crate::assets::{AssetRepositoryTrait, NewAsset};
use crate::prices::{NewPricePoint, PriceRepositoryTrait};
use crate::transactions::{
    first_negative_prefix, sort_ledger, NewTransaction, Transaction,
    TransactionRepositoryTrait,
};

/// Backup collaborator: serializes the entity records for export and
/// restores a snapshot with a full wipe-and-reload. The ledger balance
/// invariant is re-validated before anything is wiped.
pub struct BackupService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl BackupService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        BackupService {
            asset_repository,
            transaction_repository,
            price_repository,
        }
    }

    pub fn generate(&self) -> Result<BackupSnapshot> {
        Ok(BackupSnapshot {
            date: Utc::now().naive_utc(),
            assets: self.asset_repository.get_all()?,
            transactions: self.transaction_repository.get_all()?,
            prices: self.price_repository.get_all()?,
        })
    }

    pub fn export_json(&self) -> Result<String> {
        let snapshot = self.generate()?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn export_csv(&self) -> Result<CsvExport> {
        let snapshot = self.generate()?;

        let mut assets = csv::Writer::from_writer(Vec::new());
        assets.write_record(["ticker", "name", "type", "currency", "description"])?;
        for asset in &snapshot.assets {
            assets.write_record([
                asset.ticker.as_str(),
                asset.name.as_str(),
                asset.asset_type.as_str(),
                asset.currency.as_str(),
                asset.description.as_deref().unwrap_or(""),
            ])?;
        }

        let mut transactions = csv::Writer::from_writer(Vec::new());
        transactions.write_record([
            "date", "type", "quantity", "price", "fees", "notes", "assetId",
        ])?;
        for transaction in &snapshot.transactions {
            transactions.write_record([
                transaction.date.format("%Y-%m-%d").to_string(),
                transaction.transaction_type.as_str().to_string(),
                transaction.quantity.to_string(),
                transaction.unit_price.to_string(),
                transaction
                    .fees
                    .map(|f| f.to_string())
                    .unwrap_or_default(),
                transaction.notes.clone().unwrap_or_default(),
                transaction.asset_id.clone(),
            ])?;
        }

        let mut prices = csv::Writer::from_writer(Vec::new());
        prices.write_record(["date", "price", "volume", "assetId"])?;
        for price in &snapshot.prices {
            prices.write_record([
                price.date.format("%Y-%m-%d").to_string(),
                price.price.to_string(),
                price.volume.map(|v| v.to_string()).unwrap_or_default(),
                price.asset_id.clone(),
            ])?;
        }

        Ok(CsvExport {
            assets: finish_csv(assets)?,
            transactions: finish_csv(transactions)?,
            prices: finish_csv(prices)?,
        })
    }

    /// Wipes the stores and reloads them from the snapshot. Not a merge: any
    /// existing data is gone afterwards. Rejected up front when a restored
    /// asset's ledger would violate the balance invariant.
    pub fn restore(&self, snapshot: BackupSnapshot) -> Result<RestoreSummary> {
        validate_snapshot_ledgers(&snapshot)?;

        debug!(
            "Restoring backup from {}: {} assets, {} transactions, {} prices",
            snapshot.date,
            snapshot.assets.len(),
            snapshot.transactions.len(),
            snapshot.prices.len()
        );

        // Wipe in dependency order, then reload.
        self.price_repository.delete_all()?;
        self.transaction_repository.delete_all()?;
        self.asset_repository.delete_all()?;

        let mut summary = RestoreSummary {
            assets: 0,
            transactions: 0,
            prices: 0,
        };

        for asset in snapshot.assets {
            self.asset_repository.create(NewAsset {
                id: Some(asset.id),
                ticker: asset.ticker,
                name: asset.name,
                asset_type: asset.asset_type,
                currency: asset.currency,
                description: asset.description,
                sector: asset.sector,
                index: asset.index,
                rate: asset.rate,
                maturity: asset.maturity,
                pays_semiannual_interest: asset.pays_semiannual_interest,
            })?;
            summary.assets += 1;
        }

        for transaction in snapshot.transactions {
            self.transaction_repository.create(NewTransaction {
                id: Some(transaction.id),
                asset_id: transaction.asset_id,
                transaction_type: transaction.transaction_type,
                date: transaction.date,
                quantity: transaction.quantity,
                unit_price: transaction.unit_price,
                fees: transaction.fees,
                notes: transaction.notes,
            })?;
            summary.transactions += 1;
        }

        for price in snapshot.prices {
            self.price_repository.create(NewPricePoint {
                id: Some(price.id),
                asset_id: price.asset_id,
                date: price.date,
                price: price.price,
                volume: price.volume,
                dividend_yield: price.dividend_yield,
            })?;
            summary.prices += 1;
        }

        Ok(summary)
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| BackupError::CsvEncoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BackupError::CsvEncoding(e.to_string()))
}

fn validate_snapshot_ledgers(snapshot: &BackupSnapshot) -> Result<()> {
    let mut by_asset: BTreeMap<&str, Vec<Transaction>> = BTreeMap::new();
    for transaction in &snapshot.transactions {
        by_asset
            .entry(transaction.asset_id.as_str())
            .or_default()
            .push(transaction.clone());
    }

    for (asset_id, mut ledger) in by_asset {
        sort_ledger(&mut ledger);
        if let Some(date) = first_negative_prefix(&ledger) {
            let ticker = snapshot
                .assets
                .iter()
                .find(|a| a.id == asset_id)
                .map(|a| a.ticker.clone())
                .unwrap_or_else(|| asset_id.to_string());
            warn!("Rejected backup restore: {} oversold at {}", ticker, date);
            return Err(BackupError::InvalidLedger {
                asset: ticker,
                date,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, AssetError, AssetType, Currency, UpdateAsset};
    use crate::prices::{PriceError, PricePoint};
    use crate::transactions::{TransactionError, TransactionType, TransactionUpdate};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryAssets(Mutex<Vec<Asset>>);

    impl AssetRepositoryTrait for InMemoryAssets {
        fn get_by_id(&self, asset_id: &str) -> crate::assets::Result<Asset> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == asset_id)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(asset_id.to_string()))
        }
        fn get_by_ticker(&self, _ticker: &str) -> crate::assets::Result<Option<Asset>> {
            Ok(None)
        }
        fn get_all(&self) -> crate::assets::Result<Vec<Asset>> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn create(&self, new_asset: NewAsset) -> crate::assets::Result<Asset> {
            let now = Utc::now().naive_utc();
            let asset = Asset {
                id: new_asset
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                ticker: new_asset.ticker,
                name: new_asset.name,
                asset_type: new_asset.asset_type,
                currency: new_asset.currency,
                description: new_asset.description,
                sector: new_asset.sector,
                index: new_asset.index,
                rate: new_asset.rate,
                maturity: new_asset.maturity,
                pays_semiannual_interest: new_asset.pays_semiannual_interest,
                created_at: now,
                updated_at: now,
            };
            self.0.lock().unwrap().push(asset.clone());
            Ok(asset)
        }
        fn update(&self, _update: UpdateAsset) -> crate::assets::Result<Asset> {
            unimplemented!("not exercised")
        }
        fn delete(&self, _asset_id: &str) -> crate::assets::Result<Asset> {
            unimplemented!("not exercised")
        }
        fn delete_all(&self) -> crate::assets::Result<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
        fn transaction_count(&self, _asset_id: &str) -> crate::assets::Result<i64> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct InMemoryTransactions(Mutex<Vec<Transaction>>);

    impl TransactionRepositoryTrait for InMemoryTransactions {
        fn get_by_id(&self, transaction_id: &str) -> crate::transactions::Result<Transaction> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == transaction_id)
                .cloned()
                .ok_or_else(|| TransactionError::NotFound(transaction_id.to_string()))
        }
        fn get_by_asset(&self, asset_id: &str) -> crate::transactions::Result<Vec<Transaction>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.asset_id == asset_id)
                .cloned()
                .collect())
        }
        fn get_all(&self) -> crate::transactions::Result<Vec<Transaction>> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn create(
            &self,
            new_transaction: NewTransaction,
        ) -> crate::transactions::Result<Transaction> {
            let now = Utc::now().naive_utc();
            let transaction = Transaction {
                id: new_transaction
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                asset_id: new_transaction.asset_id,
                transaction_type: new_transaction.transaction_type,
                date: new_transaction.date,
                quantity: new_transaction.quantity,
                unit_price: new_transaction.unit_price,
                fees: new_transaction.fees,
                notes: new_transaction.notes,
                created_at: now,
                updated_at: now,
            };
            self.0.lock().unwrap().push(transaction.clone());
            Ok(transaction)
        }
        fn update(
            &self,
            _update: TransactionUpdate,
        ) -> crate::transactions::Result<Transaction> {
            unimplemented!("not exercised")
        }
        fn delete(&self, _transaction_id: &str) -> crate::transactions::Result<Transaction> {
            unimplemented!("not exercised")
        }
        fn delete_all(&self) -> crate::transactions::Result<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
        fn first_transaction_date(&self) -> crate::transactions::Result<Option<NaiveDate>> {
            Ok(self.0.lock().unwrap().iter().map(|t| t.date).min())
        }
    }

    #[derive(Default)]
    struct InMemoryPrices(Mutex<Vec<PricePoint>>);

    impl PriceRepositoryTrait for InMemoryPrices {
        fn get_by_id(&self, price_id: &str) -> crate::prices::Result<PricePoint> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == price_id)
                .cloned()
                .ok_or_else(|| PriceError::NotFound(price_id.to_string()))
        }
        fn get_by_asset(&self, asset_id: &str) -> crate::prices::Result<Vec<PricePoint>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.asset_id == asset_id)
                .cloned()
                .collect())
        }
        fn get_latest(&self, asset_id: &str) -> crate::prices::Result<Option<PricePoint>> {
            Ok(self
                .get_by_asset(asset_id)?
                .into_iter()
                .max_by_key(|p| p.date))
        }
        fn get_range(
            &self,
            asset_id: &str,
            from: NaiveDate,
            to: NaiveDate,
        ) -> crate::prices::Result<Vec<PricePoint>> {
            Ok(self
                .get_by_asset(asset_id)?
                .into_iter()
                .filter(|p| p.date >= from && p.date <= to)
                .collect())
        }
        fn get_all(&self) -> crate::prices::Result<Vec<PricePoint>> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn create(&self, new_price: NewPricePoint) -> crate::prices::Result<PricePoint> {
            let point = PricePoint {
                id: new_price
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                asset_id: new_price.asset_id,
                date: new_price.date,
                price: new_price.price,
                volume: new_price.volume,
                dividend_yield: new_price.dividend_yield,
                created_at: Utc::now().naive_utc(),
            };
            self.0.lock().unwrap().push(point.clone());
            Ok(point)
        }
        fn delete(&self, _price_id: &str) -> crate::prices::Result<PricePoint> {
            unimplemented!("not exercised")
        }
        fn delete_all(&self) -> crate::prices::Result<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
        fn replace_for_asset(
            &self,
            _asset_id: &str,
            _prices: Vec<NewPricePoint>,
        ) -> crate::prices::Result<usize> {
            unimplemented!("not exercised")
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn asset(id: &str, ticker: &str) -> Asset {
        let now = Utc::now().naive_utc();
        Asset {
            id: id.to_string(),
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            asset_type: AssetType::DomesticStock,
            currency: Currency::Brl,
            description: Some("exported".to_string()),
            sector: None,
            index: None,
            rate: None,
            maturity: None,
            pays_semiannual_interest: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(
        asset_id: &str,
        transaction_type: TransactionType,
        when: NaiveDate,
        quantity: Decimal,
    ) -> Transaction {
        let now = Utc::now().naive_utc();
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            transaction_type,
            date: when,
            quantity,
            unit_price: dec!(100),
            fees: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service() -> (
        BackupService,
        Arc<InMemoryAssets>,
        Arc<InMemoryTransactions>,
        Arc<InMemoryPrices>,
    ) {
        let assets = Arc::new(InMemoryAssets::default());
        let transactions = Arc::new(InMemoryTransactions::default());
        let prices = Arc::new(InMemoryPrices::default());
        let service = BackupService::new(assets.clone(), transactions.clone(), prices.clone());
        (service, assets, transactions, prices)
    }

    #[test]
    fn export_json_round_trips_through_serde() {
        let (service, assets, transactions, _) = service();
        assets.0.lock().unwrap().push(asset("a", "PETR4"));
        transactions.0.lock().unwrap().push(transaction(
            "a",
            TransactionType::Buy,
            date(2024, 1, 2),
            dec!(10),
        ));

        let json = service.export_json().unwrap();
        let parsed: BackupSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.assets.len(), 1);
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.assets[0].ticker, "PETR4");
    }

    #[test]
    fn export_csv_writes_one_document_per_entity() {
        let (service, assets, transactions, _) = service();
        assets.0.lock().unwrap().push(asset("a", "PETR4"));
        transactions.0.lock().unwrap().push(transaction(
            "a",
            TransactionType::Buy,
            date(2024, 1, 2),
            dec!(10),
        ));

        let export = service.export_csv().unwrap();
        assert!(export.assets.starts_with("ticker,name,type,currency,description"));
        assert!(export.assets.contains("PETR4"));
        assert!(export.transactions.contains("2024-01-02,BUY,10,100"));
        assert!(export.prices.starts_with("date,price,volume,assetId"));
    }

    #[test]
    fn restore_wipes_and_reloads() {
        let (service, assets, transactions, prices) = service();
        assets.0.lock().unwrap().push(asset("old", "OLD4"));

        let snapshot = BackupSnapshot {
            date: Utc::now().naive_utc(),
            assets: vec![asset("a", "PETR4")],
            transactions: vec![transaction(
                "a",
                TransactionType::Buy,
                date(2024, 1, 2),
                dec!(10),
            )],
            prices: vec![],
        };

        let summary = service.restore(snapshot).unwrap();
        assert_eq!(summary.assets, 1);
        assert_eq!(summary.transactions, 1);
        assert_eq!(summary.prices, 0);

        let stored = assets.0.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].ticker, "PETR4");
        assert_eq!(transactions.0.lock().unwrap().len(), 1);
        assert!(prices.0.lock().unwrap().is_empty());
    }

    #[test]
    fn restore_rejects_oversold_ledger_without_wiping() {
        let (service, assets, _, _) = service();
        assets.0.lock().unwrap().push(asset("keep", "KEEP4"));

        let snapshot = BackupSnapshot {
            date: Utc::now().naive_utc(),
            assets: vec![asset("a", "PETR4")],
            transactions: vec![
                transaction("a", TransactionType::Buy, date(2024, 1, 2), dec!(5)),
                transaction("a", TransactionType::Sell, date(2024, 1, 3), dec!(8)),
            ],
            prices: vec![],
        };

        let err = service.restore(snapshot).unwrap_err();
        assert!(matches!(err, BackupError::InvalidLedger { .. }));

        // Existing data untouched.
        assert_eq!(assets.0.lock().unwrap().len(), 1);
    }
}
