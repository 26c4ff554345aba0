use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::evolution_calculator::calculate_wealth_curve;
use super::history_calculator::{
    aggregate_portfolio_history, calculate_asset_history, interpolate_sparse_history,
};
use super::portfolio_errors::Result;
use super::portfolio_model::{
    AssetLedger, AssetPosition, EvolutionConfig, EvolutionPoint, HistoryPoint,
    PerformanceSummary, PortfolioSummary, TypeDistribution, WealthPoint,
};
use super::portfolio_traits::PortfolioServiceTrait;
use super::position_calculator::calculate_position;
use crate::assets::{Asset, AssetRepositoryTrait, AssetType};
use crate::prices::PriceRepositoryTrait;
use crate::transactions::{TransactionRepositoryTrait, TransactionType};
use crate::treasury::{
    inflation_linked_yield, inflation_linked_yield_semiannual, semiannual_payment_schedule,
    SemiannualPayment,
};

/// Valuation service over the asset/transaction/price repositories. All
/// accumulator state is local to each call; the service itself is stateless
/// beyond its collaborators and configuration.
pub struct PortfolioService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    config: EvolutionConfig,
}

impl PortfolioService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        PortfolioService {
            asset_repository,
            transaction_repository,
            price_repository,
            config: EvolutionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EvolutionConfig) -> Self {
        self.config = config;
        self
    }

    fn position_for(&self, asset: &Asset) -> Result<Option<AssetPosition>> {
        let transactions = self.transaction_repository.get_by_asset(&asset.id)?;
        let latest_price = self.price_repository.get_latest(&asset.id)?;

        let mut position = match calculate_position(asset, &transactions, latest_price.as_ref()) {
            Some(position) => position,
            None => return Ok(None),
        };

        // Inflation-indexed treasuries get the estimated yield instead of
        // whatever the last price point recorded.
        if let Some(price) = position.current_price {
            let today = Utc::now().date_naive();
            let estimated = if asset.pays_semiannual_interest {
                inflation_linked_yield_semiannual(asset, price, today)
            } else {
                inflation_linked_yield(asset, price, today)
            };
            if let Some(estimated_yield) = estimated {
                position.last_dividend_yield = Some(estimated_yield);
            }
        }

        Ok(Some(position))
    }

    fn ledger_for(&self, asset: Asset) -> Result<AssetLedger> {
        let transactions = self.transaction_repository.get_by_asset(&asset.id)?;
        let latest_price = self.price_repository.get_latest(&asset.id)?;
        Ok(AssetLedger {
            asset,
            transactions,
            latest_price,
        })
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    fn asset_position(&self, asset_id: &str) -> Result<Option<AssetPosition>> {
        let asset = self.asset_repository.get_by_id(asset_id)?;
        self.position_for(&asset)
    }

    fn portfolio_summary(&self) -> Result<PortfolioSummary> {
        let assets = self.asset_repository.get_all()?;

        let mut total_invested = Decimal::ZERO;
        let mut current_total = Decimal::ZERO;
        let mut positions = Vec::new();

        for asset in &assets {
            if let Some(position) = self.position_for(asset)? {
                total_invested += position.total_invested;
                if let Some(current) = position.current_total {
                    current_total += current;
                }
                positions.push(position);
            }
        }

        let absolute_return = current_total - total_invested;
        let percent_return = if total_invested > Decimal::ZERO {
            absolute_return / total_invested * dec!(100)
        } else {
            Decimal::ZERO
        };

        Ok(PortfolioSummary {
            total_invested,
            current_total,
            absolute_return,
            percent_return,
            positions,
        })
    }

    fn asset_history(
        &self,
        asset_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoryPoint>> {
        let transactions = self.transaction_repository.get_by_asset(asset_id)?;
        let prices = self.price_repository.get_range(asset_id, from, to)?;
        Ok(calculate_asset_history(&transactions, &prices, from, to))
    }

    async fn portfolio_evolution(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EvolutionPoint>> {
        let assets = self.asset_repository.get_all()?;

        // Independent assets replay independently; only the aggregation
        // needs all of them.
        let history_futures = assets.iter().map(|asset| {
            let transaction_repository = self.transaction_repository.clone();
            let price_repository = self.price_repository.clone();
            let asset_id = asset.id.clone();
            async move {
                let transactions = transaction_repository.get_by_asset(&asset_id)?;
                let prices = price_repository.get_range(&asset_id, from, to)?;
                Result::Ok(calculate_asset_history(&transactions, &prices, from, to))
            }
        });

        let mut histories = Vec::new();
        for history in join_all(history_futures).await {
            histories.push(history?);
        }

        let aggregated = aggregate_portfolio_history(&histories);

        if aggregated.len() < self.config.sparse_point_threshold {
            if let Some(first_transaction) = self.transaction_repository.first_transaction_date()?
            {
                debug!(
                    "Only {} real evolution points; synthesizing from {}",
                    aggregated.len(),
                    first_transaction
                );
                let all_transactions = self.transaction_repository.get_all()?;
                let total_invested: Decimal = all_transactions
                    .iter()
                    .filter(|t| t.transaction_type == TransactionType::Buy)
                    .map(|t| t.quantity * t.unit_price)
                    .sum();
                let now = Utc::now().date_naive();
                return Ok(interpolate_sparse_history(
                    &aggregated,
                    first_transaction,
                    total_invested,
                    now,
                    &self.config,
                ));
            }
        }

        Ok(aggregated)
    }

    fn wealth_curve(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WealthPoint>> {
        let assets = self.asset_repository.get_all()?;
        let mut ledgers = Vec::with_capacity(assets.len());
        for asset in assets {
            ledgers.push(self.ledger_for(asset)?);
        }
        Ok(calculate_wealth_curve(&ledgers, from, to, &self.config))
    }

    fn distribution(&self) -> Result<Vec<TypeDistribution>> {
        let assets = self.asset_repository.get_all()?;

        let mut by_type: HashMap<AssetType, Decimal> = HashMap::new();
        for asset in &assets {
            if let Some(position) = self.position_for(asset)? {
                if let Some(current) = position.current_total {
                    *by_type.entry(asset.asset_type).or_insert(Decimal::ZERO) += current;
                }
            }
        }

        let mut distribution: Vec<TypeDistribution> = by_type
            .into_iter()
            .map(|(asset_type, total)| TypeDistribution { asset_type, total })
            .collect();
        distribution.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(distribution)
    }

    fn performance(&self, from: NaiveDate, to: NaiveDate) -> Result<PerformanceSummary> {
        let assets = self.asset_repository.get_all()?;

        let mut initial_value = Decimal::ZERO;
        let mut final_value = Decimal::ZERO;
        let mut contributions = Decimal::ZERO;
        let mut withdrawals = Decimal::ZERO;

        for asset in &assets {
            let transactions = self.transaction_repository.get_by_asset(&asset.id)?;
            let prices = self.price_repository.get_range(&asset.id, from, to)?;

            let initial_price = prices.first().map(|p| p.price).unwrap_or(Decimal::ZERO);
            let final_price = prices.last().map(|p| p.price).unwrap_or(Decimal::ZERO);

            // Position carried into the period seeds both endpoints.
            let initial_quantity: Decimal = transactions
                .iter()
                .filter(|t| t.date < from)
                .map(|t| t.signed_quantity())
                .sum();
            let mut final_quantity = initial_quantity;

            for transaction in transactions
                .iter()
                .filter(|t| t.date >= from && t.date <= to)
            {
                match transaction.transaction_type {
                    TransactionType::Buy => {
                        contributions += transaction.quantity * transaction.unit_price;
                    }
                    TransactionType::Sell => {
                        withdrawals += transaction.quantity * transaction.unit_price;
                    }
                }
                final_quantity += transaction.signed_quantity();
            }

            initial_value += initial_quantity * initial_price;
            final_value += final_quantity * final_price;
        }

        let absolute_return = final_value - initial_value;
        let percent_return = if initial_value > Decimal::ZERO {
            absolute_return / initial_value * dec!(100)
        } else {
            Decimal::ZERO
        };

        let net_contributions = contributions - withdrawals;
        let adjusted_return = if net_contributions > Decimal::ZERO {
            (final_value - net_contributions) / net_contributions * dec!(100)
        } else {
            Decimal::ZERO
        };

        Ok(PerformanceSummary {
            from,
            to,
            initial_value,
            final_value,
            absolute_return,
            percent_return,
            contributions,
            withdrawals,
            adjusted_return,
        })
    }

    fn semiannual_payments(&self, asset_id: &str) -> Result<Vec<SemiannualPayment>> {
        let asset = self.asset_repository.get_by_id(asset_id)?;
        let transactions = self.transaction_repository.get_by_asset(asset_id)?;
        let today = Utc::now().date_naive();
        Ok(semiannual_payment_schedule(&asset, &transactions, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, Currency, IndexKind, NewAsset, UpdateAsset};
    use crate::prices::{NewPricePoint, PriceError, PricePoint};
    use crate::transactions::{
        NewTransaction, Transaction, TransactionError, TransactionUpdate,
    };
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

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
        fn get_by_ticker(&self, ticker: &str) -> crate::assets::Result<Option<Asset>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.ticker == ticker)
                .cloned())
        }
        fn get_all(&self) -> crate::assets::Result<Vec<Asset>> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn create(&self, _new_asset: NewAsset) -> crate::assets::Result<Asset> {
            unimplemented!("not exercised")
        }
        fn update(&self, _update: UpdateAsset) -> crate::assets::Result<Asset> {
            unimplemented!("not exercised")
        }
        fn delete(&self, _asset_id: &str) -> crate::assets::Result<Asset> {
            unimplemented!("not exercised")
        }
        fn delete_all(&self) -> crate::assets::Result<()> {
            unimplemented!("not exercised")
        }
        fn transaction_count(&self, _asset_id: &str) -> crate::assets::Result<i64> {
            Ok(0)
        }
    }

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
            let mut result: Vec<Transaction> = self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.asset_id == asset_id)
                .cloned()
                .collect();
            result.sort_by_key(|t| t.date);
            Ok(result)
        }
        fn get_all(&self) -> crate::transactions::Result<Vec<Transaction>> {
            Ok(self.0.lock().unwrap().clone())
        }
        fn create(
            &self,
            _new_transaction: NewTransaction,
        ) -> crate::transactions::Result<Transaction> {
            unimplemented!("not exercised")
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
            unimplemented!("not exercised")
        }
        fn first_transaction_date(&self) -> crate::transactions::Result<Option<NaiveDate>> {
            Ok(self.0.lock().unwrap().iter().map(|t| t.date).min())
        }
    }

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
            let mut result: Vec<PricePoint> = self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.asset_id == asset_id)
                .cloned()
                .collect();
            result.sort_by_key(|p| p.date);
            Ok(result)
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
        fn create(&self, _new_price: NewPricePoint) -> crate::prices::Result<PricePoint> {
            unimplemented!("not exercised")
        }
        fn delete(&self, _price_id: &str) -> crate::prices::Result<PricePoint> {
            unimplemented!("not exercised")
        }
        fn delete_all(&self) -> crate::prices::Result<()> {
            unimplemented!("not exercised")
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

    fn stock(id: &str, ticker: &str) -> Asset {
        let now = Utc::now().naive_utc();
        Asset {
            id: id.to_string(),
            ticker: ticker.to_string(),
            name: ticker.to_string(),
            asset_type: AssetType::DomesticStock,
            currency: Currency::Brl,
            description: None,
            sector: None,
            index: None,
            rate: None,
            maturity: None,
            pays_semiannual_interest: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn treasury(id: &str) -> Asset {
        Asset {
            asset_type: AssetType::TreasuryBond,
            index: Some(IndexKind::Ipca),
            rate: Some(dec!(5.83)),
            maturity: date(2029, 8, 15).into(),
            pays_semiannual_interest: true,
            ..stock(id, "TESOURO-IPCA-2029")
        }
    }

    fn transaction(
        asset_id: &str,
        transaction_type: TransactionType,
        when: NaiveDate,
        quantity: Decimal,
        price: Decimal,
    ) -> Transaction {
        let now = Utc::now().naive_utc();
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            transaction_type,
            date: when,
            quantity,
            unit_price: price,
            fees: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn price(asset_id: &str, when: NaiveDate, value: Decimal) -> PricePoint {
        PricePoint {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            date: when,
            price: value,
            volume: None,
            dividend_yield: Some(dec!(1.2)),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn service(
        assets: Vec<Asset>,
        transactions: Vec<Transaction>,
        prices: Vec<PricePoint>,
    ) -> PortfolioService {
        PortfolioService::new(
            Arc::new(InMemoryAssets(Mutex::new(assets))),
            Arc::new(InMemoryTransactions(Mutex::new(transactions))),
            Arc::new(InMemoryPrices(Mutex::new(prices))),
        )
    }

    #[test]
    fn summary_folds_positions_and_skips_unpriced_current_values() {
        let service = service(
            vec![stock("a", "PETR4"), stock("b", "VALE3")],
            vec![
                transaction("a", TransactionType::Buy, date(2024, 1, 2), dec!(10), dec!(100)),
                transaction("b", TransactionType::Buy, date(2024, 1, 3), dec!(5), dec!(50)),
            ],
            vec![price("a", date(2024, 2, 1), dec!(110))],
        );

        let summary = service.portfolio_summary().unwrap();
        assert_eq!(summary.total_invested, dec!(1250));
        // only asset "a" has a price
        assert_eq!(summary.current_total, dec!(1100));
        assert_eq!(summary.positions.len(), 2);
    }

    #[test]
    fn treasury_position_gets_the_estimated_yield() {
        let service = service(
            vec![treasury("bond")],
            vec![transaction(
                "bond",
                TransactionType::Buy,
                date(2024, 1, 2),
                dec!(1),
                dec!(2500),
            )],
            vec![price("bond", date(2024, 2, 1), dec!(2550))],
        );

        let position = service.asset_position("bond").unwrap().unwrap();
        // overridden: not the 1.2 recorded on the price point
        let estimated = position.last_dividend_yield.unwrap();
        assert_ne!(estimated, dec!(1.2));
        assert!(estimated > Decimal::ZERO);
    }

    #[tokio::test]
    async fn evolution_aggregates_across_assets_by_day() {
        let shared = date(2024, 2, 1);
        let service = service(
            vec![stock("a", "PETR4"), stock("b", "VALE3")],
            vec![
                transaction("a", TransactionType::Buy, date(2024, 1, 2), dec!(10), dec!(100)),
                transaction("b", TransactionType::Buy, date(2024, 1, 3), dec!(5), dec!(50)),
            ],
            vec![
                price("a", shared, dec!(110)),
                price("b", shared, dec!(60)),
                price("a", date(2024, 2, 2), dec!(111)),
                price("b", date(2024, 2, 3), dec!(61)),
            ],
        );

        let evolution = service
            .portfolio_evolution(date(2024, 1, 1), date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(evolution.len(), 3);
        assert!(evolution.iter().all(|p| !p.estimated));
        assert_eq!(evolution[0].date, shared);
        assert_eq!(evolution[0].total, dec!(10) * dec!(110) + dec!(5) * dec!(60));
        assert_eq!(evolution[1].total, dec!(10) * dec!(111));
        assert_eq!(evolution[2].total, dec!(5) * dec!(61));
    }

    #[tokio::test]
    async fn thin_history_triggers_the_synthetic_fallback() {
        let service = service(
            vec![stock("a", "PETR4")],
            vec![transaction(
                "a",
                TransactionType::Buy,
                date(2023, 1, 2),
                dec!(10),
                dec!(100),
            )],
            vec![price("a", date(2023, 6, 1), dec!(110))],
        );

        let evolution = service
            .portfolio_evolution(date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert!(evolution.len() > 2);
        assert!(evolution.iter().any(|p| p.estimated));
        assert!(evolution.iter().all(|p| p.total >= dec!(1000)));
    }

    #[test]
    fn distribution_groups_by_type_descending() {
        let service = service(
            vec![stock("a", "PETR4"), treasury("bond")],
            vec![
                transaction("a", TransactionType::Buy, date(2024, 1, 2), dec!(10), dec!(100)),
                transaction(
                    "bond",
                    TransactionType::Buy,
                    date(2024, 1, 2),
                    dec!(2),
                    dec!(2500),
                ),
            ],
            vec![
                price("a", date(2024, 2, 1), dec!(110)),
                price("bond", date(2024, 2, 1), dec!(2600)),
            ],
        );

        let distribution = service.distribution().unwrap();
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution[0].asset_type, AssetType::TreasuryBond);
        assert_eq!(distribution[0].total, dec!(5200));
        assert_eq!(distribution[1].total, dec!(1100));
    }

    #[test]
    fn performance_seeds_the_period_start_from_earlier_transactions() {
        let service = service(
            vec![stock("a", "PETR4")],
            vec![
                transaction("a", TransactionType::Buy, date(2023, 6, 1), dec!(10), dec!(90)),
                transaction("a", TransactionType::Buy, date(2024, 2, 1), dec!(5), dec!(105)),
            ],
            vec![
                price("a", date(2024, 1, 5), dec!(100)),
                price("a", date(2024, 3, 5), dec!(120)),
            ],
        );

        let performance = service
            .performance(date(2024, 1, 1), date(2024, 3, 31))
            .unwrap();

        assert_eq!(performance.initial_value, dec!(1000));
        assert_eq!(performance.final_value, dec!(15) * dec!(120));
        assert_eq!(performance.contributions, dec!(525));
        assert_eq!(performance.withdrawals, Decimal::ZERO);
    }

    #[test]
    fn wealth_curve_and_schedule_are_wired_to_the_ledger() {
        let service = service(
            vec![treasury("bond")],
            vec![transaction(
                "bond",
                TransactionType::Buy,
                date(2024, 1, 2),
                dec!(1),
                dec!(2500),
            )],
            vec![price("bond", date(2024, 8, 1), dec!(2600))],
        );

        let curve = service
            .wealth_curve(date(2024, 1, 1), date(2024, 9, 1))
            .unwrap();
        assert!(!curve.is_empty());
        assert!(curve.iter().any(|p| p.has_payment));

        let payments = service.semiannual_payments("bond").unwrap();
        assert!(!payments.is_empty());
        assert_eq!(payments[0].expected_amount, dec!(72.875));
    }
}
