use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::assets_errors::{AssetError, Result};

/// Instrument categories tracked by the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    TreasuryBond,
    Savings,
    CertificateOfDeposit,
    RealEstateFund,
    Reit,
    DomesticStock,
    ForeignStock,
    Debenture,
    DigitalFixedIncome,
    StakedCrypto,
    RealEstateCreditCertificate,
    InfrastructureFund,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::TreasuryBond => "TREASURY_BOND",
            AssetType::Savings => "SAVINGS",
            AssetType::CertificateOfDeposit => "CERTIFICATE_OF_DEPOSIT",
            AssetType::RealEstateFund => "REAL_ESTATE_FUND",
            AssetType::Reit => "REIT",
            AssetType::DomesticStock => "DOMESTIC_STOCK",
            AssetType::ForeignStock => "FOREIGN_STOCK",
            AssetType::Debenture => "DEBENTURE",
            AssetType::DigitalFixedIncome => "DIGITAL_FIXED_INCOME",
            AssetType::StakedCrypto => "STAKED_CRYPTO",
            AssetType::RealEstateCreditCertificate => "REAL_ESTATE_CREDIT_CERTIFICATE",
            AssetType::InfrastructureFund => "INFRASTRUCTURE_FUND",
            AssetType::Other => "OTHER",
        }
    }

    /// Fixed-income subtypes carry index/rate/maturity/coupon attributes.
    pub fn is_fixed_income(&self) -> bool {
        matches!(
            self,
            AssetType::TreasuryBond
                | AssetType::Savings
                | AssetType::CertificateOfDeposit
                | AssetType::Debenture
                | AssetType::DigitalFixedIncome
                | AssetType::RealEstateCreditCertificate
        )
    }
}

impl FromStr for AssetType {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TREASURY_BOND" => Ok(AssetType::TreasuryBond),
            "SAVINGS" => Ok(AssetType::Savings),
            "CERTIFICATE_OF_DEPOSIT" => Ok(AssetType::CertificateOfDeposit),
            "REAL_ESTATE_FUND" => Ok(AssetType::RealEstateFund),
            "REIT" => Ok(AssetType::Reit),
            "DOMESTIC_STOCK" => Ok(AssetType::DomesticStock),
            "FOREIGN_STOCK" => Ok(AssetType::ForeignStock),
            "DEBENTURE" => Ok(AssetType::Debenture),
            "DIGITAL_FIXED_INCOME" => Ok(AssetType::DigitalFixedIncome),
            "STAKED_CRYPTO" => Ok(AssetType::StakedCrypto),
            "REAL_ESTATE_CREDIT_CERTIFICATE" => Ok(AssetType::RealEstateCreditCertificate),
            "INFRASTRUCTURE_FUND" => Ok(AssetType::InfrastructureFund),
            "OTHER" => Ok(AssetType::Other),
            other => Err(AssetError::InvalidData(format!(
                "Unknown asset type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing currency of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            other => Err(AssetError::InvalidData(format!(
                "Unknown currency: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate index a fixed-income instrument is contracted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexKind {
    /// Fixed nominal rate, no index.
    Fixed,
    /// Interbank deposit rate (CDI).
    Cdi,
    /// Consumer price inflation index (IPCA).
    Ipca,
    /// Central bank policy rate (SELIC).
    Selic,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Fixed => "FIXED",
            IndexKind::Cdi => "CDI",
            IndexKind::Ipca => "IPCA",
            IndexKind::Selic => "SELIC",
        }
    }
}

impl FromStr for IndexKind {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "FIXED" => Ok(IndexKind::Fixed),
            "CDI" => Ok(IndexKind::Cdi),
            "IPCA" => Ok(IndexKind::Ipca),
            "SELIC" => Ok(IndexKind::Selic),
            other => Err(AssetError::InvalidData(format!(
                "Unknown rate index: {}",
                other
            ))),
        }
    }
}

/// Domain model representing a tradable instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub asset_type: AssetType,
    pub currency: Currency,
    pub description: Option<String>,
    pub sector: Option<String>,
    /// Contracted rate index. Meaningful only for fixed-income types.
    pub index: Option<IndexKind>,
    /// Contracted real annual rate in percent. Meaningful only for fixed-income types.
    pub rate: Option<Decimal>,
    pub maturity: Option<NaiveDate>,
    pub pays_semiannual_interest: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Asset {
    /// True for inflation-indexed treasury bonds with a contracted rate and
    /// maturity, the precondition for the inflation-linked yield estimators.
    pub fn is_inflation_indexed_treasury(&self) -> bool {
        self.asset_type == AssetType::TreasuryBond
            && self.index == Some(IndexKind::Ipca)
            && self.rate.is_some()
            && self.maturity.is_some()
    }
}

/// Input model for creating a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub id: Option<String>,
    pub ticker: String,
    pub name: String,
    pub asset_type: AssetType,
    pub currency: Currency,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub index: Option<IndexKind>,
    pub rate: Option<Decimal>,
    pub maturity: Option<NaiveDate>,
    #[serde(default)]
    pub pays_semiannual_interest: bool,
}

impl NewAsset {
    /// Validates the new asset data
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Asset ticker cannot be empty".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Asset name cannot be empty".to_string(),
            ));
        }
        if let Some(rate) = self.rate {
            if rate < Decimal::ZERO {
                return Err(AssetError::InvalidData(
                    "Contracted rate cannot be negative".to_string(),
                ));
            }
        }
        if !self.asset_type.is_fixed_income()
            && (self.index.is_some()
                || self.rate.is_some()
                || self.maturity.is_some()
                || self.pays_semiannual_interest)
        {
            return Err(AssetError::InvalidData(format!(
                "Index, rate, maturity and coupon attributes only apply to fixed-income assets, not {}",
                self.asset_type
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    pub id: String,
    pub ticker: String,
    pub name: String,
    pub asset_type: AssetType,
    pub currency: Currency,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub index: Option<IndexKind>,
    pub rate: Option<Decimal>,
    pub maturity: Option<NaiveDate>,
    #[serde(default)]
    pub pays_semiannual_interest: bool,
}

impl UpdateAsset {
    /// Validates the asset update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        let as_new = NewAsset {
            id: Some(self.id.clone()),
            ticker: self.ticker.clone(),
            name: self.name.clone(),
            asset_type: self.asset_type,
            currency: self.currency,
            description: self.description.clone(),
            sector: self.sector.clone(),
            index: self.index,
            rate: self.rate,
            maturity: self.maturity,
            pays_semiannual_interest: self.pays_semiannual_interest,
        };
        as_new.validate()
    }
}
