use crate::core::loan_type::LoanType;
use crate::core::product::{LoanProduct, ProductId};
use crate::core::risk_band::{RateAdjustment, RiskBand, RiskBandTable, TierThresholds};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only, in-memory set of loan products keyed by id.
///
/// Stands in for the product store the engine's callers own. The engine
/// only ever reads from it.
///
/// # Examples
///
/// ```
/// use loan_simulator::core::catalog::ProductCatalog;
/// use loan_simulator::core::loan_type::LoanType;
/// use loan_simulator::core::product::ProductId;
///
/// let catalog = ProductCatalog::with_defaults();
/// let home = catalog.active(ProductId::new(1)).unwrap();
/// assert_eq!(home.loan_type, LoanType::Home);
/// assert_eq!(catalog.active_products().count(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CatalogFile", into = "CatalogFile")]
pub struct ProductCatalog {
    products: BTreeMap<ProductId, LoanProduct>,
}

/// On-disk shape: `{ "products": [ ... ] }`.
#[derive(Serialize, Deserialize)]
struct CatalogFile {
    products: Vec<LoanProduct>,
}

impl From<CatalogFile> for ProductCatalog {
    fn from(file: CatalogFile) -> Self {
        file.products.into_iter().collect()
    }
}

impl From<ProductCatalog> for CatalogFile {
    fn from(catalog: ProductCatalog) -> Self {
        CatalogFile {
            products: catalog.products.into_values().collect(),
        }
    }
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three standard products every fresh installation starts with.
    pub fn with_defaults() -> Self {
        let thresholds = TierThresholds::default();
        let tiered = |excellent, fair, poor| {
            let band = |name: &str, delta| {
                let mut band = RiskBand::new(name, RateAdjustment::Additive(delta));
                if let Some(t) = thresholds.get(name) {
                    band.max_dti = Some(t.max_dti);
                    band.max_ltv = t.max_ltv;
                }
                band
            };
            RiskBandTable::new(
                vec![
                    band("excellent", excellent),
                    band("good", Decimal::ZERO),
                    band("fair", fair),
                ],
                band("poor", poor),
            )
        };

        [
            LoanProduct {
                id: ProductId::new(1),
                name: "Home Loan Standard".into(),
                loan_type: LoanType::Home,
                min_amount: dec!(50_000),
                max_amount: dec!(1_000_000),
                min_term_months: 60,
                max_term_months: 360,
                base_rate: dec!(4.5),
                max_ltv: Some(dec!(80)),
                max_dti: dec!(36),
                origination_fee_percent: dec!(0.5),
                risk_bands: tiered(dec!(-0.5), dec!(1.0), dec!(2.5)),
                is_active: true,
            },
            LoanProduct {
                id: ProductId::new(2),
                name: "Auto Loan Standard".into(),
                loan_type: LoanType::Vehicle,
                min_amount: dec!(5_000),
                max_amount: dec!(100_000),
                min_term_months: 12,
                max_term_months: 84,
                base_rate: dec!(3.9),
                max_ltv: Some(dec!(90)),
                max_dti: dec!(40),
                origination_fee_percent: dec!(1.0),
                risk_bands: tiered(dec!(-0.4), dec!(1.5), dec!(3.0)),
                is_active: true,
            },
            LoanProduct {
                id: ProductId::new(3),
                name: "Personal Loan Standard".into(),
                loan_type: LoanType::Personal,
                min_amount: dec!(1_000),
                max_amount: dec!(50_000),
                min_term_months: 12,
                max_term_months: 60,
                base_rate: dec!(6.9),
                max_ltv: None,
                max_dti: dec!(43),
                origination_fee_percent: dec!(2.0),
                risk_bands: tiered(dec!(-1.0), dec!(2.0), dec!(5.0)),
                is_active: true,
            },
        ]
        .into_iter()
        .collect()
    }

    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Insert or replace a product, returning the previous record.
    pub fn insert(&mut self, product: LoanProduct) -> Option<LoanProduct> {
        self.products.insert(product.id, product)
    }

    /// Look up a product regardless of its active flag.
    pub fn get(&self, id: ProductId) -> Option<&LoanProduct> {
        self.products.get(&id)
    }

    /// Look up a product that accepts new simulations.
    pub fn active(&self, id: ProductId) -> Option<&LoanProduct> {
        self.get(id).filter(|p| p.is_active)
    }

    /// Active products in id order.
    pub fn active_products(&self) -> impl Iterator<Item = &LoanProduct> {
        self.products.values().filter(|p| p.is_active)
    }

    /// Active products of one loan type, in id order.
    pub fn products_of_type(&self, loan_type: LoanType) -> impl Iterator<Item = &LoanProduct> {
        self.active_products()
            .filter(move |p| p.loan_type == loan_type)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<LoanProduct> for ProductCatalog {
    fn from_iter<T: IntoIterator<Item = LoanProduct>>(iter: T) -> Self {
        Self {
            products: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}
