//! Basic financial statement items of a securities report.

use crate::error::Result;
use crate::mapper::{
    CURRENT_YEAR_DURATION, CURRENT_YEAR_INSTANT, float_with_fallback, int_with_fallback,
};
use crate::parser::FactMapper;
use edinet_data::xbrl::{FactTable, PFS_PREFIX};
use serde::{Deserialize, Serialize};

/// Cover page and summary of business results
const CRP_PREFIX: &str = "jpcrp_cor";

/// Headline balance sheet, income statement and cash flow figures (JPY),
/// plus the per-share and ratio figures of the business results summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicFinancials {
    /// Total assets
    pub assets: Option<i64>,
    /// Current assets
    pub current_assets: Option<i64>,
    /// Non-current assets
    pub noncurrent_assets: Option<i64>,
    /// Total liabilities
    pub liabilities: Option<i64>,
    /// Current liabilities
    pub current_liabilities: Option<i64>,
    /// Non-current liabilities
    pub noncurrent_liabilities: Option<i64>,
    /// Net assets
    pub net_assets: Option<i64>,
    /// Liabilities and net assets
    pub liabilities_and_net_assets: Option<i64>,

    /// Net sales
    pub net_sales: Option<i64>,
    /// Operating income
    pub operating_income: Option<i64>,
    /// Ordinary income
    pub ordinary_income: Option<i64>,
    /// Profit (loss)
    pub profit_loss: Option<i64>,

    /// Net cash from operating activities
    pub operating_cashflow: Option<i64>,
    /// Net cash from investing activities
    pub investment_cashflow: Option<i64>,
    /// Net cash from financing activities
    pub financing_cashflow: Option<i64>,
    /// Operating plus investing cash flow
    pub free_cashflow: Option<i64>,

    /// Equity to asset ratio, as a fraction
    pub equity_ratio: Option<f64>,
    /// Basic earnings (loss) per share
    pub basic_eps: Option<f64>,
}

/// Reads [`BasicFinancials`] from `jppfs_cor` facts, and the ratios from
/// the `jpcrp_cor` summary of business results.
///
/// Consolidated figures are preferred; the non-consolidated ones are used
/// when a filer reports no consolidated statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFinancialsMapper;

impl BasicFinancialsMapper {
    fn instant(facts: &FactTable, tag: &str) -> Result<Option<i64>> {
        int_with_fallback(facts, PFS_PREFIX, tag, CURRENT_YEAR_INSTANT)
    }

    fn duration(facts: &FactTable, tag: &str) -> Result<Option<i64>> {
        int_with_fallback(facts, PFS_PREFIX, tag, CURRENT_YEAR_DURATION)
    }
}

impl FactMapper for BasicFinancialsMapper {
    type Record = BasicFinancials;

    fn map(&self, facts: &FactTable) -> Result<BasicFinancials> {
        let operating_cashflow =
            Self::duration(facts, "NetCashProvidedByUsedInOperatingActivities")?;
        let investment_cashflow =
            Self::duration(facts, "NetCashProvidedByUsedInInvestmentActivities")?;
        let free_cashflow = match (operating_cashflow, investment_cashflow) {
            (Some(op), Some(inv)) => op.checked_add(inv),
            _ => None,
        };

        Ok(BasicFinancials {
            assets: Self::instant(facts, "Assets")?,
            current_assets: Self::instant(facts, "CurrentAssets")?,
            noncurrent_assets: Self::instant(facts, "NoncurrentAssets")?,
            liabilities: Self::instant(facts, "Liabilities")?,
            current_liabilities: Self::instant(facts, "CurrentLiabilities")?,
            noncurrent_liabilities: Self::instant(facts, "NoncurrentLiabilities")?,
            net_assets: Self::instant(facts, "NetAssets")?,
            liabilities_and_net_assets: Self::instant(facts, "LiabilitiesAndNetAssets")?,

            net_sales: Self::duration(facts, "NetSales")?,
            operating_income: Self::duration(facts, "OperatingIncome")?,
            ordinary_income: Self::duration(facts, "OrdinaryIncome")?,
            profit_loss: Self::duration(facts, "ProfitLoss")?,

            operating_cashflow,
            investment_cashflow,
            financing_cashflow: Self::duration(facts, "NetCashProvidedByUsedInFinancingActivities")?,
            free_cashflow,

            equity_ratio: float_with_fallback(
                facts,
                CRP_PREFIX,
                "EquityToAssetRatioSummaryOfBusinessResults",
                CURRENT_YEAR_INSTANT,
            )?,
            basic_eps: float_with_fallback(
                facts,
                CRP_PREFIX,
                "BasicEarningsLossPerShareSummaryOfBusinessResults",
                CURRENT_YEAR_DURATION,
            )?,
        })
    }
}
