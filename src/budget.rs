//! Budget details: the nested `year → organization → {cash, inkind} → category`
//! structure edited on the budget screen, and its normalization into
//! `project_budgets` / `budget_items` rows.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::BudgetItem;
use crate::validate;

/// Category code → amount.
pub type Amounts = BTreeMap<String, i64>;

/// Year → organization → split, as submitted and as returned.
pub type YearMap<T> = BTreeMap<i32, BTreeMap<Uuid, T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundType {
    Cash,
    Inkind,
}

impl FundType {
    pub fn as_str(self) -> &'static str {
        match self {
            FundType::Cash => "cash",
            FundType::Inkind => "inkind",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(FundType::Cash),
            "inkind" => Some(FundType::Inkind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundSplit {
    #[serde(default)]
    pub cash: Amounts,
    #[serde(default)]
    pub inkind: Amounts,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetailsRequest {
    pub project_id: Option<Uuid>,
    pub years: Option<YearMap<FundSplit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedItem {
    pub category_code: String,
    pub fund_type: FundType,
    pub amount: i64,
}

/// One `project_budgets` row to upsert, with the items that replace its current ones.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBudget {
    pub project_year: i32,
    pub organization_id: Uuid,
    pub cash_amount: i64,
    pub inkind_amount: i64,
    pub total_amount: i64,
    pub items: Vec<PlannedItem>,
}

/// Validates the submitted structure and computes the rows it normalizes to.
///
/// Zero amounts produce no item but still count toward keeping the
/// (year, organization) budget row.
pub fn plan(
    years: &YearMap<FundSplit>,
    total_years: i32,
    categories: &HashSet<String>,
) -> Result<Vec<PlannedBudget>, AppError> {
    let mut planned = Vec::new();

    for (&year, organizations) in years {
        validate::project_year(year, total_years)?;

        for (&organization_id, split) in organizations {
            let mut items = Vec::new();
            let cash_amount = collect(&split.cash, FundType::Cash, categories, &mut items)?;
            let inkind_amount = collect(&split.inkind, FundType::Inkind, categories, &mut items)?;
            let total_amount = cash_amount
                .checked_add(inkind_amount)
                .ok_or_else(overflow)?;

            planned.push(PlannedBudget {
                project_year: year,
                organization_id,
                cash_amount,
                inkind_amount,
                total_amount,
                items,
            });
        }
    }

    Ok(planned)
}

fn collect(
    amounts: &Amounts,
    fund_type: FundType,
    categories: &HashSet<String>,
    items: &mut Vec<PlannedItem>,
) -> Result<i64, AppError> {
    let mut sum: i64 = 0;
    for (code, &amount) in amounts {
        if !categories.contains(code) {
            return Err(AppError::BadRequest(format!(
                "알 수 없는 예산 항목입니다: {code}"
            )));
        }
        if amount < 0 {
            return Err(AppError::BadRequest(format!(
                "예산 금액은 0 이상이어야 합니다: {code} = {amount}"
            )));
        }
        sum = sum.checked_add(amount).ok_or_else(overflow)?;
        if amount > 0 {
            items.push(PlannedItem {
                category_code: code.clone(),
                fund_type,
                amount,
            });
        }
    }
    Ok(sum)
}

fn overflow() -> AppError {
    AppError::BadRequest("예산 금액이 허용 범위를 초과했습니다.".to_string())
}

/// Sum of every planned budget's total.
pub fn grand_total(planned: &[PlannedBudget]) -> Result<i64, AppError> {
    planned
        .iter()
        .try_fold(0i64, |acc, b| acc.checked_add(b.total_amount))
        .ok_or_else(overflow)
}

fn add(acc: &mut i64, amount: i64) -> Result<(), AppError> {
    *acc = acc.checked_add(amount).ok_or_else(overflow)?;
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationBudget {
    pub organization_name: String,
    pub cash: Amounts,
    pub inkind: Amounts,
    pub cash_total: i64,
    pub inkind_total: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct YearTotal {
    pub cash: i64,
    pub inkind: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetails {
    pub project_id: Uuid,
    pub years: YearMap<OrganizationBudget>,
    pub year_totals: BTreeMap<i32, YearTotal>,
    pub grand_total: i64,
}

/// Budget row identity, used so rows without items still show up.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BudgetKey {
    pub project_year: i32,
    pub organization_id: Uuid,
    pub organization_name: String,
}

/// Rebuilds the nested view from stored rows. Totals are recomputed from items.
pub fn summarize(
    project_id: Uuid,
    budgets: &[BudgetKey],
    items: &[BudgetItem],
) -> Result<BudgetDetails, AppError> {
    let mut years: YearMap<OrganizationBudget> = BTreeMap::new();

    for budget in budgets {
        years
            .entry(budget.project_year)
            .or_default()
            .entry(budget.organization_id)
            .or_insert_with(|| OrganizationBudget {
                organization_name: budget.organization_name.clone(),
                ..Default::default()
            });
    }

    for item in items {
        let entry = years
            .entry(item.project_year)
            .or_default()
            .entry(item.organization_id)
            .or_insert_with(|| OrganizationBudget {
                organization_name: item.organization_name.clone(),
                ..Default::default()
            });

        match FundType::parse(&item.fund_type) {
            Some(FundType::Cash) => {
                add(entry.cash.entry(item.category_code.clone()).or_default(), item.amount)?;
                add(&mut entry.cash_total, item.amount)?;
            }
            Some(FundType::Inkind) => {
                add(entry.inkind.entry(item.category_code.clone()).or_default(), item.amount)?;
                add(&mut entry.inkind_total, item.amount)?;
            }
            None => {
                tracing::warn!(fund_type = %item.fund_type, "Skipping budget item with unknown fund type");
                continue;
            }
        }
        entry.total = entry
            .cash_total
            .checked_add(entry.inkind_total)
            .ok_or_else(overflow)?;
    }

    let mut year_totals = BTreeMap::new();
    let mut grand_total = 0;
    for (&year, organizations) in &years {
        let mut totals = YearTotal::default();
        for org in organizations.values() {
            add(&mut totals.cash, org.cash_total)?;
            add(&mut totals.inkind, org.inkind_total)?;
            add(&mut totals.total, org.total)?;
        }
        add(&mut grand_total, totals.total)?;
        year_totals.insert(year, totals);
    }

    Ok(BudgetDetails {
        project_id,
        years,
        year_totals,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> HashSet<String> {
        ["personnel", "equipment", "activity", "allowance", "indirect"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn parse(value: serde_json::Value) -> YearMap<FundSplit> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn plan_sums_cash_and_inkind_per_year_and_organization() {
        let lead = Uuid::now_v7();
        let partner = Uuid::now_v7();
        let years = parse(json!({
            "1": {
                lead.to_string(): {
                    "cash": { "personnel": 1000, "equipment": 500 },
                    "inkind": { "personnel": 300 }
                },
                partner.to_string(): {
                    "cash": { "activity": 200 }
                }
            },
            "2": {
                lead.to_string(): {
                    "cash": { "personnel": 1200 },
                    "inkind": { "indirect": 0 }
                }
            }
        }));

        let planned = plan(&years, 3, &categories()).unwrap();
        assert_eq!(planned.len(), 3);

        let first = planned
            .iter()
            .find(|b| b.project_year == 1 && b.organization_id == lead)
            .unwrap();
        assert_eq!(first.cash_amount, 1500);
        assert_eq!(first.inkind_amount, 300);
        assert_eq!(first.total_amount, 1800);
        assert_eq!(first.items.len(), 3);

        let second = planned
            .iter()
            .find(|b| b.project_year == 2 && b.organization_id == lead)
            .unwrap();
        assert_eq!(second.total_amount, 1200);
        // zero amounts are not stored as items
        assert_eq!(second.items.len(), 1);

        assert_eq!(grand_total(&planned).unwrap(), 1800 + 200 + 1200);
    }

    #[test]
    fn plan_rejects_year_outside_project() {
        let org = Uuid::now_v7();
        let years = parse(json!({ "4": { org.to_string(): { "cash": { "personnel": 1 } } } }));
        assert!(matches!(
            plan(&years, 3, &categories()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn plan_rejects_unknown_category_and_negative_amount() {
        let org = Uuid::now_v7();
        let unknown = parse(json!({ "1": { org.to_string(): { "cash": { "travel": 1 } } } }));
        assert!(plan(&unknown, 1, &categories()).is_err());

        let negative = parse(json!({ "1": { org.to_string(): { "inkind": { "personnel": -5 } } } }));
        assert!(plan(&negative, 1, &categories()).is_err());
    }

    #[test]
    fn plan_rejects_overflowing_totals() {
        let org = Uuid::now_v7();
        let years = parse(json!({
            "1": { org.to_string(): {
                "cash": { "personnel": i64::MAX },
                "inkind": { "personnel": 1 }
            } }
        }));
        assert!(plan(&years, 1, &categories()).is_err());
    }

    #[test]
    fn grand_total_rejects_overflow_across_organizations() {
        let lead = Uuid::now_v7();
        let partner = Uuid::now_v7();
        let half = i64::MAX / 2 + 1;
        let years = parse(json!({
            "1": {
                lead.to_string(): { "cash": { "personnel": half } },
                partner.to_string(): { "cash": { "personnel": half } }
            }
        }));

        let planned = plan(&years, 1, &categories()).unwrap();
        assert!(matches!(grand_total(&planned), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn summarize_rejects_overflowing_items() {
        let org = Uuid::now_v7();
        let item = |amount| BudgetItem {
            project_year: 1,
            organization_id: org,
            organization_name: "한국연구원".to_string(),
            category_code: "personnel".to_string(),
            fund_type: "cash".to_string(),
            amount,
        };
        let items = vec![item(i64::MAX), item(1)];
        assert!(summarize(Uuid::now_v7(), &[], &items).is_err());
    }

    #[test]
    fn summarize_rebuilds_nested_totals() {
        let project_id = Uuid::now_v7();
        let org = Uuid::now_v7();
        let empty_org = Uuid::now_v7();
        let item = |year, code: &str, fund: &str, amount| BudgetItem {
            project_year: year,
            organization_id: org,
            organization_name: "한국연구원".to_string(),
            category_code: code.to_string(),
            fund_type: fund.to_string(),
            amount,
        };
        let budgets = vec![
            BudgetKey {
                project_year: 1,
                organization_id: org,
                organization_name: "한국연구원".to_string(),
            },
            BudgetKey {
                project_year: 1,
                organization_id: empty_org,
                organization_name: "빈기관".to_string(),
            },
        ];
        let items = vec![
            item(1, "personnel", "cash", 100),
            item(1, "personnel", "inkind", 40),
            item(1, "equipment", "cash", 60),
            item(2, "personnel", "cash", 10),
        ];

        let details = summarize(project_id, &budgets, &items).unwrap();
        let year1 = &details.years[&1];
        assert_eq!(year1[&org].cash_total, 160);
        assert_eq!(year1[&org].inkind_total, 40);
        assert_eq!(year1[&org].total, 200);
        assert_eq!(year1[&empty_org].total, 0);
        assert_eq!(
            details.year_totals[&1],
            YearTotal { cash: 160, inkind: 40, total: 200 }
        );
        assert_eq!(details.year_totals[&2].total, 10);
        assert_eq!(details.grand_total, 210);
    }
}
