//! Sub-category billing reconciliation
//!
//! Goods bought as GL or GV are expected to be billed to customers later.
//! Each (date, product) row compares what arrived in those sub-categories
//! with what was billed the same day, and a running carry-forward tracks the
//! cumulative quantity still unbilled. Direct purchases are shown but never
//! enter the carry.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use core_kernel::{CalendarDate, Quantity, UnitMetric};

use crate::filter::ReportFilter;
use crate::party::names_match;
use crate::records::SubCategory;
use crate::snapshot::Snapshot;

/// One (date, product) row of the reconciliation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryRow {
    pub date: CalendarDate,
    pub product: String,
    pub direct: Quantity,
    pub gl: Quantity,
    pub gv: Quantity,
    pub billed: Quantity,
    /// `gl + gv − billed` for this row alone
    pub unbilled: Quantity,
    /// Cumulative unbilled quantity up to and including this row
    pub carry_forward: Quantity,
}

/// Column totals; `total_unbilled` is the last row's carry, not a sum
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryTotals {
    pub direct: Quantity,
    pub gl: Quantity,
    pub gv: Quantity,
    pub billed: Quantity,
    pub total_unbilled: Quantity,
}

/// The reconciliation report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryReport {
    /// Metric every quantity is expressed in
    pub metric: UnitMetric,
    pub rows: Vec<SubCategoryRow>,
    pub totals: SubCategoryTotals,
}

#[derive(Debug, Default)]
struct Buckets {
    product: String,
    direct: Quantity,
    gl: Quantity,
    gv: Quantity,
    billed: Quantity,
}

/// Fills `unbilled` and `carry_forward` on rows already in date order
///
/// Returns the final carry, zero for no rows.
pub fn carry_forward(rows: &mut [SubCategoryRow]) -> Quantity {
    let mut carry = Quantity::ZERO;
    for row in rows.iter_mut() {
        row.unbilled = row.gl + row.gv - row.billed;
        carry += row.unbilled;
        row.carry_forward = carry;
    }
    carry
}

/// Builds the reconciliation for the purchases and sales passing `filter`
///
/// Billed quantity is the quantity of sales on the same date for the same
/// product, excluding sales tagged Direct, and only for products that
/// appear among the sub-category purchases. A sale-only (date, product)
/// pair still yields a row so the carry decreases.
pub fn reconcile(snapshot: &Snapshot, filter: &ReportFilter) -> SubCategoryReport {
    let metric = filter.metric.unwrap_or_default();
    let ratio = snapshot.settings().bags_per_ton;
    let product = filter.product_selection();
    let in_scope = |date: Option<CalendarDate>, name: &str| {
        filter.range.contains(date) && product.map_or(true, |p| names_match(name, p))
    };

    let mut grouped: BTreeMap<(CalendarDate, String), Buckets> = BTreeMap::new();
    let mut products: HashSet<String> = HashSet::new();

    for purchase in snapshot.purchases() {
        let (Some(date), Some(category)) = (purchase.date, purchase.sub_category) else {
            continue;
        };
        if !in_scope(purchase.date, &purchase.product) {
            continue;
        }
        let key = product_key(&purchase.product);
        products.insert(key.clone());

        let quantity = purchase.quantity.convert(&purchase.unit, metric, ratio);
        let buckets = grouped.entry((date, key)).or_insert_with(|| Buckets {
            product: purchase.product.clone(),
            ..Buckets::default()
        });
        match category {
            SubCategory::Direct => buckets.direct += quantity,
            SubCategory::Gl => buckets.gl += quantity,
            SubCategory::Gv => buckets.gv += quantity,
        }
    }

    for sale in snapshot.sales() {
        let Some(date) = sale.date else {
            continue;
        };
        if sale.sub_category == Some(SubCategory::Direct) || !in_scope(sale.date, &sale.product.name) {
            continue;
        }
        let key = product_key(&sale.product.name);
        if !products.contains(&key) {
            continue;
        }

        let quantity = sale.product.quantity.convert(&sale.product.unit, metric, ratio);
        grouped
            .entry((date, key))
            .or_insert_with(|| Buckets {
                product: sale.product.name.clone(),
                ..Buckets::default()
            })
            .billed += quantity;
    }

    let mut rows: Vec<SubCategoryRow> = grouped
        .into_iter()
        .map(|((date, _), b)| SubCategoryRow {
            date,
            product: b.product,
            direct: b.direct,
            gl: b.gl,
            gv: b.gv,
            billed: b.billed,
            unbilled: Quantity::ZERO,
            carry_forward: Quantity::ZERO,
        })
        .collect();
    let total_unbilled = carry_forward(&mut rows);

    let totals = SubCategoryTotals {
        direct: rows.iter().map(|r| r.direct).sum(),
        gl: rows.iter().map(|r| r.gl).sum(),
        gv: rows.iter().map(|r| r.gv).sum(),
        billed: rows.iter().map(|r| r.billed).sum(),
        total_unbilled,
    };

    debug!(rows = rows.len(), %metric, unbilled = %total_unbilled, "sub-category reconciled");

    SubCategoryReport {
        metric,
        rows,
        totals,
    }
}

fn product_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(day: u32, gl: i64, gv: i64, billed: i64) -> SubCategoryRow {
        SubCategoryRow {
            date: CalendarDate::from_ymd(2024, 1, day).unwrap(),
            product: "Cement".into(),
            direct: Quantity::ZERO,
            gl: Quantity::new(gl.into()),
            gv: Quantity::new(gv.into()),
            billed: Quantity::new(billed.into()),
            unbilled: Quantity::ZERO,
            carry_forward: Quantity::ZERO,
        }
    }

    #[test]
    fn test_carry_forward_accumulates() {
        let mut rows = vec![row(1, 10, 0, 0), row(2, 0, 0, 7)];
        let last = carry_forward(&mut rows);

        assert_eq!(rows[0].carry_forward.value(), dec!(10));
        assert_eq!(rows[1].unbilled.value(), dec!(-7));
        assert_eq!(rows[1].carry_forward.value(), dec!(3));
        assert_eq!(last.value(), dec!(3));
    }

    #[test]
    fn test_carry_forward_empty() {
        assert!(carry_forward(&mut []).is_zero());
    }
}
