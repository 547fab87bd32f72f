//! Grouped aggregates
//!
//! Each report here filters the snapshot, groups by its key, reduces and
//! sorts. Every sort ends with a tie-break on the group key so that output
//! order never depends on hash-map iteration.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{CalendarDate, CustomerId, Money, MonthKey, Quantity, Rate, UnitMetric};

use crate::classify::BalanceStatus;
use crate::filter::ReportFilter;
use crate::records::{StockMovement, TransactionRecord};
use crate::report::ReportData;
use crate::snapshot::Snapshot;

/// Label for expenses stored without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Customer identity of a sale or payment after resolution
///
/// Resolved customers are keyed by id; unresolved records fall back to
/// their own lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PartyKey {
    Known(CustomerId),
    Named(String),
}

fn resolve_party<'a>(snapshot: &'a Snapshot, id: &CustomerId, name: &'a str) -> (PartyKey, Option<CustomerId>, &'a str) {
    match snapshot.resolve_customer(id, name) {
        Some(customer) => (
            PartyKey::Known(customer.id.clone()),
            Some(customer.id.clone()),
            customer.name.as_str(),
        ),
        None => (PartyKey::Named(name.trim().to_lowercase()), None, name),
    }
}

/// Expresses a quantity in the requested display metric
///
/// Without a metric, or for units that are neither bags nor tons, the
/// quantity and unit are returned unchanged.
fn display_quantity(quantity: Quantity, unit: &str, metric: Option<UnitMetric>, ratio: Decimal) -> (Quantity, String) {
    match metric {
        Some(metric) if UnitMetric::from_unit(unit).is_some() => {
            (quantity.convert(unit, metric, ratio), metric.label().to_string())
        }
        _ => (quantity, unit.to_string()),
    }
}

fn lower(s: &str) -> String {
    s.trim().to_lowercase()
}

fn percentage(part: Money, whole: Money) -> Decimal {
    Rate::of(part, whole).as_percentage().round_dp(2)
}

// ============================================================================
// Item by party
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemByPartyRow {
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub product: String,
    pub unit: String,
    pub quantity: Quantity,
    pub amount: Money,
    pub transactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemByPartySummary {
    pub total_customers: usize,
    pub total_amount: Money,
    pub total_quantity: Quantity,
}

/// Sales grouped by customer, product and unit; largest amount first
pub fn item_by_party(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<ItemByPartyRow, ItemByPartySummary> {
    let ratio = snapshot.settings().bags_per_ton;
    let mut groups: HashMap<(PartyKey, String, String), ItemByPartyRow> = HashMap::new();

    for sale in filter.apply(snapshot).filter_map(TransactionRecord::as_sale) {
        let (party, customer_id, customer_name) = resolve_party(snapshot, &sale.customer_id, &sale.customer_name);
        let (quantity, unit) = display_quantity(sale.product.quantity, &sale.product.unit, filter.metric, ratio);

        let row = groups
            .entry((party, lower(&sale.product.name), lower(&unit)))
            .or_insert_with(|| ItemByPartyRow {
                customer_id,
                customer_name: customer_name.to_string(),
                product: sale.product.name.clone(),
                unit,
                quantity: Quantity::ZERO,
                amount: Money::ZERO,
                transactions: 0,
            });
        row.quantity += quantity;
        row.amount += sale.amount;
        row.transactions += 1;
    }

    let customers: HashSet<&PartyKey> = groups.keys().map(|(party, _, _)| party).collect();
    let total_customers = customers.len();

    let mut rows: Vec<ItemByPartyRow> = groups.into_values().collect();
    rows.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| lower(&a.customer_name).cmp(&lower(&b.customer_name)))
            .then_with(|| lower(&a.product).cmp(&lower(&b.product)))
            .then_with(|| a.unit.cmp(&b.unit))
    });

    let summary = ItemByPartySummary {
        total_customers,
        total_amount: rows.iter().map(|r| r.amount).sum(),
        total_quantity: rows.iter().map(|r| r.quantity).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Item summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummaryRow {
    pub product: String,
    pub unit: String,
    pub quantity: Quantity,
    pub amount: Money,
    pub customers: usize,
    pub transactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummaryTotals {
    pub total_products: usize,
    pub total_quantity: Quantity,
    pub total_amount: Money,
}

/// Sales grouped by product and unit; largest quantity first
pub fn item_summary(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<ItemSummaryRow, ItemSummaryTotals> {
    let ratio = snapshot.settings().bags_per_ton;
    let mut groups: HashMap<(String, String), (ItemSummaryRow, HashSet<PartyKey>)> = HashMap::new();

    for sale in filter.apply(snapshot).filter_map(TransactionRecord::as_sale) {
        let (party, _, _) = resolve_party(snapshot, &sale.customer_id, &sale.customer_name);
        let (quantity, unit) = display_quantity(sale.product.quantity, &sale.product.unit, filter.metric, ratio);

        let (row, parties) = groups
            .entry((lower(&sale.product.name), lower(&unit)))
            .or_insert_with(|| {
                let row = ItemSummaryRow {
                    product: sale.product.name.clone(),
                    unit,
                    quantity: Quantity::ZERO,
                    amount: Money::ZERO,
                    customers: 0,
                    transactions: 0,
                };
                (row, HashSet::new())
            });
        row.quantity += quantity;
        row.amount += sale.amount;
        row.transactions += 1;
        parties.insert(party);
    }

    let mut rows: Vec<ItemSummaryRow> = groups
        .into_values()
        .map(|(mut row, parties)| {
            row.customers = parties.len();
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| lower(&a.product).cmp(&lower(&b.product)))
            .then_with(|| a.unit.cmp(&b.unit))
    });

    let summary = ItemSummaryTotals {
        total_products: rows.len(),
        total_quantity: rows.iter().map(|r| r.quantity).sum(),
        total_amount: rows.iter().map(|r| r.amount).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Monthly summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub month: MonthKey,
    /// Long label, e.g. `January 2024`
    pub display_month: String,
    pub sales: Money,
    pub payments: Money,
    pub purchases: Money,
    pub expenses: Money,
    /// `sales − purchases − expenses`
    pub net: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub months: usize,
    pub sales: Money,
    pub payments: Money,
    pub purchases: Money,
    pub expenses: Money,
    pub net: Money,
}

/// Sales, payments, purchases and expenses per calendar month, oldest first
pub fn monthly_summary(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<MonthlyRow, MonthlyTotals> {
    let mut months: BTreeMap<MonthKey, MonthlyRow> = BTreeMap::new();

    for record in filter.apply(snapshot) {
        let Some(date) = record.date() else {
            continue;
        };
        let key = date.month_key();
        let row = months.entry(key).or_insert_with(|| MonthlyRow {
            month: key,
            display_month: key.label(),
            sales: Money::ZERO,
            payments: Money::ZERO,
            purchases: Money::ZERO,
            expenses: Money::ZERO,
            net: Money::ZERO,
        });
        match record {
            TransactionRecord::Sale(s) => row.sales += s.amount,
            TransactionRecord::Payment(p) => row.payments += p.amount,
            TransactionRecord::Purchase(p) => row.purchases += p.amount,
            TransactionRecord::Expense(e) => row.expenses += e.amount,
            TransactionRecord::AccountTransaction(_) | TransactionRecord::StockTransaction(_) => {}
        }
    }

    let rows: Vec<MonthlyRow> = months
        .into_values()
        .map(|mut row| {
            row.net = row.sales - row.purchases - row.expenses;
            row
        })
        .collect();

    let summary = MonthlyTotals {
        months: rows.len(),
        sales: rows.iter().map(|r| r.sales).sum(),
        payments: rows.iter().map(|r| r.payments).sum(),
        purchases: rows.iter().map(|r| r.purchases).sum(),
        expenses: rows.iter().map(|r| r.expenses).sum(),
        net: rows.iter().map(|r| r.net).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Party-wise
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRow {
    pub customer_id: Option<CustomerId>,
    pub name: String,
    /// Sales in range
    pub total_debit: Money,
    /// Payments in range
    pub total_credit: Money,
    pub balance: Money,
    pub last_transaction: Option<CalendarDate>,
    pub status: BalanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub parties: usize,
    pub total_debit: Money,
    pub total_credit: Money,
    pub net_balance: Money,
}

/// Sales and payments merged per customer; highest balance first
pub fn party_wise(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<PartyRow, PartySummary> {
    let mut groups: HashMap<PartyKey, PartyRow> = HashMap::new();

    for record in filter.apply(snapshot) {
        let (id, name, debit, credit, date) = match record {
            TransactionRecord::Sale(s) => (&s.customer_id, s.customer_name.as_str(), s.amount, Money::ZERO, s.date),
            TransactionRecord::Payment(p) => (&p.customer_id, p.customer_name.as_str(), Money::ZERO, p.amount, p.date),
            _ => continue,
        };
        let (party, customer_id, name) = resolve_party(snapshot, id, name);

        let row = groups.entry(party).or_insert_with(|| PartyRow {
            customer_id,
            name: name.to_string(),
            total_debit: Money::ZERO,
            total_credit: Money::ZERO,
            balance: Money::ZERO,
            last_transaction: None,
            status: BalanceStatus::Settled,
        });
        row.total_debit += debit;
        row.total_credit += credit;
        row.last_transaction = row.last_transaction.max(date);
    }

    let mut rows: Vec<PartyRow> = groups
        .into_values()
        .map(|mut row| {
            row.balance = row.total_debit - row.total_credit;
            row.status = BalanceStatus::from_balance(row.balance);
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        b.balance
            .cmp(&a.balance)
            .then_with(|| lower(&a.name).cmp(&lower(&b.name)))
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });

    let summary = PartySummary {
        parties: rows.len(),
        total_debit: rows.iter().map(|r| r.total_debit).sum(),
        total_credit: rows.iter().map(|r| r.total_credit).sum(),
        net_balance: rows.iter().map(|r| r.balance).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Vendor summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRow {
    pub vendor: String,
    pub quantity: Quantity,
    pub amount: Money,
    pub purchases: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub vendors: usize,
    pub total_amount: Money,
}

/// Purchases grouped by vendor; largest amount first
pub fn vendor_summary(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<VendorRow, VendorSummary> {
    let ratio = snapshot.settings().bags_per_ton;
    let mut groups: HashMap<String, VendorRow> = HashMap::new();

    for purchase in filter.apply(snapshot).filter_map(TransactionRecord::as_purchase) {
        let (quantity, _) = display_quantity(purchase.quantity, &purchase.unit, filter.metric, ratio);
        let row = groups
            .entry(lower(&purchase.vendor))
            .or_insert_with(|| VendorRow {
                vendor: purchase.vendor.clone(),
                quantity: Quantity::ZERO,
                amount: Money::ZERO,
                purchases: 0,
            });
        row.quantity += quantity;
        row.amount += purchase.amount;
        row.purchases += 1;
    }

    let mut rows: Vec<VendorRow> = groups.into_values().collect();
    rows.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| lower(&a.vendor).cmp(&lower(&b.vendor)))
    });

    let summary = VendorSummary {
        vendors: rows.len(),
        total_amount: rows.iter().map(|r| r.amount).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Expense summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRow {
    pub category: String,
    pub amount: Money,
    pub count: usize,
    /// Percentage of total expenses, two decimals
    pub share: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub categories: usize,
    pub total_expenses: Money,
}

/// Expenses grouped by category; largest amount first
pub fn expense_summary(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<ExpenseRow, ExpenseSummary> {
    let mut groups: HashMap<String, ExpenseRow> = HashMap::new();

    for expense in filter.apply(snapshot).filter_map(TransactionRecord::as_expense) {
        let category = match expense.category.as_str() {
            "" => UNCATEGORIZED,
            other => other,
        };
        let row = groups.entry(lower(category)).or_insert_with(|| ExpenseRow {
            category: category.to_string(),
            amount: Money::ZERO,
            count: 0,
            share: Decimal::ZERO,
        });
        row.amount += expense.amount;
        row.count += 1;
    }

    let total: Money = groups.values().map(|r| r.amount).sum();
    let mut rows: Vec<ExpenseRow> = groups
        .into_values()
        .map(|mut row| {
            row.share = percentage(row.amount, total);
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| lower(&a.category).cmp(&lower(&b.category)))
    });

    let summary = ExpenseSummary {
        categories: rows.len(),
        total_expenses: total,
    };
    ReportData { rows, summary }
}

// ============================================================================
// Stock summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product: String,
    pub unit: String,
    pub inward: Quantity,
    pub outward: Quantity,
    pub net: Quantity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub products: usize,
    pub total_in: Quantity,
    pub total_out: Quantity,
}

/// Stock movements per product and unit, alphabetical
///
/// Movements whose direction was not recognized are left out.
pub fn stock_summary(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<StockRow, StockSummary> {
    let ratio = snapshot.settings().bags_per_ton;
    let mut groups: HashMap<(String, String), StockRow> = HashMap::new();

    for movement in filter
        .apply(snapshot)
        .filter_map(TransactionRecord::as_stock_transaction)
    {
        let Some(direction) = movement.movement else {
            continue;
        };
        let (quantity, unit) = display_quantity(movement.quantity, &movement.unit, filter.metric, ratio);
        let row = groups
            .entry((lower(&movement.product), lower(&unit)))
            .or_insert_with(|| StockRow {
                product: movement.product.clone(),
                unit,
                inward: Quantity::ZERO,
                outward: Quantity::ZERO,
                net: Quantity::ZERO,
            });
        match direction {
            StockMovement::Inward => row.inward += quantity,
            StockMovement::Outward => row.outward += quantity,
        }
    }

    let mut rows: Vec<StockRow> = groups
        .into_values()
        .map(|mut row| {
            row.net = row.inward - row.outward;
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        lower(&a.product)
            .cmp(&lower(&b.product))
            .then_with(|| a.unit.cmp(&b.unit))
    });

    let summary = StockSummary {
        products: rows.len(),
        total_in: rows.iter().map(|r| r.inward).sum(),
        total_out: rows.iter().map(|r| r.outward).sum(),
    };
    ReportData { rows, summary }
}

// ============================================================================
// Profit and loss
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossLine {
    pub label: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossSummary {
    pub total_revenue: Money,
    pub total_purchases: Money,
    pub total_expenses: Money,
    pub gross_profit: Money,
    pub net_profit: Money,
    /// `net_profit / total_revenue × 100`, zero without revenue
    pub margin: Decimal,
}

/// Revenue, purchases and expenses with gross and net profit
pub fn profit_loss(snapshot: &Snapshot, filter: &ReportFilter) -> ReportData<ProfitLossLine, ProfitLossSummary> {
    let mut revenue = Money::ZERO;
    let mut purchases = Money::ZERO;
    let mut expenses = Money::ZERO;

    for record in filter.apply(snapshot) {
        match record {
            TransactionRecord::Sale(s) => revenue += s.amount,
            TransactionRecord::Purchase(p) => purchases += p.amount,
            TransactionRecord::Expense(e) => expenses += e.amount,
            _ => {}
        }
    }

    let gross = revenue - purchases;
    let net = gross - expenses;
    let line = |label: &str, amount| ProfitLossLine {
        label: label.to_string(),
        amount,
    };

    let rows = vec![
        line("Sales Revenue", revenue),
        line("Purchases", purchases),
        line("Gross Profit", gross),
        line("Expenses", expenses),
        line("Net Profit", net),
    ];
    let summary = ProfitLossSummary {
        total_revenue: revenue,
        total_purchases: purchases,
        total_expenses: expenses,
        gross_profit: gross,
        net_profit: net,
        margin: percentage(net, revenue),
    };
    ReportData { rows, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_quantity_converts_known_units() {
        let (q, unit) = display_quantity(Quantity::new(dec!(2)), "tons", Some(UnitMetric::Bags), dec!(20));
        assert_eq!(q.value(), dec!(40));
        assert_eq!(unit, "bags");
    }

    #[test]
    fn test_display_quantity_passes_other_units_through() {
        let (q, unit) = display_quantity(Quantity::new(dec!(3)), "pcs", Some(UnitMetric::Tons), dec!(20));
        assert_eq!(q.value(), dec!(3));
        assert_eq!(unit, "pcs");

        let (_, unit) = display_quantity(Quantity::new(dec!(3)), "Bags", None, dec!(20));
        assert_eq!(unit, "Bags");
    }

    #[test]
    fn test_percentage_without_whole_is_zero() {
        assert_eq!(percentage(Money::new(dec!(5)), Money::ZERO), Decimal::ZERO);
        assert_eq!(percentage(Money::new(dec!(1)), Money::new(dec!(3))), dec!(33.33));
    }
}
