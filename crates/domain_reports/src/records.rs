//! Transaction record types
//!
//! Two layers live here. The `Raw*` structs mirror what the data store hands
//! over: every date and amount is text, and numeric JSON values are accepted
//! as text too. The canonical structs carry [`CalendarDate`], [`Money`] and
//! [`Quantity`] values produced once by the [`Canonicalizer`](crate::canonical::Canonicalizer)
//! and are what every report reads.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, CalendarDate, CustomerId, Money, Quantity, RecordId};

/// Separator between product name and quantity in a sale's product field
pub const DESCRIPTOR_SEPARATOR: char = '•';

/// Purchase sub-category used for billing reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubCategory {
    Direct,
    #[serde(rename = "GL")]
    Gl,
    #[serde(rename = "GV")]
    Gv,
}

impl SubCategory {
    /// Recognizes a free-text sub-category label
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DIRECT" => Some(SubCategory::Direct),
            "GL" => Some(SubCategory::Gl),
            "GV" => Some(SubCategory::Gv),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubCategory::Direct => "Direct",
            SubCategory::Gl => "GL",
            SubCategory::Gv => "GV",
        }
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of an account transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money into the account
    Credit,
    /// Money out of the account
    Debit,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "credit" | "cr" => Some(Direction::Credit),
            "debit" | "dr" => Some(Direction::Debit),
            _ => None,
        }
    }
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockMovement {
    Inward,
    Outward,
}

impl StockMovement {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in" | "inward" | "stock in" | "purchase" | "add" => Some(StockMovement::Inward),
            "out" | "outward" | "stock out" | "sale" | "remove" => Some(StockMovement::Outward),
            _ => None,
        }
    }
}

/// The composite `"<name> • <qty> <unit>"` product field of a sale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductDescriptor {
    pub name: String,
    pub quantity: Quantity,
    pub unit: String,
}

impl ProductDescriptor {
    /// Splits a product descriptor
    ///
    /// A missing or unparseable quantity segment yields quantity zero and an
    /// empty unit; the name is always kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_reports::records::ProductDescriptor;
    /// use rust_decimal_macros::dec;
    ///
    /// let p = ProductDescriptor::parse("Cement OPC • 12.5 bags");
    /// assert_eq!(p.name, "Cement OPC");
    /// assert_eq!(p.quantity.value(), dec!(12.5));
    /// assert_eq!(p.unit, "bags");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, DESCRIPTOR_SEPARATOR);
        let name = parts.next().unwrap_or_default().trim().to_string();

        let Some(detail) = parts.next() else {
            return Self {
                name,
                ..Self::default()
            };
        };

        let mut tokens = detail.split_whitespace();
        let Some(Ok(quantity)) = tokens.next().map(Quantity::try_parse) else {
            return Self {
                name,
                ..Self::default()
            };
        };
        let unit = tokens.collect::<Vec<_>>().join(" ");

        Self {
            name,
            quantity,
            unit,
        }
    }
}

impl fmt::Display for ProductDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() && self.quantity.is_zero() {
            return f.write_str(&self.name);
        }
        write!(f, "{} {} {} {}", self.name, DESCRIPTOR_SEPARATOR, self.quantity, self.unit)
    }
}

/// Reads strings, numbers and nulls as text; writes plain strings
pub(crate) mod lenient_text {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<String, D::Error> {
            d.deserialize_any(TextVisitor)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        d.deserialize_any(TextVisitor)
    }

    pub fn serialize<S: Serializer>(value: &str, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value)
    }
}

/// A sale as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSale {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub customer_id: String,
    #[serde(with = "lenient_text")]
    pub customer_name: String,
    #[serde(with = "lenient_text")]
    pub product: String,
    #[serde(with = "lenient_text")]
    pub amount: String,
    #[serde(with = "lenient_text")]
    pub bill_number: String,
    #[serde(with = "lenient_text")]
    pub sub_category: String,
}

/// A customer payment as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayment {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub customer_id: String,
    #[serde(with = "lenient_text")]
    pub customer_name: String,
    #[serde(with = "lenient_text")]
    pub amount: String,
    #[serde(with = "lenient_text")]
    pub mode: String,
    #[serde(with = "lenient_text")]
    pub note: String,
    /// Transfers between own accounts, never part of customer reports
    pub is_internal_transfer: bool,
}

/// A purchase as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPurchase {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub vendor: String,
    #[serde(with = "lenient_text")]
    pub product: String,
    #[serde(with = "lenient_text")]
    pub quantity: String,
    #[serde(with = "lenient_text")]
    pub unit: String,
    #[serde(with = "lenient_text")]
    pub amount: String,
    #[serde(with = "lenient_text")]
    pub sub_category: String,
}

/// An expense as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExpense {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub category: String,
    #[serde(with = "lenient_text")]
    pub description: String,
    #[serde(with = "lenient_text")]
    pub paid_to: String,
    #[serde(with = "lenient_text")]
    pub amount: String,
}

/// An account transaction as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAccountTransaction {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub account_id: String,
    #[serde(with = "lenient_text")]
    pub amount: String,
    #[serde(rename = "type", with = "lenient_text")]
    pub direction: String,
    #[serde(with = "lenient_text")]
    pub description: String,
}

/// A stock movement as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawStockTransaction {
    #[serde(with = "lenient_text")]
    pub id: String,
    #[serde(with = "lenient_text")]
    pub date: String,
    #[serde(with = "lenient_text")]
    pub product: String,
    #[serde(with = "lenient_text")]
    pub quantity: String,
    #[serde(with = "lenient_text")]
    pub unit: String,
    #[serde(rename = "type", with = "lenient_text")]
    pub movement: String,
    #[serde(with = "lenient_text")]
    pub note: String,
}

/// A canonical sale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub product: ProductDescriptor,
    pub amount: Money,
    pub bill_number: String,
    pub sub_category: Option<SubCategory>,
}

/// A canonical customer payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub amount: Money,
    pub mode: String,
    pub note: String,
}

/// A canonical purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub vendor: String,
    pub product: String,
    pub quantity: Quantity,
    pub unit: String,
    pub amount: Money,
    pub sub_category: Option<SubCategory>,
}

/// A canonical expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub category: String,
    pub description: String,
    pub paid_to: String,
    pub amount: Money,
}

/// A canonical account transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTransaction {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub account_id: AccountId,
    pub amount: Money,
    /// `None` when the stored direction flag was unrecognized
    pub direction: Option<Direction>,
    pub description: String,
}

/// A canonical stock movement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTransaction {
    pub id: RecordId,
    pub date: Option<CalendarDate>,
    pub product: String,
    pub quantity: Quantity,
    pub unit: String,
    pub movement: Option<StockMovement>,
    pub note: String,
}

/// Kind of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Sale,
    Payment,
    Purchase,
    Expense,
    AccountTransaction,
    StockTransaction,
}

/// Any transaction record in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TransactionRecord {
    Sale(Sale),
    Payment(Payment),
    Purchase(Purchase),
    Expense(Expense),
    AccountTransaction(AccountTransaction),
    StockTransaction(StockTransaction),
}

impl TransactionRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            TransactionRecord::Sale(_) => RecordKind::Sale,
            TransactionRecord::Payment(_) => RecordKind::Payment,
            TransactionRecord::Purchase(_) => RecordKind::Purchase,
            TransactionRecord::Expense(_) => RecordKind::Expense,
            TransactionRecord::AccountTransaction(_) => RecordKind::AccountTransaction,
            TransactionRecord::StockTransaction(_) => RecordKind::StockTransaction,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            TransactionRecord::Sale(r) => &r.id,
            TransactionRecord::Payment(r) => &r.id,
            TransactionRecord::Purchase(r) => &r.id,
            TransactionRecord::Expense(r) => &r.id,
            TransactionRecord::AccountTransaction(r) => &r.id,
            TransactionRecord::StockTransaction(r) => &r.id,
        }
    }

    /// Canonical date; `None` when the stored date was missing or malformed
    pub fn date(&self) -> Option<CalendarDate> {
        match self {
            TransactionRecord::Sale(r) => r.date,
            TransactionRecord::Payment(r) => r.date,
            TransactionRecord::Purchase(r) => r.date,
            TransactionRecord::Expense(r) => r.date,
            TransactionRecord::AccountTransaction(r) => r.date,
            TransactionRecord::StockTransaction(r) => r.date,
        }
    }

    /// The other side of the transaction: customer, vendor, payee, account
    /// or product
    pub fn counterparty(&self) -> &str {
        match self {
            TransactionRecord::Sale(r) => first_non_empty(&r.customer_name, r.customer_id.as_str()),
            TransactionRecord::Payment(r) => first_non_empty(&r.customer_name, r.customer_id.as_str()),
            TransactionRecord::Purchase(r) => &r.vendor,
            TransactionRecord::Expense(r) => first_non_empty(&r.paid_to, &r.category),
            TransactionRecord::AccountTransaction(r) => r.account_id.as_str(),
            TransactionRecord::StockTransaction(r) => &r.product,
        }
    }

    /// Fields matched by free-text search
    pub fn search_fields(&self) -> Vec<&str> {
        match self {
            TransactionRecord::Sale(r) => vec![
                r.customer_name.as_str(),
                r.product.name.as_str(),
                r.product.unit.as_str(),
                r.bill_number.as_str(),
            ],
            TransactionRecord::Payment(r) => {
                vec![r.customer_name.as_str(), r.mode.as_str(), r.note.as_str()]
            }
            TransactionRecord::Purchase(r) => vec![
                r.vendor.as_str(),
                r.product.as_str(),
                r.sub_category.map(|c| c.label()).unwrap_or_default(),
            ],
            TransactionRecord::Expense(r) => vec![
                r.category.as_str(),
                r.description.as_str(),
                r.paid_to.as_str(),
            ],
            TransactionRecord::AccountTransaction(r) => {
                vec![r.description.as_str(), r.account_id.as_str()]
            }
            TransactionRecord::StockTransaction(r) => vec![r.product.as_str(), r.note.as_str()],
        }
    }

    pub fn as_sale(&self) -> Option<&Sale> {
        match self {
            TransactionRecord::Sale(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_payment(&self) -> Option<&Payment> {
        match self {
            TransactionRecord::Payment(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_purchase(&self) -> Option<&Purchase> {
        match self {
            TransactionRecord::Purchase(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_expense(&self) -> Option<&Expense> {
        match self {
            TransactionRecord::Expense(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_account_transaction(&self) -> Option<&AccountTransaction> {
        match self {
            TransactionRecord::AccountTransaction(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_stock_transaction(&self) -> Option<&StockTransaction> {
        match self {
            TransactionRecord::StockTransaction(r) => Some(r),
            _ => None,
        }
    }
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.trim().is_empty() {
        fallback
    } else {
        preferred
    }
}
