use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies with a dedicated merchant account.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cad,
}

impl Currency {
    pub fn iso_code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iso_code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "CAD" => Ok(Currency::Cad),
            other => Err(anyhow::anyhow!("Unsupported currency: {}", other)),
        }
    }
}

/// An amount in a specific currency.
///
/// Equality is numeric, so `100` and `100.00` compare equal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Acknowledgment returned after a deletion request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeletedObject {
    pub id: String,
    pub deleted: bool,
    pub object: String,
}

/// Payer details of a PayPal-funded transaction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PaypalPaymentInfo {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// A refund of `transaction_id`; `amount` of `None` means the full amount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl RefundRequest {
    pub fn full(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: None,
        }
    }

    pub fn partial(transaction_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: Some(amount),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.amount.is_some()
    }
}
