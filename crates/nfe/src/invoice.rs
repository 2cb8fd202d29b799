use serde::{Deserialize, Serialize};

/// Issuer of the invoice (`emit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    /// CNPJ, or CPF for individual issuers. Empty when absent.
    pub tax_id: String,
}

/// One `det/prod` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
}

impl InvoiceItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// 44-digit access key, without the `NFe` prefix. Empty when absent.
    pub key: String,
    /// `ide/nNF`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub supplier: Supplier,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn total(&self) -> f64 {
        self.items.iter().map(InvoiceItem::total).sum()
    }
}
