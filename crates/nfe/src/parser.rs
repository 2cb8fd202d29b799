use roxmltree::{Document, Node};
use thiserror::Error;

use crate::invoice::{Invoice, InvoiceItem, Supplier};

pub const PLACEHOLDER_CODE: &str = "S/C";
pub const PLACEHOLDER_DESCRIPTION: &str = "Produto sem descrição";
pub const PLACEHOLDER_UNIT: &str = "UN";
pub const PLACEHOLDER_SUPPLIER: &str = "Fornecedor não identificado";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NfeError {
    #[error("malformed NFe document: {0}")]
    Parse(String),
}

/// Parse an NFe document.
///
/// Elements are matched by local name, so both namespaced (`nfeProc`) and
/// bare documents work. Missing numbers become `0`, missing text becomes a
/// placeholder; only non-well-formed XML is an error.
pub fn parse_invoice(xml: &[u8]) -> Result<Invoice, NfeError> {
    let text = std::str::from_utf8(xml).map_err(|e| NfeError::Parse(format!("not utf-8: {e}")))?;
    let doc = Document::parse(text).map_err(|e| NfeError::Parse(e.to_string()))?;
    let root = doc.root_element();

    let inf = find(root, "infNFe");
    let key = inf
        .and_then(|n| n.attribute("Id"))
        .map(|id| id.strip_prefix("NFe").unwrap_or(id).to_string())
        .or_else(|| find(root, "chNFe").and_then(text_of).map(str::to_string))
        .unwrap_or_default();

    let scope = inf.unwrap_or(root);
    let number = find(scope, "ide")
        .and_then(|ide| child_text(ide, "nNF"))
        .map(str::to_string);

    let emit = find(scope, "emit");
    let supplier = Supplier {
        name: emit
            .and_then(|e| child_text(e, "xNome"))
            .unwrap_or(PLACEHOLDER_SUPPLIER)
            .to_string(),
        tax_id: emit
            .and_then(|e| child_text(e, "CNPJ").or_else(|| child_text(e, "CPF")))
            .unwrap_or_default()
            .to_string(),
    };

    let items: Vec<InvoiceItem> = scope
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "det")
        .map(parse_item)
        .collect();

    tracing::debug!(key = %key, items = items.len(), "parsed NFe");

    Ok(Invoice {
        key,
        number,
        supplier,
        items,
    })
}

/// Parse an NFe document, yielding `None` when it is not well-formed.
pub fn extract_invoice(xml: &[u8]) -> Option<Invoice> {
    match parse_invoice(xml) {
        Ok(invoice) => Some(invoice),
        Err(e) => {
            tracing::debug!(error = %e, "discarding unparseable NFe");
            None
        }
    }
}

fn parse_item(det: Node<'_, '_>) -> InvoiceItem {
    let prod = find(det, "prod");
    let text = |name: &str| prod.and_then(|p| child_text(p, name));
    let number = |name: &str| text(name).map(parse_number).unwrap_or(0.0);

    InvoiceItem {
        code: text("cProd").unwrap_or(PLACEHOLDER_CODE).to_string(),
        description: text("xProd").unwrap_or(PLACEHOLDER_DESCRIPTION).to_string(),
        quantity: number("qCom"),
        unit: text("uCom").unwrap_or(PLACEHOLDER_UNIT).to_string(),
        unit_price: number("vUnCom"),
    }
}

/// Decimal numbers use `.`; a `,` is tolerated for hand-edited files.
/// Anything that is not a finite number reads as zero.
fn parse_number(raw: &str) -> f64 {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn find<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(text_of)
}

fn text_of<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}
