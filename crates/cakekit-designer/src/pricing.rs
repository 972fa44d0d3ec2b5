//! Itemized price quote for a design.

use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::model::ItemModel;

/// Prices applied when a quote is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    /// Charged for the base item when it has no price of its own.
    pub base_price: f64,
    /// Charged for an element when it has no price of its own.
    pub default_element_price: f64,
    /// Charged once when the message is not blank.
    pub message_surcharge: f64,
    pub tax_rate: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            base_price: 25.0,
            default_element_price: 3.5,
            message_surcharge: 5.0,
            tax_rate: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

fn or_default(price: f64, fallback: f64) -> f64 {
    if price > 0.0 {
        price
    } else {
        fallback
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl Quote {
    pub fn for_design(design: &Design, rules: &PricingRules) -> Self {
        let mut lines = Vec::with_capacity(design.elements.len() + 2);

        let (label, price) = match &design.base_item {
            Some(base) => (base.name().to_string(), base.price()),
            None => ("Base".to_string(), 0.0),
        };
        lines.push(QuoteLine {
            label,
            amount: or_default(price, rules.base_price),
        });

        lines.extend(design.live_elements().map(|element| QuoteLine {
            label: element.name().to_string(),
            amount: or_default(element.price(), rules.default_element_price),
        }));

        if !design.message.trim().is_empty() {
            lines.push(QuoteLine {
                label: "Message".to_string(),
                amount: rules.message_surcharge,
            });
        }

        let subtotal = round_cents(lines.iter().map(|line| line.amount).sum());
        let tax = round_cents(subtotal * rules.tax_rate);
        Self {
            lines,
            subtotal,
            tax,
            total: round_cents(subtotal + tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaseItemModel, ElementModel};

    #[test]
    fn test_empty_design_charges_base_price() {
        let quote = Quote::for_design(&Design::default(), &PricingRules::default());
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.subtotal, 25.0);
        assert_eq!(quote.tax, 2.0);
        assert_eq!(quote.total, 27.0);
    }

    #[test]
    fn test_itemized_quote() {
        let mut base = BaseItemModel::new("round.glb");
        base.set_price(30.0);
        let mut rose = ElementModel::new("rose.glb");
        rose.set_name("Rose");
        rose.set_price(4.25);
        let mut bow = ElementModel::new("bow.glb");
        bow.set_name("Bow");

        let design = Design {
            base_item: Some(base),
            elements: vec![rose.into(), bow.into()],
            message: "Happy Birthday".into(),
            ..Design::default()
        };
        let quote = Quote::for_design(&design, &PricingRules::default());

        let labels: Vec<&str> = quote.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Layer1", "Rose", "Bow", "Message"]);
        assert_eq!(quote.subtotal, 42.75);
        assert_eq!(quote.tax, 3.42);
        assert_eq!(quote.total, 46.17);
    }

    #[test]
    fn test_blank_message_is_free() {
        let design = Design {
            message: "   ".into(),
            ..Design::default()
        };
        let quote = Quote::for_design(&design, &PricingRules::default());
        assert_eq!(quote.subtotal, 25.0);
    }
}
