//! Product-type classification.
//!
//! Classification is a substring test of the case-folded product text against an
//! ordered keyword table. The first row with a matching keyword wins, so the table
//! order is the tie-break for text that hits several rows ("tail light bar" is a
//! taillight, not a lightbar). Keep rows in the declared order.
//!
//! The text is padded with a space on each side, so a keyword written with a
//! leading or trailing space only matches at a word edge (" aro " hits "Aro 17"
//! but not "Farol Claro").

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of automotive accessory, derived from product text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Headlight,
    Taillight,
    Indicator,
    Lightbar,
    Foglight,
    Interior,
    License,
    Spoiler,
    Wheels,
    Decals,
    Exhaust,
    Generic,
}

impl ProductCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Headlight => "headlight",
            ProductCategory::Taillight => "taillight",
            ProductCategory::Indicator => "indicator",
            ProductCategory::Lightbar => "lightbar",
            ProductCategory::Foglight => "foglight",
            ProductCategory::Interior => "interior",
            ProductCategory::License => "license",
            ProductCategory::Spoiler => "spoiler",
            ProductCategory::Wheels => "wheels",
            ProductCategory::Decals => "decals",
            ProductCategory::Exhaust => "exhaust",
            ProductCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which keyword table to classify against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    /// LED lighting products.
    #[default]
    Lighting,
    /// Bodywork and wheel accessories.
    Accessory,
}

type KeywordRow = (ProductCategory, &'static [&'static str]);

const LIGHTING_TABLE: &[KeywordRow] = &[
    (
        ProductCategory::Headlight,
        &["headlight", "head light", "headlamp", "farol principal", "farol led", "low beam", "high beam"],
    ),
    (
        ProductCategory::Taillight,
        &["taillight", "tail light", "tail lamp", "brake light", "lanterna traseira", "luz de freio"],
    ),
    (ProductCategory::Indicator, &["indicator", "turn signal", "blinker", "pisca", "seta"]),
    (ProductCategory::Lightbar, &["light bar", "lightbar", "barra de led", "barra led"]),
    (ProductCategory::Foglight, &["fog", "farol de milha", "milha", "neblina"]),
    (ProductCategory::Interior, &["interior", "dome light", "map light", "luz interna", "teto", "ambient"]),
    (ProductCategory::License, &["license plate", "licence plate", "number plate", "placa"]),
];

const ACCESSORY_TABLE: &[KeywordRow] = &[
    (ProductCategory::Spoiler, &["spoiler", "aerofólio", "aerofolio", " wing"]),
    (ProductCategory::Wheels, &["wheel", " rim ", " rims ", "roda", " aro ", " aros ", "jante"]),
    (ProductCategory::Decals, &["decal", "sticker", "adesivo", "decalque", "faixa"]),
    (ProductCategory::Exhaust, &["exhaust", "muffler", "escapamento", "ponteira"]),
];

impl Taxonomy {
    fn table(self) -> &'static [KeywordRow] {
        match self {
            Taxonomy::Lighting => LIGHTING_TABLE,
            Taxonomy::Accessory => ACCESSORY_TABLE,
        }
    }
}

/// Classify a product from its name and description. Never fails.
pub fn classify(taxonomy: Taxonomy, name: &str, description: &str) -> ProductCategory {
    let text = format!(" {name} {description} ").to_lowercase();

    taxonomy
        .table()
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ProductCategory::Generic)
}
