//! Selector rule tables per platform and field.
//!
//! Rules are tried top to bottom and the first non-empty value wins. Earlier rows
//! are platform-specific markup, later rows are generic fallbacks. When a table
//! runs dry, [`meta_fallback`] is tried next.
//!
//! Update these tables when a storefront changes its theme; add a fixture test in
//! `extract::tests` alongside.

use super::platform::PlatformKind;

/// One candidate strategy for locating a field's value in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorRule {
    /// Text content of the first element matching the CSS selector.
    Text(&'static str),
    /// Attribute of the first matching element that carries it.
    Attr(&'static str, &'static str),
    /// `content` of `<meta property=..>` or `<meta name=..>`.
    Meta(&'static str),
}

/// Product record fields filled by extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Image,
    Price,
    Vendor,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::Name, Field::Description, Field::Image, Field::Price, Field::Vendor];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Image => "image",
            Field::Price => "price",
            Field::Vendor => "vendor",
        }
    }
}

use SelectorRule::{Attr, Meta, Text};

const SHOPIFY_NAME: &[SelectorRule] = &[
    Text("h1.product-single__title"),
    Text(".product__title h1"),
    Text(".product__title"),
    Text("h1[data-product-title]"),
    Text("h1.product_name"),
];
const SHOPIFY_DESCRIPTION: &[SelectorRule] = &[
    Text(".product-single__description"),
    Text(".product__description"),
    Text(".product-description"),
    Text(".rte"),
];
const SHOPIFY_IMAGE: &[SelectorRule] = &[
    Attr("img.product-single__photo", "src"),
    Attr("img.product-single__photo", "data-src"),
    Attr(".product__photo img", "src"),
    Attr(".product__media img", "src"),
    Attr(".product__media img", "srcset"),
    Attr(".product-featured-image", "src"),
];
const SHOPIFY_PRICE: &[SelectorRule] = &[
    Text(".product-single__price"),
    Text(".product__price"),
    Text(".price-item--regular"),
    Text(".price"),
];
const SHOPIFY_VENDOR: &[SelectorRule] = &[Text(".product-single__vendor"), Text(".product__vendor")];

const MERCADOLIVRE_NAME: &[SelectorRule] =
    &[Text("h1.ui-pdp-title"), Text("h1.x-item-title-label"), Text(".it-ttl")];
const MERCADOLIVRE_DESCRIPTION: &[SelectorRule] = &[
    Text(".ui-pdp-description__content"),
    Text(".item-description"),
    Text(".item-description-text"),
];
const MERCADOLIVRE_IMAGE: &[SelectorRule] = &[
    Attr("figure.ui-pdp-gallery__figure img", "data-zoom"),
    Attr("figure.ui-pdp-gallery__figure img", "src"),
    Attr("img.ui-pdp-image", "src"),
    Attr("img.gallery-image", "src"),
    Attr(".gallery-image-container img", "src"),
];
const MERCADOLIVRE_PRICE: &[SelectorRule] = &[
    Meta("product:price:amount"),
    Text(".ui-pdp-price__second-line .andes-money-amount__fraction"),
    Text(".andes-money-amount__fraction"),
    Text(".price-tag-fraction"),
];
const MERCADOLIVRE_VENDOR: &[SelectorRule] = &[
    Text(".ui-pdp-seller__link-trigger"),
    Text(".ui-seller-data-header__title"),
    Text(".seller-info__title"),
    Text(".profile-info-name"),
];

const AMAZON_NAME: &[SelectorRule] = &[Text("#productTitle"), Text("#title")];
const AMAZON_DESCRIPTION: &[SelectorRule] =
    &[Text("#feature-bullets ul"), Text("#productDescription"), Text("#bookDescription_feature_div")];
const AMAZON_IMAGE: &[SelectorRule] = &[
    Attr("#landingImage", "data-old-hires"),
    Attr("#landingImage", "src"),
    Attr("#imgBlkFront", "src"),
    Attr("#main-image", "src"),
];
const AMAZON_PRICE: &[SelectorRule] = &[
    Text("#corePrice_feature_div .a-offscreen"),
    Text("#corePriceDisplay_desktop_feature_div .a-offscreen"),
    Text("#priceblock_ourprice"),
    Text(".a-price .a-offscreen"),
];
const AMAZON_VENDOR: &[SelectorRule] = &[Text("#bylineInfo"), Text("#sellerProfileTriggerId")];

// Breadcrumb lists carry itemprop=name too, so microdata is only trusted inside a Product scope.
const GENERIC_NAME: &[SelectorRule] = &[
    Text("h1"),
    Text("[itemtype*=Product] [itemprop=name]"),
    Text(".product-title"),
    Text(".product-name"),
    Text(".title"),
];
const GENERIC_DESCRIPTION: &[SelectorRule] =
    &[Meta("description"), Text("[itemprop=description]"), Text(".description")];
const GENERIC_IMAGE: &[SelectorRule] = &[
    Meta("og:image"),
    Attr("[itemprop=image]", "content"),
    Attr("[itemprop=image]", "src"),
    Attr(".product-image img", "src"),
    Attr("main img", "src"),
    Meta("twitter:image"),
    Attr("img", "src"),
];
const GENERIC_PRICE: &[SelectorRule] = &[
    Meta("product:price:amount"),
    Attr("[itemprop=price]", "content"),
    Text("[itemprop=price]"),
    Text(".price"),
    Text(".cost"),
    Text(".valor"),
];
const GENERIC_VENDOR: &[SelectorRule] = &[Text("[itemprop=brand]"), Meta("og:site_name")];

const META_NAME: &[SelectorRule] = &[Meta("og:title"), Meta("twitter:title"), Text("title")];
const META_DESCRIPTION: &[SelectorRule] = &[Meta("description"), Meta("og:description"), Meta("twitter:description")];
const META_IMAGE: &[SelectorRule] = &[Meta("og:image"), Meta("og:image:secure_url"), Meta("twitter:image")];
const META_PRICE: &[SelectorRule] = &[Meta("product:price:amount"), Meta("og:price:amount")];
const META_VENDOR: &[SelectorRule] = &[Meta("product:brand"), Meta("og:site_name")];

/// Platform-specific rules for a field, in priority order.
pub fn platform_rules(platform: PlatformKind, field: Field) -> &'static [SelectorRule] {
    match (platform, field) {
        (PlatformKind::Shopify, Field::Name) => SHOPIFY_NAME,
        (PlatformKind::Shopify, Field::Description) => SHOPIFY_DESCRIPTION,
        (PlatformKind::Shopify, Field::Image) => SHOPIFY_IMAGE,
        (PlatformKind::Shopify, Field::Price) => SHOPIFY_PRICE,
        (PlatformKind::Shopify, Field::Vendor) => SHOPIFY_VENDOR,
        (PlatformKind::MercadoLivre, Field::Name) => MERCADOLIVRE_NAME,
        (PlatformKind::MercadoLivre, Field::Description) => MERCADOLIVRE_DESCRIPTION,
        (PlatformKind::MercadoLivre, Field::Image) => MERCADOLIVRE_IMAGE,
        (PlatformKind::MercadoLivre, Field::Price) => MERCADOLIVRE_PRICE,
        (PlatformKind::MercadoLivre, Field::Vendor) => MERCADOLIVRE_VENDOR,
        (PlatformKind::Amazon, Field::Name) => AMAZON_NAME,
        (PlatformKind::Amazon, Field::Description) => AMAZON_DESCRIPTION,
        (PlatformKind::Amazon, Field::Image) => AMAZON_IMAGE,
        (PlatformKind::Amazon, Field::Price) => AMAZON_PRICE,
        (PlatformKind::Amazon, Field::Vendor) => AMAZON_VENDOR,
        (PlatformKind::Generic, Field::Name) => GENERIC_NAME,
        (PlatformKind::Generic, Field::Description) => GENERIC_DESCRIPTION,
        (PlatformKind::Generic, Field::Image) => GENERIC_IMAGE,
        (PlatformKind::Generic, Field::Price) => GENERIC_PRICE,
        (PlatformKind::Generic, Field::Vendor) => GENERIC_VENDOR,
    }
}

/// Page-level metadata tried after the platform rules, shared by every platform.
pub fn meta_fallback(field: Field) -> &'static [SelectorRule] {
    match field {
        Field::Name => META_NAME,
        Field::Description => META_DESCRIPTION,
        Field::Image => META_IMAGE,
        Field::Price => META_PRICE,
        Field::Vendor => META_VENDOR,
    }
}
