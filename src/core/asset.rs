//! Asset records and the closed vocabularies they carry

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Asset classes tracked by the ledger. Declaration order doubles as the
/// display order in breakdowns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cash,
    Stock,
    Fund,
    Insurance,
    Property,
    Mortgage,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Cash,
        Category::Stock,
        Category::Fund,
        Category::Insurance,
        Category::Property,
        Category::Mortgage,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Cash => "現金",
            Category::Stock => "股票",
            Category::Fund => "基金",
            Category::Insurance => "保險",
            Category::Property => "房產",
            Category::Mortgage => "房貸",
            Category::Other => "其他",
        }
    }

    /// Mortgages count against net worth; everything else adds to it.
    pub fn is_liability(&self) -> bool {
        matches!(self, Category::Mortgage)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" | "現金" => Ok(Category::Cash),
            "stock" | "股票" => Ok(Category::Stock),
            "fund" | "基金" => Ok(Category::Fund),
            "insurance" | "保險" => Ok(Category::Insurance),
            "property" | "房產" => Ok(Category::Property),
            "mortgage" | "房貸" => Ok(Category::Mortgage),
            "other" | "其他" => Ok(Category::Other),
            _ => Err(anyhow!("Unknown asset category: {}", s)),
        }
    }
}

/// Currencies a record may be denominated in. TWD is the reporting currency;
/// every other member carries a static TWD conversion factor used when no
/// live rate is cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Twd,
    Usd,
    Jpy,
    Cny,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Twd,
        Currency::Usd,
        Currency::Jpy,
        Currency::Cny,
        Currency::Eur,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Twd => "TWD",
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Eur => "EUR",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Fixed TWD conversion factor, the fallback when no live rate is known.
    pub fn static_rate(&self) -> f64 {
        match self {
            Currency::Twd => 1.0,
            Currency::Usd => 31.5,
            Currency::Jpy => 0.21,
            Currency::Cny => 4.3,
            Currency::Eur => 33.8,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| anyhow!("Unknown currency code: {}", s))
    }
}

/// Exchange a stock trades on. Taiwan listings need the `.TW` suffix before
/// they can be sent to the quote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Tw,
    Us,
}

impl Market {
    pub fn label(&self) -> &'static str {
        match self {
            Market::Tw => "台股",
            Market::Us => "美股",
        }
    }

    /// Currency the market quotes prices in.
    pub fn currency(&self) -> Currency {
        match self {
            Market::Tw => Currency::Twd,
            Market::Us => Currency::Usd,
        }
    }

    pub fn qualified_symbol(&self, symbol: &str) -> String {
        match self {
            Market::Tw if !symbol.ends_with(".TW") => format!("{symbol}.TW"),
            _ => symbol.to_string(),
        }
    }
}

impl FromStr for Market {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tw" | "taiwan" | "台股" => Ok(Market::Tw),
            "us" | "美股" => Ok(Market::Us),
            _ => Err(anyhow!("Unknown market: {}", s)),
        }
    }
}

/// A single typed value in an asset's extension map.
///
/// Encoded as `{"type": "...", "value": ...}` so stored records stay
/// self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ExtraValue {
    #[serde(rename = "string")]
    Text(String),
    #[serde(rename = "integer")]
    Int(i64),
    #[serde(rename = "double")]
    Num(f64),
}

impl ExtraValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtraValue::Text(s) => Some(s),
            ExtraValue::Int(_) | ExtraValue::Num(_) => None,
        }
    }

    /// Integer view. Numeric text and whole doubles coerce, anything else is
    /// `None`; older exports stored share counts as strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ExtraValue::Int(n) => Some(*n),
            ExtraValue::Num(n) if n.fract() == 0.0 => Some(*n as i64),
            ExtraValue::Num(_) => None,
            ExtraValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            ExtraValue::Num(n) => Some(*n),
            ExtraValue::Int(n) => Some(*n as f64),
            ExtraValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Share position carried by a stock record's extension map.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPosition {
    pub symbol: String,
    pub shares: u64,
    pub market: Market,
}

impl StockPosition {
    /// Symbol as the quote endpoint expects it.
    pub fn lookup_symbol(&self) -> String {
        self.market.qualified_symbol(&self.symbol)
    }
}

const KEY_SYMBOL: &str = "symbol";
const KEY_SHARES: &str = "shares";
const KEY_US_STOCK: &str = "isUSStock";

/// One tracked asset or liability. `value` is the nominal amount in
/// `currency` and is never negative; liabilities are only signed during
/// aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub category: Category,
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub extra: BTreeMap<String, ExtraValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        category: Category,
        name: &str,
        value: f64,
        currency: Currency,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow!(
                "Asset value must be non-negative, got {} for {}",
                value,
                name
            ));
        }
        Ok(Asset {
            id: Uuid::new_v4(),
            category,
            name: name.to_string(),
            value,
            currency,
            note: note.to_string(),
            extra: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Stock record with its position seeded into the extension map. The
    /// nominal value doubles as the no-quote fallback.
    pub fn new_stock(
        symbol: &str,
        shares: u64,
        market: Market,
        value: f64,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut asset = Asset::new(
            Category::Stock,
            symbol,
            value,
            market.currency(),
            note,
            now,
        )?;
        asset.set_stock_position(&StockPosition {
            symbol: symbol.to_string(),
            shares,
            market,
        });
        Ok(asset)
    }

    pub fn set_value(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow!(
                "Asset value must be non-negative, got {} for {}",
                value,
                self.name
            ));
        }
        self.value = value;
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Reads the stock position out of the extension map. Both the share
    /// count and the market flag must be present; records missing either are
    /// valued at their nominal amount instead.
    pub fn stock_position(&self) -> Option<StockPosition> {
        let shares = self.extra.get(KEY_SHARES)?.as_int()?;
        let shares = u64::try_from(shares).ok()?;
        let market = match self.extra.get(KEY_US_STOCK)?.as_text()? {
            "true" => Market::Us,
            _ => Market::Tw,
        };
        let symbol = self
            .extra
            .get(KEY_SYMBOL)
            .and_then(|v| v.as_text())
            .unwrap_or(&self.name)
            .to_string();
        Some(StockPosition {
            symbol,
            shares,
            market,
        })
    }

    pub fn set_stock_position(&mut self, position: &StockPosition) {
        self.extra.insert(
            KEY_SYMBOL.to_string(),
            ExtraValue::Text(position.symbol.clone()),
        );
        self.extra
            .insert(KEY_SHARES.to_string(), ExtraValue::Int(position.shares as i64));
        self.extra.insert(
            KEY_US_STOCK.to_string(),
            ExtraValue::Text((position.market == Market::Us).to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_category_labels_and_liability() {
        assert_eq!(Category::Cash.label(), "現金");
        assert_eq!(Category::Mortgage.label(), "房貸");
        assert!(Category::Mortgage.is_liability());
        assert!(Category::ALL.iter().filter(|c| c.is_liability()).count() == 1);
    }

    #[test]
    fn test_category_parses_both_vocabularies() {
        assert_eq!("stock".parse::<Category>().unwrap(), Category::Stock);
        assert_eq!("房產".parse::<Category>().unwrap(), Category::Property);
        assert!("castle".parse::<Category>().is_err());
    }

    #[test]
    fn test_currency_codes_and_rates() {
        for currency in Currency::ALL {
            assert!(currency.static_rate() > 0.0);
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
        assert_eq!(Currency::from_code("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("GBP"), None);
        assert_eq!(Currency::Twd.static_rate(), 1.0);
    }

    #[test]
    fn test_market_symbol_qualification() {
        assert_eq!(Market::Tw.qualified_symbol("2330"), "2330.TW");
        assert_eq!(Market::Tw.qualified_symbol("0056.TW"), "0056.TW");
        assert_eq!(Market::Us.qualified_symbol("AMD"), "AMD");
        assert_eq!(Market::Us.currency(), Currency::Usd);
    }

    #[test]
    fn test_extra_value_tagged_encoding() {
        let json = serde_json::to_string(&ExtraValue::Text("2330".to_string())).unwrap();
        assert_eq!(json, r#"{"type":"string","value":"2330"}"#);

        let decoded: ExtraValue =
            serde_json::from_str(r#"{"type":"integer","value":200}"#).unwrap();
        assert_eq!(decoded, ExtraValue::Int(200));

        let decoded: ExtraValue =
            serde_json::from_str(r#"{"type":"double","value":1.5}"#).unwrap();
        assert_eq!(decoded, ExtraValue::Num(1.5));
    }

    #[test]
    fn test_extra_value_coercions() {
        assert_eq!(ExtraValue::Text("200".to_string()).as_int(), Some(200));
        assert_eq!(ExtraValue::Num(200.0).as_int(), Some(200));
        assert_eq!(ExtraValue::Num(200.5).as_int(), None);
        assert_eq!(ExtraValue::Text("abc".to_string()).as_int(), None);
        assert_eq!(ExtraValue::Int(3).as_num(), Some(3.0));
        assert_eq!(ExtraValue::Int(3).as_text(), None);
    }

    #[test]
    fn test_negative_value_rejected() {
        let result = Asset::new(Category::Cash, "Bank", -1.0, Currency::Twd, "", now());
        assert!(result.is_err());

        let mut asset =
            Asset::new(Category::Cash, "Bank", 100.0, Currency::Twd, "", now()).unwrap();
        assert!(asset.set_value(f64::NAN).is_err());
        assert!(asset.set_value(-5.0).is_err());
        assert!(asset.set_value(0.0).is_ok());
    }

    #[test]
    fn test_stock_position_round_trip() {
        let asset = Asset::new_stock("2330", 200, Market::Tw, 200.0, "存股用", now()).unwrap();
        let position = asset.stock_position().unwrap();
        assert_eq!(position.symbol, "2330");
        assert_eq!(position.shares, 200);
        assert_eq!(position.market, Market::Tw);
        assert_eq!(position.lookup_symbol(), "2330.TW");
        assert_eq!(asset.currency, Currency::Twd);

        let us = Asset::new_stock("AMD", 120, Market::Us, 120.0, "", now()).unwrap();
        assert_eq!(us.currency, Currency::Usd);
        assert_eq!(us.stock_position().unwrap().lookup_symbol(), "AMD");
    }

    #[test]
    fn test_stock_position_requires_market_flag() {
        let mut asset =
            Asset::new(Category::Stock, "2330", 50000.0, Currency::Twd, "", now()).unwrap();
        assert!(asset.stock_position().is_none());

        // Shares alone are not enough
        asset
            .extra
            .insert("shares".to_string(), ExtraValue::Int(100));
        assert!(asset.stock_position().is_none());

        asset.extra.insert(
            "isUSStock".to_string(),
            ExtraValue::Text("false".to_string()),
        );
        let position = asset.stock_position().unwrap();
        // Symbol falls back to the record name
        assert_eq!(position.symbol, "2330");
        assert_eq!(position.market, Market::Tw);
    }

    #[test]
    fn test_legacy_string_share_count() {
        let mut asset =
            Asset::new(Category::Stock, "0056", 1000.0, Currency::Twd, "", now()).unwrap();
        asset.extra.insert(
            "shares".to_string(),
            ExtraValue::Text("1000".to_string()),
        );
        asset.extra.insert(
            "isUSStock".to_string(),
            ExtraValue::Text("false".to_string()),
        );
        assert_eq!(asset.stock_position().unwrap().shares, 1000);
    }
}
