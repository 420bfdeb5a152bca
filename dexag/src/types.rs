//! Types module
//!
//! Module này định nghĩa các kiểu dữ liệu dùng chung trong dexag: yêu cầu swap,
//! trade quote từ aggregator, giao dịch đã chuẩn bị và kết quả swap.

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, U256};
use serde::{Serialize, Deserialize};

use common::{NotificationStatus, ProviderKind, TransactionKind};

/// How long a prepared swap stays valid, in seconds
pub const SWAP_VALID_FOR_SECS: u64 = 600;

/// Liquidity source used when the request does not name a supported dex
pub const AGGREGATE_DEX: &str = "ag";

/// A swap requested by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Source currency symbol (e.g. ETH, WETH, DAI)
    pub from_currency: String,

    /// Destination currency symbol
    pub to_currency: String,

    /// Source amount in human units, as a decimal string
    pub from_value: String,

    /// Account paying for the swap
    pub from_address: Address,

    /// Account receiving the swap output
    pub to_address: Address,

    /// Preferred liquidity source, if any
    #[serde(default)]
    pub provider: Option<String>,

    /// Network identifier (e.g. ETH)
    pub network: String,
}

/// Call the aggregator wants executed for the swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCall {
    /// Contract executing the trade
    pub to: Address,

    /// Encoded call data
    pub data: Bytes,

    /// Native value sent with the call
    #[serde(with = "serde_u256")]
    pub value: U256,
}

/// Input side of a trade as reported by the aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInput {
    /// Token contract being sold
    #[serde(default)]
    pub address: Option<Address>,

    /// Amount being sold, in base units
    #[serde(default, with = "serde_u256::option")]
    pub amount: Option<U256>,

    /// Contract that must hold the allowance, when it differs from the trade target
    #[serde(default)]
    pub spender: Option<Address>,
}

/// Query echo returned with a trade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuery {
    /// Source symbol
    #[serde(default)]
    pub from: String,

    /// Destination symbol
    #[serde(default)]
    pub to: String,

    /// Amount sold, human units
    #[serde(default)]
    pub from_amount: Option<String>,

    /// Amount bought, human units
    #[serde(default)]
    pub to_amount: Option<String>,

    /// Liquidity source used
    #[serde(default)]
    pub dex: Option<String>,
}

/// Metadata attached to a trade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeMetadata {
    /// Input token details
    #[serde(default)]
    pub input: Option<TradeInput>,

    /// Query echo
    #[serde(default)]
    pub query: TradeQuery,

    /// Gas price the aggregator recommends
    #[serde(default, with = "serde_u256::option")]
    pub gas_price: Option<U256>,
}

/// Trade created by the aggregator for a swap request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
    /// Call to execute
    pub trade: TradeCall,

    /// Trade metadata
    #[serde(default)]
    pub metadata: TradeMetadata,
}

/// Where the spender address of a trade came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpenderSource {
    /// `metadata.input.spender` was present
    InputSpender,

    /// Fallback: the trade target `trade.to`
    TradeTarget,
}

impl TradeQuote {
    /// Resolve the contract that must be granted the allowance
    ///
    /// An explicit `metadata.input.spender` always wins. Without it, the contract the
    /// trade is sent to is the spender.
    pub fn spender(&self) -> (Address, SpenderSource) {
        match self.metadata.input.as_ref().and_then(|input| input.spender) {
            Some(spender) => (spender, SpenderSource::InputSpender),
            None => (self.trade.to, SpenderSource::TradeTarget),
        }
    }

    /// Token contract being sold, if the aggregator reported it
    pub fn input_token(&self) -> Option<Address> {
        self.metadata.input.as_ref().and_then(|input| input.address)
    }

    /// Amount being sold in base units, if the aggregator reported it
    pub fn input_amount(&self) -> Option<U256> {
        self.metadata.input.as_ref().and_then(|input| input.amount)
    }
}

/// Unsigned transaction prepared for the caller to sign and broadcast
///
/// Fields are read-only once built; the position of a transaction in a list is
/// significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTransaction {
    kind: TransactionKind,
    to: Address,
    #[serde(with = "serde_u256")]
    value: U256,
    data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_u256::option")]
    gas_price: Option<U256>,
}

impl PreparedTransaction {
    /// Create a transaction with zero value and no gas price override
    pub fn new(kind: TransactionKind, to: Address, data: Bytes) -> Self {
        Self {
            kind,
            to,
            value: U256::zero(),
            data,
            gas_price: None,
        }
    }

    /// Set the native value sent with the transaction
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set a gas price override
    pub fn with_gas_price(mut self, gas_price: Option<U256>) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }
}

/// Descriptor of the order a prepared swap creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    /// Address the funds go to (the spender contract)
    pub send_to_address: Address,

    /// Initial status
    pub status: NotificationStatus,

    /// Validity window in seconds
    pub valid_for_secs: u64,

    /// When the swap was prepared
    pub created_at: DateTime<Utc>,
}

/// Result of preparing a swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    /// Request the swap was prepared for
    pub request: SwapRequest,

    /// Transactions to broadcast, in order
    pub transactions: Vec<PreparedTransaction>,

    /// Contract granted the spending authorization
    pub provider_address: Address,

    /// Amount the provider receives (human units of the source currency)
    pub provider_receives: String,

    /// Amount the provider is expected to send (human units of the destination currency)
    pub provider_sends: Option<String>,

    /// Order descriptor
    pub pending_order: PendingOrder,

    /// Liquidity source the trade was created for
    pub dex: String,

    /// Kind of provider executing the swap
    pub provider_kind: ProviderKind,

    /// Always false for on-chain swaps
    pub is_exit_to_fiat: bool,
}

impl SwapResult {
    /// Kinds of the prepared transactions, in broadcast order
    pub fn transaction_kinds(&self) -> Vec<TransactionKind> {
        self.transactions.iter().map(|tx| tx.kind()).collect()
    }
}

/// Identifies an order when polling its status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotice {
    /// Aggregator status id of the order
    pub status_id: String,
}

/// Order record as returned by the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOrder {
    pub id: String,
    pub payin_address: String,
    pub amount_expected_to: String,
    pub amount_expected_from: String,
    pub status: String,
    /// Creation time, unix seconds
    pub created_at: i64,
}

/// Order record normalized for callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOrder {
    pub order_id: String,
    pub status_id: String,
    pub send_to_address: String,
    pub rec_value: String,
    pub send_value: String,
    pub status: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Rates are only an estimate; the order is valid for this many seconds
    pub valid_for_secs: u64,
}

impl From<ExchangeOrder> for ParsedOrder {
    fn from(order: ExchangeOrder) -> Self {
        Self {
            order_id: order.id.clone(),
            status_id: order.id,
            send_to_address: order.payin_address,
            rec_value: order.amount_expected_to,
            send_value: order.amount_expected_from,
            status: order.status,
            timestamp: DateTime::from_timestamp(order.created_at, 0),
            valid_for_secs: SWAP_VALID_FOR_SECS,
        }
    }
}

/// Price offered by one liquidity source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DexPrice {
    pub dex: String,
    pub price: String,
}

/// Rate shown to the user for one liquidity source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub from_currency: String,
    pub to_currency: String,
    pub provider: String,
    /// Zero when the source is not known to work
    pub rate: String,
    pub source: String,
}

/// Token entry of the aggregator token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Contract address; absent for the native currency
    #[serde(default)]
    pub address: Option<Address>,

    /// Decimals of the base unit
    pub decimals: u8,
}

/// Serde helpers for `U256` amounts carried as decimal strings
///
/// Accepts decimal strings, `0x` hex strings and JSON integers; always writes
/// decimal strings.
///
/// JSON integers are limited to `u64`. Larger amounts must be sent as strings,
/// since serde_json reads them as lossy floats.
pub mod serde_u256 {
    use ethers::types::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    fn parse<E: de::Error>(raw: Raw) -> Result<U256, E> {
        match raw {
            Raw::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| {
                de::Error::custom(format!(
                    "amount {} is not an integer up to u64::MAX, send it as a decimal string",
                    n
                ))
            }),
            Raw::Text(s) => {
                let s = s.trim();
                if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    U256::from_str_radix(hex, 16).map_err(de::Error::custom)
                } else {
                    U256::from_dec_str(s).map_err(de::Error::custom)
                }
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(&v.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?.map(parse).transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const TRADE_JSON: &str = r#"{
        "trade": {
            "to": "0x745daa146934b27e3f0b6bff1a6e36b9b90fb131",
            "data": "0xdeadbeef",
            "value": "1000000000000000000"
        },
        "metadata": {
            "input": {
                "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                "amount": "1000000000000000000",
                "spender": "0xe0f9bfce2f6e4ea3dd3d3e3f1d8c8dbd43e2a8f3"
            },
            "query": { "from": "WETH", "to": "DAI", "toAmount": "180.5", "dex": "ag" },
            "gasPrice": "0x4a817c800"
        }
    }"#;

    #[test]
    fn test_trade_quote_deserialize() {
        let quote: TradeQuote = serde_json::from_str(TRADE_JSON).unwrap();
        assert_eq!(quote.trade.value, U256::exp10(18));
        assert_eq!(quote.trade.data, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(quote.input_amount(), Some(U256::exp10(18)));
        assert_eq!(quote.metadata.gas_price, Some(U256::from(20_000_000_000u64)));
        assert_eq!(quote.metadata.query.to_amount.as_deref(), Some("180.5"));
    }

    #[test]
    fn test_spender_prefers_input_spender() {
        let quote: TradeQuote = serde_json::from_str(TRADE_JSON).unwrap();
        let (spender, source) = quote.spender();
        assert_eq!(source, SpenderSource::InputSpender);
        assert_eq!(
            spender,
            Address::from_str("0xe0f9bfce2f6e4ea3dd3d3e3f1d8c8dbd43e2a8f3").unwrap()
        );
    }

    #[test]
    fn test_spender_falls_back_to_trade_target() {
        let mut quote: TradeQuote = serde_json::from_str(TRADE_JSON).unwrap();
        quote.metadata.input.as_mut().unwrap().spender = None;
        assert_eq!(quote.spender(), (quote.trade.to, SpenderSource::TradeTarget));

        quote.metadata.input = None;
        assert_eq!(quote.spender(), (quote.trade.to, SpenderSource::TradeTarget));
    }

    #[test]
    fn test_trade_quote_without_metadata() {
        let json = r#"{
            "trade": {"to": "0x745daa146934b27e3f0b6bff1a6e36b9b90fb131", "data": "0x", "value": 0}
        }"#;
        let quote: TradeQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.trade.value, U256::zero());
        assert!(quote.metadata.input.is_none());
        assert!(quote.input_token().is_none());
    }

    #[derive(Debug, Deserialize)]
    struct Amount {
        #[serde(with = "serde_u256")]
        value: U256,
    }

    #[test]
    fn test_amounts_above_u64_need_strings() {
        let json = r#"{"value": "340282366920938463463374607431768211456"}"#;
        let as_string: Amount = serde_json::from_str(json).unwrap();
        assert_eq!(as_string.value, U256::one() << 128);

        let as_number: Amount = serde_json::from_str(r#"{"value": 18446744073709551615}"#).unwrap();
        assert_eq!(as_number.value, U256::from(u64::MAX));

        for json in [
            r#"{"value": 340282366920938463463374607431768211456}"#,
            r#"{"value": -1}"#,
            r#"{"value": 1.5}"#,
        ] {
            let err = serde_json::from_str::<Amount>(json).unwrap_err();
            assert!(err.to_string().contains("decimal string"), "{}: {}", json, err);
        }
    }

    #[test]
    fn test_parse_order() {
        let order = ExchangeOrder {
            id: "abc123".into(),
            payin_address: "0x01".into(),
            amount_expected_to: "10".into(),
            amount_expected_from: "0.1".into(),
            status: "waiting".into(),
            created_at: 1_600_000_000,
        };
        let parsed = ParsedOrder::from(order);
        assert_eq!(parsed.order_id, "abc123");
        assert_eq!(parsed.status_id, "abc123");
        assert_eq!(parsed.rec_value, "10");
        assert_eq!(parsed.valid_for_secs, SWAP_VALID_FOR_SECS);
        assert_eq!(parsed.timestamp.map(|t| t.timestamp()), Some(1_600_000_000));
    }

    #[test]
    fn test_prepared_transaction_serializes_decimal_value() {
        let data = Bytes::from(vec![0xd0]);
        let tx = PreparedTransaction::new(TransactionKind::Wrap, Address::zero(), data)
            .with_value(U256::from(800));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], "800");
        assert_eq!(json["kind"], "wrap");
        assert!(json.get("gasPrice").is_none());
    }
}
