//! Currency exchange calculator exposed as a callable tool.

use serde::Deserialize;
use strum::{Display, EnumString, VariantNames};

use super::tool::AgentTool;
use super::types::AgentToolParameters;
use crate::error::{Result, WorkbenchError};

/// Tool name advertised to the model.
pub const TOOL_NAME: &str = "currency_calculator";

/// Tool description advertised to the model.
pub const TOOL_DESCRIPTION: &str = "Currency exchange calculator.";

/// Supported currency symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, VariantNames)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    /// Multiplicative rate converting an amount in `self` into `quote`.
    pub fn rate_to(self, quote: Currency) -> f64 {
        match (self, quote) {
            (Currency::Usd, Currency::Usd) | (Currency::Eur, Currency::Eur) => 1.0,
            (Currency::Usd, Currency::Eur) => 1.0 / 1.1,
            (Currency::Eur, Currency::Usd) => 1.1,
        }
    }
}

/// Rate between two currency symbols.
///
/// Fails with [`WorkbenchError::InvalidArgument`] naming the pair when either
/// symbol is not a supported currency.
pub fn exchange_rate(base_currency: &str, quote_currency: &str) -> Result<f64> {
    match (base_currency.parse::<Currency>(), quote_currency.parse::<Currency>()) {
        (Ok(base), Ok(quote)) => Ok(base.rate_to(quote)),
        _ => Err(WorkbenchError::InvalidArgument(format!(
            "Unknown currencies {base_currency}, {quote_currency}"
        ))),
    }
}

/// Convert `base_amount` and format it as `"<amount> <QUOTE>"`.
pub fn currency_calculator(base_amount: f64, base_currency: &str, quote_currency: &str) -> Result<String> {
    let quote_amount = exchange_rate(base_currency, quote_currency)? * base_amount;
    Ok(format!("{} {}", format_amount(quote_amount), quote_currency))
}

/// Shortest round-trip decimal, keeping `.0` on integral values (`11.0`, not `11`).
///
/// Exponents carry a sign and at least two digits (`1e+16`, `1.5e-07`) and
/// NaN prints as `nan`.
pub fn format_amount(amount: f64) -> String {
    if amount.is_nan() {
        return "nan".to_string();
    }
    let shortest = format!("{amount:?}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => shortest,
    }
}

#[derive(Debug, Deserialize)]
struct CurrencyCalculatorArgs {
    base_amount: f64,
    #[serde(default = "default_base")]
    base_currency: String,
    #[serde(default = "default_quote")]
    quote_currency: String,
}

fn default_base() -> String {
    Currency::Usd.to_string()
}

fn default_quote() -> String {
    Currency::Eur.to_string()
}

/// The calculator as a tool: `base_amount` is required, both currencies
/// default to USD → EUR.
pub fn currency_calculator_tool() -> AgentTool {
    let parameters = AgentToolParameters::object()
        .number("base_amount", "Amount of currency in base_currency", true)
        .string_enum_with_default("base_currency", "Base currency", Currency::VARIANTS, "USD")
        .string_enum_with_default("quote_currency", "Quote currency", Currency::VARIANTS, "EUR")
        .build();

    AgentTool::new(TOOL_NAME, TOOL_DESCRIPTION, parameters, |args, _ctx| async move {
        let args: CurrencyCalculatorArgs = args.deserialize()?;
        let quote = currency_calculator(args.base_amount, &args.base_currency, &args.quote_currency)?;
        Ok(serde_json::Value::String(quote))
    })
}
