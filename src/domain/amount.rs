use thiserror::Error;

use super::{Cents, Decimal, DecimalError, MAX_ENTRY_CENTS, Period, Vocabulary, format_cents};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("amount must be positive, got {0}")]
    NonPositive(String),

    #[error("unknown period '{0}'")]
    UnknownPeriod(String),

    #[error("'{0}' is too large")]
    TooLarge(String),
}

/// A monthly-normalized amount, with the annual figure it came from when the
/// user entered a yearly cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAmount {
    pub monthly: Cents,
    pub annual: Option<Cents>,
}

impl ParsedAmount {
    /// Human-readable note about where the monthly figure came from.
    /// Empty for amounts entered per month.
    pub fn note(&self) -> String {
        match self.annual {
            Some(annual) => format!("{} per year / 12", format_cents(annual)),
            None => String::new(),
        }
    }
}

/// Parse the amount token of an entry message into a monthly amount.
///
/// Accepted forms: `699`, `249,50`, `83988/год`, `2400/month`. The part after
/// `/` is looked up in the vocabulary's period aliases.
pub fn parse_amount(raw: &str, vocabulary: &Vocabulary) -> Result<ParsedAmount, AmountError> {
    let (cost_token, period) = match raw.split_once('/') {
        Some((cost, period)) => (cost, Some(period)),
        None => (raw, None),
    };

    let cost = Decimal::parse(cost_token).map_err(|err| decimal_error(err, cost_token))?;

    let period = match period {
        Some(alias) => vocabulary
            .period(alias)
            .ok_or_else(|| AmountError::UnknownPeriod(alias.trim().to_lowercase()))?,
        None => Period::Monthly,
    };

    let monthly = cost
        .to_cents_divided(period.months())
        .map_err(|err| decimal_error(err, cost_token))?;
    if monthly <= 0 {
        return Err(AmountError::NonPositive(raw.to_string()));
    }
    if monthly > MAX_ENTRY_CENTS {
        return Err(AmountError::TooLarge(cost_token.to_string()));
    }

    let annual = match period {
        Period::Annual => {
            let annual = cost.to_cents().map_err(|err| decimal_error(err, cost_token))?;
            if annual > MAX_ENTRY_CENTS {
                return Err(AmountError::TooLarge(cost_token.to_string()));
            }
            Some(annual)
        }
        Period::Monthly => None,
    };

    Ok(ParsedAmount { monthly, annual })
}

fn decimal_error(err: DecimalError, token: &str) -> AmountError {
    match err {
        DecimalError::Invalid => AmountError::NotANumber(token.to_string()),
        DecimalError::Overflow => AmountError::TooLarge(token.to_string()),
    }
}
