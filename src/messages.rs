// Result banner text and field labels, in Arabic (default) and English.

use crate::normalize::format_amount;
use crate::reconciliation::{ComparisonResult, Sign};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Arabic => "ar",
            Locale::English => "en",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Locale::Arabic => Locale::English,
            Locale::English => Locale::Arabic,
        }
    }

    /// Currency unit shown next to amounts
    pub fn currency(&self) -> &'static str {
        match self {
            Locale::Arabic => "جنيه",
            Locale::English => "EGP",
        }
    }

    pub fn claimed_total_label(&self) -> &'static str {
        match self {
            Locale::Arabic => "إجمالي المبيعات",
            Locale::English => "Total sales",
        }
    }

    pub fn compare_label(&self) -> &'static str {
        match self {
            Locale::Arabic => "مقارنة",
            Locale::English => "Compare",
        }
    }

    pub fn reset_label(&self) -> &'static str {
        match self {
            Locale::Arabic => "إعادة",
            Locale::English => "Reset",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Arabic),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unsupported locale '{}' (expected ar or en)", other)),
        }
    }
}

/// Banner text for a comparison.
///
/// The Arabic text uses one wording for both directions; English names the
/// direction: a claimed total above the counted cash is a shortfall.
pub fn result_message(result: &ComparisonResult, locale: Locale) -> String {
    let amount = format_amount(result.difference);

    match (locale, result.sign) {
        (Locale::Arabic, Sign::Equal) => "لا يوجد فرق".to_string(),
        (Locale::Arabic, _) => format!("لديك فارق بمقدار {} {}", amount, locale.currency()),
        (Locale::English, Sign::Equal) => "No difference".to_string(),
        (Locale::English, Sign::Over) => {
            format!("You have a shortfall of {} {}", amount, locale.currency())
        }
        (Locale::English, Sign::Under) => {
            format!("You have a surplus of {} {}", amount, locale.currency())
        }
    }
}

/// Field label for a denomination, e.g. "1000 جنيه"
pub fn denomination_label(denomination: u64, locale: Locale) -> String {
    format!("{} {}", denomination, locale.currency())
}
