//! Number and label formatting shared by the handlers.

use chrono::NaiveDate;

/// Rounds to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `1_234_567.0` → `"1.23M"`, `850_400.0` → `"850.4K"`, `12.0` → `"12.00"`.
pub fn compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e6 {
        format!("{sign}{:.2}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}{:.1}K", abs / 1e3)
    } else {
        format!("{sign}{abs:.2}")
    }
}

/// USD amount in compact form: `"$1.23M"`.
pub fn money(value: f64) -> String {
    match compact(value).strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${}", compact(value)),
    }
}

/// Percent value with an explicit sign: `12.34` → `"+12.3%"`.
pub fn signed_pct(value: f64) -> String {
    format!("{value:+.1}%")
}

/// Percent value: `45.16` → `"45.2%"`.
pub fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

/// Fraction as a percent: `0.412` → `"41.2%"`.
pub fn rate(fraction: f64) -> String {
    pct(fraction * 100.0)
}

/// Month as a table key: `"2024-01"`.
pub fn month_key(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

/// Month for headlines: `"Jan 2024"`.
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

/// KPI label for a rank: "Top Market", "2nd Market", "3rd Market", ...
pub fn rank_label(rank: usize, noun: &str) -> String {
    let ordinal = match rank {
        1 => return format!("Top {noun}"),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{n}th"),
    };
    format!("{ordinal} {noun}")
}

/// Display name of a channel.
pub fn channel_name(channel: &str) -> &str {
    match channel {
        "ecommerce" => "E-commerce",
        "retail" => "Retail",
        other => other,
    }
}

/// Display name of a pack type.
pub fn pack_name(pack: &str) -> &str {
    match pack {
        "single" => "Single",
        "multipack" => "Multipack",
        "shelf-stable" => "Shelf-stable",
        other => other,
    }
}

/// `["a"]` → `"a"`, `["a", "b", "c"]` → `"a, b and c"`.
pub fn join_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head = init.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
            format!("{head} and {}", last.as_ref())
        }
    }
}

/// Upper-cases the first character.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_scales() {
        assert_eq!(money(1_234_567.0), "$1.23M");
        assert_eq!(money(850_400.0), "$850.4K");
        assert_eq!(money(12.0), "$12.00");
        assert_eq!(money(-2_500.0), "-$2.5K");
    }

    #[test]
    fn percents() {
        assert_eq!(signed_pct(12.34), "+12.3%");
        assert_eq!(signed_pct(-0.04), "-0.0%");
        assert_eq!(rate(0.4125), "41.2%");
    }

    #[test]
    fn ranks_and_lists() {
        assert_eq!(rank_label(1, "Market"), "Top Market");
        assert_eq!(rank_label(2, "Market"), "2nd Market");
        assert_eq!(rank_label(5, "Market"), "5th Market");
        assert_eq!(join_and(&["UK", "BR"]), "UK and BR");
        assert_eq!(join_and(&["a", "b", "c"]), "a, b and c");
        assert_eq!(capitalize("multipack yogurt"), "Multipack yogurt");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(-3.25, 0), -3.0);
    }
}
