//! Counter text formatting: prefix/suffix, K/M abbreviation, precision and
//! thousands grouping.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    /// Fractional digits: 0 or 1.
    pub decimals: u32,
    pub prefix: String,
    pub suffix: String,
    /// Render 1 200 as `1.2K`, 3 400 000 as `3.4M`.
    pub abbreviate: bool,
    /// Insert `,` between thousands of the integer part.
    pub grouping: bool,
}

impl FormatSpec {
    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }
}

/// How a value is brought to the displayed precision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
    Nearest,
}

#[inline]
fn quantize(value: f64, decimals: u32, rounding: Rounding) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    // guards 2399.9999999 style artefacts before floor/ceil
    let scaled = (value * scale * 1e6).round() / 1e6;
    let q = match rounding {
        Rounding::Down => scaled.floor(),
        Rounding::Up => scaled.ceil(),
        Rounding::Nearest => scaled.round(),
    };
    q / scale
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fixed(value: f64, decimals: u32, grouping: bool) -> String {
    let text = format!("{:.*}", decimals as usize, value);
    if !grouping {
        return text;
    }
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    match body.split_once('.') {
        Some((int, frac)) => format!("{sign}{}.{frac}", group_thousands(int)),
        None => format!("{sign}{}", group_thousands(body)),
    }
}

/// Format `value` for display.
///
/// The abbreviation unit is chosen on the rounded value, so `999 960`
/// rounded to nearest reads `1M` rather than `1000K`.
pub fn format_value(value: f64, spec: &FormatSpec, rounding: Rounding) -> String {
    let plain = quantize(value, spec.decimals, rounding);
    let body = if spec.abbreviate && plain.abs() >= 1_000.0 {
        let digits = spec.decimals.max(1);
        let mut unit = if plain.abs() >= 1_000_000.0 { "M" } else { "K" };
        let mut short = quantize(value / unit_divisor(unit), digits, rounding);
        if unit == "K" && short.abs() >= 1_000.0 {
            unit = "M";
            short = quantize(value / unit_divisor(unit), digits, rounding);
        }
        let mut text = format!("{:.*}", digits as usize, short);
        if text.contains('.') {
            let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
            text.truncate(trimmed);
        }
        format!("{text}{unit}")
    } else {
        fixed(plain, spec.decimals, spec.grouping)
    };
    format!("{}{}{}", spec.prefix, body, spec.suffix)
}

#[inline]
fn unit_divisor(unit: &str) -> f64 {
    if unit == "M" {
        1_000_000.0
    } else {
        1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integers() {
        let spec = FormatSpec::with_suffix("+");
        assert_eq!(format_value(0.0, &spec, Rounding::Down), "0+");
        assert_eq!(format_value(2399.7, &spec, Rounding::Down), "2399+");
        assert_eq!(format_value(2400.0, &spec, Rounding::Nearest), "2400+");
    }

    #[test]
    fn one_decimal() {
        let spec = FormatSpec {
            decimals: 1,
            suffix: "%".into(),
            ..Default::default()
        };
        assert_eq!(format_value(98.47, &spec, Rounding::Down), "98.4%");
        assert_eq!(format_value(98.47, &spec, Rounding::Nearest), "98.5%");
        assert_eq!(format_value(0.3 * 3.0, &spec, Rounding::Down), "0.9%");
    }

    #[test]
    fn abbreviation() {
        let spec = FormatSpec {
            abbreviate: true,
            prefix: "$".into(),
            ..Default::default()
        };
        assert_eq!(format_value(2400.0, &spec, Rounding::Nearest), "$2.4K");
        assert_eq!(format_value(2000.0, &spec, Rounding::Nearest), "$2K");
        assert_eq!(format_value(3_450_000.0, &spec, Rounding::Down), "$3.4M");
        assert_eq!(format_value(999.0, &spec, Rounding::Nearest), "$999");
    }

    #[test]
    fn abbreviation_unit_follows_rounding() {
        let spec = FormatSpec {
            abbreviate: true,
            ..Default::default()
        };
        assert_eq!(format_value(999_960.0, &spec, Rounding::Nearest), "1M");
        assert_eq!(format_value(999_960.0, &spec, Rounding::Down), "999.9K");
        assert_eq!(format_value(999.6, &spec, Rounding::Nearest), "1K");
        assert_eq!(format_value(999.6, &spec, Rounding::Down), "999");
    }

    #[test]
    fn grouping() {
        let spec = FormatSpec {
            grouping: true,
            ..Default::default()
        };
        assert_eq!(format_value(1234567.0, &spec, Rounding::Nearest), "1,234,567");
        assert_eq!(format_value(999.0, &spec, Rounding::Nearest), "999");
        let spec = FormatSpec {
            grouping: true,
            decimals: 1,
            ..Default::default()
        };
        assert_eq!(format_value(12345.25, &spec, Rounding::Down), "12,345.2");
    }

    #[test]
    fn rounding_direction() {
        let spec = FormatSpec::default();
        assert_eq!(format_value(10.2, &spec, Rounding::Up), "11");
        assert_eq!(format_value(10.2, &spec, Rounding::Down), "10");
    }
}
