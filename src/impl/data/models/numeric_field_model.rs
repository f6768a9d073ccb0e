use std::str::FromStr;

use crate::errors::PipelineError;

/// Numeric cell as exported by spreadsheet tools: thousands separators are
/// tolerated, and accounting-style parentheses mean negative.
#[derive(Debug)]
pub(crate) struct NumericFieldModel(pub f64);

impl FromStr for NumericFieldModel {
    type Err = PipelineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.replace(',', "");
        let trimmed = raw.trim();
        let is_negative = trimmed.starts_with('(') && trimmed.ends_with(')');
        let numeric_part = trimmed.trim_matches(|c| c == '(' || c == ')');
        let value = numeric_part
            .parse::<f64>()
            .map_err(|_| PipelineError::InvalidNumeric {
                value: s.to_owned(),
            })?;
        Ok(NumericFieldModel(if is_negative { -value } else { value }))
    }
}

impl From<NumericFieldModel> for f64 {
    fn from(model: NumericFieldModel) -> f64 {
        model.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_separated_values() {
        assert_eq!(NumericFieldModel::from_str("12.5").unwrap().0, 12.5);
        assert_eq!(NumericFieldModel::from_str("1,200").unwrap().0, 1200.0);
        assert_eq!(NumericFieldModel::from_str(" 3 ").unwrap().0, 3.0);
    }

    #[test]
    fn parentheses_mean_negative() {
        assert_eq!(NumericFieldModel::from_str("(42)").unwrap().0, -42.0);
        assert_eq!(NumericFieldModel::from_str("(1,000.50)").unwrap().0, -1000.5);
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(NumericFieldModel::from_str("abc").is_err());
        assert!(NumericFieldModel::from_str("").is_err());
    }
}
