use std::str::FromStr;

/// Dollar amount cell: tolerates currency symbols, thousands separators,
/// and accountant-style parentheses for negatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MoneyModel(f64);

impl FromStr for MoneyModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(());
        }
        let negative = trimmed.starts_with('(') && trimmed.ends_with(')');
        let cleaned: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        let value: f64 = cleaned.parse().map_err(|_| ())?;
        Ok(MoneyModel(if negative { -value } else { value }))
    }
}

impl From<MoneyModel> for f64 {
    fn from(model: MoneyModel) -> Self {
        model.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formatted_amounts() {
        assert_eq!("$1,500.00".parse::<MoneyModel>(), Ok(MoneyModel(1500.0)));
        assert_eq!("2500".parse::<MoneyModel>(), Ok(MoneyModel(2500.0)));
        assert_eq!("(300.25)".parse::<MoneyModel>(), Ok(MoneyModel(-300.25)));
    }

    #[test]
    fn rejects_blanks_and_garbage() {
        assert!("".parse::<MoneyModel>().is_err());
        assert!("n/a".parse::<MoneyModel>().is_err());
    }
}
