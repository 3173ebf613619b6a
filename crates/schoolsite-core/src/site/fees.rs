use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(HEADER_CELL_SELECTOR, "thead th");
selector!(BODY_ROW_SELECTOR, "tbody tr");
selector!(CELL_SELECTOR, "th, td");

/// A table extracted from the HTML the backend stores in the description of
/// a tuition fee entry or a class routine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeeTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FeeTable {
    /// Header cells come from `thead th`, rows from `tbody tr`. Cell text is
    /// trimmed. Markup without a table yields an empty result.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_fragment(html);
        let headers = document
            .select(&HEADER_CELL_SELECTOR)
            .map(cell_text)
            .collect();
        let rows = document
            .select(&BODY_ROW_SELECTOR)
            .map(|row| row.select(&CELL_SELECTOR).map(cell_text).collect())
            .collect();
        FeeTable { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fee_table() {
        let html = r#"
            <table>
              <thead><tr><th> Class </th><th>Monthly Fee</th><th>Admission</th></tr></thead>
              <tbody>
                <tr><td>Six</td><td>500</td><td> 2,000 </td></tr>
                <tr><td>Seven</td><td><b>550</b></td><td>2,000</td></tr>
              </tbody>
            </table>"#;

        let table = FeeTable::parse(html);
        assert_eq!(table.headers, vec!["Class", "Monthly Fee", "Admission"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Six".to_string(), "500".to_string(), "2,000".to_string()],
                vec!["Seven".to_string(), "550".to_string(), "2,000".to_string()],
            ]
        );
    }

    #[test]
    fn test_non_table_markup_is_empty() {
        assert!(FeeTable::parse("<p>Fees will be announced soon.</p>").is_empty());
        assert!(FeeTable::parse("").is_empty());
    }
}
