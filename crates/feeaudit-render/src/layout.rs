//! Audit block layout
//!
//! The audit sheet is a vertical stack of one block per run:
//!
//! ```text
//! | Run 20 Audit  |            |            |
//! |               |            |            |
//! | Contract Name | 2025-06-16 | 2025-06-20 |
//! | STE           | 340.697    |            |
//! |               |            |            |
//! | Run 32 Audit  |            |            |
//! | ...           |            |            |
//! ```
//!
//! Every block shares the same date columns (all dates in the table,
//! ascending). A run with no fee on a date leaves that cell blank.

use rust_decimal::Decimal;

use feeaudit_core::{block_title, AggregateTable, CONTRACT_HEADER};

/// Role of a cell in the audit sheet
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutCell {
    Blank,
    /// `Run <id> Audit`
    Title(String),
    /// `Contract Name` or a `YYYY-MM-DD` date
    Header(String),
    /// Contract label at the start of a data row
    Label(String),
    Fee(Decimal),
}

/// Grid of cells ready to be written to a worksheet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuditLayout {
    pub rows: Vec<Vec<LayoutCell>>,
    /// Number of columns: the label column plus one per date
    pub width: usize,
}

impl AuditLayout {
    pub fn build(table: &AggregateTable, contract: &str) -> Self {
        let dates = table.dates();
        let mut rows = Vec::new();

        let header: Vec<LayoutCell> = std::iter::once(LayoutCell::Header(CONTRACT_HEADER.to_string()))
            .chain(dates.iter().map(|d| LayoutCell::Header(d.format("%Y-%m-%d").to_string())))
            .collect();

        for (i, entry) in table.runs().enumerate() {
            if i > 0 {
                rows.push(Vec::new());
            }
            rows.push(vec![LayoutCell::Title(block_title(&entry.run))]);
            rows.push(Vec::new());
            rows.push(header.clone());

            let mut data = vec![LayoutCell::Label(contract.to_string())];
            data.extend(dates.iter().map(|date| {
                entry
                    .fees
                    .get(date)
                    .map_or(LayoutCell::Blank, |fee| LayoutCell::Fee(*fee))
            }));
            rows.push(data);
        }

        Self {
            rows,
            width: dates.len() + 1,
        }
    }

    /// Row indices of block titles
    pub fn title_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row.first(), Some(LayoutCell::Title(_))))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use feeaudit_core::{FeeRecord, RunId};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use LayoutCell::{Blank, Fee, Header, Label, Title};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn table() -> AggregateTable {
        vec![
            FeeRecord::new(RunId::new("20"), dec!(100.0), date(16)),
            FeeRecord::new(RunId::new("20"), dec!(240.697), date(16)),
            FeeRecord::new(RunId::new("32"), dec!(425.399), date(16)),
            FeeRecord::new(RunId::new("32"), dec!(12), date(20)),
        ]
        .into_iter()
        .collect()
    }

    fn header() -> Vec<LayoutCell> {
        vec![
            Header("Contract Name".into()),
            Header("2025-06-16".into()),
            Header("2025-06-20".into()),
        ]
    }

    #[test]
    fn stacks_one_block_per_run() {
        let layout = AuditLayout::build(&table(), "STE");

        assert_eq!(layout.width, 3);
        assert_eq!(
            layout.rows,
            vec![
                vec![Title("Run 20 Audit".into())],
                vec![],
                header(),
                vec![Label("STE".into()), Fee(dec!(340.697)), Blank],
                vec![],
                vec![Title("Run 32 Audit".into())],
                vec![],
                header(),
                vec![Label("STE".into()), Fee(dec!(425.399)), Fee(dec!(12))],
            ]
        );
        assert_eq!(layout.title_rows(), vec![0, 5]);
    }

    #[test]
    fn contract_label_is_configurable() {
        let layout = AuditLayout::build(&table(), "North");
        assert_eq!(layout.rows[3][0], Label("North".into()));
    }

    #[test]
    fn blocks_follow_first_seen_order() {
        let table: AggregateTable = vec![
            FeeRecord::new(RunId::new("9"), dec!(1), date(18)),
            FeeRecord::new(RunId::new("10"), dec!(1), date(17)),
        ]
        .into_iter()
        .collect();

        let layout = AuditLayout::build(&table, "STE");
        assert_eq!(layout.rows[0], vec![Title("Run 9 Audit".into())]);
        assert_eq!(layout.rows[5], vec![Title("Run 10 Audit".into())]);
        // Dates ascend even though run 9 was seen first
        assert_eq!(layout.rows[2][1], Header("2025-06-17".into()));
        assert_eq!(layout.rows[3][1], Blank);
    }

    #[test]
    fn empty_table_has_no_rows() {
        let layout = AuditLayout::build(&AggregateTable::new(), "STE");
        assert!(layout.rows.is_empty());
        assert_eq!(layout.width, 1);
    }
}
