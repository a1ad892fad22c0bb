//! Output tables and their text rendering

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifier of a report table, in the order of the statistics window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TableId {
    Today,
    TodayCorrect,
    TodayCorrectMature,
    FutureDue,
    FutureDueByTemplate,
    Calendar,
    ReviewCounts,
    ReviewTime,
    ReviewTimeByType,
    CardCounts,
    Intervals,
    Ease,
    Stability,
    Difficulty,
    Retrievability,
    Hourly,
    AnswerButtons,
    Added,
    TrueRetention,
}

impl TableId {
    pub const ALL: [Self; 19] = [
        Self::Today,
        Self::TodayCorrect,
        Self::TodayCorrectMature,
        Self::FutureDue,
        Self::FutureDueByTemplate,
        Self::Calendar,
        Self::ReviewCounts,
        Self::ReviewTime,
        Self::ReviewTimeByType,
        Self::CardCounts,
        Self::Intervals,
        Self::Ease,
        Self::Stability,
        Self::Difficulty,
        Self::Retrievability,
        Self::Hourly,
        Self::AnswerButtons,
        Self::Added,
        Self::TrueRetention,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::TodayCorrect => "today-correct",
            Self::TodayCorrectMature => "today-correct-mature",
            Self::FutureDue => "future-due",
            Self::FutureDueByTemplate => "future-due-by-template",
            Self::Calendar => "calendar",
            Self::ReviewCounts => "review-counts",
            Self::ReviewTime => "review-time",
            Self::ReviewTimeByType => "review-time-by-type",
            Self::CardCounts => "card-counts",
            Self::Intervals => "intervals",
            Self::Ease => "ease",
            Self::Stability => "stability",
            Self::Difficulty => "difficulty",
            Self::Retrievability => "retrievability",
            Self::Hourly => "hourly",
            Self::AnswerButtons => "answer-buttons",
            Self::Added => "added",
            Self::TrueRetention => "true-retention",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::TodayCorrect => "Today (all cards)",
            Self::TodayCorrectMature => "Today (mature cards)",
            Self::FutureDue => "Future Due",
            Self::FutureDueByTemplate => "Future Due (by template)",
            Self::Calendar => "Calendar",
            Self::ReviewCounts => "Reviews (counts)",
            Self::ReviewTime => "Reviews (time)",
            Self::ReviewTimeByType => "Reviews (time by type)",
            Self::CardCounts => "Card Counts",
            Self::Intervals => "Review Intervals",
            Self::Ease => "Card Ease",
            Self::Stability => "Card Stability",
            Self::Difficulty => "Card Difficulty",
            Self::Retrievability => "Card Retrievability",
            Self::Hourly => "Hourly Breakdown",
            Self::AnswerButtons => "Answer Buttons",
            Self::Added => "Added",
            Self::TrueRetention => "True Retention",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown table `{_0}`")]
pub struct UnknownTableId(#[error(not(source))] pub String);

impl FromStr for TableId {
    type Err = UnknownTableId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownTableId(s.to_owned()))
    }
}

/// A table cell. Serializes as a bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Count(u64),
    /// A percentage; `None` when the denominator is 0.
    Percent(Option<f64>),
    /// A duration in hours.
    Hours(f64),
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Count(count) => write!(f, "{count}"),
            Self::Percent(Some(percent)) => write!(f, "{percent:.1}%"),
            Self::Percent(None) => f.write_str("N/A"),
            Self::Hours(hours) => {
                if *hours > 1.0 {
                    write!(f, "{hours:.2} hours")
                } else if hours * 60.0 > 1.0 {
                    write!(f, "{:.2} minutes", hours * 60.0)
                } else {
                    write!(f, "{:.2} seconds", hours * 3600.0)
                }
            }
        }
    }
}

/// A titled table with a header row and optional notes printed below it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub id: TableId,
    pub title: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub notes: Vec<String>,
}

impl Table {
    #[must_use]
    pub fn new<I, S>(id: TableId, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            title: id.title(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: vec![],
            notes: vec![],
        }
    }
}

/// Aligned text: the first column left-aligned, the others right-aligned.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let mut widths = self.columns.iter().map(|c| c.chars().count()).collect::<Vec<_>>();
        for row in &rendered {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(f, "{}", self.title)?;
        write_row(f, &widths, &self.columns)?;
        for row in &rendered {
            write_row(f, &widths, row)?;
        }
        for note in &self.notes {
            writeln!(f, "{note}")?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            write!(f, "{cell:<width$}")?;
        } else {
            write!(f, "  {cell:>width$}")?;
        }
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_id_round_trip() {
        for id in TableId::ALL {
            assert_eq!(id.as_str().parse::<TableId>(), Ok(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{id}\""));
        }
        assert!("nope".parse::<TableId>().is_err());
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Percent(Some(50.0)).to_string(), "50.0%");
        assert_eq!(Cell::Percent(None).to_string(), "N/A");
        assert_eq!(Cell::Hours(2.5).to_string(), "2.50 hours");
        assert_eq!(Cell::Hours(0.5).to_string(), "30.00 minutes");
        assert_eq!(Cell::Hours(10.0 / 3600.0).to_string(), "10.00 seconds");
    }

    #[test]
    fn test_render_aligned() {
        let mut table = Table::new(TableId::CardCounts, ["Status", "Count"]);
        table.rows.push(vec![Cell::text("New"), Cell::Count(12)]);
        table.rows.push(vec![Cell::text("Suspended"), Cell::Count(3)]);
        table.notes.push("Total: 15".to_owned());
        let text = table.to_string();
        assert_eq!(
            text,
            "Card Counts\nStatus     Count\nNew           12\nSuspended      3\nTotal: 15\n"
        );
    }

    #[test]
    fn test_cells_serialize_as_values() {
        let row = vec![
            Cell::text("a"),
            Cell::Count(1),
            Cell::Percent(None),
            Cell::Hours(0.5),
        ];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["a",1,null,0.5]"#);
    }
}
