//! Tab-separated card and review datasets with derived columns.
//!
//! Cards follow collection order and reviews follow card order, then time.
//! Unlike the tables, the review dataset keeps excluded reviews and flags
//! them in its `excluded` column.

use std::fmt;

use cardstat_core::{CardRecord, Collection, ReviewRecord};

use crate::classify::{CardClass, Classification, Maturity, ReviewClass, Timeliness};

const CARD_COLUMNS: [&str; 20] = [
    "card_id",
    "note_id",
    "deck_id",
    "template",
    "type",
    "queue",
    "status",
    "due_days",
    "added_days",
    "interval",
    "factor",
    "ease_bin",
    "difficulty",
    "scaled_difficulty",
    "stability",
    "stability_days",
    "retrievability",
    "retrievability_estimated",
    "removal",
    "excluded",
];

const REVIEW_COLUMNS: [&str; 20] = [
    "review_id",
    "card_id",
    "deck_id",
    "reviewed_at",
    "study_date",
    "relative_day",
    "local_hour",
    "kind",
    "button",
    "correct",
    "interval",
    "last_interval",
    "elapsed_days",
    "taken_seconds",
    "factor",
    "maturity",
    "timeliness",
    "counts_for_accuracy",
    "after_now",
    "excluded",
];

/// One row per card of `collection`, followed by any browser-export
/// columns (empty for cards the browser export lacks).
#[must_use]
pub fn cards_tsv(collection: &Collection, classification: &Classification) -> String {
    let browser = collection.browser.as_ref();
    let extra = browser.map_or(&[][..], |browser| &browser.names[..]);

    let mut out = String::new();
    write_row(
        &mut out,
        CARD_COLUMNS.iter().map(ToString::to_string).chain(extra.iter().cloned()),
    );
    for (card, class) in collection.cards.iter().zip(&classification.cards) {
        let mut row = card_row(card, class);
        match browser.and_then(|browser| browser.rows.get(&card.id)) {
            Some(values) => row.extend(values.iter().cloned()),
            None => row.resize(CARD_COLUMNS.len() + extra.len(), String::new()),
        }
        write_row(&mut out, row);
    }
    out
}

/// One row per review of `collection`, excluded ones included.
#[must_use]
pub fn reviews_tsv(collection: &Collection, classification: &Classification) -> String {
    let mut out = String::new();
    write_row(&mut out, REVIEW_COLUMNS.iter().map(ToString::to_string));
    for (review, class) in collection.reviews.iter().zip(&classification.reviews) {
        write_row(&mut out, review_row(review, class));
    }
    out
}

fn card_row(card: &CardRecord, class: &CardClass) -> Vec<String> {
    vec![
        card.id.to_string(),
        card.note_id.to_string(),
        card.deck_id.to_string(),
        card.template.clone(),
        format!("{:?}", card.card_type),
        format!("{:?}", card.queue),
        class.status.label().to_owned(),
        class.due_days.to_string(),
        class.added_days.to_string(),
        card.interval.to_string(),
        card.factor.to_string(),
        optional(class.ease_bin),
        optional(card.memory.difficulty),
        optional(class.scaled_difficulty),
        optional(card.memory.stability),
        optional(class.stability_days),
        optional(class.retrievability),
        class.retrievability_estimated.to_string(),
        optional(card.removal),
        class.excluded.to_string(),
    ]
}

fn review_row(review: &ReviewRecord, class: &ReviewClass) -> Vec<String> {
    let maturity = match class.maturity {
        Maturity::Young => "young",
        Maturity::Mature => "mature",
    };
    let timeliness = match class.timeliness {
        Timeliness::Early => "early",
        Timeliness::OnTime => "on-time",
        Timeliness::Late => "late",
        Timeliness::Unscheduled => "",
    };
    #[expect(clippy::cast_precision_loss)]
    let taken_seconds = review.taken_millis as f64 / 1000.0;
    vec![
        review.id.to_string(),
        review.card_id.to_string(),
        review.deck_id.to_string(),
        review.reviewed_at.to_rfc3339(),
        class.study_date.to_string(),
        class.relative_day.to_string(),
        class.local_hour.to_string(),
        class.phase_at_review.label().to_owned(),
        optional(review.button),
        optional(class.correct),
        review.interval.to_string(),
        review.last_interval.to_string(),
        optional(review.elapsed_days),
        taken_seconds.to_string(),
        optional(review.factor),
        maturity.to_owned(),
        timeliness.to_owned(),
        class.counts_for_accuracy.to_string(),
        class.after_now.to_string(),
        class.excluded_by_reset_or_delete.to_string(),
    ]
}

fn optional<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_row<I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = String>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        if field.contains(['\t', '\n', '\r', '"']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(&field);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cardstat_core::{BrowserColumns, CardId, ReviewKind, StudyCalendar};
    use chrono::{Offset, Utc};

    use super::*;
    use crate::classify::{
        Rules,
        test_util::{card, clock, review},
    };

    fn collection(cards: Vec<CardRecord>, reviews: Vec<ReviewRecord>) -> Collection {
        let calendar = StudyCalendar::new(Utc.fix(), 4);
        Collection::new(Default::default(), cards, reviews, &calendar).unwrap()
    }

    #[test]
    fn test_review_dataset_keeps_excluded_reviews() {
        let mut removed = card(2);
        removed.removal = Some(cardstat_core::Removal::Reset);
        let collection = collection(
            vec![card(1), removed],
            vec![
                review(1, 0, ReviewKind::Review, 3),
                review(2, -1, ReviewKind::Review, 1),
            ],
        );
        let classification = Classification::new(&collection, &Rules::default(), &clock());

        let tsv = reviews_tsv(&collection, &classification);
        let lines = tsv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), REVIEW_COLUMNS.len());
        let excluded = lines[2].split('\t').collect::<Vec<_>>();
        assert_eq!(excluded[1], "2");
        assert_eq!(excluded[5], "-1");
        assert_eq!(excluded[9], "false");
        assert_eq!(excluded.last(), Some(&"true"));
    }

    #[test]
    fn test_card_dataset_columns() {
        let collection = collection(vec![card(1)], vec![]);
        let classification = Classification::new(&collection, &Rules::default(), &clock());

        let tsv = cards_tsv(&collection, &classification);
        let lines = tsv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        let fields = lines[1].split('\t').collect::<Vec<_>>();
        assert_eq!(fields.len(), CARD_COLUMNS.len());
        assert_eq!(fields[0], "1");
        assert_eq!(fields[6], "Young");
        assert_eq!(fields[11], "250");
        assert_eq!(fields[12], "");
        assert_eq!(fields[19], "false");
    }

    #[test]
    fn test_card_dataset_appends_browser_columns() {
        let browser = BrowserColumns {
            names: vec!["Sort Field".to_owned(), "Deck".to_owned()],
            rows: BTreeMap::from([(CardId(2), vec!["apple".to_owned(), "Fruit".to_owned()])]),
        };
        let collection = collection(vec![card(1), card(2)], vec![]).with_browser(browser);
        let classification = Classification::new(&collection, &Rules::default(), &clock());

        let tsv = cards_tsv(&collection, &classification);
        let lines = tsv.lines().collect::<Vec<_>>();
        assert!(lines[0].ends_with("\texcluded\tSort Field\tDeck"));
        let unmatched = lines[1].split('\t').collect::<Vec<_>>();
        assert_eq!(unmatched.len(), CARD_COLUMNS.len() + 2);
        assert_eq!(unmatched[CARD_COLUMNS.len()..], ["", ""]);
        assert!(lines[2].ends_with("\tfalse\tapple\tFruit"));
    }

    #[test]
    fn test_fields_with_separators_are_quoted() {
        let mut out = String::new();
        write_row(&mut out, ["a\tb".to_owned(), "say \"hi\"".to_owned(), "c".to_owned()]);
        assert_eq!(out, "\"a\tb\"\t\"say \"\"hi\"\"\"\tc\n");
    }
}
