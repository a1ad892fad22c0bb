//! Loading exported cards and review logs
//!
//! The card export has one row per card. Unless a separate review-log export
//! is given, each row carries the card's whole review log in the
//! `revlog_entries` column: entries separated by `-----`, fields separated by
//! `#` (`id#type#ease#ivl#lastivl#time#factor`, optionally followed by
//! `#difficulty#stability#retrievability`).
//!
//! A card-browser export may be loaded alongside: a `cid` column plus
//! arbitrary columns that are passed through to the card dataset.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BrowserColumns, CardId, CardQueue, CardRecord, CardType, Collection, CollectionInfo, DeckId,
    LoadError, MemoryState, NoteId, ReferentialError, Removal, ReviewKind, ReviewRecord,
    SchemaError, SchemaErrorKind, StudyCalendar,
    tsv::{Column, Record, Sheet, parse_float, parse_int},
};

const ENTRY_SEPARATOR: &str = "-----";
const FIELD_SEPARATOR: char = '#';

/// What to do with review-log rows whose card is not in the card export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferentialPolicy {
    /// Abort loading with a [`ReferentialError`].
    #[default]
    Fail,
    /// Log a warning and drop the row.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Offset used to place review times on study days.
    pub offset: FixedOffset,
    pub referential: ReferentialPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            referential: ReferentialPolicy::default(),
        }
    }
}

/// Reads and parses the card export and, optionally, a separate review log.
pub fn load_collection(
    cards_path: &Path,
    revlog_path: Option<&Path>,
    options: &LoadOptions,
) -> Result<Collection, LoadError> {
    let cards = read_to_string(cards_path)?;
    let revlog = revlog_path.map(read_to_string).transpose()?;
    let collection = parse_collection(&cards, revlog.as_deref(), options)?;
    tracing::info!(
        path = %cards_path.display(),
        cards = collection.cards.len(),
        reviews = collection.reviews.len(),
        "loaded collection"
    );
    Ok(collection)
}

/// Reads a card-browser export.
pub fn load_browser_export(path: &Path) -> Result<BrowserColumns, LoadError> {
    let text = read_to_string(path)?;
    let browser = parse_browser_export(&text)?;
    tracing::info!(
        path = %path.display(),
        cards = browser.rows.len(),
        columns = browser.names.len(),
        "loaded browser export"
    );
    Ok(browser)
}

/// Parses a card-browser export keyed by its `cid` column.
///
/// The exporter writes a title line above the header; a first line without
/// a `cid` column is skipped. Other columns are kept as trimmed text.
pub fn parse_browser_export(text: &str) -> Result<BrowserColumns, SchemaError> {
    let text = match text.split_once('\n') {
        // keep the line break so reported line numbers stay accurate
        Some((first, rest)) if !has_card_id_column(first) => Cow::Owned(format!("\n{rest}")),
        _ => Cow::Borrowed(text),
    };
    let Some(sheet) = Sheet::parse(&text)? else {
        return Ok(BrowserColumns::default());
    };
    let id = sheet.column("cid")?;

    let mut rows = BTreeMap::new();
    for record in &sheet.records {
        let card_id = CardId(record.int(id)?);
        if rows.insert(card_id, record.fields_except(id)).is_some() {
            return Err(SchemaError::new(
                record.line,
                id.name,
                SchemaErrorKind::DuplicateCard(card_id),
            ));
        }
    }
    Ok(BrowserColumns {
        names: sheet.names_except(id),
        rows,
    })
}

fn has_card_id_column(line: &str) -> bool {
    line.split('\t').any(|field| field.trim().trim_matches('"') == "cid")
}

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Parses a card export and, optionally, a separate review log.
///
/// A separate review log replaces the reviews embedded in the card rows.
/// Text without a header line yields an empty collection.
pub fn parse_collection(
    cards: &str,
    revlog: Option<&str>,
    options: &LoadOptions,
) -> Result<Collection, LoadError> {
    let Some(sheet) = Sheet::parse(cards)? else {
        tracing::debug!("card export is empty");
        return Ok(Collection::empty());
    };

    let columns = CardColumns::resolve(&sheet, revlog.is_none())?;
    let info = read_info(&sheet, &columns)?;

    let mut seen = BTreeSet::new();
    let mut card_records = Vec::with_capacity(sheet.records.len());
    let mut reviews = vec![];
    for record in &sheet.records {
        let card = columns.card(record)?;
        if !seen.insert(card.id) {
            return Err(SchemaError::new(
                record.line,
                columns.id.name,
                SchemaErrorKind::DuplicateCard(card.id),
            )
            .into());
        }
        if let Some(column) = columns.revlog {
            reviews.extend(parse_entries(record, column, card.id)?);
        }
        card_records.push(card);
    }

    let mut dropped = 0;
    if let Some(text) = revlog {
        let (parsed, dropped_rows) = parse_revlog(text, &seen, options.referential)?;
        reviews = parsed;
        dropped = dropped_rows;
    }

    let calendar = StudyCalendar::new(options.offset, info.rollover_hour);
    let mut collection = Collection::new(info, card_records, reviews, &calendar)?;
    collection.dropped_reviews = dropped;
    tracing::debug!(
        cards = collection.cards.len(),
        reviews = collection.reviews.len(),
        dropped,
        "parsed collection"
    );
    Ok(collection)
}

struct CardColumns {
    id: Column,
    note_id: Column,
    card_type: Column,
    queue: Column,
    due: Column,
    original_due: Column,
    original_deck_id: Column,
    interval: Column,
    factor: Column,
    stability: Column,
    difficulty: Column,
    retrievability: Column,
    template: Column,
    today_days_elapsed: Column,
    rollover_hour: Column,
    revlog: Option<Column>,
    deck_id: Option<Column>,
    data: Option<Column>,
    removal: Option<Column>,
}

impl CardColumns {
    fn resolve(sheet: &Sheet, embedded_revlog: bool) -> Result<Self, SchemaError> {
        Ok(Self {
            id: sheet.column("c_id")?,
            note_id: sheet.column("c_nid")?,
            card_type: sheet.column("c_type")?,
            queue: sheet.column("c_queue")?,
            due: sheet.column("c_due")?,
            original_due: sheet.column("c_odue")?,
            original_deck_id: sheet.column("c_odid")?,
            interval: sheet.column("c_ivl")?,
            factor: sheet.column("c_factor")?,
            stability: sheet.column("c_stability")?,
            difficulty: sheet.column("c_difficulty")?,
            retrievability: sheet.column("csd_fsrs_retrievability")?,
            template: sheet.column("c_CardType")?,
            today_days_elapsed: sheet.column("col_TodayDaysElapsed")?,
            rollover_hour: sheet.column("col_RolloverHour")?,
            revlog: if embedded_revlog {
                Some(sheet.column("revlog_entries")?)
            } else {
                None
            },
            deck_id: sheet.optional_column("c_did"),
            data: sheet.optional_column("c_Data"),
            removal: sheet.optional_column("c_removal"),
        })
    }

    fn card(&self, record: &Record) -> Result<CardRecord, SchemaError> {
        let id = CardId(record.int(self.id)?);
        let created_at = timestamp(record, self.id, id.0)?;
        let card_type = code(record, self.card_type, "card type", CardType::from_code)?;
        let queue = code(record, self.queue, "queue", CardQueue::from_code)?;
        let factor = record.int(self.factor)?;
        let factor = u32::try_from(factor)
            .map_err(|_| record.invalid(self.factor, record.text(self.factor), "ease factor"))?;

        Ok(CardRecord {
            id,
            note_id: NoteId(record.text(self.note_id).to_owned()),
            deck_id: self
                .deck_id
                .map(|column| record.int(column).map(DeckId))
                .transpose()?
                .unwrap_or_default(),
            original_deck_id: DeckId(record.int(self.original_deck_id)?),
            template: record.text(self.template).to_owned(),
            created_at,
            card_type,
            queue,
            due: record.int(self.due)?,
            original_due: record.int(self.original_due)?,
            interval: record.int(self.interval)?,
            factor,
            memory: MemoryState {
                difficulty: record.float(self.difficulty)?,
                stability: record.float(self.stability)?,
                retrievability: record.float(self.retrievability)?,
            },
            data: self
                .data
                .map(|column| record.text(column).to_owned())
                .unwrap_or_default(),
            removal: self
                .removal
                .map(|column| removal(record, column))
                .transpose()?
                .flatten(),
        })
    }
}

/// Collection settings from the first row; later rows that disagree are
/// reported and ignored.
fn read_info(sheet: &Sheet, columns: &CardColumns) -> Result<CollectionInfo, SchemaError> {
    let Some(first) = sheet.records.first() else {
        return Ok(CollectionInfo::default());
    };
    let info = row_info(first, columns)?;
    for record in &sheet.records[1..] {
        let row = row_info(record, columns)?;
        if row != info {
            tracing::warn!(
                line = record.line,
                today_days_elapsed = row.today_days_elapsed,
                rollover_hour = row.rollover_hour,
                "collection settings differ from the first row; using the first row"
            );
            break;
        }
    }
    Ok(info)
}

fn row_info(record: &Record, columns: &CardColumns) -> Result<CollectionInfo, SchemaError> {
    let column = columns.rollover_hour;
    let rollover_hour = u32::try_from(record.int(column)?)
        .ok()
        .filter(|hour| *hour < 24)
        .ok_or_else(|| record.invalid(column, record.text(column), "hour (0-23)"))?;
    Ok(CollectionInfo {
        today_days_elapsed: record.int(columns.today_days_elapsed)?,
        rollover_hour,
    })
}

fn removal(record: &Record, column: Column) -> Result<Option<Removal>, SchemaError> {
    match record.text(column) {
        "" => Ok(None),
        "reset" => Ok(Some(Removal::Reset)),
        "deleted" => Ok(Some(Removal::Deleted)),
        value => Err(record.invalid(column, value, "`reset`, `deleted` or empty")),
    }
}

fn code<T>(
    record: &Record,
    column: Column,
    what: &'static str,
    from_code: impl FnOnce(i64) -> Option<T>,
) -> Result<T, SchemaError> {
    let value = record.int(column)?;
    from_code(value).ok_or_else(|| {
        SchemaError::new(
            record.line,
            column.name,
            SchemaErrorKind::UnknownCode { what, code: value },
        )
    })
}

fn timestamp(record: &Record, column: Column, millis: i64) -> Result<DateTime<Utc>, SchemaError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| record.invalid(column, record.text(column), "epoch milliseconds"))
}

fn button(ease: Option<i64>) -> Option<Option<u8>> {
    match ease {
        None | Some(0) => Some(None),
        Some(ease @ 1..=4) => u8::try_from(ease).ok().map(Some),
        Some(_) => None,
    }
}

/// Parses the review log embedded in a card row.
fn parse_entries(
    record: &Record,
    column: Column,
    card_id: CardId,
) -> Result<Vec<ReviewRecord>, SchemaError> {
    let text = record.text(column);
    let text = text.strip_suffix(ENTRY_SEPARATOR).unwrap_or(text);
    if text.is_empty() {
        return Ok(vec![]);
    }
    text.split(ENTRY_SEPARATOR)
        .map(|entry| parse_entry(record, column, card_id, entry))
        .collect()
}

fn parse_entry(
    record: &Record,
    column: Column,
    card_id: CardId,
    entry: &str,
) -> Result<ReviewRecord, SchemaError> {
    let fields = entry.split(FIELD_SEPARATOR).collect::<Vec<_>>();
    if fields.len() != 7 && fields.len() != 10 {
        return Err(SchemaError::new(
            record.line,
            column.name,
            SchemaErrorKind::FieldCount {
                expected: "7 or 10".to_owned(),
                found: fields.len(),
            },
        ));
    }

    let invalid = |value: &str, expected| record.invalid(column, value, expected);
    let int = |value: &str| parse_int(value).ok_or_else(|| invalid(value, "integer"));
    let optional_int = |value: &str| {
        if value.trim().is_empty() {
            Ok(None)
        } else {
            int(value).map(Some)
        }
    };
    let float = |value: &str| parse_float(value).map_err(|()| invalid(value, "number"));

    let id = int(fields[0])?;
    let kind_code = int(fields[1])?;
    let kind = ReviewKind::from_code(kind_code).ok_or_else(|| {
        SchemaError::new(
            record.line,
            column.name,
            SchemaErrorKind::UnknownCode {
                what: "review kind",
                code: kind_code,
            },
        )
    })?;
    let button = button(optional_int(fields[2])?)
        .ok_or_else(|| invalid(fields[2], "answer button (0-4)"))?;
    let taken_millis =
        u64::try_from(int(fields[5])?).map_err(|_| invalid(fields[5], "duration"))?;
    let factor = optional_int(fields[6])?
        .map(u32::try_from)
        .transpose()
        .map_err(|_| invalid(fields[6], "ease factor"))?;
    let memory = if fields.len() == 10 {
        MemoryState {
            difficulty: float(fields[7])?,
            stability: float(fields[8])?,
            retrievability: float(fields[9])?,
        }
    } else {
        MemoryState::default()
    };

    Ok(ReviewRecord {
        id,
        card_id,
        deck_id: DeckId::default(),
        reviewed_at: DateTime::from_timestamp_millis(id)
            .ok_or_else(|| invalid(fields[0], "epoch milliseconds"))?,
        kind,
        button,
        interval: int(fields[3])?,
        last_interval: int(fields[4])?,
        taken_millis,
        factor,
        memory,
        elapsed_days: None,
        card_removal: None,
    })
}

/// Parses a separate review-log export, applying `policy` to rows whose card
/// is not in `cards`. Returns the reviews and the number of dropped rows.
fn parse_revlog(
    text: &str,
    cards: &BTreeSet<CardId>,
    policy: ReferentialPolicy,
) -> Result<(Vec<ReviewRecord>, usize), LoadError> {
    let Some(sheet) = Sheet::parse(text)? else {
        return Ok((vec![], 0));
    };
    let id = sheet.column("id")?;
    let card_id = sheet.column("cid")?;
    let kind = sheet.column("type")?;
    let ease = sheet.column("ease")?;
    let interval = sheet.column("ivl")?;
    let last_interval = sheet.column("lastIvl")?;
    let factor = sheet.column("factor")?;
    let time = sheet.column("time")?;

    let mut reviews = Vec::with_capacity(sheet.records.len());
    let mut dropped = 0;
    for record in &sheet.records {
        let review_id = record.int(id)?;
        let owner = CardId(record.int(card_id)?);
        if !cards.contains(&owner) {
            let err = ReferentialError {
                review_id,
                card_id: owner,
            };
            match policy {
                ReferentialPolicy::Fail => return Err(err.into()),
                ReferentialPolicy::Drop => {
                    tracing::warn!(line = record.line, "{err}; dropping row");
                    dropped += 1;
                    continue;
                }
            }
        }

        let ease_value = record.text(ease);
        let ease_code = if ease_value.is_empty() {
            None
        } else {
            Some(record.int(ease)?)
        };
        let button = button(ease_code)
            .ok_or_else(|| record.invalid(ease, ease_value, "answer button (0-4)"))?;
        let factor_value = record.int(factor)?;
        reviews.push(ReviewRecord {
            id: review_id,
            card_id: owner,
            deck_id: DeckId::default(),
            reviewed_at: timestamp(record, id, review_id)?,
            kind: code(record, kind, "review kind", ReviewKind::from_code)?,
            button,
            interval: record.int(interval)?,
            last_interval: record.int(last_interval)?,
            taken_millis: u64::try_from(record.int(time)?)
                .map_err(|_| record.invalid(time, record.text(time), "duration"))?,
            factor: Some(
                u32::try_from(factor_value)
                    .map_err(|_| record.invalid(factor, record.text(factor), "ease factor"))?,
            ),
            memory: MemoryState::default(),
            elapsed_days: None,
            card_removal: None,
        });
    }

    if dropped > 0 {
        tracing::warn!(dropped, "dropped review-log rows referencing unknown cards");
    }
    Ok((reviews, dropped))
}
