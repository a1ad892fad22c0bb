//! Minimal reader for the exporter's tab-separated files
//!
//! `"` starts a quoted field when it is the first character of a field.
//! Inside a quoted field `""` is a literal quote, and tabs and newlines are
//! part of the value. Blank lines are skipped.

use std::mem;

use crate::{SchemaError, SchemaErrorKind};

/// Column name used in errors that concern a whole row.
pub(crate) const ROW: &str = "<row>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    /// Line the record starts on (1-based).
    pub(crate) line: usize,
    pub(crate) fields: Vec<String>,
}

/// A header plus records whose field counts match it.
#[derive(Debug, Clone)]
pub(crate) struct Sheet {
    header: Vec<String>,
    pub(crate) records: Vec<Record>,
}

/// A header column resolved to its position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    pub(crate) name: &'static str,
    index: usize,
}

impl Sheet {
    /// Parses `text`; returns `None` when there is no header line.
    pub(crate) fn parse(text: &str) -> Result<Option<Self>, SchemaError> {
        let mut records = read_records(text)?.into_iter();
        let Some(header) = records.next() else {
            return Ok(None);
        };
        let header = header.fields;
        let records = records
            .map(|record| {
                if record.fields.len() == header.len() {
                    Ok(record)
                } else {
                    Err(SchemaError::new(
                        record.line,
                        ROW,
                        SchemaErrorKind::FieldCount {
                            expected: header.len().to_string(),
                            found: record.fields.len(),
                        },
                    ))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Self { header, records }))
    }

    pub(crate) fn column(&self, name: &'static str) -> Result<Column, SchemaError> {
        self.optional_column(name)
            .ok_or_else(|| SchemaError::new(1, name, SchemaErrorKind::MissingColumn))
    }

    pub(crate) fn optional_column(&self, name: &'static str) -> Option<Column> {
        self.header
            .iter()
            .position(|column| column.trim() == name)
            .map(|index| Column { name, index })
    }

    /// Header names other than `column`'s, trimmed.
    pub(crate) fn names_except(&self, column: Column) -> Vec<String> {
        except(&self.header, column)
    }
}

impl Record {
    pub(crate) fn text(&self, column: Column) -> &str {
        self.fields[column.index].trim()
    }

    /// Trimmed fields other than `column`'s, in header order.
    pub(crate) fn fields_except(&self, column: Column) -> Vec<String> {
        except(&self.fields, column)
    }

    /// Parses an integer, also accepting a float with no fractional part
    /// (`"2500.0"`).
    pub(crate) fn int(&self, column: Column) -> Result<i64, SchemaError> {
        let value = self.text(column);
        parse_int(value).ok_or_else(|| self.invalid(column, value, "integer"))
    }

    /// Parses a float; empty and `nan` values are absent.
    pub(crate) fn float(&self, column: Column) -> Result<Option<f64>, SchemaError> {
        let value = self.text(column);
        parse_float(value).map_err(|()| self.invalid(column, value, "number"))
    }

    pub(crate) fn invalid(
        &self,
        column: Column,
        value: &str,
        expected: &'static str,
    ) -> SchemaError {
        SchemaError::new(
            self.line,
            column.name,
            SchemaErrorKind::InvalidValue {
                value: value.to_owned(),
                expected,
            },
        )
    }
}

fn except(fields: &[String], column: Column) -> Vec<String> {
    fields
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != column.index)
        .map(|(_, field)| field.trim().to_owned())
        .collect()
}

#[expect(clippy::cast_possible_truncation)]
pub(crate) fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse().ok().or_else(|| {
        let float = value.parse::<f64>().ok()?;
        (float.is_finite() && float.fract() == 0.0 && float.abs() < 9.0e15).then_some(float as i64)
    })
}

pub(crate) fn parse_float(value: &str) -> Result<Option<f64>, ()> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| ())
}

fn read_records(text: &str) -> Result<Vec<Record>, SchemaError> {
    let mut records = vec![];
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = vec![];
        let mut field = String::new();
        let mut quoted = false;
        let mut at_field_start = true;

        loop {
            let Some(c) = chars.next() else {
                if quoted {
                    return Err(SchemaError::new(
                        start_line,
                        ROW,
                        SchemaErrorKind::UnterminatedQuote,
                    ));
                }
                break;
            };

            if quoted {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => quoted = false,
                    '\n' => {
                        line += 1;
                        field.push(c);
                    }
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if at_field_start => {
                    quoted = true;
                    at_field_start = false;
                }
                '\t' => {
                    fields.push(mem::take(&mut field));
                    at_field_start = true;
                }
                '\n' => {
                    line += 1;
                    break;
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                _ => {
                    field.push(c);
                    at_field_start = false;
                }
            }
        }

        fields.push(field);
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        records.push(Record {
            line: start_line,
            fields,
        });
    }

    Ok(records)
}
