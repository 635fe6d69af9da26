//! Positional record parsing and category classification
//!
//! Input rows come from a fixed-schema, `;`-delimited dataset. Fields are
//! addressed by column position, not by header name; the positions live in
//! [`ColumnSchema`] so the layout is declared once instead of being scattered
//! through the parsing code.

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exact labels used by the dataset for the closed category set.
pub const LIGHT_VEHICLE_LABEL: &str = "Vehiculo Liviano";
pub const CARGO_LABEL: &str = "Carga";
pub const PUBLIC_TRANSPORT_LABEL: &str = "Transporte Publico";

/// Closed set of vehicle categories that participate in aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    LightVehicle,
    Cargo,
    PublicTransport,
}

impl Category {
    /// All categories, in output-column order (liviano, carga, transporte)
    pub const ALL: [Category; 3] = [
        Category::LightVehicle,
        Category::Cargo,
        Category::PublicTransport,
    ];

    /// Classify a raw group label by exact match; unrecognized labels get None
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            LIGHT_VEHICLE_LABEL => Some(Category::LightVehicle),
            CARGO_LABEL => Some(Category::Cargo),
            PUBLIC_TRANSPORT_LABEL => Some(Category::PublicTransport),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::LightVehicle => LIGHT_VEHICLE_LABEL,
            Category::Cargo => CARGO_LABEL,
            Category::PublicTransport => PUBLIC_TRANSPORT_LABEL,
        }
    }

    /// Position in [`Category::ALL`], used to index per-category bucket arrays
    pub fn index(&self) -> usize {
        match self {
            Category::LightVehicle => 0,
            Category::Cargo => 1,
            Category::PublicTransport => 2,
        }
    }
}

/// Mapping of logical field name to column position in the input schema
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub group: usize,
    pub appraisal_value: usize,
    pub amount_paid: usize,
    pub door_count: usize,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        // Column positions of the vehicle appraisal dataset
        Self {
            group: 1,
            appraisal_value: 6,
            amount_paid: 11,
            door_count: 23,
        }
    }
}

impl ColumnSchema {
    /// Highest column index the parser will access
    pub fn max_index(&self) -> usize {
        self.group
            .max(self.appraisal_value)
            .max(self.amount_paid)
            .max(self.door_count)
    }

    /// Sanity-check the schema once at startup
    pub fn validate(&self) -> Result<(), String> {
        let indices = [
            self.group,
            self.appraisal_value,
            self.amount_paid,
            self.door_count,
        ];
        for (i, a) in indices.iter().enumerate() {
            for b in &indices[i + 1..] {
                if a == b {
                    return Err(format!("duplicate column index {a}"));
                }
            }
        }
        let numeric_max = self
            .appraisal_value
            .max(self.amount_paid)
            .max(self.door_count);
        if self.group >= numeric_max {
            return Err(format!(
                "category column {} must precede the numeric columns",
                self.group
            ));
        }
        Ok(())
    }
}

/// One parsed input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Raw group label; retained even when it is not in the closed set
    pub group: String,
    pub appraisal_value: f64,
    pub amount_paid: f64,
    pub door_count: u32,
}

impl VehicleRecord {
    /// Category this record aggregates under, if its label is recognized
    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.group)
    }
}

/// Row-level parse failure; the caller skips the row and keeps going
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("row has {available} column(s), `{column}` expects index {index}")]
    MissingColumn {
        column: &'static str,
        index: usize,
        available: usize,
    },

    #[error("column `{column}` (index {index}) has invalid value `{value}`")]
    InvalidNumber {
        column: &'static str,
        index: usize,
        value: String,
    },
}

/// Parse one raw row into a typed record.
///
/// Either all three numeric fields parse (non-negative) or the row is
/// rejected whole; a record is never partially populated.
pub fn parse(record: &StringRecord, schema: &ColumnSchema) -> Result<VehicleRecord, ParseError> {
    let group = field(record, "group", schema.group)?.to_string();
    let appraisal_value = parse_f64(record, "appraisal_value", schema.appraisal_value)?;
    let amount_paid = parse_f64(record, "amount_paid", schema.amount_paid)?;
    let door_count = parse_u32(record, "door_count", schema.door_count)?;

    Ok(VehicleRecord {
        group,
        appraisal_value,
        amount_paid,
        door_count,
    })
}

fn field<'r>(
    record: &'r StringRecord,
    column: &'static str,
    index: usize,
) -> Result<&'r str, ParseError> {
    record.get(index).ok_or(ParseError::MissingColumn {
        column,
        index,
        available: record.len(),
    })
}

fn parse_f64(
    record: &StringRecord,
    column: &'static str,
    index: usize,
) -> Result<f64, ParseError> {
    let raw = field(record, column, index)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value >= 0.0 => Ok(value),
        _ => Err(ParseError::InvalidNumber {
            column,
            index,
            value: raw.to_string(),
        }),
    }
}

fn parse_u32(
    record: &StringRecord,
    column: &'static str,
    index: usize,
) -> Result<u32, ParseError> {
    let raw = field(record, column, index)?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber {
            column,
            index,
            value: raw.to_string(),
        })
}

/// Build a 24-column row with the four schema fields filled in (test helper)
#[cfg(test)]
pub(crate) fn make_row(group: &str, appraisal: &str, paid: &str, doors: &str) -> StringRecord {
    let schema = ColumnSchema::default();
    let mut fields = vec![String::new(); schema.max_index() + 1];
    fields[schema.group] = group.to_string();
    fields[schema.appraisal_value] = appraisal.to_string();
    fields[schema.amount_paid] = paid.to_string();
    fields[schema.door_count] = doors.to_string();
    StringRecord::from(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_row() {
        let row = make_row("Vehiculo Liviano", "1500.5", "1200.25", "4");
        let record = parse(&row, &ColumnSchema::default()).unwrap();
        assert_eq!(record.group, "Vehiculo Liviano");
        assert_eq!(record.appraisal_value, 1500.5);
        assert_eq!(record.amount_paid, 1200.25);
        assert_eq!(record.door_count, 4);
        assert_eq!(record.category(), Some(Category::LightVehicle));
    }

    #[test]
    fn test_parse_unrecognized_label_retained() {
        let row = make_row("Maquinaria", "100", "100", "2");
        let record = parse(&row, &ColumnSchema::default()).unwrap();
        assert_eq!(record.group, "Maquinaria");
        assert_eq!(record.category(), None);
    }

    #[test]
    fn test_parse_short_row_missing_column() {
        let row = StringRecord::from(vec!["x", "Carga", "1.0"]);
        let err = parse(&row, &ColumnSchema::default()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingColumn {
                column: "appraisal_value",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_bad_number_rejected() {
        let row = make_row("Carga", "abc", "1.0", "2");
        let err = parse(&row, &ColumnSchema::default()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_parse_negative_value_rejected() {
        let row = make_row("Carga", "-5.0", "1.0", "2");
        assert!(parse(&row, &ColumnSchema::default()).is_err());
    }

    #[test]
    fn test_parse_fractional_door_count_rejected() {
        let row = make_row("Carga", "1.0", "1.0", "2.5");
        assert!(parse(&row, &ColumnSchema::default()).is_err());
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("carga"), None); // exact match only
    }

    #[test]
    fn test_schema_validation_rejects_duplicates() {
        let schema = ColumnSchema {
            group: 1,
            appraisal_value: 1,
            amount_paid: 11,
            door_count: 23,
        };
        assert!(schema.validate().is_err());
        assert!(ColumnSchema::default().validate().is_ok());
    }

    #[test]
    fn test_schema_validation_rejects_category_after_numerics() {
        let schema = ColumnSchema {
            group: 30,
            appraisal_value: 6,
            amount_paid: 11,
            door_count: 23,
        };
        let err = schema.validate().unwrap_err();
        assert!(err.contains("must precede"));
    }
}
