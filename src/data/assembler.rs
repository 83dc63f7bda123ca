use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::data::input::RawInput;
use crate::data::profile::AssemblyProfile;
use crate::data::row::FeatureRow;
use crate::data::schema::FeatureSchema;

/// Year and month written into the calendar columns, if the model has them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub year: i32,
    pub month: u32,
}

impl Calendar {
    pub fn today() -> Self {
        use chrono::Datelike;
        let now = chrono::Local::now();
        Calendar {
            year: now.year(),
            month: now.month(),
        }
    }
}

/// An input signal that found no column in the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaGap {
    pub field: String,
    pub tried: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub row: FeatureRow,
    pub gaps: Vec<SchemaGap>,
}

/// Maps raw inputs onto the model's column space.
///
/// Never fails: a field without a matching column is recorded as a gap
/// and the row keeps zero for it.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    schema: Arc<FeatureSchema>,
    profile: AssemblyProfile,
}

impl FeatureAssembler {
    pub fn new(schema: Arc<FeatureSchema>, profile: AssemblyProfile) -> Self {
        FeatureAssembler { schema, profile }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn profile(&self) -> &AssemblyProfile {
        &self.profile
    }

    /// Index of the month indicator column, when the model was trained with one.
    pub fn month_index(&self) -> Option<usize> {
        self.profile
            .month_column
            .as_deref()
            .and_then(|name| self.schema.position(name))
    }

    pub fn assemble(&self, input: &RawInput, calendar: Calendar) -> Assembly {
        let schema = &*self.schema;
        let mut row = FeatureRow::zeros(schema);
        let mut gaps = Vec::new();

        for rule in &self.profile.numeric {
            let Some(&value) = input.numeric.get(&rule.field) else {
                continue;
            };
            match schema.position(&rule.column) {
                Some(index) => row.set(index, value),
                None => gaps.push(SchemaGap {
                    field: rule.field.clone(),
                    tried: vec![rule.column.clone()],
                }),
            }
        }

        for rule in &self.profile.constants {
            if let Some(index) = schema.position(&rule.column) {
                row.set(index, rule.value);
            }
        }

        if let Some(index) = self.profile.year_column.as_deref().and_then(|c| schema.position(c)) {
            row.set(index, calendar.year as f64);
        }
        if let Some(index) = self.month_index() {
            row.set(index, calendar.month as f64);
        }

        for rule in &self.profile.categories {
            let Some(value) = input.categorical.get(&rule.field) else {
                continue;
            };
            let column = rule.column_for(value);
            let found = if rule.case_insensitive {
                schema.position_ignore_case(&column)
            } else {
                schema.position(&column)
            };
            match found {
                Some(index) => row.set(index, 1.0),
                None => gaps.push(SchemaGap {
                    field: rule.field.clone(),
                    tried: vec![column],
                }),
            }
        }

        for rule in &self.profile.flags {
            if !input.flags.get(&rule.field).copied().unwrap_or(false) {
                continue;
            }
            match rule.candidates().find_map(|c| schema.position(&c)) {
                Some(index) => row.set(index, 1.0),
                None => gaps.push(SchemaGap {
                    field: rule.field.clone(),
                    tried: rule.candidates().collect(),
                }),
            }
        }

        for gap in &gaps {
            debug!(field = %gap.field, tried = ?gap.tried, "no schema column for input field");
        }
        for field in input
            .numeric
            .keys()
            .chain(input.categorical.keys())
            .chain(input.flags.keys())
            .filter(|f| !self.profile.knows_field(f))
        {
            debug!(field = %field, profile = %self.profile.name, "input field ignored by profile");
        }

        Assembly { row, gaps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALENDAR: Calendar = Calendar {
        year: 2024,
        month: 7,
    };

    fn assembler(columns: &[&str], profile: AssemblyProfile) -> FeatureAssembler {
        let schema = FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap();
        FeatureAssembler::new(Arc::new(schema), profile)
    }

    #[test]
    fn test_real_estate_scenario() {
        let assembler = assembler(
            &["area", "quartos", "bairro_asa norte"],
            AssemblyProfile::real_estate(),
        );
        let input = RawInput::new()
            .numeric("area", 50.0)
            .numeric("quartos", 2.0)
            .category("bairro", "ASA NORTE");

        let assembly = assembler.assemble(&input, CALENDAR);
        let row = assembly.row.to_map(assembler.schema());

        assert_eq!(row.len(), 3);
        assert_eq!(row["area"], 50.0);
        assert_eq!(row["quartos"], 2.0);
        assert_eq!(row["bairro_asa norte"], 1.0);
        assert!(assembly.gaps.is_empty());
    }

    #[test]
    fn test_case_insensitive_match_uses_schema_spelling() {
        let assembler = assembler(&["area", "Bairro_Asa Sul", "tipo_CASA"], AssemblyProfile::real_estate());
        let input = RawInput::new().category("bairro", "asa sul").category("tipo", "Casa");

        let row = assembler.assemble(&input, CALENDAR).row;
        assert_eq!(row.values().to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_one_hot_sets_only_the_selected_category() {
        let assembler = assembler(
            &[
                "property_type_Apartment",
                "property_type_House",
                "property_type_Loft",
                "room_type_Private room",
            ],
            AssemblyProfile::short_stay(),
        );
        let input = RawInput::new().category("property_type", "House");

        let row = assembler.assemble(&input, CALENDAR).row;
        let schema = assembler.schema();
        assert_eq!(row.get(schema, "property_type_House"), Some(1.0));
        assert_eq!(row.get(schema, "property_type_Apartment"), Some(0.0));
        assert_eq!(row.get(schema, "property_type_Loft"), Some(0.0));
        assert_eq!(row.get(schema, "room_type_Private room"), Some(0.0));
    }

    #[test]
    fn test_exact_profile_does_not_fold_case() {
        let assembler = assembler(&["property_type_House"], AssemblyProfile::short_stay());
        let input = RawInput::new().category("property_type", "house");

        let assembly = assembler.assemble(&input, CALENDAR);
        assert_eq!(assembly.row.value(0), 0.0);
        assert_eq!(assembly.gaps[0].tried, vec!["property_type_house"]);
    }

    #[test]
    fn test_absent_columns_never_fail() {
        let assembler = assembler(&["bedrooms"], AssemblyProfile::short_stay());
        let input = RawInput::new()
            .numeric("latitude", -22.97)
            .numeric("bedrooms", 2.0)
            .category("room_type", "Shared room")
            .flag("instant_bookable", true);

        let assembly = assembler.assemble(&input, CALENDAR);
        let schema = assembler.schema();
        assert_eq!(assembly.row.len(), 1);
        assert_eq!(assembly.row.get(schema, "bedrooms"), Some(2.0));
        assert_eq!(assembly.row.get(schema, "latitude"), None);

        let fields: Vec<&str> = assembly.gaps.iter().map(|g| g.field.as_str()).collect();
        assert_eq!(fields, vec!["latitude", "room_type", "instant_bookable"]);
    }

    #[test]
    fn test_flag_takes_first_matching_suffix() {
        let assembler = assembler(
            &["host_is_superhost_t", "host_is_superhost_True", "instant_bookable_True"],
            AssemblyProfile::short_stay(),
        );
        let input = RawInput::new()
            .flag("host_is_superhost", true)
            .flag("instant_bookable", true);

        let row = assembler.assemble(&input, CALENDAR).row;
        assert_eq!(row.values().to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_false_flag_leaves_row_untouched() {
        let assembler = assembler(&["host_is_superhost_t"], AssemblyProfile::short_stay());
        let input = RawInput::new().flag("host_is_superhost", false);

        let assembly = assembler.assemble(&input, CALENDAR);
        assert_eq!(assembly.row.value(0), 0.0);
        assert!(assembly.gaps.is_empty());
    }

    #[test]
    fn test_constants_and_calendar_columns() {
        let assembler = assembler(
            &["host_listings_count", "year", "month", "beds"],
            AssemblyProfile::short_stay(),
        );

        let assembly = assembler.assemble(&RawInput::new(), CALENDAR);
        assert_eq!(assembly.row.values().to_vec(), vec![3.0, 2024.0, 7.0, 0.0]);
        assert_eq!(assembler.month_index(), Some(2));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let assembler = assembler(&["area", "quartos"], AssemblyProfile::real_estate());
        let input = RawInput::new().numeric("garage", 1.0).flag("pool", true);

        let assembly = assembler.assemble(&input, CALENDAR);
        assert_eq!(assembly.row.values().to_vec(), vec![0.0, 0.0]);
        assert!(assembly.gaps.is_empty());
        assert_eq!(assembler.month_index(), None);
    }
}
