use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// How an input field with a numeric value maps onto a schema column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericRule {
    pub field: String,
    pub column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstantRule {
    pub column: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Normalize {
    Exact,
    Lowercase,
}

/// One-hot group: the column for value `v` is `"{prefix}_{v}"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRule {
    pub field: String,
    pub prefix: String,
    pub normalize: Normalize,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl CategoryRule {
    pub fn column_for(&self, value: &str) -> String {
        match self.normalize {
            Normalize::Exact => format!("{}_{}", self.prefix, value),
            Normalize::Lowercase => format!("{}_{}", self.prefix, value.to_lowercase()),
        }
    }
}

/// Boolean flag encoded as `"{field}_{suffix}"`, suffixes tried in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlagRule {
    pub field: String,
    pub true_suffixes: Vec<String>,
}

impl FlagRule {
    pub fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        self.true_suffixes
            .iter()
            .map(move |suffix| format!("{}_{}", self.field, suffix))
    }
}

/// Naming convention of one trained model deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssemblyProfile {
    pub name: String,
    #[serde(default)]
    pub numeric: Vec<NumericRule>,
    #[serde(default)]
    pub constants: Vec<ConstantRule>,
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
    #[serde(default)]
    pub flags: Vec<FlagRule>,
    #[serde(default)]
    pub year_column: Option<String>,
    #[serde(default)]
    pub month_column: Option<String>,
    /// Nights per month used for the monthly revenue figure.
    #[serde(default)]
    pub occupancy_nights: Option<f64>,
}

impl AssemblyProfile {
    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        match name {
            "short-stay" => Ok(Self::short_stay()),
            "real-estate" => Ok(Self::real_estate()),
            other => Err(ProfileError::Unknown(other.to_string())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let read_error = |reason: String| ProfileError::Read {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| read_error(e.to_string()))
    }

    /// Nightly lodging listings: exact-cased one-hots and `t`/`True` flags.
    pub fn short_stay() -> Self {
        let numeric = [
            "latitude",
            "longitude",
            "accommodates",
            "bathrooms",
            "bedrooms",
            "beds",
            "extra_people",
            "minimum_nights",
            "num_amenities",
        ]
        .iter()
        .map(|name| NumericRule {
            field: name.to_string(),
            column: name.to_string(),
        })
        .collect();

        let flag = |field: &str| FlagRule {
            field: field.to_string(),
            true_suffixes: vec!["t".to_string(), "True".to_string()],
        };

        AssemblyProfile {
            name: "short-stay".to_string(),
            numeric,
            constants: vec![ConstantRule {
                column: "host_listings_count".to_string(),
                value: 3.0,
            }],
            categories: vec![
                CategoryRule {
                    field: "property_type".to_string(),
                    prefix: "property_type".to_string(),
                    normalize: Normalize::Exact,
                    case_insensitive: false,
                },
                CategoryRule {
                    field: "room_type".to_string(),
                    prefix: "room_type".to_string(),
                    normalize: Normalize::Exact,
                    case_insensitive: false,
                },
            ],
            flags: vec![flag("host_is_superhost"), flag("instant_bookable")],
            year_column: Some("year".to_string()),
            month_column: Some("month".to_string()),
            occupancy_nights: Some(15.0),
        }
    }

    /// Residential sale prices: lowercased, case-insensitive one-hots.
    pub fn real_estate() -> Self {
        let lowercase = |field: &str| CategoryRule {
            field: field.to_string(),
            prefix: field.to_string(),
            normalize: Normalize::Lowercase,
            case_insensitive: true,
        };

        AssemblyProfile {
            name: "real-estate".to_string(),
            numeric: vec![
                NumericRule {
                    field: "area".to_string(),
                    column: "area".to_string(),
                },
                NumericRule {
                    field: "quartos".to_string(),
                    column: "quartos".to_string(),
                },
            ],
            constants: Vec::new(),
            categories: vec![lowercase("bairro"), lowercase("tipo")],
            flags: Vec::new(),
            year_column: None,
            month_column: None,
            occupancy_nights: None,
        }
    }

    pub fn knows_field(&self, field: &str) -> bool {
        self.numeric.iter().any(|r| r.field == field)
            || self.categories.iter().any(|r| r.field == field)
            || self.flags.iter().any(|r| r.field == field)
    }
}
