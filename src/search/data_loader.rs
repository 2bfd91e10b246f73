use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Recipe;

// Expected column headers for CSV catalogs
const ID_COL: &str = "id";
const NAME_COL: &str = "name";
const KCAL_COL: &str = "calories";
const PROTEIN_COL: &str = "protein";
const FAT_COL: &str = "fat";
const CARB_COL: &str = "carbs";
const WEIGHT_COL: &str = "weight";

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("recipe catalog not found at {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to read recipe catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON recipe catalog {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed CSV recipe catalog {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported recipe catalog format {path:?} (expected .json or .csv)")]
    UnsupportedFormat { path: PathBuf },
    #[error("invalid recipe record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("duplicate recipe id '{0}'")]
    DuplicateId(String),
}

/// Reads the whole catalog. Nothing partial is ever returned: any bad record
/// fails the load.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, CatalogLoadError> {
    if !path.exists() {
        return Err(CatalogLoadError::NotFound { path: path.to_path_buf() });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let recipes = match extension.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => return Err(CatalogLoadError::UnsupportedFormat { path: path.to_path_buf() }),
    };

    validate(&recipes)?;
    Ok(recipes)
}

fn load_json(path: &Path) -> Result<Vec<Recipe>, CatalogLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_catalog(&contents).map_err(|source| CatalogLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_json_catalog(contents: &str) -> Result<Vec<Recipe>, serde_json::Error> {
    serde_json::from_str(contents.trim_start_matches('\u{feff}'))
}

fn parse_optional_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn load_csv(path: &Path) -> Result<Vec<Recipe>, CatalogLoadError> {
    let csv_err = |source: csv::Error| CatalogLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let column = |name: &str| -> Result<usize, CatalogLoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CatalogLoadError::InvalidRecord {
                index: 0,
                reason: format!("column '{}' not found", name),
            })
    };
    let id_idx = column(ID_COL)?;
    let name_idx = column(NAME_COL)?;
    let kcal_idx = column(KCAL_COL)?;
    let protein_idx = column(PROTEIN_COL)?;
    let fat_idx = column(FAT_COL)?;
    let carb_idx = column(CARB_COL)?;
    let weight_idx = headers.iter().position(|h| h == WEIGHT_COL);

    let mut recipes = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let text = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let number = |idx: usize, col: &str| -> Result<f64, CatalogLoadError> {
            record
                .get(idx)
                .and_then(parse_optional_f64)
                .ok_or_else(|| CatalogLoadError::InvalidRecord {
                    index: row_index,
                    reason: format!("'{}' is missing or not a number", col),
                })
        };

        recipes.push(Recipe {
            id: text(id_idx),
            name: text(name_idx),
            calories: number(kcal_idx, KCAL_COL)?,
            protein: number(protein_idx, PROTEIN_COL)?,
            fat: number(fat_idx, FAT_COL)?,
            carbs: number(carb_idx, CARB_COL)?,
            weight: weight_idx
                .and_then(|idx| record.get(idx))
                .and_then(parse_optional_f64),
        });
    }
    Ok(recipes)
}

fn validate(recipes: &[Recipe]) -> Result<(), CatalogLoadError> {
    let mut seen = HashSet::with_capacity(recipes.len());
    for (index, recipe) in recipes.iter().enumerate() {
        if recipe.id.trim().is_empty() {
            return Err(CatalogLoadError::InvalidRecord {
                index,
                reason: "empty id".to_string(),
            });
        }
        let values = [
            ("calories", recipe.calories),
            ("protein", recipe.protein),
            ("fat", recipe.fat),
            ("carbs", recipe.carbs),
        ];
        if let Some((field, value)) = values.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(CatalogLoadError::InvalidRecord {
                index,
                reason: format!("'{}' must be a non-negative number, got {}", field, value),
            });
        }
        if let Some(weight) = recipe.weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(CatalogLoadError::InvalidRecord {
                    index,
                    reason: format!("'weight' must be positive, got {}", weight),
                });
            }
        }
        if !seen.insert(recipe.id.as_str()) {
            return Err(CatalogLoadError::DuplicateId(recipe.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_catalog(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", body).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_json_catalog() {
        let file = write_catalog(
            ".json",
            r#"[
                {"id": "r1", "name": "Oatmeal", "calories": 300, "protein": 10, "fat": 6, "carbs": 52},
                {"id": 2, "name": "Apple", "calories": 95, "protein": 0.5, "fat": 0.3, "carbs": 25, "weight": 0.5}
            ]"#,
        );
        let recipes = load_recipes(file.path()).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].id, "2");
        assert_eq!(recipes[1].weight, Some(0.5));
    }

    #[test]
    fn loads_csv_catalog_with_optional_weight() {
        let file = write_catalog(
            ".csv",
            "id,name,calories,protein,fat,carbs,weight\n\
             r1,Oatmeal,300,10,6,52,\n\
             r2,Apple,95,0.5,0.3,25,0.5\n",
        );
        let recipes = load_recipes(file.path()).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].weight, None);
        assert_eq!(recipes[1].weight, Some(0.5));
        assert_eq!(recipes[1].calories, 95.0);
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let file = write_catalog(".csv", "id,name,protein,fat,carbs\nr1,Oatmeal,10,6,52\n");
        let err = load_recipes(file.path()).unwrap_err();
        assert!(err.to_string().contains("column 'calories' not found"), "{}", err);
    }

    #[test]
    fn csv_bad_number_fails_whole_load() {
        let file = write_catalog(
            ".csv",
            "id,name,calories,protein,fat,carbs\nr1,Oatmeal,300,10,6,52\nr2,Soup,lots,1,1,1\n",
        );
        assert!(matches!(
            load_recipes(file.path()),
            Err(CatalogLoadError::InvalidRecord { index: 1, .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_catalog(".json", r#"[{"id": "r1", "name": "Oatmeal"}]"#);
        assert!(matches!(load_recipes(file.path()), Err(CatalogLoadError::Json { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let file = write_catalog(
            ".json",
            r#"[
                {"id": "r1", "name": "A", "calories": 1, "protein": 1, "fat": 1, "carbs": 1},
                {"id": "r1", "name": "B", "calories": 1, "protein": 1, "fat": 1, "carbs": 1}
            ]"#,
        );
        assert!(matches!(load_recipes(file.path()), Err(CatalogLoadError::DuplicateId(id)) if id == "r1"));
    }

    #[test]
    fn negative_calories_are_rejected() {
        let file = write_catalog(
            ".json",
            r#"[{"id": "r1", "name": "A", "calories": -5, "protein": 1, "fat": 1, "carbs": 1}]"#,
        );
        assert!(matches!(load_recipes(file.path()), Err(CatalogLoadError::InvalidRecord { index: 0, .. })));
    }

    #[test]
    fn missing_file_and_unknown_extension() {
        assert!(matches!(
            load_recipes(Path::new("this_file_does_not_exist.json")),
            Err(CatalogLoadError::NotFound { .. })
        ));
        let file = write_catalog(".yaml", "- id: r1");
        assert!(matches!(
            load_recipes(file.path()),
            Err(CatalogLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn empty_json_array_is_an_empty_catalog() {
        let file = write_catalog(".json", "[]");
        assert!(load_recipes(file.path()).unwrap().is_empty());
    }
}
