//! Car record and request payload

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `car` table.
///
/// `make`, `model` and `year` are nullable on read: updates replace all
/// three columns, so a field omitted from an update body is stored as NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Car {
    pub id: i64,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub deleted_flag: i8,
}

/// Body of `POST /car` and `PUT /car/{id}`.
///
/// Every field is optional at this layer; the database decides whether a
/// missing value is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarPayload {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "coerce_year")]
    pub year: Option<i32>,
}

impl CarPayload {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            make: Some(make.into()),
            model: Some(model.into()),
            year: Some(year),
        }
    }
}

/// Accept `2020`, `2020.0` and `"2020"` for the year. Fractional numbers are
/// rejected rather than rounded.
fn coerce_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i32),
        Float(f64),
        Text(String),
    }

    match Option::<RawYear>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawYear::Number(year)) => Ok(Some(year)),
        Some(RawYear::Float(year)) => {
            if year.fract() == 0.0 && year >= f64::from(i32::MIN) && year <= f64::from(i32::MAX) {
                Ok(Some(year as i32))
            } else {
                Err(de::Error::custom(format!("year must be an integer, got {}", year)))
            }
        }
        Some(RawYear::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("year must be an integer, got '{}'", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_numeric_year() {
        let car: CarPayload =
            serde_json::from_str(r#"{"make":"Toyota","model":"Corolla","year":2020}"#).unwrap();
        assert_eq!(car, CarPayload::new("Toyota", "Corolla", 2020));
    }

    #[test]
    fn payload_coerces_string_year() {
        let car: CarPayload =
            serde_json::from_str(r#"{"make":"Honda","model":"Civic","year":" 1999 "}"#).unwrap();
        assert_eq!(car.year, Some(1999));
    }

    #[test]
    fn payload_accepts_integral_float_year() {
        let car: CarPayload = serde_json::from_str(r#"{"year":2020.0}"#).unwrap();
        assert_eq!(car.year, Some(2020));

        for body in [r#"{"year":2020.5}"#, r#"{"year":1e12}"#] {
            assert!(serde_json::from_str::<CarPayload>(body).is_err(), "{}", body);
        }
    }

    #[test]
    fn payload_missing_fields_are_none() {
        let car: CarPayload = serde_json::from_str(r#"{"model":"Camry"}"#).unwrap();
        assert_eq!(car.make, None);
        assert_eq!(car.model.as_deref(), Some("Camry"));
        assert_eq!(car.year, None);

        let car: CarPayload = serde_json::from_str(r#"{"year":null}"#).unwrap();
        assert_eq!(car.year, None);
    }

    #[test]
    fn payload_rejects_non_numeric_year() {
        let result = serde_json::from_str::<CarPayload>(r#"{"year":"next year"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<CarPayload>(r#"{"year":[2020]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn car_serializes_all_columns() {
        let car = Car {
            id: 1,
            make: Some("Toyota".into()),
            model: Some("Corolla".into()),
            year: Some(2020),
            deleted_flag: 0,
        };

        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "make": "Toyota",
                "model": "Corolla",
                "year": 2020,
                "deleted_flag": 0
            })
        );
    }
}
