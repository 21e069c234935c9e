//! Trip entity model and DTOs.

use chrono::NaiveDate;
use railway_core::booking::{available_seats, TrainCapacity};
use railway_core::error::CoreError;
use railway_core::filters::parse_date;
use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A trip row from the `trips` table with its crew ids, as returned by writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trip {
    pub id: DbId,
    #[serde(rename = "route")]
    pub route_id: DbId,
    #[serde(rename = "train")]
    pub train_id: DbId,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub crews: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A trip paired with one of its crew members, for crew listings.
#[derive(Debug, Clone, FromRow)]
pub struct CrewTrip {
    pub crew_id: DbId,
    #[sqlx(flatten)]
    pub trip: Trip,
}

/// Trip joined with route, train and booking counts, as loaded from the database.
#[derive(Debug, Clone, FromRow)]
pub struct TripSummaryRow {
    pub id: DbId,
    pub route_id: DbId,
    pub route: String,
    pub train: String,
    pub cargo_count: i32,
    pub seats_per_cargo: i32,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub crew_names: Vec<String>,
    pub tickets_booked: i64,
}

/// Crew entry embedded in a [`TripSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewName {
    pub full_name: String,
}

/// Read-side trip with embedded names and the live seat availability.
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub id: DbId,
    pub route_id: DbId,
    /// `"<source> - <destination>"`.
    pub route: String,
    pub train: String,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub crews: Vec<CrewName>,
    pub tickets_available: i64,
}

impl From<TripSummaryRow> for TripSummary {
    fn from(row: TripSummaryRow) -> Self {
        let layout = TrainCapacity {
            cargo_count: row.cargo_count,
            seats_per_cargo: row.seats_per_cargo,
        };
        Self {
            id: row.id,
            route_id: row.route_id,
            route: row.route,
            train: row.train,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            crews: row
                .crew_names
                .into_iter()
                .map(|full_name| CrewName { full_name })
                .collect(),
            tickets_available: available_seats(&layout, row.tickets_booked),
        }
    }
}

/// DTO for creating a new trip.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrip {
    pub route: DbId,
    pub train: DbId,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    #[serde(default)]
    pub crews: Vec<DbId>,
}

/// DTO for updating a trip. `crews`, when present, replaces the set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTrip {
    pub route: Option<DbId>,
    pub train: Option<DbId>,
    pub departure_time: Option<Timestamp>,
    pub arrival_time: Option<Timestamp>,
    pub crews: Option<Vec<DbId>>,
}

/// Raw query string of `GET /trips`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripListParams {
    /// `YYYY-MM-DD`; matches the UTC date of `departure_time`.
    pub departure_time: Option<String>,
    /// `YYYY-MM-DD`; matches the UTC date of `arrival_time`.
    pub arrival_time: Option<String>,
}

/// Parsed trip filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub departure_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
}

impl TryFrom<&TripListParams> for TripFilter {
    type Error = CoreError;

    fn try_from(params: &TripListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            departure_date: params
                .departure_time
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| parse_date(s, "departure_time"))
                .transpose()?,
            arrival_date: params
                .arrival_time
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| parse_date(s, "arrival_time"))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(booked: i64) -> TripSummaryRow {
        TripSummaryRow {
            id: 1,
            route_id: 7,
            route: "Kyiv - Lviv".to_string(),
            train: "Intercity".to_string(),
            cargo_count: 2,
            seats_per_cargo: 3,
            departure_time: chrono::Utc::now(),
            arrival_time: chrono::Utc::now(),
            crew_names: vec!["Ann Lee".to_string()],
            tickets_booked: booked,
        }
    }

    #[test]
    fn summary_computes_tickets_available() {
        let summary = TripSummary::from(row(2));
        assert_eq!(summary.tickets_available, 4);
        assert_eq!(summary.route_id, 7);
        assert_eq!(
            summary.crews,
            vec![CrewName {
                full_name: "Ann Lee".to_string()
            }]
        );
    }

    #[test]
    fn empty_filter_params_mean_no_filter() {
        let params = TripListParams {
            departure_time: Some(String::new()),
            arrival_time: None,
        };
        assert_eq!(TripFilter::try_from(&params).unwrap(), TripFilter::default());
    }

    #[test]
    fn invalid_date_is_a_validation_error() {
        let params = TripListParams {
            departure_time: None,
            arrival_time: Some("tomorrow".to_string()),
        };
        assert!(matches!(
            TripFilter::try_from(&params),
            Err(CoreError::Validation(_))
        ));
    }
}
