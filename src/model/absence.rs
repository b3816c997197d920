use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AbsenceType {
    Sickness,
    Leave,
    Unexcused,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AbsenceStatus {
    Pending,
    Accepted,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Absence {
    pub id: u64,
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub absence_type: String,
    pub proof_url: Option<String>,
    pub status: String,
    pub removed: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn absence_type_maps_to_db_strings() {
        assert_eq!(AbsenceType::Sickness.to_string(), "sickness");
        assert_eq!(AbsenceType::Leave.to_string(), "leave");
        assert_eq!(AbsenceType::Unexcused.to_string(), "unexcused");
        assert_eq!(AbsenceType::from_str("leave").unwrap(), AbsenceType::Leave);
        assert!(AbsenceType::from_str("holiday").is_err());
    }

    #[test]
    fn status_maps_to_db_strings() {
        assert_eq!(AbsenceStatus::Pending.to_string(), "pending");
        assert_eq!(AbsenceStatus::Accepted.to_string(), "accepted");
    }
}
