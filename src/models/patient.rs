use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::BloodType;

/// Booking-entitled record, one per user. Demographics may be empty
/// when the row was provisioned on first booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub user_id: i64,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<BloodType>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
