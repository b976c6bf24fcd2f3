//! Repository layer — entity-scoped database operations.
//!
//! Every function takes a `&Connection`; a `rusqlite::Transaction` derefs
//! to one, so the same calls participate in the caller's transaction.

mod appointment;
mod event;
mod patient;
mod reference;

pub use appointment::*;
pub use event::*;
pub use patient::*;
pub use reference::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use crate::models::enums::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    /// Returns (patient_id, doctor_id).
    fn seed(conn: &Connection) -> (i64, i64) {
        let patient_user = insert_user(conn, "Budi", "budi@example.com", Role::Patient).unwrap();
        let doctor_user = insert_user(conn, "Dr. Sari", "sari@example.com", Role::Doctor).unwrap();
        let doctor_id = insert_doctor(conn, None, doctor_user).unwrap();
        insert_patient_for_user(conn, patient_user).unwrap();
        let patient = get_patient_by_user(conn, patient_user).unwrap().unwrap();
        (patient.id, doctor_id)
    }

    fn booking(doctor_id: i64, date: (i32, u32, u32), time: (u32, u32)) -> NewAppointment {
        NewAppointment {
            doctor_id,
            schedule_id: None,
            appointment_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            start_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            complaint: "fever".into(),
        }
    }

    #[test]
    fn appointment_insert_and_detail() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);

        let created = insert_appointment(
            &conn,
            patient_id,
            &booking(doctor_id, (2024, 3, 1), (9, 0)),
            AppointmentStatus::Pending,
        )
        .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.start_time_slot, "09:00:00");

        let detail = get_appointment_detail(&conn, created.id).unwrap();
        assert_eq!(detail.appointment, created);
        assert_eq!(detail.doctor.unwrap().name, "Dr. Sari");
        assert_eq!(detail.patient.unwrap().email, "budi@example.com");
    }

    #[test]
    fn detail_missing_is_not_found() {
        let conn = test_db();
        let err = get_appointment_detail(&conn, 404).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
        assert!(get_appointment(&conn, 404).unwrap().is_none());
    }

    #[test]
    fn conditional_update_applies_on_expected_status() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);
        let created = insert_appointment(
            &conn,
            patient_id,
            &booking(doctor_id, (2024, 3, 1), (9, 0)),
            AppointmentStatus::Pending,
        )
        .unwrap();

        let updated = update_appointment_status(
            &conn,
            created.id,
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
        )
        .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn conditional_update_reports_stale_status() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);
        let created = insert_appointment(
            &conn,
            patient_id,
            &booking(doctor_id, (2024, 3, 1), (9, 0)),
            AppointmentStatus::Rejected,
        )
        .unwrap();

        let err = update_appointment_status(
            &conn,
            created.id,
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::StatusConflict { .. }));
        let stored = get_appointment(&conn, created.id).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Rejected);
    }

    #[test]
    fn conditional_update_reports_missing_row() {
        let conn = test_db();
        let err = update_appointment_status(
            &conn,
            77,
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn patient_list_is_most_recent_first() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);
        for (date, time) in [
            ((2024, 3, 1), (9, 0)),
            ((2024, 3, 2), (8, 0)),
            ((2024, 3, 1), (14, 30)),
            ((2024, 2, 28), (10, 0)),
        ] {
            insert_appointment(
                &conn,
                patient_id,
                &booking(doctor_id, date, time),
                AppointmentStatus::Pending,
            )
            .unwrap();
        }

        let list = list_appointments_by_patient(&conn, patient_id).unwrap();
        let keys: Vec<(String, String)> = list
            .iter()
            .map(|d| {
                (
                    d.appointment.appointment_date.to_string(),
                    d.appointment.start_time_slot.clone(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-03-02".to_string(), "08:00:00".to_string()),
                ("2024-03-01".to_string(), "14:30:00".to_string()),
                ("2024-03-01".to_string(), "09:00:00".to_string()),
                ("2024-02-28".to_string(), "10:00:00".to_string()),
            ]
        );
        assert!(list.iter().all(|d| d.doctor.is_some() && d.patient.is_none()));
    }

    #[test]
    fn doctor_list_is_soonest_first() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);
        for (date, time) in [
            ((2024, 3, 1), (14, 30)),
            ((2024, 2, 28), (10, 0)),
            ((2024, 3, 1), (9, 0)),
        ] {
            insert_appointment(
                &conn,
                patient_id,
                &booking(doctor_id, date, time),
                AppointmentStatus::Pending,
            )
            .unwrap();
        }

        let list = list_appointments_by_doctor(&conn, doctor_id).unwrap();
        let slots: Vec<&str> = list
            .iter()
            .map(|d| d.appointment.start_time_slot.as_str())
            .collect();
        assert_eq!(slots, vec!["10:00:00", "09:00:00", "14:30:00"]);
        assert_eq!(list[0].patient.as_ref().unwrap().name, "Budi");
        assert!(list.iter().all(|d| d.doctor.is_none()));
    }

    #[test]
    fn patient_insert_is_idempotent() {
        let conn = test_db();
        let user = insert_user(&conn, "Rina", "rina@example.com", Role::Patient).unwrap();
        assert!(insert_patient_for_user(&conn, user).unwrap());
        assert!(!insert_patient_for_user(&conn, user).unwrap());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM patients WHERE user_id = ?1", [user], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let patient = get_patient_by_user(&conn, user).unwrap().unwrap();
        assert!(patient.phone.is_none());
        assert!(patient.blood_type.is_none());
    }

    #[test]
    fn reference_lookups() {
        let conn = test_db();
        let doctor_user = insert_user(&conn, "Dr. Andi", "andi@example.com", Role::Doctor).unwrap();
        let doctor_id = insert_doctor(&conn, Some(7), doctor_user).unwrap();
        assert_eq!(doctor_id, 7);
        assert_eq!(get_doctor_id_for_user(&conn, doctor_user).unwrap(), Some(7));
        assert!(doctor_exists(&conn, 7).unwrap());
        assert!(!doctor_exists(&conn, 8).unwrap());
        assert!(user_exists(&conn, doctor_user).unwrap());

        let schedule = insert_schedule(&conn, 7, "friday", "08:00:00", "12:00:00", 10).unwrap();
        assert_eq!(get_schedule_doctor(&conn, schedule).unwrap(), Some(7));
        assert_eq!(get_schedule_doctor(&conn, schedule + 1).unwrap(), None);
    }

    #[test]
    fn events_are_listed_oldest_first() {
        let conn = test_db();
        let (patient_id, doctor_id) = seed(&conn);
        let created = insert_appointment(
            &conn,
            patient_id,
            &booking(doctor_id, (2024, 3, 1), (9, 0)),
            AppointmentStatus::Pending,
        )
        .unwrap();

        let patient = Principal::patient(1);
        let doctor = Principal::doctor(2);
        insert_appointment_event(
            &conn,
            created.id,
            AppointmentAction::Created,
            None,
            AppointmentStatus::Pending,
            &patient,
        )
        .unwrap();
        insert_appointment_event(
            &conn,
            created.id,
            AppointmentAction::StatusUpdated,
            Some(AppointmentStatus::Pending),
            AppointmentStatus::Confirmed,
            &doctor,
        )
        .unwrap();

        let events = list_appointment_events(&conn, created.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AppointmentAction::Created);
        assert_eq!(events[0].from_status, None);
        assert_eq!(events[1].actor_role, Role::Doctor);
        assert_eq!(events[1].from_status, Some(AppointmentStatus::Pending));
    }
}
