//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a `&Connection`; a `&Transaction` derefs to one,
//! so the same functions serve both single statements and the multi-step
//! cascades in the workflow modules.

mod appointment;
mod audit;
mod employee;
mod examination;
mod patient;
mod schedule;

pub use appointment::*;
pub use audit::*;
pub use employee::*;
pub use examination::*;
pub use patient::*;
pub use schedule::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn slot(code: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_code: code.into(),
            day: "Senin".into(),
            start_time: "08:00".into(),
            end_time: "11:00".into(),
            status: SlotStatus::Available,
        }
    }

    fn booking(code: &str, status: SlotStatus) -> AppointmentInput {
        AppointmentInput {
            appointment_id: 0,
            schedule_code: code.into(),
            ssn: 1234567777,
            employee_id: 201103001,
            start_time: "08:00".into(),
            end_time: "09:00".into(),
            status,
        }
    }

    #[test]
    fn schedule_insert_and_retrieve() {
        let conn = test_db();
        insert_schedule(&conn, &slot("SC-00001")).unwrap();
        let found = get_schedule(&conn, "SC-00001").unwrap().unwrap();
        assert_eq!(found.day, "Senin");
        assert_eq!(found.status, SlotStatus::Available);
        assert!(get_schedule(&conn, "SC-missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_schedule_code_is_constraint_violation() {
        let conn = test_db();
        insert_schedule(&conn, &slot("SC-00001")).unwrap();
        let err = insert_schedule(&conn, &slot("SC-00001")).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn schedule_list_respects_limit() {
        let conn = test_db();
        for i in 0..5 {
            insert_schedule(&conn, &slot(&format!("SC-{i:05}"))).unwrap();
        }
        assert_eq!(list_schedules(&conn, 3).unwrap().len(), 3);
        assert_eq!(list_schedules(&conn, 100).unwrap().len(), 5);
    }

    #[test]
    fn update_unknown_schedule_changes_nothing() {
        let conn = test_db();
        let changed = update_schedule(&conn, "SC-404", &slot("SC-404")).unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn transition_honours_allowed_priors() {
        let conn = test_db();
        insert_schedule(&conn, &slot("SC-00001")).unwrap();

        // available → completed is not a legal move
        assert_eq!(
            transition_schedule_status(&conn, "SC-00001", SlotStatus::Completed).unwrap(),
            0
        );
        assert_eq!(
            transition_schedule_status(&conn, "SC-00001", SlotStatus::Booked).unwrap(),
            1
        );
        assert_eq!(
            transition_schedule_status(&conn, "SC-00001", SlotStatus::Completed).unwrap(),
            1
        );
        let stored = get_schedule(&conn, "SC-00001").unwrap().unwrap();
        assert_eq!(stored.status, SlotStatus::Completed);
    }

    #[test]
    fn appointment_ids_are_server_assigned() {
        let conn = test_db();
        let first = insert_appointment(&conn, &booking("SC-1", SlotStatus::Available), None).unwrap();
        let second = insert_appointment(&conn, &booking("SC-1", SlotStatus::Available), None).unwrap();
        assert!(second.appointment_id > first.appointment_id);
    }

    #[test]
    fn appointment_client_id_is_used_when_given() {
        let conn = test_db();
        let stored =
            insert_appointment(&conn, &booking("SC-1", SlotStatus::Available), Some(42)).unwrap();
        assert_eq!(stored.appointment_id, 42);
        assert!(get_appointment(&conn, 42).unwrap().is_some());
    }

    #[test]
    fn two_booked_appointments_cannot_share_a_slot() {
        let conn = test_db();
        insert_appointment(&conn, &booking("SC-1", SlotStatus::Booked), None).unwrap();
        let err = insert_appointment(&conn, &booking("SC-1", SlotStatus::Booked), None).unwrap_err();
        assert!(err.is_constraint_violation());

        // A cancelled claim on the same slot is fine
        insert_appointment(&conn, &booking("SC-1", SlotStatus::Cancelled), None).unwrap();
        assert_eq!(find_booked_holder(&conn, "SC-1").unwrap(), Some(1));
        assert_eq!(find_booked_holder(&conn, "SC-2").unwrap(), None);
    }

    #[test]
    fn appointment_status_can_be_set_alone() {
        let conn = test_db();
        let appt = insert_appointment(&conn, &booking("SC-1", SlotStatus::Booked), None).unwrap();
        assert_eq!(set_appointment_status(&conn, appt.appointment_id, SlotStatus::Completed).unwrap(), 1);
        let stored = get_appointment(&conn, appt.appointment_id).unwrap().unwrap();
        assert_eq!(stored.status, SlotStatus::Completed);
        assert_eq!(stored.start_time, "08:00");
        assert_eq!(find_booked_holder(&conn, "SC-1").unwrap(), None);
    }

    #[test]
    fn renaming_a_slot_rewrites_its_references() {
        let conn = test_db();
        insert_appointment(&conn, &booking("SC-1", SlotStatus::Available), None).unwrap();
        insert_appointment(&conn, &booking("SC-9", SlotStatus::Available), None).unwrap();
        insert_examination(
            &conn,
            &ExaminationInput {
                appointment_id: 1,
                schedule_code: "SC-1".into(),
                ssn: 1,
                employee_id: 2,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(rename_schedule_references(&conn, "SC-1", "SC-2").unwrap(), 2);
        assert_eq!(get_appointment(&conn, 1).unwrap().unwrap().schedule_code, "SC-2");
        assert_eq!(get_appointment(&conn, 2).unwrap().unwrap().schedule_code, "SC-9");
        assert_eq!(get_examination(&conn, 1).unwrap().unwrap().schedule_code, "SC-2");
    }

    #[test]
    fn delete_missing_appointment_reports_zero_rows() {
        let conn = test_db();
        assert_eq!(delete_appointment_row(&conn, 999).unwrap(), 0);
    }

    #[test]
    fn examination_delete_targets_examination_id() {
        let conn = test_db();
        let exam = insert_examination(
            &conn,
            &ExaminationInput {
                appointment_id: 7,
                schedule_code: "SC-1".into(),
                ssn: 1,
                employee_id: 2,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(exam.examination_id, 1);
        // Deleting by the appointment id must not hit the examination
        assert_eq!(delete_examination_row(&conn, 7).unwrap(), 0);
        assert_eq!(delete_examination_row(&conn, exam.examination_id).unwrap(), 1);
    }

    #[test]
    fn patient_credentials_lookup_by_email() {
        let conn = test_db();
        let input = PatientInput {
            ssn: 1234567777,
            name: "Purna".into(),
            email: "purna@gmail.com".into(),
            password: "password".into(),
        };
        insert_patient(&conn, &input, "stored-hash").unwrap();
        let (ssn, hash) = get_patient_credentials(&conn, "purna@gmail.com").unwrap().unwrap();
        assert_eq!(ssn, 1234567777);
        assert_eq!(hash, "stored-hash");
        assert!(get_patient_credentials(&conn, "nobody@gmail.com").unwrap().is_none());
    }

    #[test]
    fn employee_update_by_id() {
        let conn = test_db();
        let mut input = EmployeeInput {
            employee_id: 201103001,
            name: "dr. Bob".into(),
            email: "bob@gmail.com".into(),
            password: "password".into(),
            department: "Dokter Umum".into(),
        };
        insert_employee(&conn, &input, "h1").unwrap();
        input.department = "Bedah".into();
        assert_eq!(update_employee(&conn, 201103001, &input, "h2").unwrap(), 1);
        let stored = get_employee(&conn, 201103001).unwrap().unwrap();
        assert_eq!(stored.department, "Bedah");
    }

    #[test]
    fn audit_entries_round_trip_by_source() {
        let conn = test_db();
        insert_audit_entries(
            &conn,
            &[(
                "2026-01-01 10:00:00".into(),
                "identity:42".into(),
                "PUT /appointments/42/1".into(),
                "status:200".into(),
            )],
        )
        .unwrap();
        let rows = query_audit_by_source(&conn, "identity:42").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "PUT /appointments/42/1");
    }

    #[test]
    fn stale_audit_entries_are_pruned() {
        let conn = test_db();
        insert_audit_entries(
            &conn,
            &[(
                "2000-01-01 00:00:00".into(),
                "anonymous".into(),
                "GET /".into(),
                "status:200".into(),
            )],
        )
        .unwrap();
        assert_eq!(prune_audit_log(&conn, 90).unwrap(), 1);
    }

    #[test]
    fn invalid_status_in_row_surfaces_as_error() {
        let conn = test_db();
        insert_schedule(&conn, &slot("SC-00001")).unwrap();
        // CHECK constraint keeps unknown statuses out of the table
        let result = conn.execute(
            "UPDATE schedules SET status = 'reserved' WHERE schedule_code = 'SC-00001'",
            [],
        );
        assert!(result.is_err());
        let err: DatabaseError = result.unwrap_err().into();
        assert!(err.is_constraint_violation());
    }
}
