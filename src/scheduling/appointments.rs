//! Appointment workflow: a patient's claim on a slot.
//!
//! Updating an appointment is the synchronization point: the new status is
//! written to the appointment and then to its slot, in the caller's
//! transaction. If either write fails nothing is kept.

use rusqlite::{Connection, Transaction};

use super::{ledger, WorkflowError};
use crate::config::LIST_LIMIT;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentInput, SlotStatus};

/// How appointment ids are assigned on create.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingPolicy {
    /// Require and use the caller's `appointment_id` instead of letting the
    /// database assign one.
    pub require_client_appointment_id: bool,
}

pub fn create_appointment(
    conn: &Connection,
    input: &AppointmentInput,
    policy: BookingPolicy,
) -> Result<Appointment, WorkflowError> {
    input.validate(policy.require_client_appointment_id)?;
    let assigned_id = policy
        .require_client_appointment_id
        .then_some(input.appointment_id);

    let appointment = repository::insert_appointment(conn, input, assigned_id)?;
    tracing::info!(
        appointment_id = appointment.appointment_id,
        code = %appointment.schedule_code,
        "Appointment created"
    );
    Ok(appointment)
}

pub fn find_appointment(conn: &Connection, id: i64) -> Result<Appointment, WorkflowError> {
    repository::get_appointment(conn, id)?
        .ok_or_else(|| DatabaseError::not_found("Appointment", id).into())
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, WorkflowError> {
    Ok(repository::list_appointments(conn, LIST_LIMIT)?)
}

/// Update an appointment and cascade its status into the linked slot.
///
/// Steps, all on `tx`:
/// 1. write the appointment's mutable columns (`NotFound` if `id` is unknown);
/// 2. read the row back once as the authoritative post-update state;
/// 3. if the appointment moved off a slot it had booked, release that slot;
/// 4. move the linked slot to the appointment's status (guarded transition).
///    A slot booked by another appointment is refused with `Conflict`.
///
/// The caller commits. Any error leaves `tx` to roll back on drop.
pub fn update_appointment(
    tx: &Transaction<'_>,
    id: i64,
    input: &AppointmentInput,
) -> Result<Appointment, WorkflowError> {
    input.validate(false)?;

    let previous = find_appointment(tx, id)?;

    if repository::update_appointment_row(tx, id, input)? == 0 {
        return Err(DatabaseError::not_found("Appointment", id).into());
    }
    let appointment = find_appointment(tx, id)?;

    if previous.status == SlotStatus::Booked && previous.schedule_code != appointment.schedule_code
    {
        ledger::release_slot(tx, &previous.schedule_code)?;
    }

    let schedule =
        ledger::transition_slot(tx, &appointment.schedule_code, appointment.status, id)?;
    tracing::debug!(
        appointment_id = id,
        code = %schedule.schedule_code,
        status = %schedule.status,
        "Appointment status cascaded to slot"
    );

    Ok(appointment)
}

/// Delete an appointment. A slot the appointment had booked is released in
/// the same transaction; any other slot state is kept as history.
pub fn delete_appointment(tx: &Transaction<'_>, id: i64) -> Result<(), WorkflowError> {
    let previous = find_appointment(tx, id)?;

    if repository::delete_appointment_row(tx, id)? == 0 {
        return Err(DatabaseError::not_found("Appointment", id).into());
    }
    if previous.status == SlotStatus::Booked {
        ledger::release_slot(tx, &previous.schedule_code)?;
    }

    tracing::info!(appointment_id = id, "Appointment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_database, open_memory_database, with_write_transaction};
    use crate::models::ScheduleInput;
    use crate::scheduling::ledger::{create_schedule, find_schedule};

    fn slot(code: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_code: code.into(),
            day: "Senin".into(),
            start_time: "08:00".into(),
            end_time: "11:00".into(),
            status: SlotStatus::Available,
        }
    }

    fn request(code: &str, status: SlotStatus) -> AppointmentInput {
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

    fn setup(conn: &Connection, code: &str) -> Appointment {
        create_schedule(conn, &slot(code)).unwrap();
        create_appointment(conn, &request(code, SlotStatus::Available), BookingPolicy::default())
            .unwrap()
    }

    fn update(
        conn: &mut Connection,
        id: i64,
        input: &AppointmentInput,
    ) -> Result<Appointment, WorkflowError> {
        with_write_transaction(conn, |tx| update_appointment(tx, id, input))
    }

    #[test]
    fn booking_flows_into_schedule() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Available);

        let updated = update(
            &mut conn,
            appt.appointment_id,
            &request("SC-100", SlotStatus::Booked),
        )
        .unwrap();

        assert_eq!(updated.status, SlotStatus::Booked);
        let schedule = find_schedule(&conn, "SC-100").unwrap();
        assert_eq!(schedule.status, updated.status);
    }

    #[test]
    fn missing_schedule_rolls_back_appointment() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");

        let err = update(
            &mut conn,
            appt.appointment_id,
            &request("SC-missing", SlotStatus::Booked),
        )
        .unwrap_err();
        assert!(err.is_not_found());

        let after = find_appointment(&conn, appt.appointment_id).unwrap();
        assert_eq!(after, appt);
    }

    #[test]
    fn refused_transition_rolls_back_appointment() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");

        // available → completed is refused by the slot, so the appointment write is undone
        let err = update(
            &mut conn,
            appt.appointment_id,
            &request("SC-100", SlotStatus::Completed),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Database(DatabaseError::Conflict(_))
        ));

        assert_eq!(find_appointment(&conn, appt.appointment_id).unwrap(), appt);
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn update_unknown_appointment_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        create_schedule(&conn, &slot("SC-100")).unwrap();
        let err = update(&mut conn, 77, &request("SC-100", SlotStatus::Booked)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn update_validates_before_touching_rows() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");
        let bad = AppointmentInput { ssn: 0, ..request("SC-100", SlotStatus::Booked) };
        let err = update(&mut conn, appt.appointment_id, &bad).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(find_appointment(&conn, appt.appointment_id).unwrap(), appt);
    }

    #[test]
    fn second_booking_of_same_slot_is_refused() {
        let mut conn = open_memory_database().unwrap();
        let first = setup(&conn, "SC-100");
        let second = create_appointment(
            &conn,
            &request("SC-100", SlotStatus::Available),
            BookingPolicy::default(),
        )
        .unwrap();

        update(&mut conn, first.appointment_id, &request("SC-100", SlotStatus::Booked)).unwrap();
        let err = update(&mut conn, second.appointment_id, &request("SC-100", SlotStatus::Booked))
            .unwrap_err();
        match err {
            WorkflowError::Database(db) => assert!(db.is_constraint_violation()),
            other => panic!("expected constraint violation, got {other:?}"),
        }
        assert_eq!(
            find_appointment(&conn, second.appointment_id).unwrap().status,
            SlotStatus::Available
        );
    }

    #[test]
    fn completing_a_booked_visit() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");
        update(&mut conn, appt.appointment_id, &request("SC-100", SlotStatus::Booked)).unwrap();
        update(&mut conn, appt.appointment_id, &request("SC-100", SlotStatus::Completed)).unwrap();
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Completed);
    }

    #[test]
    fn moving_a_booking_releases_the_old_slot() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-1");
        create_schedule(&conn, &slot("SC-2")).unwrap();

        update(&mut conn, appt.appointment_id, &request("SC-1", SlotStatus::Booked)).unwrap();
        update(&mut conn, appt.appointment_id, &request("SC-2", SlotStatus::Booked)).unwrap();

        assert_eq!(find_schedule(&conn, "SC-1").unwrap().status, SlotStatus::Available);
        assert_eq!(find_schedule(&conn, "SC-2").unwrap().status, SlotStatus::Booked);
    }

    #[test]
    fn other_appointment_cannot_release_a_booked_slot() {
        let mut conn = open_memory_database().unwrap();
        let holder = setup(&conn, "SC-100");
        let waiting = create_appointment(
            &conn,
            &request("SC-100", SlotStatus::Available),
            BookingPolicy::default(),
        )
        .unwrap();
        update(&mut conn, holder.appointment_id, &request("SC-100", SlotStatus::Booked)).unwrap();

        // Re-saving the waiting appointment must not touch the held slot
        let mut resave = request("SC-100", SlotStatus::Available);
        resave.end_time = "09:30".into();
        let err = update(&mut conn, waiting.appointment_id, &resave).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Database(DatabaseError::Conflict(_))
        ));
        assert_eq!(find_appointment(&conn, waiting.appointment_id).unwrap(), waiting);
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Booked);

        for status in [SlotStatus::Completed, SlotStatus::Cancelled] {
            let err = update(&mut conn, waiting.appointment_id, &request("SC-100", status))
                .unwrap_err();
            assert!(matches!(
                err,
                WorkflowError::Database(DatabaseError::Conflict(_))
            ));
        }

        // The holder can still finish its own visit
        update(&mut conn, holder.appointment_id, &request("SC-100", SlotStatus::Completed))
            .unwrap();
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Completed);
    }

    #[test]
    fn moving_onto_a_slot_booked_by_another_is_refused() {
        let mut conn = open_memory_database().unwrap();
        let holder = setup(&conn, "SC-200");
        update(&mut conn, holder.appointment_id, &request("SC-200", SlotStatus::Booked)).unwrap();
        let mover = setup(&conn, "SC-100");

        let err = update(
            &mut conn,
            mover.appointment_id,
            &request("SC-200", SlotStatus::Available),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Database(DatabaseError::Conflict(_))
        ));

        assert_eq!(find_appointment(&conn, mover.appointment_id).unwrap(), mover);
        assert_eq!(find_schedule(&conn, "SC-200").unwrap().status, SlotStatus::Booked);
        assert_eq!(
            repository::find_booked_holder(&conn, "SC-200").unwrap(),
            Some(holder.appointment_id)
        );
    }

    #[test]
    fn client_assigned_ids_when_configured() {
        let conn = open_memory_database().unwrap();
        let policy = BookingPolicy { require_client_appointment_id: true };

        let err = create_appointment(&conn, &request("SC-1", SlotStatus::Available), policy)
            .unwrap_err();
        assert_eq!(err.to_string(), "Required Appointment ID");

        let input = AppointmentInput { appointment_id: 501, ..request("SC-1", SlotStatus::Available) };
        let created = create_appointment(&conn, &input, policy).unwrap();
        assert_eq!(created.appointment_id, 501);
    }

    #[test]
    fn delete_missing_appointment_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        let err = with_write_transaction(&mut conn, |tx| delete_appointment(tx, 404)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_releases_booked_slot() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");
        update(&mut conn, appt.appointment_id, &request("SC-100", SlotStatus::Booked)).unwrap();

        with_write_transaction(&mut conn, |tx| delete_appointment(tx, appt.appointment_id))
            .unwrap();

        assert!(find_appointment(&conn, appt.appointment_id).unwrap_err().is_not_found());
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn delete_keeps_completed_slot_as_history() {
        let mut conn = open_memory_database().unwrap();
        let appt = setup(&conn, "SC-100");
        update(&mut conn, appt.appointment_id, &request("SC-100", SlotStatus::Booked)).unwrap();
        update(&mut conn, appt.appointment_id, &request("SC-100", SlotStatus::Completed)).unwrap();

        with_write_transaction(&mut conn, |tx| delete_appointment(tx, appt.appointment_id))
            .unwrap();
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Completed);
    }

    #[test]
    fn concurrent_bookings_of_one_slot_admit_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hms.db");

        let conn = open_database(&path).unwrap();
        create_schedule(&conn, &slot("SC-100")).unwrap();
        let ids: Vec<i64> = (0..4)
            .map(|_| {
                create_appointment(
                    &conn,
                    &request("SC-100", SlotStatus::Available),
                    BookingPolicy::default(),
                )
                .unwrap()
                .appointment_id
            })
            .collect();
        drop(conn);

        let barrier = std::sync::Arc::new(std::sync::Barrier::new(ids.len()));
        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let path = path.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let mut conn = open_database(&path).unwrap();
                    barrier.wait();
                    update(&mut conn, id, &request("SC-100", SlotStatus::Booked)).is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);

        let conn = open_database(&path).unwrap();
        assert!(repository::find_booked_holder(&conn, "SC-100").unwrap().is_some());
        assert_eq!(find_schedule(&conn, "SC-100").unwrap().status, SlotStatus::Booked);
    }
}
