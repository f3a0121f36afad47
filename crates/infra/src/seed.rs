//! Demo data for local runs.

use chrono::{DateTime, Duration, Utc};

use tutoria_access::{AccessRequest, SubmitAccessRequest};
use tutoria_auth::Role;
use tutoria_core::{AccessRequestId, UserId};

use crate::store::{InMemoryAccessRequestStore, StoreError};

/// Three pending registrations, submitted 2 hours, 1 day and 3 days before `now`.
pub fn demo_registrations(now: DateTime<Utc>) -> Vec<SubmitAccessRequest> {
    let entry = |first: &str, last: &str, email: &str, roles: Vec<Role>, age: Duration| {
        SubmitAccessRequest {
            request_id: AccessRequestId::new(),
            applicant: UserId::new(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            requested_roles: roles,
            occurred_at: now - age,
        }
    };

    vec![
        entry(
            "María Elena",
            "Quispe Mamani",
            "maria.quispe@unsaac.edu.pe",
            vec![Role::Administrator, Role::Tutor],
            Duration::hours(2),
        ),
        entry(
            "Carlos Alberto",
            "Huanca Condori",
            "carlos.huanca@unsaac.edu.pe",
            vec![Role::Verifier],
            Duration::days(1),
        ),
        entry(
            "Ana Lucía",
            "Flores Gutierrez",
            "ana.flores@unsaac.edu.pe",
            vec![Role::Tutor, Role::Verifier],
            Duration::days(3),
        ),
    ]
}

pub fn seed_demo(store: &InMemoryAccessRequestStore) -> Result<Vec<AccessRequest>, StoreError> {
    let seeded = demo_registrations(Utc::now())
        .into_iter()
        .map(|cmd| store.submit(cmd))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(count = seeded.len(), "seeded demo access requests");
    Ok(seeded)
}
