use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::departments::models::DepartmentWithAreas;
use crate::features::departments::DepartmentService;
use crate::features::notifications::NotificationService;
use crate::features::reports::models::{Report, ReportStatus, UpdateChangeType};
use crate::features::reports::services::UpdateService;
use crate::features::users::models::User;
use crate::features::users::UserService;
use crate::shared::geo::{distance_meters, GeoPoint};

const REPORT_COLUMNS: &str = r#"
    id, reporter_id, title, description, category, lat, lon, status,
    assigned_department, assigned_staff, upvote_count,
    created_at, updated_at, resolved_at
"#;

/// The routing engine: picks the owning department for a report, promotes
/// its status, balances it onto the least-loaded staff member and records
/// the audit trail.
///
/// Routing is best-effort relative to report creation: nothing in here may
/// fail the caller, so the public entry point catches every error at the
/// boundary and hands back the original report.
pub struct RoutingService {
    pool: PgPool,
    department_service: Arc<DepartmentService>,
    user_service: Arc<UserService>,
    update_service: Arc<UpdateService>,
    notification_service: Arc<NotificationService>,
}

impl RoutingService {
    pub fn new(
        pool: PgPool,
        department_service: Arc<DepartmentService>,
        user_service: Arc<UserService>,
        update_service: Arc<UpdateService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            pool,
            department_service,
            user_service,
            update_service,
            notification_service,
        }
    }

    /// Route a report to a department and staff member.
    ///
    /// Returns the routed report, or the report unchanged when it has no
    /// category, no department serves its category, or anything fails along
    /// the way. `acting_user` is None for fully automated routing.
    pub async fn route_report(&self, report: Report, acting_user: Option<&str>) -> Report {
        match self.try_route(&report, acting_user).await {
            Ok(Some(routed)) => routed,
            Ok(None) => report,
            Err(e) => {
                tracing::warn!(
                    "Routing failed for report {}, leaving it unrouted: {}",
                    report.id,
                    e
                );
                report
            }
        }
    }

    async fn try_route(
        &self,
        report: &Report,
        acting_user: Option<&str>,
    ) -> Result<Option<Report>> {
        // A report without a resolvable category stays unrouted until a
        // human intervenes; this is not an error
        let Some(category) = report.category else {
            tracing::debug!("Report {} has no category, skipping routing", report.id);
            return Ok(None);
        };

        let candidates = self
            .department_service
            .list_for_category(&category.to_string())
            .await?;
        if candidates.is_empty() {
            tracing::info!(
                "No department serves category {}, report {} remains unassigned",
                category,
                report.id
            );
            return Ok(None);
        }

        let chosen = &candidates[Self::select_department(&candidates, report.location())];

        // First contact with a department implies acknowledgment; re-routing
        // never regresses or force-advances an already-progressed report
        let next_status = if report.status == ReportStatus::New {
            ReportStatus::Acknowledged
        } else {
            report.status
        };

        // Narrow update: only the fields routing owns, so concurrent edits
        // to other fields are not clobbered. assigned_staff is cleared here
        // so the balancer starts from a clean slate; a staff member from a
        // previously assigned department must never survive a re-route.
        let mut routed = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET assigned_department = $2, status = $3, assigned_staff = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(chosen.department.id)
        .bind(next_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist department assignment: {:?}", e);
            AppError::Database(e)
        })?;

        self.update_service
            .append(
                report.id,
                acting_user,
                UpdateChangeType::Assigned,
                None,
                Some(&chosen.department.name),
            )
            .await?;

        tracing::info!(
            "Report {} routed to department {} ({})",
            report.id,
            chosen.department.name,
            chosen.department.id
        );

        if let Some(staff) = self
            .assign_staff(&mut routed, chosen, acting_user)
            .await?
        {
            tracing::info!(
                "Report {} load-balanced to staff {} ({})",
                report.id,
                staff.name,
                staff.id
            );
        }

        self.notification_service
            .notify(
                &routed.reporter_id,
                "Report assigned",
                &format!(
                    "Your report \"{}\" was assigned to {}",
                    routed.title, chosen.department.name
                ),
                Some(routed.id),
            )
            .await;

        Ok(Some(routed))
    }

    /// Staff load balancer: pick the staff member of the chosen department
    /// with the fewest open (non-resolved) reports. A department without
    /// staff is fine; the report stays department-assigned only.
    async fn assign_staff(
        &self,
        report: &mut Report,
        department: &DepartmentWithAreas,
        acting_user: Option<&str>,
    ) -> Result<Option<User>> {
        let staff = self
            .user_service
            .list_staff_by_department(department.department.id)
            .await?;
        if staff.is_empty() {
            tracing::debug!(
                "Department {} has no staff, leaving report {} unassigned",
                department.department.name,
                report.id
            );
            return Ok(None);
        }

        let mut loads = Vec::with_capacity(staff.len());
        for member in &staff {
            loads.push(self.user_service.open_report_count(&member.id).await?);
        }

        // Read-count-then-write: two concurrent routings can both observe
        // the same least-loaded member and both assign to them. Accepted;
        // perfect balance is best-effort, not an invariant.
        let chosen = &staff[Self::pick_least_loaded(&loads)];

        *report = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET assigned_staff = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(&chosen.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist staff assignment: {:?}", e);
            AppError::Database(e)
        })?;

        self.update_service
            .append(
                report.id,
                acting_user,
                UpdateChangeType::AssignedStaff,
                None,
                Some(&chosen.name),
            )
            .await?;

        Ok(Some(chosen.clone()))
    }

    /// Candidate selection policy. Containment wins first: the first
    /// candidate (in directory order) with a service-area circle containing
    /// the point. Otherwise the candidate owning the nearest service-area
    /// center; exact distance ties and the no-areas-anywhere case both fall
    /// back to the first candidate in directory order.
    ///
    /// Ties break on directory enumeration order, not distance. That is a
    /// deliberate reproducibility guarantee; do not "improve" it.
    pub fn select_department(candidates: &[DepartmentWithAreas], location: GeoPoint) -> usize {
        for (i, candidate) in candidates.iter().enumerate() {
            let contained = candidate
                .areas
                .iter()
                .any(|area| distance_meters(location, area.center()) <= area.radius_meters);
            if contained {
                return i;
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            for area in &candidate.areas {
                let distance = distance_meters(location, area.center());
                // Strict comparison keeps the first-enumerated winner on ties
                if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                    best = Some((i, distance));
                }
            }
        }

        best.map_or(0, |(i, _)| i)
    }

    /// First-enumerated candidate with the strictly minimum load wins
    pub fn pick_least_loaded(loads: &[i64]) -> usize {
        let mut best = 0;
        for (i, &load) in loads.iter().enumerate().skip(1) {
            if load < loads[best] {
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::departments::models::{Department, ServiceArea};
    use crate::features::notifications::RealtimeHub;
    use chrono::Utc;

    fn department(name: &str, position: i64, areas: &[(f64, f64, f64)]) -> DepartmentWithAreas {
        let id = Uuid::new_v4();
        DepartmentWithAreas {
            department: Department {
                id,
                name: name.to_string(),
                categories: vec!["pothole".to_string()],
                position,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            areas: areas
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon, radius))| ServiceArea {
                    id: Uuid::new_v4(),
                    department_id: id,
                    center_lat: lat,
                    center_lon: lon,
                    radius_meters: radius,
                    position: i as i64,
                })
                .collect(),
        }
    }

    #[test]
    fn test_containment_wins_regardless_of_distance() {
        // Report inside PWD's 5000m circle; another department's center is
        // closer but does not contain the point
        let report_at = GeoPoint::new(28.46, 77.50);
        let candidates = vec![
            department("Far but containing", 0, &[(28.46, 77.51, 5_000.0)]),
            department("Near but not containing", 1, &[(28.461, 77.501, 10.0)]),
        ];

        // Swap so the non-containing one enumerates first
        let candidates_rev = vec![candidates[1].clone(), candidates[0].clone()];

        assert_eq!(
            RoutingService::select_department(&candidates_rev, report_at),
            1
        );
    }

    #[test]
    fn test_containment_tie_breaks_on_directory_order() {
        let report_at = GeoPoint::new(28.46, 77.50);
        // Both circles contain the point; the second is much closer
        let candidates = vec![
            department("First (PWD)", 0, &[(28.46, 77.53, 10_000.0)]),
            department("Second", 1, &[(28.46, 77.501, 10_000.0)]),
        ];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 0);
    }

    #[test]
    fn test_nearest_center_fallback_outside_all_circles() {
        // Report at [77.60, 28.60] is outside every circle; Health &
        // Sanitation owns the nearest center
        let report_at = GeoPoint::new(28.60, 77.60);
        let candidates = vec![
            department("Distant Department", 0, &[(28.00, 77.00, 1_000.0)]),
            department("Health & Sanitation Department", 1, &[(28.47, 77.50, 3_500.0)]),
        ];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 1);
    }

    #[test]
    fn test_equal_distance_tie_breaks_on_directory_order() {
        let report_at = GeoPoint::new(28.46, 77.50);
        // Mirrored centers, identical distance from the report
        let candidates = vec![
            department("East", 0, &[(28.46, 77.52, 10.0)]),
            department("West", 1, &[(28.46, 77.48, 10.0)]),
        ];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 0);
    }

    #[test]
    fn test_no_service_areas_falls_back_to_first_candidate() {
        let report_at = GeoPoint::new(28.46, 77.50);
        let candidates = vec![
            department("City-wide A", 0, &[]),
            department("City-wide B", 1, &[]),
        ];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 0);
    }

    #[test]
    fn test_candidate_without_areas_loses_to_one_with_a_center() {
        let report_at = GeoPoint::new(28.46, 77.50);
        let candidates = vec![
            department("City-wide", 0, &[]),
            department("Has a center", 1, &[(28.50, 77.55, 100.0)]),
        ];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 1);
    }

    #[test]
    fn test_pick_least_loaded_minimum_wins() {
        assert_eq!(RoutingService::pick_least_loaded(&[3, 1, 2]), 1);
    }

    #[test]
    fn test_pick_least_loaded_tie_takes_first_enumerated() {
        // Loads [3, 1, 1]: both minimums are 1; first-enumerated wins
        assert_eq!(RoutingService::pick_least_loaded(&[3, 1, 1]), 1);
        assert_eq!(RoutingService::pick_least_loaded(&[0, 0, 0]), 0);
    }

    #[test]
    fn test_single_candidate() {
        let report_at = GeoPoint::new(28.46, 77.50);
        let candidates = vec![department("Only one", 0, &[(28.46, 77.51, 5_000.0)])];

        assert_eq!(RoutingService::select_department(&candidates, report_at), 0);
    }

    fn routing_service(pool: PgPool) -> RoutingService {
        let hub = Arc::new(RealtimeHub::new());
        RoutingService::new(
            pool.clone(),
            Arc::new(DepartmentService::new(pool.clone())),
            Arc::new(UserService::new(pool.clone())),
            Arc::new(UpdateService::new(pool.clone())),
            Arc::new(NotificationService::new(pool, hub)),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a live Postgres"]
    async fn test_reroute_clears_staff_from_previous_department(pool: PgPool) {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, role) VALUES
                ('citizen-1', 'Asha', 'citizen'),
                ('admin-1', 'Ravi', 'admin')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let dept_a: Uuid = sqlx::query_scalar(
            "INSERT INTO departments (name, categories) VALUES ('Roads', '{}') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let dept_b: Uuid = sqlx::query_scalar(
            "INSERT INTO departments (name, categories) VALUES ('Water Works', '{pothole}') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO users (id, name, role, department_id) VALUES ('staff-a', 'Meena', 'staff', $1)",
        )
        .bind(dept_a)
        .execute(&pool)
        .await
        .unwrap();

        // Already routed to department A with one of its staff; the
        // directory now sends this category to staff-less department B
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports
                (reporter_id, title, description, category, lat, lon, status,
                 assigned_department, assigned_staff)
            VALUES
                ('citizen-1', 'Pothole on MG Road', '', 'pothole', 28.46, 77.50,
                 'acknowledged', $1, 'staff-a')
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(dept_a)
        .fetch_one(&pool)
        .await
        .unwrap();

        let routed = routing_service(pool)
            .route_report(report, Some("admin-1"))
            .await;

        assert_eq!(routed.assigned_department, Some(dept_b));
        // Department B has no staff; the member from department A must not
        // survive the move
        assert_eq!(routed.assigned_staff, None);
        assert_eq!(routed.status, ReportStatus::Acknowledged);
    }
}
