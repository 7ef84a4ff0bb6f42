//! Shared test helpers for `timetrace-core` integration tests.
//!
//! In-memory repository mocks plus a pre-wired service harness so the
//! interval and timesheet tests can focus on behaviour instead of wiring.

pub mod repositories;

use std::sync::Arc;

use timetrace_core::{
    ActivityService, EmployeeLockRegistry, TimeLogService, TimeSlotService, TimesheetService,
};

use repositories::{
    InMemoryActivityRepository, InMemoryTimeLogRepository, InMemoryTimeSlotRepository,
    InMemoryTimesheetRepository,
};

/// All services wired against shared in-memory repositories.
pub struct Harness {
    pub slots: Arc<InMemoryTimeSlotRepository>,
    pub logs: Arc<InMemoryTimeLogRepository>,
    pub sheets: Arc<InMemoryTimesheetRepository>,
    pub activities: Arc<InMemoryActivityRepository>,
    pub locks: Arc<EmployeeLockRegistry>,
    pub slot_service: Arc<TimeSlotService>,
    pub timesheet_service: Arc<TimesheetService>,
    pub log_service: Arc<TimeLogService>,
    pub activity_service: ActivityService,
}

impl Harness {
    pub fn new() -> Self {
        let slots = Arc::new(InMemoryTimeSlotRepository::default());
        let logs = Arc::new(InMemoryTimeLogRepository::default());
        let sheets = Arc::new(InMemoryTimesheetRepository::default());
        let activities = Arc::new(InMemoryActivityRepository::default());

        let locks = Arc::new(EmployeeLockRegistry::new());
        let slot_service = Arc::new(TimeSlotService::new(slots.clone()));
        let timesheet_service =
            Arc::new(TimesheetService::new(sheets.clone(), slots.clone()));
        let log_service = Arc::new(TimeLogService::new(
            logs.clone(),
            slot_service.clone(),
            timesheet_service.clone(),
            locks.clone(),
        ));
        let activity_service = ActivityService::new(activities.clone(), slots.clone());

        Self {
            slots,
            logs,
            sheets,
            activities,
            locks,
            slot_service,
            timesheet_service,
            log_service,
            activity_service,
        }
    }
}
