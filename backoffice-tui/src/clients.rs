//! Resource clients for every screen.

use crate::config::TuiConfig;
use backoffice_client::{
    RestCollectionClient, RestDashboardClient, RestLookupClient, RestTransport, SetupError,
};
use backoffice_core::{
    AttendanceRecord, Course, CourseModule, DashboardSource, LiveClass, LookupSource, Mentor,
    Record, ResourceClient, User,
};
use std::sync::Arc;

/// One shared client per resource. Screens come and go; clients live for the
/// whole session.
#[derive(Clone)]
pub struct Clients {
    pub users: Arc<dyn ResourceClient<User>>,
    pub mentors: Arc<dyn ResourceClient<Mentor>>,
    pub course_modules: Arc<dyn ResourceClient<CourseModule>>,
    pub courses: Arc<dyn ResourceClient<Course>>,
    pub attendance: Arc<dyn ResourceClient<AttendanceRecord>>,
    pub live_classes: Arc<dyn ResourceClient<LiveClass>>,
    pub dashboard: Arc<dyn DashboardSource>,
    /// Options for form fields that reference other collections.
    pub lookups: Arc<dyn LookupSource>,
}

impl Clients {
    /// REST clients over one shared transport.
    pub fn rest(config: &TuiConfig) -> Result<Self, SetupError> {
        let transport = RestTransport::new(&config.client_settings())?;
        tracing::info!(base_url = transport.base_url(), "REST transport ready");
        Ok(Self {
            users: rest_client(&transport, config),
            mentors: rest_client(&transport, config),
            course_modules: rest_client(&transport, config),
            courses: rest_client(&transport, config),
            attendance: rest_client(&transport, config),
            live_classes: rest_client(&transport, config),
            dashboard: Arc::new(RestDashboardClient::new(
                transport.clone(),
                config.dashboard_route(),
            )),
            lookups: Arc::new(RestLookupClient::new(transport)),
        })
    }
}

fn rest_client<R: Record>(transport: &RestTransport, config: &TuiConfig) -> Arc<dyn ResourceClient<R>> {
    Arc::new(RestCollectionClient::<R>::new(
        transport.clone(),
        config.endpoints(R::KIND),
    ))
}
