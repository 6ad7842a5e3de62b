use crate::admission::Admission;
use crate::store::EmployeeStore;
// app's shared state

pub struct AppState {
    pub store: EmployeeStore,
    pub admission: Admission, // route class -> rate limiter
}
