//! Integration tests driving the service layer over the in-memory store.

mod auth_test;
mod federated_test;
mod helpers;
mod home_test;
mod refresh_race_test;
mod sweep_test;
