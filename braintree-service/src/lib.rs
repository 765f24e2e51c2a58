//! braintree-service: a payment facade over the Braintree gateway.
//!
//! The [`facade::PaymentFacade`] normalizes gateway results into
//! [`facade::FacadeError`]s, and [`startup::Application`] serves it over HTTP.

pub mod config;
pub mod facade;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
