//! # Game store payment server
//!
//! The HTTP front end of the game store's checkout and payment core. Customers manage their cart, check out and open
//! payment sessions; the payment provider reports outcomes back through the callback routes.
//!
//! ## Configuration
//! The server is configured via `GSP_*` environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payments/notification` (POST): Signed payment notifications from the provider.
//! * `/payments/webhook` (POST): The unsigned webhook variant. Disabled unless configured, and HMAC-guarded.
//!
//! These require a bearer token with the `customer` role:
//! * `/api/cart` (GET, POST, DELETE) and `/api/cart/{game_id}` (DELETE)
//! * `/api/checkout` (POST)
//! * `/api/orders` (GET), `/api/orders/{order_id}` (GET) and `/api/orders/{order_id}/status` (GET)
//! * `/api/games` (GET): games the caller owns
//! * `/api/payments/{order_id}` (POST): open a payment session
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod hooks;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
