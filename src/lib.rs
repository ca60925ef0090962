pub mod capture;

pub mod config;

pub mod constants;

pub mod error;

pub mod imaging;

pub mod server;

pub mod session;

pub mod transport;
