//! # Command Line
//!
//! Argument definitions and dispatch. Each subcommand maps to one function
//! in [`crate::commands`]; its result is printed as JSON.

use clap::{Parser, Subcommand};
use rideshare_core::analytics::TimeFilter;
use rideshare_core::geocode::CityGeocoder;
use rideshare_core::{RideStatus, Role};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::commands::ride::{RideRequest, RideScope};
use crate::commands::{account, admin, auth, ride, route};
use crate::error::ApiError;
use crate::App;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "rideshare")]
#[command(author, version, about = "Ride-hailing demo: riders request, drivers drive", long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: rideshare.toml in the config dir)
    #[arg(short, long, env = "RIDESHARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file, or :memory:
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in as the demo account for a role (any password)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// rider, driver or operator
        #[arg(long, default_value = "rider")]
        role: Role,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "rider")]
        role: Role,
    },

    /// End the session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Add credit to your balance
    Credit {
        /// Amount such as 50 or 12,50
        amount: String,
    },

    /// Deduct credit from your balance
    Debit {
        amount: String,
    },

    /// Quote a ride between two addresses
    Estimate {
        pickup: String,
        dropoff: String,
    },

    /// Resolve an address to coordinates
    Geocode {
        address: String,
    },

    /// Request a ride (riders)
    Request {
        pickup: String,
        dropoff: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// List your rides
    Rides {
        /// Pending rides open for acceptance instead
        #[arg(long)]
        available: bool,
        #[arg(long)]
        status: Option<RideStatus>,
    },

    /// Show one ride
    Show {
        ride_id: String,
    },

    /// Accept a pending ride (drivers)
    Accept {
        ride_id: String,
    },

    /// Start driving to the pickup point
    Navigate {
        ride_id: String,
    },

    /// Mark arrival at the pickup point
    Arrive {
        ride_id: String,
    },

    /// Start the ride with the rider's 4-digit code
    Start {
        ride_id: String,
        code: String,
    },

    /// Finish the ride
    Complete {
        ride_id: String,
    },

    /// Cancel a pending or accepted ride
    Cancel {
        ride_id: String,
    },

    /// Cancel after the waiting window and charge the rider
    CancelWithFee {
        ride_id: String,
    },

    /// Show the arrival waiting-window countdown
    WaitStatus {
        ride_id: String,
    },

    /// Operator dashboard
    Stats {
        /// all, today, week or month
        #[arg(long, default_value = "all")]
        period: TimeFilter,
        #[arg(long)]
        search: Option<String>,
    },

    /// Search the account directory (operators)
    Accounts {
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

/// Runs one subcommand and returns its JSON output.
pub async fn execute(app: &App, command: Command) -> Result<Value, ApiError> {
    let App {
        config,
        db,
        ledger,
        session,
    } = app;
    let geocoder = CityGeocoder;

    match command {
        Command::Login {
            email,
            password,
            role,
        } => json(auth::login(db, session, &email, &password, role).await?),
        Command::Register {
            name,
            email,
            password,
            role,
        } => json(auth::register(db, session, &name, &email, &password, role).await?),
        Command::Logout => json(auth::logout(db, session).await?),
        Command::Whoami => json(auth::whoami(session, config)?),
        Command::Credit { amount } => json(account::add_credit(db, session, config, &amount).await?),
        Command::Debit { amount } => {
            json(account::deduct_credit(db, session, config, &amount).await?)
        }
        Command::Estimate { pickup, dropoff } => {
            json(route::estimate(config, &geocoder, &pickup, &dropoff)?)
        }
        Command::Geocode { address } => json(route::geocode_address(&geocoder, &address)?),
        Command::Request {
            pickup,
            dropoff,
            phone,
        } => {
            let request = RideRequest {
                pickup,
                dropoff,
                rider_phone: phone,
            };
            json(ride::request_ride(db, ledger, session, config, &geocoder, request).await?)
        }
        Command::Rides { available, status } => {
            let scope = if available {
                RideScope::Available
            } else {
                RideScope::Mine
            };
            json(ride::list_rides(ledger, session, scope, status)?)
        }
        Command::Show { ride_id } => json(ride::get_ride(ledger, session, &ride_id)?),
        Command::Accept { ride_id } => json(ride::accept_ride(db, ledger, session, &ride_id).await?),
        Command::Navigate { ride_id } => {
            json(ride::start_navigation(db, ledger, session, &ride_id).await?)
        }
        Command::Arrive { ride_id } => {
            json(ride::arrive_at_pickup(db, ledger, session, &ride_id).await?)
        }
        Command::Start { ride_id, code } => {
            json(ride::start_ride(db, ledger, session, &ride_id, &code).await?)
        }
        Command::Complete { ride_id } => {
            json(ride::complete_ride(db, ledger, session, &ride_id).await?)
        }
        Command::Cancel { ride_id } => json(ride::cancel_ride(db, ledger, session, &ride_id).await?),
        Command::CancelWithFee { ride_id } => {
            json(ride::cancel_ride_with_fee(db, ledger, session, config, &ride_id).await?)
        }
        Command::WaitStatus { ride_id } => json(ride::wait_status(ledger, &ride_id)?),
        Command::Stats { period, search } => {
            json(admin::dashboard(ledger, session, config, period, search.as_deref())?)
        }
        Command::Accounts { search } => json(admin::list_accounts(session, search.as_deref())?),
        Command::Config => json(config),
    }
}

fn json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}
