#![deny(clippy::all)]
#![allow(dead_code)]

#[macro_use]
extern crate log;

use simplelog::LevelFilter;
use simplelog::SimpleLogger;

use winsys::connection::Connection;
use winsys::xdata::xconnection::XConnection;
pub use winsys::Result;

use x11rb::resource_manager::Database;
use x11rb::rust_connection::RustConnection;

use std::os::unix::io::AsRawFd;

#[macro_use]
mod macros;

#[macro_use]
mod defaults;

mod config;
mod controller;
mod decoration;
mod dispatch;
mod error;
mod model;
mod placement;
mod registry;
mod signal;
mod stack;
mod timer;
mod util;
mod window;
mod workspace;

#[cfg(test)]
mod mock;

use config::Config;
use model::Model;

pub fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    SimpleLogger::init(LevelFilter::Debug, simplelog::Config::default())?;
    #[cfg(not(debug_assertions))]
    SimpleLogger::init(LevelFilter::Info, simplelog::Config::default())?;

    let (conn, screen_num) = RustConnection::connect(None)?;
    let fd = conn.stream().as_raw_fd();
    let xconn = XConnection::new(&conn, screen_num, fd)?;

    signal::install()?;

    // the resource database is read again on every reload
    let loader = || match Database::new_from_default(&conn) {
        Ok(database) => Config::load(&database, screen_num),
        Err(err) => {
            warn!("could not read the resource database: {}", err);
            Config::default()
        },
    };

    Model::new(&xconn, loader).run();
    xconn.cleanup();

    info!("{} terminated", WM_NAME!());
    Ok(())
}
